// Player directory and the pool of players still available to draft.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::ids::Id;
use crate::model::{Captain, Player};

/// The full player directory plus the subset not yet drafted.
///
/// Picked players are remembered by id so they can never re-enter the pool
/// during the same session.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RosterPool {
    directory: Vec<Player>,
    available: Vec<Player>,
    picked: HashSet<Id>,
}

impl RosterPool {
    /// Create a pool where every player in the directory is available.
    pub fn new(directory: Vec<Player>) -> Self {
        let available = directory.clone();
        RosterPool {
            directory,
            available,
            picked: HashSet::new(),
        }
    }

    pub fn directory(&self) -> &[Player] {
        &self.directory
    }

    pub fn available(&self) -> &[Player] {
        &self.available
    }

    pub fn is_empty(&self) -> bool {
        self.available.is_empty()
    }

    pub fn len(&self) -> usize {
        self.available.len()
    }

    pub fn player(&self, id: Id) -> Option<&Player> {
        self.directory.iter().find(|p| p.id == id)
    }

    pub fn player_mut(&mut self, id: Id) -> Option<&mut Player> {
        self.directory.iter_mut().find(|p| p.id == id)
    }

    pub fn player_by_name(&self, name: &str) -> Option<&Player> {
        self.directory.iter().find(|p| p.name == name)
    }

    pub fn was_picked(&self, id: Id) -> bool {
        self.picked.contains(&id)
    }

    /// Rebuild the available pool as the directory minus the given captains
    /// and anyone already picked.
    pub fn exclude_captains(&mut self, captains: &[Captain]) {
        let remaining = remove_captains_from_players(&self.directory, captains);
        self.available = remaining
            .into_iter()
            .filter(|p| !self.picked.contains(&p.id))
            .collect();
    }

    /// Remove the first available player with this name.
    ///
    /// Returns `None` and leaves the pool untouched when no available player
    /// has that name, so repeating a pick is harmless.
    pub fn take(&mut self, name: &str) -> Option<Player> {
        let idx = self.available.iter().position(|p| p.name == name)?;
        let player = self.available.remove(idx);
        self.picked.insert(player.id);
        Some(player)
    }

    /// Set a player's team binding in the directory. Returns the previous
    /// binding, or `None` for an unknown player.
    pub(crate) fn set_binding(&mut self, player: Id, team: Option<Id>) -> Option<Option<Id>> {
        let entry = self.player_mut(player)?;
        let previous = entry.team;
        entry.team = team;
        if let Some(available) = self.available.iter_mut().find(|p| p.id == player) {
            available.team = team;
        }
        Some(previous)
    }
}

/// The players whose name does not match any captain's name.
pub fn remove_captains_from_players(players: &[Player], captains: &[Captain]) -> Vec<Player> {
    let captain_names: HashSet<&str> = captains.iter().map(|c| c.name.as_str()).collect();
    players
        .iter()
        .filter(|p| !captain_names.contains(p.name.as_str()))
        .cloned()
        .collect()
}
