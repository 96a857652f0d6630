// Data shapes shared between the draft engine and the tournament store.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::ids::Id;

/// Form-field slug that carries a player's alternate display name.
pub const ALT_NAME_SLUG: &str = "altname";

/// A registered tournament player.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub id: Id,
    pub name: String,
    #[serde(default)]
    pub scene: String,
    #[serde(default)]
    pub pronouns: String,
    #[serde(default)]
    pub image: String,
    /// Answers to the tournament's registration form, keyed by field slug.
    #[serde(default)]
    pub form_fields: HashMap<String, String>,
    /// Team binding. `None` means the player is not on a team yet.
    #[serde(default)]
    pub team: Option<Id>,
}

impl Player {
    /// Build a player with only the fields the engine needs.
    pub fn new(id: impl Into<Id>, name: impl Into<String>) -> Self {
        Player {
            id: id.into(),
            name: name.into(),
            scene: String::new(),
            pronouns: String::new(),
            image: String::new(),
            form_fields: HashMap::new(),
            team: None,
        }
    }

    /// Value of a form field by slug, if the player answered it.
    pub fn form_field(&self, slug: &str) -> Option<&str> {
        self.form_fields.get(slug).map(String::as_str)
    }
}

/// A player designated to draft others onto their team.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Captain {
    /// The underlying player's id.
    pub id: Id,
    pub name: String,
    /// Alternate display name taken from the registration form.
    pub alt_name: String,
    /// Position in the draft order (1-based). `None` until an order exists.
    pub order: Option<u32>,
}

impl Captain {
    /// Derive a captain record from a player, reading the alternate name from
    /// the form field with the given slug.
    pub fn from_player(player: &Player, alt_name_slug: &str) -> Self {
        Captain {
            id: player.id,
            name: player.name.clone(),
            alt_name: player.form_field(alt_name_slug).unwrap_or_default().to_string(),
            order: None,
        }
    }

    /// Name to show in turn prompts: the alternate name when one was given.
    pub fn display_name(&self) -> &str {
        if self.alt_name.trim().is_empty() {
            &self.name
        } else {
            &self.alt_name
        }
    }
}

/// A tournament team. `players` is a derived view; each player's `team`
/// binding is authoritative.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Team {
    pub id: Id,
    pub name: String,
    #[serde(default)]
    pub players: Vec<Player>,
}

impl Team {
    pub fn new(id: impl Into<Id>, name: impl Into<String>) -> Self {
        Team {
            id: id.into(),
            name: name.into(),
            players: Vec::new(),
        }
    }
}

/// One entry of a tournament's registration-form catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormField {
    /// Opaque, tournament-specific question key (e.g. `question216`).
    pub field_name: String,
    /// Stable short key the engine uses (e.g. `altname`, `discord`).
    pub field_slug: String,
    #[serde(default)]
    pub field_description: String,
}

/// A completed pick.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DraftPick {
    /// 1-based, sequential within the session.
    pub pick_number: u32,
    /// Captain whose turn it was, when a draft order existed.
    pub captain_id: Option<Id>,
    pub player_id: Id,
    pub player_name: String,
}
