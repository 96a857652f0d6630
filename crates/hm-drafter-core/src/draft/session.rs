// Draft session: the single owner of all mutable draft state.

use tracing::{debug, info, warn};

use super::captain::{select_captains, CaptainSelection};
use super::order::{generate_draft_order, DraftRng};
use super::pool::RosterPool;
use super::snapshot::{DraftSnapshot, TeamSnapshot};
use super::turn::TurnScheduler;
use super::unassigned::UnassignedCaptains;
use crate::error::{DraftError, DraftResult};
use crate::ids::Id;
use crate::model::{Captain, DraftPick, Player, Team};

/// A captain -> team binding that has been validated against the session but
/// not yet confirmed by the tournament store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Assignment {
    pub captain: Id,
    pub team: Id,
    /// The binding may replace an existing one.
    pub reassign: bool,
}

/// All state of one live draft.
///
/// Every mutation goes through a method here, and every method either
/// applies completely or returns an error with the session unchanged.
#[derive(Debug, Clone)]
pub struct DraftSession {
    tournament: Id,
    alt_name_slug: String,
    pool: RosterPool,
    captains: Vec<Captain>,
    draft_order: Vec<Captain>,
    scheduler: Option<TurnScheduler>,
    unassigned: UnassignedCaptains,
    teams: Vec<Team>,
    picks: Vec<DraftPick>,
}

impl DraftSession {
    /// Create a session from a confirmed tournament roster.
    pub fn new(
        tournament: Id,
        players: Vec<Player>,
        teams: Vec<Team>,
        alt_name_slug: impl Into<String>,
    ) -> Self {
        info!(
            "Draft session created for tournament {} with {} players and {} teams",
            tournament,
            players.len(),
            teams.len()
        );
        DraftSession {
            tournament,
            alt_name_slug: alt_name_slug.into(),
            pool: RosterPool::new(players),
            captains: Vec::new(),
            draft_order: Vec::new(),
            scheduler: None,
            unassigned: UnassignedCaptains::new(),
            teams,
            picks: Vec::new(),
        }
    }

    pub fn tournament(&self) -> Id {
        self.tournament
    }

    pub fn pool(&self) -> &RosterPool {
        &self.pool
    }

    pub fn captains(&self) -> &[Captain] {
        &self.captains
    }

    pub fn draft_order(&self) -> &[Captain] {
        &self.draft_order
    }

    pub fn scheduler(&self) -> Option<&TurnScheduler> {
        self.scheduler.as_ref()
    }

    pub fn unassigned(&self) -> &UnassignedCaptains {
        &self.unassigned
    }

    pub fn teams(&self) -> &[Team] {
        &self.teams
    }

    pub fn picks(&self) -> &[DraftPick] {
        &self.picks
    }

    pub fn team(&self, id: Id) -> Option<&Team> {
        self.teams.iter().find(|t| t.id == id)
    }

    // -----------------------------------------------------------------------
    // Captains and draft order
    // -----------------------------------------------------------------------

    /// Replace the captain set from operator selections.
    ///
    /// Captains leave the pool, any previous draft order is discarded, and
    /// the unassigned set is rebuilt from the new captains.
    pub fn select_captains<S: AsRef<str>>(&mut self, selections: &[S]) -> CaptainSelection {
        let selection = select_captains(self.pool.directory(), selections, &self.alt_name_slug);

        self.captains = selection.captains.clone();
        self.pool.exclude_captains(&self.captains);
        self.draft_order.clear();
        self.scheduler = None;
        let captains = self.captains.clone();
        self.reset_unassigned(&captains);

        info!(
            "Selected {} captains; {} players left in the pool",
            self.captains.len(),
            self.pool.len()
        );
        selection
    }

    /// Draw a fresh draft order and restart turns from the top.
    pub fn generate_draft_order(&mut self, rng: &mut DraftRng) -> DraftResult<&[Captain]> {
        if self.captains.is_empty() {
            return Err(DraftError::NoCaptainsSelected);
        }

        let order = generate_draft_order(&self.captains, rng);
        let scheduler = TurnScheduler::new(order.len())
            .ok_or_else(|| DraftError::Invariant("draft order came back empty".into()))?;

        info!(
            "Draft order generated (seed {}): {}",
            rng.seed(),
            order
                .iter()
                .map(|c| format!("{}. {}", c.order.unwrap_or_default(), c.name))
                .collect::<Vec<_>>()
                .join(", ")
        );

        self.reset_unassigned(&order);
        self.draft_order = order;
        self.scheduler = Some(scheduler);
        Ok(&self.draft_order)
    }

    /// The captain whose turn it is.
    pub fn current_captain(&self) -> DraftResult<&Captain> {
        let scheduler = self
            .scheduler
            .as_ref()
            .ok_or(DraftError::DraftOrderNotGenerated)?;
        self.draft_order.get(scheduler.current()).ok_or_else(|| {
            DraftError::Invariant(format!(
                "turn index {} outside draft order of {}",
                scheduler.current(),
                self.draft_order.len()
            ))
        })
    }

    /// Hand the turn to the next captain in snake order.
    pub fn advance_turn(&mut self) -> DraftResult<&Captain> {
        let scheduler = self
            .scheduler
            .as_mut()
            .ok_or(DraftError::DraftOrderNotGenerated)?;
        let index = scheduler.advance();
        debug!("Turn advanced to index {} ({:?})", index, scheduler.direction());
        self.current_captain()
    }

    // -----------------------------------------------------------------------
    // Picks
    // -----------------------------------------------------------------------

    /// Take a player out of the pool on behalf of the captain whose turn it
    /// is. A name that is not in the pool leaves everything unchanged.
    pub fn pick_player(&mut self, name: &str) -> DraftResult<DraftPick> {
        let captain_id = match self.scheduler {
            Some(_) => Some(self.current_captain()?.id),
            None => None,
        };

        let player = self.pool.take(name).ok_or_else(|| DraftError::PlayerNotInPool {
            name: name.to_string(),
        })?;

        let pick = DraftPick {
            pick_number: self.picks.len() as u32 + 1,
            captain_id,
            player_id: player.id,
            player_name: player.name,
        };
        info!(
            "Pick #{}: {} (captain {:?}); {} left in the pool",
            pick.pick_number,
            pick.player_name,
            pick.captain_id,
            self.pool.len()
        );
        self.picks.push(pick.clone());
        Ok(pick)
    }

    // -----------------------------------------------------------------------
    // Captain -> team bindings
    // -----------------------------------------------------------------------

    /// Validate a captain -> team binding before it is sent to the store.
    ///
    /// Without `reassign`, a captain that is already on a team is refused so
    /// a binding is never overwritten by accident.
    pub fn prepare_assignment(
        &self,
        captain_id: &str,
        team_id: &str,
        reassign: bool,
    ) -> DraftResult<Assignment> {
        let captain: Id = captain_id.parse()?;
        let team: Id = team_id.parse()?;
        let assignment = Assignment {
            captain,
            team,
            reassign,
        };
        self.check_assignment(&assignment)?;
        Ok(assignment)
    }

    /// Apply a binding the store has accepted. State is re-checked because
    /// other commands may have run while the store call was in flight.
    pub fn commit_assignment(&mut self, assignment: Assignment) -> DraftResult<()> {
        self.check_assignment(&assignment)?;

        let previous = self
            .pool
            .set_binding(assignment.captain, Some(assignment.team))
            .ok_or_else(|| {
                DraftError::Invariant(format!(
                    "captain {} has no entry in the player directory",
                    assignment.captain
                ))
            })?;
        self.unassigned.remove(assignment.captain);

        match previous {
            Some(old) if old != assignment.team => info!(
                "Captain {} moved from team {} to team {}",
                assignment.captain, old, assignment.team
            ),
            _ => info!(
                "Captain {} assigned to team {}",
                assignment.captain, assignment.team
            ),
        }
        Ok(())
    }

    fn check_assignment(&self, assignment: &Assignment) -> DraftResult<()> {
        if !self.captains.iter().any(|c| c.id == assignment.captain) {
            return Err(DraftError::CaptainNotFound {
                id: assignment.captain,
            });
        }
        if self.team(assignment.team).is_none() {
            return Err(DraftError::TeamNotFound {
                id: assignment.team,
            });
        }
        if !assignment.reassign {
            let bound = self
                .pool
                .player(assignment.captain)
                .and_then(|p| p.team);
            if let Some(team) = bound {
                return Err(DraftError::CaptainAlreadyAssigned {
                    id: assignment.captain,
                    team,
                });
            }
        }
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Teams
    // -----------------------------------------------------------------------

    /// Register a team the store has just created.
    pub fn add_team(&mut self, team: Team) {
        info!("Team {} '{}' added", team.id, team.name);
        self.teams.retain(|t| t.id != team.id);
        self.teams.push(team);
    }

    /// Replace the known teams with a fresh listing from the store.
    ///
    /// Players bound to a team that is no longer listed lose the binding, so
    /// their captains show up as unassigned again.
    pub fn replace_teams(&mut self, teams: Vec<Team>) {
        let orphaned: Vec<Id> = self
            .pool
            .directory()
            .iter()
            .filter(|p| p.team.is_some_and(|t| !teams.iter().any(|team| team.id == t)))
            .map(|p| p.id)
            .collect();
        for player in &orphaned {
            warn!("Player {} was bound to a team that no longer exists", player);
            self.release(*player);
        }

        info!(
            "Team list refreshed: {} teams, {} players released",
            teams.len(),
            orphaned.len()
        );
        self.teams = teams;
    }

    /// Validate a team deletion before it is sent to the store.
    pub fn prepare_team_deletion(&self, team_id: &str) -> DraftResult<Id> {
        let team: Id = team_id.parse()?;
        if self.team(team).is_none() {
            return Err(DraftError::TeamNotFound { id: team });
        }
        Ok(team)
    }

    /// Forget a team the store has deleted.
    ///
    /// Everyone still bound to it loses the binding; captains among them go
    /// back to the unassigned set. `former_roster` is the store's roster from
    /// before the delete, so entries that have since moved to another team
    /// keep their new binding.
    pub fn commit_team_deletion(&mut self, team: Id, former_roster: &[Id]) {
        self.teams.retain(|t| t.id != team);

        let mut released: Vec<Id> = self
            .pool
            .directory()
            .iter()
            .filter(|p| p.team == Some(team))
            .map(|p| p.id)
            .collect();
        for id in former_roster {
            if released.contains(id) {
                continue;
            }
            match self.pool.player(*id).map(|p| p.team) {
                None => warn!("Deleted team {} listed unknown player {}", team, id),
                Some(Some(current)) => debug!(
                    "Player {} moved to team {} before team {} was deleted",
                    id, current, team
                ),
                Some(None) => released.push(*id),
            }
        }

        for player in &released {
            self.release(*player);
        }

        info!(
            "Team {} deleted; {} players released",
            team,
            released.len()
        );
    }

    // -----------------------------------------------------------------------
    // Views
    // -----------------------------------------------------------------------

    /// Whether every non-captain has been drafted.
    pub fn is_complete(&self) -> bool {
        self.scheduler.is_some() && self.pool.is_empty()
    }

    /// Build a consistent view of the whole session.
    pub fn snapshot(&self) -> DraftSnapshot {
        let teams = self
            .teams
            .iter()
            .map(|team| self.team_snapshot(team))
            .collect();

        DraftSnapshot {
            tournament: self.tournament,
            draft_order: self.draft_order.clone(),
            current_captain: self.current_captain().ok().cloned(),
            direction: self.scheduler.as_ref().map(|s| s.direction()),
            pool: self.pool.available().iter().map(|p| p.name.clone()).collect(),
            unassigned_captains: self.unassigned.captains().to_vec(),
            picks: self.picks.clone(),
            teams,
            is_complete: self.is_complete(),
        }
    }

    /// Roster of a team: everyone bound to it, then the players its captain
    /// has picked that are not bound yet.
    fn team_snapshot(&self, team: &Team) -> TeamSnapshot {
        let bound: Vec<&Player> = self
            .pool
            .directory()
            .iter()
            .filter(|p| p.team == Some(team.id))
            .collect();

        let captain = self
            .captains
            .iter()
            .find(|c| bound.iter().any(|p| p.id == c.id))
            .cloned();

        let mut players: Vec<String> = bound.iter().map(|p| p.name.clone()).collect();
        if let Some(captain) = &captain {
            for pick in self
                .picks
                .iter()
                .filter(|pick| pick.captain_id == Some(captain.id))
            {
                if !players.contains(&pick.player_name) {
                    players.push(pick.player_name.clone());
                }
            }
        }

        TeamSnapshot {
            id: team.id,
            name: team.name.clone(),
            captain,
            players,
        }
    }

    // -----------------------------------------------------------------------
    // Helpers
    // -----------------------------------------------------------------------

    /// The captain record for a player, preferring the draft-order entry so
    /// the position is kept.
    fn captain_record(&self, id: Id) -> Option<Captain> {
        self.draft_order
            .iter()
            .chain(self.captains.iter())
            .find(|c| c.id == id)
            .cloned()
    }

    /// Clear a player's binding and return them to the unassigned set if
    /// they are a captain.
    fn release(&mut self, player: Id) {
        if self.pool.set_binding(player, None).is_none() {
            return;
        }
        if let Some(captain) = self.captain_record(player) {
            self.unassigned.restore(captain);
        }
    }

    /// Track every captain in `captains` that is not bound to a team.
    fn reset_unassigned(&mut self, captains: &[Captain]) {
        let unbound: Vec<Captain> = captains
            .iter()
            .filter(|c| self.pool.player(c.id).is_some_and(|p| p.team.is_none()))
            .cloned()
            .collect();
        self.unassigned.reset_from(&unbound);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::draft::turn::Direction;
    use crate::model::ALT_NAME_SLUG;

    fn ten_players() -> Vec<Player> {
        [
            "Alice", "Bob", "Charlie", "Dana", "Eve", "Finn", "Gus", "Hana", "Ivy", "Jo",
        ]
        .iter()
        .enumerate()
        .map(|(i, name)| Player::new(i as u64 + 1, *name))
        .collect()
    }

    fn teams() -> Vec<Team> {
        vec![
            Team::new(100u64, "Blue"),
            Team::new(200u64, "Gold"),
            Team::new(300u64, "Green"),
        ]
    }

    fn session() -> DraftSession {
        DraftSession::new(Id(7), ten_players(), teams(), ALT_NAME_SLUG)
    }

    fn drafted_session() -> DraftSession {
        let mut s = session();
        s.select_captains(&["Alice", "Bob", "Charlie"]);
        s.generate_draft_order(&mut DraftRng::seeded(1)).unwrap();
        s
    }

    #[test]
    fn selecting_captains_removes_them_from_pool() {
        let mut s = session();
        let selection = s.select_captains(&["Alice", "Bob", "Charlie", "Zed"]);
        assert_eq!(selection.unmatched, vec!["Zed".to_string()]);
        assert_eq!(s.captains().len(), 3);
        assert_eq!(s.pool().len(), 7);
        assert_eq!(s.unassigned().len(), 3);
        assert!(s.draft_order().is_empty());
    }

    #[test]
    fn order_requires_captains() {
        let mut s = session();
        assert!(matches!(
            s.generate_draft_order(&mut DraftRng::seeded(1)),
            Err(DraftError::NoCaptainsSelected)
        ));
    }

    #[test]
    fn order_resets_turns_and_unassigned() {
        let mut s = drafted_session();
        s.advance_turn().unwrap();
        s.advance_turn().unwrap();
        s.generate_draft_order(&mut DraftRng::seeded(2)).unwrap();

        let scheduler = s.scheduler().unwrap();
        assert_eq!(scheduler.current(), 0);
        assert_eq!(scheduler.direction(), Direction::Forward);
        assert_eq!(s.unassigned().captains(), s.draft_order());
    }

    #[test]
    fn turns_follow_snake_order() {
        let mut s = drafted_session();
        let order: Vec<Id> = s.draft_order().iter().map(|c| c.id).collect();
        let mut seen = vec![s.current_captain().unwrap().id];
        for _ in 0..6 {
            seen.push(s.advance_turn().unwrap().id);
        }
        let expected: Vec<Id> = [0, 1, 2, 2, 1, 0, 0].iter().map(|&i| order[i]).collect();
        assert_eq!(seen, expected);
    }

    #[test]
    fn advancing_without_order_is_recoverable() {
        let mut s = session();
        let err = s.advance_turn().unwrap_err();
        assert!(matches!(err, DraftError::DraftOrderNotGenerated));
        assert!(err.is_recoverable());
    }

    #[test]
    fn pick_is_attributed_to_current_captain() {
        let mut s = drafted_session();
        let first = s.current_captain().unwrap().id;
        let pick = s.pick_player("Dana").unwrap();
        assert_eq!(pick.pick_number, 1);
        assert_eq!(pick.captain_id, Some(first));
        assert_eq!(pick.player_id, Id(4));
        assert_eq!(s.pool().len(), 6);
    }

    #[test]
    fn picking_absent_player_changes_nothing() {
        let mut s = drafted_session();
        s.pick_player("Dana").unwrap();
        let pool_before = s.pool().available().to_vec();
        let picks_before = s.picks().to_vec();

        let err = s.pick_player("Dana").unwrap_err();
        assert!(matches!(err, DraftError::PlayerNotInPool { .. }));
        assert!(err.is_recoverable());
        assert_eq!(s.pool().available(), pool_before.as_slice());
        assert_eq!(s.picks(), picks_before.as_slice());
    }

    #[test]
    fn captains_cannot_be_picked() {
        let mut s = drafted_session();
        assert!(s.pick_player("Alice").is_err());
    }

    #[test]
    fn assignment_round_trip() {
        let mut s = drafted_session();
        let assignment = s.prepare_assignment("2", "200", false).unwrap();
        s.commit_assignment(assignment).unwrap();

        assert_eq!(s.pool().player(Id(2)).unwrap().team, Some(Id(200)));
        assert!(!s.unassigned().contains(Id(2)));
        assert_eq!(s.unassigned().len(), 2);
    }

    #[test]
    fn assignment_rejects_bad_input_without_changes() {
        let s = drafted_session();
        assert!(matches!(
            s.prepare_assignment("two", "200", false),
            Err(DraftError::MalformedId { .. })
        ));
        assert!(matches!(
            s.prepare_assignment("4", "200", false),
            Err(DraftError::CaptainNotFound { id }) if id == Id(4)
        ));
        assert!(matches!(
            s.prepare_assignment("2", "999", false),
            Err(DraftError::TeamNotFound { id }) if id == Id(999)
        ));
        assert_eq!(s.unassigned().len(), 3);
    }

    #[test]
    fn binding_is_never_silently_overwritten() {
        let mut s = drafted_session();
        let first = s.prepare_assignment("1", "100", false).unwrap();
        s.commit_assignment(first).unwrap();

        assert!(matches!(
            s.prepare_assignment("1", "200", false),
            Err(DraftError::CaptainAlreadyAssigned { id, team }) if id == Id(1) && team == Id(100)
        ));

        let moved = s.prepare_assignment("1", "200", true).unwrap();
        s.commit_assignment(moved).unwrap();
        assert_eq!(s.pool().player(Id(1)).unwrap().team, Some(Id(200)));
    }

    #[test]
    fn commit_rechecks_state() {
        let mut s = drafted_session();
        let a = s.prepare_assignment("1", "100", false).unwrap();
        let b = s.prepare_assignment("1", "200", false).unwrap();
        s.commit_assignment(a).unwrap();
        assert!(s.commit_assignment(b).is_err());
        assert_eq!(s.pool().player(Id(1)).unwrap().team, Some(Id(100)));
    }

    #[test]
    fn unassigned_matches_bindings() {
        let mut s = drafted_session();
        let a = s.prepare_assignment("3", "300", false).unwrap();
        s.commit_assignment(a).unwrap();
        for captain in s.captains() {
            let bound = s.pool().player(captain.id).unwrap().team.is_some();
            assert_eq!(s.unassigned().contains(captain.id), !bound);
        }
    }

    #[test]
    fn already_bound_captains_start_assigned() {
        let mut players = ten_players();
        players[0].team = Some(Id(100));
        let mut s = DraftSession::new(Id(7), players, teams(), ALT_NAME_SLUG);
        s.select_captains(&["Alice", "Bob"]);
        assert!(!s.unassigned().contains(Id(1)));
        assert!(s.unassigned().contains(Id(2)));
    }

    #[test]
    fn deleting_team_releases_captain() {
        let mut s = drafted_session();
        let a = s.prepare_assignment("2", "200", false).unwrap();
        s.commit_assignment(a).unwrap();

        let team = s.prepare_team_deletion("200").unwrap();
        s.commit_team_deletion(team, &[Id(2)]);

        assert!(s.team(Id(200)).is_none());
        assert_eq!(s.pool().player(Id(2)).unwrap().team, None);
        assert!(s.unassigned().contains(Id(2)));
        assert_eq!(s.unassigned().captains(), s.draft_order());
    }

    #[test]
    fn deletion_keeps_bindings_made_after_prepare() {
        let mut s = drafted_session();
        let a = s.prepare_assignment("1", "100", false).unwrap();
        s.commit_assignment(a).unwrap();

        // The store listed captain 1 on team 100 before the delete went out,
        // but the captain was moved to 200 in the meantime.
        let team = s.prepare_team_deletion("100").unwrap();
        let moved = s.prepare_assignment("1", "200", true).unwrap();
        s.commit_assignment(moved).unwrap();
        s.commit_team_deletion(team, &[Id(1)]);

        assert!(s.team(Id(100)).is_none());
        assert_eq!(s.pool().player(Id(1)).unwrap().team, Some(Id(200)));
        assert!(!s.unassigned().contains(Id(1)));
    }

    #[test]
    fn refresh_releases_captains_of_vanished_teams() {
        let mut s = drafted_session();
        let a = s.prepare_assignment("2", "200", false).unwrap();
        s.commit_assignment(a).unwrap();
        let b = s.prepare_assignment("3", "300", false).unwrap();
        s.commit_assignment(b).unwrap();

        s.replace_teams(vec![Team::new(100u64, "Blue"), Team::new(300u64, "Green")]);

        assert_eq!(s.pool().player(Id(2)).unwrap().team, None);
        assert!(s.unassigned().contains(Id(2)));
        assert_eq!(s.pool().player(Id(3)).unwrap().team, Some(Id(300)));
        assert!(!s.unassigned().contains(Id(3)));
        for captain in s.captains() {
            let bound = s.pool().player(captain.id).unwrap().team.is_some();
            assert_eq!(s.unassigned().contains(captain.id), !bound);
        }
    }

    #[test]
    fn snapshot_derives_team_rosters() {
        let mut s = drafted_session();
        let first = s.current_captain().unwrap().clone();
        let a = s
            .prepare_assignment(&first.id.to_string(), "100", false)
            .unwrap();
        s.commit_assignment(a).unwrap();
        s.pick_player("Eve").unwrap();

        let snapshot = s.snapshot();
        let blue = snapshot.teams.iter().find(|t| t.id == Id(100)).unwrap();
        assert_eq!(blue.captain.as_ref().map(|c| c.id), Some(first.id));
        assert_eq!(blue.players, vec![first.name.clone(), "Eve".to_string()]);
        assert_eq!(snapshot.pool.len(), 6);
        assert!(!snapshot.is_complete);
    }
}
