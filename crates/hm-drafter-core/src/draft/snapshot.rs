// Read-only views of a draft session.

use serde::{Deserialize, Serialize};

use super::turn::Direction;
use crate::ids::Id;
use crate::model::{Captain, DraftPick};

/// Everything an operator screen needs, taken in one step so the parts agree
/// with each other.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DraftSnapshot {
    pub tournament: Id,
    pub draft_order: Vec<Captain>,
    pub current_captain: Option<Captain>,
    pub direction: Option<Direction>,
    /// Names of the players still available, in directory order.
    pub pool: Vec<String>,
    pub unassigned_captains: Vec<Captain>,
    pub picks: Vec<DraftPick>,
    pub teams: Vec<TeamSnapshot>,
    pub is_complete: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamSnapshot {
    pub id: Id,
    pub name: String,
    pub captain: Option<Captain>,
    pub players: Vec<String>,
}

impl DraftSnapshot {
    /// Picks made so far on behalf of one captain.
    pub fn picks_by(&self, captain: Id) -> impl Iterator<Item = &DraftPick> {
        self.picks
            .iter()
            .filter(move |p| p.captain_id == Some(captain))
    }

    pub fn team(&self, id: Id) -> Option<&TeamSnapshot> {
        self.teams.iter().find(|t| t.id == id)
    }
}
