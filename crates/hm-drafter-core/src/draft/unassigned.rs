// Captains not yet bound to a team.

use serde::{Deserialize, Serialize};

use crate::ids::Id;
use crate::model::Captain;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnassignedCaptains {
    captains: Vec<Captain>,
}

impl UnassignedCaptains {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start over from the full draft order.
    pub fn reset_from(&mut self, draft_order: &[Captain]) {
        self.captains = draft_order.to_vec();
    }

    /// Drop the captain with this id. Unknown ids leave the set as it was.
    pub fn remove(&mut self, id: Id) {
        self.captains.retain(|c| c.id != id);
    }

    /// Put a captain back, e.g. after their team was deleted. Adding a
    /// captain that is already tracked does nothing.
    pub fn restore(&mut self, captain: Captain) {
        if !self.contains(captain.id) {
            self.captains.push(captain);
            self.captains.sort_by_key(|c| c.order);
        }
    }

    pub fn contains(&self, id: Id) -> bool {
        self.captains.iter().any(|c| c.id == id)
    }

    pub fn captains(&self) -> &[Captain] {
        &self.captains
    }

    pub fn len(&self) -> usize {
        self.captains.len()
    }

    pub fn is_empty(&self) -> bool {
        self.captains.is_empty()
    }
}
