// Error types for draft commands.

use thiserror::Error;

use crate::ids::Id;
use crate::store::StoreError;

#[derive(Debug, Error)]
pub enum DraftError {
    #[error("malformed identifier: {input:?}")]
    MalformedId { input: String },

    #[error("player `{name}` is not in the draft pool")]
    PlayerNotInPool { name: String },

    #[error("no captain with id {id}")]
    CaptainNotFound { id: Id },

    #[error("no team with id {id}")]
    TeamNotFound { id: Id },

    #[error("captain {id} is already assigned to team {team}")]
    CaptainAlreadyAssigned { id: Id, team: Id },

    #[error("no captains have been selected")]
    NoCaptainsSelected,

    #[error("the draft order has not been generated")]
    DraftOrderNotGenerated,

    #[error("tournament store call failed: {0}")]
    Store(#[from] StoreError),

    #[error("tournament store did not answer before the deadline")]
    DeadlineElapsed,

    #[error("draft invariant violated: {0}")]
    Invariant(String),

    #[error("draft coordinator is no longer running")]
    CoordinatorClosed,
}

impl DraftError {
    /// Whether the command failed on user input or current state, leaving the
    /// session untouched, as opposed to an external or internal failure.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            DraftError::MalformedId { .. }
                | DraftError::PlayerNotInPool { .. }
                | DraftError::CaptainNotFound { .. }
                | DraftError::TeamNotFound { .. }
                | DraftError::CaptainAlreadyAssigned { .. }
                | DraftError::NoCaptainsSelected
                | DraftError::DraftOrderNotGenerated
        )
    }
}

pub type DraftResult<T> = Result<T, DraftError>;
