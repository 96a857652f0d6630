// Contract for the remote tournament store the draft engine talks to.

use async_trait::async_trait;
use thiserror::Error;

use crate::ids::Id;
use crate::model::{FormField, Player, Team};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("network error: {0}")]
    Transport(String),

    #[error("unexpected status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("could not decode response: {0}")]
    Decode(String),

    #[error("request timed out")]
    Timeout,
}

impl StoreError {
    /// Whether a failed read is worth repeating. Client errors (4xx other
    /// than 429) and undecodable bodies will fail the same way again.
    pub fn is_retryable(&self) -> bool {
        match self {
            StoreError::Transport(_) | StoreError::Timeout => true,
            StoreError::Status { status, .. } => *status >= 500 || *status == 429,
            StoreError::Decode(_) => false,
        }
    }
}

/// The tournament API as seen by the draft engine.
///
/// Reads are idempotent and implementations may retry them. Writes must not
/// be retried: a write that timed out may still have been applied.
#[async_trait]
pub trait TournamentStore: Send + Sync {
    /// Registration-form catalog mapping opaque question keys to slugs.
    async fn fetch_form_field_catalog(&self, tournament: Id) -> Result<Vec<FormField>, StoreError>;

    /// Every registered player, with form answers keyed by slug.
    async fn fetch_players(&self, tournament: Id) -> Result<Vec<Player>, StoreError>;

    /// Teams registered for the tournament. Rosters may be empty.
    async fn fetch_teams(&self, tournament: Id) -> Result<Vec<Team>, StoreError>;

    async fn create_team(&self, name: &str, tournament: Id) -> Result<Team, StoreError>;

    /// Delete a team, returning the ids of the players that were on it.
    async fn delete_team(&self, team: Id, tournament: Id) -> Result<Vec<Id>, StoreError>;

    async fn bind_player_to_team(
        &self,
        player: Id,
        team: Id,
        tournament: Id,
    ) -> Result<(), StoreError>;
}
