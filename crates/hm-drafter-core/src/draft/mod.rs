// Snake-draft engine.

pub mod captain;
pub mod order;
pub mod pool;
pub mod session;
pub mod snapshot;
pub mod turn;
pub mod unassigned;

pub use captain::{select_captains, CaptainSelection};
pub use order::{generate_draft_order, DraftRng};
pub use pool::{remove_captains_from_players, RosterPool};
pub use session::{Assignment, DraftSession};
pub use snapshot::{DraftSnapshot, TeamSnapshot};
pub use turn::{Direction, TurnScheduler};
pub use unassigned::UnassignedCaptains;
