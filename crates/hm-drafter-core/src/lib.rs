// Library root: the snake-draft engine, its coordinator and the store
// contract the engine depends on.

pub mod coordinator;
pub mod draft;
pub mod error;
pub mod ids;
pub mod model;
pub mod store;

pub use coordinator::{Applied, DraftCoordinator, DraftHandle};
pub use error::{DraftError, DraftResult};
pub use ids::Id;
pub use store::{StoreError, TournamentStore};
