//! Content store
//!
//! Holds the two payload strings and the display mode, and mirrors
//! confirmed changes to non-volatile storage.

pub mod mode;
pub mod persist;
pub mod store;

pub use mode::DisplayMode;
pub use persist::{PersistError, PersistedState};
pub use store::{ContentError, ContentStore};
