//! Input event reducer
//!
//! Normalizes the two asynchronous input sources, wireless tokens and
//! button gestures, into one priority queue of transition requests.

pub mod gesture;
pub mod queue;
pub mod reducer;

pub use gesture::{ButtonGesture, GestureDetector};
pub use queue::{ContentChange, PendingRequest, RequestQueue};
pub use reducer::{reduce_command, reduce_gesture, reduce_oversized, WriteOutcome};
