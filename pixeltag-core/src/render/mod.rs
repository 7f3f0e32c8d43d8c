//! Render planner
//!
//! Decides which refresh class and window a paint job needs and enforces
//! the panel's ordering rule: after a full refresh, the next partial
//! refresh must be preceded by a full blank pass.

pub mod paint;
pub mod plan;
pub mod tracker;

pub use paint::{compose_scene, Scene};
pub use plan::{plan_refresh, status_rect, PaintJob, RefreshClass, RefreshPlan, StatusMessage};
pub use tracker::{RefreshOutcome, RefreshTracker};
