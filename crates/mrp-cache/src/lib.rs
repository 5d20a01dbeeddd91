//! # MRP Cache
//!
//! 重算協調、原子發布與變更追蹤

pub mod coordinator;
pub mod dirty_tracking;
pub mod publication;

// Re-export 主要類型
pub use coordinator::{RecomputeCoordinator, RunOutcome};
pub use dirty_tracking::DirtyTracker;
pub use publication::{PlanStore, PublishedPlan};
