//! # MRP Purchasing
//!
//! 採購需求引擎：由成品預測經 BOM 展開、淨需求沖銷，產生依緊急度排序的採購建議，
//! 並按供應商彙總、找出免運併單機會。
//!
//! ```no_run
//! use std::sync::Arc;
//! use chrono::Utc;
//! use mrp_purchasing::prelude::*;
//!
//! # fn main() -> mrp_purchasing::Result<()> {
//! let source = Arc::new(InMemoryDataSource::new(PlanningInputs::default()));
//! let coordinator = RecomputeCoordinator::new(source, PlanningConfig::default())?;
//! let outcome = coordinator.handle(&RecomputeRequest::new(RecomputeReason::Manual, Utc::now()))?;
//! if let Some(plan) = outcome.published() {
//!     println!("{} 筆採購建議", plan.recommendations.len());
//! }
//! # Ok(())
//! # }
//! ```

pub mod logging;

pub use mrp_cache;
pub use mrp_calc;
pub use mrp_core;
pub use mrp_optimizer;

pub use mrp_core::{MrpError, Result};

/// 常用類型
pub mod prelude {
    pub use mrp_cache::{PlanStore, PublishedPlan, RecomputeCoordinator, RunOutcome};
    pub use mrp_calc::{GenerationCounter, PlanResult, PurchasePlanner, RunGuard};
    pub use mrp_core::{
        BomGraph, BomNode, ComponentRequirement, ComputationSummary, FinishedGoodForecast,
        InMemoryDataSource, InventoryPosition, InventorySnapshot, IssueKind, JsonDataSource,
        MrpError, PlanIssue, PlanningConfig, PlanningDataSource, PlanningInputs, Priority,
        PurchaseRecommendation, RecomputeReason, RecomputeRequest, RecommendationFlag,
        RequirementStatus, VendorRecord, VendorSummary,
    };
    pub use mrp_optimizer::{ConsolidationReport, VendorConsolidator};
}
