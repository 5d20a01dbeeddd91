//! # MRP Calculation Engine
//!
//! 核心採購需求計算引擎：BOM 展開、需求彙總、淨需求、緊急度、優先級與採購建議

pub mod aggregation;
pub mod cancel;
pub mod explosion;
pub mod netting;
pub mod planner;
pub mod priority;
pub mod recommendation;
pub mod supply;
pub mod urgency;

// Re-export 主要類型
pub use cancel::{GenerationCounter, RunGuard};
pub use explosion::BomExploder;
pub use netting::{ComponentAccumulator, RequirementCalculator};
pub use planner::PurchasePlanner;
pub use priority::PriorityClassifier;
pub use recommendation::RecommendationGenerator;
pub use supply::SupplyContext;
pub use urgency::UrgencyScorer;

use mrp_core::{ComponentRequirement, ExcludedForecasts, PlanIssue, PurchaseRecommendation};
use serde::{Deserialize, Serialize};

/// 採購計劃計算結果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanResult {
    /// 計算世代
    pub generation: u64,

    /// 物料需求（依物料 SKU 排序）
    pub requirements: Vec<ComponentRequirement>,

    /// 採購建議（依緊急度排序）
    pub recommendations: Vec<PurchaseRecommendation>,

    /// 關鍵成品
    pub critical_builds: Vec<String>,

    /// 問題記錄
    pub issues: Vec<PlanIssue>,

    /// 時界外被排除的預測
    pub excluded_forecasts: ExcludedForecasts,

    /// 計算耗時（毫秒）
    pub calculation_time_ms: Option<u128>,
}

impl PlanResult {
    /// 創建空的計算結果
    pub fn empty(generation: u64) -> Self {
        Self {
            generation,
            requirements: Vec::new(),
            recommendations: Vec::new(),
            critical_builds: Vec::new(),
            issues: Vec::new(),
            excluded_forecasts: ExcludedForecasts::default(),
            calculation_time_ms: None,
        }
    }

    /// 查找某物料的需求
    pub fn requirement(&self, component_sku: &str) -> Option<&ComponentRequirement> {
        self.requirements
            .iter()
            .find(|r| r.component_sku == component_sku)
    }

    /// 查找某物料的建議
    pub fn recommendation(&self, component_sku: &str) -> Option<&PurchaseRecommendation> {
        self.recommendations
            .iter()
            .find(|r| r.component_sku == component_sku)
    }
}
