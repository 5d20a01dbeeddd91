//! # MRP Core
//!
//! 採購需求引擎的核心資料模型與類型定義

pub mod bom;
pub mod config;
pub mod forecast;
pub mod inventory;
pub mod issue;
pub mod recommendation;
pub mod requirement;
pub mod source;
pub mod summary;
pub mod trigger;
pub mod vendor;

// Re-export 主要類型
pub use bom::{BomGraph, BomNode, WhereUsed};
pub use config::{PlanningConfig, MAX_HORIZON_WEEKS};
pub use forecast::{DemandBucket, ExcludedForecasts, FinishedGoodForecast};
pub use inventory::{InventoryPosition, InventorySnapshot};
pub use issue::{IssueKind, IssueSeverity, PlanIssue};
pub use recommendation::{Priority, PurchaseRecommendation, RecommendationFlag, UrgencyScore};
pub use requirement::{
    BomConsumption, ComponentRequirement, RequirementStatus, MAX_LEAD_TIME_DAYS,
};
pub use source::{InMemoryDataSource, JsonDataSource, PlanningDataSource, PlanningInputs};
pub use summary::{ComputationSummary, ConsolidationOpportunity, PullForwardItem, VendorSummary};
pub use trigger::{RecomputeReason, RecomputeRequest};
pub use vendor::{OrderQuantityRule, VendorRecord};

/// MRP 錯誤類型
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MrpError {
    #[error("BOM 循環引用: {root} 展開路徑 {}", path.join(" -> "))]
    CyclicBom { root: String, path: Vec<String> },

    #[error("BOM 層級超過上限 {max_depth}: {root}")]
    BomDepthExceeded { root: String, max_depth: u32 },

    #[error("缺少供應商資料: {0}")]
    MissingVendorData(String),

    #[error("庫存快照已過期: {age_hours} 小時（上限 {max_age_hours} 小時）")]
    StaleInventorySnapshot { age_hours: i64, max_age_hours: i64 },

    #[error("輸入載入失敗 [{source_name}]: {message}")]
    InputLoadFailure { source_name: String, message: String },

    #[error("無效的配置: {0}")]
    InvalidConfig(String),

    #[error("計算已被較新的請求取代（世代 {generation}）")]
    Superseded { generation: u64 },

    #[error("工作執行緒池錯誤: {0}")]
    WorkerPool(String),

    #[error("序列化錯誤: {0}")]
    Serialization(String),
}

impl MrpError {
    /// 建立輸入載入失敗
    pub fn load_failure(source_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InputLoadFailure {
            source_name: source_name.into(),
            message: message.into(),
        }
    }

    /// 是否只影響單一成品（其他成品可繼續計算）
    pub fn is_isolated(&self) -> bool {
        matches!(
            self,
            MrpError::CyclicBom { .. } | MrpError::BomDepthExceeded { .. }
        )
    }
}

impl From<serde_json::Error> for MrpError {
    fn from(err: serde_json::Error) -> Self {
        MrpError::Serialization(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, MrpError>;
