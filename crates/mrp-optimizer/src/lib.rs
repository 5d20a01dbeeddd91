//! # MRP Optimizer
//!
//! 優化算法模組（供應商彙總與併單）

pub mod consolidation;

// Re-export 主要類型
pub use consolidation::VendorConsolidator;

use mrp_core::VendorSummary;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// 併單分析結果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsolidationReport {
    /// 各供應商彙總
    pub summaries: Vec<VendorSummary>,

    /// 所有併單機會的預估節省合計
    pub total_savings: Decimal,
}

impl ConsolidationReport {
    pub fn new(summaries: Vec<VendorSummary>) -> Self {
        let total_savings = summaries
            .iter()
            .filter_map(|s| s.consolidation.as_ref())
            .map(|c| c.estimated_savings)
            .sum();
        Self {
            summaries,
            total_savings,
        }
    }

    /// 有併單機會的供應商
    pub fn opportunities(&self) -> impl Iterator<Item = &VendorSummary> {
        self.summaries.iter().filter(|s| s.consolidation.is_some())
    }

    /// 查找某供應商的彙總（None = 未指派）
    pub fn summary_for(&self, vendor_id: Option<&str>) -> Option<&VendorSummary> {
        self.summaries
            .iter()
            .find(|s| s.vendor_id.as_deref() == vendor_id)
    }
}
