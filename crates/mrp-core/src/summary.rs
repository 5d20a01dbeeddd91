//! 供應商彙總與計算摘要

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::{ExcludedForecasts, PlanIssue, Priority, RecomputeReason, RequirementStatus};

/// 可提前併單的物料
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PullForwardItem {
    pub component_sku: String,
    pub quantity: Decimal,
    pub value: Decimal,
    /// 現有庫存可支撐的天數（以計劃時界內的平均日耗用估算）
    pub days_of_stock: Option<i64>,
}

/// 併單機會
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsolidationOpportunity {
    pub vendor_id: String,
    /// 近期建議合計金額
    pub near_term_value: Decimal,
    /// 免運門檻
    pub threshold: Decimal,
    /// 距門檻差額
    pub gap: Decimal,
    /// 提前併入的物料
    pub pulled_forward: Vec<PullForwardItem>,
    /// 併單後合計
    pub combined_value: Decimal,
    /// 預估節省（省下的運費）
    pub estimated_savings: Decimal,
}

/// 供應商彙總
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VendorSummary {
    /// 供應商（None = 未指派，需人工處理）
    pub vendor_id: Option<String>,
    pub item_count: usize,
    pub total_units: Decimal,
    pub total_value: Decimal,
    pub earliest_order_by_date: NaiveDate,
    /// 最緊急項目距截止日的天數
    pub most_urgent_days_remaining: i64,
    /// 出現的優先級（去重、排序）
    pub priorities: Vec<Priority>,
    pub sku_list: Vec<String>,
    pub consolidation: Option<ConsolidationOpportunity>,
}

/// 單次計算摘要
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ComputationSummary {
    pub run_id: String,
    pub generation: u64,
    pub reasons: Vec<RecomputeReason>,
    pub horizon_weeks: u32,
    /// 期間不在計劃時界內而未納入的預測筆數
    pub excluded_forecasts: ExcludedForecasts,
    pub requirement_count: usize,
    pub recommendation_count: usize,
    pub counts_by_status: BTreeMap<RequirementStatus, usize>,
    pub counts_by_priority: BTreeMap<Priority, usize>,
    pub total_estimated_spend: Decimal,
    pub consolidation_savings: Decimal,
    pub duration_ms: u128,
    /// 跳過或標記的項目及原因
    pub issues: Vec<PlanIssue>,
    /// 被標記（需人工處理或低信心）的建議 SKU
    pub flagged_skus: Vec<String>,
    /// 使用到關鍵短缺物料的成品（反查 BOM）
    pub blocked_builds: Vec<String>,
}

impl ComputationSummary {
    /// 是否有嚴重錯誤（某些成品被跳過）
    pub fn has_errors(&self) -> bool {
        self.issues.iter().any(PlanIssue::is_error)
    }

    pub fn status_count(&self, status: RequirementStatus) -> usize {
        self.counts_by_status.get(&status).copied().unwrap_or(0)
    }

    pub fn priority_count(&self, priority: Priority) -> usize {
        self.counts_by_priority.get(&priority).copied().unwrap_or(0)
    }
}
