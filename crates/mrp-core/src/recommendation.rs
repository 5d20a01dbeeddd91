//! 採購建議模型

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::BomConsumption;

/// 優先級分層
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Priority {
    /// 訂購截止日已過
    P1Overdue,
    /// 今天必須下單
    P1OrderToday,
    /// 阻擋關鍵成品
    P2CriticalPath,
    /// 近期到期
    P3Soon,
    /// 按計劃
    P4Planned,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::P1Overdue => "P1_OVERDUE",
            Priority::P1OrderToday => "P1_ORDER_TODAY",
            Priority::P2CriticalPath => "P2_CRITICAL_PATH",
            Priority::P3Soon => "P3_SOON",
            Priority::P4Planned => "P4_PLANNED",
        }
    }

    /// 是否屬於近期（非 P4）
    pub fn is_near_term(&self) -> bool {
        *self != Priority::P4Planned
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 緊急度分數（越小越緊急）
///
/// 逾期項目一律為負值，未逾期項目一律不小於零。
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UrgencyScore(pub Decimal);

impl UrgencyScore {
    pub fn value(&self) -> Decimal {
        self.0
    }

    pub fn is_overdue(&self) -> bool {
        self.0 < Decimal::ZERO
    }
}

/// 建議的附加標記
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RecommendationFlag {
    /// 缺少供應商，需人工處理
    MissingVendor,
    /// 缺少庫存部位，以零庫存計算
    MissingInventory,
    /// 庫存快照過期
    StaleInventory,
    /// 預測信心度偏低
    LowForecastConfidence,
}

/// 採購建議（同一物料跨所有成品彙總）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PurchaseRecommendation {
    pub component_sku: String,

    /// 供應商（缺少時為 None 並標記人工處理）
    pub vendor_id: Option<String>,

    pub shortage_qty: Decimal,

    /// 建議訂購量
    pub suggested_order_qty: Decimal,

    pub unit_cost: Decimal,

    /// 預估金額 = 建議量 × 單價
    pub estimated_value: Decimal,

    pub urgency_score: UrgencyScore,

    pub priority: Priority,

    /// 訂購截止日
    pub order_by_date: NaiveDate,

    /// 距截止日天數（負值為逾期）
    pub days_until_deadline: i64,

    /// 距最早需求日天數
    pub days_until_needed: i64,

    /// 是否阻擋關鍵成品生產
    pub blocks_critical_builds: bool,

    pub consuming_boms: Vec<BomConsumption>,

    pub flags: Vec<RecommendationFlag>,
}

impl PurchaseRecommendation {
    pub fn has_flag(&self, flag: RecommendationFlag) -> bool {
        self.flags.contains(&flag)
    }

    /// 是否需要人工處理
    pub fn needs_manual_resolution(&self) -> bool {
        self.has_flag(RecommendationFlag::MissingVendor)
    }

    /// 是否為低信心建議
    pub fn is_low_confidence(&self) -> bool {
        self.has_flag(RecommendationFlag::StaleInventory)
            || self.has_flag(RecommendationFlag::LowForecastConfidence)
    }

    /// 加入標記（去重並保持排序）
    pub fn add_flag(&mut self, flag: RecommendationFlag) {
        if !self.flags.contains(&flag) {
            self.flags.push(flag);
            self.flags.sort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_priority_order() {
        assert!(Priority::P1Overdue < Priority::P1OrderToday);
        assert!(Priority::P2CriticalPath < Priority::P3Soon);
        assert!(Priority::P3Soon.is_near_term());
        assert!(!Priority::P4Planned.is_near_term());
        assert_eq!(Priority::P2CriticalPath.to_string(), "P2_CRITICAL_PATH");
    }

    #[test]
    fn test_priority_serialized_name() {
        let json = serde_json::to_string(&Priority::P1OrderToday).unwrap();
        assert_eq!(json, "\"P1_ORDER_TODAY\"");
    }

    #[test]
    fn test_urgency_score_order() {
        let overdue = UrgencyScore(Decimal::new(-15, 1));
        let today = UrgencyScore(Decimal::new(3, 1));

        assert!(overdue.is_overdue());
        assert!(!today.is_overdue());
        assert!(overdue < today);
    }
}
