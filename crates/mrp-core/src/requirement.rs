//! 物料需求模型（每次計算重新產生，不作為資料來源）

use chrono::{Duration, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// 可接受的最長提前期（天），超出者在沖銷時截斷
pub const MAX_LEAD_TIME_DAYS: i64 = 3650;

/// 需求狀態
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RequirementStatus {
    /// 短缺且今天下單也來不及
    Critical,
    /// 短缺但仍有時間下單
    Shortage,
    /// 足夠
    Covered,
    /// 剩餘量過多
    Excess,
}

impl RequirementStatus {
    /// 是否需要產生採購建議
    pub fn needs_purchase(&self) -> bool {
        matches!(self, RequirementStatus::Critical | RequirementStatus::Shortage)
    }
}

/// 某成品對此物料的耗用
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BomConsumption {
    pub finished_sku: String,
    pub required_qty: Decimal,
    pub earliest_need_date: NaiveDate,
    /// 耗用此物料的需求中最低的預測信心度
    pub min_confidence: Decimal,
}

impl BomConsumption {
    /// 合併另一筆同一成品的耗用
    pub fn merge(&mut self, other: &BomConsumption) {
        self.required_qty += other.required_qty;
        self.earliest_need_date = self.earliest_need_date.min(other.earliest_need_date);
        self.min_confidence = self.min_confidence.min(other.min_confidence);
    }
}

/// 物料需求（彙總所有耗用成品後的淨需求）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentRequirement {
    /// 最早需要此物料的成品
    pub parent_sku: String,

    pub component_sku: String,

    /// 毛需求
    pub required_qty: Decimal,

    /// 可用量（現有 + 在途）
    pub available_qty: Decimal,

    /// 短缺量 = max(0, 需求 - 可用)
    pub shortage_qty: Decimal,

    /// 剩餘量 = max(0, 可用 - 需求)
    pub surplus_qty: Decimal,

    pub earliest_need_date: NaiveDate,

    /// 距最早需求日的天數（負值表示已過）
    pub days_until_needed: i64,

    /// 有效提前期（天）
    pub lead_time_days: i64,

    pub status: RequirementStatus,

    /// 耗用此物料的成品（依成品 SKU 排序）
    pub consuming_boms: Vec<BomConsumption>,
}

impl ComponentRequirement {
    /// 依需求與可用量計算短缺/剩餘
    pub fn net(required_qty: Decimal, available_qty: Decimal) -> (Decimal, Decimal) {
        let shortage = (required_qty - available_qty).max(Decimal::ZERO);
        let surplus = (available_qty - required_qty).max(Decimal::ZERO);
        (shortage, surplus)
    }

    /// 訂購截止日 = 最早需求日 - 提前期
    ///
    /// 超出日期範圍時停在 `NaiveDate::MIN` / `NaiveDate::MAX`。
    pub fn order_by_date(&self) -> NaiveDate {
        Duration::try_days(self.lead_time_days)
            .and_then(|lead_time| self.earliest_need_date.checked_sub_signed(lead_time))
            .unwrap_or(if self.lead_time_days >= 0 {
                NaiveDate::MIN
            } else {
                NaiveDate::MAX
            })
    }

    pub fn has_shortage(&self) -> bool {
        self.shortage_qty > Decimal::ZERO
    }

    /// 最低預測信心度
    pub fn min_confidence(&self) -> Decimal {
        self.consuming_boms
            .iter()
            .map(|c| c.min_confidence)
            .min()
            .unwrap_or(Decimal::ONE)
    }
}
