//! 重算觸發

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 觸發原因
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecomputeReason {
    ForecastChanged,
    InventoryChanged,
    BomChanged,
    Manual,
}

/// 重算請求
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecomputeRequest {
    pub reason: RecomputeReason,

    /// 計劃時界（週）
    pub horizon_weeks: u32,

    /// 計算基準時間（「今天」取其日期）
    pub now: DateTime<Utc>,
}

impl RecomputeRequest {
    /// 創建新的重算請求（預設 13 週）
    pub fn new(reason: RecomputeReason, now: DateTime<Utc>) -> Self {
        Self {
            reason,
            horizon_weeks: 13,
            now,
        }
    }

    /// 建構器模式：設置計劃時界
    pub fn with_horizon_weeks(mut self, weeks: u32) -> Self {
        self.horizon_weeks = weeks;
        self
    }
}
