//! 計劃參數配置

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{MrpError, Result};

/// 計劃時界上限（週）
pub const MAX_HORIZON_WEEKS: u32 = 520;

/// 關鍵路徑加權上限（天）
pub const MAX_CRITICAL_PATH_BONUS_DAYS: i64 = 100_000;

/// 採購計劃參數
///
/// 緊急度權重與優先級天數門檻是經驗值，全部開放為配置。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlanningConfig {
    /// 計劃時界（週）
    pub horizon_weeks: u32,

    /// BOM 最大展開層級
    pub max_bom_depth: u32,

    /// 剩餘量超過需求量的幾倍視為過剩
    pub excess_multiple: Decimal,

    /// 「即將到期」視窗（天）
    pub soon_window_days: i64,

    /// 阻擋關鍵成品時的緊急度加權（天）
    pub critical_path_bonus_days: i64,

    /// 庫存快照新鮮度（小時）
    pub inventory_freshness_hours: i64,

    /// 預測信心度下限，低於此值的建議標記為低信心
    pub min_forecast_confidence: Decimal,

    /// 距離運費門檻多近算「差一點」（門檻的比例）
    pub consolidation_gap_ratio: Decimal,

    /// 工作執行緒數（0 = 使用所有核心）
    pub worker_threads: usize,

    /// 每批處理的成品數（取消檢查的粒度）
    pub sku_batch_size: usize,
}

impl PlanningConfig {
    /// 創建預設配置
    pub fn new() -> Self {
        Self {
            horizon_weeks: 13,
            max_bom_depth: 10,
            excess_multiple: Decimal::from(2),
            soon_window_days: 14,
            critical_path_bonus_days: 1000,
            inventory_freshness_hours: 24,
            min_forecast_confidence: Decimal::new(5, 1),
            consolidation_gap_ratio: Decimal::new(2, 1),
            worker_threads: 0,
            sku_batch_size: 32,
        }
    }

    /// 從 JSON 載入（缺少的欄位使用預設值）
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// 建構器模式：設置計劃時界
    pub fn with_horizon_weeks(mut self, weeks: u32) -> Self {
        self.horizon_weeks = weeks;
        self
    }

    /// 建構器模式：設置 BOM 最大層級
    pub fn with_max_bom_depth(mut self, depth: u32) -> Self {
        self.max_bom_depth = depth;
        self
    }

    /// 建構器模式：設置過剩倍數
    pub fn with_excess_multiple(mut self, multiple: Decimal) -> Self {
        self.excess_multiple = multiple;
        self
    }

    /// 建構器模式：設置即將到期視窗
    pub fn with_soon_window_days(mut self, days: i64) -> Self {
        self.soon_window_days = days;
        self
    }

    /// 建構器模式：設置關鍵路徑加權
    pub fn with_critical_path_bonus_days(mut self, days: i64) -> Self {
        self.critical_path_bonus_days = days;
        self
    }

    /// 建構器模式：設置庫存快照新鮮度
    pub fn with_inventory_freshness_hours(mut self, hours: i64) -> Self {
        self.inventory_freshness_hours = hours;
        self
    }

    /// 建構器模式：設置預測信心度下限
    pub fn with_min_forecast_confidence(mut self, confidence: Decimal) -> Self {
        self.min_forecast_confidence = confidence;
        self
    }

    /// 建構器模式：設置合併門檻比例
    pub fn with_consolidation_gap_ratio(mut self, ratio: Decimal) -> Self {
        self.consolidation_gap_ratio = ratio;
        self
    }

    /// 建構器模式：設置工作執行緒數
    pub fn with_worker_threads(mut self, threads: usize) -> Self {
        self.worker_threads = threads;
        self
    }

    /// 建構器模式：設置批次大小
    pub fn with_sku_batch_size(mut self, size: usize) -> Self {
        self.sku_batch_size = size;
        self
    }

    /// 計劃時界（天）
    pub fn horizon_days(&self) -> i64 {
        i64::from(self.horizon_weeks) * 7
    }

    /// 檢查配置是否合理
    pub fn validate(&self) -> Result<()> {
        if self.horizon_weeks == 0 || self.horizon_weeks > MAX_HORIZON_WEEKS {
            return Err(MrpError::InvalidConfig(format!(
                "horizon_weeks 必須介於 1 與 {} 之間，實際為 {}",
                MAX_HORIZON_WEEKS, self.horizon_weeks
            )));
        }
        if self.max_bom_depth == 0 {
            return Err(MrpError::InvalidConfig("max_bom_depth 必須大於 0".to_string()));
        }
        if self.excess_multiple < Decimal::ZERO {
            return Err(MrpError::InvalidConfig("excess_multiple 不可為負".to_string()));
        }
        if self.soon_window_days < 0 || self.critical_path_bonus_days < 0 {
            return Err(MrpError::InvalidConfig("天數門檻不可為負".to_string()));
        }
        if self.critical_path_bonus_days > MAX_CRITICAL_PATH_BONUS_DAYS {
            return Err(MrpError::InvalidConfig(format!(
                "critical_path_bonus_days 不可超過 {}",
                MAX_CRITICAL_PATH_BONUS_DAYS
            )));
        }
        if self.consolidation_gap_ratio < Decimal::ZERO
            || self.consolidation_gap_ratio > Decimal::ONE
        {
            return Err(MrpError::InvalidConfig(
                "consolidation_gap_ratio 必須介於 0 與 1 之間".to_string(),
            ));
        }
        if self.sku_batch_size == 0 {
            return Err(MrpError::InvalidConfig("sku_batch_size 必須大於 0".to_string()));
        }
        Ok(())
    }
}

impl Default for PlanningConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = PlanningConfig::default();

        assert_eq!(config.horizon_weeks, 13);
        assert_eq!(config.horizon_days(), 91);
        assert_eq!(config.max_bom_depth, 10);
        assert_eq!(config.excess_multiple, Decimal::from(2));
        assert_eq!(config.soon_window_days, 14);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_builder() {
        let config = PlanningConfig::new()
            .with_horizon_weeks(4)
            .with_soon_window_days(7)
            .with_worker_threads(2);

        assert_eq!(config.horizon_days(), 28);
        assert_eq!(config.soon_window_days, 7);
        assert_eq!(config.worker_threads, 2);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = PlanningConfig::from_json_str(r#"{ "horizon_weeks": 8 }"#).unwrap();

        assert_eq!(config.horizon_weeks, 8);
        assert_eq!(config.max_bom_depth, 10);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let err = PlanningConfig::from_json_str(r#"{ "sku_batch_size": 0 }"#).unwrap_err();
        assert!(matches!(err, MrpError::InvalidConfig(_)));

        let err = PlanningConfig::from_json_str("not json").unwrap_err();
        assert!(matches!(err, MrpError::Serialization(_)));
    }

    #[test]
    fn test_horizon_upper_bound() {
        assert!(PlanningConfig::new()
            .with_horizon_weeks(MAX_HORIZON_WEEKS)
            .validate()
            .is_ok());

        let err = PlanningConfig::new()
            .with_horizon_weeks(50_000_000)
            .validate()
            .unwrap_err();
        assert!(matches!(err, MrpError::InvalidConfig(_)));
    }

    #[test]
    fn test_bonus_upper_bound() {
        let err = PlanningConfig::new()
            .with_critical_path_bonus_days(i64::MAX)
            .validate()
            .unwrap_err();
        assert!(matches!(err, MrpError::InvalidConfig(_)));
    }
}
