//! 成品需求預測模型

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// 成品預測（每次匯入一筆，不可變）
///
/// 同一 (成品, 期間) 的多筆記錄是累加關係，新訊號不會覆蓋舊的期間合計。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinishedGoodForecast {
    /// 成品 SKU
    pub finished_sku: String,

    /// 期間起始日
    pub period_start: NaiveDate,

    /// 基礎預測量
    pub base_forecast_qty: Decimal,

    /// 已接訂單需求
    #[serde(default)]
    pub sales_order_demand_qty: Decimal,

    /// 安全庫存目標
    #[serde(default)]
    pub safety_stock_qty: Decimal,

    /// 促銷增量
    #[serde(default)]
    pub promotional_lift_qty: Decimal,

    /// 季節指數
    #[serde(default = "default_seasonal_index")]
    pub seasonal_index: Decimal,

    /// 預測信心度（0-1）
    #[serde(default = "default_confidence")]
    pub confidence: Decimal,
}

fn default_seasonal_index() -> Decimal {
    Decimal::ONE
}

fn default_confidence() -> Decimal {
    Decimal::ONE
}

impl FinishedGoodForecast {
    /// 創建新的預測記錄
    pub fn new(finished_sku: String, period_start: NaiveDate, base_forecast_qty: Decimal) -> Self {
        Self {
            finished_sku,
            period_start,
            base_forecast_qty,
            sales_order_demand_qty: Decimal::ZERO,
            safety_stock_qty: Decimal::ZERO,
            promotional_lift_qty: Decimal::ZERO,
            seasonal_index: Decimal::ONE,
            confidence: Decimal::ONE,
        }
    }

    /// 建構器模式：設置已接訂單需求
    pub fn with_sales_order_demand(mut self, qty: Decimal) -> Self {
        self.sales_order_demand_qty = qty;
        self
    }

    /// 建構器模式：設置安全庫存目標
    pub fn with_safety_stock(mut self, qty: Decimal) -> Self {
        self.safety_stock_qty = qty;
        self
    }

    /// 建構器模式：設置促銷增量
    pub fn with_promotional_lift(mut self, qty: Decimal) -> Self {
        self.promotional_lift_qty = qty;
        self
    }

    /// 建構器模式：設置季節指數
    pub fn with_seasonal_index(mut self, index: Decimal) -> Self {
        self.seasonal_index = index;
        self
    }

    /// 建構器模式：設置信心度
    pub fn with_confidence(mut self, confidence: Decimal) -> Self {
        self.confidence = confidence;
        self
    }

    /// 單筆記錄的毛需求
    ///
    /// `max(基礎 + 訂單 + 促銷, 安全庫存) × 季節指數`
    pub fn gross_requirement(&self) -> Decimal {
        let signal =
            self.base_forecast_qty + self.sales_order_demand_qty + self.promotional_lift_qty;
        signal.max(self.safety_stock_qty) * self.seasonal_index
    }
}

/// 彙總後的成品需求桶（每個成品、每個期間一筆）
///
/// 同鍵記錄先把各數量欄位加總，再套用一次
/// `max(基礎 + 訂單 + 促銷, 安全庫存) × 季節指數`。
/// 季節指數取各記錄依需求訊號量加權的平均；訊號量全為零時取算術平均。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DemandBucket {
    pub finished_sku: String,
    pub period_start: NaiveDate,
    /// 需求訊號合計（基礎 + 訂單 + 促銷）
    pub signal_qty: Decimal,
    /// 安全庫存目標合計
    pub safety_stock_qty: Decimal,
    /// 毛需求
    pub gross_requirement: Decimal,
    /// 構成此桶的最低預測信心度
    pub confidence: Decimal,
    /// 合併的記錄筆數
    pub record_count: usize,
    #[serde(skip)]
    weighted_seasonal: Decimal,
    #[serde(skip)]
    seasonal_total: Decimal,
}

impl DemandBucket {
    pub fn new(finished_sku: String, period_start: NaiveDate) -> Self {
        Self {
            finished_sku,
            period_start,
            signal_qty: Decimal::ZERO,
            safety_stock_qty: Decimal::ZERO,
            gross_requirement: Decimal::ZERO,
            confidence: Decimal::ONE,
            record_count: 0,
            weighted_seasonal: Decimal::ZERO,
            seasonal_total: Decimal::ZERO,
        }
    }

    /// 累加一筆預測並重算毛需求
    pub fn absorb(&mut self, forecast: &FinishedGoodForecast) {
        let signal = forecast.base_forecast_qty
            + forecast.sales_order_demand_qty
            + forecast.promotional_lift_qty;

        self.signal_qty += signal;
        self.safety_stock_qty += forecast.safety_stock_qty;
        self.weighted_seasonal += signal * forecast.seasonal_index;
        self.seasonal_total += forecast.seasonal_index;
        self.confidence = self.confidence.min(forecast.confidence);
        self.record_count += 1;

        self.gross_requirement = self.signal_qty.max(self.safety_stock_qty) * self.seasonal_index();
    }

    /// 合併後的季節指數
    pub fn seasonal_index(&self) -> Decimal {
        if !self.signal_qty.is_zero() {
            self.weighted_seasonal / self.signal_qty
        } else if self.record_count > 0 {
            self.seasonal_total / Decimal::from(self.record_count)
        } else {
            Decimal::ONE
        }
    }
}

/// 因期間不在計劃時界內而未納入計算的預測筆數
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExcludedForecasts {
    /// 期間已完全結束
    pub elapsed: usize,
    /// 期間起始日超出時界
    pub beyond_horizon: usize,
}

impl ExcludedForecasts {
    pub fn total(&self) -> usize {
        self.elapsed + self.beyond_horizon
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn week() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 11, 3).unwrap()
    }

    #[test]
    fn test_gross_requirement_signal_wins() {
        let forecast = FinishedGoodForecast::new("FG-100".to_string(), week(), Decimal::from(40))
            .with_sales_order_demand(Decimal::from(15))
            .with_promotional_lift(Decimal::from(5))
            .with_safety_stock(Decimal::from(30));

        // max(40 + 15 + 5, 30) × 1
        assert_eq!(forecast.gross_requirement(), Decimal::from(60));
    }

    #[test]
    fn test_gross_requirement_safety_stock_floor() {
        let forecast = FinishedGoodForecast::new("FG-100".to_string(), week(), Decimal::from(10))
            .with_safety_stock(Decimal::from(25))
            .with_seasonal_index(Decimal::new(12, 1));

        // max(10, 25) × 1.2 = 30
        assert_eq!(forecast.gross_requirement(), Decimal::from(30));
    }

    #[test]
    fn test_bucket_absorbs_records() {
        let mut bucket = DemandBucket::new("FG-100".to_string(), week());
        bucket.absorb(&FinishedGoodForecast::new("FG-100".to_string(), week(), Decimal::from(50)));
        bucket.absorb(
            &FinishedGoodForecast::new("FG-100".to_string(), week(), Decimal::from(20))
                .with_confidence(Decimal::new(4, 1)),
        );

        assert_eq!(bucket.gross_requirement, Decimal::from(70));
        assert_eq!(bucket.confidence, Decimal::new(4, 1));
        assert_eq!(bucket.record_count, 2);
    }

    #[test]
    fn test_safety_floor_applies_once_per_key() {
        let mut bucket = DemandBucket::new("FG-100".to_string(), week());
        bucket.absorb(&FinishedGoodForecast::new("FG-100".to_string(), week(), Decimal::from(50)));
        bucket.absorb(
            &FinishedGoodForecast::new("FG-100".to_string(), week(), Decimal::ZERO)
                .with_safety_stock(Decimal::from(40)),
        );

        // max(50, 40)，安全庫存不是額外的需求
        assert_eq!(bucket.gross_requirement, Decimal::from(50));
        assert_eq!(bucket.safety_stock_qty, Decimal::from(40));
    }

    #[test]
    fn test_safety_floor_wins_over_summed_signal() {
        let mut bucket = DemandBucket::new("FG-100".to_string(), week());
        bucket.absorb(&FinishedGoodForecast::new("FG-100".to_string(), week(), Decimal::from(10)));
        bucket.absorb(
            &FinishedGoodForecast::new("FG-100".to_string(), week(), Decimal::from(15))
                .with_safety_stock(Decimal::from(30)),
        );

        assert_eq!(bucket.gross_requirement, Decimal::from(30));
    }

    #[test]
    fn test_seasonal_index_weighted_by_signal() {
        let mut bucket = DemandBucket::new("FG-100".to_string(), week());
        bucket.absorb(
            &FinishedGoodForecast::new("FG-100".to_string(), week(), Decimal::from(30))
                .with_seasonal_index(Decimal::from(2)),
        );
        bucket.absorb(&FinishedGoodForecast::new("FG-100".to_string(), week(), Decimal::from(10)));

        // (30 × 2 + 10 × 1) / 40 = 1.75
        assert_eq!(bucket.seasonal_index(), Decimal::new(175, 2));
        assert_eq!(bucket.gross_requirement, Decimal::from(70));
    }

    #[test]
    fn test_seasonal_index_without_signal_is_plain_mean() {
        let mut bucket = DemandBucket::new("FG-100".to_string(), week());
        bucket.absorb(
            &FinishedGoodForecast::new("FG-100".to_string(), week(), Decimal::ZERO)
                .with_safety_stock(Decimal::from(20))
                .with_seasonal_index(Decimal::new(12, 1)),
        );
        bucket.absorb(
            &FinishedGoodForecast::new("FG-100".to_string(), week(), Decimal::ZERO)
                .with_seasonal_index(Decimal::new(8, 1)),
        );

        // max(0, 20) × (1.2 + 0.8) / 2
        assert_eq!(bucket.gross_requirement, Decimal::from(20));
    }
}
