//! 成品需求彙總

use chrono::{Duration, NaiveDate};
use mrp_core::{DemandBucket, ExcludedForecasts, FinishedGoodForecast};
use std::collections::BTreeMap;

/// 需求期間長度（天）
pub const PERIOD_DAYS: i64 = 7;

/// 期間相對計劃時界的位置
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HorizonPlacement {
    Elapsed,
    Within,
    Beyond,
}

/// 需求彙總器
pub struct DemandAggregator;

impl DemandAggregator {
    /// 按 (成品, 期間) 彙總預測
    ///
    /// 只保留期間起始日落在 `[today - PERIOD_DAYS + 1, today + horizon_days)` 的記錄：
    /// 已完全結束的期間與超出時界的期間都會被排除並計數。同一鍵的多筆記錄合併為一桶。
    pub fn aggregate(
        forecasts: &[FinishedGoodForecast],
        today: NaiveDate,
        horizon_days: i64,
    ) -> (Vec<DemandBucket>, ExcludedForecasts) {
        let horizon_end = offset(today, horizon_days);
        let mut buckets: BTreeMap<(String, NaiveDate), DemandBucket> = BTreeMap::new();
        let mut excluded = ExcludedForecasts::default();

        for forecast in forecasts {
            match Self::placement(forecast.period_start, today, horizon_end) {
                HorizonPlacement::Elapsed => excluded.elapsed += 1,
                HorizonPlacement::Beyond => excluded.beyond_horizon += 1,
                HorizonPlacement::Within => buckets
                    .entry((forecast.finished_sku.clone(), forecast.period_start))
                    .or_insert_with(|| {
                        DemandBucket::new(forecast.finished_sku.clone(), forecast.period_start)
                    })
                    .absorb(forecast),
            }
        }

        if excluded.total() > 0 {
            tracing::debug!(
                "排除預測：已結束期間 {} 筆，超出時界 {} 筆",
                excluded.elapsed,
                excluded.beyond_horizon
            );
        }

        (buckets.into_values().collect(), excluded)
    }

    /// 期間相對計劃時界的位置
    pub fn placement(
        period_start: NaiveDate,
        today: NaiveDate,
        horizon_end: NaiveDate,
    ) -> HorizonPlacement {
        if offset(period_start, PERIOD_DAYS) <= today {
            HorizonPlacement::Elapsed
        } else if period_start >= horizon_end {
            HorizonPlacement::Beyond
        } else {
            HorizonPlacement::Within
        }
    }

    /// 期間是否在計劃時界內
    pub fn in_horizon(period_start: NaiveDate, today: NaiveDate, horizon_end: NaiveDate) -> bool {
        Self::placement(period_start, today, horizon_end) == HorizonPlacement::Within
    }
}

/// 日期加天數，超出可表示範圍時停在 `NaiveDate::MAX`
fn offset(date: NaiveDate, days: i64) -> NaiveDate {
    Duration::try_days(days)
        .and_then(|delta| date.checked_add_signed(delta))
        .unwrap_or(NaiveDate::MAX)
}
