//! 優先級分層

use chrono::NaiveDate;
use mrp_core::{PlanningConfig, Priority};

/// 優先級分類器
///
/// 純函數：相同的 (截止日天數, 是否阻擋關鍵成品, 今天) 必得相同結果。
pub struct PriorityClassifier;

impl PriorityClassifier {
    /// 以訂購截止日與今天分類
    pub fn classify(
        order_by_date: NaiveDate,
        today: NaiveDate,
        blocks_critical_builds: bool,
        config: &PlanningConfig,
    ) -> Priority {
        let days_until_deadline = (order_by_date - today).num_days();
        Self::classify_days(days_until_deadline, blocks_critical_builds, config)
    }

    /// 以距截止日天數分類
    pub fn classify_days(
        days_until_deadline: i64,
        blocks_critical_builds: bool,
        config: &PlanningConfig,
    ) -> Priority {
        if days_until_deadline < 0 {
            Priority::P1Overdue
        } else if days_until_deadline == 0 {
            Priority::P1OrderToday
        } else if blocks_critical_builds && days_until_deadline <= config.horizon_days() {
            Priority::P2CriticalPath
        } else if days_until_deadline <= config.soon_window_days {
            Priority::P3Soon
        } else {
            Priority::P4Planned
        }
    }
}
