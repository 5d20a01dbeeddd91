//! 緊急度評分

use mrp_core::{PurchaseRecommendation, UrgencyScore};
use rust_decimal::Decimal;

/// 緊急度評分器
///
/// 分數越小越緊急。整數部分來自距訂購截止日的天數：
/// - 逾期（天數 < 0）：`天數 - 加權`（阻擋關鍵成品時再扣加權），恆為負值
/// - 未逾期：`天數 + 加權`（不阻擋關鍵成品時才加），恆不小於零
///
/// 小數部分 `1 / (2 + 短缺量)` 落在 (0, 0.5]，短缺越大越緊急，
/// 且不會跨越整數邊界，所以逾期項目永遠排在未逾期項目之前。
pub struct UrgencyScorer;

impl UrgencyScorer {
    /// 計算緊急度
    pub fn score(
        days_until_deadline: i64,
        blocks_critical_builds: bool,
        shortage_qty: Decimal,
        critical_path_bonus_days: i64,
    ) -> UrgencyScore {
        let bonus = critical_path_bonus_days.max(0);
        let base = if days_until_deadline < 0 {
            if blocks_critical_builds {
                days_until_deadline - bonus
            } else {
                days_until_deadline
            }
        } else if blocks_critical_builds {
            days_until_deadline
        } else {
            days_until_deadline + bonus
        };

        let shortage = shortage_qty.max(Decimal::ZERO);
        let tie_break = Decimal::ONE / (Decimal::TWO + shortage);

        UrgencyScore(Decimal::from(base) + tie_break)
    }

    /// 依緊急度排序（同分時依 SKU）
    pub fn rank(recommendations: &mut [PurchaseRecommendation]) {
        recommendations.sort_by(|a, b| {
            a.urgency_score
                .cmp(&b.urgency_score)
                .then_with(|| a.component_sku.cmp(&b.component_sku))
        });
    }
}
