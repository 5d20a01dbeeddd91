//! 變更追蹤（記錄觸發待處理重算的原因）

use mrp_core::RecomputeReason;
use std::collections::BTreeSet;

/// 變更追蹤器
///
/// 被取代或載入失敗的計算不會清除原因，直到有一次計算成功發布。
#[derive(Debug, Default)]
pub struct DirtyTracker {
    pending: BTreeSet<RecomputeReason>,
}

impl DirtyTracker {
    /// 創建新的追蹤器
    pub fn new() -> Self {
        Self::default()
    }

    /// 記錄變更原因
    pub fn mark_dirty(&mut self, reason: RecomputeReason) {
        self.pending.insert(reason);
    }

    pub fn is_dirty(&self, reason: RecomputeReason) -> bool {
        self.pending.contains(&reason)
    }

    pub fn is_clean(&self) -> bool {
        self.pending.is_empty()
    }

    /// 待處理的原因（已排序）
    pub fn pending(&self) -> Vec<RecomputeReason> {
        self.pending.iter().copied().collect()
    }

    /// 取出並清除所有待處理原因
    pub fn take(&mut self) -> Vec<RecomputeReason> {
        std::mem::take(&mut self.pending).into_iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reasons_are_deduplicated_and_taken() {
        let mut tracker = DirtyTracker::new();
        assert!(tracker.is_clean());

        tracker.mark_dirty(RecomputeReason::InventoryChanged);
        tracker.mark_dirty(RecomputeReason::ForecastChanged);
        tracker.mark_dirty(RecomputeReason::InventoryChanged);

        assert!(tracker.is_dirty(RecomputeReason::InventoryChanged));
        assert!(!tracker.is_dirty(RecomputeReason::BomChanged));
        assert_eq!(
            tracker.pending(),
            vec![
                RecomputeReason::ForecastChanged,
                RecomputeReason::InventoryChanged
            ]
        );

        let taken = tracker.take();
        assert_eq!(taken.len(), 2);
        assert!(tracker.is_clean());
    }
}
