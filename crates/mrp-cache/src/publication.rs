//! 計算結果的原子發布

use chrono::{DateTime, Utc};
use mrp_core::{ComponentRequirement, ComputationSummary, PurchaseRecommendation, VendorSummary};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, PoisonError, RwLock};

/// 一次完整發布的結果集
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PublishedPlan {
    /// 計算世代（0 = 尚未發布）
    pub generation: u64,

    pub published_at: Option<DateTime<Utc>>,

    pub requirements: Vec<ComponentRequirement>,

    pub recommendations: Vec<PurchaseRecommendation>,

    pub vendor_summaries: Vec<VendorSummary>,

    pub summary: ComputationSummary,
}

impl PublishedPlan {
    pub fn is_empty(&self) -> bool {
        self.generation == 0
    }

    /// 查找某物料的需求
    pub fn requirement(&self, component_sku: &str) -> Option<&ComponentRequirement> {
        self.requirements
            .iter()
            .find(|r| r.component_sku == component_sku)
    }

    /// 查找某物料的建議
    pub fn recommendation(&self, component_sku: &str) -> Option<&PurchaseRecommendation> {
        self.recommendations
            .iter()
            .find(|r| r.component_sku == component_sku)
    }

    /// 查找某供應商的彙總（None = 未指派）
    pub fn vendor_summary(&self, vendor_id: Option<&str>) -> Option<&VendorSummary> {
        self.vendor_summaries
            .iter()
            .find(|s| s.vendor_id.as_deref() == vendor_id)
    }
}

/// 發布存放區
///
/// 讀者拿到的是整份結果的 `Arc`，發布只替換指標，不會看到新舊混合的狀態。
#[derive(Debug, Default)]
pub struct PlanStore {
    current: RwLock<Arc<PublishedPlan>>,
}

impl PlanStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 目前已發布的結果
    pub fn current(&self) -> Arc<PublishedPlan> {
        let guard = self.current.read().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&guard)
    }

    pub fn generation(&self) -> u64 {
        self.current().generation
    }

    /// 發布新結果
    ///
    /// 若已有相同或更新世代的結果則拒絕，回傳 false。
    pub fn publish(&self, plan: PublishedPlan) -> bool {
        let mut guard = self.current.write().unwrap_or_else(PoisonError::into_inner);
        if plan.generation <= guard.generation {
            tracing::debug!(
                "拒絕發布世代 {}：已發布世代 {}",
                plan.generation,
                guard.generation
            );
            return false;
        }

        tracing::info!("發布世代 {} 的採購計劃", plan.generation);
        *guard = Arc::new(plan);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plan(generation: u64) -> PublishedPlan {
        PublishedPlan {
            generation,
            published_at: Some(Utc::now()),
            ..PublishedPlan::default()
        }
    }

    #[test]
    fn test_store_starts_empty() {
        let store = PlanStore::new();
        assert!(store.current().is_empty());
        assert_eq!(store.generation(), 0);
    }

    #[test]
    fn test_older_generation_is_refused() {
        let store = PlanStore::new();
        assert!(store.publish(plan(2)));
        assert!(!store.publish(plan(1)));
        assert!(!store.publish(plan(2)));
        assert_eq!(store.generation(), 2);
    }

    #[test]
    fn test_readers_keep_their_snapshot() {
        let store = PlanStore::new();
        store.publish(plan(1));
        let before = store.current();

        store.publish(plan(3));

        assert_eq!(before.generation, 1);
        assert_eq!(store.current().generation, 3);
    }
}
