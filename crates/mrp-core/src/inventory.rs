//! 庫存部位模型（外部提供，唯讀）

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// 單一 SKU 的庫存部位
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventoryPosition {
    /// SKU
    pub sku: String,

    /// 現有庫存
    pub on_hand_qty: Decimal,

    /// 在途（已下單未到貨）
    #[serde(default)]
    pub on_order_qty: Decimal,

    /// 再訂購點
    #[serde(default)]
    pub reorder_point: Decimal,

    /// 單位成本
    #[serde(default)]
    pub unit_cost: Decimal,

    /// 採購提前期（天）
    #[serde(default)]
    pub lead_time_days: i64,

    /// 最小訂購量
    #[serde(default)]
    pub minimum_order_qty: Decimal,

    /// 首選供應商
    #[serde(default)]
    pub preferred_vendor_id: Option<String>,

    /// 最後盤點時間（未提供時沿用快照時間）
    #[serde(default)]
    pub counted_at: Option<DateTime<Utc>>,
}

impl InventoryPosition {
    /// 創建新的庫存部位
    pub fn new(sku: String, on_hand_qty: Decimal, lead_time_days: i64) -> Self {
        Self {
            sku,
            on_hand_qty,
            on_order_qty: Decimal::ZERO,
            reorder_point: Decimal::ZERO,
            unit_cost: Decimal::ZERO,
            lead_time_days,
            minimum_order_qty: Decimal::ZERO,
            preferred_vendor_id: None,
            counted_at: None,
        }
    }

    /// 建構器模式：設置在途數量
    pub fn with_on_order_qty(mut self, qty: Decimal) -> Self {
        self.on_order_qty = qty;
        self
    }

    /// 建構器模式：設置再訂購點
    pub fn with_reorder_point(mut self, qty: Decimal) -> Self {
        self.reorder_point = qty;
        self
    }

    /// 建構器模式：設置單位成本
    pub fn with_unit_cost(mut self, cost: Decimal) -> Self {
        self.unit_cost = cost;
        self
    }

    /// 建構器模式：設置最小訂購量
    pub fn with_minimum_order_qty(mut self, qty: Decimal) -> Self {
        self.minimum_order_qty = qty;
        self
    }

    /// 建構器模式：設置首選供應商
    pub fn with_preferred_vendor(mut self, vendor_id: String) -> Self {
        self.preferred_vendor_id = Some(vendor_id);
        self
    }

    /// 建構器模式：設置盤點時間
    pub fn with_counted_at(mut self, counted_at: DateTime<Utc>) -> Self {
        self.counted_at = Some(counted_at);
        self
    }

    /// 可用量 = 現有 + 在途
    pub fn available_qty(&self) -> Decimal {
        self.on_hand_qty + self.on_order_qty
    }

    /// 是否低於再訂購點
    pub fn is_below_reorder_point(&self) -> bool {
        self.available_qty() < self.reorder_point
    }
}

/// 某一時點的庫存快照
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InventorySnapshot {
    /// 快照時間
    pub captured_at: DateTime<Utc>,
    pub positions: Vec<InventoryPosition>,
}

impl InventorySnapshot {
    pub fn new(captured_at: DateTime<Utc>, positions: Vec<InventoryPosition>) -> Self {
        Self {
            captured_at,
            positions,
        }
    }

    /// 以 SKU 建立索引（同一 SKU 重複時後者為準）
    pub fn by_sku(&self) -> BTreeMap<&str, &InventoryPosition> {
        self.positions
            .iter()
            .map(|p| (p.sku.as_str(), p))
            .collect()
    }

    /// 某部位相對於 `now` 的資料年齡（小時）
    pub fn age_hours(&self, position: &InventoryPosition, now: DateTime<Utc>) -> i64 {
        let counted_at = position.counted_at.unwrap_or(self.captured_at);
        (now - counted_at).num_hours()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    #[test]
    fn test_available_qty() {
        let position = InventoryPosition::new("RM-01".to_string(), Decimal::from(40), 5)
            .with_on_order_qty(Decimal::from(25))
            .with_reorder_point(Decimal::from(80));

        assert_eq!(position.available_qty(), Decimal::from(65));
        assert!(position.is_below_reorder_point());
    }

    #[test]
    fn test_snapshot_age() {
        let captured = Utc.with_ymd_and_hms(2025, 11, 1, 8, 0, 0).unwrap();
        let now = captured + Duration::hours(30);

        let fresh = InventoryPosition::new("RM-01".to_string(), Decimal::ONE, 1)
            .with_counted_at(now - Duration::hours(2));
        let stale = InventoryPosition::new("RM-02".to_string(), Decimal::ONE, 1);

        let snapshot = InventorySnapshot::new(captured, vec![fresh.clone(), stale.clone()]);

        assert_eq!(snapshot.age_hours(&fresh, now), 2);
        assert_eq!(snapshot.age_hours(&stale, now), 30);
        assert_eq!(snapshot.by_sku().len(), 2);
    }
}
