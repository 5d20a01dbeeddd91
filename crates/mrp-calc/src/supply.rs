//! 供應面查詢（庫存部位 + 供應商）

use chrono::{DateTime, Utc};
use mrp_core::{InventoryPosition, InventorySnapshot, OrderQuantityRule, VendorRecord};
use rust_decimal::Decimal;
use std::collections::BTreeMap;

/// 物料與供應商的關聯狀態
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum VendorLink<'a> {
    /// 有首選供應商且資料存在
    Linked(&'a VendorRecord),
    /// 未指定首選供應商
    Unlinked,
    /// 指定了供應商但找不到其資料
    Dangling(&'a str),
}

impl<'a> VendorLink<'a> {
    pub fn vendor(&self) -> Option<&'a VendorRecord> {
        match self {
            VendorLink::Linked(vendor) => Some(vendor),
            _ => None,
        }
    }
}

/// 一次計算的供應面快照索引
pub struct SupplyContext<'a> {
    snapshot: &'a InventorySnapshot,
    positions: BTreeMap<&'a str, &'a InventoryPosition>,
    vendors: BTreeMap<&'a str, &'a VendorRecord>,
}

impl<'a> SupplyContext<'a> {
    pub fn new(snapshot: &'a InventorySnapshot, vendors: &'a [VendorRecord]) -> Self {
        Self {
            snapshot,
            positions: snapshot.by_sku(),
            vendors: vendors.iter().map(|v| (v.vendor_id.as_str(), v)).collect(),
        }
    }

    pub fn position(&self, sku: &str) -> Option<&'a InventoryPosition> {
        self.positions.get(sku).copied()
    }

    pub fn vendor(&self, vendor_id: &str) -> Option<&'a VendorRecord> {
        self.vendors.get(vendor_id).copied()
    }

    /// 所有庫存部位（依 SKU 排序）
    pub fn positions(&self) -> impl Iterator<Item = &'a InventoryPosition> + '_ {
        self.positions.values().copied()
    }

    /// 解析部位的供應商關聯
    pub fn vendor_link(&self, position: &'a InventoryPosition) -> VendorLink<'a> {
        match position.preferred_vendor_id.as_deref() {
            None => VendorLink::Unlinked,
            Some(id) => match self.vendor(id) {
                Some(vendor) => VendorLink::Linked(vendor),
                None => VendorLink::Dangling(id),
            },
        }
    }

    /// 有效提前期（無部位時為 0）
    pub fn lead_time_days(&self, sku: &str) -> i64 {
        match self.position(sku) {
            Some(position) => match self.vendor_link(position).vendor() {
                Some(vendor) => vendor.effective_lead_time(position),
                None => position.lead_time_days,
            },
            None => 0,
        }
    }

    /// 可用量（無部位時為 0）
    pub fn available_qty(&self, sku: &str) -> Decimal {
        self.position(sku)
            .map(InventoryPosition::available_qty)
            .unwrap_or(Decimal::ZERO)
    }

    /// 訂購量規則
    pub fn order_rule(&self, position: &'a InventoryPosition) -> OrderQuantityRule {
        match self.vendor_link(position).vendor() {
            Some(vendor) => vendor.order_rule(position),
            None => OrderQuantityRule::from_position(position),
        }
    }

    /// 部位資料年齡（小時）
    pub fn age_hours(&self, position: &InventoryPosition, now: DateTime<Utc>) -> i64 {
        self.snapshot.age_hours(position, now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vendor_resolution() {
        let snapshot = InventorySnapshot::new(
            Utc::now(),
            vec![
                InventoryPosition::new("RM-01".to_string(), Decimal::from(10), 5)
                    .with_preferred_vendor("V1".to_string()),
                InventoryPosition::new("RM-02".to_string(), Decimal::from(10), 5)
                    .with_preferred_vendor("GHOST".to_string()),
                InventoryPosition::new("RM-03".to_string(), Decimal::from(10), 5),
            ],
        );
        let vendors = vec![VendorRecord::new("V1".to_string(), "Acme".to_string())
            .with_lead_time_days(9)];
        let ctx = SupplyContext::new(&snapshot, &vendors);

        let rm01 = ctx.position("RM-01").unwrap();
        assert!(matches!(ctx.vendor_link(rm01), VendorLink::Linked(_)));
        assert_eq!(ctx.lead_time_days("RM-01"), 9);

        let rm02 = ctx.position("RM-02").unwrap();
        assert_eq!(ctx.vendor_link(rm02), VendorLink::Dangling("GHOST"));
        assert_eq!(ctx.lead_time_days("RM-02"), 5);

        let rm03 = ctx.position("RM-03").unwrap();
        assert_eq!(ctx.vendor_link(rm03), VendorLink::Unlinked);

        assert_eq!(ctx.lead_time_days("UNKNOWN"), 0);
        assert_eq!(ctx.available_qty("UNKNOWN"), Decimal::ZERO);
    }
}
