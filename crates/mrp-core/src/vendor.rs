//! 供應商資料與訂購量規則

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::InventoryPosition;

/// 供應商記錄（外部提供）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VendorRecord {
    pub vendor_id: String,

    #[serde(default)]
    pub name: String,

    /// 提前期覆寫（天）
    #[serde(default)]
    pub lead_time_days: Option<i64>,

    /// 最小訂購量覆寫
    #[serde(default)]
    pub minimum_order_qty: Option<Decimal>,

    /// 箱/棧板包裝數量
    #[serde(default)]
    pub case_pack_qty: Option<Decimal>,

    /// 是否必須整箱/整棧板訂購
    #[serde(default)]
    pub requires_case_pack: bool,

    /// 免運費門檻
    #[serde(default)]
    pub free_shipping_threshold: Option<Decimal>,

    /// 未達門檻時的運費
    #[serde(default)]
    pub shipping_cost: Decimal,
}

impl VendorRecord {
    /// 創建新的供應商記錄
    pub fn new(vendor_id: String, name: String) -> Self {
        Self {
            vendor_id,
            name,
            lead_time_days: None,
            minimum_order_qty: None,
            case_pack_qty: None,
            requires_case_pack: false,
            free_shipping_threshold: None,
            shipping_cost: Decimal::ZERO,
        }
    }

    /// 建構器模式：設置提前期覆寫
    pub fn with_lead_time_days(mut self, days: i64) -> Self {
        self.lead_time_days = Some(days);
        self
    }

    /// 建構器模式：設置最小訂購量覆寫
    pub fn with_minimum_order_qty(mut self, qty: Decimal) -> Self {
        self.minimum_order_qty = Some(qty);
        self
    }

    /// 建構器模式：要求整箱訂購
    pub fn with_case_pack(mut self, case_pack_qty: Option<Decimal>) -> Self {
        self.requires_case_pack = true;
        self.case_pack_qty = case_pack_qty;
        self
    }

    /// 建構器模式：設置免運門檻與運費
    pub fn with_free_shipping(mut self, threshold: Decimal, shipping_cost: Decimal) -> Self {
        self.free_shipping_threshold = Some(threshold);
        self.shipping_cost = shipping_cost;
        self
    }

    /// 有效提前期（供應商覆寫優先）
    pub fn effective_lead_time(&self, position: &InventoryPosition) -> i64 {
        self.lead_time_days.unwrap_or(position.lead_time_days)
    }

    /// 此供應商對該部位的訂購量規則
    pub fn order_rule(&self, position: &InventoryPosition) -> OrderQuantityRule {
        let minimum_order_qty = self
            .minimum_order_qty
            .unwrap_or(position.minimum_order_qty);

        let order_multiple = if self.requires_case_pack {
            self.case_pack_qty
                .filter(|q| *q > Decimal::ZERO)
                .or(Some(minimum_order_qty))
                .filter(|q| *q > Decimal::ZERO)
        } else {
            None
        };

        OrderQuantityRule {
            minimum_order_qty,
            order_multiple,
        }
    }
}

/// 訂購量規則
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderQuantityRule {
    /// 最小訂購量
    pub minimum_order_qty: Decimal,

    /// 訂購倍數（整箱/整棧板）
    pub order_multiple: Option<Decimal>,
}

impl OrderQuantityRule {
    /// 只有最小訂購量的規則（無供應商資料時使用）
    pub fn from_position(position: &InventoryPosition) -> Self {
        Self {
            minimum_order_qty: position.minimum_order_qty,
            order_multiple: None,
        }
    }

    /// 調整訂購量以符合規則
    pub fn adjust(&self, mut quantity: Decimal) -> Decimal {
        // 應用最小訂購量
        if quantity < self.minimum_order_qty {
            quantity = self.minimum_order_qty;
        }

        // 應用訂購倍數（向上取整）
        if let Some(multiple) = self.order_multiple {
            if multiple > Decimal::ZERO {
                let remainder = quantity % multiple;
                if remainder > Decimal::ZERO {
                    quantity = quantity - remainder + multiple;
                }
            }
        }

        quantity
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn position(moq: i64) -> InventoryPosition {
        InventoryPosition::new("RM-01".to_string(), Decimal::ZERO, 5)
            .with_minimum_order_qty(Decimal::from(moq))
    }

    #[rstest]
    #[case::below_moq(100, None, 30, 100)]
    #[case::above_moq(100, None, 130, 130)]
    #[case::case_pack_round_up(10, Some(24), 30, 48)]
    #[case::exact_case_pack(10, Some(24), 48, 48)]
    #[case::moq_then_case_pack(50, Some(24), 5, 72)]
    fn test_order_quantity_adjustment(
        #[case] moq: i64,
        #[case] case_pack: Option<i64>,
        #[case] shortage: i64,
        #[case] expected: i64,
    ) {
        let mut vendor = VendorRecord::new("V1".to_string(), "Acme".to_string());
        if let Some(pack) = case_pack {
            vendor = vendor.with_case_pack(Some(Decimal::from(pack)));
        }
        let rule = vendor.order_rule(&position(moq));

        assert_eq!(rule.adjust(Decimal::from(shortage)), Decimal::from(expected));
    }

    #[test]
    fn test_case_pack_falls_back_to_moq_multiple() {
        let vendor = VendorRecord::new("V1".to_string(), "Acme".to_string())
            .with_case_pack(None);
        let rule = vendor.order_rule(&position(100));

        // 123 應該調整為 200
        assert_eq!(rule.adjust(Decimal::from(123)), Decimal::from(200));
    }

    #[test]
    fn test_vendor_overrides() {
        let vendor = VendorRecord::new("V1".to_string(), "Acme".to_string())
            .with_lead_time_days(12)
            .with_minimum_order_qty(Decimal::from(500));
        let position = position(100);

        assert_eq!(vendor.effective_lead_time(&position), 12);
        assert_eq!(vendor.order_rule(&position).minimum_order_qty, Decimal::from(500));
    }
}
