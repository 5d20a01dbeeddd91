//! 淨需求計算

use chrono::NaiveDate;
use mrp_core::{
    BomConsumption, ComponentRequirement, IssueKind, PlanIssue, RequirementStatus,
    MAX_LEAD_TIME_DAYS,
};
use rust_decimal::Decimal;
use std::collections::BTreeMap;

use crate::supply::SupplyContext;

/// 單一物料的累計毛需求
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ComponentDemand {
    pub required_qty: Decimal,
    /// 依成品 SKU 分列的耗用
    pub consumptions: BTreeMap<String, BomConsumption>,
}

impl ComponentDemand {
    fn absorb(&mut self, consumption: BomConsumption) {
        self.required_qty += consumption.required_qty;
        match self.consumptions.get_mut(&consumption.finished_sku) {
            Some(existing) => existing.merge(&consumption),
            None => {
                self.consumptions
                    .insert(consumption.finished_sku.clone(), consumption);
            }
        }
    }
}

/// 物料需求累加器
///
/// 各工作執行緒各自累加，最後以 `merge` 合併；合併滿足結合律與交換律，
/// 因此排程順序不影響結果。
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ComponentAccumulator {
    components: BTreeMap<String, ComponentDemand>,
}

impl ComponentAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// 累加一筆成品對物料的耗用
    pub fn add(
        &mut self,
        component_sku: &str,
        finished_sku: &str,
        quantity: Decimal,
        need_date: NaiveDate,
        confidence: Decimal,
    ) {
        if quantity.is_zero() {
            return;
        }
        self.components
            .entry(component_sku.to_string())
            .or_default()
            .absorb(BomConsumption {
                finished_sku: finished_sku.to_string(),
                required_qty: quantity,
                earliest_need_date: need_date,
                min_confidence: confidence,
            });
    }

    /// 合併兩個累加器
    pub fn merge(self, other: Self) -> Self {
        let (mut larger, smaller) = if self.components.len() >= other.components.len() {
            (self, other)
        } else {
            (other, self)
        };

        for (sku, demand) in smaller.components {
            let target = larger.components.entry(sku).or_default();
            for consumption in demand.consumptions.into_values() {
                target.absorb(consumption);
            }
        }
        larger
    }

    pub fn get(&self, component_sku: &str) -> Option<&ComponentDemand> {
        self.components.get(component_sku)
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    pub fn into_components(self) -> BTreeMap<String, ComponentDemand> {
        self.components
    }
}

/// 淨需求計算器
pub struct RequirementCalculator;

impl RequirementCalculator {
    /// 將累計毛需求對庫存部位沖銷
    ///
    /// 缺少庫存部位的物料以零供應、零提前期計算並記錄問題。
    pub fn calculate(
        accumulated: ComponentAccumulator,
        supply: &SupplyContext<'_>,
        today: NaiveDate,
        excess_multiple: Decimal,
    ) -> (Vec<ComponentRequirement>, Vec<PlanIssue>) {
        let mut requirements = Vec::with_capacity(accumulated.len());
        let mut issues = Vec::new();

        for (component_sku, demand) in accumulated.into_components() {
            if supply.position(&component_sku).is_none() {
                issues.push(PlanIssue::warning(
                    IssueKind::MissingInventoryPosition,
                    component_sku.clone(),
                    "庫存快照中找不到此物料，以零庫存計算".to_string(),
                ));
            }

            let available_qty = supply.available_qty(&component_sku);
            let (lead_time_days, lead_time_issue) =
                Self::bounded_lead_time(&component_sku, supply.lead_time_days(&component_sku));
            issues.extend(lead_time_issue);
            let (shortage_qty, surplus_qty) =
                ComponentRequirement::net(demand.required_qty, available_qty);

            let consuming_boms: Vec<BomConsumption> = demand.consumptions.into_values().collect();
            let Some(first) = consuming_boms
                .iter()
                .min_by(|a, b| {
                    a.earliest_need_date
                        .cmp(&b.earliest_need_date)
                        .then_with(|| a.finished_sku.cmp(&b.finished_sku))
                })
            else {
                continue;
            };
            let earliest_need_date = first.earliest_need_date;
            let parent_sku = first.finished_sku.clone();
            let days_until_needed = (earliest_need_date - today).num_days();

            let status = Self::classify(
                demand.required_qty,
                shortage_qty,
                surplus_qty,
                days_until_needed,
                lead_time_days,
                excess_multiple,
            );

            tracing::debug!(
                "物料 {}: 需求 {}, 可用 {}, 短缺 {}, 狀態 {:?}",
                component_sku,
                demand.required_qty,
                available_qty,
                shortage_qty,
                status
            );

            requirements.push(ComponentRequirement {
                parent_sku,
                component_sku,
                required_qty: demand.required_qty,
                available_qty,
                shortage_qty,
                surplus_qty,
                earliest_need_date,
                days_until_needed,
                lead_time_days,
                status,
                consuming_boms,
            });
        }

        (requirements, issues)
    }

    /// 提前期須落在 `0..=MAX_LEAD_TIME_DAYS`，超出時截斷並附上問題記錄
    fn bounded_lead_time(component_sku: &str, lead_time_days: i64) -> (i64, Option<PlanIssue>) {
        let clamped = lead_time_days.clamp(0, MAX_LEAD_TIME_DAYS);
        if clamped == lead_time_days {
            return (lead_time_days, None);
        }
        let issue = PlanIssue::warning(
            IssueKind::InvalidLeadTime,
            component_sku,
            format!(
                "提前期 {} 天超出 0 至 {} 天，以 {} 天計算",
                lead_time_days, MAX_LEAD_TIME_DAYS, clamped
            ),
        );
        (clamped, Some(issue))
    }

    /// 判定需求狀態
    ///
    /// 短缺時依「今天下單是否來得及」區分 CRITICAL / SHORTAGE；
    /// 無短缺時剩餘量超過需求的 `excess_multiple` 倍為 EXCESS，否則 COVERED。
    pub fn classify(
        required_qty: Decimal,
        shortage_qty: Decimal,
        surplus_qty: Decimal,
        days_until_needed: i64,
        lead_time_days: i64,
        excess_multiple: Decimal,
    ) -> RequirementStatus {
        if shortage_qty > Decimal::ZERO {
            if days_until_needed <= lead_time_days {
                RequirementStatus::Critical
            } else {
                RequirementStatus::Shortage
            }
        } else if surplus_qty > excess_multiple * required_qty {
            RequirementStatus::Excess
        } else {
            RequirementStatus::Covered
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use mrp_core::{InventoryPosition, InventorySnapshot};
    use proptest::prelude::*;
    use rstest::rstest;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 11, 3).unwrap()
    }

    fn snapshot(positions: Vec<InventoryPosition>) -> InventorySnapshot {
        InventorySnapshot::new(Utc::now(), positions)
    }

    #[test]
    fn test_single_component_shortage() {
        let mut acc = ComponentAccumulator::new();
        acc.add("RM-01", "FG-100", Decimal::from(100), today() + Duration::days(3), Decimal::ONE);

        let snapshot = snapshot(vec![InventoryPosition::new(
            "RM-01".to_string(),
            Decimal::from(40),
            5,
        )]);
        let ctx = SupplyContext::new(&snapshot, &[]);

        let (reqs, issues) = RequirementCalculator::calculate(acc, &ctx, today(), Decimal::from(2));

        assert!(issues.is_empty());
        assert_eq!(reqs.len(), 1);
        assert_eq!(reqs[0].required_qty, Decimal::from(100));
        assert_eq!(reqs[0].shortage_qty, Decimal::from(60));
        assert_eq!(reqs[0].surplus_qty, Decimal::ZERO);
        assert_eq!(reqs[0].days_until_needed, 3);
        assert_eq!(reqs[0].status, RequirementStatus::Critical);
        assert_eq!(reqs[0].parent_sku, "FG-100");
    }

    #[test]
    fn test_shared_component_across_parents() {
        let mut acc = ComponentAccumulator::new();
        acc.add("RM-02", "FG-A", Decimal::from(10), today() + Duration::days(7), Decimal::ONE);
        acc.add("RM-02", "FG-B", Decimal::from(15), today() + Duration::days(7), Decimal::ONE);

        let snapshot = snapshot(vec![InventoryPosition::new(
            "RM-02".to_string(),
            Decimal::from(5),
            3,
        )]);
        let ctx = SupplyContext::new(&snapshot, &[]);

        let (reqs, _) = RequirementCalculator::calculate(acc, &ctx, today(), Decimal::from(2));

        assert_eq!(reqs[0].required_qty, Decimal::from(25));
        assert_eq!(reqs[0].shortage_qty, Decimal::from(20));
        assert_eq!(reqs[0].consuming_boms.len(), 2);
        assert_eq!(reqs[0].status, RequirementStatus::Shortage);
    }

    #[test]
    fn test_missing_position_reported() {
        let mut acc = ComponentAccumulator::new();
        acc.add("RM-X", "FG-A", Decimal::from(10), today(), Decimal::ONE);

        let snapshot = snapshot(vec![]);
        let ctx = SupplyContext::new(&snapshot, &[]);
        let (reqs, issues) = RequirementCalculator::calculate(acc, &ctx, today(), Decimal::from(2));

        assert_eq!(reqs[0].available_qty, Decimal::ZERO);
        assert_eq!(reqs[0].lead_time_days, 0);
        assert_eq!(reqs[0].status, RequirementStatus::Critical);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].kind, IssueKind::MissingInventoryPosition);
    }

    #[test]
    fn test_merge_is_order_independent() {
        let d = today() + Duration::days(7);
        let mut a = ComponentAccumulator::new();
        a.add("RM-01", "FG-A", Decimal::from(10), d, Decimal::ONE);
        let mut b = ComponentAccumulator::new();
        b.add("RM-01", "FG-A", Decimal::from(5), d - Duration::days(7), Decimal::new(6, 1));
        b.add("RM-02", "FG-B", Decimal::from(3), d, Decimal::ONE);

        let ab = a.clone().merge(b.clone());
        let ba = b.merge(a);

        assert_eq!(ab, ba);
        let rm01 = ab.get("RM-01").unwrap();
        assert_eq!(rm01.required_qty, Decimal::from(15));
        assert_eq!(rm01.consumptions["FG-A"].earliest_need_date, today());
    }

    #[rstest]
    #[case::far_future(200_000_000, MAX_LEAD_TIME_DAYS)]
    #[case::negative(-3, 0)]
    fn test_out_of_range_lead_time_is_clamped(#[case] lead_time: i64, #[case] expected: i64) {
        let mut acc = ComponentAccumulator::new();
        acc.add("RM-01", "FG-100", Decimal::from(100), today() + Duration::days(3), Decimal::ONE);

        let snapshot = snapshot(vec![InventoryPosition::new(
            "RM-01".to_string(),
            Decimal::from(40),
            lead_time,
        )]);
        let ctx = SupplyContext::new(&snapshot, &[]);

        let (reqs, issues) = RequirementCalculator::calculate(acc, &ctx, today(), Decimal::from(2));

        assert_eq!(reqs[0].lead_time_days, expected);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].kind, IssueKind::InvalidLeadTime);
        assert_eq!(issues[0].sku.as_deref(), Some("RM-01"));
    }

    #[rstest]
    #[case::critical(100, 40, 3, 5, RequirementStatus::Critical)]
    #[case::critical_on_boundary(100, 40, 5, 5, RequirementStatus::Critical)]
    #[case::shortage(100, 40, 6, 5, RequirementStatus::Shortage)]
    #[case::covered(100, 150, 3, 5, RequirementStatus::Covered)]
    #[case::covered_at_excess_boundary(100, 300, 3, 5, RequirementStatus::Covered)]
    #[case::excess(100, 301, 3, 5, RequirementStatus::Excess)]
    fn test_classify(
        #[case] required: i64,
        #[case] available: i64,
        #[case] days_until_needed: i64,
        #[case] lead_time: i64,
        #[case] expected: RequirementStatus,
    ) {
        let required = Decimal::from(required);
        let available = Decimal::from(available);
        let (shortage, surplus) = ComponentRequirement::net(required, available);

        let status = RequirementCalculator::classify(
            required,
            shortage,
            surplus,
            days_until_needed,
            lead_time,
            Decimal::from(2),
        );
        assert_eq!(status, expected);
    }

    proptest! {
        #[test]
        fn prop_shortage_surplus_invariant(required in 0i64..10_000, available in 0i64..10_000) {
            let (shortage, surplus) =
                ComponentRequirement::net(Decimal::from(required), Decimal::from(available));

            prop_assert_eq!(shortage, Decimal::from((required - available).max(0)));
            prop_assert_eq!(surplus, Decimal::from((available - required).max(0)));
            prop_assert!(shortage.is_zero() || surplus.is_zero());
        }
    }
}
