//! 供應商彙總與併單分析

use chrono::NaiveDate;
use mrp_calc::SupplyContext;
use mrp_core::{
    ComponentRequirement, ConsolidationOpportunity, PlanningConfig, PullForwardItem,
    PurchaseRecommendation, RequirementStatus, VendorRecord, VendorSummary,
};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use std::collections::{BTreeMap, BTreeSet};

/// 供應商併單分析器
pub struct VendorConsolidator<'a> {
    config: &'a PlanningConfig,
}

impl<'a> VendorConsolidator<'a> {
    pub fn new(config: &'a PlanningConfig) -> Self {
        Self { config }
    }

    /// 按供應商彙總建議並尋找併單機會
    ///
    /// 結果依最早訂購截止日排序；未指派供應商的建議另成一組。
    pub fn summarize(
        &self,
        recommendations: &[PurchaseRecommendation],
        requirements: &[ComponentRequirement],
        supply: &SupplyContext<'_>,
    ) -> Vec<VendorSummary> {
        let mut groups: BTreeMap<Option<&str>, Vec<&PurchaseRecommendation>> = BTreeMap::new();
        for rec in recommendations {
            groups.entry(rec.vendor_id.as_deref()).or_default().push(rec);
        }

        let mut summaries: Vec<VendorSummary> = groups
            .into_iter()
            .filter_map(|(vendor_id, recs)| {
                let mut summary = Self::summary(vendor_id, &recs)?;
                if let Some(vendor) = vendor_id.and_then(|id| supply.vendor(id)) {
                    summary.consolidation =
                        self.find_opportunity(vendor, &recs, requirements, supply);
                }
                Some(summary)
            })
            .collect();

        summaries.sort_by(|a, b| {
            a.earliest_order_by_date
                .cmp(&b.earliest_order_by_date)
                .then_with(|| a.vendor_id.cmp(&b.vendor_id))
        });

        for summary in summaries.iter().filter(|s| s.consolidation.is_some()) {
            tracing::info!(
                "供應商 {:?} 有併單機會：{} 項，合計 {}",
                summary.vendor_id,
                summary.item_count,
                summary.total_value
            );
        }

        summaries
    }

    /// 單一供應商的彙總
    fn summary(
        vendor_id: Option<&str>,
        recs: &[&PurchaseRecommendation],
    ) -> Option<VendorSummary> {
        let earliest_order_by_date: NaiveDate = recs.iter().map(|r| r.order_by_date).min()?;
        let most_urgent_days_remaining = recs.iter().map(|r| r.days_until_deadline).min()?;

        let priorities: BTreeSet<_> = recs.iter().map(|r| r.priority).collect();
        let skus: BTreeSet<_> = recs.iter().map(|r| r.component_sku.clone()).collect();

        Some(VendorSummary {
            vendor_id: vendor_id.map(str::to_string),
            item_count: recs.len(),
            total_units: recs.iter().map(|r| r.suggested_order_qty).sum(),
            total_value: recs.iter().map(|r| r.estimated_value).sum(),
            earliest_order_by_date,
            most_urgent_days_remaining,
            priorities: priorities.into_iter().collect(),
            sku_list: skus.into_iter().collect(),
            consolidation: None,
        })
    }

    /// 尋找併單機會
    ///
    /// 近期建議合計略低於免運門檻時，嘗試把同供應商、仍有庫存天數的物料
    /// 提前併入（不可因此變成過剩），若能跨過門檻即為機會，節省額為運費。
    fn find_opportunity(
        &self,
        vendor: &VendorRecord,
        recs: &[&PurchaseRecommendation],
        requirements: &[ComponentRequirement],
        supply: &SupplyContext<'_>,
    ) -> Option<ConsolidationOpportunity> {
        let threshold = vendor.free_shipping_threshold?;

        let near_term_value: Decimal = recs
            .iter()
            .filter(|r| r.priority.is_near_term())
            .map(|r| r.estimated_value)
            .sum();

        if near_term_value.is_zero() || near_term_value >= threshold {
            return None;
        }
        let gap = threshold - near_term_value;
        if gap > threshold * self.config.consolidation_gap_ratio {
            return None;
        }

        let by_sku: BTreeMap<&str, &ComponentRequirement> = requirements
            .iter()
            .map(|r| (r.component_sku.as_str(), r))
            .collect();

        let mut candidates = self.planned_candidates(recs, &by_sku);
        candidates.extend(self.covered_candidates(vendor, requirements, supply));
        candidates.sort_by(|a, b| {
            a.days_of_stock
                .cmp(&b.days_of_stock)
                .then_with(|| a.component_sku.cmp(&b.component_sku))
        });

        let mut combined_value = near_term_value;
        let mut pulled_forward = Vec::new();
        for candidate in candidates {
            if combined_value >= threshold {
                break;
            }
            combined_value += candidate.value;
            pulled_forward.push(candidate);
        }

        if combined_value < threshold {
            tracing::debug!(
                "供應商 {} 差額 {}，但沒有足夠可提前的物料",
                vendor.vendor_id,
                gap
            );
            return None;
        }

        Some(ConsolidationOpportunity {
            vendor_id: vendor.vendor_id.clone(),
            near_term_value,
            threshold,
            gap,
            pulled_forward,
            combined_value,
            estimated_savings: vendor.shipping_cost,
        })
    }

    /// 同供應商、尚不急的建議
    fn planned_candidates(
        &self,
        recs: &[&PurchaseRecommendation],
        by_sku: &BTreeMap<&str, &ComponentRequirement>,
    ) -> Vec<PullForwardItem> {
        recs.iter()
            .filter(|r| !r.priority.is_near_term())
            .filter_map(|r| {
                let requirement = by_sku.get(r.component_sku.as_str())?;
                self.pull_forward(requirement, r.suggested_order_qty, r.unit_cost)
            })
            .collect()
    }

    /// 同供應商、目前足夠的物料（提前訂購一個最小單位）
    fn covered_candidates(
        &self,
        vendor: &VendorRecord,
        requirements: &[ComponentRequirement],
        supply: &SupplyContext<'_>,
    ) -> Vec<PullForwardItem> {
        requirements
            .iter()
            .filter(|r| r.status == RequirementStatus::Covered)
            .filter_map(|r| {
                let position = supply.position(&r.component_sku)?;
                if position.preferred_vendor_id.as_deref() != Some(vendor.vendor_id.as_str()) {
                    return None;
                }
                let quantity = supply.order_rule(position).adjust(Decimal::ONE);
                self.pull_forward(r, quantity, position.unit_cost)
            })
            .collect()
    }

    /// 檢查能否提前訂購（需有正的庫存天數，且不會變成過剩）
    fn pull_forward(
        &self,
        requirement: &ComponentRequirement,
        quantity: Decimal,
        unit_cost: Decimal,
    ) -> Option<PullForwardItem> {
        let days_of_stock = self.days_of_stock(requirement)?;
        if days_of_stock <= 0 || requirement.days_until_needed <= 0 {
            return None;
        }

        let surplus_after = requirement.available_qty + quantity - requirement.required_qty;
        if surplus_after > self.config.excess_multiple * requirement.required_qty {
            return None;
        }

        let value = quantity * unit_cost;
        if value <= Decimal::ZERO {
            return None;
        }

        Some(PullForwardItem {
            component_sku: requirement.component_sku.clone(),
            quantity,
            value,
            days_of_stock: Some(days_of_stock),
        })
    }

    /// 以計劃時界內平均日耗用估算庫存天數
    fn days_of_stock(&self, requirement: &ComponentRequirement) -> Option<i64> {
        if requirement.required_qty <= Decimal::ZERO {
            return None;
        }
        let daily_usage = requirement.required_qty / Decimal::from(self.config.horizon_days());
        (requirement.available_qty / daily_usage).floor().to_i64()
    }
}
