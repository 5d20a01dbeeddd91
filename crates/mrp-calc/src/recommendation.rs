//! 採購建議產生

use chrono::{DateTime, NaiveDate, Utc};
use mrp_core::{
    ComponentRequirement, IssueKind, IssueSeverity, OrderQuantityRule, PlanIssue,
    PlanningConfig, PurchaseRecommendation, RecommendationFlag, RequirementStatus,
};
use rust_decimal::Decimal;
use std::collections::BTreeSet;

use crate::priority::PriorityClassifier;
use crate::supply::{SupplyContext, VendorLink};
use crate::urgency::UrgencyScorer;

/// 採購建議產生器
pub struct RecommendationGenerator<'a> {
    supply: &'a SupplyContext<'a>,
    config: &'a PlanningConfig,
    today: NaiveDate,
    now: DateTime<Utc>,
}

impl<'a> RecommendationGenerator<'a> {
    pub fn new(
        supply: &'a SupplyContext<'a>,
        config: &'a PlanningConfig,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            supply,
            config,
            today: now.date_naive(),
            now,
        }
    }

    /// 關鍵成品：至少有一個物料為 CRITICAL 的成品
    pub fn critical_builds(requirements: &[ComponentRequirement]) -> BTreeSet<String> {
        requirements
            .iter()
            .filter(|r| r.status == RequirementStatus::Critical)
            .flat_map(|r| r.consuming_boms.iter().map(|c| c.finished_sku.clone()))
            .collect()
    }

    /// 為所有短缺物料產生建議（依緊急度排序）
    ///
    /// 缺少供應商的物料仍會產生建議，供應商為空並標記人工處理。
    pub fn generate(
        &self,
        requirements: &[ComponentRequirement],
        critical_builds: &BTreeSet<String>,
    ) -> (Vec<PurchaseRecommendation>, Vec<PlanIssue>) {
        let mut recommendations = Vec::new();
        let mut issues = Vec::new();

        for requirement in requirements.iter().filter(|r| r.status.needs_purchase()) {
            recommendations.push(self.build(requirement, critical_builds, &mut issues));
        }

        UrgencyScorer::rank(&mut recommendations);
        (recommendations, issues)
    }

    fn build(
        &self,
        requirement: &ComponentRequirement,
        critical_builds: &BTreeSet<String>,
        issues: &mut Vec<PlanIssue>,
    ) -> PurchaseRecommendation {
        let sku = requirement.component_sku.as_str();
        let position = self.supply.position(sku);
        let mut flags = Vec::new();

        let vendor_id = match position.map(|p| self.supply.vendor_link(p)) {
            Some(VendorLink::Linked(vendor)) => Some(vendor.vendor_id.clone()),
            Some(VendorLink::Dangling(id)) => {
                flags.push(RecommendationFlag::MissingVendor);
                issues.push(PlanIssue::warning(
                    IssueKind::MissingVendorData,
                    sku,
                    format!("首選供應商 {} 不存在，需人工指定", id),
                ));
                None
            }
            Some(VendorLink::Unlinked) | None => {
                flags.push(RecommendationFlag::MissingVendor);
                issues.push(PlanIssue::warning(
                    IssueKind::MissingVendorData,
                    sku,
                    "未指定首選供應商，需人工指定".to_string(),
                ));
                None
            }
        };

        let rule = match position {
            Some(p) => self.supply.order_rule(p),
            None => {
                flags.push(RecommendationFlag::MissingInventory);
                OrderQuantityRule {
                    minimum_order_qty: Decimal::ZERO,
                    order_multiple: None,
                }
            }
        };

        if let Some(p) = position {
            let age_hours = self.supply.age_hours(p, self.now);
            if age_hours > self.config.inventory_freshness_hours {
                flags.push(RecommendationFlag::StaleInventory);
                issues.push(PlanIssue::warning(
                    IssueKind::StaleInventorySnapshot,
                    sku,
                    format!(
                        "庫存資料已 {} 小時未更新（上限 {} 小時），建議為低信心",
                        age_hours, self.config.inventory_freshness_hours
                    ),
                ));
            }
        }

        let confidence = requirement.min_confidence();
        if confidence < self.config.min_forecast_confidence {
            flags.push(RecommendationFlag::LowForecastConfidence);
            issues.push(PlanIssue::new(
                IssueKind::LowForecastConfidence,
                Some(sku.to_string()),
                format!("預測信心度 {} 低於 {}", confidence, self.config.min_forecast_confidence),
                IssueSeverity::Info,
            ));
        }
        flags.sort();

        let suggested_order_qty = rule.adjust(requirement.shortage_qty);
        let unit_cost = position.map(|p| p.unit_cost).unwrap_or(Decimal::ZERO);
        let order_by_date = requirement.order_by_date();
        let days_until_deadline = (order_by_date - self.today).num_days();

        let blocks_critical_builds = requirement.has_shortage()
            && requirement
                .consuming_boms
                .iter()
                .any(|c| critical_builds.contains(&c.finished_sku));

        let urgency_score = UrgencyScorer::score(
            days_until_deadline,
            blocks_critical_builds,
            requirement.shortage_qty,
            self.config.critical_path_bonus_days,
        );
        let priority = PriorityClassifier::classify(
            order_by_date,
            self.today,
            blocks_critical_builds,
            self.config,
        );

        tracing::debug!(
            "建議 {}: 數量 {}, 截止 {}, 優先級 {}",
            sku,
            suggested_order_qty,
            order_by_date,
            priority
        );

        PurchaseRecommendation {
            component_sku: sku.to_string(),
            vendor_id,
            shortage_qty: requirement.shortage_qty,
            suggested_order_qty,
            unit_cost,
            estimated_value: suggested_order_qty * unit_cost,
            urgency_score,
            priority,
            order_by_date,
            days_until_deadline,
            days_until_needed: requirement.days_until_needed,
            blocks_critical_builds,
            consuming_boms: requirement.consuming_boms.clone(),
            flags,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use mrp_core::{BomConsumption, InventoryPosition, InventorySnapshot, Priority, VendorRecord};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 11, 3, 9, 0, 0).unwrap()
    }

    fn requirement(sku: &str, shortage: i64, days_needed: i64, lead: i64) -> ComponentRequirement {
        let need = now().date_naive() + Duration::days(days_needed);
        ComponentRequirement {
            parent_sku: "FG-1".to_string(),
            component_sku: sku.to_string(),
            required_qty: Decimal::from(shortage),
            available_qty: Decimal::ZERO,
            shortage_qty: Decimal::from(shortage),
            surplus_qty: Decimal::ZERO,
            earliest_need_date: need,
            days_until_needed: days_needed,
            lead_time_days: lead,
            status: if days_needed <= lead {
                RequirementStatus::Critical
            } else {
                RequirementStatus::Shortage
            },
            consuming_boms: vec![BomConsumption {
                finished_sku: "FG-1".to_string(),
                required_qty: Decimal::from(shortage),
                earliest_need_date: need,
                min_confidence: Decimal::ONE,
            }],
        }
    }

    #[test]
    fn test_moq_applied() {
        let snapshot = InventorySnapshot::new(
            now(),
            vec![InventoryPosition::new("RM-03".to_string(), Decimal::ZERO, 5)
                .with_minimum_order_qty(Decimal::from(100))
                .with_unit_cost(Decimal::new(250, 2))
                .with_preferred_vendor("V1".to_string())],
        );
        let vendors = vec![VendorRecord::new("V1".to_string(), "Acme".to_string())];
        let ctx = SupplyContext::new(&snapshot, &vendors);
        let config = PlanningConfig::default();
        let generator = RecommendationGenerator::new(&ctx, &config, now());

        let reqs = vec![requirement("RM-03", 30, 20, 5)];
        let (recs, issues) = generator.generate(&reqs, &BTreeSet::new());

        assert!(issues.is_empty());
        assert_eq!(recs[0].suggested_order_qty, Decimal::from(100));
        assert_eq!(recs[0].estimated_value, Decimal::from(250));
        assert_eq!(recs[0].vendor_id.as_deref(), Some("V1"));
        assert_eq!(recs[0].days_until_deadline, 15);
        assert_eq!(recs[0].priority, Priority::P4Planned);
    }

    #[test]
    fn test_missing_vendor_still_emitted() {
        let snapshot = InventorySnapshot::new(
            now(),
            vec![InventoryPosition::new("RM-04".to_string(), Decimal::ZERO, 2)],
        );
        let ctx = SupplyContext::new(&snapshot, &[]);
        let config = PlanningConfig::default();
        let generator = RecommendationGenerator::new(&ctx, &config, now());

        let (recs, issues) =
            generator.generate(&[requirement("RM-04", 10, 10, 2)], &BTreeSet::new());

        assert_eq!(recs.len(), 1);
        assert!(recs[0].vendor_id.is_none());
        assert!(recs[0].needs_manual_resolution());
        assert_eq!(issues[0].kind, IssueKind::MissingVendorData);
    }

    #[test]
    fn test_stale_inventory_flags_low_confidence() {
        let snapshot = InventorySnapshot::new(
            now() - Duration::hours(48),
            vec![InventoryPosition::new("RM-05".to_string(), Decimal::ZERO, 2)
                .with_preferred_vendor("V1".to_string())],
        );
        let vendors = vec![VendorRecord::new("V1".to_string(), "Acme".to_string())];
        let ctx = SupplyContext::new(&snapshot, &vendors);
        let config = PlanningConfig::default();
        let generator = RecommendationGenerator::new(&ctx, &config, now());

        let (recs, issues) =
            generator.generate(&[requirement("RM-05", 10, 10, 2)], &BTreeSet::new());

        assert!(recs[0].is_low_confidence());
        assert!(issues
            .iter()
            .any(|i| i.kind == IssueKind::StaleInventorySnapshot));
    }

    #[test]
    fn test_blocks_critical_build_and_ranking() {
        let snapshot = InventorySnapshot::new(now(), vec![]);
        let ctx = SupplyContext::new(&snapshot, &[]);
        let config = PlanningConfig::default();
        let generator = RecommendationGenerator::new(&ctx, &config, now());

        // RM-A 本身 CRITICAL，使 FG-1 成為關鍵成品；RM-B 同屬 FG-1
        let reqs = vec![requirement("RM-A", 5, 1, 3), requirement("RM-B", 5, 40, 3)];
        let critical = RecommendationGenerator::critical_builds(&reqs);
        assert!(critical.contains("FG-1"));

        let (recs, _) = generator.generate(&reqs, &critical);

        assert_eq!(recs[0].component_sku, "RM-A");
        assert_eq!(recs[0].priority, Priority::P1Overdue);
        assert!(recs[1].blocks_critical_builds);
        assert_eq!(recs[1].priority, Priority::P2CriticalPath);
        assert!(recs[1].has_flag(RecommendationFlag::MissingInventory));
    }
}
