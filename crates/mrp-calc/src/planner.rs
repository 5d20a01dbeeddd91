//! 採購計劃主計算器

use chrono::{DateTime, Utc};
use mrp_core::{
    BomGraph, DemandBucket, IssueKind, IssueSeverity, PlanIssue, PlanningConfig, PlanningInputs,
};
use rayon::prelude::*;
use std::collections::BTreeMap;

use crate::aggregation::DemandAggregator;
use crate::cancel::RunGuard;
use crate::explosion::BomExploder;
use crate::netting::{ComponentAccumulator, RequirementCalculator};
use crate::recommendation::RecommendationGenerator;
use crate::supply::SupplyContext;
use crate::PlanResult;

/// 單批成品展開的部分結果
#[derive(Debug, Default)]
struct ExplosionPartial {
    accumulator: ComponentAccumulator,
    issues: Vec<PlanIssue>,
}

impl ExplosionPartial {
    fn merge(mut self, other: Self) -> Self {
        self.accumulator = self.accumulator.merge(other.accumulator);
        self.issues.extend(other.issues);
        self
    }
}

/// 採購計劃計算器
pub struct PurchasePlanner {
    config: PlanningConfig,
}

impl PurchasePlanner {
    /// 創建新的計算器
    pub fn new(config: PlanningConfig) -> mrp_core::Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// 主計算入口
    ///
    /// 成品之間的 BOM 展開並行處理，每批開始前檢查是否已被取代；
    /// 後續的沖銷、評分、建議在合併後單執行緒進行。
    pub fn plan(
        &self,
        inputs: &PlanningInputs,
        now: DateTime<Utc>,
        guard: &RunGuard,
    ) -> mrp_core::Result<PlanResult> {
        tracing::info!(
            "開始採購計劃計算：預測 {} 筆，BOM {} 筆，庫存 {} 筆，供應商 {} 筆",
            inputs.forecasts.len(),
            inputs.bom_rows.len(),
            inputs.inventory.positions.len(),
            inputs.vendors.len()
        );

        let start_time = std::time::Instant::now();
        let today = now.date_naive();

        // Step 1: 需求彙總
        tracing::debug!("Step 1: 需求彙總");
        let (buckets, excluded_forecasts) =
            DemandAggregator::aggregate(&inputs.forecasts, today, self.config.horizon_days());
        let grouped = self.group_buckets_by_sku(buckets);
        tracing::debug!("成品數量: {}", grouped.len());

        // Step 2: 並行 BOM 展開
        tracing::debug!("Step 2: BOM 展開");
        let graph = BomGraph::from_rows(&inputs.bom_rows);
        let partial = self.explode_demand(&graph, &grouped, guard)?;
        guard.check()?;
        tracing::debug!("物料數量: {}", partial.accumulator.len());

        let mut issues = partial.issues;
        if let Some(issue) = self.snapshot_issue(inputs, now) {
            issues.push(issue);
        }

        // Step 3: 淨需求
        tracing::debug!("Step 3: 淨需求沖銷");
        let supply = SupplyContext::new(&inputs.inventory, &inputs.vendors);
        let (requirements, netting_issues) = RequirementCalculator::calculate(
            partial.accumulator,
            &supply,
            today,
            self.config.excess_multiple,
        );
        issues.extend(netting_issues);

        // Step 4: 採購建議（含緊急度與優先級）
        tracing::debug!("Step 4: 採購建議");
        let critical_builds = RecommendationGenerator::critical_builds(&requirements);
        let generator = RecommendationGenerator::new(&supply, &self.config, now);
        let (recommendations, recommendation_issues) =
            generator.generate(&requirements, &critical_builds);
        issues.extend(recommendation_issues);

        sort_issues(&mut issues);
        for issue in issues.iter().filter(|i| i.severity != IssueSeverity::Info) {
            tracing::warn!("{:?} {:?}: {}", issue.kind, issue.sku, issue.message);
        }

        guard.check()?;

        let mut result = PlanResult::empty(guard.generation());
        result.requirements = requirements;
        result.recommendations = recommendations;
        result.critical_builds = critical_builds.into_iter().collect();
        result.issues = issues;
        result.excluded_forecasts = excluded_forecasts;
        result.calculation_time_ms = Some(start_time.elapsed().as_millis());

        tracing::info!("採購計劃計算完成，耗時 {:?}", start_time.elapsed());
        tracing::info!(
            "物料需求 {} 筆，採購建議 {} 筆，問題 {} 筆",
            result.requirements.len(),
            result.recommendations.len(),
            result.issues.len()
        );

        Ok(result)
    }

    /// 並行展開所有成品需求
    fn explode_demand(
        &self,
        graph: &BomGraph,
        grouped: &[(String, Vec<DemandBucket>)],
        guard: &RunGuard,
    ) -> mrp_core::Result<ExplosionPartial> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.config.worker_threads)
            .build()
            .map_err(|e| mrp_core::MrpError::WorkerPool(e.to_string()))?;

        let exploder = BomExploder::new(graph, self.config.max_bom_depth);

        pool.install(|| {
            grouped
                .par_chunks(self.config.sku_batch_size)
                .map(|batch| Self::explode_batch(&exploder, batch, guard))
                .try_reduce(ExplosionPartial::default, |a, b| Ok(a.merge(b)))
        })
    }

    /// 展開一批成品
    ///
    /// 循環或層級過深只影響該成品，記錄後繼續。
    fn explode_batch(
        exploder: &BomExploder<'_>,
        batch: &[(String, Vec<DemandBucket>)],
        guard: &RunGuard,
    ) -> mrp_core::Result<ExplosionPartial> {
        guard.check()?;

        let mut partial = ExplosionPartial::default();
        for (finished_sku, buckets) in batch {
            let per_unit = match exploder.per_unit(finished_sku) {
                Ok(per_unit) => per_unit,
                Err(err) => match PlanIssue::from_isolated_error(finished_sku, &err) {
                    Some(issue) => {
                        partial.issues.push(issue);
                        continue;
                    }
                    None => return Err(err),
                },
            };

            for bucket in buckets {
                for (component_sku, qty) in &per_unit {
                    partial.accumulator.add(
                        component_sku,
                        finished_sku,
                        *qty * bucket.gross_requirement,
                        bucket.period_start,
                        bucket.confidence,
                    );
                }
            }
        }

        Ok(partial)
    }

    /// 按成品分組需求桶（只保留非零需求）
    fn group_buckets_by_sku(&self, buckets: Vec<DemandBucket>) -> Vec<(String, Vec<DemandBucket>)> {
        let mut grouped: BTreeMap<String, Vec<DemandBucket>> = BTreeMap::new();
        for bucket in buckets {
            if bucket.gross_requirement.is_zero() {
                continue;
            }
            grouped
                .entry(bucket.finished_sku.clone())
                .or_default()
                .push(bucket);
        }
        grouped.into_iter().collect()
    }

    /// 整份快照過期時的問題記錄
    fn snapshot_issue(&self, inputs: &PlanningInputs, now: DateTime<Utc>) -> Option<PlanIssue> {
        let age_hours = (now - inputs.inventory.captured_at).num_hours();
        if age_hours <= self.config.inventory_freshness_hours {
            return None;
        }
        Some(PlanIssue::new(
            IssueKind::StaleInventorySnapshot,
            None,
            mrp_core::MrpError::StaleInventorySnapshot {
                age_hours,
                max_age_hours: self.config.inventory_freshness_hours,
            }
            .to_string(),
            IssueSeverity::Warning,
        ))
    }

    /// 獲取配置引用
    pub fn config(&self) -> &PlanningConfig {
        &self.config
    }
}

/// 問題排序（與並行排程無關）
fn sort_issues(issues: &mut [PlanIssue]) {
    issues.sort_by(|a, b| {
        a.sku
            .cmp(&b.sku)
            .then_with(|| a.kind.cmp(&b.kind))
            .then_with(|| a.message.cmp(&b.message))
    });
}
