//! 重算協調器
//!
//! 接收重算請求，一次載入全部輸入，計算完成後整份發布。
//! 較新的請求會取代進行中的計算；載入失敗時保留上一次發布的結果。

use chrono::Utc;
use mrp_calc::{GenerationCounter, PlanResult, PurchasePlanner, RunGuard, SupplyContext};
use mrp_core::{
    BomGraph, ComputationSummary, MrpError, PlanningConfig, PlanningDataSource, PlanningInputs,
    RecomputeReason, RecomputeRequest, RequirementStatus,
};
use mrp_optimizer::{ConsolidationReport, VendorConsolidator};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Instant;
use uuid::Uuid;

use crate::dirty_tracking::DirtyTracker;
use crate::publication::{PlanStore, PublishedPlan};

/// 單次重算的結果
#[derive(Debug, Clone)]
pub enum RunOutcome {
    /// 已發布
    Published(Arc<PublishedPlan>),
    /// 被較新的請求取代，結果已丟棄
    Superseded { generation: u64 },
}

impl RunOutcome {
    pub fn published(&self) -> Option<&Arc<PublishedPlan>> {
        match self {
            RunOutcome::Published(plan) => Some(plan),
            RunOutcome::Superseded { .. } => None,
        }
    }

    pub fn is_superseded(&self) -> bool {
        matches!(self, RunOutcome::Superseded { .. })
    }
}

/// 重算協調器
pub struct RecomputeCoordinator {
    source: Arc<dyn PlanningDataSource>,
    config: PlanningConfig,
    counter: GenerationCounter,
    store: PlanStore,
    tracker: Mutex<DirtyTracker>,
}

impl RecomputeCoordinator {
    /// 創建新的協調器
    pub fn new(
        source: Arc<dyn PlanningDataSource>,
        config: PlanningConfig,
    ) -> mrp_core::Result<Self> {
        config.validate()?;
        Ok(Self {
            source,
            config,
            counter: GenerationCounter::new(),
            store: PlanStore::new(),
            tracker: Mutex::new(DirtyTracker::new()),
        })
    }

    /// 處理重算請求
    ///
    /// 載入失敗、配置錯誤等致命錯誤以 `Err` 回傳，發布區不受影響。
    pub fn handle(&self, request: &RecomputeRequest) -> mrp_core::Result<RunOutcome> {
        self.tracker().mark_dirty(request.reason);
        let guard = self.counter.advance();
        tracing::info!(
            "收到重算請求：{:?}，時界 {} 週，世代 {}",
            request.reason,
            request.horizon_weeks,
            guard.generation()
        );

        match self.run(request, &guard) {
            Ok(Some(plan)) => Ok(RunOutcome::Published(plan)),
            Ok(None) | Err(MrpError::Superseded { .. }) => {
                tracing::info!("世代 {} 已被取代，丟棄結果", guard.generation());
                Ok(RunOutcome::Superseded {
                    generation: guard.generation(),
                })
            }
            Err(err) => {
                tracing::error!("世代 {} 重算失敗：{}", guard.generation(), err);
                Err(err)
            }
        }
    }

    fn run(
        &self,
        request: &RecomputeRequest,
        guard: &RunGuard,
    ) -> mrp_core::Result<Option<Arc<PublishedPlan>>> {
        let start_time = Instant::now();
        let config = self
            .config
            .clone()
            .with_horizon_weeks(request.horizon_weeks);
        let planner = PurchasePlanner::new(config)?;

        let inputs = self.load_inputs()?;
        guard.check()?;

        let result = planner.plan(&inputs, request.now, guard)?;

        let supply = SupplyContext::new(&inputs.inventory, &inputs.vendors);
        let report = ConsolidationReport::new(VendorConsolidator::new(planner.config()).summarize(
            &result.recommendations,
            &result.requirements,
            &supply,
        ));
        guard.check()?;

        // 只在確定發布前取出原因，被取代的計算不會吃掉它們
        let reasons = self.tracker().take();
        let summary = build_summary(
            guard.generation(),
            reasons.clone(),
            request.horizon_weeks,
            &result,
            &report,
            &inputs,
            start_time.elapsed().as_millis(),
        );

        let plan = PublishedPlan {
            generation: guard.generation(),
            published_at: Some(Utc::now()),
            requirements: result.requirements,
            recommendations: result.recommendations,
            vendor_summaries: report.summaries,
            summary,
        };

        if !self.store.publish(plan) {
            let mut tracker = self.tracker();
            for reason in reasons {
                tracker.mark_dirty(reason);
            }
            return Ok(None);
        }

        let published = self.store.current();
        tracing::info!(
            "世代 {} 發布完成：需求 {} 筆，建議 {} 筆，耗時 {} ms",
            published.generation,
            published.requirements.len(),
            published.recommendations.len(),
            published.summary.duration_ms
        );
        Ok(Some(published))
    }

    /// 一次載入所有輸入，任何一項失敗即整體失敗
    fn load_inputs(&self) -> mrp_core::Result<PlanningInputs> {
        self.source.load_all().map_err(|err| match err {
            MrpError::InputLoadFailure { .. } => err,
            other => MrpError::load_failure("source", other.to_string()),
        })
    }

    fn tracker(&self) -> std::sync::MutexGuard<'_, DirtyTracker> {
        self.tracker.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// 目前已發布的結果
    pub fn current(&self) -> Arc<PublishedPlan> {
        self.store.current()
    }

    /// 最新開始的世代
    pub fn latest_generation(&self) -> u64 {
        self.counter.current()
    }

    /// 尚未被成功發布處理的變更原因
    pub fn pending_reasons(&self) -> Vec<RecomputeReason> {
        self.tracker().pending()
    }

    pub fn config(&self) -> &PlanningConfig {
        &self.config
    }
}

/// 彙整計算摘要
fn build_summary(
    generation: u64,
    reasons: Vec<RecomputeReason>,
    horizon_weeks: u32,
    result: &PlanResult,
    report: &ConsolidationReport,
    inputs: &PlanningInputs,
    duration_ms: u128,
) -> ComputationSummary {
    let mut counts_by_status = BTreeMap::new();
    for requirement in &result.requirements {
        *counts_by_status.entry(requirement.status).or_insert(0) += 1;
    }

    let mut counts_by_priority = BTreeMap::new();
    for rec in &result.recommendations {
        *counts_by_priority.entry(rec.priority).or_insert(0) += 1;
    }

    let flagged_skus: BTreeSet<String> = result
        .recommendations
        .iter()
        .filter(|r| !r.flags.is_empty())
        .map(|r| r.component_sku.clone())
        .collect();

    // 反查 BOM：任何使用到關鍵短缺物料的頂層成品
    let graph = BomGraph::from_rows(&inputs.bom_rows);
    let blocked_builds: BTreeSet<String> = result
        .requirements
        .iter()
        .filter(|r| r.status == RequirementStatus::Critical)
        .flat_map(|r| graph.where_used(&r.component_sku))
        .filter(|usage| usage.is_root)
        .map(|usage| usage.sku)
        .collect();

    ComputationSummary {
        run_id: Uuid::new_v4().to_string(),
        generation,
        reasons,
        horizon_weeks,
        excluded_forecasts: result.excluded_forecasts,
        requirement_count: result.requirements.len(),
        recommendation_count: result.recommendations.len(),
        counts_by_status,
        counts_by_priority,
        total_estimated_spend: result.recommendations.iter().map(|r| r.estimated_value).sum(),
        consolidation_savings: report.total_savings,
        duration_ms,
        issues: result.issues.clone(),
        flagged_skus: flagged_skus.into_iter().collect(),
        blocked_builds: blocked_builds.into_iter().collect(),
    }
}
