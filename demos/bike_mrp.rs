//! # 腳踏車採購計劃完整範例
//!
//! - 產品：兩款腳踏車，共用車架子組件與輪子
//! - 供應商：一家有免運門檻，一家要求整箱訂購
//! - 輸出：物料需求、依緊急度排序的採購建議、供應商彙總與計算摘要

use chrono::{DateTime, Duration, Utc};
use mrp_purchasing::logging;
use mrp_purchasing::prelude::*;
use rust_decimal::Decimal;
use std::sync::Arc;

fn main() -> anyhow::Result<()> {
    logging::init();
    println!("🚲 ===== 腳踏車採購計劃範例 =====\n");

    let now = Utc::now();
    let source = Arc::new(InMemoryDataSource::new(bike_inputs(now)));
    let config = PlanningConfig::default()
        .with_soon_window_days(10)
        .with_sku_batch_size(1);
    let coordinator = RecomputeCoordinator::new(source.clone(), config)?;

    // ========== 1. 首次計算 ==========
    let request = RecomputeRequest::new(RecomputeReason::Manual, now);
    let plan = publish(&coordinator, &request)?;
    print_plan(&plan);

    // ========== 2. 庫存變動後重算 ==========
    println!("\n📥 收到 200 個輪框入庫，重新計算");
    let mut inputs = bike_inputs(now);
    if let Some(rim) = inputs
        .inventory
        .positions
        .iter_mut()
        .find(|p| p.sku == "RIM-700C")
    {
        rim.on_hand_qty += Decimal::from(200);
    }
    source.replace_inventory(inputs.inventory)?;

    let request = RecomputeRequest::new(RecomputeReason::InventoryChanged, now);
    let plan = publish(&coordinator, &request)?;
    print_plan(&plan);

    println!("\n計算摘要 (JSON):");
    println!("{}", serde_json::to_string_pretty(&plan.summary)?);

    Ok(())
}

fn publish(
    coordinator: &RecomputeCoordinator,
    request: &RecomputeRequest,
) -> anyhow::Result<Arc<PublishedPlan>> {
    match coordinator.handle(request)? {
        RunOutcome::Published(plan) => Ok(plan),
        RunOutcome::Superseded { generation } => {
            anyhow::bail!("世代 {} 被取代", generation)
        }
    }
}

fn bike_inputs(now: DateTime<Utc>) -> PlanningInputs {
    let today = now.date_naive();

    let forecasts = vec![
        FinishedGoodForecast::new("BIKE-ROAD".to_string(), today, d(40))
            .with_sales_order_demand(d(10)),
        FinishedGoodForecast::new("BIKE-ROAD".to_string(), today + Duration::days(7), d(60)),
        FinishedGoodForecast::new("BIKE-CITY".to_string(), today + Duration::days(14), d(80))
            .with_seasonal_index(Decimal::new(12, 1)),
        FinishedGoodForecast::new("BIKE-CITY".to_string(), today + Duration::days(49), d(100))
            .with_confidence(Decimal::new(4, 1)),
    ];

    let bom_rows = vec![
        BomNode::new("BIKE-ROAD".to_string(), "FRAME-ASM".to_string(), d(1)),
        BomNode::new("BIKE-ROAD".to_string(), "WHEEL-700C".to_string(), d(2)),
        BomNode::new("BIKE-CITY".to_string(), "FRAME-ASM".to_string(), d(1)),
        BomNode::new("BIKE-CITY".to_string(), "WHEEL-700C".to_string(), d(2)),
        BomNode::new("BIKE-CITY".to_string(), "BASKET".to_string(), d(1)),
        BomNode::new("FRAME-ASM".to_string(), "TUBE-ALU".to_string(), d(3)),
        BomNode::new("FRAME-ASM".to_string(), "BOLT-M5".to_string(), d(8)),
        BomNode::new("WHEEL-700C".to_string(), "RIM-700C".to_string(), d(1)),
        BomNode::new("WHEEL-700C".to_string(), "SPOKE".to_string(), d(32)),
    ];

    let positions = vec![
        InventoryPosition::new("TUBE-ALU".to_string(), d(150), 10)
            .with_unit_cost(Decimal::new(1250, 2))
            .with_preferred_vendor("V-METAL".to_string()),
        InventoryPosition::new("BOLT-M5".to_string(), d(2000), 3)
            .with_unit_cost(Decimal::new(5, 2))
            .with_preferred_vendor("V-FAST".to_string()),
        InventoryPosition::new("RIM-700C".to_string(), d(120), 7)
            .with_on_order_qty(d(50))
            .with_unit_cost(d(18))
            .with_preferred_vendor("V-METAL".to_string()),
        InventoryPosition::new("SPOKE".to_string(), d(4000), 5)
            .with_unit_cost(Decimal::new(8, 2))
            .with_minimum_order_qty(d(1000))
            .with_preferred_vendor("V-FAST".to_string()),
        InventoryPosition::new("BASKET".to_string(), d(20), 14).with_unit_cost(d(9)),
    ];

    let vendors = vec![
        VendorRecord::new("V-METAL".to_string(), "Metalworks".to_string())
            .with_free_shipping(d(5000), d(120)),
        VendorRecord::new("V-FAST".to_string(), "Fastener Co".to_string())
            .with_lead_time_days(4)
            .with_case_pack(Some(d(500))),
    ];

    PlanningInputs {
        forecasts,
        bom_rows,
        inventory: InventorySnapshot::new(now - Duration::hours(1), positions),
        vendors,
    }
}

fn d(value: i64) -> Decimal {
    Decimal::from(value)
}

fn print_plan(plan: &PublishedPlan) {
    println!("\n📋 世代 {} 物料需求:", plan.generation);
    for req in &plan.requirements {
        println!(
            "   {:<10} 需求 {:>6} 可用 {:>6} 短缺 {:>6} 剩餘 {:>6} {:?}",
            req.component_sku,
            req.required_qty,
            req.available_qty,
            req.shortage_qty,
            req.surplus_qty,
            req.status
        );
    }

    println!("\n🛒 採購建議（依緊急度）:");
    for rec in &plan.recommendations {
        let vendor = rec.vendor_id.as_deref().unwrap_or("(未指派)");
        println!(
            "   [{}] {:<10} {:>6} @ {:<8} 截止 {} 金額 {}{}",
            rec.priority,
            rec.component_sku,
            rec.suggested_order_qty,
            vendor,
            rec.order_by_date,
            rec.estimated_value,
            if rec.flags.is_empty() {
                String::new()
            } else {
                format!(" {:?}", rec.flags)
            }
        );
    }

    println!("\n🏭 供應商彙總:");
    for summary in &plan.vendor_summaries {
        println!(
            "   {:<10} {} 項, 金額 {}, 最早截止 {}",
            summary.vendor_id.as_deref().unwrap_or("(未指派)"),
            summary.item_count,
            summary.total_value,
            summary.earliest_order_by_date
        );
        if let Some(opportunity) = &summary.consolidation {
            println!(
                "      💡 差 {} 達免運，可提前 {} 項，省 {}",
                opportunity.gap,
                opportunity.pulled_forward.len(),
                opportunity.estimated_savings
            );
        }
    }

    if !plan.summary.issues.is_empty() {
        println!("\n⚠️  問題:");
        for issue in &plan.summary.issues {
            println!("   {:?} {:?}: {}", issue.kind, issue.sku, issue.message);
        }
    }
}
