//! 簡單採購計劃示例：單一成品、單一原料

use chrono::{Duration, Utc};
use mrp_purchasing::logging;
use mrp_purchasing::prelude::*;
use rust_decimal::Decimal;
use std::sync::Arc;

fn main() -> anyhow::Result<()> {
    logging::init();
    println!("=== 簡單採購計劃示例 ===\n");

    let now = Utc::now();
    let today = now.date_naive();

    // FG-100 每台需要 2 個 RM-01，本週預測 50 台
    let inputs = PlanningInputs {
        forecasts: vec![FinishedGoodForecast::new(
            "FG-100".to_string(),
            today,
            Decimal::from(50),
        )],
        bom_rows: vec![BomNode::new(
            "FG-100".to_string(),
            "RM-01".to_string(),
            Decimal::from(2),
        )],
        inventory: InventorySnapshot::new(
            now - Duration::hours(2),
            vec![InventoryPosition::new("RM-01".to_string(), Decimal::from(40), 5)
                .with_unit_cost(Decimal::new(350, 2))
                .with_preferred_vendor("V-001".to_string())],
        ),
        vendors: vec![VendorRecord::new("V-001".to_string(), "Acme Supply".to_string())],
    };

    let coordinator = RecomputeCoordinator::new(
        Arc::new(InMemoryDataSource::new(inputs)),
        PlanningConfig::default(),
    )?;
    let outcome = coordinator.handle(&RecomputeRequest::new(RecomputeReason::Manual, now))?;

    let Some(plan) = outcome.published() else {
        anyhow::bail!("計算被取代，沒有結果");
    };

    println!("物料需求:");
    for req in &plan.requirements {
        println!(
            "  - {}: 需求 {}, 可用 {}, 短缺 {}, 狀態 {:?}",
            req.component_sku, req.required_qty, req.available_qty, req.shortage_qty, req.status
        );
    }

    println!("\n採購建議:");
    for rec in &plan.recommendations {
        println!(
            "  - [{}] {} 訂購 {} (截止 {}, 金額 {})",
            rec.priority,
            rec.component_sku,
            rec.suggested_order_qty,
            rec.order_by_date,
            rec.estimated_value
        );
    }

    Ok(())
}
