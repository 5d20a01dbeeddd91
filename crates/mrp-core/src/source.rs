//! 輸入資料來源（外部協作者提供的唯讀資料）

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use crate::{
    BomNode, FinishedGoodForecast, InventorySnapshot, MrpError, Result, VendorRecord,
};

/// 一次計算所需的全部輸入
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlanningInputs {
    #[serde(default)]
    pub forecasts: Vec<FinishedGoodForecast>,
    #[serde(default)]
    pub bom_rows: Vec<BomNode>,
    #[serde(default)]
    pub inventory: InventorySnapshot,
    #[serde(default)]
    pub vendors: Vec<VendorRecord>,
}

/// 資料來源
///
/// 任一載入失敗都會中止整次計算。
pub trait PlanningDataSource: Send + Sync {
    fn load_forecasts(&self) -> Result<Vec<FinishedGoodForecast>>;

    fn load_bom(&self) -> Result<Vec<BomNode>>;

    fn load_inventory(&self) -> Result<InventorySnapshot>;

    fn load_vendors(&self) -> Result<Vec<VendorRecord>>;

    /// 一次載入全部輸入
    fn load_all(&self) -> Result<PlanningInputs> {
        Ok(PlanningInputs {
            forecasts: self.load_forecasts()?,
            bom_rows: self.load_bom()?,
            inventory: self.load_inventory()?,
            vendors: self.load_vendors()?,
        })
    }
}

/// 記憶體資料來源
#[derive(Debug, Default)]
pub struct InMemoryDataSource {
    inputs: RwLock<PlanningInputs>,
}

impl InMemoryDataSource {
    pub fn new(inputs: PlanningInputs) -> Self {
        Self {
            inputs: RwLock::new(inputs),
        }
    }

    /// 以新的輸入取代（模擬外部資料變動）
    pub fn replace(&self, inputs: PlanningInputs) -> Result<()> {
        let mut guard = self
            .inputs
            .write()
            .map_err(|_| MrpError::load_failure("memory", "輸入鎖已中毒"))?;
        *guard = inputs;
        Ok(())
    }

    /// 只更新庫存快照
    pub fn replace_inventory(&self, inventory: InventorySnapshot) -> Result<()> {
        let mut guard = self
            .inputs
            .write()
            .map_err(|_| MrpError::load_failure("inventory", "輸入鎖已中毒"))?;
        guard.inventory = inventory;
        Ok(())
    }

    fn read<T>(&self, source_name: &str, f: impl FnOnce(&PlanningInputs) -> T) -> Result<T> {
        let guard = self
            .inputs
            .read()
            .map_err(|_| MrpError::load_failure(source_name, "輸入鎖已中毒"))?;
        Ok(f(&guard))
    }
}

impl PlanningDataSource for InMemoryDataSource {
    fn load_forecasts(&self) -> Result<Vec<FinishedGoodForecast>> {
        self.read("forecasts", |i| i.forecasts.clone())
    }

    fn load_bom(&self) -> Result<Vec<BomNode>> {
        self.read("bom", |i| i.bom_rows.clone())
    }

    fn load_inventory(&self) -> Result<InventorySnapshot> {
        self.read("inventory", |i| i.inventory.clone())
    }

    fn load_vendors(&self) -> Result<Vec<VendorRecord>> {
        self.read("vendors", |i| i.vendors.clone())
    }

    fn load_all(&self) -> Result<PlanningInputs> {
        self.read("memory", PlanningInputs::clone)
    }
}

/// JSON 檔案資料來源（單一文件包含四組資料）
#[derive(Debug, Clone)]
pub struct JsonDataSource {
    path: PathBuf,
}

impl JsonDataSource {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// 解析 JSON 字串
    pub fn parse(json: &str) -> Result<PlanningInputs> {
        serde_json::from_str(json).map_err(|e| MrpError::load_failure("json", e.to_string()))
    }

    fn load_document(&self, source_name: &str) -> Result<PlanningInputs> {
        let content = std::fs::read_to_string(&self.path).map_err(|e| {
            MrpError::load_failure(source_name, format!("{}: {}", self.path.display(), e))
        })?;
        serde_json::from_str(&content)
            .map_err(|e| MrpError::load_failure(source_name, e.to_string()))
    }
}

impl PlanningDataSource for JsonDataSource {
    fn load_forecasts(&self) -> Result<Vec<FinishedGoodForecast>> {
        Ok(self.load_document("forecasts")?.forecasts)
    }

    fn load_bom(&self) -> Result<Vec<BomNode>> {
        Ok(self.load_document("bom")?.bom_rows)
    }

    fn load_inventory(&self) -> Result<InventorySnapshot> {
        Ok(self.load_document("inventory")?.inventory)
    }

    fn load_vendors(&self) -> Result<Vec<VendorRecord>> {
        Ok(self.load_document("vendors")?.vendors)
    }

    fn load_all(&self) -> Result<PlanningInputs> {
        self.load_document("json")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    const DOCUMENT: &str = r#"{
        "forecasts": [
            { "finished_sku": "FG-100", "period_start": "2025-11-03", "base_forecast_qty": "50" }
        ],
        "bom_rows": [
            { "parent_sku": "FG-100", "component_sku": "RM-01", "quantity_per_parent": "2" }
        ],
        "inventory": {
            "captured_at": "2025-11-01T08:00:00Z",
            "positions": [
                { "sku": "RM-01", "on_hand_qty": "40", "lead_time_days": 5 }
            ]
        },
        "vendors": [
            { "vendor_id": "V1", "free_shipping_threshold": 300, "shipping_cost": 20 }
        ]
    }"#;

    #[test]
    fn test_parse_document() {
        let inputs = JsonDataSource::parse(DOCUMENT).unwrap();

        assert_eq!(inputs.forecasts.len(), 1);
        assert_eq!(inputs.forecasts[0].seasonal_index, Decimal::ONE);
        assert_eq!(inputs.bom_rows[0].quantity_per_parent, Decimal::from(2));
        assert_eq!(inputs.inventory.positions[0].on_order_qty, Decimal::ZERO);
        assert_eq!(inputs.vendors[0].shipping_cost, Decimal::from(20));
    }

    #[test]
    fn test_missing_file_is_load_failure() {
        let source = JsonDataSource::new("/nonexistent/mrp-inputs.json");
        let err = source.load_all().unwrap_err();

        assert!(matches!(err, MrpError::InputLoadFailure { .. }));
    }

    #[test]
    fn test_in_memory_replace() {
        let source = InMemoryDataSource::new(JsonDataSource::parse(DOCUMENT).unwrap());
        assert_eq!(source.load_forecasts().unwrap().len(), 1);

        source.replace(PlanningInputs::default()).unwrap();
        assert!(source.load_all().unwrap().forecasts.is_empty());
    }
}
