//! BOM 結構模型

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// BOM 行（父件 → 子件）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BomNode {
    /// 父件 SKU
    pub parent_sku: String,

    /// 子件 SKU
    pub component_sku: String,

    /// 每個父件的用量
    pub quantity_per_parent: Decimal,

    /// 來源系統記錄的層級（僅供參考，展開時重新計算）
    #[serde(default)]
    pub depth: u32,
}

impl BomNode {
    pub fn new(parent_sku: String, component_sku: String, quantity_per_parent: Decimal) -> Self {
        Self {
            parent_sku,
            component_sku,
            quantity_per_parent,
            depth: 1,
        }
    }

    /// 建構器模式：設置層級
    pub fn with_depth(mut self, depth: u32) -> Self {
        self.depth = depth;
        self
    }
}

/// 子件用量邊
#[derive(Debug, Clone, PartialEq)]
pub struct BomEdge {
    pub component_sku: String,
    pub quantity_per_parent: Decimal,
}

/// 反查結果：某個上層件每單位用到多少該物料
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WhereUsed {
    pub sku: String,
    pub per_unit_qty: Decimal,
    /// 是否為最上層（不被任何件使用）
    pub is_root: bool,
}

/// 已載入的 BOM 圖
///
/// 同一 (父件, 子件) 重複出現時用量累加。
#[derive(Debug, Clone, Default)]
pub struct BomGraph {
    children: BTreeMap<String, Vec<BomEdge>>,
    parents: BTreeMap<String, Vec<(String, Decimal)>>,
}

impl BomGraph {
    /// 創建空的 BOM 圖
    pub fn new() -> Self {
        Self::default()
    }

    /// 從 BOM 行建立圖
    pub fn from_rows(rows: &[BomNode]) -> Self {
        let mut graph = Self::new();
        for row in rows {
            graph.add_row(row);
        }
        graph
    }

    /// 加入一筆 BOM 行
    pub fn add_row(&mut self, row: &BomNode) {
        let edges = self.children.entry(row.parent_sku.clone()).or_default();
        match edges
            .iter_mut()
            .find(|e| e.component_sku == row.component_sku)
        {
            Some(edge) => edge.quantity_per_parent += row.quantity_per_parent,
            None => edges.push(BomEdge {
                component_sku: row.component_sku.clone(),
                quantity_per_parent: row.quantity_per_parent,
            }),
        }

        let users = self.parents.entry(row.component_sku.clone()).or_default();
        match users.iter_mut().find(|(p, _)| *p == row.parent_sku) {
            Some((_, qty)) => *qty += row.quantity_per_parent,
            None => users.push((row.parent_sku.clone(), row.quantity_per_parent)),
        }
    }

    /// 直接子件
    pub fn children(&self, sku: &str) -> &[BomEdge] {
        self.children.get(sku).map(Vec::as_slice).unwrap_or(&[])
    }

    /// 是否為組裝件（在 BOM 表中有子件）
    pub fn is_assembly(&self, sku: &str) -> bool {
        self.children.contains_key(sku)
    }

    /// 是否不被任何件使用
    pub fn is_root(&self, sku: &str) -> bool {
        !self.parents.contains_key(sku)
    }

    /// 所有組裝件
    pub fn assemblies(&self) -> impl Iterator<Item = &str> {
        self.children.keys().map(String::as_str)
    }

    /// 邊數
    pub fn edge_count(&self) -> usize {
        self.children.values().map(Vec::len).sum()
    }

    /// 反查：哪些上層件（直接或間接）使用到此物料，以及每單位用量
    ///
    /// 循環路徑會被略過，展開時才會回報。
    pub fn where_used(&self, component_sku: &str) -> Vec<WhereUsed> {
        let mut totals: BTreeMap<String, Decimal> = BTreeMap::new();
        let mut path = BTreeSet::new();
        path.insert(component_sku.to_string());
        self.collect_users(component_sku, Decimal::ONE, &mut path, &mut totals);

        totals
            .into_iter()
            .map(|(sku, per_unit_qty)| WhereUsed {
                is_root: self.is_root(&sku),
                sku,
                per_unit_qty,
            })
            .collect()
    }

    fn collect_users(
        &self,
        sku: &str,
        factor: Decimal,
        path: &mut BTreeSet<String>,
        totals: &mut BTreeMap<String, Decimal>,
    ) {
        let Some(users) = self.parents.get(sku) else {
            return;
        };
        for (parent, qty) in users {
            if path.contains(parent) {
                continue;
            }
            let per_unit = factor * *qty;
            *totals.entry(parent.clone()).or_insert(Decimal::ZERO) += per_unit;

            path.insert(parent.clone());
            self.collect_users(parent, per_unit, path, totals);
            path.remove(parent);
        }
    }
}
