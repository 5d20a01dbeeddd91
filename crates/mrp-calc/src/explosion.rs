//! BOM 展開

use mrp_core::{BomGraph, MrpError};
use rust_decimal::Decimal;
use std::collections::{BTreeMap, HashMap};
use std::rc::Rc;

/// 已展開的子樹（每單位用量與子樹高度）
#[derive(Debug)]
struct Subtree {
    components: BTreeMap<String, Decimal>,
    height: u32,
}

/// BOM 展開器
///
/// 以深度優先走訪 BOM 圖，沿路徑相乘用量、跨路徑加總。
/// 只回傳採購件（不在 BOM 表中作為父件的 SKU）；組裝件本身不列入。
pub struct BomExploder<'a> {
    graph: &'a BomGraph,
    max_depth: u32,
}

impl<'a> BomExploder<'a> {
    /// 創建新的展開器
    pub fn new(graph: &'a BomGraph, max_depth: u32) -> Self {
        Self { graph, max_depth }
    }

    /// 展開指定數量的成品
    pub fn explode(
        &self,
        finished_sku: &str,
        build_qty: Decimal,
    ) -> mrp_core::Result<BTreeMap<String, Decimal>> {
        Ok(self
            .per_unit(finished_sku)?
            .into_iter()
            .map(|(sku, qty)| (sku, qty * build_qty))
            .collect())
    }

    /// 每單位成品所需的採購件用量
    ///
    /// 不在 BOM 表中的 SKU 視為自身一單位的採購需求。
    pub fn per_unit(&self, finished_sku: &str) -> mrp_core::Result<BTreeMap<String, Decimal>> {
        let mut memo = HashMap::new();
        let mut path = Vec::new();
        let subtree = self.visit(finished_sku, finished_sku, 0, &mut path, &mut memo)?;

        Ok(subtree
            .components
            .iter()
            .filter(|(_, qty)| !qty.is_zero())
            .map(|(sku, qty)| (sku.clone(), *qty))
            .collect())
    }

    fn visit(
        &self,
        root: &str,
        sku: &str,
        depth: u32,
        path: &mut Vec<String>,
        memo: &mut HashMap<String, Rc<Subtree>>,
    ) -> mrp_core::Result<Rc<Subtree>> {
        // 回到祖先節點即為循環
        if path.iter().any(|ancestor| ancestor == sku) {
            let mut cycle = path.clone();
            cycle.push(sku.to_string());
            return Err(MrpError::CyclicBom {
                root: root.to_string(),
                path: cycle,
            });
        }

        if !self.graph.is_assembly(sku) {
            let mut components = BTreeMap::new();
            components.insert(sku.to_string(), Decimal::ONE);
            return Ok(Rc::new(Subtree {
                components,
                height: 0,
            }));
        }

        if let Some(cached) = memo.get(sku) {
            if depth + cached.height > self.max_depth {
                return Err(self.depth_exceeded(root));
            }
            return Ok(Rc::clone(cached));
        }

        if depth + 1 > self.max_depth {
            return Err(self.depth_exceeded(root));
        }

        path.push(sku.to_string());
        let mut components: BTreeMap<String, Decimal> = BTreeMap::new();
        let mut height = 0;

        for edge in self.graph.children(sku) {
            let child = self.visit(root, &edge.component_sku, depth + 1, path, memo)?;
            for (component, qty) in &child.components {
                *components.entry(component.clone()).or_insert(Decimal::ZERO) +=
                    *qty * edge.quantity_per_parent;
            }
            height = height.max(child.height + 1);
        }
        path.pop();

        let subtree = Rc::new(Subtree { components, height });
        memo.insert(sku.to_string(), Rc::clone(&subtree));
        Ok(subtree)
    }

    fn depth_exceeded(&self, root: &str) -> MrpError {
        MrpError::BomDepthExceeded {
            root: root.to_string(),
            max_depth: self.max_depth,
        }
    }
}
