// ==========================================
// 零售分析驾驶舱 - 库存调拨领域模型
// ==========================================
// 职责: 仓库/门店/运费矩阵/调拨问题实例/发运方案
// 红线: 纯数据, 不含求解逻辑
// 生命周期: 每次请求按当前需求/产能快照构造, 不落库, 不跨请求缓存
// ==========================================

use crate::domain::types::SolveStatus;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ==========================================
// Warehouse - 仓库 (供给节点)
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Warehouse {
    pub id: String,             // 仓库标识 (如 WH_North)
    pub capacity: f64,          // 可发运上限 (件)
    #[serde(default)]
    pub region: Option<String>, // 所属区域 (区域亲和运费模型使用)
}

impl Warehouse {
    pub fn new(id: impl Into<String>, capacity: f64) -> Self {
        Self {
            id: id.into(),
            capacity,
            region: None,
        }
    }

    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }
}

// ==========================================
// Store - 门店 (需求节点)
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Store {
    pub id: String,
    pub demand: f64, // 需求量 (件), 严格下界
    #[serde(default)]
    pub region: Option<String>,
}

impl Store {
    pub fn new(id: impl Into<String>, demand: f64) -> Self {
        Self {
            id: id.into(),
            demand,
            region: None,
        }
    }

    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }
}

// ==========================================
// CostMatrix - 单位运费矩阵
// ==========================================
// 键: (warehouse_id, store_id)
// 缺省键 或 +∞ 表示该线路禁用
// JSON 形式: [{"warehouse_id", "store_id", "unit_cost"}]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<CostLane>", into = "Vec<CostLane>")]
pub struct CostMatrix {
    lanes: BTreeMap<(String, String), f64>,
}

/// 单条线路运费（CostMatrix 的序列化形式）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostLane {
    pub warehouse_id: String,
    pub store_id: String,
    pub unit_cost: f64,
}

impl From<Vec<CostLane>> for CostMatrix {
    fn from(lanes: Vec<CostLane>) -> Self {
        let mut matrix = CostMatrix::new();
        for lane in lanes {
            matrix.set(&lane.warehouse_id, &lane.store_id, lane.unit_cost);
        }
        matrix
    }
}

impl From<CostMatrix> for Vec<CostLane> {
    fn from(matrix: CostMatrix) -> Self {
        matrix
            .lanes
            .into_iter()
            .map(|((warehouse_id, store_id), unit_cost)| CostLane {
                warehouse_id,
                store_id,
                unit_cost,
            })
            .collect()
    }
}

impl CostMatrix {
    pub fn new() -> Self {
        Self::default()
    }

    /// 按稠密矩阵构造（rows[i][j] = warehouses[i] → stores[j]）
    ///
    /// 行列数与仓库/门店数不一致时返回 Err，由调用方转为校验错误
    pub fn from_rows(
        warehouses: &[Warehouse],
        stores: &[Store],
        rows: &[Vec<f64>],
    ) -> Result<Self, String> {
        if rows.len() != warehouses.len() {
            return Err(format!(
                "运费矩阵行数({})与仓库数({})不一致",
                rows.len(),
                warehouses.len()
            ));
        }

        let mut matrix = Self::new();
        for (warehouse, row) in warehouses.iter().zip(rows) {
            if row.len() != stores.len() {
                return Err(format!(
                    "运费矩阵第{}行列数({})与门店数({})不一致",
                    warehouse.id,
                    row.len(),
                    stores.len()
                ));
            }
            for (store, cost) in stores.iter().zip(row) {
                matrix.set(&warehouse.id, &store.id, *cost);
            }
        }
        Ok(matrix)
    }

    pub fn set(&mut self, warehouse_id: &str, store_id: &str, unit_cost: f64) {
        self.lanes
            .insert((warehouse_id.to_string(), store_id.to_string()), unit_cost);
    }

    /// 禁用线路（等价于运费 +∞）
    pub fn disallow(&mut self, warehouse_id: &str, store_id: &str) {
        self.lanes.remove(&(warehouse_id.to_string(), store_id.to_string()));
    }

    /// 查询线路单位运费
    ///
    /// # 返回
    /// - Some(cost): 线路可用（cost 可能为 NaN/负数，由求解器校验）
    /// - None: 线路缺省或运费为 +∞
    pub fn get(&self, warehouse_id: &str, store_id: &str) -> Option<f64> {
        self.lanes
            .get(&(warehouse_id.to_string(), store_id.to_string()))
            .copied()
            .filter(|c| *c != f64::INFINITY)
    }

    /// 所有显式登记的线路（含 +∞），按 (仓库, 门店) 字典序
    pub fn lanes(&self) -> impl Iterator<Item = (&str, &str, f64)> {
        self.lanes
            .iter()
            .map(|((w, s), c)| (w.as_str(), s.as_str(), *c))
    }

    pub fn len(&self) -> usize {
        self.lanes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lanes.is_empty()
    }
}

// ==========================================
// ProblemInstance - 调拨问题实例
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProblemInstance {
    pub warehouses: Vec<Warehouse>,
    pub stores: Vec<Store>,
    pub costs: CostMatrix,
}

impl ProblemInstance {
    pub fn new(warehouses: Vec<Warehouse>, stores: Vec<Store>, costs: CostMatrix) -> Self {
        Self {
            warehouses,
            stores,
            costs,
        }
    }

    pub fn total_capacity(&self) -> f64 {
        self.warehouses.iter().map(|w| w.capacity).sum()
    }

    pub fn total_demand(&self) -> f64 {
        self.stores.iter().map(|s| s.demand).sum()
    }
}

// ==========================================
// ShipmentFlow - 单条线路发运量
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShipmentFlow {
    pub warehouse_id: String,
    pub store_id: String,
    pub quantity: f64,  // > 0
    pub unit_cost: f64,
}

impl ShipmentFlow {
    pub fn cost(&self) -> f64 {
        self.quantity * self.unit_cost
    }
}

// ==========================================
// ShipmentPlan - 发运方案 (求解结果, 只读)
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShipmentPlan {
    pub status: SolveStatus,
    /// 仅含正流量线路, 按 (仓库, 门店) 字典序
    pub flows: Vec<ShipmentFlow>,
    /// 仅 OPTIMAL 时有值
    pub total_cost: Option<f64>,
}

impl ShipmentPlan {
    /// 不可行方案：无流量、无总成本
    pub fn infeasible() -> Self {
        Self {
            status: SolveStatus::Infeasible,
            flows: Vec::new(),
            total_cost: None,
        }
    }

    /// 最优方案：总成本按流量 × 单位运费重新汇总
    pub fn optimal(flows: Vec<ShipmentFlow>) -> Self {
        let total_cost = flows.iter().map(ShipmentFlow::cost).sum();
        Self {
            status: SolveStatus::Optimal,
            flows,
            total_cost: Some(total_cost),
        }
    }

    pub fn is_optimal(&self) -> bool {
        self.status == SolveStatus::Optimal
    }

    /// 指定线路发运量（无流量返回 0）
    pub fn flow(&self, warehouse_id: &str, store_id: &str) -> f64 {
        self.flows
            .iter()
            .find(|f| f.warehouse_id == warehouse_id && f.store_id == store_id)
            .map(|f| f.quantity)
            .unwrap_or(0.0)
    }

    /// 门店入库总量
    pub fn inbound(&self, store_id: &str) -> f64 {
        self.flows
            .iter()
            .filter(|f| f.store_id == store_id)
            .map(|f| f.quantity)
            .sum()
    }

    /// 仓库出库总量
    pub fn outbound(&self, warehouse_id: &str) -> f64 {
        self.flows
            .iter()
            .filter(|f| f.warehouse_id == warehouse_id)
            .map(|f| f.quantity)
            .sum()
    }

    pub fn total_shipped(&self) -> f64 {
        self.flows.iter().map(|f| f.quantity).sum()
    }
}
