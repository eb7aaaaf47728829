// ==========================================
// 零售分析驾驶舱 - 运输问题求解器
// ==========================================
// 问题: min Σ c[w][s]·x[w][s]
//       s.t. Σ_w x[w][s] ≥ demand[s]   (门店需求为严格下界)
//            Σ_s x[w][s] ≤ capacity[w] (仓库产能上限)
//            x ≥ 0
// 建模: 源 → 仓库(产能边) → 门店(运费边) → 汇(需求下界边), 汇 → 源 回流边
// 算法: 带下界最小费用环流 (network::FlowNetwork)
// ==========================================
// 红线:
// 1) 总产能 < 总需求 时直接返回 INFEASIBLE, 不做优化
// 2) 同输入同输出: 仓库/门店按标识字典序建图
// 3) 校验错误与 INFEASIBLE 严格区分
// 4) 增广次数有上限, 超限报告未收敛
// ==========================================

pub mod network;

use crate::domain::allocation::{ProblemInstance, ShipmentFlow, ShipmentPlan, Store, Warehouse};
use crate::domain::types::AllocationMode;
use network::{ArcId, FlowError, FlowNetwork};
use std::collections::HashSet;
use thiserror::Error;
use tracing::instrument;

/// 运费定点精度（1e-6）
pub const COST_SCALE: f64 = 1_000_000.0;
/// 非整数模式下的数量定点精度（1/1000 件）
pub const FRACTIONAL_QUANTITY_SCALE: f64 = 1_000.0;
/// 单位运费上限
pub const MAX_UNIT_COST: f64 = 1_000_000.0;
/// 单节点数量上限
pub const MAX_QUANTITY: f64 = 1_000_000_000.0;
/// 默认增广次数上限
pub const DEFAULT_MAX_ITERATIONS: usize = 100_000;

/// 判定数量落在定点网格上的容差
const GRID_ABSOLUTE_TOLERANCE: f64 = 1e-9;
const GRID_RELATIVE_TOLERANCE: f64 = 1e-12;

// ==========================================
// SolverError - 求解器错误
// ==========================================
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SolverError {
    /// 实例非法（负产能/负需求/负运费/标识重复等），属于调用方输入错误
    #[error("调拨实例校验失败: {0}")]
    InvalidInstance(String),

    /// 增广次数超限
    #[error("求解未收敛: 增广次数达到上限 {iterations}")]
    DidNotConverge { iterations: usize },

    /// 残量网络出现负环（非负运费下不应出现，属于内部错误）
    #[error("求解器内部错误: 残量网络存在负环")]
    NegativeCycle,
}

impl From<FlowError> for SolverError {
    fn from(err: FlowError) -> Self {
        match err {
            FlowError::IterationLimit { iterations } => SolverError::DidNotConverge { iterations },
            FlowError::NegativeCycle => SolverError::NegativeCycle,
            FlowError::InvalidBounds { lower, upper } => SolverError::InvalidInstance(format!(
                "边界非法: lower={}, upper={}",
                lower, upper
            )),
        }
    }
}

pub type SolverResult<T> = Result<T, SolverError>;

// ==========================================
// SolverConfig - 求解器配置
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SolverConfig {
    pub mode: AllocationMode,
    /// 增广次数上限
    pub max_iterations: usize,
    /// 整数发运: 产能/需求必须为整数件, 方案流量为整数件
    pub integral: bool,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            mode: AllocationMode::Strict,
            max_iterations: DEFAULT_MAX_ITERATIONS,
            integral: true,
        }
    }
}

impl SolverConfig {
    fn quantity_scale(&self) -> f64 {
        if self.integral {
            1.0
        } else {
            FRACTIONAL_QUANTITY_SCALE
        }
    }
}

/// 使用默认配置求解（严格模式、整数发运）
pub fn solve(instance: &ProblemInstance) -> SolverResult<ShipmentPlan> {
    TransportSolver::new(SolverConfig::default()).solve(instance)
}

// ==========================================
// TransportSolver - 运输问题求解器
// ==========================================
// 无状态, 可跨线程并发复用
#[derive(Debug, Clone, Default)]
pub struct TransportSolver {
    config: SolverConfig,
}

/// 建图后的线路（用于回填方案）
struct LaneArc {
    warehouse_id: String,
    store_id: String,
    unit_cost: f64,
    arc: ArcId,
}

/// 定点化后的实例
struct ScaledInstance {
    capacities: Vec<i64>,
    demands: Vec<i64>,
    /// (仓库序号, 门店序号, 定点运费, 原始运费)
    lanes: Vec<(usize, usize, i64, f64)>,
}

impl TransportSolver {
    pub fn new(config: SolverConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    /// 求解调拨实例
    ///
    /// # 返回
    /// - Ok(plan): status 为 OPTIMAL 或 INFEASIBLE
    /// - Err(InvalidInstance): 实例非法
    /// - Err(DidNotConverge / NegativeCycle): 内部故障
    #[instrument(skip(self, instance), fields(
        warehouses = instance.warehouses.len(),
        stores = instance.stores.len(),
        mode = %self.config.mode
    ))]
    pub fn solve(&self, instance: &ProblemInstance) -> SolverResult<ShipmentPlan> {
        // 1. 输入按标识排序, 保证建图顺序与输入顺序无关
        let mut warehouses = instance.warehouses.clone();
        warehouses.sort_by(|a, b| a.id.cmp(&b.id));
        let mut stores = instance.stores.clone();
        stores.sort_by(|a, b| a.id.cmp(&b.id));

        let scaled = self.validate_and_scale(instance, &warehouses, &stores)?;

        // 2. 严格模式可行性预检（定点整数比较, 不受浮点累加误差影响）
        let total_supply: i64 = scaled.capacities.iter().sum();
        let total_required: i64 = scaled.demands.iter().sum();
        if self.config.mode == AllocationMode::Strict && total_supply < total_required {
            tracing::info!(
                total_capacity = instance.total_capacity(),
                total_demand = instance.total_demand(),
                "总产能不足以覆盖总需求, 判定 INFEASIBLE"
            );
            return Ok(ShipmentPlan::infeasible());
        }

        // 3. 建图
        // 节点编号: 0 = 源, 1..=W = 仓库, W+1..=W+S = 门店, W+S+1 = 汇
        let w_count = warehouses.len();
        let s_count = stores.len();
        let source = 0;
        let sink = w_count + s_count + 1;
        let warehouse_node = |i: usize| 1 + i;
        let store_node = |j: usize| 1 + w_count + j;

        let unbounded = total_supply.max(total_required);

        let mut network = FlowNetwork::new(w_count + s_count + 2);
        for (i, capacity) in scaled.capacities.iter().enumerate() {
            network.add_arc(source, warehouse_node(i), 0, *capacity, 0)?;
        }

        let mut lane_arcs = Vec::with_capacity(scaled.lanes.len());
        for (i, j, cost, unit_cost) in &scaled.lanes {
            let arc = network.add_arc(warehouse_node(*i), store_node(*j), 0, unbounded, *cost)?;
            lane_arcs.push(LaneArc {
                warehouse_id: warehouses[*i].id.clone(),
                store_id: stores[*j].id.clone(),
                unit_cost: *unit_cost,
                arc,
            });
        }

        // 4. 求解
        let solution = match self.config.mode {
            AllocationMode::Strict => {
                for (j, demand) in scaled.demands.iter().enumerate() {
                    // 需求是下界, 上界放开（非负运费下最优解不会超发）
                    network.add_arc(store_node(j), sink, *demand, unbounded, 0)?;
                }
                network.add_arc(sink, source, 0, unbounded, 0)?;

                match network.min_cost_circulation(self.config.max_iterations) {
                    Ok(Some(solution)) => solution,
                    Ok(None) => {
                        tracing::info!("存在无法经可用线路满足的门店需求, 判定 INFEASIBLE");
                        return Ok(ShipmentPlan::infeasible());
                    }
                    Err(e) => return Err(self.report_fault(e)),
                }
            }
            AllocationMode::BestEffort => {
                for (j, demand) in scaled.demands.iter().enumerate() {
                    network.add_arc(store_node(j), sink, 0, *demand, 0)?;
                }
                match network.min_cost_max_flow(source, sink, self.config.max_iterations) {
                    Ok((_, solution)) => solution,
                    Err(e) => return Err(self.report_fault(e)),
                }
            }
        };

        // 5. 回填方案（定点整数换算回件数, 零流量线路不输出）
        let quantity_scale = self.config.quantity_scale();
        let flows: Vec<ShipmentFlow> = lane_arcs
            .into_iter()
            .filter_map(|lane| {
                let units = solution.arc_flows[lane.arc];
                if units <= 0 {
                    return None;
                }
                Some(ShipmentFlow {
                    warehouse_id: lane.warehouse_id,
                    store_id: lane.store_id,
                    quantity: units as f64 / quantity_scale,
                    unit_cost: lane.unit_cost,
                })
            })
            .collect();

        let plan = ShipmentPlan::optimal(flows);
        tracing::debug!(
            augmentations = solution.augmentations,
            lanes_used = plan.flows.len(),
            total_cost = plan.total_cost.unwrap_or_default(),
            "调拨求解完成"
        );
        Ok(plan)
    }

    fn report_fault(&self, err: FlowError) -> SolverError {
        let err = SolverError::from(err);
        tracing::error!(error = %err, max_iterations = self.config.max_iterations, "调拨求解失败");
        err
    }

    /// 校验实例并转换为定点整数
    fn validate_and_scale(
        &self,
        instance: &ProblemInstance,
        warehouses: &[Warehouse],
        stores: &[Store],
    ) -> SolverResult<ScaledInstance> {
        let quantity_scale = self.config.quantity_scale();

        let mut warehouse_ids = HashSet::new();
        for warehouse in warehouses {
            if warehouse.id.trim().is_empty() {
                return Err(SolverError::InvalidInstance("仓库标识不能为空".to_string()));
            }
            if !warehouse_ids.insert(warehouse.id.as_str()) {
                return Err(SolverError::InvalidInstance(format!(
                    "仓库标识重复: {}",
                    warehouse.id
                )));
            }
        }
        let mut store_ids = HashSet::new();
        for store in stores {
            if store.id.trim().is_empty() {
                return Err(SolverError::InvalidInstance("门店标识不能为空".to_string()));
            }
            if !store_ids.insert(store.id.as_str()) {
                return Err(SolverError::InvalidInstance(format!(
                    "门店标识重复: {}",
                    store.id
                )));
            }
        }

        // 数量须落在定点网格上（整数模式 1 件, 非整数模式 1/1000 件）, 换算无损
        let capacities = warehouses
            .iter()
            .map(|w| self.scale_quantity(w.capacity, quantity_scale, &format!("仓库{}产能", w.id)))
            .collect::<SolverResult<Vec<_>>>()?;
        let demands = stores
            .iter()
            .map(|s| self.scale_quantity(s.demand, quantity_scale, &format!("门店{}需求", s.id)))
            .collect::<SolverResult<Vec<_>>>()?;

        // 运费矩阵中不得出现未知的仓库/门店
        for (w_id, s_id, _) in instance.costs.lanes() {
            if !warehouse_ids.contains(w_id) || !store_ids.contains(s_id) {
                return Err(SolverError::InvalidInstance(format!(
                    "运费线路引用了未知节点: {} → {}",
                    w_id, s_id
                )));
            }
        }

        let mut lanes = Vec::new();
        for (i, warehouse) in warehouses.iter().enumerate() {
            for (j, store) in stores.iter().enumerate() {
                let Some(unit_cost) = instance.costs.get(&warehouse.id, &store.id) else {
                    continue;
                };
                if unit_cost.is_nan() || unit_cost < 0.0 {
                    return Err(SolverError::InvalidInstance(format!(
                        "线路 {} → {} 运费非法: {}",
                        warehouse.id, store.id, unit_cost
                    )));
                }
                if unit_cost > MAX_UNIT_COST {
                    return Err(SolverError::InvalidInstance(format!(
                        "线路 {} → {} 运费超出上限 {}",
                        warehouse.id, store.id, MAX_UNIT_COST
                    )));
                }
                let scaled_cost = (unit_cost * COST_SCALE).round() as i64;
                lanes.push((i, j, scaled_cost, unit_cost));
            }
        }

        Ok(ScaledInstance {
            capacities,
            demands,
            lanes,
        })
    }

    fn scale_quantity(&self, value: f64, scale: f64, label: &str) -> SolverResult<i64> {
        if !value.is_finite() || value < 0.0 {
            return Err(SolverError::InvalidInstance(format!(
                "{}非法: {}",
                label, value
            )));
        }
        if value > MAX_QUANTITY {
            return Err(SolverError::InvalidInstance(format!(
                "{}超出上限 {}",
                label, MAX_QUANTITY
            )));
        }

        let scaled = value * scale;
        let nearest = scaled.round();
        if (scaled - nearest).abs() > grid_tolerance(scaled) {
            let message = if self.config.integral {
                format!("{}须为整数件（整数发运模式）: {}", label, value)
            } else {
                format!("{}精度超过 1/{} 件: {}", label, scale, value)
            };
            return Err(SolverError::InvalidInstance(message));
        }
        Ok(nearest as i64)
    }
}

/// 定点换算的浮点噪声容差（如 8.001 × 1000 = 8000.999999999999）
fn grid_tolerance(scaled: f64) -> f64 {
    (scaled.abs() * GRID_RELATIVE_TOLERANCE).max(GRID_ABSOLUTE_TOLERANCE)
}

#[cfg(test)]
mod tests;
