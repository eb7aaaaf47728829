// ==========================================
// 零售分析驾驶舱 - 库存调拨服务
// ==========================================
// 流程: 需求来源 + 产能来源 + 运费模型 → 调拨实例 → 求解 → 调拨报告
// 红线:
// 1) INFEASIBLE 是结构化结果, 报告照常返回 (total_cost = null, 无流量)
// 2) 只有求解器未收敛/内部故障与数据来源故障才作为错误向上传播
// 3) 不输出残缺结果冒充完整结果
// ==========================================

pub mod sources;

use crate::domain::allocation::{ProblemInstance, ShipmentPlan};
use crate::domain::types::{AllocationMode, SolveStatus};
use crate::engine::transport::{SolverConfig, SolverError, TransportSolver};
use crate::repository::error::RepositoryError;
use serde::{Deserialize, Serialize};
use sources::{CapacitySource, CostModel, DemandSource};
use thiserror::Error;
use tracing::{info, instrument, warn};
use uuid::Uuid;

pub use sources::{
    demo_stores, demo_warehouses, DemoNetwork, OrderHistoryDemand, RegionAffinityCostModel,
    StaticCapacity, StaticCostModel, StaticDemand,
};

// ==========================================
// AllocationError - 调拨服务错误
// ==========================================
#[derive(Error, Debug)]
pub enum AllocationError {
    #[error(transparent)]
    Solver(#[from] SolverError),

    #[error("调拨数据加载失败: {0}")]
    Source(#[from] RepositoryError),
}

// ==========================================
// AllocationReport - 调拨报告
// ==========================================

/// 单条线路流量（仅正流量）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkFlowLink {
    pub source: String, // 仓库
    pub target: String, // 门店
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllocationReport {
    pub run_id: String,
    pub mode: AllocationMode,
    pub status: SolveStatus,
    /// 仅 OPTIMAL 时有值
    pub total_cost: Option<f64>,
    pub network_flow: Vec<NetworkFlowLink>,
    /// 服务水平（百分比字符串, 如 "100.0%"）
    pub service_level: String,
    /// 服务水平（0.0 - 1.0）
    pub service_level_ratio: f64,
    pub total_demand: f64,
    pub total_served: f64,
}

impl AllocationReport {
    /// 由问题实例与求解方案构造报告
    ///
    /// 已满足量按门店截断: Σ min(到店量, 需求)
    pub fn from_plan(mode: AllocationMode, instance: &ProblemInstance, plan: &ShipmentPlan) -> Self {
        let total_demand = instance.total_demand();
        let total_served: f64 = if plan.is_optimal() {
            instance
                .stores
                .iter()
                .map(|s| plan.inbound(&s.id).min(s.demand))
                .sum()
        } else {
            0.0
        };

        let ratio = if total_demand > 0.0 {
            (total_served / total_demand).clamp(0.0, 1.0)
        } else if plan.is_optimal() {
            1.0
        } else {
            0.0
        };

        Self {
            run_id: Uuid::new_v4().to_string(),
            mode,
            status: plan.status,
            total_cost: plan.total_cost,
            network_flow: plan
                .flows
                .iter()
                .map(|f| NetworkFlowLink {
                    source: f.warehouse_id.clone(),
                    target: f.store_id.clone(),
                    value: f.quantity,
                })
                .collect(),
            service_level: format_service_level(ratio),
            service_level_ratio: ratio,
            total_demand,
            total_served,
        }
    }
}

/// 服务水平格式化（一位小数百分比）
pub fn format_service_level(ratio: f64) -> String {
    format!("{:.1}%", ratio * 100.0)
}

// ==========================================
// AllocationService - 调拨服务
// ==========================================
#[derive(Debug, Clone, Default)]
pub struct AllocationService {
    solver: TransportSolver,
}

impl AllocationService {
    pub fn new(config: SolverConfig) -> Self {
        Self {
            solver: TransportSolver::new(config),
        }
    }

    pub fn mode(&self) -> AllocationMode {
        self.solver.config().mode
    }

    /// 组装调拨实例
    pub fn build_instance(
        &self,
        demand_source: &dyn DemandSource,
        capacity_source: &dyn CapacitySource,
        cost_model: &dyn CostModel,
    ) -> Result<ProblemInstance, AllocationError> {
        let warehouses = capacity_source.load_warehouses()?;
        let stores = demand_source.load_stores()?;
        let costs = cost_model.build_costs(&warehouses, &stores);
        Ok(ProblemInstance::new(warehouses, stores, costs))
    }

    /// 计算调拨报告
    #[instrument(skip_all, fields(mode = %self.mode()))]
    pub fn compute_allocation_report(
        &self,
        demand_source: &dyn DemandSource,
        capacity_source: &dyn CapacitySource,
        cost_model: &dyn CostModel,
    ) -> Result<AllocationReport, AllocationError> {
        let instance = self.build_instance(demand_source, capacity_source, cost_model)?;
        self.report_for_instance(&instance)
    }

    /// 对给定实例求解并生成报告
    pub fn report_for_instance(&self, instance: &ProblemInstance) -> Result<AllocationReport, AllocationError> {
        let plan = self.solver.solve(instance)?;
        let report = AllocationReport::from_plan(self.mode(), instance, &plan);

        match report.status {
            SolveStatus::Optimal => info!(
                run_id = %report.run_id,
                total_cost = ?report.total_cost,
                lanes = report.network_flow.len(),
                service_level = %report.service_level,
                "调拨求解完成"
            ),
            _ => warn!(
                run_id = %report.run_id,
                status = %report.status,
                total_demand = report.total_demand,
                total_capacity = instance.total_capacity(),
                "调拨无可行方案"
            ),
        }

        Ok(report)
    }
}
