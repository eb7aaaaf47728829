// ==========================================
// 零售分析驾驶舱 - 库存调拨 API
// ==========================================
// 职责: 读取调拨配置 → 组装数据来源 → 调用调拨服务 → 返回报告
// 架构: API 层 → AllocationService (engine) → TransportSolver
// ==========================================

use std::sync::Arc;

use crate::api::error::ApiResult;
use crate::config::AllocationConfigReader;
use crate::domain::allocation::ProblemInstance;
use crate::domain::types::DemandSourceKind;
use crate::engine::allocation::{
    AllocationReport, AllocationService, DemoNetwork, OrderHistoryDemand, RegionAffinityCostModel,
    StaticCapacity,
};
use crate::engine::transport::SolverConfig;
use crate::repository::order_repo::OrderRepository;

// ==========================================
// AllocationApi - 库存调拨 API
// ==========================================
pub struct AllocationApi {
    config: Arc<dyn AllocationConfigReader>,
    order_repo: Arc<OrderRepository>,
}

impl AllocationApi {
    /// 创建新的 AllocationApi 实例
    ///
    /// # 参数
    /// - config: 调拨配置读取器
    /// - order_repo: 历史订单仓储（demand_source = ORDER_HISTORY 时使用）
    pub fn new(config: Arc<dyn AllocationConfigReader>, order_repo: Arc<OrderRepository>) -> Self {
        Self { config, order_repo }
    }

    /// 按当前配置计算调拨报告（无需参数）
    ///
    /// # 返回
    /// - Ok(report): status 为 OPTIMAL 或 INFEASIBLE
    /// - Err(ValidationError): 网络数据非法（如负产能）
    /// - Err(SolverNonconvergence / DatabaseError): 内部故障
    pub async fn compute_allocation_report(&self) -> ApiResult<AllocationReport> {
        let service = self.build_service().await?;
        let capacity = StaticCapacity(self.config.get_warehouse_network().await?);
        let cost_model = self.cost_model().await?;

        let report = match self.config.get_demand_source().await? {
            DemandSourceKind::Demo => {
                service.compute_allocation_report(&DemoNetwork, &capacity, &cost_model)?
            }
            DemandSourceKind::OrderHistory => {
                let lookback_days = self.config.get_demand_lookback_days().await?;
                let demand = OrderHistoryDemand::new(Arc::clone(&self.order_repo), lookback_days);
                service.compute_allocation_report(&demand, &capacity, &cost_model)?
            }
        };

        Ok(report)
    }

    /// 对外部给定的调拨实例计算报告（求解参数仍取自配置）
    pub async fn compute_report_for_instance(&self, instance: &ProblemInstance) -> ApiResult<AllocationReport> {
        let service = self.build_service().await?;
        Ok(service.report_for_instance(instance)?)
    }

    async fn build_service(&self) -> ApiResult<AllocationService> {
        let config = SolverConfig {
            mode: self.config.get_allocation_mode().await?,
            max_iterations: self.config.get_solver_max_iterations().await?,
            integral: self.config.get_integral_flow().await?,
        };
        Ok(AllocationService::new(config))
    }

    async fn cost_model(&self) -> ApiResult<RegionAffinityCostModel> {
        Ok(RegionAffinityCostModel {
            near: self.config.get_lane_cost_near().await?,
            far: self.config.get_lane_cost_far().await?,
        })
    }
}
