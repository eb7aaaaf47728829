// ==========================================
// 零售分析驾驶舱 - 调拨配置读取 Trait
// ==========================================
// 职责: 定义调拨服务所需的配置读取接口（不包含实现）
// 红线: 不包含配置写入、不包含业务逻辑
// ==========================================

use crate::config::ConfigResult;
use crate::domain::allocation::Warehouse;
use crate::domain::types::{AllocationMode, DemandSourceKind};
use async_trait::async_trait;

// ==========================================
// AllocationConfigReader Trait
// ==========================================
// 实现者: ConfigManager（从 config_kv 表读取）
#[async_trait]
pub trait AllocationConfigReader: Send + Sync {
    // ===== 求解器配置 =====

    /// 获取调拨模式
    ///
    /// # 默认值
    /// - STRICT
    async fn get_allocation_mode(&self) -> ConfigResult<AllocationMode>;

    /// 获取求解器增广次数上限
    ///
    /// # 默认值
    /// - 100000
    async fn get_solver_max_iterations(&self) -> ConfigResult<usize>;

    /// 是否要求整数发运量
    ///
    /// # 默认值
    /// - true
    async fn get_integral_flow(&self) -> ConfigResult<bool>;

    // ===== 网络数据配置 =====

    /// 获取需求数据来源
    ///
    /// # 默认值
    /// - DEMO
    async fn get_demand_source(&self) -> ConfigResult<DemandSourceKind>;

    /// 获取历史订单回看天数（仅 ORDER_HISTORY 生效）
    ///
    /// # 默认值
    /// - 90
    async fn get_demand_lookback_days(&self) -> ConfigResult<i64>;

    /// 获取仓库网络（JSON: [{id, capacity, region}]）
    ///
    /// # 默认值
    /// - 演示仓库 WH_North / WH_South / WH_East / WH_West
    async fn get_warehouse_network(&self) -> ConfigResult<Vec<Warehouse>>;

    // ===== 运费配置 =====

    /// 同区域单位运费
    ///
    /// # 默认值
    /// - 2
    async fn get_lane_cost_near(&self) -> ConfigResult<f64>;

    /// 跨区域单位运费
    ///
    /// # 默认值
    /// - 5
    async fn get_lane_cost_far(&self) -> ConfigResult<f64>;
}
