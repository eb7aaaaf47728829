// ==========================================
// 零售分析驾驶舱 - 调拨数据来源
// ==========================================
// 职责: 需求来源 / 产能来源 / 运费模型 三个注入点
// 实现:
// - DemoNetwork: 固定演示拓扑 (4 仓 x 10 店)
// - StaticDemand / StaticCapacity: 外部直接给定
// - OrderHistoryDemand: 历史订单日均销量
// - RegionAffinityCostModel: 同区域近价, 跨区域远价
// ==========================================

use crate::domain::allocation::{CostMatrix, Store, Warehouse};
use crate::repository::error::RepositoryResult;
use crate::repository::order_repo::OrderRepository;
use chrono::Duration;
use std::sync::Arc;

/// 演示仓库区域
pub const DEMO_REGIONS: [&str; 4] = ["North", "South", "East", "West"];
/// 演示仓库产能
pub const DEMO_WAREHOUSE_CAPACITY: f64 = 5_000.0;
/// 演示门店数
pub const DEMO_STORE_COUNT: usize = 10;
/// 演示门店需求
pub const DEMO_STORE_DEMAND: f64 = 100.0;

// ==========================================
// 注入点 Trait
// ==========================================

/// 需求来源
pub trait DemandSource: Send + Sync {
    fn load_stores(&self) -> RepositoryResult<Vec<Store>>;
}

/// 产能来源
pub trait CapacitySource: Send + Sync {
    fn load_warehouses(&self) -> RepositoryResult<Vec<Warehouse>>;
}

/// 运费模型
pub trait CostModel: Send + Sync {
    fn build_costs(&self, warehouses: &[Warehouse], stores: &[Store]) -> CostMatrix;
}

// ==========================================
// 演示拓扑
// ==========================================

/// 演示仓库: WH_North / WH_South / WH_East / WH_West
pub fn demo_warehouses() -> Vec<Warehouse> {
    DEMO_REGIONS
        .iter()
        .map(|region| Warehouse::new(format!("WH_{}", region), DEMO_WAREHOUSE_CAPACITY).with_region(*region))
        .collect()
}

/// 演示门店: Store_1 .. Store_10
///
/// 门店不带区域, 区域亲和模型下所有线路均按跨区运费计价
pub fn demo_stores() -> Vec<Store> {
    (1..=DEMO_STORE_COUNT)
        .map(|n| Store::new(store_id(n), DEMO_STORE_DEMAND))
        .collect()
}

/// 门店标识
pub fn store_id(n: impl std::fmt::Display) -> String {
    format!("Store_{}", n)
}

/// 演示网络（同时提供需求与产能）
#[derive(Debug, Clone, Copy, Default)]
pub struct DemoNetwork;

impl DemandSource for DemoNetwork {
    fn load_stores(&self) -> RepositoryResult<Vec<Store>> {
        Ok(demo_stores())
    }
}

impl CapacitySource for DemoNetwork {
    fn load_warehouses(&self) -> RepositoryResult<Vec<Warehouse>> {
        Ok(demo_warehouses())
    }
}

// ==========================================
// 外部给定数据
// ==========================================

#[derive(Debug, Clone, Default)]
pub struct StaticDemand(pub Vec<Store>);

impl DemandSource for StaticDemand {
    fn load_stores(&self) -> RepositoryResult<Vec<Store>> {
        Ok(self.0.clone())
    }
}

#[derive(Debug, Clone, Default)]
pub struct StaticCapacity(pub Vec<Warehouse>);

impl CapacitySource for StaticCapacity {
    fn load_warehouses(&self) -> RepositoryResult<Vec<Warehouse>> {
        Ok(self.0.clone())
    }
}

/// 给定运费矩阵（忽略仓库/门店列表, 原样返回）
#[derive(Debug, Clone, Default)]
pub struct StaticCostModel(pub CostMatrix);

impl CostModel for StaticCostModel {
    fn build_costs(&self, _warehouses: &[Warehouse], _stores: &[Store]) -> CostMatrix {
        self.0.clone()
    }
}

// ==========================================
// OrderHistoryDemand - 历史订单需求
// ==========================================
// 门店需求 = 回看窗口内日均销量向上取整
// 窗口终点 = 最新订单日期（数据集是离线快照, 不以当前日期为准）
pub struct OrderHistoryDemand {
    repo: Arc<OrderRepository>,
    lookback_days: i64,
}

impl OrderHistoryDemand {
    pub fn new(repo: Arc<OrderRepository>, lookback_days: i64) -> Self {
        Self {
            repo,
            lookback_days: lookback_days.max(1),
        }
    }
}

impl DemandSource for OrderHistoryDemand {
    fn load_stores(&self) -> RepositoryResult<Vec<Store>> {
        let latest = match self.repo.latest_order_date()? {
            Some(d) => d,
            None => {
                tracing::warn!("orders 表为空, 需求为空");
                return Ok(Vec::new());
            }
        };
        let date_from = latest - Duration::days(self.lookback_days - 1);

        let demands = self.repo.store_demand_between(date_from, latest)?;
        tracing::debug!(
            date_from = %date_from,
            date_to = %latest,
            stores = demands.len(),
            "历史订单需求已加载"
        );

        Ok(demands
            .into_iter()
            .map(|d| Store::new(store_id(&d.store_id), d.avg_daily_quantity.ceil()).with_region(d.region))
            .collect())
    }
}

// ==========================================
// RegionAffinityCostModel - 区域亲和运费
// ==========================================
// 仓库与门店区域相同 => near, 否则 far (任一方缺区域视为跨区)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RegionAffinityCostModel {
    pub near: f64,
    pub far: f64,
}

impl Default for RegionAffinityCostModel {
    fn default() -> Self {
        Self { near: 2.0, far: 5.0 }
    }
}

impl CostModel for RegionAffinityCostModel {
    fn build_costs(&self, warehouses: &[Warehouse], stores: &[Store]) -> CostMatrix {
        let mut costs = CostMatrix::new();
        for w in warehouses {
            for s in stores {
                let same_region = matches!((&w.region, &s.region), (Some(a), Some(b)) if a == b);
                costs.set(&w.id, &s.id, if same_region { self.near } else { self.far });
            }
        }
        costs
    }
}
