// ==========================================
// 零售分析驾驶舱 - 领域模型层
// ==========================================
// 职责: 定义领域实体、类型
// 红线: 不含数据访问逻辑,不含引擎逻辑
// ==========================================

pub mod allocation;
pub mod forecast;
pub mod order;
pub mod types;

// 重导出核心类型
pub use allocation::{CostLane, CostMatrix, ProblemInstance, ShipmentFlow, ShipmentPlan, Store, Warehouse};
pub use forecast::{ExogenousAssumptions, ForecastPoint, ForecastRequest, ForecastSeries};
pub use order::{OrderRecord, StoreDemand};
pub use types::{AllocationMode, DemandSourceKind, SolveStatus};
