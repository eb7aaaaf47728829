// ==========================================
// 零售分析驾驶舱 - 引擎层
// ==========================================
// 职责: 调拨求解、调拨报告、需求预测
// 红线: Engine 不拼 SQL, 数据经注入的来源/仓储获取
// ==========================================

pub mod allocation;
pub mod forecast;
pub mod transport;

// 重导出核心引擎
pub use allocation::{AllocationError, AllocationReport, AllocationService, NetworkFlowLink};
pub use forecast::{ForecastError, ForecastPipeline, ModelRegistry, PipelineSettings};
pub use transport::{SolverConfig, SolverError, TransportSolver};
