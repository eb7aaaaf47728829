// ==========================================
// 零售分析驾驶舱 - API 层
// ==========================================
// 职责: 提供业务 API 接口（读取配置、组装引擎、转换错误）
// ==========================================

pub mod allocation_api;
pub mod error;
pub mod forecast_api;

// 重导出核心类型
pub use allocation_api::AllocationApi;
pub use error::{ApiError, ApiErrorResponse, ApiResult, ErrorClass};
pub use forecast_api::{ForecastApi, ForecastQuery};
