// ==========================================
// 零售分析驾驶舱 - 配置层
// ==========================================
// 职责: 调拨/预测运行参数读取
// 存储: config_kv 表 (scope_id = 'global')
// ==========================================

pub mod allocation_config_trait;
pub mod config_manager;
pub mod forecast_config_trait;

use std::error::Error;

/// 配置读取结果
pub type ConfigResult<T> = Result<T, Box<dyn Error + Send + Sync>>;

// 重导出核心配置管理器
pub use allocation_config_trait::AllocationConfigReader;
pub use config_manager::{config_keys, ConfigManager};
pub use forecast_config_trait::ForecastConfigReader;
