// ==========================================
// 零售分析驾驶舱 - 应用层
// ==========================================
// 职责: 依赖装配, 连接入口 (CLI / 宿主服务) 与 API 层
// ==========================================

pub mod state;

// 重导出
pub use state::{get_default_db_path, AppState, DB_PATH_ENV};
