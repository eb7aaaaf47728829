// ==========================================
// 零售分析驾驶舱 - 应用状态
// ==========================================
// 职责: 管理应用级别的共享状态和API实例
// 共享资源: 单一数据库连接 / 单一模型产物注册表
// ==========================================

use std::sync::{Arc, Mutex};

use crate::api::{AllocationApi, ForecastApi};
use crate::config::config_manager::ConfigManager;
use crate::db::{ensure_schema, open_sqlite_connection};
use crate::engine::forecast::ModelRegistry;
use crate::repository::order_repo::OrderRepository;

/// 默认数据库路径环境变量
pub const DB_PATH_ENV: &str = "RETAIL_ANALYTICS_DB";

/// 应用状态
///
/// 包含所有API实例和共享资源
pub struct AppState {
    /// 数据库路径
    pub db_path: String,

    /// 库存调拨API
    pub allocation_api: Arc<AllocationApi>,

    /// 需求预测API
    pub forecast_api: Arc<ForecastApi>,

    /// 配置管理器
    pub config_manager: Arc<ConfigManager>,

    /// 模型产物注册表（进程内只加载一次）
    pub model_registry: Arc<ModelRegistry>,
}

impl AppState {
    /// 创建新的AppState实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    ///
    /// # 返回
    /// - Ok(AppState): 初始化成功
    /// - Err(String): 初始化错误
    pub fn new(db_path: String) -> Result<Self, String> {
        tracing::info!("初始化AppState，数据库路径: {}", db_path);

        // 创建数据库连接（共享连接）
        let conn = open_sqlite_connection(&db_path).map_err(|e| format!("无法打开数据库: {}", e))?;
        ensure_schema(&conn).map_err(|e| format!("数据库建表失败: {}", e))?;
        let conn = Arc::new(Mutex::new(conn));

        let config_manager = Arc::new(
            ConfigManager::from_connection(conn.clone())
                .map_err(|e| format!("无法创建ConfigManager: {}", e))?,
        );
        let order_repo = Arc::new(OrderRepository::from_connection(conn));

        let model_dir = config_manager
            .model_dir()
            .map_err(|e| format!("无法读取模型目录配置: {}", e))?;
        tracing::info!("模型产物目录: {}", model_dir.display());
        let model_registry = Arc::new(ModelRegistry::from_dir(model_dir));

        Ok(Self::with_components(db_path, config_manager, order_repo, model_registry))
    }

    /// 以已构造的组件装配（测试可注入预加载的产物注册表）
    pub fn with_components(
        db_path: String,
        config_manager: Arc<ConfigManager>,
        order_repo: Arc<OrderRepository>,
        model_registry: Arc<ModelRegistry>,
    ) -> Self {
        let allocation_api = Arc::new(AllocationApi::new(config_manager.clone(), order_repo));
        let forecast_api = Arc::new(ForecastApi::new(config_manager.clone(), model_registry.clone()));

        Self {
            db_path,
            allocation_api,
            forecast_api,
            config_manager,
            model_registry,
        }
    }

    /// 获取数据库路径
    pub fn get_db_path(&self) -> &str {
        &self.db_path
    }
}

// ==========================================
// 默认数据库路径辅助函数
// ==========================================

/// 获取默认数据库路径
///
/// # 返回
/// - 环境变量 RETAIL_ANALYTICS_DB（非空时）
/// - 否则: 用户数据目录/retail-analytics/retail_analytics.db
pub fn get_default_db_path() -> String {
    use std::path::PathBuf;

    if let Ok(path) = std::env::var(DB_PATH_ENV) {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }

    let mut path = PathBuf::from("./retail_analytics.db");

    if let Some(data_dir) = dirs::data_dir() {
        let dir = data_dir.join("retail-analytics");
        // 目录创建失败时回退到当前目录
        if std::fs::create_dir_all(&dir).is_ok() {
            path = dir.join("retail_analytics.db");
        }
    }

    path.to_string_lossy().to_string()
}
