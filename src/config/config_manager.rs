// ==========================================
// 零售分析驾驶舱 - 配置管理器
// ==========================================
// 职责: 配置加载、查询、覆写管理
// 存储: config_kv 表 (key-value + scope)
// 约定: 配置缺失或格式错误时回退默认值并记录告警
// ==========================================

use crate::config::allocation_config_trait::AllocationConfigReader;
use crate::config::forecast_config_trait::ForecastConfigReader;
use crate::config::ConfigResult;
use crate::db::open_sqlite_connection;
use crate::domain::allocation::Warehouse;
use crate::domain::types::{AllocationMode, DemandSourceKind};
use crate::engine::allocation::sources::demo_warehouses;
use crate::engine::transport::DEFAULT_MAX_ITERATIONS;
use async_trait::async_trait;
use rusqlite::{params, Connection};
use serde_json::json;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::{Arc, Mutex};

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
pub struct ConfigManager {
    conn: Arc<Mutex<Connection>>,
}

impl ConfigManager {
    /// 创建新的 ConfigManager 实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: &str) -> ConfigResult<Self> {
        let conn = open_sqlite_connection(db_path)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建 ConfigManager
    ///
    /// 说明：为保证连接行为一致，会对传入连接再次应用统一 PRAGMA（幂等）。
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> ConfigResult<Self> {
        {
            let conn_guard = conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
            crate::db::configure_sqlite_connection(&conn_guard)?;
        }

        Ok(Self { conn })
    }

    /// 从 config_kv 表读取配置值（scope_id='global'）
    ///
    /// # 返回
    /// - Some(String): 配置值
    /// - None: 配置不存在
    fn get_config_value(&self, key: &str) -> ConfigResult<Option<String>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;

        let result = conn.query_row(
            "SELECT value FROM config_kv WHERE scope_id = 'global' AND key = ?1",
            params![key],
            |row| row.get::<_, String>(0),
        );

        match result {
            Ok(value) => Ok(Some(value)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(Box::new(e)),
        }
    }

    /// 读取 global scope 的配置值（公开方法，供其他模块复用）
    pub fn get_global_config_value(&self, key: &str) -> ConfigResult<Option<String>> {
        self.get_config_value(key)
    }

    /// 写入 global scope 的配置值（UPSERT）
    pub fn set_global_config_value(&self, key: &str, value: &str) -> ConfigResult<()> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
        conn.execute(
            "INSERT INTO config_kv (scope_id, key, value) VALUES ('global', ?1, ?2)
             ON CONFLICT(scope_id, key) DO UPDATE SET value = ?2, updated_at = datetime('now')",
            params![key, value],
        )?;
        Ok(())
    }

    /// 获取所有 global 配置的快照（JSON格式, 按键排序）
    pub fn get_config_snapshot(&self) -> ConfigResult<String> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;

        let mut stmt =
            conn.prepare("SELECT key, value FROM config_kv WHERE scope_id = 'global' ORDER BY key")?;

        let mut config_map: BTreeMap<String, String> = BTreeMap::new();
        let rows = stmt.query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)))?;
        for row in rows {
            let (key, value) = row?;
            config_map.insert(key, value);
        }

        Ok(serde_json::to_string(&json!(config_map))?)
    }

    /// 模型产物目录（未配置时为用户数据目录下的 retail-analytics/models）
    pub fn model_dir(&self) -> ConfigResult<PathBuf> {
        match self.get_config_value(config_keys::MODEL_DIR)? {
            Some(v) if !v.trim().is_empty() => Ok(PathBuf::from(v.trim())),
            _ => Ok(default_model_dir()),
        }
    }

    /// 从 config_kv 表读取配置值，带默认值
    fn get_config_or_default(&self, key: &str, default: &str) -> ConfigResult<String> {
        Ok(self.get_config_value(key)?.unwrap_or_else(|| default.to_string()))
    }

    /// 读取并解析数值型配置，解析失败回退默认值
    fn get_parsed_or_default<T>(&self, key: &str, default: T) -> ConfigResult<T>
    where
        T: FromStr + ToString + Copy,
    {
        let value = self.get_config_or_default(key, &default.to_string())?;
        match value.trim().parse::<T>() {
            Ok(v) => Ok(v),
            Err(_) => {
                tracing::warn!(config_key = key, raw_value = %value, "配置值格式错误，使用默认值");
                Ok(default)
            }
        }
    }

    /// 读取布尔型配置（true/false/1/0，大小写不敏感）
    fn get_bool_or_default(&self, key: &str, default: bool) -> ConfigResult<bool> {
        let value = self.get_config_or_default(key, if default { "true" } else { "false" })?;
        match value.trim().to_lowercase().as_str() {
            "true" | "1" => Ok(true),
            "false" | "0" => Ok(false),
            _ => {
                tracing::warn!(config_key = key, raw_value = %value, "布尔配置格式错误，使用默认值");
                Ok(default)
            }
        }
    }
}

/// 默认模型目录
fn default_model_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("retail-analytics")
        .join("models")
}

// ==========================================
// AllocationConfigReader Trait 实现
// ==========================================
#[async_trait]
impl AllocationConfigReader for ConfigManager {
    async fn get_allocation_mode(&self) -> ConfigResult<AllocationMode> {
        let value = self.get_config_or_default(config_keys::ALLOCATION_MODE, "STRICT")?;
        Ok(AllocationMode::parse(&value).unwrap_or_else(|| {
            tracing::warn!(raw_value = %value, "未知调拨模式，使用 STRICT");
            AllocationMode::Strict
        }))
    }

    async fn get_solver_max_iterations(&self) -> ConfigResult<usize> {
        let value = self.get_parsed_or_default(config_keys::SOLVER_MAX_ITERATIONS, DEFAULT_MAX_ITERATIONS)?;
        // 0 次增广无法求解任何非空实例
        Ok(if value == 0 { DEFAULT_MAX_ITERATIONS } else { value })
    }

    async fn get_integral_flow(&self) -> ConfigResult<bool> {
        self.get_bool_or_default(config_keys::INTEGRAL_FLOW, true)
    }

    async fn get_demand_source(&self) -> ConfigResult<DemandSourceKind> {
        let value = self.get_config_or_default(config_keys::DEMAND_SOURCE, "DEMO")?;
        Ok(DemandSourceKind::parse(&value).unwrap_or_else(|| {
            tracing::warn!(raw_value = %value, "未知需求来源，使用 DEMO");
            DemandSourceKind::Demo
        }))
    }

    async fn get_demand_lookback_days(&self) -> ConfigResult<i64> {
        let value = self.get_parsed_or_default(config_keys::DEMAND_LOOKBACK_DAYS, 90_i64)?;
        Ok(if value < 1 { 90 } else { value })
    }

    async fn get_warehouse_network(&self) -> ConfigResult<Vec<Warehouse>> {
        let raw = match self.get_config_value(config_keys::WAREHOUSE_NETWORK)? {
            Some(v) => v,
            None => return Ok(demo_warehouses()),
        };

        match serde_json::from_str::<Vec<Warehouse>>(&raw) {
            Ok(warehouses) if !warehouses.is_empty() => Ok(warehouses),
            _ => {
                tracing::warn!(
                    config_key = config_keys::WAREHOUSE_NETWORK,
                    raw_value = %raw,
                    "仓库网络配置格式错误，使用演示仓库"
                );
                Ok(demo_warehouses())
            }
        }
    }

    async fn get_lane_cost_near(&self) -> ConfigResult<f64> {
        self.get_parsed_or_default(config_keys::LANE_COST_NEAR, 2.0)
    }

    async fn get_lane_cost_far(&self) -> ConfigResult<f64> {
        self.get_parsed_or_default(config_keys::LANE_COST_FAR, 5.0)
    }
}

// ==========================================
// ForecastConfigReader Trait 实现
// ==========================================
#[async_trait]
impl ForecastConfigReader for ConfigManager {
    async fn get_model_dir(&self) -> ConfigResult<PathBuf> {
        self.model_dir()
    }

    async fn get_band_ratio(&self) -> ConfigResult<f64> {
        let value: f64 = self.get_parsed_or_default(config_keys::BAND_RATIO, 0.2)?;
        if value.is_finite() && (0.0..1.0).contains(&value) {
            Ok(value)
        } else {
            tracing::warn!(band_ratio = value, "区间比例超出 [0, 1)，使用 0.2");
            Ok(0.2)
        }
    }

    async fn get_assumed_discount(&self) -> ConfigResult<f64> {
        self.get_parsed_or_default(config_keys::ASSUMED_DISCOUNT, 0.1)
    }

    async fn get_assumed_weather_index(&self) -> ConfigResult<f64> {
        self.get_parsed_or_default(config_keys::ASSUMED_WEATHER_INDEX, 80.0)
    }

    async fn get_assumed_is_promo(&self) -> ConfigResult<bool> {
        self.get_bool_or_default(config_keys::ASSUMED_IS_PROMO, false)
    }

    async fn get_max_horizon_days(&self) -> ConfigResult<i64> {
        let value = self.get_parsed_or_default(config_keys::MAX_HORIZON_DAYS, 365_i64)?;
        Ok(if value < 1 { 365 } else { value })
    }
}

// ==========================================
// 配置键常量
// ==========================================
pub mod config_keys {
    // 调拨求解
    pub const ALLOCATION_MODE: &str = "allocation_mode";
    pub const SOLVER_MAX_ITERATIONS: &str = "solver_max_iterations";
    pub const INTEGRAL_FLOW: &str = "integral_flow";

    // 调拨网络
    pub const DEMAND_SOURCE: &str = "demand_source";
    pub const DEMAND_LOOKBACK_DAYS: &str = "demand_lookback_days";
    pub const WAREHOUSE_NETWORK: &str = "warehouse_network"; // JSON
    pub const LANE_COST_NEAR: &str = "lane_cost_near";
    pub const LANE_COST_FAR: &str = "lane_cost_far";

    // 预测
    pub const MODEL_DIR: &str = "model_dir";
    pub const BAND_RATIO: &str = "band_ratio";
    pub const ASSUMED_DISCOUNT: &str = "assumed_discount";
    pub const ASSUMED_WEATHER_INDEX: &str = "assumed_weather_index";
    pub const ASSUMED_IS_PROMO: &str = "assumed_is_promo";
    pub const MAX_HORIZON_DAYS: &str = "max_horizon_days";
}
