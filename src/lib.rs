// ==========================================
// 零售分析驾驶舱 - 核心库
// ==========================================
// 核心: 多级库存调拨 (运输问题最小费用流求解)
// 次核心: 需求预测服务管线 (类别编码 + 预训练回归模型)
// 技术栈: Rust + SQLite
// ==========================================

// 初始化国际化系统
rust_i18n::i18n!("locales", fallback = "zh-CN");

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 数据仓储层 - 数据访问
pub mod repository;

// 引擎层 - 求解器与预测管线
pub mod engine;

// 配置层 - 系统配置
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA 统一/建表）
pub mod db;

// 日志系统
pub mod logging;

// 国际化
pub mod i18n;

// API 层 - 业务接口
pub mod api;

// 应用层 - 依赖装配
pub mod app;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::{AllocationMode, DemandSourceKind, SolveStatus};

// 领域实体
pub use domain::{
    CostMatrix, ForecastPoint, ForecastRequest, ForecastSeries, ProblemInstance, ShipmentFlow,
    ShipmentPlan, Store, Warehouse,
};

// 引擎
pub use engine::{
    AllocationReport, AllocationService, ForecastPipeline, ModelRegistry, SolverConfig,
    TransportSolver,
};

// API
pub use api::{AllocationApi, ApiError, ForecastApi, ForecastQuery};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "零售分析驾驶舱";
