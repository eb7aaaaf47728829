// ==========================================
// 零售分析驾驶舱 - 需求预测服务管线
// ==========================================
// 流程: 校验请求 → 生成预测日期 → 构造特征矩阵 → 批量推理 → 截断负值 → 区间
// 产物: demand_model.json (回归树集成) + encoders.json (类别编码表)
// 红线:
// 1) 产物每进程只加载一次 (加锁加载, 加载后只读共享)
// 2) 产物缺失返回 ModelUnavailable, 不中断进程
// 3) 未知类别返回 UnknownCategory, 不做推理
// ==========================================

pub mod artifacts;
pub mod encoder;
pub mod features;
pub mod model;
pub mod pipeline;

use thiserror::Error;

pub use artifacts::{ArtifactLoader, FileArtifactLoader, LoadedArtifacts, ModelRegistry};
pub use encoder::{CategoricalField, EncoderBundle, LabelEncoder};
pub use features::{FeatureRow, FEATURE_COUNT, FEATURE_NAMES};
pub use model::{DemandRegressor, RegressionTree, TreeEnsembleRegressor, TreeNode};
pub use pipeline::{ForecastPipeline, PipelineSettings};

// ==========================================
// ForecastError - 预测错误
// ==========================================
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ForecastError {
    /// 类别不在编码表中（调用方输入错误）
    #[error("未知类别: {field}={value}")]
    UnknownCategory { field: String, value: String },

    /// 预测天数非法（调用方输入错误）
    #[error("预测天数非法: {0}")]
    InvalidHorizon(i64),

    /// 模型产物不可用（服务降级）
    #[error("预测模型不可用: {0}")]
    ModelUnavailable(String),

    /// 推理失败（内部错误）
    #[error("模型推理失败: {0}")]
    Inference(String),
}

pub type ForecastResult<T> = Result<T, ForecastError>;
