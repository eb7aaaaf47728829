// ==========================================
// 零售分析驾驶舱 - API层错误类型
// ==========================================
// 职责: 汇总各层错误，按故障性质分类，生成本地化错误响应
// 分类:
// - ClientInput: 调用方输入错误（校验失败、未知类别）
// - ServiceDegraded: 服务降级（模型产物不可用）
// - Internal: 内部故障（求解未收敛、数据库故障）
// ==========================================

use crate::engine::allocation::AllocationError;
use crate::engine::forecast::ForecastError;
use crate::engine::transport::SolverError;
use crate::i18n::t_with_args;
use crate::repository::error::RepositoryError;
use serde::{Deserialize, Serialize};
use std::error::Error;
use thiserror::Error;

/// API层错误类型
#[derive(Error, Debug)]
pub enum ApiError {
    // ==========================================
    // 调用方输入错误
    // ==========================================
    #[error("无效输入: {0}")]
    InvalidInput(String),

    #[error("数据验证失败: {0}")]
    ValidationError(String),

    #[error("未知类别: {field}={value}")]
    UnknownCategory { field: String, value: String },

    // ==========================================
    // 服务降级
    // ==========================================
    #[error("预测模型不可用: {0}")]
    ModelUnavailable(String),

    // ==========================================
    // 内部故障
    // ==========================================
    #[error("求解未收敛: {0}")]
    SolverNonconvergence(String),

    #[error("数据库错误: {0}")]
    DatabaseError(String),

    #[error("数据库连接失败: {0}")]
    DatabaseConnectionError(String),

    #[error("配置读取失败: {0}")]
    ConfigError(String),

    #[error("内部错误: {0}")]
    InternalError(String),
}

// ==========================================
// ErrorClass - 故障性质
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorClass {
    ClientInput,
    ServiceDegraded,
    Internal,
}

// ==========================================
// ApiErrorResponse - 错误响应
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiErrorResponse {
    pub code: String,
    pub class: ErrorClass,
    pub message: String,
}

impl ApiError {
    pub fn class(&self) -> ErrorClass {
        match self {
            ApiError::InvalidInput(_) | ApiError::ValidationError(_) | ApiError::UnknownCategory { .. } => {
                ErrorClass::ClientInput
            }
            ApiError::ModelUnavailable(_) => ErrorClass::ServiceDegraded,
            _ => ErrorClass::Internal,
        }
    }

    /// 稳定错误码（供前端分支处理）
    pub fn code(&self) -> &'static str {
        match self {
            ApiError::InvalidInput(_) => "INVALID_INPUT",
            ApiError::ValidationError(_) => "VALIDATION_ERROR",
            ApiError::UnknownCategory { .. } => "UNKNOWN_CATEGORY",
            ApiError::ModelUnavailable(_) => "MODEL_UNAVAILABLE",
            ApiError::SolverNonconvergence(_) => "SOLVER_NONCONVERGENCE",
            ApiError::DatabaseError(_) | ApiError::DatabaseConnectionError(_) => "DATABASE_ERROR",
            ApiError::ConfigError(_) => "CONFIG_ERROR",
            ApiError::InternalError(_) => "INTERNAL_ERROR",
        }
    }

    /// 生成本地化错误响应（按当前 locale）
    pub fn to_response(&self) -> ApiErrorResponse {
        let message = match self {
            ApiError::InvalidInput(detail) => t_with_args("error.invalid_input", &[("detail", detail)]),
            ApiError::ValidationError(detail) => t_with_args("error.validation", &[("detail", detail)]),
            ApiError::UnknownCategory { field, value } => {
                t_with_args("error.unknown_category", &[("field", field), ("value", value)])
            }
            ApiError::ModelUnavailable(detail) => {
                t_with_args("error.model_unavailable", &[("detail", detail)])
            }
            ApiError::SolverNonconvergence(detail) => {
                t_with_args("error.solver_nonconvergence", &[("detail", detail)])
            }
            ApiError::DatabaseError(detail) | ApiError::DatabaseConnectionError(detail) => {
                t_with_args("error.database", &[("detail", detail)])
            }
            ApiError::ConfigError(detail) => t_with_args("error.config", &[("detail", detail)]),
            ApiError::InternalError(detail) => t_with_args("error.internal", &[("detail", detail)]),
        };

        ApiErrorResponse {
            code: self.code().to_string(),
            class: self.class(),
            message,
        }
    }
}

// ==========================================
// 从各层错误转换
// ==========================================
impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound { entity, id } => {
                ApiError::DatabaseError(format!("{}(id={})不存在", entity, id))
            }
            RepositoryError::DatabaseConnectionError(msg) => ApiError::DatabaseConnectionError(msg),
            RepositoryError::LockError(msg) => {
                ApiError::DatabaseConnectionError(format!("数据库锁获取失败: {}", msg))
            }
            RepositoryError::DatabaseQueryError(msg) => ApiError::DatabaseError(msg),
            RepositoryError::ValidationError(msg) => ApiError::ValidationError(msg),
            RepositoryError::FieldValueError { field, message } => {
                ApiError::DatabaseError(format!("字段{}错误: {}", field, message))
            }
        }
    }
}

impl From<SolverError> for ApiError {
    fn from(err: SolverError) -> Self {
        match err {
            SolverError::InvalidInstance(msg) => ApiError::ValidationError(msg),
            SolverError::DidNotConverge { .. } => ApiError::SolverNonconvergence(err.to_string()),
            SolverError::NegativeCycle => ApiError::InternalError(err.to_string()),
        }
    }
}

impl From<AllocationError> for ApiError {
    fn from(err: AllocationError) -> Self {
        match err {
            AllocationError::Solver(e) => e.into(),
            AllocationError::Source(e) => e.into(),
        }
    }
}

impl From<ForecastError> for ApiError {
    fn from(err: ForecastError) -> Self {
        match err {
            ForecastError::UnknownCategory { field, value } => ApiError::UnknownCategory { field, value },
            ForecastError::InvalidHorizon(days) => {
                ApiError::InvalidInput(format!("days 必须在 0 到上限之间, 实际 {}", days))
            }
            ForecastError::ModelUnavailable(msg) => ApiError::ModelUnavailable(msg),
            ForecastError::Inference(msg) => ApiError::InternalError(msg),
        }
    }
}

// 配置读取错误
impl From<Box<dyn Error + Send + Sync>> for ApiError {
    fn from(err: Box<dyn Error + Send + Sync>) -> Self {
        ApiError::ConfigError(err.to_string())
    }
}

/// Result 类型别名
pub type ApiResult<T> = Result<T, ApiError>;
