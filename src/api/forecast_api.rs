// ==========================================
// 零售分析驾驶舱 - 需求预测 API
// ==========================================
// 职责: 解析查询参数 → 读取预测配置 → 调用预测管线 → 返回预测点列表
// 参数: region (默认 North) / category (Furniture) / sub_category (Chairs) / days (30)
// ==========================================

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::api::error::{ApiError, ApiResult};
use crate::config::ForecastConfigReader;
use crate::domain::forecast::{
    ExogenousAssumptions, ForecastPoint, ForecastRequest, DEFAULT_CATEGORY, DEFAULT_HORIZON_DAYS,
    DEFAULT_REGION, DEFAULT_SUB_CATEGORY,
};
use crate::engine::forecast::{ForecastPipeline, ModelRegistry, PipelineSettings};

// ==========================================
// ForecastQuery - 预测查询参数
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastQuery {
    pub region: String,
    pub category: String,
    pub sub_category: String,
    pub days: i64,
}

impl Default for ForecastQuery {
    fn default() -> Self {
        Self {
            region: DEFAULT_REGION.to_string(),
            category: DEFAULT_CATEGORY.to_string(),
            sub_category: DEFAULT_SUB_CATEGORY.to_string(),
            days: DEFAULT_HORIZON_DAYS,
        }
    }
}

impl ForecastQuery {
    /// 从字符串参数表解析（缺省参数取默认值）
    ///
    /// # 返回
    /// - Err(InvalidInput): days 不是整数
    pub fn from_params(params: &HashMap<String, String>) -> ApiResult<Self> {
        let defaults = ForecastQuery::default();
        let days = match params.get("days") {
            Some(raw) => raw
                .trim()
                .parse::<i64>()
                .map_err(|_| ApiError::InvalidInput(format!("days 必须为整数, 实际 '{}'", raw)))?,
            None => defaults.days,
        };

        Ok(Self {
            region: params.get("region").cloned().unwrap_or(defaults.region),
            category: params.get("category").cloned().unwrap_or(defaults.category),
            sub_category: params.get("sub_category").cloned().unwrap_or(defaults.sub_category),
            days,
        })
    }

    fn to_request(&self) -> ForecastRequest {
        ForecastRequest {
            region: self.region.clone(),
            category: self.category.clone(),
            sub_category: self.sub_category.clone(),
            horizon_days: self.days,
            assumptions: None,
        }
    }
}

// ==========================================
// ForecastApi - 需求预测 API
// ==========================================
pub struct ForecastApi {
    config: Arc<dyn ForecastConfigReader>,
    pipeline: ForecastPipeline,
}

impl ForecastApi {
    /// 创建新的 ForecastApi 实例
    ///
    /// # 参数
    /// - config: 预测配置读取器
    /// - registry: 进程内共享的模型产物注册表
    pub fn new(config: Arc<dyn ForecastConfigReader>, registry: Arc<ModelRegistry>) -> Self {
        Self {
            config,
            pipeline: ForecastPipeline::new(registry),
        }
    }

    /// 从今天起生成预测
    pub async fn forecast(&self, query: &ForecastQuery) -> ApiResult<Vec<ForecastPoint>> {
        self.forecast_from(query, Local::now().date_naive()).await
    }

    /// 从指定日期起生成预测
    pub async fn forecast_from(&self, query: &ForecastQuery, today: NaiveDate) -> ApiResult<Vec<ForecastPoint>> {
        let settings = self.load_settings().await?;
        let series = self.pipeline.forecast(&query.to_request(), &settings, today)?;
        Ok(series.points)
    }

    async fn load_settings(&self) -> ApiResult<PipelineSettings> {
        Ok(PipelineSettings {
            band_ratio: self.config.get_band_ratio().await?,
            assumptions: ExogenousAssumptions {
                discount: self.config.get_assumed_discount().await?,
                weather_index: self.config.get_assumed_weather_index().await?,
                is_promo: self.config.get_assumed_is_promo().await?,
            },
            max_horizon_days: self.config.get_max_horizon_days().await?,
        })
    }
}
