// ==========================================
// 零售分析驾驶舱 - 预测管线
// ==========================================
// 输出约束: 长度 = horizon_days（0 天为空序列）; 无负值; lower ≤ point ≤ upper
// 区间: 以截断后的点预测为中心, 对称 ±band_ratio (占位区间, 非统计置信区间)
// 精度: 点预测与上下界均保留一位小数
// ==========================================

use crate::domain::forecast::{ExogenousAssumptions, ForecastPoint, ForecastRequest, ForecastSeries};
use crate::engine::forecast::artifacts::ModelRegistry;
use crate::engine::forecast::encoder::CategoricalField;
use crate::engine::forecast::features::{build_feature_matrix, horizon_dates, EncodedCategories};
use crate::engine::forecast::{ForecastError, ForecastResult};
use chrono::NaiveDate;
use std::sync::Arc;
use tracing::{debug, instrument};

/// 默认区间半宽比例
pub const DEFAULT_BAND_RATIO: f64 = 0.2;
/// 默认最大预测天数
pub const DEFAULT_MAX_HORIZON_DAYS: i64 = 365;

// ==========================================
// PipelineSettings - 管线参数
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PipelineSettings {
    pub band_ratio: f64,
    /// 请求未指定外生变量时使用
    pub assumptions: ExogenousAssumptions,
    pub max_horizon_days: i64,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            band_ratio: DEFAULT_BAND_RATIO,
            assumptions: ExogenousAssumptions::default(),
            max_horizon_days: DEFAULT_MAX_HORIZON_DAYS,
        }
    }
}

// ==========================================
// ForecastPipeline - 预测管线
// ==========================================
#[derive(Clone)]
pub struct ForecastPipeline {
    registry: Arc<ModelRegistry>,
}

impl ForecastPipeline {
    pub fn new(registry: Arc<ModelRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &Arc<ModelRegistry> {
        &self.registry
    }

    /// 生成预测序列
    ///
    /// # 参数
    /// - request: 区域/品类/子品类/天数
    /// - settings: 区间比例与外生变量假设
    /// - today: 序列起始日期
    ///
    /// # 返回
    /// - Err(InvalidHorizon): 天数不在 [0, max_horizon_days]
    /// - Err(ModelUnavailable): 产物缺失或损坏
    /// - Err(UnknownCategory): 类别不在编码表中
    #[instrument(skip(self, settings), fields(
        region = %request.region,
        category = %request.category,
        sub_category = %request.sub_category,
        horizon_days = request.horizon_days
    ))]
    pub fn forecast(
        &self,
        request: &ForecastRequest,
        settings: &PipelineSettings,
        today: NaiveDate,
    ) -> ForecastResult<ForecastSeries> {
        if request.horizon_days < 0 || request.horizon_days > settings.max_horizon_days {
            return Err(ForecastError::InvalidHorizon(request.horizon_days));
        }

        let artifacts = self.registry.get()?;

        let codes = EncodedCategories {
            region: artifacts.encoders.encode(CategoricalField::Region, &request.region)?,
            category: artifacts.encoders.encode(CategoricalField::Category, &request.category)?,
            sub_category: artifacts
                .encoders
                .encode(CategoricalField::SubCategory, &request.sub_category)?,
        };
        let assumptions = request.assumptions.unwrap_or(settings.assumptions);

        let dates = horizon_dates(today, request.horizon_days);
        let features = build_feature_matrix(&dates, &codes, &assumptions);
        let predictions = artifacts.model.predict_batch(&features)?;
        if predictions.len() != dates.len() {
            return Err(ForecastError::Inference(format!(
                "输出行数不匹配: 期望 {}, 实际 {}",
                dates.len(),
                predictions.len()
            )));
        }

        let points = dates
            .into_iter()
            .zip(predictions)
            .map(|(date, raw)| band_point(date, raw, settings.band_ratio))
            .collect::<ForecastResult<Vec<_>>>()?;

        debug!(points = points.len(), "预测序列已生成");

        Ok(ForecastSeries {
            region: request.region.clone(),
            category: request.category.clone(),
            sub_category: request.sub_category.clone(),
            points,
        })
    }
}

/// 截断负值 → 对称区间 → 一位小数
fn band_point(date: NaiveDate, raw: f64, band_ratio: f64) -> ForecastResult<ForecastPoint> {
    if !raw.is_finite() {
        return Err(ForecastError::Inference(format!("{} 预测值非法: {}", date, raw)));
    }
    let point = if raw > 0.0 { raw } else { 0.0 };

    Ok(ForecastPoint {
        date,
        point: round1(point),
        lower: round1(point * (1.0 - band_ratio)),
        upper: round1(point * (1.0 + band_ratio)),
    })
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
