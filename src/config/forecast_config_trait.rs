// ==========================================
// 零售分析驾驶舱 - 预测配置读取 Trait
// ==========================================
// 职责: 定义预测管线所需的配置读取接口（不包含实现）
// ==========================================

use crate::config::ConfigResult;
use async_trait::async_trait;
use std::path::PathBuf;

#[async_trait]
pub trait ForecastConfigReader: Send + Sync {
    /// 模型产物目录（demand_model.json / encoders.json）
    ///
    /// # 默认值
    /// - <用户数据目录>/retail-analytics/models
    async fn get_model_dir(&self) -> ConfigResult<PathBuf>;

    /// 预测区间半宽比例
    ///
    /// # 默认值
    /// - 0.2 (即 ±20%)
    async fn get_band_ratio(&self) -> ConfigResult<f64>;

    /// 未来期折扣率假设
    ///
    /// # 默认值
    /// - 0.1
    async fn get_assumed_discount(&self) -> ConfigResult<f64>;

    /// 未来期天气指数假设
    ///
    /// # 默认值
    /// - 80
    async fn get_assumed_weather_index(&self) -> ConfigResult<f64>;

    /// 未来期是否促销假设
    ///
    /// # 默认值
    /// - false
    async fn get_assumed_is_promo(&self) -> ConfigResult<bool>;

    /// 最大预测天数
    ///
    /// # 默认值
    /// - 365
    async fn get_max_horizon_days(&self) -> ConfigResult<i64>;
}
