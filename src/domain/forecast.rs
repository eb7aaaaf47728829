// ==========================================
// 零售分析驾驶舱 - 需求预测领域模型
// ==========================================
// 职责: 预测请求/预测序列/外生变量假设
// 不变式: 预测值非负, lower ≤ point ≤ upper, 序列按日期升序
// ==========================================

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// 默认区域（与驾驶舱默认筛选一致）
pub const DEFAULT_REGION: &str = "North";
/// 默认品类
pub const DEFAULT_CATEGORY: &str = "Furniture";
/// 默认子品类
pub const DEFAULT_SUB_CATEGORY: &str = "Chairs";
/// 默认预测天数
pub const DEFAULT_HORIZON_DAYS: i64 = 30;

// ==========================================
// ForecastRequest - 预测请求
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastRequest {
    pub region: String,
    pub category: String,
    pub sub_category: String,
    pub horizon_days: i64,
    /// 外生变量覆盖（None 时使用配置中的假设值）
    #[serde(default)]
    pub assumptions: Option<ExogenousAssumptions>,
}

impl Default for ForecastRequest {
    fn default() -> Self {
        Self {
            region: DEFAULT_REGION.to_string(),
            category: DEFAULT_CATEGORY.to_string(),
            sub_category: DEFAULT_SUB_CATEGORY.to_string(),
            horizon_days: DEFAULT_HORIZON_DAYS,
            assumptions: None,
        }
    }
}

// ==========================================
// ExogenousAssumptions - 外生驱动因素假设
// ==========================================
// 未来期的折扣率/天气指数/促销标志未知, 按固定假设取值
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExogenousAssumptions {
    pub discount: f64,      // 折扣率 (0.0 - 1.0)
    pub weather_index: f64, // 外部环境指数 (0 = 差, 100 = 好)
    pub is_promo: bool,     // 是否促销
}

impl Default for ExogenousAssumptions {
    fn default() -> Self {
        Self {
            discount: 0.1,
            weather_index: 80.0,
            is_promo: false,
        }
    }
}

// ==========================================
// ForecastPoint - 单日预测
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastPoint {
    pub date: NaiveDate,
    #[serde(rename = "forecast")]
    pub point: f64,
    #[serde(rename = "lower_ci")]
    pub lower: f64,
    #[serde(rename = "upper_ci")]
    pub upper: f64,
}

// ==========================================
// ForecastSeries - 预测序列
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastSeries {
    pub region: String,
    pub category: String,
    pub sub_category: String,
    pub points: Vec<ForecastPoint>,
}

impl ForecastSeries {
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// 预测期合计需求
    pub fn total_forecast(&self) -> f64 {
        self.points.iter().map(|p| p.point).sum()
    }
}
