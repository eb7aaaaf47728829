// ==========================================
// 零售分析驾驶舱 - 预测特征构造
// ==========================================
// 列顺序与训练侧一致, 不可调整:
// [Month, DayOfWeek(周一=0), Year, Region_Encoded, Category_Encoded,
//  Sub_Category_Encoded, Discount, Weather_Index, Is_Promo]
// ==========================================

use crate::domain::forecast::ExogenousAssumptions;
use chrono::{Datelike, Duration, NaiveDate};

pub const FEATURE_COUNT: usize = 9;

pub const FEATURE_NAMES: [&str; FEATURE_COUNT] = [
    "Month",
    "DayOfWeek",
    "Year",
    "Region_Encoded",
    "Category_Encoded",
    "Sub_Category_Encoded",
    "Discount",
    "Weather_Index",
    "Is_Promo",
];

/// 单行特征
pub type FeatureRow = [f64; FEATURE_COUNT];

/// 已编码的类别
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncodedCategories {
    pub region: i64,
    pub category: i64,
    pub sub_category: i64,
}

/// 预测日期: today, today+1, ..., today+(horizon_days-1)
pub fn horizon_dates(today: NaiveDate, horizon_days: i64) -> Vec<NaiveDate> {
    (0..horizon_days.max(0))
        .map(|offset| today + Duration::days(offset))
        .collect()
}

/// 构造单日特征
pub fn feature_row(date: NaiveDate, codes: &EncodedCategories, assumptions: &ExogenousAssumptions) -> FeatureRow {
    [
        date.month() as f64,
        date.weekday().num_days_from_monday() as f64,
        date.year() as f64,
        codes.region as f64,
        codes.category as f64,
        codes.sub_category as f64,
        assumptions.discount,
        assumptions.weather_index,
        if assumptions.is_promo { 1.0 } else { 0.0 },
    ]
}

/// 构造特征矩阵（行与日期一一对应）
pub fn build_feature_matrix(
    dates: &[NaiveDate],
    codes: &EncodedCategories,
    assumptions: &ExogenousAssumptions,
) -> Vec<FeatureRow> {
    dates
        .iter()
        .map(|date| feature_row(*date, codes, assumptions))
        .collect()
}
