// ==========================================
// 零售分析驾驶舱 - 类别编码器
// ==========================================
// 语义: 编码值 = 类别在有序类别表中的下标 (训练侧 LabelEncoder 口径)
// 存储: encoders.json {"region": [...], "category": [...], "subcategory": [...]}
// ==========================================

use crate::engine::forecast::{ForecastError, ForecastResult};
use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// CategoricalField - 类别字段
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CategoricalField {
    Region,
    Category,
    SubCategory,
}

impl CategoricalField {
    pub fn as_str(&self) -> &'static str {
        match self {
            CategoricalField::Region => "region",
            CategoricalField::Category => "category",
            CategoricalField::SubCategory => "sub_category",
        }
    }
}

impl fmt::Display for CategoricalField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ==========================================
// LabelEncoder - 单字段编码器
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct LabelEncoder {
    classes: Vec<String>, // 有序且去重
}

impl LabelEncoder {
    pub fn new<I, S>(classes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut classes: Vec<String> = classes.into_iter().map(Into::into).collect();
        classes.sort();
        classes.dedup();
        Self { classes }
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    /// 编码（区分大小写, 不在类别表中返回 None）
    pub fn encode(&self, label: &str) -> Option<i64> {
        self.classes
            .binary_search_by(|c| c.as_str().cmp(label))
            .ok()
            .map(|idx| idx as i64)
    }
}

impl From<Vec<String>> for LabelEncoder {
    fn from(classes: Vec<String>) -> Self {
        LabelEncoder::new(classes)
    }
}

impl From<LabelEncoder> for Vec<String> {
    fn from(encoder: LabelEncoder) -> Self {
        encoder.classes
    }
}

// ==========================================
// EncoderBundle - 编码器组
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EncoderBundle {
    pub region: LabelEncoder,
    pub category: LabelEncoder,
    #[serde(rename = "subcategory")]
    pub sub_category: LabelEncoder,
}

impl EncoderBundle {
    pub fn encoder(&self, field: CategoricalField) -> &LabelEncoder {
        match field {
            CategoricalField::Region => &self.region,
            CategoricalField::Category => &self.category,
            CategoricalField::SubCategory => &self.sub_category,
        }
    }

    /// 编码单个字段, 未知类别返回 UnknownCategory
    pub fn encode(&self, field: CategoricalField, value: &str) -> ForecastResult<i64> {
        self.encoder(field)
            .encode(value)
            .ok_or_else(|| ForecastError::UnknownCategory {
                field: field.to_string(),
                value: value.to_string(),
            })
    }
}
