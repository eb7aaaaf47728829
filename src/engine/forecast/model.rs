// ==========================================
// 零售分析驾驶舱 - 需求回归模型
// ==========================================
// 格式: 梯度提升回归树集成 (离线训练导出为 JSON)
//   prediction = base_score + Σ tree(x)
//   分裂节点: x[feature] < threshold 走左子树, 否则走右子树
// 红线: 加载时校验结构 (子节点下标只增不减, 保证遍历必然终止)
// ==========================================

use crate::engine::forecast::features::{FeatureRow, FEATURE_COUNT, FEATURE_NAMES};
use crate::engine::forecast::{ForecastError, ForecastResult};
use serde::{Deserialize, Serialize};

// ==========================================
// DemandRegressor Trait
// ==========================================
// 实现者: TreeEnsembleRegressor; 测试可注入任意实现
pub trait DemandRegressor: Send + Sync {
    /// 批量推理（输出与输入行一一对应）
    fn predict_batch(&self, rows: &[FeatureRow]) -> ForecastResult<Vec<f64>>;
}

// ==========================================
// TreeNode / RegressionTree
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TreeNode {
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf {
        value: f64,
    },
}

/// 单棵回归树（nodes[0] 为根）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegressionTree {
    pub nodes: Vec<TreeNode>,
}

impl RegressionTree {
    fn validate(&self, tree_idx: usize) -> Result<(), String> {
        if self.nodes.is_empty() {
            return Err(format!("tree[{}] 无节点", tree_idx));
        }
        for (idx, node) in self.nodes.iter().enumerate() {
            match node {
                TreeNode::Split { feature, threshold, left, right } => {
                    if *feature >= FEATURE_COUNT {
                        return Err(format!("tree[{}].node[{}] 特征下标越界: {}", tree_idx, idx, feature));
                    }
                    if threshold.is_nan() {
                        return Err(format!("tree[{}].node[{}] 阈值为 NaN", tree_idx, idx));
                    }
                    for child in [*left, *right] {
                        if child <= idx || child >= self.nodes.len() {
                            return Err(format!("tree[{}].node[{}] 子节点下标非法: {}", tree_idx, idx, child));
                        }
                    }
                }
                TreeNode::Leaf { value } => {
                    if !value.is_finite() {
                        return Err(format!("tree[{}].node[{}] 叶子值非法", tree_idx, idx));
                    }
                }
            }
        }
        Ok(())
    }

    /// 单行推理（结构已校验）
    fn predict_row(&self, row: &FeatureRow) -> f64 {
        let mut idx = 0;
        loop {
            match &self.nodes[idx] {
                TreeNode::Leaf { value } => return *value,
                TreeNode::Split { feature, threshold, left, right } => {
                    idx = if row[*feature] < *threshold { *left } else { *right };
                }
            }
        }
    }
}

// ==========================================
// TreeEnsembleRegressor - 回归树集成
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeEnsembleRegressor {
    /// 训练时的特征列名（为空则不校验）
    #[serde(default)]
    pub feature_names: Vec<String>,
    #[serde(default)]
    pub base_score: f64,
    pub trees: Vec<RegressionTree>,
}

impl TreeEnsembleRegressor {
    /// 从 JSON 解析并校验
    pub fn from_json(raw: &str) -> ForecastResult<Self> {
        let model: TreeEnsembleRegressor = serde_json::from_str(raw)
            .map_err(|e| ForecastError::ModelUnavailable(format!("模型文件解析失败: {}", e)))?;
        model.validate().map_err(ForecastError::ModelUnavailable)?;
        Ok(model)
    }

    /// 结构校验
    pub fn validate(&self) -> Result<(), String> {
        if !self.feature_names.is_empty() && self.feature_names.iter().map(String::as_str).ne(FEATURE_NAMES) {
            return Err(format!(
                "特征布局不匹配: 期望 {:?}, 实际 {:?}",
                FEATURE_NAMES, self.feature_names
            ));
        }
        if !self.base_score.is_finite() {
            return Err("base_score 非法".to_string());
        }
        for (tree_idx, tree) in self.trees.iter().enumerate() {
            tree.validate(tree_idx)?;
        }
        Ok(())
    }

    pub fn tree_count(&self) -> usize {
        self.trees.len()
    }
}

impl DemandRegressor for TreeEnsembleRegressor {
    fn predict_batch(&self, rows: &[FeatureRow]) -> ForecastResult<Vec<f64>> {
        rows.iter()
            .enumerate()
            .map(|(row_idx, row)| {
                if let Some(col) = row.iter().position(|v| !v.is_finite()) {
                    return Err(ForecastError::Inference(format!(
                        "第 {} 行特征 {} 非法",
                        row_idx, FEATURE_NAMES[col]
                    )));
                }
                Ok(self.base_score + self.trees.iter().map(|t| t.predict_row(row)).sum::<f64>())
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// base 10; tree0 按 Month < 7 分 (+5 / -3); tree1 按 Is_Promo < 0.5 分 (0 / +20)
    fn sample_model_json() -> &'static str {
        r#"{
            "feature_names": ["Month", "DayOfWeek", "Year", "Region_Encoded", "Category_Encoded",
                              "Sub_Category_Encoded", "Discount", "Weather_Index", "Is_Promo"],
            "base_score": 10.0,
            "trees": [
                {"nodes": [
                    {"type": "split", "feature": 0, "threshold": 7.0, "left": 1, "right": 2},
                    {"type": "leaf", "value": 5.0},
                    {"type": "leaf", "value": -3.0}
                ]},
                {"nodes": [
                    {"type": "split", "feature": 8, "threshold": 0.5, "left": 1, "right": 2},
                    {"type": "leaf", "value": 0.0},
                    {"type": "leaf", "value": 20.0}
                ]}
            ]
        }"#
    }

    fn row(month: f64, promo: f64) -> FeatureRow {
        [month, 0.0, 2025.0, 0.0, 0.0, 0.0, 0.1, 80.0, promo]
    }

    #[test]
    fn test_predict_batch() {
        let model = TreeEnsembleRegressor::from_json(sample_model_json()).unwrap();
        assert_eq!(model.tree_count(), 2);

        let out = model
            .predict_batch(&[row(3.0, 0.0), row(7.0, 0.0), row(12.0, 1.0)])
            .unwrap();
        // 阈值相等走右子树
        assert_eq!(out, vec![15.0, 7.0, 27.0]);
    }

    #[test]
    fn test_rejects_backward_child_index() {
        let raw = r#"{"trees": [{"nodes": [
            {"type": "split", "feature": 0, "threshold": 1.0, "left": 0, "right": 1},
            {"type": "leaf", "value": 1.0}
        ]}]}"#;
        let err = TreeEnsembleRegressor::from_json(raw).unwrap_err();
        assert!(matches!(err, ForecastError::ModelUnavailable(_)));
    }

    #[test]
    fn test_rejects_feature_layout_mismatch() {
        let raw = r#"{"feature_names": ["Year", "Month"], "trees": []}"#;
        assert!(matches!(
            TreeEnsembleRegressor::from_json(raw),
            Err(ForecastError::ModelUnavailable(_))
        ));
    }

    #[test]
    fn test_rejects_non_finite_features() {
        let model = TreeEnsembleRegressor::from_json(sample_model_json()).unwrap();
        let mut bad = row(3.0, 0.0);
        bad[7] = f64::NAN;
        assert!(matches!(model.predict_batch(&[bad]), Err(ForecastError::Inference(_))));
    }
}
