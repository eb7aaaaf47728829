// ==========================================
// 零售分析驾驶舱 - 领域类型定义
// ==========================================
// 职责: 调拨求解状态、调拨模式、需求数据来源等枚举
// 序列化格式: SCREAMING_SNAKE_CASE (与前端/配置表一致)
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 求解状态 (Solve Status)
// ==========================================
// 说明: INFEASIBLE 是合法求解结果, 不是错误
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SolveStatus {
    Optimal,    // 已求得最优解
    Infeasible, // 供给不足或线路不可达
    Unbounded,  // 目标无下界 (非负成本下不会出现, 保留给前端状态口径)
}

impl fmt::Display for SolveStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SolveStatus::Optimal => write!(f, "OPTIMAL"),
            SolveStatus::Infeasible => write!(f, "INFEASIBLE"),
            SolveStatus::Unbounded => write!(f, "UNBOUNDED"),
        }
    }
}

// ==========================================
// 调拨模式 (Allocation Mode)
// ==========================================
// STRICT: 门店需求是硬下界, 无法满足即 INFEASIBLE
// BEST_EFFORT: 放宽需求下界, 在最小成本下尽量多满足需求
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AllocationMode {
    #[default]
    Strict,
    BestEffort,
}

impl fmt::Display for AllocationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AllocationMode::Strict => write!(f, "STRICT"),
            AllocationMode::BestEffort => write!(f, "BEST_EFFORT"),
        }
    }
}

impl AllocationMode {
    /// 从配置值解析（大小写不敏感，未知值返回 None）
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_uppercase().as_str() {
            "STRICT" => Some(AllocationMode::Strict),
            "BEST_EFFORT" => Some(AllocationMode::BestEffort),
            _ => None,
        }
    }
}

// ==========================================
// 需求数据来源 (Demand Source)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DemandSourceKind {
    #[default]
    Demo,         // 固定演示拓扑 (4 仓 x 10 店)
    OrderHistory, // 历史订单日均销量
}

impl fmt::Display for DemandSourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DemandSourceKind::Demo => write!(f, "DEMO"),
            DemandSourceKind::OrderHistory => write!(f, "ORDER_HISTORY"),
        }
    }
}

impl DemandSourceKind {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_uppercase().as_str() {
            "DEMO" => Some(DemandSourceKind::Demo),
            "ORDER_HISTORY" => Some(DemandSourceKind::OrderHistory),
            _ => None,
        }
    }
}
