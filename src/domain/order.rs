// ==========================================
// 零售分析驾驶舱 - 历史订单领域模型
// ==========================================
// 数据来源: orders 表 (离线 ETL 生成的合成销售数据集)
// 用途: 调拨服务按历史销量推导门店需求
// ==========================================

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ==========================================
// OrderRecord - 订单明细
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderRecord {
    pub order_date: NaiveDate,
    pub region: String,
    pub category: String,
    pub sub_category: String,
    pub store_id: String,
    pub sales: f64,
    pub quantity: f64,
    pub discount: f64,
    pub is_promo: bool,
}

// ==========================================
// StoreDemand - 门店日均需求
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreDemand {
    pub store_id: String,
    /// 主销区域（该门店销量最大的区域）
    pub region: String,
    pub avg_daily_quantity: f64,
    pub order_count: i64,
}
