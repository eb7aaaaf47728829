// ==========================================
// 测试辅助函数
// ==========================================
// 职责: 临时数据库初始化、配置写入、订单种子数据、模型产物文件
// ==========================================
#![allow(dead_code)]

use chrono::NaiveDate;
use retail_analytics::db::{ensure_schema, open_sqlite_connection};
use retail_analytics::domain::OrderRecord;
use retail_analytics::repository::OrderRepository;
use rusqlite::Connection;
use std::error::Error;
use std::path::Path;
use tempfile::NamedTempFile;

/// 创建临时测试数据库并初始化 schema
///
/// # 返回
/// - NamedTempFile: 临时数据库文件（需要保持存活）
/// - String: 数据库文件路径
pub fn create_test_db() -> Result<(NamedTempFile, String), Box<dyn Error>> {
    let temp_file = NamedTempFile::new()?;
    let db_path = temp_file.path().to_str().unwrap().to_string();

    let conn = open_sqlite_connection(&db_path)?;
    ensure_schema(&conn)?;

    Ok((temp_file, db_path))
}

/// 打开测试数据库连接
pub fn open_test_connection(db_path: &str) -> Result<Connection, Box<dyn Error>> {
    Ok(open_sqlite_connection(db_path)?)
}

/// 写入 global 配置
pub fn set_config(conn: &Connection, key: &str, value: &str) -> Result<(), Box<dyn Error>> {
    conn.execute(
        "INSERT OR REPLACE INTO config_kv (scope_id, key, value, updated_at)
         VALUES ('global', ?1, ?2, datetime('now'))",
        [key, value],
    )?;
    Ok(())
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn order(order_date: NaiveDate, store_id: &str, region: &str, quantity: f64) -> OrderRecord {
    OrderRecord {
        order_date,
        region: region.to_string(),
        category: "Furniture".to_string(),
        sub_category: "Chairs".to_string(),
        store_id: store_id.to_string(),
        sales: quantity * 25.0,
        quantity,
        discount: 0.1,
        is_promo: false,
    }
}

/// 写入订单种子数据
///
/// 最新订单日期 2025-03-10; 以 10 天回看窗口 (03-01 ~ 03-10) 统计:
/// - 门店 1 (North): 每天 3 件, 共 30 件 → 日均 3.0
/// - 门店 2: South 5 件 + East 2 件 → 日均 0.7, 主销区域 South
/// - 门店 3: 只有窗口外订单
pub fn seed_orders(db_path: &str) -> Result<usize, Box<dyn Error>> {
    let repo = OrderRepository::new(db_path)?;

    let mut orders: Vec<OrderRecord> = (1..=10)
        .map(|day| order(date(2025, 3, day), "1", "North", 3.0))
        .collect();
    orders.push(order(date(2025, 3, 10), "2", "South", 5.0));
    orders.push(order(date(2025, 3, 9), "2", "East", 2.0));

    let mut count = repo.insert_batch(&orders)?;

    // 窗口外订单, 使用带时间的日期格式
    let conn = open_test_connection(db_path)?;
    count += conn.execute(
        "INSERT INTO orders (Order_Date, Region, Category, Sub_Category, Sales, Quantity, Discount, Is_Promo, Store_ID)
         VALUES ('2025-02-01 00:00:00', 'West', 'Technology', 'Phones', 900.0, 40, 0.0, 1, 3)",
        [],
    )?;

    Ok(count)
}

/// 区域编码表 (有序): Central=0, East=1, North=2, South=3, West=4
pub const ENCODERS_JSON: &str = r#"{
    "region": ["North", "South", "East", "West", "Central"],
    "category": ["Furniture", "Office Supplies", "Technology"],
    "subcategory": ["Bookcases", "Chairs", "Phones", "Tables"]
}"#;

/// 测试模型:
/// - base 20
/// - tree0: Region_Encoded < 2.5 → +5, 否则 -30
/// - tree1: DayOfWeek < 5 → 0, 否则 +10 (周末)
///
/// North 工作日 25, North 周末 35, West 恒为负 (截断为 0)
pub const MODEL_JSON: &str = r#"{
    "feature_names": ["Month", "DayOfWeek", "Year", "Region_Encoded", "Category_Encoded",
                      "Sub_Category_Encoded", "Discount", "Weather_Index", "Is_Promo"],
    "base_score": 20.0,
    "trees": [
        {"nodes": [
            {"type": "split", "feature": 3, "threshold": 2.5, "left": 1, "right": 2},
            {"type": "leaf", "value": 5.0},
            {"type": "leaf", "value": -30.0}
        ]},
        {"nodes": [
            {"type": "split", "feature": 1, "threshold": 5.0, "left": 1, "right": 2},
            {"type": "leaf", "value": 0.0},
            {"type": "leaf", "value": 10.0}
        ]}
    ]
}"#;

/// 写入模型产物文件
pub fn write_model_artifacts(dir: &Path) -> Result<(), Box<dyn Error>> {
    std::fs::write(dir.join("demand_model.json"), MODEL_JSON)?;
    std::fs::write(dir.join("encoders.json"), ENCODERS_JSON)?;
    Ok(())
}
