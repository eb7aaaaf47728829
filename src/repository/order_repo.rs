// ==========================================
// 零售分析驾驶舱 - 历史订单数据仓储
// ==========================================
// 红线: Repository 不含业务逻辑 (只做查询与聚合口径换算)
// 表: orders (离线 ETL 产出, 列名沿用数据集原始命名)
// ==========================================

use crate::db::open_sqlite_connection;
use crate::domain::order::{OrderRecord, StoreDemand};
use crate::repository::error::{RepositoryError, RepositoryResult};
use chrono::NaiveDate;
use rusqlite::{params, Connection};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

// ==========================================
// OrderRepository - 历史订单仓储
// ==========================================

/// 历史订单仓储
/// 职责: 为调拨服务提供门店需求口径
pub struct OrderRepository {
    conn: Arc<Mutex<Connection>>,
}

impl OrderRepository {
    /// 创建新的订单仓储实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = open_sqlite_connection(db_path)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建仓储实例
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    /// 获取数据库连接
    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 批量写入订单（单事务）
    ///
    /// # 返回
    /// - Ok(usize): 写入行数
    pub fn insert_batch(&self, orders: &[OrderRecord]) -> RepositoryResult<usize> {
        let mut conn = self.get_conn()?;
        let tx = conn.transaction()?;
        let mut count = 0;
        {
            let mut stmt = tx.prepare(
                r#"
                INSERT INTO orders (
                    Order_Date, Region, Category, Sub_Category,
                    Sales, Quantity, Discount, Is_Promo, Store_ID
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
                "#,
            )?;
            for order in orders {
                let store_id: i64 = order.store_id.trim().parse().map_err(|_| {
                    RepositoryError::FieldValueError {
                        field: "Store_ID".to_string(),
                        message: format!("门店编号必须为整数: {}", order.store_id),
                    }
                })?;
                count += stmt.execute(params![
                    order.order_date.format("%Y-%m-%d").to_string(),
                    order.region,
                    order.category,
                    order.sub_category,
                    order.sales,
                    order.quantity,
                    order.discount,
                    order.is_promo as i64,
                    store_id,
                ])?;
            }
        }
        tx.commit()?;
        Ok(count)
    }

    /// 最近一笔订单的日期
    ///
    /// # 返回
    /// - Ok(Some(date)): 最新订单日期
    /// - Ok(None): 无订单
    pub fn latest_order_date(&self) -> RepositoryResult<Option<NaiveDate>> {
        let conn = self.get_conn()?;
        let raw: Option<String> =
            conn.query_row("SELECT MAX(date(Order_Date)) FROM orders", [], |row| row.get(0))?;

        raw.map(|s| parse_order_date(&s)).transpose()
    }

    /// 统计时间窗内各门店日均销量
    ///
    /// # 参数
    /// - date_from / date_to: 闭区间
    ///
    /// # 返回
    /// 按门店编号升序; 门店区域取窗口内销量最大的区域（并列取字典序较小者）
    pub fn store_demand_between(
        &self,
        date_from: NaiveDate,
        date_to: NaiveDate,
    ) -> RepositoryResult<Vec<StoreDemand>> {
        if date_to < date_from {
            return Err(RepositoryError::ValidationError(format!(
                "时间窗非法: {} > {}",
                date_from, date_to
            )));
        }
        let days = (date_to - date_from).num_days() + 1;

        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT
                Store_ID, Region,
                CAST(SUM(Quantity) AS REAL) AS total_quantity,
                COUNT(*) AS order_count
            FROM orders
            WHERE date(Order_Date) BETWEEN ?1 AND ?2
              AND Store_ID IS NOT NULL
            GROUP BY Store_ID, Region
            ORDER BY Store_ID, Region
            "#,
        )?;

        let rows = stmt.query_map(
            params![
                date_from.format("%Y-%m-%d").to_string(),
                date_to.format("%Y-%m-%d").to_string()
            ],
            |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, f64>(2)?,
                    row.get::<_, i64>(3)?,
                ))
            },
        )?;

        // store_id -> (主销区域, 主销区域销量, 总销量, 订单数)
        let mut by_store: BTreeMap<i64, (String, f64, f64, i64)> = BTreeMap::new();
        for row in rows {
            let (store_id, region, quantity, count) = row?;
            let entry = by_store
                .entry(store_id)
                .or_insert_with(|| (region.clone(), quantity, 0.0, 0));
            if quantity > entry.1 {
                entry.0 = region;
                entry.1 = quantity;
            }
            entry.2 += quantity;
            entry.3 += count;
        }

        Ok(by_store
            .into_iter()
            .map(|(store_id, (region, _, total, count))| StoreDemand {
                store_id: store_id.to_string(),
                region,
                avg_daily_quantity: total / days as f64,
                order_count: count,
            })
            .collect())
    }
}

/// 解析订单日期（兼容 "YYYY-MM-DD" 与 "YYYY-MM-DD HH:MM:SS"）
fn parse_order_date(raw: &str) -> RepositoryResult<NaiveDate> {
    let date_part = raw.get(..10).unwrap_or(raw);
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d").map_err(|e| RepositoryError::FieldValueError {
        field: "Order_Date".to_string(),
        message: format!("{} ({})", e, raw),
    })
}
