// ==========================================
// 膳食规划系统 - 餐单数据仓储
// ==========================================
// 红线: Repository 不含业务逻辑
// 日期以 'YYYY-MM-DD' 文本存储，区间查询为半开区间 [start, end)
// ==========================================

use crate::domain::meal_plan::MealPlanEntry;
use crate::domain::types::MealType;
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::row_utils::meal_type_column;
use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension, Result as SqliteResult, Row};
use std::sync::{Arc, Mutex};

const SELECT_COLUMNS: &str = "SELECT id, recipe_id, date, meal_type, servings FROM meal_plans";

// 餐别排序: BREAKFAST < LUNCH < DINNER < SNACK（与 MealType 声明顺序一致）
const ORDER_BY_DATE_AND_SLOT: &str = r#"
    ORDER BY date,
        CASE meal_type
            WHEN 'BREAKFAST' THEN 0
            WHEN 'LUNCH' THEN 1
            WHEN 'DINNER' THEN 2
            ELSE 3
        END,
        id
"#;

fn date_to_db(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

fn map_entry(row: &Row<'_>) -> SqliteResult<MealPlanEntry> {
    Ok(MealPlanEntry {
        id: row.get(0)?,
        recipe_id: row.get(1)?,
        date: row.get::<_, NaiveDate>(2)?,
        meal_type: meal_type_column(row, 3)?,
        servings: row.get(4)?,
    })
}

// ==========================================
// MealPlanRepository - 餐单仓储
// ==========================================
pub struct MealPlanRepository {
    conn: Arc<Mutex<Connection>>,
}

impl MealPlanRepository {
    /// 从已有连接创建仓储实例
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 查询全部餐单（按日期、餐别排序）
    pub fn list_all(&self) -> RepositoryResult<Vec<MealPlanEntry>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(&format!("{} {}", SELECT_COLUMNS, ORDER_BY_DATE_AND_SLOT))?;
        let rows = stmt
            .query_map([], map_entry)?
            .collect::<SqliteResult<Vec<_>>>()?;
        Ok(rows)
    }

    /// 查询日期区间内的餐单
    ///
    /// # 参数
    /// - `start`: 起始日期（含）
    /// - `end`: 结束日期（不含）
    pub fn find_in_range(&self, start: NaiveDate, end: NaiveDate) -> RepositoryResult<Vec<MealPlanEntry>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(&format!(
            "{} WHERE date >= ?1 AND date < ?2 {}",
            SELECT_COLUMNS, ORDER_BY_DATE_AND_SLOT
        ))?;
        let rows = stmt
            .query_map(params![date_to_db(start), date_to_db(end)], map_entry)?
            .collect::<SqliteResult<Vec<_>>>()?;
        Ok(rows)
    }

    /// 区间内餐单数量（[start, end)）
    pub fn count_in_range(&self, start: NaiveDate, end: NaiveDate) -> RepositoryResult<usize> {
        let conn = self.get_conn()?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM meal_plans WHERE date >= ?1 AND date < ?2",
            params![date_to_db(start), date_to_db(end)],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }

    /// 按主键查询
    pub fn find_by_id(&self, id: i64) -> RepositoryResult<Option<MealPlanEntry>> {
        let conn = self.get_conn()?;
        let entry = conn
            .query_row(&format!("{} WHERE id = ?1", SELECT_COLUMNS), params![id], map_entry)
            .optional()?;
        Ok(entry)
    }

    /// 查询某天某餐别的餐单（至多一条）
    pub fn find_by_slot(&self, date: NaiveDate, meal_type: MealType) -> RepositoryResult<Option<MealPlanEntry>> {
        let conn = self.get_conn()?;
        let entry = conn
            .query_row(
                &format!(
                    "{} WHERE date = ?1 AND meal_type = ?2 ORDER BY id LIMIT 1",
                    SELECT_COLUMNS
                ),
                params![date_to_db(date), meal_type.to_db_str()],
                map_entry,
            )
            .optional()?;
        Ok(entry)
    }

    /// 插入餐单
    ///
    /// # 返回
    /// 新分配的主键；槽位已占用时返回 UniqueConstraintViolation
    pub fn insert(&self, entry: &MealPlanEntry) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO meal_plans (recipe_id, date, meal_type, servings)
            VALUES (?1, ?2, ?3, ?4)
            "#,
            params![
                entry.recipe_id,
                date_to_db(entry.date),
                entry.meal_type.to_db_str(),
                entry.servings,
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    /// 更新餐单（不存在时返回 NotFound）
    pub fn update(&self, entry: &MealPlanEntry) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let affected = conn.execute(
            r#"
            UPDATE meal_plans
            SET recipe_id = ?2, date = ?3, meal_type = ?4, servings = ?5
            WHERE id = ?1
            "#,
            params![
                entry.id,
                entry.recipe_id,
                date_to_db(entry.date),
                entry.meal_type.to_db_str(),
                entry.servings,
            ],
        )?;
        if affected == 0 {
            return Err(RepositoryError::not_found("MealPlanEntry", entry.id));
        }
        Ok(())
    }

    /// 删除餐单
    pub fn delete_by_id(&self, id: i64) -> RepositoryResult<bool> {
        let conn = self.get_conn()?;
        let affected = conn.execute("DELETE FROM meal_plans WHERE id = ?1", params![id])?;
        Ok(affected > 0)
    }
}
