// ==========================================
// 膳食规划系统 - 食材数据仓储
// ==========================================
// 红线: Repository 不含业务逻辑
// 约束: 所有查询使用参数化
// ==========================================

use crate::domain::ingredient::Ingredient;
use crate::domain::recipe::RecipeIngredient;
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::recipe_ingredient_repo::RecipeIngredientRepository;
use crate::repository::row_utils::bool_column;
use rusqlite::{params, Connection, OptionalExtension, Result as SqliteResult, Row};
use std::collections::HashSet;
use std::sync::{Arc, Mutex};

const SELECT_COLUMNS: &str = "SELECT id, name, quantity, unit, category, is_available FROM ingredients";

fn map_ingredient(row: &Row<'_>) -> SqliteResult<Ingredient> {
    Ok(Ingredient {
        id: row.get(0)?,
        name: row.get(1)?,
        quantity: row.get(2)?,
        unit: row.get(3)?,
        category: row.get(4)?,
        is_available: bool_column(row, 5)?,
    })
}

// ==========================================
// IngredientRepository - 食材仓储
// ==========================================
/// 职责: 管理 ingredients 表的 CRUD 操作
pub struct IngredientRepository {
    conn: Arc<Mutex<Connection>>,
}

impl IngredientRepository {
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

    /// 查询全部食材（按类别、名称排序）
    pub fn list_all(&self) -> RepositoryResult<Vec<Ingredient>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(&format!("{} ORDER BY category, name", SELECT_COLUMNS))?;
        let rows = stmt
            .query_map([], map_ingredient)?
            .collect::<SqliteResult<Vec<_>>>()?;
        Ok(rows)
    }

    /// 按类别查询（按名称排序）
    pub fn list_by_category(&self, category: &str) -> RepositoryResult<Vec<Ingredient>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(&format!(
            "{} WHERE category = ?1 ORDER BY name",
            SELECT_COLUMNS
        ))?;
        let rows = stmt
            .query_map(params![category], map_ingredient)?
            .collect::<SqliteResult<Vec<_>>>()?;
        Ok(rows)
    }

    /// 查询有货食材（按名称排序）
    pub fn list_available(&self) -> RepositoryResult<Vec<Ingredient>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(&format!(
            "{} WHERE is_available = 1 ORDER BY name",
            SELECT_COLUMNS
        ))?;
        let rows = stmt
            .query_map([], map_ingredient)?
            .collect::<SqliteResult<Vec<_>>>()?;
        Ok(rows)
    }

    /// 有货食材 id 集合（匹配计算的输入）
    pub fn available_ids(&self) -> RepositoryResult<HashSet<i64>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare("SELECT id FROM ingredients WHERE is_available = 1")?;
        let ids = stmt
            .query_map([], |row| row.get::<_, i64>(0))?
            .collect::<SqliteResult<HashSet<_>>>()?;
        Ok(ids)
    }

    /// 按主键查询
    ///
    /// # 返回
    /// - Ok(Some(Ingredient)): 找到
    /// - Ok(None): 未找到
    pub fn find_by_id(&self, id: i64) -> RepositoryResult<Option<Ingredient>> {
        let conn = self.get_conn()?;
        let ingredient = conn
            .query_row(
                &format!("{} WHERE id = ?1", SELECT_COLUMNS),
                params![id],
                map_ingredient,
            )
            .optional()?;
        Ok(ingredient)
    }

    /// 插入食材
    ///
    /// - id == 0: 自增分配新主键
    /// - id > 0: 按指定主键写入（已存在则覆盖字段，不触发级联删除）
    ///
    /// # 返回
    /// 食材主键
    pub fn insert(&self, ingredient: &Ingredient) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        Self::insert_with(&conn, ingredient)
    }

    /// 批量插入（单事务）
    pub fn insert_many(&self, ingredients: &[Ingredient]) -> RepositoryResult<Vec<i64>> {
        let mut conn = self.get_conn()?;
        let tx = conn.transaction()?;
        let mut ids = Vec::with_capacity(ingredients.len());
        for ingredient in ingredients {
            ids.push(Self::insert_with(&tx, ingredient)?);
        }
        tx.commit()?;
        Ok(ids)
    }

    /// 按原主键恢复食材及其关联（单事务）
    ///
    /// 关联的菜谱已不存在时跳过该关联
    ///
    /// # 返回
    /// 实际恢复的关联数
    pub fn restore_with_links(
        &self,
        ingredient: &Ingredient,
        links: &[RecipeIngredient],
    ) -> RepositoryResult<usize> {
        let mut conn = self.get_conn()?;
        let tx = conn.transaction()?;
        let id = Self::insert_with(&tx, ingredient)?;
        let mut restored = 0;
        for link in links {
            let link = RecipeIngredient {
                ingredient_id: id,
                ..link.clone()
            };
            if RecipeIngredientRepository::upsert_if_recipe_exists_with(&tx, &link)? {
                restored += 1;
            }
        }
        tx.commit()?;
        Ok(restored)
    }

    fn insert_with(conn: &Connection, ingredient: &Ingredient) -> RepositoryResult<i64> {
        if ingredient.id > 0 {
            conn.execute(
                r#"
                INSERT INTO ingredients (id, name, quantity, unit, category, is_available)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                ON CONFLICT(id) DO UPDATE SET
                    name = excluded.name,
                    quantity = excluded.quantity,
                    unit = excluded.unit,
                    category = excluded.category,
                    is_available = excluded.is_available
                "#,
                params![
                    ingredient.id,
                    ingredient.name,
                    ingredient.quantity,
                    ingredient.unit,
                    ingredient.category,
                    ingredient.is_available,
                ],
            )?;
            Ok(ingredient.id)
        } else {
            conn.execute(
                r#"
                INSERT INTO ingredients (name, quantity, unit, category, is_available)
                VALUES (?1, ?2, ?3, ?4, ?5)
                "#,
                params![
                    ingredient.name,
                    ingredient.quantity,
                    ingredient.unit,
                    ingredient.category,
                    ingredient.is_available,
                ],
            )?;
            Ok(conn.last_insert_rowid())
        }
    }

    /// 更新食材（不存在时返回 NotFound）
    pub fn update(&self, ingredient: &Ingredient) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let affected = conn.execute(
            r#"
            UPDATE ingredients
            SET name = ?2, quantity = ?3, unit = ?4, category = ?5, is_available = ?6
            WHERE id = ?1
            "#,
            params![
                ingredient.id,
                ingredient.name,
                ingredient.quantity,
                ingredient.unit,
                ingredient.category,
                ingredient.is_available,
            ],
        )?;
        if affected == 0 {
            return Err(RepositoryError::not_found("Ingredient", ingredient.id));
        }
        Ok(())
    }

    /// 删除食材（关联行由外键级联删除）
    ///
    /// # 返回
    /// - Ok(true): 已删除
    /// - Ok(false): 记录不存在
    pub fn delete_by_id(&self, id: i64) -> RepositoryResult<bool> {
        let conn = self.get_conn()?;
        let affected = conn.execute("DELETE FROM ingredients WHERE id = ?1", params![id])?;
        Ok(affected > 0)
    }

    /// 去重后的类别列表（按字母排序）
    pub fn categories(&self) -> RepositoryResult<Vec<String>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare("SELECT DISTINCT category FROM ingredients ORDER BY category")?;
        let rows = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<SqliteResult<Vec<_>>>()?;
        Ok(rows)
    }

    /// 食材总数
    pub fn count(&self) -> RepositoryResult<usize> {
        let conn = self.get_conn()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM ingredients", [], |row| row.get(0))?;
        Ok(count as usize)
    }
}
