// ==========================================
// 膳食规划系统 - 菜谱-食材关联仓储
// ==========================================
// 红线: Repository 不含业务逻辑
// 说明: 复合主键 (recipe_id, ingredient_id)，写入冲突时覆盖
// ==========================================

use crate::domain::recipe::{RecipeIngredient, RecipeIngredientDetail};
use crate::engine::ingredient_match::IngredientLinkLookup;
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::row_utils::bool_column;
use async_trait::async_trait;
use rusqlite::{params, Connection, Result as SqliteResult, Row};
use std::sync::{Arc, Mutex};

fn map_link(row: &Row<'_>) -> SqliteResult<RecipeIngredient> {
    Ok(RecipeIngredient {
        recipe_id: row.get(0)?,
        ingredient_id: row.get(1)?,
        quantity: row.get(2)?,
        unit: row.get(3)?,
    })
}

// ==========================================
// RecipeIngredientRepository - 关联仓储
// ==========================================
pub struct RecipeIngredientRepository {
    conn: Arc<Mutex<Connection>>,
}

impl RecipeIngredientRepository {
    /// 从已有连接创建仓储实例
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 查询菜谱的全部关联
    pub fn find_by_recipe(&self, recipe_id: i64) -> RepositoryResult<Vec<RecipeIngredient>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT recipe_id, ingredient_id, quantity, unit
            FROM recipe_ingredients
            WHERE recipe_id = ?1
            ORDER BY ingredient_id
            "#,
        )?;
        let rows = stmt
            .query_map(params![recipe_id], map_link)?
            .collect::<SqliteResult<Vec<_>>>()?;
        Ok(rows)
    }

    /// 查询菜谱关联明细（带食材名称/有货状态/类别）
    pub fn find_details_by_recipe(&self, recipe_id: i64) -> RepositoryResult<Vec<RecipeIngredientDetail>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT ri.ingredient_id, i.name, ri.quantity, ri.unit, i.is_available, i.category
            FROM recipe_ingredients ri
            INNER JOIN ingredients i ON ri.ingredient_id = i.id
            WHERE ri.recipe_id = ?1
            ORDER BY i.category, i.name
            "#,
        )?;
        let rows = stmt
            .query_map(params![recipe_id], |row| {
                Ok(RecipeIngredientDetail {
                    ingredient_id: row.get(0)?,
                    ingredient_name: row.get(1)?,
                    quantity: row.get(2)?,
                    unit: row.get(3)?,
                    is_available: bool_column(row, 4)?,
                    category: row.get(5)?,
                })
            })?
            .collect::<SqliteResult<Vec<_>>>()?;
        Ok(rows)
    }

    /// 查询菜谱中当前有货的关联
    pub fn find_available_by_recipe(&self, recipe_id: i64) -> RepositoryResult<Vec<RecipeIngredient>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT DISTINCT ri.recipe_id, ri.ingredient_id, ri.quantity, ri.unit
            FROM recipe_ingredients ri
            INNER JOIN ingredients i ON ri.ingredient_id = i.id
            WHERE i.is_available = 1 AND ri.recipe_id = ?1
            ORDER BY ri.ingredient_id
            "#,
        )?;
        let rows = stmt
            .query_map(params![recipe_id], map_link)?
            .collect::<SqliteResult<Vec<_>>>()?;
        Ok(rows)
    }

    /// 查询引用某食材的全部关联（删除食材前用于撤销缓存）
    pub fn find_by_ingredient(&self, ingredient_id: i64) -> RepositoryResult<Vec<RecipeIngredient>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT recipe_id, ingredient_id, quantity, unit
            FROM recipe_ingredients
            WHERE ingredient_id = ?1
            ORDER BY recipe_id
            "#,
        )?;
        let rows = stmt
            .query_map(params![ingredient_id], map_link)?
            .collect::<SqliteResult<Vec<_>>>()?;
        Ok(rows)
    }

    /// 写入单条关联（冲突时覆盖数量/单位）
    pub fn upsert(&self, link: &RecipeIngredient) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        Self::upsert_with(&conn, link)
    }

    /// 批量写入（单事务）
    pub fn upsert_many(&self, links: &[RecipeIngredient]) -> RepositoryResult<()> {
        let mut conn = self.get_conn()?;
        let tx = conn.transaction()?;
        for link in links {
            Self::upsert_with(&tx, link)?;
        }
        tx.commit()?;
        Ok(())
    }

    /// 以新列表整体替换菜谱的关联（单事务）
    pub fn replace_for_recipe(&self, recipe_id: i64, links: &[RecipeIngredient]) -> RepositoryResult<()> {
        let mut conn = self.get_conn()?;
        let tx = conn.transaction()?;
        tx.execute(
            "DELETE FROM recipe_ingredients WHERE recipe_id = ?1",
            params![recipe_id],
        )?;
        for link in links {
            Self::upsert_with(&tx, link)?;
        }
        tx.commit()?;
        Ok(())
    }

    pub(crate) fn upsert_with(conn: &Connection, link: &RecipeIngredient) -> RepositoryResult<()> {
        conn.execute(
            r#"
            INSERT INTO recipe_ingredients (recipe_id, ingredient_id, quantity, unit)
            VALUES (?1, ?2, ?3, ?4)
            ON CONFLICT(recipe_id, ingredient_id) DO UPDATE SET
                quantity = excluded.quantity,
                unit = excluded.unit
            "#,
            params![link.recipe_id, link.ingredient_id, link.quantity, link.unit],
        )?;
        Ok(())
    }

    /// 菜谱仍存在时写入关联
    ///
    /// # 返回
    /// - Ok(true): 已写入
    /// - Ok(false): 菜谱不存在，跳过
    pub(crate) fn upsert_if_recipe_exists_with(
        conn: &Connection,
        link: &RecipeIngredient,
    ) -> RepositoryResult<bool> {
        let affected = conn.execute(
            r#"
            INSERT INTO recipe_ingredients (recipe_id, ingredient_id, quantity, unit)
            SELECT ?1, ?2, ?3, ?4
            WHERE EXISTS (SELECT 1 FROM recipes WHERE id = ?1)
            ON CONFLICT(recipe_id, ingredient_id) DO UPDATE SET
                quantity = excluded.quantity,
                unit = excluded.unit
            "#,
            params![link.recipe_id, link.ingredient_id, link.quantity, link.unit],
        )?;
        Ok(affected > 0)
    }

    /// 删除单条关联
    pub fn delete(&self, recipe_id: i64, ingredient_id: i64) -> RepositoryResult<bool> {
        let conn = self.get_conn()?;
        let affected = conn.execute(
            "DELETE FROM recipe_ingredients WHERE recipe_id = ?1 AND ingredient_id = ?2",
            params![recipe_id, ingredient_id],
        )?;
        Ok(affected > 0)
    }

    /// 删除菜谱的全部关联
    pub fn delete_all_for_recipe(&self, recipe_id: i64) -> RepositoryResult<usize> {
        let conn = self.get_conn()?;
        let affected = conn.execute(
            "DELETE FROM recipe_ingredients WHERE recipe_id = ?1",
            params![recipe_id],
        )?;
        Ok(affected)
    }
}

#[async_trait]
impl IngredientLinkLookup for RecipeIngredientRepository {
    async fn links_for_recipe(&self, recipe_id: i64) -> RepositoryResult<Vec<RecipeIngredient>> {
        self.find_by_recipe(recipe_id)
    }
}
