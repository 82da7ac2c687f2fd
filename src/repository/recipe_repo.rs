// ==========================================
// 膳食规划系统 - 菜谱数据仓储
// ==========================================
// 红线: Repository 不含业务逻辑
// ==========================================

use crate::domain::recipe::{Recipe, RecipeIngredient};
use crate::domain::types::MealType;
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::recipe_ingredient_repo::RecipeIngredientRepository;
use crate::repository::row_utils::{bool_column, meal_type_column};
use rusqlite::{params, Connection, OptionalExtension, Result as SqliteResult, Row};
use std::sync::{Arc, Mutex};

const SELECT_COLUMNS: &str = r#"
    SELECT
        id, name, description, instructions,
        prep_time_minutes, cook_time_minutes, servings,
        difficulty, meal_type, image_url, is_favorite
    FROM recipes
"#;

fn map_recipe(row: &Row<'_>) -> SqliteResult<Recipe> {
    Ok(Recipe {
        id: row.get(0)?,
        name: row.get(1)?,
        description: row.get(2)?,
        instructions: row.get(3)?,
        prep_time_minutes: row.get(4)?,
        cook_time_minutes: row.get(5)?,
        servings: row.get(6)?,
        difficulty: row.get(7)?,
        meal_type: meal_type_column(row, 8)?,
        image_url: row.get(9)?,
        is_favorite: bool_column(row, 10)?,
    })
}

// ==========================================
// RecipeRepository - 菜谱仓储
// ==========================================
/// 职责: 管理 recipes 表的 CRUD 操作
pub struct RecipeRepository {
    conn: Arc<Mutex<Connection>>,
}

impl RecipeRepository {
    /// 从已有连接创建仓储实例
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    fn query_list<P: rusqlite::Params>(&self, sql: &str, args: P) -> RepositoryResult<Vec<Recipe>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(sql)?;
        let rows = stmt
            .query_map(args, map_recipe)?
            .collect::<SqliteResult<Vec<_>>>()?;
        Ok(rows)
    }

    /// 查询全部菜谱（按名称排序）
    pub fn list_all(&self) -> RepositoryResult<Vec<Recipe>> {
        self.query_list(&format!("{} ORDER BY name, id", SELECT_COLUMNS), [])
    }

    /// 按餐别查询
    pub fn list_by_meal_type(&self, meal_type: MealType) -> RepositoryResult<Vec<Recipe>> {
        self.query_list(
            &format!("{} WHERE meal_type = ?1 ORDER BY name, id", SELECT_COLUMNS),
            params![meal_type.to_db_str()],
        )
    }

    /// 查询收藏菜谱
    pub fn list_favorites(&self) -> RepositoryResult<Vec<Recipe>> {
        self.query_list(
            &format!("{} WHERE is_favorite = 1 ORDER BY name, id", SELECT_COLUMNS),
            [],
        )
    }

    /// 按名称子串搜索（LIKE，大小写按 SQLite ASCII 规则不敏感）
    pub fn search_by_name(&self, query: &str) -> RepositoryResult<Vec<Recipe>> {
        let pattern = format!("%{}%", query);
        self.query_list(
            &format!("{} WHERE name LIKE ?1 ORDER BY name, id", SELECT_COLUMNS),
            params![pattern],
        )
    }

    /// 按主键查询
    pub fn find_by_id(&self, id: i64) -> RepositoryResult<Option<Recipe>> {
        let conn = self.get_conn()?;
        let recipe = conn
            .query_row(
                &format!("{} WHERE id = ?1", SELECT_COLUMNS),
                params![id],
                map_recipe,
            )
            .optional()?;
        Ok(recipe)
    }

    /// 插入菜谱
    ///
    /// # 返回
    /// 新分配的主键
    pub fn insert(&self, recipe: &Recipe) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        Self::insert_with(&conn, recipe)
    }

    /// 插入菜谱及其食材关联（单事务）
    ///
    /// 关联的 recipe_id 以新主键为准；任一关联写入失败（如食材不存在）则整体回滚
    ///
    /// # 返回
    /// 新分配的主键
    pub fn insert_with_links(&self, recipe: &Recipe, links: &[RecipeIngredient]) -> RepositoryResult<i64> {
        let mut conn = self.get_conn()?;
        let tx = conn.transaction()?;
        let id = Self::insert_with(&tx, recipe)?;
        for link in links {
            let link = RecipeIngredient {
                recipe_id: id,
                ..link.clone()
            };
            RecipeIngredientRepository::upsert_with(&tx, &link)?;
        }
        tx.commit()?;
        Ok(id)
    }

    fn insert_with(conn: &Connection, recipe: &Recipe) -> RepositoryResult<i64> {
        conn.execute(
            r#"
            INSERT INTO recipes (
                name, description, instructions,
                prep_time_minutes, cook_time_minutes, servings,
                difficulty, meal_type, image_url, is_favorite
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            "#,
            params![
                recipe.name,
                recipe.description,
                recipe.instructions,
                recipe.prep_time_minutes,
                recipe.cook_time_minutes,
                recipe.servings,
                recipe.difficulty,
                recipe.meal_type.to_db_str(),
                recipe.image_url,
                recipe.is_favorite,
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    /// 更新菜谱（不存在时返回 NotFound）
    pub fn update(&self, recipe: &Recipe) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let affected = conn.execute(
            r#"
            UPDATE recipes SET
                name = ?2, description = ?3, instructions = ?4,
                prep_time_minutes = ?5, cook_time_minutes = ?6, servings = ?7,
                difficulty = ?8, meal_type = ?9, image_url = ?10, is_favorite = ?11
            WHERE id = ?1
            "#,
            params![
                recipe.id,
                recipe.name,
                recipe.description,
                recipe.instructions,
                recipe.prep_time_minutes,
                recipe.cook_time_minutes,
                recipe.servings,
                recipe.difficulty,
                recipe.meal_type.to_db_str(),
                recipe.image_url,
                recipe.is_favorite,
            ],
        )?;
        if affected == 0 {
            return Err(RepositoryError::not_found("Recipe", recipe.id));
        }
        Ok(())
    }

    /// 切换收藏状态
    ///
    /// # 返回
    /// 切换后的收藏状态
    pub fn toggle_favorite(&self, id: i64) -> RepositoryResult<bool> {
        let conn = self.get_conn()?;
        let affected = conn.execute(
            "UPDATE recipes SET is_favorite = 1 - is_favorite WHERE id = ?1",
            params![id],
        )?;
        if affected == 0 {
            return Err(RepositoryError::not_found("Recipe", id));
        }
        let is_favorite: i64 =
            conn.query_row("SELECT is_favorite FROM recipes WHERE id = ?1", params![id], |row| row.get(0))?;
        Ok(is_favorite != 0)
    }

    /// 删除菜谱（关联与餐单由外键级联删除）
    pub fn delete_by_id(&self, id: i64) -> RepositoryResult<bool> {
        let conn = self.get_conn()?;
        let affected = conn.execute("DELETE FROM recipes WHERE id = ?1", params![id])?;
        Ok(affected > 0)
    }

    /// 菜谱总数
    pub fn count(&self) -> RepositoryResult<usize> {
        let conn = self.get_conn()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM recipes", [], |row| row.get(0))?;
        Ok(count as usize)
    }
}
