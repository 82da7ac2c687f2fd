// ==========================================
// 膳食规划系统 - 食材管理 API
// ==========================================
// 职责: 食材增删改查、有货切换、删除撤销
// ==========================================

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::api::error::{require_non_blank, require_persisted_id, ApiError, ApiResult};
use crate::domain::ingredient::Ingredient;
use crate::domain::recipe::RecipeIngredient;
use crate::domain::types::IngredientFilter;
use crate::engine::catalog::{filter_ingredients, IngredientListItem};
use crate::engine::events::{ChangeTracker, DataCollection};
use crate::repository::ingredient_repo::IngredientRepository;
use crate::repository::recipe_ingredient_repo::RecipeIngredientRepository;

/// 已删除食材（含其菜谱关联），用于撤销
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeletedIngredient {
    pub ingredient: Ingredient,
    pub links: Vec<RecipeIngredient>,
}

// ==========================================
// IngredientApi - 食材管理 API
// ==========================================

/// 食材管理API
///
/// 职责：
/// 1. 食材录入/修改/删除
/// 2. 有货状态切换
/// 3. 列表筛选与按类别分组
pub struct IngredientApi {
    ingredient_repo: Arc<IngredientRepository>,
    link_repo: Arc<RecipeIngredientRepository>,
    tracker: Arc<ChangeTracker>,
}

impl IngredientApi {
    pub fn new(
        ingredient_repo: Arc<IngredientRepository>,
        link_repo: Arc<RecipeIngredientRepository>,
        tracker: Arc<ChangeTracker>,
    ) -> Self {
        Self {
            ingredient_repo,
            link_repo,
            tracker,
        }
    }

    /// 新增食材
    ///
    /// # 返回
    /// - Ok(i64): 新食材ID
    /// - Err(ApiError::InvalidInput): 名称或单位为空
    pub fn add_ingredient(&self, ingredient: &Ingredient) -> ApiResult<i64> {
        require_non_blank("食材名称", &ingredient.name)?;
        require_non_blank("单位", &ingredient.unit)?;

        let mut record = ingredient.clone();
        record.id = 0;
        record.name = record.name.trim().to_string();
        let id = self.ingredient_repo.insert(&record)?;
        self.tracker.bump(DataCollection::Ingredients);

        tracing::info!(id, name = %record.name, "新增食材");
        Ok(id)
    }

    /// 修改食材
    pub fn update_ingredient(&self, ingredient: &Ingredient) -> ApiResult<()> {
        require_persisted_id("食材", ingredient.id)?;
        require_non_blank("食材名称", &ingredient.name)?;
        require_non_blank("单位", &ingredient.unit)?;

        self.ingredient_repo.update(ingredient)?;
        self.tracker.bump(DataCollection::Ingredients);

        tracing::info!(id = ingredient.id, "修改食材");
        Ok(())
    }

    /// 切换有货状态
    ///
    /// # 返回
    /// - Ok(Ingredient): 切换后的食材
    pub fn toggle_availability(&self, id: i64) -> ApiResult<Ingredient> {
        let current = self
            .ingredient_repo
            .find_by_id(id)?
            .ok_or_else(|| ApiError::NotFound(format!("食材(id={})不存在", id)))?;

        let toggled = current.toggled();
        self.ingredient_repo.update(&toggled)?;
        self.tracker.bump(DataCollection::Ingredients);

        tracing::info!(id, is_available = toggled.is_available, "切换食材有货状态");
        Ok(toggled)
    }

    /// 删除食材（关联随外键级联删除）
    ///
    /// # 返回
    /// - Ok(true): 已删除
    /// - Ok(false): 食材不存在
    pub fn delete_ingredient(&self, id: i64) -> ApiResult<bool> {
        let deleted = self.ingredient_repo.delete_by_id(id)?;
        if deleted {
            self.tracker
                .bump_all(&[DataCollection::Ingredients, DataCollection::RecipeIngredients]);
            tracing::info!(id, "删除食材");
        }
        Ok(deleted)
    }

    /// 删除食材并返回被删除的数据（供撤销使用）
    pub fn delete_with_links(&self, id: i64) -> ApiResult<DeletedIngredient> {
        let ingredient = self
            .ingredient_repo
            .find_by_id(id)?
            .ok_or_else(|| ApiError::NotFound(format!("食材(id={})不存在", id)))?;
        let links = self.link_repo.find_by_ingredient(id)?;

        self.ingredient_repo.delete_by_id(id)?;
        self.tracker
            .bump_all(&[DataCollection::Ingredients, DataCollection::RecipeIngredients]);

        tracing::info!(id, links = links.len(), "删除食材(可撤销)");
        Ok(DeletedIngredient { ingredient, links })
    }

    /// 撤销删除：按原ID恢复食材及其关联（单事务）
    ///
    /// 删除后被移除的菜谱不再关联，其余关联照常恢复
    ///
    /// # 返回
    /// - Ok(usize): 实际恢复的关联数
    pub fn restore_with_links(&self, deleted: &DeletedIngredient) -> ApiResult<usize> {
        require_persisted_id("食材", deleted.ingredient.id)?;

        let restored = self
            .ingredient_repo
            .restore_with_links(&deleted.ingredient, &deleted.links)?;
        self.tracker
            .bump_all(&[DataCollection::Ingredients, DataCollection::RecipeIngredients]);

        let skipped = deleted.links.len() - restored;
        if skipped > 0 {
            tracing::warn!(id = deleted.ingredient.id, skipped, "部分关联的菜谱已删除，跳过");
        }
        tracing::info!(id = deleted.ingredient.id, links = restored, "恢复已删除食材");
        Ok(restored)
    }

    /// 食材列表（筛选 + 按类别分组）
    pub fn list_ingredients(
        &self,
        query: &str,
        filter: IngredientFilter,
    ) -> ApiResult<Vec<IngredientListItem>> {
        let all = self.ingredient_repo.list_all()?;
        Ok(filter_ingredients(&all, query, filter))
    }

    /// 按ID查询
    pub fn get_ingredient(&self, id: i64) -> ApiResult<Option<Ingredient>> {
        Ok(self.ingredient_repo.find_by_id(id)?)
    }

    /// 已有类别
    pub fn list_categories(&self) -> ApiResult<Vec<String>> {
        Ok(self.ingredient_repo.categories()?)
    }
}
