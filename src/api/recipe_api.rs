// ==========================================
// 膳食规划系统 - 菜谱管理 API
// ==========================================
// 职责: 菜谱增删改查、收藏、食材关联维护
// ==========================================

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::api::error::{require_non_blank, require_persisted_id, ApiError, ApiResult};
use crate::domain::recipe::{Recipe, RecipeIngredient, RecipeIngredientDetail};
use crate::domain::types::MealType;
use crate::engine::catalog::filter_recipes;
use crate::engine::events::{ChangeTracker, DataCollection};
use crate::repository::recipe_ingredient_repo::RecipeIngredientRepository;
use crate::repository::recipe_repo::RecipeRepository;

/// 菜谱详情（含食材明细）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipeDetail {
    pub recipe: Recipe,
    pub ingredients: Vec<RecipeIngredientDetail>,
    /// 有货的关联食材数
    pub available_count: usize,
}

// ==========================================
// RecipeApi - 菜谱管理 API
// ==========================================
pub struct RecipeApi {
    recipe_repo: Arc<RecipeRepository>,
    link_repo: Arc<RecipeIngredientRepository>,
    tracker: Arc<ChangeTracker>,
}

impl RecipeApi {
    pub fn new(
        recipe_repo: Arc<RecipeRepository>,
        link_repo: Arc<RecipeIngredientRepository>,
        tracker: Arc<ChangeTracker>,
    ) -> Self {
        Self {
            recipe_repo,
            link_repo,
            tracker,
        }
    }

    fn validate(recipe: &Recipe) -> ApiResult<()> {
        require_non_blank("菜谱名称", &recipe.name)?;
        if recipe.servings == 0 {
            return Err(ApiError::InvalidInput("份数必须大于0".to_string()));
        }
        Ok(())
    }

    fn validate_links(recipe_id: i64, links: &[RecipeIngredient]) -> ApiResult<()> {
        for link in links {
            if link.recipe_id != recipe_id {
                return Err(ApiError::InvalidInput(format!(
                    "关联菜谱ID不一致: expected={}, actual={}",
                    recipe_id, link.recipe_id
                )));
            }
            require_persisted_id("食材", link.ingredient_id)?;
        }
        Ok(())
    }

    /// 新增菜谱
    ///
    /// # 返回
    /// - Ok(i64): 新菜谱ID
    pub fn add_recipe(&self, recipe: &Recipe) -> ApiResult<i64> {
        Self::validate(recipe)?;

        let mut record = recipe.clone();
        record.id = 0;
        record.name = record.name.trim().to_string();
        let id = self.recipe_repo.insert(&record)?;
        self.tracker.bump(DataCollection::Recipes);

        tracing::info!(id, name = %record.name, meal_type = %record.meal_type, "新增菜谱");
        Ok(id)
    }

    /// 新增菜谱并写入其食材关联（单事务）
    ///
    /// 任一食材不存在时整体失败，不留下无关联的菜谱
    pub fn add_recipe_with_ingredients(
        &self,
        recipe: &Recipe,
        ingredients: &[(i64, String, String)],
    ) -> ApiResult<i64> {
        Self::validate(recipe)?;
        for (ingredient_id, _, _) in ingredients {
            require_persisted_id("食材", *ingredient_id)?;
        }

        let mut record = recipe.clone();
        record.id = 0;
        record.name = record.name.trim().to_string();
        // recipe_id 由仓储在事务内替换为新主键
        let links: Vec<RecipeIngredient> = ingredients
            .iter()
            .map(|(ingredient_id, quantity, unit)| {
                RecipeIngredient::new(0, *ingredient_id, quantity.clone(), unit.clone())
            })
            .collect();

        let id = self.recipe_repo.insert_with_links(&record, &links)?;
        self.tracker
            .bump_all(&[DataCollection::Recipes, DataCollection::RecipeIngredients]);

        tracing::info!(id, name = %record.name, links = links.len(), "新增菜谱(含食材关联)");
        Ok(id)
    }

    /// 修改菜谱
    pub fn update_recipe(&self, recipe: &Recipe) -> ApiResult<()> {
        require_persisted_id("菜谱", recipe.id)?;
        Self::validate(recipe)?;

        self.recipe_repo.update(recipe)?;
        self.tracker.bump(DataCollection::Recipes);

        tracing::info!(id = recipe.id, "修改菜谱");
        Ok(())
    }

    /// 切换收藏
    ///
    /// # 返回
    /// - Ok(bool): 切换后的收藏状态
    pub fn toggle_favorite(&self, id: i64) -> ApiResult<bool> {
        let is_favorite = self.recipe_repo.toggle_favorite(id)?;
        self.tracker.bump(DataCollection::Recipes);

        tracing::info!(id, is_favorite, "切换菜谱收藏");
        Ok(is_favorite)
    }

    /// 删除菜谱（关联与餐单随外键级联删除）
    pub fn delete_recipe(&self, id: i64) -> ApiResult<bool> {
        let deleted = self.recipe_repo.delete_by_id(id)?;
        if deleted {
            self.tracker.bump_all(&[
                DataCollection::Recipes,
                DataCollection::RecipeIngredients,
                DataCollection::MealPlans,
            ]);
            tracing::info!(id, "删除菜谱");
        }
        Ok(deleted)
    }

    /// 菜谱列表
    ///
    /// # 参数
    /// - query: 名称/简介关键字（空白视为不过滤）
    /// - meal_type: 餐别过滤
    pub fn list_recipes(&self, query: Option<&str>, meal_type: Option<MealType>) -> ApiResult<Vec<Recipe>> {
        let all = self.recipe_repo.list_all()?;
        Ok(filter_recipes(&all, query, meal_type))
    }

    /// 收藏列表
    pub fn list_favorites(&self) -> ApiResult<Vec<Recipe>> {
        Ok(self.recipe_repo.list_favorites()?)
    }

    /// 菜谱详情
    pub fn get_recipe_detail(&self, id: i64) -> ApiResult<RecipeDetail> {
        let recipe = self
            .recipe_repo
            .find_by_id(id)?
            .ok_or_else(|| ApiError::NotFound(format!("菜谱(id={})不存在", id)))?;
        let ingredients = self.link_repo.find_details_by_recipe(id)?;
        let available_count = ingredients.iter().filter(|d| d.is_available).count();

        Ok(RecipeDetail {
            recipe,
            ingredients,
            available_count,
        })
    }

    /// 整体替换菜谱的食材关联
    pub fn set_ingredient_links(&self, recipe_id: i64, links: &[RecipeIngredient]) -> ApiResult<()> {
        require_persisted_id("菜谱", recipe_id)?;
        Self::validate_links(recipe_id, links)?;

        self.link_repo.replace_for_recipe(recipe_id, links)?;
        self.tracker.bump(DataCollection::RecipeIngredients);

        tracing::info!(recipe_id, links = links.len(), "更新菜谱食材关联");
        Ok(())
    }

    /// 新增/覆盖单条关联
    pub fn add_ingredient_link(&self, link: &RecipeIngredient) -> ApiResult<()> {
        require_persisted_id("菜谱", link.recipe_id)?;
        require_persisted_id("食材", link.ingredient_id)?;

        self.link_repo.upsert(link)?;
        self.tracker.bump(DataCollection::RecipeIngredients);

        tracing::info!(
            recipe_id = link.recipe_id,
            ingredient_id = link.ingredient_id,
            "新增菜谱食材关联"
        );
        Ok(())
    }

    /// 删除单条关联
    pub fn remove_ingredient_link(&self, recipe_id: i64, ingredient_id: i64) -> ApiResult<bool> {
        let removed = self.link_repo.delete(recipe_id, ingredient_id)?;
        if removed {
            self.tracker.bump(DataCollection::RecipeIngredients);
            tracing::info!(recipe_id, ingredient_id, "删除菜谱食材关联");
        }
        Ok(removed)
    }
}
