// ==========================================
// 膳食规划系统 - 首页 API
// ==========================================
// 职责: 问候语、统计、近期餐单、推荐菜谱
// 推荐菜谱为派生视图: 读取时按数据版本判断是否重算
// ==========================================

use std::sync::Arc;

use chrono::Duration;
use serde::Serialize;

use crate::api::error::{ApiError, ApiResult};
use crate::config::PlannerConfigReader;
use crate::engine::clock::Clock;
use crate::engine::events::{ChangeTracker, DerivedViewCache};
use crate::engine::home_summary::{upcoming_meals, Greeting, HomeStats, UpcomingMeal};
use crate::engine::ingredient_match::{IngredientMatchCalculator, MatchPolicy, RecipeMatch};
use crate::engine::week_calendar::{week_start_for, WeekCalendarBuilder};
use crate::repository::ingredient_repo::IngredientRepository;
use crate::repository::meal_plan_repo::MealPlanRepository;
use crate::repository::recipe_ingredient_repo::RecipeIngredientRepository;
use crate::repository::recipe_repo::RecipeRepository;

/// 首页概览
#[derive(Debug, Clone, Serialize)]
pub struct HomeOverview {
    pub greeting: Greeting,
    pub greeting_text: String,
    pub stats: HomeStats,
    pub upcoming_meals: Vec<UpcomingMeal>,
}

// ==========================================
// HomeApi - 首页 API
// ==========================================
pub struct HomeApi {
    ingredient_repo: Arc<IngredientRepository>,
    recipe_repo: Arc<RecipeRepository>,
    link_repo: Arc<RecipeIngredientRepository>,
    meal_plan_repo: Arc<MealPlanRepository>,
    config: Arc<dyn PlannerConfigReader>,
    clock: Arc<dyn Clock>,
    tracker: Arc<ChangeTracker>,
    suggestion_cache: DerivedViewCache<(MatchPolicy, Vec<RecipeMatch>)>,
}

impl HomeApi {
    pub fn new(
        ingredient_repo: Arc<IngredientRepository>,
        recipe_repo: Arc<RecipeRepository>,
        link_repo: Arc<RecipeIngredientRepository>,
        meal_plan_repo: Arc<MealPlanRepository>,
        config: Arc<dyn PlannerConfigReader>,
        clock: Arc<dyn Clock>,
        tracker: Arc<ChangeTracker>,
    ) -> Self {
        Self {
            ingredient_repo,
            recipe_repo,
            link_repo,
            meal_plan_repo,
            config,
            clock,
            tracker,
            suggestion_cache: DerivedViewCache::new(),
        }
    }

    /// 当前时段问候语
    pub fn greeting(&self) -> Greeting {
        Greeting::for_time(self.clock.now())
    }

    /// 统计数字
    ///
    /// weekly_meal_count 统计包含今天的那一周（按配置的周起始日）
    pub fn stats(&self) -> ApiResult<HomeStats> {
        let first_day = self.config.get_first_day_of_week()?;
        let today = self.clock.today();
        let (start, end) = week_start_for(today, first_day)
            .and_then(WeekCalendarBuilder::week_range)
            .ok_or_else(|| ApiError::InvalidInput(format!("当前日期所在周超出日期范围: {}", today)))?;

        Ok(HomeStats {
            ingredient_count: self.ingredient_repo.count()?,
            recipe_count: self.recipe_repo.count()?,
            weekly_meal_count: self.meal_plan_repo.count_in_range(start, end)?,
        })
    }

    /// 近期餐单
    ///
    /// 窗口 [今天, 今天 + upcoming_meal_days)，取前 upcoming_meal_limit 条
    pub fn upcoming_meals(&self) -> ApiResult<Vec<UpcomingMeal>> {
        let days = self.config.get_upcoming_meal_days()?;
        let limit = self.config.get_upcoming_meal_limit()?;

        let today = self.clock.today();
        let end = today
            .checked_add_signed(Duration::days(i64::from(days)))
            .ok_or_else(|| {
                ApiError::InvalidInput(format!("近期餐单窗口超出日期范围: today={}, days={}", today, days))
            })?;
        let entries = self.meal_plan_repo.find_in_range(today, end)?;
        let recipes = self.recipe_repo.list_all()?;

        Ok(upcoming_meals(&entries, &recipes, limit))
    }

    /// 首页概览（问候语 + 统计 + 近期餐单）
    pub fn overview(&self) -> ApiResult<HomeOverview> {
        let greeting = self.greeting();
        Ok(HomeOverview {
            greeting,
            greeting_text: greeting.message(),
            stats: self.stats()?,
            upcoming_meals: self.upcoming_meals()?,
        })
    }

    /// 推荐菜谱（按现有食材匹配度）
    ///
    /// 数据版本与推荐策略均未变化时直接返回缓存
    pub async fn suggested_recipes(&self) -> ApiResult<Vec<RecipeMatch>> {
        let policy = self.config.get_match_policy()?;
        // 计算前取快照：计算期间的写入会使下一次读取重算
        let versions = self.tracker.snapshot();

        if let Some((cached_policy, cached)) = self.suggestion_cache.get(versions) {
            if cached_policy == policy {
                tracing::debug!(suggested = cached.len(), "推荐菜谱命中缓存");
                return Ok(cached);
            }
        }

        let recipes = self.recipe_repo.list_all()?;
        let available_ids = self.ingredient_repo.available_ids()?;
        let calculator = IngredientMatchCalculator::new(policy);
        let suggested = calculator
            .compute_suggested_recipes(&recipes, &available_ids, self.link_repo.as_ref())
            .await?;

        self.suggestion_cache.store(versions, (policy, suggested.clone()));
        Ok(suggested)
    }
}
