// ==========================================
// 膳食规划系统 - 每周餐单 API
// ==========================================
// 职责: 周日历构建、周导航、餐单增删
// 约束: 每个 (日期, 餐别) 至多一条餐单
// ==========================================

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{NaiveDate, Weekday};

use crate::api::error::{require_persisted_id, ApiError, ApiResult};
use crate::config::PlannerConfigReader;
use crate::domain::meal_plan::MealPlanEntry;
use crate::domain::types::MealType;
use crate::engine::clock::Clock;
use crate::engine::events::{ChangeTracker, DataCollection};
use crate::engine::week_calendar::{
    shift_week, week_range_text, CalendarDay, WeekCalendarBuilder, DAYS_PER_WEEK,
};
use crate::repository::error::RepositoryError;
use crate::repository::meal_plan_repo::MealPlanRepository;
use crate::repository::recipe_repo::RecipeRepository;

// ==========================================
// MealPlanApi - 每周餐单 API
// ==========================================
pub struct MealPlanApi {
    meal_plan_repo: Arc<MealPlanRepository>,
    recipe_repo: Arc<RecipeRepository>,
    config: Arc<dyn PlannerConfigReader>,
    clock: Arc<dyn Clock>,
    tracker: Arc<ChangeTracker>,
}

impl MealPlanApi {
    pub fn new(
        meal_plan_repo: Arc<MealPlanRepository>,
        recipe_repo: Arc<RecipeRepository>,
        config: Arc<dyn PlannerConfigReader>,
        clock: Arc<dyn Clock>,
        tracker: Arc<ChangeTracker>,
    ) -> Self {
        Self {
            meal_plan_repo,
            recipe_repo,
            config,
            clock,
            tracker,
        }
    }

    /// 按当前配置的周起始日构建日历构建器
    fn builder(&self) -> ApiResult<WeekCalendarBuilder> {
        let first_day: Weekday = self.config.get_first_day_of_week()?;
        Ok(WeekCalendarBuilder::new(first_day, self.clock.clone()))
    }

    /// 包含今天的那一周的起始日
    pub fn current_week_start(&self) -> ApiResult<NaiveDate> {
        let builder = self.builder()?;
        builder.today_week_start().ok_or_else(|| {
            ApiError::InvalidInput(format!("当前日期无法定位周起始日: {}", self.clock.today()))
        })
    }

    /// 周导航
    ///
    /// # 参数
    /// - current: 当前周起始日
    /// - offset_weeks: 前进(正)/后退(负)的周数
    pub fn shift_week(&self, current: NaiveDate, offset_weeks: i32) -> ApiResult<NaiveDate> {
        shift_week(current, offset_weeks).ok_or_else(|| {
            ApiError::InvalidInput(format!(
                "周偏移超出日期范围: current={}, offset={}",
                current, offset_weeks
            ))
        })
    }

    /// 构建指定周的 7 天日历（含菜谱名称）
    pub fn build_week(&self, week_start: NaiveDate) -> ApiResult<[CalendarDay; DAYS_PER_WEEK]> {
        let builder = self.builder()?;
        let (start, end) =
            WeekCalendarBuilder::week_range(week_start).ok_or_else(|| week_out_of_range(week_start))?;
        let entries = self.meal_plan_repo.find_in_range(start, end)?;

        let recipe_names: HashMap<i64, String> = self
            .recipe_repo
            .list_all()?
            .into_iter()
            .map(|r| (r.id, r.name))
            .collect();

        tracing::debug!(week_start = %week_start, entries = entries.len(), "构建周日历");
        builder
            .build_week(week_start, &entries, Some(&recipe_names))
            .ok_or_else(|| week_out_of_range(week_start))
    }

    /// 构建本周日历
    pub fn build_current_week(&self) -> ApiResult<[CalendarDay; DAYS_PER_WEEK]> {
        let start = self.current_week_start()?;
        self.build_week(start)
    }

    /// 周区间标题
    pub fn week_range_text(&self, week_start: NaiveDate) -> ApiResult<String> {
        week_range_text(week_start).ok_or_else(|| week_out_of_range(week_start))
    }

    /// 新增餐单
    ///
    /// # 返回
    /// - Ok(i64): 新餐单ID
    /// - Err(ApiError::SlotOccupied): 该日期该餐别已有餐单
    /// - Err(ApiError::NotFound): 菜谱不存在
    pub fn add_meal_plan(
        &self,
        recipe_id: i64,
        date: NaiveDate,
        meal_type: MealType,
        servings: u32,
    ) -> ApiResult<i64> {
        require_persisted_id("菜谱", recipe_id)?;
        if servings == 0 {
            return Err(ApiError::InvalidInput("份数必须大于0".to_string()));
        }
        if self.recipe_repo.find_by_id(recipe_id)?.is_none() {
            return Err(ApiError::NotFound(format!("菜谱(id={})不存在", recipe_id)));
        }
        if self.meal_plan_repo.find_by_slot(date, meal_type)?.is_some() {
            return Err(ApiError::SlotOccupied { date, meal_type });
        }

        let entry = MealPlanEntry::new(recipe_id, date, meal_type, servings);
        let id = self
            .meal_plan_repo
            .insert(&entry)
            .map_err(|e| slot_conflict_or(e, date, meal_type))?;
        self.tracker.bump(DataCollection::MealPlans);

        tracing::info!(id, recipe_id, date = %date, meal_type = %meal_type, "新增餐单");
        Ok(id)
    }

    /// 修改餐单份数
    pub fn update_servings(&self, id: i64, servings: u32) -> ApiResult<()> {
        if servings == 0 {
            return Err(ApiError::InvalidInput("份数必须大于0".to_string()));
        }
        let mut entry = self
            .meal_plan_repo
            .find_by_id(id)?
            .ok_or_else(|| ApiError::NotFound(format!("餐单(id={})不存在", id)))?;
        entry.servings = servings;
        self.meal_plan_repo.update(&entry)?;
        self.tracker.bump(DataCollection::MealPlans);

        tracing::info!(id, servings, "修改餐单份数");
        Ok(())
    }

    /// 删除餐单
    pub fn delete_meal_plan(&self, id: i64) -> ApiResult<bool> {
        let deleted = self.meal_plan_repo.delete_by_id(id)?;
        if deleted {
            self.tracker.bump(DataCollection::MealPlans);
            tracing::info!(id, "删除餐单");
        }
        Ok(deleted)
    }
}

fn week_out_of_range(week_start: NaiveDate) -> ApiError {
    ApiError::InvalidInput(format!("周区间超出日期范围: week_start={}", week_start))
}

/// 插入失败的错误映射
///
/// 并发写入时由 (date, meal_type) 唯一索引兜底，只有唯一约束冲突视为槽位占用
fn slot_conflict_or(err: RepositoryError, date: NaiveDate, meal_type: MealType) -> ApiError {
    match err {
        RepositoryError::UniqueConstraintViolation(_) => ApiError::SlotOccupied { date, meal_type },
        other => other.into(),
    }
}
