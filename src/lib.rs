// ==========================================
// 膳食规划系统 - 核心库
// ==========================================
// 功能: 食材库存、菜谱管理、每周餐单、按现有食材推荐菜谱
// 技术栈: Rust + SQLite
// ==========================================

// 初始化国际化系统
rust_i18n::i18n!("locales", fallback = "en");

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 数据仓储层 - 数据访问
pub mod repository;

// 引擎层 - 推荐/日历/筛选等派生计算
pub mod engine;

// 配置层 - 系统配置
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA 统一/建表）
pub mod db;

// 日志系统
pub mod logging;

// 国际化
pub mod i18n;

// API 层 - 业务接口
pub mod api;

// 应用层 - 状态组装
pub mod app;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域实体与类型
pub use domain::{
    Ingredient, IngredientFilter, MealPlanEntry, MealType, Recipe, RecipeIngredient,
    RecipeIngredientDetail,
};

// 引擎
pub use engine::{
    CalendarDay, ChangeTracker, Clock, IngredientMatchCalculator, MatchPolicy, RecipeMatch,
    SystemClock, WeekCalendarBuilder,
};

// API
pub use api::{ApiError, ApiResult, HomeApi, IngredientApi, MealPlanApi, RecipeApi};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "Mealzy";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
