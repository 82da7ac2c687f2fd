// ==========================================
// 膳食规划系统 - API 层
// ==========================================
// 职责: 输入校验、仓储编排、错误转换、变更通知
// ==========================================

pub mod error;
pub mod home_api;
pub mod ingredient_api;
pub mod meal_plan_api;
pub mod recipe_api;

// 重导出核心类型
pub use error::{ApiError, ApiResult};
pub use home_api::{HomeApi, HomeOverview};
pub use ingredient_api::{DeletedIngredient, IngredientApi};
pub use meal_plan_api::MealPlanApi;
pub use recipe_api::{RecipeApi, RecipeDetail};
