// ==========================================
// 膳食规划系统 - 领域模型层
// ==========================================
// 职责: 定义领域实体与类型
// 红线: 不含数据访问逻辑,不含引擎逻辑
// ==========================================

pub mod ingredient;
pub mod meal_plan;
pub mod recipe;
pub mod types;

// 重导出核心类型
pub use ingredient::Ingredient;
pub use meal_plan::MealPlanEntry;
pub use recipe::{Recipe, RecipeIngredient, RecipeIngredientDetail};
pub use types::{IngredientFilter, MealType};
