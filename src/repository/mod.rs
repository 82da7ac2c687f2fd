// ==========================================
// 膳食规划系统 - 数据仓储层
// ==========================================
// 红线: Repository 不含业务逻辑
// 职责: 提供数据访问接口,屏蔽数据库细节
// 约束: 所有查询使用参数化,防止 SQL 注入
// ==========================================

pub mod error;
pub mod ingredient_repo;
pub mod meal_plan_repo;
pub mod recipe_ingredient_repo;
pub mod recipe_repo;
pub mod row_utils;

// 重导出核心仓储
pub use error::{RepositoryError, RepositoryResult};
pub use ingredient_repo::IngredientRepository;
pub use meal_plan_repo::MealPlanRepository;
pub use recipe_ingredient_repo::RecipeIngredientRepository;
pub use recipe_repo::RecipeRepository;
