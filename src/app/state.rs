// ==========================================
// 膳食规划系统 - 应用状态
// ==========================================
// 职责: 管理应用级别的共享状态和API实例
// 说明: 所有仓储共享同一个数据库连接；由调用方显式构造并持有
// ==========================================

use std::sync::{Arc, Mutex};

use crate::api::{HomeApi, IngredientApi, MealPlanApi, RecipeApi};
use crate::config::{ConfigManager, PlannerConfigReader};
use crate::db::{ensure_schema, open_sqlite_connection};
use crate::engine::clock::{Clock, SystemClock};
use crate::engine::events::ChangeTracker;
use crate::repository::{
    IngredientRepository, MealPlanRepository, RecipeIngredientRepository, RecipeRepository,
};

/// 应用状态
///
/// 包含所有API实例和共享资源
pub struct AppState {
    /// 数据库路径
    pub db_path: String,

    /// 食材管理API
    pub ingredient_api: Arc<IngredientApi>,

    /// 菜谱管理API
    pub recipe_api: Arc<RecipeApi>,

    /// 每周餐单API
    pub meal_plan_api: Arc<MealPlanApi>,

    /// 首页API
    pub home_api: Arc<HomeApi>,

    /// 配置管理器（设置页读写）
    pub config_manager: Arc<ConfigManager>,

    /// 数据变更追踪（派生视图重算依据）
    pub change_tracker: Arc<ChangeTracker>,
}

impl AppState {
    /// 创建新的AppState实例（使用系统时钟）
    ///
    /// # 参数
    /// - db_path: 数据库文件路径（不存在时自动创建并建表）
    ///
    /// # 返回
    /// - Ok(AppState): 应用状态实例
    /// - Err(String): 初始化错误
    pub fn new(db_path: String) -> Result<Self, String> {
        Self::with_clock(db_path, Arc::new(SystemClock))
    }

    /// 使用指定时钟创建AppState（测试中固定“今天”）
    pub fn with_clock(db_path: String, clock: Arc<dyn Clock>) -> Result<Self, String> {
        tracing::info!("初始化AppState，数据库路径: {}", db_path);

        // 创建数据库连接（共享连接）
        let conn = open_sqlite_connection(&db_path).map_err(|e| format!("无法打开数据库: {}", e))?;
        ensure_schema(&conn).map_err(|e| format!("数据库建表失败: {}", e))?;
        let conn = Arc::new(Mutex::new(conn));

        // ==========================================
        // 初始化Repository层
        // ==========================================
        let ingredient_repo = Arc::new(IngredientRepository::from_connection(conn.clone()));
        let recipe_repo = Arc::new(RecipeRepository::from_connection(conn.clone()));
        let link_repo = Arc::new(RecipeIngredientRepository::from_connection(conn.clone()));
        let meal_plan_repo = Arc::new(MealPlanRepository::from_connection(conn.clone()));

        // ==========================================
        // 配置与共享组件
        // ==========================================
        let config_manager = Arc::new(
            ConfigManager::from_connection(conn.clone())
                .map_err(|e| format!("无法创建ConfigManager: {}", e))?,
        );
        let config_reader: Arc<dyn PlannerConfigReader> = config_manager.clone();

        match config_manager.get_locale() {
            Ok(locale) => crate::i18n::set_locale(&locale),
            Err(e) => tracing::warn!("读取界面语言失败，保持默认: {}", e),
        }

        let change_tracker = Arc::new(ChangeTracker::new());

        // ==========================================
        // 初始化API层
        // ==========================================
        let ingredient_api = Arc::new(IngredientApi::new(
            ingredient_repo.clone(),
            link_repo.clone(),
            change_tracker.clone(),
        ));

        let recipe_api = Arc::new(RecipeApi::new(
            recipe_repo.clone(),
            link_repo.clone(),
            change_tracker.clone(),
        ));

        let meal_plan_api = Arc::new(MealPlanApi::new(
            meal_plan_repo.clone(),
            recipe_repo.clone(),
            config_reader.clone(),
            clock.clone(),
            change_tracker.clone(),
        ));

        let home_api = Arc::new(HomeApi::new(
            ingredient_repo,
            recipe_repo,
            link_repo,
            meal_plan_repo,
            config_reader,
            clock,
            change_tracker.clone(),
        ));

        tracing::info!("AppState初始化完成");

        Ok(Self {
            db_path,
            ingredient_api,
            recipe_api,
            meal_plan_api,
            home_api,
            config_manager,
            change_tracker,
        })
    }

    /// 获取数据库路径
    pub fn get_db_path(&self) -> &str {
        &self.db_path
    }
}

// ==========================================
// 默认数据库路径辅助函数
// ==========================================

/// 获取默认数据库路径
///
/// # 返回
/// - 环境变量 MEALZY_DB_PATH（非空时）
/// - 开发环境: 用户数据目录/mealzy-dev/mealzy.db
/// - 生产环境: 用户数据目录/mealzy/mealzy.db
/// - 无法获取用户数据目录时: ./mealzy.db
pub fn get_default_db_path() -> String {
    use std::path::PathBuf;

    if let Ok(path) = std::env::var("MEALZY_DB_PATH") {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }

    let mut path = PathBuf::from("./mealzy.db");

    if let Some(data_dir) = dirs::data_dir() {
        // 开发环境使用独立目录，避免污染日常数据
        #[cfg(debug_assertions)]
        let dir = data_dir.join("mealzy-dev");

        #[cfg(not(debug_assertions))]
        let dir = data_dir.join("mealzy");

        match std::fs::create_dir_all(&dir) {
            Ok(()) => path = dir.join("mealzy.db"),
            Err(e) => tracing::warn!("无法创建数据目录 {}: {}，使用当前目录", dir.display(), e),
        }
    }

    path.to_string_lossy().to_string()
}
