// ==========================================
// 膳食规划系统 - 主入口
// ==========================================
// 无界面模式: 初始化数据库后输出首页概览、推荐菜谱与本周日历
// ==========================================

use anyhow::Context;
use mealzy::app::{get_default_db_path, AppState};
use mealzy::MealType;

#[tokio::main]
async fn main() {
    mealzy::logging::init();

    tracing::info!("==================================================");
    tracing::info!("{} - 膳食规划系统", mealzy::APP_NAME);
    tracing::info!("系统版本: {}", mealzy::VERSION);
    tracing::info!("==================================================");

    let db_path = get_default_db_path();
    tracing::info!("使用数据库: {}", db_path);

    let state = match AppState::new(db_path) {
        Ok(state) => state,
        Err(e) => {
            tracing::error!("无法初始化AppState: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = run(&state).await {
        tracing::error!("运行失败: {:#}", e);
        std::process::exit(1);
    }
}

async fn run(state: &AppState) -> anyhow::Result<()> {
    let overview = state.home_api.overview().context("加载首页概览失败")?;
    tracing::info!("{}", overview.greeting_text);
    tracing::info!(
        ingredients = overview.stats.ingredient_count,
        recipes = overview.stats.recipe_count,
        weekly_meals = overview.stats.weekly_meal_count,
        "统计"
    );
    for meal in &overview.upcoming_meals {
        tracing::info!("近期餐单: {} {} {}", meal.date_label, meal.meal_type, meal.recipe_name);
    }

    let suggestions = state
        .home_api
        .suggested_recipes()
        .await
        .context("计算推荐菜谱失败")?;
    for m in &suggestions {
        tracing::info!(
            "推荐: {} ({}%, {}/{})",
            m.recipe.name,
            m.match_percentage(),
            m.matching_count,
            m.total_count
        );
    }

    let week_start = state.meal_plan_api.current_week_start()?;
    tracing::info!("{}", state.meal_plan_api.week_range_text(week_start)?);
    let week = state
        .meal_plan_api
        .build_week(week_start)
        .with_context(|| format!("构建周日历失败: {}", week_start))?;
    for day in week {
        let slots: Vec<String> = MealType::ALL
            .iter()
            .map(|t| match day.meals.get(t) {
                Some(slot) => format!(
                    "{}={}",
                    t,
                    slot.recipe_name.as_deref().unwrap_or("?")
                ),
                None => format!("{}=-", t),
            })
            .collect();
        let marker = if day.is_today { "*" } else { " " };
        tracing::info!("{}{} {:>2} {}", marker, day.day_name, day.day_number, slots.join(" "));
    }

    Ok(())
}
