// ==========================================
// 膳食规划系统 - 引擎层
// ==========================================
// 职责: 纯计算的派生视图，不拼 SQL
// 红线: Engine 不持有可变共享状态（版本计数器除外）
// ==========================================

pub mod catalog;
pub mod clock;
pub mod events;
pub mod home_summary;
pub mod ingredient_match;
pub mod week_calendar;

// 重导出核心引擎
pub use catalog::{filter_ingredients, filter_recipes, IngredientListItem};
pub use clock::{Clock, FixedClock, SystemClock};
pub use events::{ChangeTracker, DataCollection, DataVersions, DerivedViewCache};
pub use home_summary::{upcoming_meals, Greeting, HomeStats, UpcomingMeal};
pub use ingredient_match::{
    IngredientLinkLookup, IngredientMatchCalculator, MatchPolicy, RecipeMatch,
    DEFAULT_MATCH_THRESHOLD_PERCENT, DEFAULT_SUGGESTION_LIMIT,
};
pub use week_calendar::{
    shift_week, week_range_text, week_start_for, CalendarDay, CalendarSlot, WeekCalendarBuilder,
    DAYS_PER_WEEK,
};
