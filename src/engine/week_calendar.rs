// ==========================================
// 膳食规划系统 - 周日历构建引擎
// ==========================================
// 职责: 以“周起始日”为锚点生成 7 天日历，每天每个餐别至多一条餐单
// 输入: 周起始日 + 该周 [start, start + 7) 内的餐单 + 菜谱名称表(可选)
// 输出: 7 个 CalendarDay，下标 0 = 周起始日
// ==========================================

use crate::domain::meal_plan::MealPlanEntry;
use crate::domain::types::{weekday_short_name, MealType};
use crate::engine::clock::Clock;
use crate::i18n;
use chrono::{Datelike, Duration, NaiveDate, Weekday};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

/// 一周天数
pub const DAYS_PER_WEEK: usize = 7;

// ==========================================
// CalendarSlot - 日历槽位
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CalendarSlot {
    pub entry: MealPlanEntry,
    /// 菜谱名称（调用方提供名称表时填充）
    pub recipe_name: Option<String>,
}

// ==========================================
// CalendarDay - 日历中的一天
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CalendarDay {
    pub date: NaiveDate,
    /// 星期缩写（如 "SUN"）
    pub day_name: &'static str,
    /// 几号
    pub day_number: u32,
    pub is_today: bool,
    /// 餐别 → 槽位；缺失的键即空槽位
    pub meals: BTreeMap<MealType, CalendarSlot>,
}

impl CalendarDay {
    /// 某餐别的餐单
    pub fn meal(&self, meal_type: MealType) -> Option<&MealPlanEntry> {
        self.meals.get(&meal_type).map(|slot| &slot.entry)
    }

    /// 当天是否没有任何餐单
    pub fn is_empty(&self) -> bool {
        self.meals.is_empty()
    }
}

/// 周起始日前移 offset_weeks 周（负数为后退）
///
/// 目标周的 [start, start + 7) 超出日期范围时返回 None
pub fn shift_week(current: NaiveDate, offset_weeks: i32) -> Option<NaiveDate> {
    let shifted =
        current.checked_add_signed(Duration::days(i64::from(offset_weeks) * DAYS_PER_WEEK as i64))?;
    WeekCalendarBuilder::week_range(shifted).map(|(start, _)| start)
}

/// 不晚于 date 的最近一个 first_day（含 date 当天）
///
/// 早于最小可表示日期时返回 None
pub fn week_start_for(date: NaiveDate, first_day: Weekday) -> Option<NaiveDate> {
    let back = (date.weekday().num_days_from_monday() + 7 - first_day.num_days_from_monday()) % 7;
    date.checked_sub_signed(Duration::days(i64::from(back)))
}

/// (year, day-of-year) 相同即同一天
fn is_same_day(a: NaiveDate, b: NaiveDate) -> bool {
    a.year() == b.year() && a.ordinal() == b.ordinal()
}

// ==========================================
// WeekCalendarBuilder - 周日历构建器
// ==========================================
pub struct WeekCalendarBuilder {
    first_day_of_week: Weekday,
    clock: Arc<dyn Clock>,
}

impl WeekCalendarBuilder {
    pub fn new(first_day_of_week: Weekday, clock: Arc<dyn Clock>) -> Self {
        Self {
            first_day_of_week,
            clock,
        }
    }

    pub fn first_day_of_week(&self) -> Weekday {
        self.first_day_of_week
    }

    /// 包含今天的那一周的起始日
    pub fn today_week_start(&self) -> Option<NaiveDate> {
        week_start_for(self.clock.today(), self.first_day_of_week)
    }

    /// 周的日期区间 [start, end)
    ///
    /// end 超出日期范围时返回 None
    pub fn week_range(week_start: NaiveDate) -> Option<(NaiveDate, NaiveDate)> {
        let end = week_start.checked_add_signed(Duration::days(DAYS_PER_WEEK as i64))?;
        Some((week_start, end))
    }

    /// 构建 7 天日历
    ///
    /// # 参数
    /// - `week_start`: 周起始日（调用方保证为周第一天）
    /// - `entries`: 该周内的餐单；窗口外的条目被忽略
    /// - `recipe_names`: 菜谱 id → 名称（可选，仅用于展示）
    ///
    /// # 说明
    /// - 同一 (日期, 餐别) 出现多条时保留输入顺序中的第一条
    /// - 周区间超出日期范围时返回 None
    pub fn build_week(
        &self,
        week_start: NaiveDate,
        entries: &[MealPlanEntry],
        recipe_names: Option<&HashMap<i64, String>>,
    ) -> Option<[CalendarDay; DAYS_PER_WEEK]> {
        // end 可表示，则区间内每一天都可表示
        Self::week_range(week_start)?;
        let today = self.clock.today();

        Some(std::array::from_fn(|offset| {
            let date = week_start + Duration::days(offset as i64);

            let mut meals: BTreeMap<MealType, CalendarSlot> = BTreeMap::new();
            for entry in entries.iter().filter(|e| is_same_day(e.date, date)) {
                if meals.contains_key(&entry.meal_type) {
                    tracing::warn!(
                        date = %date,
                        meal_type = %entry.meal_type,
                        dropped_id = entry.id,
                        "同一餐别存在多条餐单，仅保留第一条"
                    );
                    continue;
                }
                let recipe_name = recipe_names.and_then(|names| names.get(&entry.recipe_id).cloned());
                meals.insert(
                    entry.meal_type,
                    CalendarSlot {
                        entry: entry.clone(),
                        recipe_name,
                    },
                );
            }

            CalendarDay {
                date,
                day_name: weekday_short_name(date.weekday()),
                day_number: date.day(),
                is_today: is_same_day(date, today),
                meals,
            }
        }))
    }
}

/// 周区间标题
///
/// - 同月: "Week of Jan 7 - 13, 2024"
/// - 跨月: "Week of Jan 28 - Feb 3, 2024"
///
/// 年份取周最后一天所在年份；周末日超出日期范围时返回 None
pub fn week_range_text(week_start: NaiveDate) -> Option<String> {
    let week_end = week_start.checked_add_signed(Duration::days(DAYS_PER_WEEK as i64 - 1))?;
    let start_month = month_label(week_start.month());
    let end_month = month_label(week_end.month());
    let start_day = week_start.day().to_string();
    let end_day = week_end.day().to_string();
    let year = week_end.year().to_string();

    let text = if week_start.month() == week_end.month() {
        i18n::t_with_args(
            "calendar.week_range_same_month",
            &[
                ("start_month", &start_month),
                ("start_day", &start_day),
                ("end_day", &end_day),
                ("year", &year),
            ],
        )
    } else {
        i18n::t_with_args(
            "calendar.week_range_cross_month",
            &[
                ("start_month", &start_month),
                ("start_day", &start_day),
                ("end_month", &end_month),
                ("end_day", &end_day),
                ("year", &year),
            ],
        )
    };
    Some(text)
}

fn month_label(month: u32) -> String {
    i18n::t(&format!("calendar.month_{}", month))
}
