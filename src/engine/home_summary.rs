// ==========================================
// 膳食规划系统 - 首页概览
// ==========================================
// 职责: 问候语、统计数字、近期餐单
// ==========================================

use crate::domain::meal_plan::MealPlanEntry;
use crate::domain::recipe::Recipe;
use crate::domain::types::MealType;
use crate::i18n;
use chrono::{NaiveDate, NaiveDateTime, Timelike};
use serde::Serialize;
use std::collections::HashMap;

// ==========================================
// 问候语
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Greeting {
    Morning,   // < 12 点
    Afternoon, // < 17 点
    Evening,
}

impl Greeting {
    pub fn for_time(now: NaiveDateTime) -> Self {
        match now.hour() {
            h if h < 12 => Greeting::Morning,
            h if h < 17 => Greeting::Afternoon,
            _ => Greeting::Evening,
        }
    }

    /// 本地化文案
    pub fn message(&self) -> String {
        match self {
            Greeting::Morning => i18n::t("home.greeting_morning"),
            Greeting::Afternoon => i18n::t("home.greeting_afternoon"),
            Greeting::Evening => i18n::t("home.greeting_evening"),
        }
    }
}

// ==========================================
// 统计
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct HomeStats {
    pub ingredient_count: usize,
    pub recipe_count: usize,
    /// 本周（按配置的周起始日）餐单数
    pub weekly_meal_count: usize,
}

// ==========================================
// 近期餐单
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UpcomingMeal {
    pub entry_id: i64,
    pub recipe_name: String,
    pub meal_type: MealType,
    pub date: NaiveDate,
    /// 如 "Tue, Jan 9"
    pub date_label: String,
}

/// 近期餐单列表
///
/// 按 (日期, 餐别) 排序取前 limit 条，再关联菜谱名称；
/// 菜谱已不存在的条目被丢弃
pub fn upcoming_meals(entries: &[MealPlanEntry], recipes: &[Recipe], limit: usize) -> Vec<UpcomingMeal> {
    let names: HashMap<i64, &str> = recipes.iter().map(|r| (r.id, r.name.as_str())).collect();

    let mut sorted: Vec<&MealPlanEntry> = entries.iter().collect();
    sorted.sort_by_key(|e| (e.date, e.meal_type));

    sorted
        .into_iter()
        .take(limit)
        .filter_map(|entry| {
            let recipe_name = names.get(&entry.recipe_id)?;
            Some(UpcomingMeal {
                entry_id: entry.id,
                recipe_name: recipe_name.to_string(),
                meal_type: entry.meal_type,
                date: entry.date,
                date_label: entry.date.format("%a, %b %-d").to_string(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 9)
            .unwrap()
            .and_hms_opt(hour, 30, 0)
            .unwrap()
    }

    #[test]
    fn test_greeting_boundaries() {
        assert_eq!(Greeting::for_time(at(0)), Greeting::Morning);
        assert_eq!(Greeting::for_time(at(11)), Greeting::Morning);
        assert_eq!(Greeting::for_time(at(12)), Greeting::Afternoon);
        assert_eq!(Greeting::for_time(at(16)), Greeting::Afternoon);
        assert_eq!(Greeting::for_time(at(17)), Greeting::Evening);
        assert_eq!(Greeting::for_time(at(23)), Greeting::Evening);
    }

    #[test]
    fn test_upcoming_meals_sorted_limited_and_named() {
        let day1 = NaiveDate::from_ymd_opt(2024, 1, 9).unwrap();
        let day2 = NaiveDate::from_ymd_opt(2024, 1, 10).unwrap();
        let mut soup = Recipe::new("Soup", MealType::Dinner);
        soup.id = 1;
        let mut toast = Recipe::new("Toast", MealType::Breakfast);
        toast.id = 2;

        let entries = vec![
            MealPlanEntry { id: 1, ..MealPlanEntry::new(1, day2, MealType::Dinner, 2) },
            MealPlanEntry { id: 2, ..MealPlanEntry::new(1, day1, MealType::Dinner, 2) },
            MealPlanEntry { id: 3, ..MealPlanEntry::new(2, day1, MealType::Breakfast, 1) },
            MealPlanEntry { id: 4, ..MealPlanEntry::new(2, day2, MealType::Breakfast, 1) },
        ];

        let upcoming = upcoming_meals(&entries, &[soup, toast], 3);
        let ids: Vec<i64> = upcoming.iter().map(|m| m.entry_id).collect();
        assert_eq!(ids, vec![3, 2, 4]);
        assert_eq!(upcoming[0].recipe_name, "Toast");
        assert_eq!(upcoming[0].date_label, "Tue, Jan 9");
    }

    #[test]
    fn test_upcoming_meals_skips_unknown_recipe() {
        let day = NaiveDate::from_ymd_opt(2024, 1, 9).unwrap();
        let entries = vec![MealPlanEntry::new(99, day, MealType::Lunch, 1)];
        assert!(upcoming_meals(&entries, &[], 3).is_empty());
    }
}
