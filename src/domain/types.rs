// ==========================================
// 膳食规划系统 - 领域类型定义
// ==========================================
// 职责: 餐别、食材筛选模式等枚举
// 序列化格式: SCREAMING_SNAKE_CASE (与数据库一致)
// ==========================================

use chrono::Weekday;
use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 餐别 (Meal Type)
// ==========================================
// 顺序: Breakfast < Lunch < Dinner < Snack (日历槽位顺序)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MealType {
    Breakfast, // 早餐
    Lunch,     // 午餐
    Dinner,    // 晚餐
    Snack,     // 加餐
}

impl MealType {
    /// 全部餐别（按日历槽位顺序）
    pub const ALL: [MealType; 4] = [
        MealType::Breakfast,
        MealType::Lunch,
        MealType::Dinner,
        MealType::Snack,
    ];

    /// 从字符串解析餐别
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "BREAKFAST" => Some(MealType::Breakfast),
            "LUNCH" => Some(MealType::Lunch),
            "DINNER" => Some(MealType::Dinner),
            "SNACK" => Some(MealType::Snack),
            _ => None,
        }
    }

    /// 转换为数据库存储的字符串
    pub fn to_db_str(&self) -> &'static str {
        match self {
            MealType::Breakfast => "BREAKFAST",
            MealType::Lunch => "LUNCH",
            MealType::Dinner => "DINNER",
            MealType::Snack => "SNACK",
        }
    }
}

impl fmt::Display for MealType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_str())
    }
}

// ==========================================
// 食材筛选模式 (Ingredient Filter)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IngredientFilter {
    #[default]
    All,           // 全部
    AvailableOnly, // 仅有货
    OutOfStock,    // 仅缺货
}

impl fmt::Display for IngredientFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IngredientFilter::All => write!(f, "ALL"),
            IngredientFilter::AvailableOnly => write!(f, "AVAILABLE_ONLY"),
            IngredientFilter::OutOfStock => write!(f, "OUT_OF_STOCK"),
        }
    }
}

// ==========================================
// 星期解析 (一周起始日配置)
// ==========================================

/// 解析星期名称（支持全称与三字母缩写，大小写不敏感）
pub fn parse_weekday(s: &str) -> Option<Weekday> {
    match s.trim().to_uppercase().as_str() {
        "SUNDAY" | "SUN" => Some(Weekday::Sun),
        "MONDAY" | "MON" => Some(Weekday::Mon),
        "TUESDAY" | "TUE" => Some(Weekday::Tue),
        "WEDNESDAY" | "WED" => Some(Weekday::Wed),
        "THURSDAY" | "THU" => Some(Weekday::Thu),
        "FRIDAY" | "FRI" => Some(Weekday::Fri),
        "SATURDAY" | "SAT" => Some(Weekday::Sat),
        _ => None,
    }
}

/// 星期的三字母大写缩写（如 "SUN"）
pub fn weekday_short_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Sun => "SUN",
        Weekday::Mon => "MON",
        Weekday::Tue => "TUE",
        Weekday::Wed => "WED",
        Weekday::Thu => "THU",
        Weekday::Fri => "FRI",
        Weekday::Sat => "SAT",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_meal_type_db_round_trip() {
        for meal_type in MealType::ALL {
            assert_eq!(MealType::from_str(meal_type.to_db_str()), Some(meal_type));
        }
        assert_eq!(MealType::from_str(" dinner "), Some(MealType::Dinner));
        assert_eq!(MealType::from_str("BRUNCH"), None);
    }

    #[test]
    fn test_meal_type_serde_format() {
        let json = serde_json::to_string(&MealType::Breakfast).unwrap();
        assert_eq!(json, "\"BREAKFAST\"");
    }

    #[test]
    fn test_parse_weekday() {
        assert_eq!(parse_weekday("sunday"), Some(Weekday::Sun));
        assert_eq!(parse_weekday("MON"), Some(Weekday::Mon));
        assert_eq!(parse_weekday("someday"), None);
        assert_eq!(weekday_short_name(Weekday::Tue), "TUE");
    }
}
