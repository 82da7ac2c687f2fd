// ==========================================
// 膳食规划系统 - 餐单领域模型
// ==========================================
// 日期只到天 (NaiveDate), 时刻无意义
// 约束: 同一 (日期, 餐别) 至多一条 (存储层唯一索引 + API 层检查)
// ==========================================

use crate::domain::types::MealType;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ==========================================
// MealPlanEntry - 餐单条目
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MealPlanEntry {
    pub id: i64,             // 主键 (0 = 尚未持久化)
    pub recipe_id: i64,      // 关联菜谱
    pub date: NaiveDate,     // 日期
    pub meal_type: MealType, // 餐别
    pub servings: u32,       // 份数
}

impl MealPlanEntry {
    pub fn new(recipe_id: i64, date: NaiveDate, meal_type: MealType, servings: u32) -> Self {
        Self {
            id: 0,
            recipe_id,
            date,
            meal_type,
            servings,
        }
    }
}
