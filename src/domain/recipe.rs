// ==========================================
// 膳食规划系统 - 菜谱领域模型
// ==========================================
// 包含: 菜谱、菜谱-食材关联、关联明细(含食材信息)
// ==========================================

use crate::domain::types::MealType;
use serde::{Deserialize, Serialize};

// ==========================================
// Recipe - 菜谱
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recipe {
    pub id: i64,                   // 主键 (0 = 尚未持久化)
    pub name: String,              // 名称
    pub description: String,       // 简介
    pub instructions: String,      // 做法
    pub prep_time_minutes: u32,    // 准备时间 (分钟)
    pub cook_time_minutes: u32,    // 烹饪时间 (分钟)
    pub servings: u32,             // 份数 (> 0)
    pub difficulty: String,        // 难度标签
    pub meal_type: MealType,       // 餐别
    pub image_url: Option<String>, // 图片引用
    pub is_favorite: bool,         // 是否收藏
}

impl Recipe {
    /// 创建尚未持久化的菜谱（其余字段取空/默认值）
    pub fn new(name: impl Into<String>, meal_type: MealType) -> Self {
        Self {
            id: 0,
            name: name.into(),
            description: String::new(),
            instructions: String::new(),
            prep_time_minutes: 0,
            cook_time_minutes: 0,
            servings: 1,
            difficulty: "Easy".to_string(),
            meal_type,
            image_url: None,
            is_favorite: false,
        }
    }

    /// 总耗时 (分钟)
    pub fn total_time_minutes(&self) -> u32 {
        self.prep_time_minutes + self.cook_time_minutes
    }
}

// ==========================================
// RecipeIngredient - 菜谱-食材关联
// ==========================================
// 复合主键 (recipe_id, ingredient_id); 删除菜谱或食材时级联删除
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RecipeIngredient {
    pub recipe_id: i64,
    pub ingredient_id: i64,
    pub quantity: String,
    pub unit: String,
}

impl RecipeIngredient {
    pub fn new(
        recipe_id: i64,
        ingredient_id: i64,
        quantity: impl Into<String>,
        unit: impl Into<String>,
    ) -> Self {
        Self {
            recipe_id,
            ingredient_id,
            quantity: quantity.into(),
            unit: unit.into(),
        }
    }
}

// ==========================================
// RecipeIngredientDetail - 关联明细
// ==========================================
// 用途: 菜谱详情页展示 (关联 + 食材名称/有货状态/类别)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipeIngredientDetail {
    pub ingredient_id: i64,
    pub ingredient_name: String,
    pub quantity: String,
    pub unit: String,
    pub is_available: bool,
    pub category: String,
}
