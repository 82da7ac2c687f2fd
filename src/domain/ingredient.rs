// ==========================================
// 膳食规划系统 - 食材领域模型
// ==========================================
// 约束: id 一经持久化即唯一且稳定; 修改 = 复制后替换
// ==========================================

use serde::{Deserialize, Serialize};

/// 未分类食材的默认类别
pub const DEFAULT_CATEGORY: &str = "Other";

// ==========================================
// Ingredient - 食材
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ingredient {
    pub id: i64,           // 主键 (0 = 尚未持久化)
    pub name: String,      // 名称
    pub quantity: String,  // 数量 (自由文本)
    pub unit: String,      // 单位
    pub category: String,  // 类别
    pub is_available: bool, // 是否有货
}

impl Ingredient {
    /// 创建尚未持久化的食材（默认类别 Other，默认有货）
    pub fn new(name: impl Into<String>, quantity: impl Into<String>, unit: impl Into<String>) -> Self {
        Self {
            id: 0,
            name: name.into(),
            quantity: quantity.into(),
            unit: unit.into(),
            category: DEFAULT_CATEGORY.to_string(),
            is_available: true,
        }
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    pub fn with_availability(mut self, is_available: bool) -> Self {
        self.is_available = is_available;
        self
    }

    /// 返回切换有货状态后的副本
    pub fn toggled(&self) -> Self {
        Self {
            is_available: !self.is_available,
            ..self.clone()
        }
    }
}
