// ==========================================
// 膳食规划系统 - 目录筛选
// ==========================================
// 职责: 食材列表（搜索 + 有货筛选 + 按类别分组）、菜谱列表（餐别 + 关键字）
// ==========================================

use crate::domain::ingredient::Ingredient;
use crate::domain::recipe::Recipe;
use crate::domain::types::{IngredientFilter, MealType};
use serde::Serialize;

/// 食材列表项：类别标题或食材
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IngredientListItem {
    Header(String),
    Item(Ingredient),
}

/// 筛选并分组食材
///
/// 1) 名称包含关键字（大小写不敏感，空关键字不过滤）
/// 2) 按有货模式过滤
/// 3) 按 (类别, 名称) 排序
/// 4) 每个类别前插入一个标题
pub fn filter_ingredients(
    ingredients: &[Ingredient],
    query: &str,
    filter: IngredientFilter,
) -> Vec<IngredientListItem> {
    let needle = query.trim().to_lowercase();

    let mut filtered: Vec<&Ingredient> = ingredients
        .iter()
        .filter(|i| needle.is_empty() || i.name.to_lowercase().contains(&needle))
        .filter(|i| match filter {
            IngredientFilter::All => true,
            IngredientFilter::AvailableOnly => i.is_available,
            IngredientFilter::OutOfStock => !i.is_available,
        })
        .collect();
    filtered.sort_by(|a, b| a.category.cmp(&b.category).then_with(|| a.name.cmp(&b.name)));

    let mut items = Vec::with_capacity(filtered.len() * 2);
    let mut current_category: Option<&str> = None;
    for ingredient in filtered {
        if current_category != Some(ingredient.category.as_str()) {
            current_category = Some(ingredient.category.as_str());
            items.push(IngredientListItem::Header(ingredient.category.clone()));
        }
        items.push(IngredientListItem::Item(ingredient.clone()));
    }
    items
}

/// 筛选菜谱
///
/// - `meal_type`: Some 时仅保留该餐别
/// - `query`: 去空白后非空时，名称或简介包含关键字（大小写不敏感）
///
/// 保持输入顺序
pub fn filter_recipes(recipes: &[Recipe], query: Option<&str>, meal_type: Option<MealType>) -> Vec<Recipe> {
    let needle = query
        .map(|q| q.trim().to_lowercase())
        .filter(|q| !q.is_empty());

    recipes
        .iter()
        .filter(|r| meal_type.map_or(true, |t| r.meal_type == t))
        .filter(|r| match &needle {
            Some(q) => r.name.to_lowercase().contains(q) || r.description.to_lowercase().contains(q),
            None => true,
        })
        .cloned()
        .collect()
}
