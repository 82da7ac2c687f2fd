// ==========================================
// 膳食规划系统 - 食材匹配推荐引擎
// ==========================================
// 职责: 按“菜谱食材有货比例”对菜谱排序并给出推荐
// 输入: 菜谱列表 + 有货食材 id 集合 + 关联查询
// 输出: 匹配度 >= 阈值的前 N 个菜谱（匹配度降序）
// ==========================================
// 匹配度 = floor(有货关联数 × 100 / 关联总数)，整数除法截断，不做四舍五入
// 无关联食材的菜谱不参与推荐
// 同匹配度按菜谱 id 升序
// ==========================================

use crate::domain::recipe::{Recipe, RecipeIngredient};
use crate::repository::error::RepositoryResult;
use async_trait::async_trait;
use futures::future::try_join_all;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

/// 默认推荐阈值（百分比）
pub const DEFAULT_MATCH_THRESHOLD_PERCENT: u32 = 70;

/// 默认推荐数量上限
pub const DEFAULT_SUGGESTION_LIMIT: usize = 10;

// ==========================================
// 匹配策略
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchPolicy {
    /// 入选阈值（含），百分比
    pub threshold_percent: u32,
    /// 输出数量上限
    pub limit: usize,
}

impl Default for MatchPolicy {
    fn default() -> Self {
        Self {
            threshold_percent: DEFAULT_MATCH_THRESHOLD_PERCENT,
            limit: DEFAULT_SUGGESTION_LIMIT,
        }
    }
}

// ==========================================
// 匹配结果
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipeMatch {
    pub recipe: Recipe,
    /// 有货的关联食材数
    pub matching_count: usize,
    /// 关联食材总数 (> 0)
    pub total_count: usize,
}

impl RecipeMatch {
    /// 匹配度（整数百分比，截断）
    pub fn match_percentage(&self) -> u32 {
        if self.total_count == 0 {
            return 0;
        }
        (self.matching_count * 100 / self.total_count) as u32
    }
}

// ==========================================
// 关联查询接口
// ==========================================
/// 按菜谱 id 获取其食材关联
///
/// 由仓储层实现；各菜谱的查询相互独立，可并发执行
#[async_trait]
pub trait IngredientLinkLookup: Send + Sync {
    async fn links_for_recipe(&self, recipe_id: i64) -> RepositoryResult<Vec<RecipeIngredient>>;
}

// ==========================================
// IngredientMatchCalculator - 匹配计算器
// ==========================================
#[derive(Debug, Clone, Default)]
pub struct IngredientMatchCalculator {
    policy: MatchPolicy,
}

impl IngredientMatchCalculator {
    pub fn new(policy: MatchPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> MatchPolicy {
        self.policy
    }

    /// 计算单个菜谱的匹配情况
    ///
    /// # 返回
    /// - None: 菜谱没有任何关联食材
    /// - Some(RecipeMatch): 匹配计数
    pub fn evaluate(
        recipe: &Recipe,
        links: &[RecipeIngredient],
        available_ids: &HashSet<i64>,
    ) -> Option<RecipeMatch> {
        if links.is_empty() {
            return None;
        }

        let matching_count = links
            .iter()
            .filter(|link| available_ids.contains(&link.ingredient_id))
            .count();

        Some(RecipeMatch {
            recipe: recipe.clone(),
            matching_count,
            total_count: links.len(),
        })
    }

    /// 过滤、排序、截断
    ///
    /// 1) 匹配度 >= 阈值
    /// 2) 匹配度降序，同分按菜谱 id 升序
    /// 3) 取前 limit 个
    pub fn rank(&self, candidates: impl IntoIterator<Item = RecipeMatch>) -> Vec<RecipeMatch> {
        let mut ranked: Vec<RecipeMatch> = candidates
            .into_iter()
            .filter(|m| m.match_percentage() >= self.policy.threshold_percent)
            .collect();

        ranked.sort_by(|a, b| match b.match_percentage().cmp(&a.match_percentage()) {
            Ordering::Equal => a.recipe.id.cmp(&b.recipe.id),
            other => other,
        });
        ranked.truncate(self.policy.limit);
        ranked
    }

    /// 基于已加载的关联表计算推荐（同步版本）
    ///
    /// 关联表中缺失的菜谱视为无关联食材
    pub fn compute_from_links(
        &self,
        recipes: &[Recipe],
        available_ids: &HashSet<i64>,
        links_by_recipe: &HashMap<i64, Vec<RecipeIngredient>>,
    ) -> Vec<RecipeMatch> {
        let candidates = recipes.iter().filter_map(|recipe| {
            let links = links_by_recipe
                .get(&recipe.id)
                .map(Vec::as_slice)
                .unwrap_or(&[]);
            Self::evaluate(recipe, links, available_ids)
        });
        self.rank(candidates)
    }

    /// 计算推荐菜谱
    ///
    /// 各菜谱关联并发查询（fan-out），全部完成后统一排序截断（fan-in）
    ///
    /// # 返回
    /// - Ok(Vec<RecipeMatch>): 至多 limit 个，匹配度降序
    /// - Err: 关联查询失败
    pub async fn compute_suggested_recipes<L>(
        &self,
        recipes: &[Recipe],
        available_ids: &HashSet<i64>,
        lookup: &L,
    ) -> RepositoryResult<Vec<RecipeMatch>>
    where
        L: IngredientLinkLookup + ?Sized,
    {
        if recipes.is_empty() {
            return Ok(Vec::new());
        }

        let lookups = recipes.iter().map(|recipe| async move {
            let links = lookup.links_for_recipe(recipe.id).await?;
            RepositoryResult::Ok(Self::evaluate(recipe, &links, available_ids))
        });
        let evaluated = try_join_all(lookups).await?;

        let ranked = self.rank(evaluated.into_iter().flatten());
        tracing::debug!(
            recipes = recipes.len(),
            available = available_ids.len(),
            suggested = ranked.len(),
            "推荐菜谱计算完成"
        );
        Ok(ranked)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::MealType;

    struct MapLookup(HashMap<i64, Vec<RecipeIngredient>>);

    #[async_trait]
    impl IngredientLinkLookup for MapLookup {
        async fn links_for_recipe(&self, recipe_id: i64) -> RepositoryResult<Vec<RecipeIngredient>> {
            Ok(self.0.get(&recipe_id).cloned().unwrap_or_default())
        }
    }

    fn recipe(id: i64) -> Recipe {
        Recipe {
            id,
            ..Recipe::new(format!("recipe-{}", id), MealType::Dinner)
        }
    }

    /// 菜谱关联 ingredient 1..=total
    fn links(recipe_id: i64, total: i64) -> Vec<RecipeIngredient> {
        (1..=total)
            .map(|ingredient_id| RecipeIngredient::new(recipe_id, ingredient_id, "1", "pc"))
            .collect()
    }

    fn available(ids: impl IntoIterator<Item = i64>) -> HashSet<i64> {
        ids.into_iter().collect()
    }

    #[test]
    fn test_percentage_truncates() {
        let calc = IngredientMatchCalculator::default();
        let r = recipe(1);

        // 7 个关联 5 个有货 => 71%
        let m = IngredientMatchCalculator::evaluate(&r, &links(1, 7), &available(1..=5)).unwrap();
        assert_eq!(m.match_percentage(), 71);
        assert_eq!(calc.rank(vec![m]).len(), 1);

        // 6 个关联 4 个有货 => 66%
        let m = IngredientMatchCalculator::evaluate(&r, &links(1, 6), &available(1..=4)).unwrap();
        assert_eq!(m.match_percentage(), 66);
        assert!(calc.rank(vec![m]).is_empty());
    }

    #[test]
    fn test_recipe_without_links_never_matches() {
        let calc = IngredientMatchCalculator::default();
        let recipes = vec![recipe(1), recipe(2)];
        let mut table = HashMap::new();
        table.insert(2, links(2, 2));

        let result = calc.compute_from_links(&recipes, &available(1..=100), &table);
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].recipe.id, 2);
        assert!(IngredientMatchCalculator::evaluate(&recipe(1), &[], &available(1..=100)).is_none());
    }

    #[test]
    fn test_empty_available_set_yields_nothing() {
        let calc = IngredientMatchCalculator::default();
        let mut table = HashMap::new();
        table.insert(1, links(1, 3));
        assert!(calc.compute_from_links(&[recipe(1)], &HashSet::new(), &table).is_empty());
    }

    #[test]
    fn test_sorted_descending_with_id_tie_break_and_limit() {
        let calc = IngredientMatchCalculator::default();
        let mut recipes = Vec::new();
        let mut table = HashMap::new();
        // id 1..=15: 奇数 id 全部有货 (100%), 偶数 id 4 个中 3 个有货 (75%)
        for id in 1..=15 {
            recipes.push(recipe(id));
            if id % 2 == 1 {
                table.insert(id, links(id, 2));
            } else {
                table.insert(id, links(id, 4));
            }
        }
        let result = calc.compute_from_links(&recipes, &available(1..=3), &table);

        assert_eq!(result.len(), DEFAULT_SUGGESTION_LIMIT);
        for pair in result.windows(2) {
            let (a, b) = (&pair[0], &pair[1]);
            assert!(a.match_percentage() >= b.match_percentage());
            if a.match_percentage() == b.match_percentage() {
                assert!(a.recipe.id < b.recipe.id);
            }
        }
        let ids: Vec<i64> = result.iter().map(|m| m.recipe.id).collect();
        assert_eq!(ids, vec![1, 3, 5, 7, 9, 11, 13, 15, 2, 4]);
    }

    #[test]
    fn test_custom_policy() {
        let calc = IngredientMatchCalculator::new(MatchPolicy {
            threshold_percent: 50,
            limit: 1,
        });
        let mut table = HashMap::new();
        table.insert(1, links(1, 2));
        table.insert(2, links(2, 4));
        let result = calc.compute_from_links(&[recipe(1), recipe(2)], &available([1]), &table);
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].recipe.id, 1);
        assert_eq!(result[0].match_percentage(), 50);
    }

    #[tokio::test]
    async fn test_async_scenario_three_of_four() {
        let calc = IngredientMatchCalculator::default();
        let mut table = HashMap::new();
        // A,B,C,D = 11,12,13,14
        table.insert(
            1,
            vec![
                RecipeIngredient::new(1, 11, "1", "pc"),
                RecipeIngredient::new(1, 12, "1", "pc"),
                RecipeIngredient::new(1, 13, "1", "pc"),
                RecipeIngredient::new(1, 14, "1", "pc"),
            ],
        );
        let lookup = MapLookup(table);

        let result = calc
            .compute_suggested_recipes(&[recipe(1)], &available([11, 12, 13]), &lookup)
            .await
            .unwrap();

        assert_eq!(result.len(), 1);
        assert_eq!(result[0].matching_count, 3);
        assert_eq!(result[0].total_count, 4);
        assert_eq!(result[0].match_percentage(), 75);
    }

    #[tokio::test]
    async fn test_async_empty_recipes() {
        let calc = IngredientMatchCalculator::default();
        let lookup = MapLookup(HashMap::new());
        let result = calc
            .compute_suggested_recipes(&[], &available([1]), &lookup)
            .await
            .unwrap();
        assert!(result.is_empty());
    }
}
