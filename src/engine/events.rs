// ==========================================
// 膳食规划系统 - 数据变更追踪
// ==========================================
// 职责: 为派生视图（推荐菜谱、日历、统计）提供“读时重算”依据
// 机制: 每个数据集合一个单调递增版本号；写操作后递增；
//       缓存记录计算时的版本快照，快照不一致即重算（最后一次写入为准）
// ==========================================

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

// ==========================================
// 数据集合
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DataCollection {
    Ingredients,
    Recipes,
    RecipeIngredients,
    MealPlans,
}

impl DataCollection {
    pub fn as_str(&self) -> &'static str {
        match self {
            DataCollection::Ingredients => "INGREDIENTS",
            DataCollection::Recipes => "RECIPES",
            DataCollection::RecipeIngredients => "RECIPE_INGREDIENTS",
            DataCollection::MealPlans => "MEAL_PLANS",
        }
    }
}

/// 各集合版本号快照
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DataVersions {
    pub ingredients: u64,
    pub recipes: u64,
    pub recipe_ingredients: u64,
    pub meal_plans: u64,
}

// ==========================================
// ChangeTracker - 版本计数器
// ==========================================
#[derive(Debug, Default)]
pub struct ChangeTracker {
    ingredients: AtomicU64,
    recipes: AtomicU64,
    recipe_ingredients: AtomicU64,
    meal_plans: AtomicU64,
}

impl ChangeTracker {
    pub fn new() -> Self {
        Self::default()
    }

    fn counter(&self, collection: DataCollection) -> &AtomicU64 {
        match collection {
            DataCollection::Ingredients => &self.ingredients,
            DataCollection::Recipes => &self.recipes,
            DataCollection::RecipeIngredients => &self.recipe_ingredients,
            DataCollection::MealPlans => &self.meal_plans,
        }
    }

    /// 标记集合已变更
    ///
    /// # 返回
    /// 变更后的版本号
    pub fn bump(&self, collection: DataCollection) -> u64 {
        let version = self.counter(collection).fetch_add(1, Ordering::SeqCst) + 1;
        tracing::trace!(collection = collection.as_str(), version, "数据集合已变更");
        version
    }

    /// 标记多个集合已变更（如级联删除）
    pub fn bump_all(&self, collections: &[DataCollection]) {
        for collection in collections {
            self.bump(*collection);
        }
    }

    pub fn version(&self, collection: DataCollection) -> u64 {
        self.counter(collection).load(Ordering::SeqCst)
    }

    pub fn snapshot(&self) -> DataVersions {
        DataVersions {
            ingredients: self.version(DataCollection::Ingredients),
            recipes: self.version(DataCollection::Recipes),
            recipe_ingredients: self.version(DataCollection::RecipeIngredients),
            meal_plans: self.version(DataCollection::MealPlans),
        }
    }
}

// ==========================================
// DerivedViewCache - 派生视图缓存
// ==========================================
/// 以版本快照为键的单值缓存
///
/// 调用方应在计算前取快照并以该快照写回；计算期间若有写入，
/// 下一次读取时快照不一致，自动重算
#[derive(Debug)]
pub struct DerivedViewCache<T> {
    slot: Mutex<Option<(DataVersions, T)>>,
}

impl<T> Default for DerivedViewCache<T> {
    fn default() -> Self {
        Self {
            slot: Mutex::new(None),
        }
    }
}

impl<T: Clone> DerivedViewCache<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// 快照一致时返回缓存值
    pub fn get(&self, versions: DataVersions) -> Option<T> {
        let slot = self.slot.lock().ok()?;
        match slot.as_ref() {
            Some((cached, value)) if *cached == versions => Some(value.clone()),
            _ => None,
        }
    }

    /// 写入计算结果
    pub fn store(&self, versions: DataVersions, value: T) {
        match self.slot.lock() {
            Ok(mut slot) => *slot = Some((versions, value)),
            Err(e) => tracing::warn!("派生视图缓存锁获取失败，跳过写入: {}", e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bump_changes_snapshot() {
        let tracker = ChangeTracker::new();
        let before = tracker.snapshot();
        assert_eq!(before, DataVersions::default());

        assert_eq!(tracker.bump(DataCollection::MealPlans), 1);
        assert_eq!(tracker.bump(DataCollection::MealPlans), 2);
        let after = tracker.snapshot();
        assert_ne!(before, after);
        assert_eq!(after.meal_plans, 2);
        assert_eq!(after.ingredients, 0);
    }

    #[test]
    fn test_cache_recomputes_on_version_change() {
        let tracker = ChangeTracker::new();
        let cache: DerivedViewCache<Vec<i64>> = DerivedViewCache::new();

        let v1 = tracker.snapshot();
        assert_eq!(cache.get(v1), None);
        cache.store(v1, vec![1, 2]);
        assert_eq!(cache.get(v1), Some(vec![1, 2]));

        tracker.bump_all(&[DataCollection::Ingredients, DataCollection::RecipeIngredients]);
        let v2 = tracker.snapshot();
        assert_eq!(cache.get(v2), None);

        cache.store(v2, vec![3]);
        assert_eq!(cache.get(v2), Some(vec![3]));
    }
}
