// ==========================================
// 膳食规划系统 - 规划配置读取 Trait
// ==========================================
// 职责: 定义引擎/API 所需的配置读取接口（不包含实现）
// 红线: 不包含配置写入、不包含业务逻辑
// 实现者: ConfigManager（从 config_kv 表读取）
// ==========================================

use crate::engine::ingredient_match::MatchPolicy;
use chrono::Weekday;
use std::error::Error;

/// 配置读取结果
pub type ConfigResult<T> = Result<T, Box<dyn Error + Send + Sync>>;

pub trait PlannerConfigReader: Send + Sync {
    /// 一周起始日
    ///
    /// # 默认值
    /// - SUNDAY
    fn get_first_day_of_week(&self) -> ConfigResult<Weekday>;

    /// 推荐入选阈值（百分比）
    ///
    /// # 默认值
    /// - 70
    fn get_suggestion_match_threshold(&self) -> ConfigResult<u32>;

    /// 推荐数量上限
    ///
    /// # 默认值
    /// - 10
    fn get_suggestion_limit(&self) -> ConfigResult<usize>;

    /// 首页近期餐单窗口（天）
    ///
    /// # 默认值
    /// - 3
    fn get_upcoming_meal_days(&self) -> ConfigResult<u32>;

    /// 首页近期餐单条数上限
    ///
    /// # 默认值
    /// - 3
    fn get_upcoming_meal_limit(&self) -> ConfigResult<usize>;

    /// 界面语言
    ///
    /// # 默认值
    /// - en
    fn get_locale(&self) -> ConfigResult<String>;

    /// 推荐策略（阈值 + 上限）
    fn get_match_policy(&self) -> ConfigResult<MatchPolicy> {
        Ok(MatchPolicy {
            threshold_percent: self.get_suggestion_match_threshold()?,
            limit: self.get_suggestion_limit()?,
        })
    }
}
