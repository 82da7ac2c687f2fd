// ==========================================
// 膳食规划系统 - 配置管理器
// ==========================================
// 职责: 配置加载、查询、覆写管理
// 存储: config_kv 表 (key-value)
// ==========================================

use crate::config::planner_config::{ConfigResult, PlannerConfigReader};
use crate::domain::types::parse_weekday;
use crate::engine::ingredient_match::{DEFAULT_MATCH_THRESHOLD_PERCENT, DEFAULT_SUGGESTION_LIMIT};
use chrono::Weekday;
use rusqlite::{params, Connection, OptionalExtension};
use std::collections::BTreeMap;
use std::str::FromStr;
use std::sync::{Arc, Mutex, MutexGuard};

// ==========================================
// 配置键
// ==========================================
pub mod config_keys {
    pub const FIRST_DAY_OF_WEEK: &str = "first_day_of_week";
    pub const SUGGESTION_MATCH_THRESHOLD: &str = "suggestion_match_threshold";
    pub const SUGGESTION_LIMIT: &str = "suggestion_limit";
    pub const UPCOMING_MEAL_DAYS: &str = "upcoming_meal_days";
    pub const UPCOMING_MEAL_LIMIT: &str = "upcoming_meal_limit";
    pub const LOCALE: &str = "locale";
}

/// 默认一周起始日
pub const DEFAULT_FIRST_DAY_OF_WEEK: Weekday = Weekday::Sun;
/// 默认近期餐单窗口（天）
pub const DEFAULT_UPCOMING_MEAL_DAYS: u32 = 3;
/// 近期餐单窗口上限（天）
pub const MAX_UPCOMING_MEAL_DAYS: u32 = 366;
/// 默认近期餐单条数
pub const DEFAULT_UPCOMING_MEAL_LIMIT: usize = 3;
/// 默认语言
pub const DEFAULT_LOCALE: &str = "en";

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
pub struct ConfigManager {
    conn: Arc<Mutex<Connection>>,
}

impl ConfigManager {
    /// 从已有连接创建 ConfigManager
    ///
    /// 说明：为保证连接行为一致，会对传入连接再次应用统一 PRAGMA（幂等）。
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> ConfigResult<Self> {
        {
            let conn_guard = conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
            crate::db::configure_sqlite_connection(&conn_guard)?;
        }

        Ok(Self { conn })
    }

    fn get_conn(&self) -> ConfigResult<MutexGuard<Connection>> {
        Ok(self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?)
    }

    /// 读取配置值
    ///
    /// # 返回
    /// - Some(String): 配置值
    /// - None: 配置不存在
    pub fn get_config_value(&self, key: &str) -> ConfigResult<Option<String>> {
        let conn = self.get_conn()?;
        let value = conn
            .query_row(
                "SELECT value FROM config_kv WHERE key = ?1",
                params![key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }

    /// 写入配置值（存在则覆盖）
    pub fn set_config_value(&self, key: &str, value: &str) -> ConfigResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            "INSERT INTO config_kv (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = ?2, updated_at = datetime('now')",
            params![key, value],
        )?;
        tracing::info!(key, value, "配置已更新");
        Ok(())
    }

    /// 删除配置值（恢复默认）
    pub fn remove_config_value(&self, key: &str) -> ConfigResult<bool> {
        let conn = self.get_conn()?;
        let affected = conn.execute("DELETE FROM config_kv WHERE key = ?1", params![key])?;
        Ok(affected > 0)
    }

    /// 获取所有配置的快照（JSON格式）
    pub fn get_config_snapshot(&self) -> ConfigResult<String> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare("SELECT key, value FROM config_kv ORDER BY key")?;

        let mut config_map: BTreeMap<String, String> = BTreeMap::new();
        let rows = stmt.query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)))?;
        for row in rows {
            let (key, value) = row?;
            config_map.insert(key, value);
        }

        Ok(serde_json::to_string(&config_map)?)
    }

    /// 从配置快照恢复配置（单事务）
    ///
    /// # 返回
    /// - Ok(usize): 恢复的配置项数量
    pub fn restore_config_from_snapshot(&self, snapshot_json: &str) -> ConfigResult<usize> {
        let config_map: BTreeMap<String, String> = serde_json::from_str(snapshot_json)?;

        let mut conn = self.get_conn()?;
        let tx = conn.transaction()?;
        let mut count = 0;
        for (key, value) in config_map.iter() {
            count += tx.execute(
                "INSERT INTO config_kv (key, value) VALUES (?1, ?2)
                 ON CONFLICT(key) DO UPDATE SET value = ?2, updated_at = datetime('now')",
                params![key, value],
            )?;
        }
        tx.commit()?;

        Ok(count)
    }

    /// 读取并解析配置；缺失返回默认值，解析失败记录告警并返回默认值
    fn get_parsed_or_default<T, F>(&self, key: &str, default: T, parse: F) -> ConfigResult<T>
    where
        F: FnOnce(&str) -> Option<T>,
    {
        match self.get_config_value(key)? {
            None => Ok(default),
            Some(raw) => match parse(raw.trim()) {
                Some(value) => Ok(value),
                None => {
                    tracing::warn!(key, raw = raw.as_str(), "配置值无法解析，使用默认值");
                    Ok(default)
                }
            },
        }
    }
}

impl PlannerConfigReader for ConfigManager {
    fn get_first_day_of_week(&self) -> ConfigResult<Weekday> {
        self.get_parsed_or_default(
            config_keys::FIRST_DAY_OF_WEEK,
            DEFAULT_FIRST_DAY_OF_WEEK,
            parse_weekday,
        )
    }

    fn get_suggestion_match_threshold(&self) -> ConfigResult<u32> {
        self.get_parsed_or_default(
            config_keys::SUGGESTION_MATCH_THRESHOLD,
            DEFAULT_MATCH_THRESHOLD_PERCENT,
            |s| u32::from_str(s).ok().filter(|v| *v <= 100),
        )
    }

    fn get_suggestion_limit(&self) -> ConfigResult<usize> {
        self.get_parsed_or_default(config_keys::SUGGESTION_LIMIT, DEFAULT_SUGGESTION_LIMIT, |s| {
            usize::from_str(s).ok()
        })
    }

    fn get_upcoming_meal_days(&self) -> ConfigResult<u32> {
        self.get_parsed_or_default(
            config_keys::UPCOMING_MEAL_DAYS,
            DEFAULT_UPCOMING_MEAL_DAYS,
            |s| u32::from_str(s).ok().filter(|v| *v <= MAX_UPCOMING_MEAL_DAYS),
        )
    }

    fn get_upcoming_meal_limit(&self) -> ConfigResult<usize> {
        self.get_parsed_or_default(
            config_keys::UPCOMING_MEAL_LIMIT,
            DEFAULT_UPCOMING_MEAL_LIMIT,
            |s| usize::from_str(s).ok(),
        )
    }

    fn get_locale(&self) -> ConfigResult<String> {
        self.get_parsed_or_default(config_keys::LOCALE, DEFAULT_LOCALE.to_string(), |s| {
            Some(s.to_string()).filter(|v| !v.is_empty())
        })
    }
}
