// ==========================================
// 膳食规划系统 - 时间源
// ==========================================
// 职责: 为“今天”判断、问候语、本周计算提供可注入的当前时间
// 说明: 生产使用本地时间，测试使用固定时间
// ==========================================

use chrono::{Local, NaiveDate, NaiveDateTime};

/// 当前时间来源
pub trait Clock: Send + Sync {
    /// 当前本地时间
    fn now(&self) -> NaiveDateTime;

    /// 当前日期（时刻清零）
    fn today(&self) -> NaiveDate {
        self.now().date()
    }
}

/// 系统时钟（本地时区）
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

/// 固定时钟
#[derive(Debug, Clone, Copy)]
pub struct FixedClock {
    now: NaiveDateTime,
}

impl FixedClock {
    pub fn new(now: NaiveDateTime) -> Self {
        Self { now }
    }

    /// 固定在某天的正午
    pub fn at_date(date: NaiveDate) -> Self {
        Self {
            now: date.and_hms_opt(12, 0, 0).unwrap_or_default(),
        }
    }
}

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        self.now
    }
}
