// ==========================================
// 国际化 (i18n) 模块
// ==========================================
// 使用 rust-i18n 库
// 支持英文（默认）和中文
// ==========================================
// 注意: rust_i18n::i18n! 宏已在 lib.rs 中初始化
// ==========================================

/// 获取当前语言
pub fn current_locale() -> String {
    rust_i18n::locale().to_string()
}

/// 设置语言
///
/// # 参数
/// - locale: 语言代码（"en" 或 "zh-CN"）
pub fn set_locale(locale: &str) {
    rust_i18n::set_locale(locale);
}

/// 翻译消息（无参数）
///
/// # 示例
/// ```no_run
/// use mealzy::i18n::t;
/// let msg = t("home.greeting_morning");
/// ```
pub fn t(key: &str) -> String {
    rust_i18n::t!(key).to_string()
}

/// 翻译消息（带参数）
///
/// # 示例
/// ```no_run
/// use mealzy::i18n::t_with_args;
/// let msg = t_with_args("common.not_found", &[("entity", "Recipe"), ("id", "7")]);
/// ```
pub fn t_with_args(key: &str, args: &[(&str, &str)]) -> String {
    let mut result = rust_i18n::t!(key).to_string();
    for (k, v) in args {
        let placeholder = format!("%{{{}}}", k);
        result = result.replace(&placeholder, v);
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::home_summary::Greeting;
    use crate::engine::week_calendar::week_range_text;
    use chrono::NaiveDate;
    use std::sync::Mutex;

    // rust-i18n 的 locale 为全局状态，且 Rust 测试默认并行执行；
    // 为避免测试互相干扰，这里对 i18n 相关测试串行化。
    static LOCALE_TEST_LOCK: Mutex<()> = Mutex::new(());

    #[test]
    fn test_set_locale() {
        let _guard = LOCALE_TEST_LOCK.lock().unwrap();
        set_locale("zh-CN");
        assert_eq!(current_locale(), "zh-CN");

        set_locale("en");
        assert_eq!(current_locale(), "en");
    }

    #[test]
    fn test_translate_simple() {
        let _guard = LOCALE_TEST_LOCK.lock().unwrap();
        set_locale("en");
        assert_eq!(t("common.success"), "Operation successful");
        assert_eq!(Greeting::Morning.message(), "Good Morning!");

        set_locale("zh-CN");
        assert_eq!(t("common.success"), "操作成功");
        assert_eq!(Greeting::Evening.message(), "晚上好！");

        set_locale("en");
    }

    #[test]
    fn test_translate_with_args() {
        let _guard = LOCALE_TEST_LOCK.lock().unwrap();
        set_locale("en");
        let msg = t_with_args("common.not_found", &[("entity", "Recipe"), ("id", "7")]);
        assert_eq!(msg, "Recipe not found: 7");
    }

    #[test]
    fn test_week_range_text() {
        let _guard = LOCALE_TEST_LOCK.lock().unwrap();
        set_locale("en");
        let same_month = NaiveDate::from_ymd_opt(2024, 1, 7).unwrap();
        assert_eq!(week_range_text(same_month).as_deref(), Some("Week of Jan 7 - 13, 2024"));

        let cross_month = NaiveDate::from_ymd_opt(2024, 1, 28).unwrap();
        assert_eq!(week_range_text(cross_month).as_deref(), Some("Week of Jan 28 - Feb 3, 2024"));

        let cross_year = NaiveDate::from_ymd_opt(2023, 12, 31).unwrap();
        assert_eq!(week_range_text(cross_year).as_deref(), Some("Week of Dec 31 - Jan 6, 2024"));

        set_locale("zh-CN");
        assert_eq!(week_range_text(same_month).as_deref(), Some("2024年1月7日 - 13日"));
        set_locale("en");
    }
}
