// ==========================================
// 膳食规划系统 - 行映射工具
// ==========================================
// 职责: 各仓储共用的列值解析（枚举列、布尔列）
// ==========================================

use crate::domain::types::MealType;
use crate::repository::error::RepositoryError;
use rusqlite::types::Type;
use rusqlite::Row;

/// 读取餐别列
///
/// 非法取值转换为 FromSqlConversionFailure，不做静默兜底
pub fn meal_type_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<MealType> {
    let raw: String = row.get(idx)?;
    MealType::from_str(&raw).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            idx,
            Type::Text,
            Box::new(RepositoryError::FieldValueError {
                field: "meal_type".to_string(),
                message: format!("未知餐别: {}", raw),
            }),
        )
    })
}

/// 读取 0/1 布尔列
pub fn bool_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<bool> {
    Ok(row.get::<_, i64>(idx)? != 0)
}
