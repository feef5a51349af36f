use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "song")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique, column_type = "Text")]
    pub name: String,
    #[sea_orm(column_type = "Text")]
    pub path: String,
    pub plays: i64,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

/// Trimmed copy of `value`, or `None` when nothing but whitespace remains.
pub fn trimmed(value: &str) -> Option<String> {
    let t = value.trim();
    if t.is_empty() { None } else { Some(t.to_string()) }
}

/// Both `name` and `path` must be present and non-blank; returns them trimmed.
pub fn validate_required(name: Option<&str>, path: Option<&str>) -> Result<(String, String), errors::ModelError> {
    match (name.and_then(trimmed), path.and_then(trimmed)) {
        (Some(name), Some(path)) => Ok((name, path)),
        _ => Err(errors::ModelError::Validation("name and path are required".into())),
    }
}

/// Coerce a JSON `plays` value into a stored play count.
///
/// Any non-negative JSON number is accepted; fractions are truncated toward
/// zero. Everything else (negative numbers, strings, booleans, `null`) is
/// rejected.
pub fn parse_plays(value: &Value) -> Result<i64, errors::ModelError> {
    let invalid = || errors::ModelError::Validation("plays must be a number greater than or equal to 0".into());
    let Value::Number(n) = value else { return Err(invalid()) };

    if let Some(i) = n.as_i64() {
        return if i >= 0 { Ok(i) } else { Err(invalid()) };
    }
    if n.is_u64() {
        // above i64::MAX
        return Err(invalid());
    }
    match n.as_f64() {
        Some(f) if f.is_finite() && f >= 0.0 && f < i64::MAX as f64 => Ok(f.trunc() as i64),
        _ => Err(invalid()),
    }
}
