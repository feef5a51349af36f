use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use uuid::Uuid;

pub use models::song::Model as Song;

/// Request payload shared by create, replace and patch.
///
/// Absent fields stay `None`. For `plays` an explicit `null` is kept as
/// `Some(Value::Null)` so it can be rejected instead of read as "omitted".
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SongInput {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default, deserialize_with = "present")]
    pub plays: Option<Value>,
}

fn present<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

/// Validated row for insertion; the repository assigns the id.
#[derive(Debug, Clone)]
pub struct NewSong {
    pub name: String,
    pub path: String,
    pub plays: i64,
    pub created_at: DateTime<FixedOffset>,
    pub updated_at: DateTime<FixedOffset>,
}

/// Column changes for an update; `None` leaves the column untouched.
#[derive(Debug, Clone)]
pub struct SongChanges {
    pub name: Option<String>,
    pub path: Option<String>,
    pub plays: Option<i64>,
    pub updated_at: DateTime<FixedOffset>,
}

/// Result of a delete: the song as it was before removal.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeletedSong {
    pub deleted_song: Song,
    pub deleted_count: u64,
}

pub(crate) fn parse_id(raw: &str) -> Option<Uuid> {
    Uuid::parse_str(raw).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn input_distinguishes_null_plays_from_missing() {
        let missing: SongInput = serde_json::from_value(json!({"name": "a"})).unwrap();
        assert!(missing.plays.is_none());

        let null: SongInput = serde_json::from_value(json!({"name": "a", "plays": null})).unwrap();
        assert_eq!(null.plays, Some(Value::Null));
    }

    #[test]
    fn input_ignores_unknown_fields() {
        let input: SongInput = serde_json::from_value(json!({"path": "/x.mp3", "genre": "jazz"})).unwrap();
        assert_eq!(input.path.as_deref(), Some("/x.mp3"));
        assert!(input.name.is_none());
    }

    #[test]
    fn ids_must_be_uuids() {
        assert!(parse_id("not-an-id").is_none());
        assert!(parse_id("507f1f77bcf86cd799439011").is_none());
        assert!(parse_id(&Uuid::new_v4().to_string()).is_some());
    }
}
