//! Shared building blocks for the songs workspace: logging setup and
//! response types used by more than one crate.

pub mod types;
pub mod utils;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn health_serializes_database_status() {
        let h = types::Health::new("2024-01-01T00:00:00Z".into(), true);
        let v = serde_json::to_value(&h).unwrap();
        assert_eq!(v["success"], true);
        assert_eq!(v["database"], "connected");

        let h = types::Health::new("2024-01-01T00:00:00Z".into(), false);
        assert_eq!(h.database, types::DatabaseStatus::Disconnected);
    }
}
