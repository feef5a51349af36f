use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DatabaseStatus {
    Connected,
    Disconnected,
}

/// Body of `GET /api/health`.
#[derive(Serialize, Deserialize, Debug)]
pub struct Health {
    pub success: bool,
    pub message: String,
    pub timestamp: String,
    pub database: DatabaseStatus,
}

impl Health {
    pub fn new(timestamp: String, connected: bool) -> Self {
        Self {
            success: true,
            message: "service running".into(),
            timestamp,
            database: if connected { DatabaseStatus::Connected } else { DatabaseStatus::Disconnected },
        }
    }
}
