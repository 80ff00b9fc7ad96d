//! Store DTOs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Store engine whose schema can be initialized
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreKind {
    Sqlite,
    Mysql,
}

impl StoreKind {
    pub fn parse(value: &str) -> Option<StoreKind> {
        match value.trim().to_lowercase().as_str() {
            "sqlite" => Some(StoreKind::Sqlite),
            "mysql" => Some(StoreKind::Mysql),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            StoreKind::Sqlite => "sqlite",
            StoreKind::Mysql => "mysql",
        }
    }
}

impl std::fmt::Display for StoreKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Request to initialize the store schema
///
/// `kind` stays a plain string so unsupported values can be reported as a
/// validation failure rather than a body parse error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InitStoreRequest {
    #[serde(alias = "db_type")]
    pub kind: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InitStoreResponse {
    pub status: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}
