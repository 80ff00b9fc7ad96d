//! Job request domain types

use serde::{Deserialize, Serialize};
use std::fmt;

/// Collection backend identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Backend {
    #[serde(rename = "xhs")]
    Xiaohongshu,
    #[serde(rename = "dy")]
    Douyin,
    #[serde(rename = "ks")]
    Kuaishou,
    #[serde(rename = "bili")]
    Bilibili,
    #[serde(rename = "wb")]
    Weibo,
    #[serde(rename = "tieba")]
    Tieba,
    #[serde(rename = "zhihu")]
    Zhihu,
}

impl Backend {
    pub const ALL: [Backend; 7] = [
        Backend::Xiaohongshu,
        Backend::Douyin,
        Backend::Kuaishou,
        Backend::Bilibili,
        Backend::Weibo,
        Backend::Tieba,
        Backend::Zhihu,
    ];

    /// Wire code of the backend (e.g. "xhs")
    pub fn code(&self) -> &'static str {
        match self {
            Backend::Xiaohongshu => "xhs",
            Backend::Douyin => "dy",
            Backend::Kuaishou => "ks",
            Backend::Bilibili => "bili",
            Backend::Weibo => "wb",
            Backend::Tieba => "tieba",
            Backend::Zhihu => "zhihu",
        }
    }

    /// Parses a wire code, case-insensitively
    pub fn from_code(code: &str) -> Option<Backend> {
        let code = code.trim().to_lowercase();
        Backend::ALL.into_iter().find(|b| b.code() == code)
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// What a job collects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CollectionMode {
    /// Keyword search
    Search,
    /// Details of specific posts, addressed by `note_ids`
    #[serde(alias = "detail-lookup")]
    Detail,
    /// Creator profile pages
    #[serde(alias = "profile-lookup")]
    Creator,
}

impl CollectionMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            CollectionMode::Search => "search",
            CollectionMode::Detail => "detail",
            CollectionMode::Creator => "creator",
        }
    }
}

impl fmt::Display for CollectionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How the collector authenticates against the backend
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoginType {
    #[default]
    Qrcode,
    Phone,
    /// Explicit credentials supplied in `cookies`
    Cookie,
}

/// Where collected data ends up
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SaveDataOption {
    #[serde(rename = "csv")]
    Csv,
    #[default]
    #[serde(rename = "json")]
    Json,
    #[serde(rename = "sqlite")]
    Sqlite,
    /// MySQL
    #[serde(rename = "db")]
    Database,
    #[serde(rename = "mongodb")]
    MongoDb,
}

impl SaveDataOption {
    /// Whether this mode holds a store connection that must be closed after a job.
    ///
    /// MongoDB manages its own connections and is not included.
    pub fn requires_connection(&self) -> bool {
        matches!(self, SaveDataOption::Sqlite | SaveDataOption::Database)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SaveDataOption::Csv => "csv",
            SaveDataOption::Json => "json",
            SaveDataOption::Sqlite => "sqlite",
            SaveDataOption::Database => "db",
            SaveDataOption::MongoDb => "mongodb",
        }
    }

    pub fn parse(value: &str) -> Option<SaveDataOption> {
        match value.trim().to_lowercase().as_str() {
            "csv" => Some(SaveDataOption::Csv),
            "json" => Some(SaveDataOption::Json),
            "sqlite" => Some(SaveDataOption::Sqlite),
            "db" | "mysql" => Some(SaveDataOption::Database),
            "mongodb" => Some(SaveDataOption::MongoDb),
            _ => None,
        }
    }
}

impl fmt::Display for SaveDataOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Request to run a collection job
///
/// Admission rules live in [`crate::validation::validate`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobRequest {
    #[serde(alias = "platform")]
    pub backend: Backend,
    #[serde(alias = "crawler_type")]
    pub mode: CollectionMode,
    /// Comma separated search keywords
    #[serde(default)]
    pub keywords: Option<String>,
    /// Target post identifiers (plain ids or full URLs)
    #[serde(default)]
    pub note_ids: Option<Vec<String>>,
    #[serde(default)]
    pub login_type: LoginType,
    #[serde(default = "default_start_page")]
    pub start_page: u32,
    #[serde(default = "default_max_notes_count")]
    pub max_notes_count: u32,
    #[serde(default = "default_true")]
    pub enable_comments: bool,
    #[serde(default)]
    pub enable_sub_comments: bool,
    #[serde(default)]
    pub save_data_option: SaveDataOption,
    /// Credential payload; accepted on input, never serialized back out
    #[serde(default, skip_serializing)]
    pub cookies: Option<String>,
}

pub const MAX_NOTES_COUNT_LIMIT: u32 = 100;

fn default_start_page() -> u32 {
    1
}

fn default_max_notes_count() -> u32 {
    15
}

fn default_true() -> bool {
    true
}

impl JobRequest {
    /// Creates a request with default options for the given backend and mode
    pub fn new(backend: Backend, mode: CollectionMode) -> Self {
        Self {
            backend,
            mode,
            keywords: None,
            note_ids: None,
            login_type: LoginType::default(),
            start_page: default_start_page(),
            max_notes_count: default_max_notes_count(),
            enable_comments: true,
            enable_sub_comments: false,
            save_data_option: SaveDataOption::default(),
            cookies: None,
        }
    }

    /// Split `keywords` into trimmed, non-empty entries
    pub fn keyword_list(&self) -> Vec<String> {
        self.keywords
            .as_deref()
            .unwrap_or_default()
            .split([',', '，'])
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .map(str::to_string)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_applies_defaults() {
        let req: JobRequest = serde_json::from_str(
            r#"{"backend": "xhs", "mode": "search", "keywords": "rust"}"#,
        )
        .unwrap();

        assert_eq!(req.backend, Backend::Xiaohongshu);
        assert_eq!(req.mode, CollectionMode::Search);
        assert_eq!(req.login_type, LoginType::Qrcode);
        assert_eq!(req.start_page, 1);
        assert_eq!(req.max_notes_count, 15);
        assert!(req.enable_comments);
        assert!(!req.enable_sub_comments);
        assert_eq!(req.save_data_option, SaveDataOption::Json);
    }

    #[test]
    fn test_deserialize_accepts_legacy_field_names() {
        let req: JobRequest = serde_json::from_str(
            r#"{"platform": "bili", "crawler_type": "detail-lookup", "note_ids": ["BV1xx"]}"#,
        )
        .unwrap();

        assert_eq!(req.backend, Backend::Bilibili);
        assert_eq!(req.mode, CollectionMode::Detail);
    }

    #[test]
    fn test_cookies_not_serialized() {
        let mut req = JobRequest::new(Backend::Weibo, CollectionMode::Creator);
        req.login_type = LoginType::Cookie;
        req.cookies = Some("session=secret".to_string());

        let json = serde_json::to_string(&req).unwrap();
        assert!(!json.contains("secret"));
        assert!(!json.contains("cookies"));
    }

    #[test]
    fn test_unknown_backend_rejected() {
        let result = serde_json::from_str::<JobRequest>(r#"{"backend": "myspace", "mode": "search"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_requires_connection() {
        assert!(SaveDataOption::Sqlite.requires_connection());
        assert!(SaveDataOption::Database.requires_connection());
        assert!(!SaveDataOption::Json.requires_connection());
        assert!(!SaveDataOption::Csv.requires_connection());
        assert!(!SaveDataOption::MongoDb.requires_connection());
    }

    #[test]
    fn test_keyword_list() {
        let mut req = JobRequest::new(Backend::Zhihu, CollectionMode::Search);
        req.keywords = Some("rust, tokio,,  axum ".to_string());
        assert_eq!(req.keyword_list(), vec!["rust", "tokio", "axum"]);
    }

    #[test]
    fn test_backend_from_code() {
        assert_eq!(Backend::from_code("DY"), Some(Backend::Douyin));
        assert_eq!(Backend::from_code("unknown"), None);
        assert_eq!(Backend::Tieba.to_string(), "tieba");
    }
}
