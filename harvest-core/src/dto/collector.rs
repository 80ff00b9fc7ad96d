//! Collector configuration
//!
//! The per-job configuration a collector receives. It is built from the
//! admitted request and handed to the collector explicitly, so two jobs
//! never share configuration state.

use serde::{Deserialize, Serialize};

use crate::domain::request::{Backend, CollectionMode, JobRequest, LoginType, SaveDataOption};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectorConfig {
    pub job_id: String,
    pub backend: Backend,
    pub mode: CollectionMode,
    pub keywords: Vec<String>,
    /// Target post identifiers, only populated in detail mode
    pub note_ids: Vec<String>,
    pub login_type: LoginType,
    pub start_page: u32,
    pub max_notes_count: u32,
    pub enable_comments: bool,
    pub enable_sub_comments: bool,
    pub save_data_option: SaveDataOption,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cookies: Option<String>,
}

impl CollectorConfig {
    pub fn from_request(job_id: &str, request: &JobRequest) -> Self {
        let note_ids = match request.mode {
            CollectionMode::Detail => request.note_ids.clone().unwrap_or_default(),
            _ => Vec::new(),
        };

        Self {
            job_id: job_id.to_string(),
            backend: request.backend,
            mode: request.mode,
            keywords: request.keyword_list(),
            note_ids,
            login_type: request.login_type,
            start_page: request.start_page,
            max_notes_count: request.max_notes_count,
            enable_comments: request.enable_comments,
            enable_sub_comments: request.enable_sub_comments,
            save_data_option: request.save_data_option,
            cookies: request.cookies.clone(),
        }
    }

    /// Copy without credentials, safe to expose for diagnostics
    pub fn redacted(&self) -> Self {
        Self {
            cookies: None,
            ..self.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_note_ids_only_forwarded_in_detail_mode() {
        let mut req = JobRequest::new(Backend::Kuaishou, CollectionMode::Search);
        req.keywords = Some("cats".to_string());
        req.note_ids = Some(vec!["abc".to_string()]);

        let config = CollectorConfig::from_request("job_1", &req);
        assert!(config.note_ids.is_empty());
        assert_eq!(config.keywords, vec!["cats"]);

        req.mode = CollectionMode::Detail;
        let config = CollectorConfig::from_request("job_1", &req);
        assert_eq!(config.note_ids, vec!["abc"]);
    }

    #[test]
    fn test_redacted_drops_cookies() {
        let mut req = JobRequest::new(Backend::Weibo, CollectionMode::Creator);
        req.login_type = LoginType::Cookie;
        req.cookies = Some("sid=1".to_string());

        let config = CollectorConfig::from_request("job_2", &req);
        assert_eq!(config.cookies.as_deref(), Some("sid=1"));
        assert!(config.redacted().cookies.is_none());
    }
}
