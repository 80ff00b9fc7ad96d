//! Job request validation
//!
//! Admission rules checked once, before a job is registered. The first
//! violated rule is reported; errors are not aggregated.

use thiserror::Error;

use crate::domain::request::{CollectionMode, JobRequest, LoginType, MAX_NOTES_COUNT_LIMIT};

/// A rejected job request
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{reason}")]
pub struct ValidationError {
    pub reason: String,
}

impl ValidationError {
    fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

pub fn validate(req: &JobRequest) -> Result<(), ValidationError> {
    match req.mode {
        CollectionMode::Search => {
            if req.keyword_list().is_empty() {
                return Err(ValidationError::new(
                    "Search mode requires a non-empty 'keywords' value",
                ));
            }
        }
        CollectionMode::Detail => {
            let has_targets = req.note_ids.as_ref().is_some_and(|ids| !ids.is_empty());
            if !has_targets {
                return Err(ValidationError::new(
                    "Detail mode requires a non-empty 'note_ids' list of target identifiers",
                ));
            }
        }
        CollectionMode::Creator => {}
    }

    if req.login_type == LoginType::Cookie {
        let has_cookies = req.cookies.as_deref().is_some_and(|c| !c.trim().is_empty());
        if !has_cookies {
            return Err(ValidationError::new(
                "Cookie login requires a 'cookies' credential payload",
            ));
        }
    }

    if req.start_page < 1 {
        return Err(ValidationError::new("'start_page' must be at least 1"));
    }

    if req.max_notes_count < 1 || req.max_notes_count > MAX_NOTES_COUNT_LIMIT {
        return Err(ValidationError::new(format!(
            "'max_notes_count' must be between 1 and {}",
            MAX_NOTES_COUNT_LIMIT
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::request::Backend;

    fn search(keywords: Option<&str>) -> JobRequest {
        let mut req = JobRequest::new(Backend::Xiaohongshu, CollectionMode::Search);
        req.keywords = keywords.map(str::to_string);
        req
    }

    #[test]
    fn test_search_requires_keywords() {
        assert!(validate(&search(None)).is_err());
        assert!(validate(&search(Some(""))).is_err());
        assert!(validate(&search(Some("   "))).is_err());
        assert!(validate(&search(Some("rust"))).is_ok());
    }

    #[test]
    fn test_search_rejects_separator_only_keywords() {
        let err = validate(&search(Some(",,,"))).unwrap_err();
        assert!(err.reason.contains("keywords"));
        assert!(validate(&search(Some(" , ，"))).is_err());
        assert!(validate(&search(Some(",rust,"))).is_ok());
    }

    #[test]
    fn test_detail_requires_note_ids() {
        let mut req = JobRequest::new(Backend::Douyin, CollectionMode::Detail);
        let err = validate(&req).unwrap_err();
        assert!(err.reason.contains("note_ids"));

        req.note_ids = Some(vec![]);
        let err = validate(&req).unwrap_err();
        assert!(err.reason.contains("target identifiers"));

        req.note_ids = Some(vec!["7300000000000000000".to_string()]);
        assert!(validate(&req).is_ok());
    }

    #[test]
    fn test_creator_needs_no_keywords() {
        let req = JobRequest::new(Backend::Bilibili, CollectionMode::Creator);
        assert!(validate(&req).is_ok());
    }

    #[test]
    fn test_cookie_login_requires_cookies() {
        let mut req = search(Some("rust"));
        req.login_type = LoginType::Cookie;
        let err = validate(&req).unwrap_err();
        assert!(err.reason.contains("cookies"));

        req.cookies = Some("a1=xyz".to_string());
        assert!(validate(&req).is_ok());
    }

    #[test]
    fn test_first_violation_wins() {
        let mut req = search(None);
        req.login_type = LoginType::Cookie;
        req.max_notes_count = 0;

        let err = validate(&req).unwrap_err();
        assert!(err.reason.contains("keywords"));
    }

    #[test]
    fn test_bounds() {
        let mut req = search(Some("rust"));
        req.max_notes_count = 101;
        assert!(validate(&req).is_err());

        req.max_notes_count = 100;
        assert!(validate(&req).is_ok());

        req.start_page = 0;
        assert!(validate(&req).is_err());
    }
}
