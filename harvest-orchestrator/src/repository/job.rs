//! Job Registry
//!
//! In-memory store of job records, the single source of truth for status
//! queries. Every mutation happens under one write lock, so readers only
//! ever observe complete records.

use harvest_core::domain::job::{JobRecord, JobStatus};
use std::collections::{HashMap, VecDeque};
use std::sync::{PoisonError, RwLock};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("Job {0} not found")]
    NotFound(String),
    #[error("Job {0} already exists")]
    Duplicate(String),
    #[error("Job {id} cannot move from {from} to {to}")]
    InvalidTransition {
        id: String,
        from: JobStatus,
        to: JobStatus,
    },
}

/// Registry of job records, kept in insertion order
///
/// Once more than `max_retained` records are held, the oldest terminal
/// records are evicted. Pending and running records are never evicted, and
/// neither is a record in the same update that finished it.
pub struct JobRegistry {
    inner: RwLock<RegistryInner>,
    max_retained: usize,
}

#[derive(Default)]
struct RegistryInner {
    records: HashMap<String, JobRecord>,
    order: VecDeque<String>,
}

impl JobRegistry {
    pub fn new(max_retained: usize) -> Self {
        Self {
            inner: RwLock::new(RegistryInner::default()),
            max_retained,
        }
    }

    /// Insert a new record
    pub fn put(&self, record: JobRecord) -> Result<(), RegistryError> {
        let mut inner = self.inner.write().unwrap_or_else(PoisonError::into_inner);

        if inner.records.contains_key(&record.id) {
            return Err(RegistryError::Duplicate(record.id));
        }

        inner.order.push_back(record.id.clone());
        inner.records.insert(record.id.clone(), record);
        inner.evict_terminal(self.max_retained, None);

        Ok(())
    }

    /// Get a snapshot of a record
    pub fn get(&self, id: &str) -> Option<JobRecord> {
        let inner = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        inner.records.get(id).cloned()
    }

    /// Snapshot of all records in insertion order
    pub fn list(&self) -> Vec<JobRecord> {
        let inner = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        inner
            .order
            .iter()
            .filter_map(|id| inner.records.get(id).cloned())
            .collect()
    }

    /// Registry size above which finished records are evicted
    pub fn max_retained(&self) -> usize {
        self.max_retained
    }

    pub fn len(&self) -> usize {
        let inner = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        inner.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Apply `mutator` to a record atomically
    ///
    /// The mutator works on a copy; the copy only replaces the stored record
    /// if its status is unchanged or a legal forward transition.
    pub fn update<F>(&self, id: &str, mutator: F) -> Result<JobRecord, RegistryError>
    where
        F: FnOnce(&mut JobRecord),
    {
        let mut inner = self.inner.write().unwrap_or_else(PoisonError::into_inner);

        let current = inner
            .records
            .get(id)
            .ok_or_else(|| RegistryError::NotFound(id.to_string()))?;

        let mut updated = current.clone();
        mutator(&mut updated);

        let from = current.status;
        let to = updated.status;
        if from != to && !from.can_transition_to(to) {
            return Err(RegistryError::InvalidTransition {
                id: id.to_string(),
                from,
                to,
            });
        }
        if from == to && from.is_terminal() && updated != *current {
            return Err(RegistryError::InvalidTransition {
                id: id.to_string(),
                from,
                to,
            });
        }

        inner.records.insert(id.to_string(), updated.clone());
        if to.is_terminal() {
            inner.evict_terminal(self.max_retained, Some(id));
        }

        Ok(updated)
    }
}

impl RegistryInner {
    fn evict_terminal(&mut self, max_retained: usize, keep: Option<&str>) {
        while self.records.len() > max_retained {
            let position = self.order.iter().position(|id| {
                Some(id.as_str()) != keep
                    && self
                        .records
                        .get(id)
                        .is_some_and(|record| record.status.is_terminal())
            });

            let Some(position) = position else {
                break;
            };

            if let Some(id) = self.order.remove(position) {
                tracing::debug!("Evicting job {} from registry", id);
                self.records.remove(&id);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use harvest_core::domain::request::{Backend, CollectionMode, JobRequest};

    fn pending(id: &str) -> JobRecord {
        let mut req = JobRequest::new(Backend::Xiaohongshu, CollectionMode::Search);
        req.keywords = Some("rust".to_string());
        JobRecord::pending(id.to_string(), req, Utc::now())
    }

    fn finish(registry: &JobRegistry, id: &str) {
        registry.update(id, |r| r.mark_running(Utc::now())).unwrap();
        registry.update(id, |r| r.mark_completed(Utc::now())).unwrap();
    }

    #[test]
    fn test_put_and_get() {
        let registry = JobRegistry::new(10);
        registry.put(pending("a")).unwrap();

        let record = registry.get("a").unwrap();
        assert_eq!(record.status, JobStatus::Pending);
        assert!(registry.get("b").is_none());
    }

    #[test]
    fn test_put_rejects_duplicate() {
        let registry = JobRegistry::new(10);
        registry.put(pending("a")).unwrap();
        assert_eq!(
            registry.put(pending("a")),
            Err(RegistryError::Duplicate("a".to_string()))
        );
    }

    #[test]
    fn test_list_keeps_insertion_order() {
        let registry = JobRegistry::new(10);
        for id in ["c", "a", "b"] {
            registry.put(pending(id)).unwrap();
        }

        let ids: Vec<_> = registry.list().into_iter().map(|r| r.id).collect();
        assert_eq!(ids, vec!["c", "a", "b"]);
    }

    #[test]
    fn test_update_rejects_backward_transition() {
        let registry = JobRegistry::new(10);
        registry.put(pending("a")).unwrap();
        registry.update("a", |r| r.mark_running(Utc::now())).unwrap();

        let result = registry.update("a", |r| r.status = JobStatus::Pending);
        assert!(matches!(result, Err(RegistryError::InvalidTransition { .. })));
        assert_eq!(registry.get("a").unwrap().status, JobStatus::Running);
    }

    #[test]
    fn test_terminal_record_is_frozen() {
        let registry = JobRegistry::new(10);
        registry.put(pending("a")).unwrap();
        finish(&registry, "a");

        let before = registry.get("a").unwrap();
        assert!(registry.update("a", |r| r.mark_failed("late", Utc::now())).is_err());
        assert!(registry.update("a", |r| r.message = "changed".to_string()).is_err());
        assert_eq!(registry.get("a").unwrap(), before);
    }

    #[test]
    fn test_update_unknown_job() {
        let registry = JobRegistry::new(10);
        assert_eq!(
            registry.update("missing", |_| {}).unwrap_err(),
            RegistryError::NotFound("missing".to_string())
        );
    }

    #[test]
    fn test_evicts_oldest_terminal_records() {
        let registry = JobRegistry::new(2);
        registry.put(pending("a")).unwrap();
        registry.put(pending("b")).unwrap();
        finish(&registry, "b");

        registry.put(pending("c")).unwrap();

        assert_eq!(registry.len(), 2);
        assert!(registry.get("a").is_some());
        assert!(registry.get("b").is_none());
        assert!(registry.get("c").is_some());
    }

    #[test]
    fn test_never_evicts_active_records() {
        let registry = JobRegistry::new(1);
        registry.put(pending("a")).unwrap();
        registry.put(pending("b")).unwrap();

        assert_eq!(registry.len(), 2);

        finish(&registry, "b");
        assert!(registry.get("a").is_some());
    }

    #[test]
    fn test_just_finished_record_survives_eviction() {
        let registry = JobRegistry::new(1);
        registry.put(pending("a")).unwrap();
        registry.put(pending("b")).unwrap();

        finish(&registry, "b");
        assert_eq!(registry.len(), 2);
        assert!(registry.get("b").is_some_and(|r| r.status.is_terminal()));

        finish(&registry, "a");
        assert_eq!(registry.len(), 1);
        assert!(registry.get("a").is_some());
        assert!(registry.get("b").is_none());
    }

    #[test]
    fn test_max_retained() {
        assert_eq!(JobRegistry::new(7).max_retained(), 7);
    }
}
