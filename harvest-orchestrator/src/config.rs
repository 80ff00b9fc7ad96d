//! Orchestrator configuration
//!
//! Defines the bind address, job deadlines, registry retention, store
//! connection strings and collector endpoints.

use anyhow::Context;
use harvest_core::domain::request::{Backend, SaveDataOption};
use std::collections::HashMap;
use std::time::Duration;

use crate::service::OrchestratorSettings;

/// Orchestrator configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Address the HTTP server listens on
    pub bind_addr: String,

    /// Maximum time a single collector run may take
    pub job_timeout: Duration,

    /// Registry size above which the oldest finished jobs are evicted
    pub max_retained_jobs: usize,

    /// Persistence mode assumed before any job has run
    pub default_save_option: SaveDataOption,

    /// SQLite connection string used by store initialization
    pub sqlite_url: String,

    /// MySQL connection string; MySQL initialization fails when unset
    pub mysql_url: Option<String>,

    /// Collector worker endpoint per backend
    pub collector_urls: HashMap<Backend, String>,

    /// Connect timeout for collector worker requests
    pub collector_connect_timeout: Duration,
}

impl Config {
    /// Creates configuration from environment variables
    ///
    /// Expected environment variables (all optional):
    /// - HARVEST_BIND_ADDR (default: 0.0.0.0:8080)
    /// - JOB_TIMEOUT_SECS (default: 1800)
    /// - MAX_RETAINED_JOBS (default: 1000)
    /// - DEFAULT_SAVE_OPTION (default: json)
    /// - SQLITE_DATABASE_URL (default: sqlite://harvest.db?mode=rwc)
    /// - MYSQL_DATABASE_URL
    /// - COLLECTOR_URL_<CODE>, e.g. COLLECTOR_URL_XHS
    /// - COLLECTOR_CONNECT_TIMEOUT_SECS (default: 10)
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds configuration from an arbitrary variable source
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let lookup = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let bind_addr = lookup("HARVEST_BIND_ADDR").unwrap_or(defaults.bind_addr);

        let job_timeout = match lookup("JOB_TIMEOUT_SECS") {
            Some(v) => Duration::from_secs(
                v.trim()
                    .parse::<u64>()
                    .with_context(|| format!("invalid JOB_TIMEOUT_SECS '{}'", v))?,
            ),
            None => defaults.job_timeout,
        };

        let max_retained_jobs = match lookup("MAX_RETAINED_JOBS") {
            Some(v) => v
                .trim()
                .parse::<usize>()
                .with_context(|| format!("invalid MAX_RETAINED_JOBS '{}'", v))?,
            None => defaults.max_retained_jobs,
        };

        let default_save_option = match lookup("DEFAULT_SAVE_OPTION") {
            Some(v) => SaveDataOption::parse(&v)
                .ok_or_else(|| anyhow::anyhow!("invalid DEFAULT_SAVE_OPTION '{}'", v))?,
            None => defaults.default_save_option,
        };

        let sqlite_url = lookup("SQLITE_DATABASE_URL").unwrap_or(defaults.sqlite_url);
        let mysql_url = lookup("MYSQL_DATABASE_URL");

        let collector_urls = Backend::ALL
            .into_iter()
            .filter_map(|backend| {
                let key = format!("COLLECTOR_URL_{}", backend.code().to_uppercase());
                lookup(&key).map(|url| (backend, url))
            })
            .collect();

        let collector_connect_timeout = match lookup("COLLECTOR_CONNECT_TIMEOUT_SECS") {
            Some(v) => Duration::from_secs(
                v.trim()
                    .parse::<u64>()
                    .with_context(|| format!("invalid COLLECTOR_CONNECT_TIMEOUT_SECS '{}'", v))?,
            ),
            None => defaults.collector_connect_timeout,
        };

        Ok(Self {
            bind_addr,
            job_timeout,
            max_retained_jobs,
            default_save_option,
            sqlite_url,
            mysql_url,
            collector_urls,
            collector_connect_timeout,
        })
    }

    /// Validates the configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.bind_addr.is_empty() {
            anyhow::bail!("bind_addr cannot be empty");
        }

        if self.job_timeout.as_secs() == 0 {
            anyhow::bail!("job_timeout must be greater than 0");
        }

        if self.max_retained_jobs == 0 {
            anyhow::bail!("max_retained_jobs must be greater than 0");
        }

        if !self.sqlite_url.starts_with("sqlite:") {
            anyhow::bail!("sqlite_url must start with sqlite:");
        }

        if let Some(url) = &self.mysql_url {
            if !url.starts_with("mysql://") {
                anyhow::bail!("mysql_url must start with mysql://");
            }
        }

        for (backend, url) in &self.collector_urls {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                anyhow::bail!(
                    "collector url for {} must start with http:// or https://",
                    backend
                );
            }
        }

        Ok(())
    }

    /// Settings handed to the job orchestrator
    pub fn orchestrator_settings(&self) -> OrchestratorSettings {
        OrchestratorSettings {
            job_timeout: self.job_timeout,
            default_save_option: self.default_save_option,
            ..OrchestratorSettings::default()
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:8080".to_string(),
            job_timeout: Duration::from_secs(1800),
            max_retained_jobs: 1000,
            default_save_option: SaveDataOption::Json,
            sqlite_url: "sqlite://harvest.db?mode=rwc".to_string(),
            mysql_url: None,
            collector_urls: HashMap::new(),
            collector_connect_timeout: Duration::from_secs(10),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lookup_from(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.bind_addr, "0.0.0.0:8080");
        assert_eq!(config.job_timeout, Duration::from_secs(1800));
        assert_eq!(config.max_retained_jobs, 1000);
        assert_eq!(config.default_save_option, SaveDataOption::Json);
        assert!(config.collector_urls.is_empty());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_environment_uses_defaults() {
        let config = Config::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config.bind_addr, "0.0.0.0:8080");
        assert_eq!(config.collector_connect_timeout, Duration::from_secs(10));
        assert!(config.mysql_url.is_none());
    }

    #[test]
    fn test_reads_variables() {
        let config = Config::from_lookup(lookup_from(&[
            ("HARVEST_BIND_ADDR", "127.0.0.1:9000"),
            ("JOB_TIMEOUT_SECS", "60"),
            ("MAX_RETAINED_JOBS", "5"),
            ("DEFAULT_SAVE_OPTION", "sqlite"),
            ("MYSQL_DATABASE_URL", "mysql://root@localhost/harvest"),
            ("COLLECTOR_URL_XHS", "http://collector:9001/run"),
            ("COLLECTOR_URL_BILI", "http://collector:9002/run"),
        ]))
        .unwrap();

        assert_eq!(config.bind_addr, "127.0.0.1:9000");
        assert_eq!(config.job_timeout, Duration::from_secs(60));
        assert_eq!(config.max_retained_jobs, 5);
        assert_eq!(config.default_save_option, SaveDataOption::Sqlite);
        assert_eq!(
            config.mysql_url.as_deref(),
            Some("mysql://root@localhost/harvest")
        );
        assert_eq!(config.collector_urls.len(), 2);
        assert_eq!(
            config.collector_urls.get(&Backend::Xiaohongshu).map(String::as_str),
            Some("http://collector:9001/run")
        );

        let settings = config.orchestrator_settings();
        assert_eq!(settings.job_timeout, Duration::from_secs(60));
        assert_eq!(settings.default_save_option, SaveDataOption::Sqlite);
    }

    #[test]
    fn test_rejects_malformed_numbers() {
        assert!(Config::from_lookup(lookup_from(&[("JOB_TIMEOUT_SECS", "soon")])).is_err());
        assert!(Config::from_lookup(lookup_from(&[("MAX_RETAINED_JOBS", "-1")])).is_err());
        assert!(Config::from_lookup(lookup_from(&[("DEFAULT_SAVE_OPTION", "xml")])).is_err());
    }

    #[test]
    fn test_config_validation() {
        let mut config = Config::default();
        assert!(config.validate().is_ok());

        config.max_retained_jobs = 0;
        assert!(config.validate().is_err());
        config.max_retained_jobs = 10;

        config.job_timeout = Duration::ZERO;
        assert!(config.validate().is_err());
        config.job_timeout = Duration::from_secs(5);

        config
            .collector_urls
            .insert(Backend::Douyin, "collector:9000".to_string());
        assert!(config.validate().is_err());

        config
            .collector_urls
            .insert(Backend::Douyin, "http://collector:9000".to_string());
        assert!(config.validate().is_ok());

        config.mysql_url = Some("postgres://nope".to_string());
        assert!(config.validate().is_err());
    }
}
