//! Backend catalogue
//!
//! Static description of the collection backends and what they support.

use serde::{Deserialize, Serialize};

use crate::domain::request::{Backend, CollectionMode};

/// Descriptive entry for one backend
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendInfo {
    pub code: Backend,
    pub name: String,
    pub modes: Vec<CollectionMode>,
}

impl Backend {
    /// Human-readable backend name
    pub fn display_name(&self) -> &'static str {
        match self {
            Backend::Xiaohongshu => "Xiaohongshu",
            Backend::Douyin => "Douyin",
            Backend::Kuaishou => "Kuaishou",
            Backend::Bilibili => "Bilibili",
            Backend::Weibo => "Weibo",
            Backend::Tieba => "Baidu Tieba",
            Backend::Zhihu => "Zhihu",
        }
    }

    /// Collection modes the backend supports
    pub fn supported_modes(&self) -> Vec<CollectionMode> {
        vec![
            CollectionMode::Search,
            CollectionMode::Detail,
            CollectionMode::Creator,
        ]
    }

    pub fn info(&self) -> BackendInfo {
        BackendInfo {
            code: *self,
            name: self.display_name().to_string(),
            modes: self.supported_modes(),
        }
    }
}

/// Catalogue of every supported backend, in declaration order
pub fn catalogue() -> Vec<BackendInfo> {
    Backend::ALL.iter().map(Backend::info).collect()
}
