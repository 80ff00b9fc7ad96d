//! Backend DTOs

use serde::{Deserialize, Serialize};

use crate::domain::backend::BackendInfo;

/// Catalogue of supported backends
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendList {
    pub backends: Vec<BackendInfo>,
}
