use serde::Serialize;

/// Model advertised by the inference backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModelInfo {
    pub name: String,
    pub digest: String,
}
