use serde::{Deserialize, Serialize};

/// Which tools are offered to the model
///
/// Every tool starts disabled until the operator turns it on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolSettings {
    pub enable_web_search: bool,
    pub enable_feeds: bool,
    #[serde(alias = "enable_sentinel")]
    pub enable_portfolio: bool,
}
