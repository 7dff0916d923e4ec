use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Stable schema identifiers for cspkit receipts.
pub const SCHEMA_COMPARE_V1: &str = "cspkit.compare.v1";
pub const SCHEMA_MATCH_V1: &str = "cspkit.match.v1";
pub const SCHEMA_GENERATE_V1: &str = "cspkit.generate.v1";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ToolMeta {
    pub name: String,
    pub version: String,
}

impl ToolMeta {
    pub fn current() -> Self {
        Self {
            name: "cspkit".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

/// Result of comparing two policies as sets of basic policies.
///
/// Every entry is the canonical string of a basic policy (one directive, at most one source
/// expression). Lists are sorted.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ComparisonReceipt {
    pub schema: String,
    pub tool: ToolMeta,
    pub left: String,
    pub right: String,
    pub common: Vec<String>,
    pub only_left: Vec<String>,
    pub only_right: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct MatchReceipt {
    pub schema: String,
    pub tool: ToolMeta,
    pub policy: String,
    pub resource: String,
    pub resource_type: String,
    pub document: String,
    pub allowed: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct GenerateReceipt {
    pub schema: String,
    pub tool: ToolMeta,
    pub policy: String,
    pub entries_read: u64,
    pub policies_generated: u64,
    pub entries_skipped: u64,
}
