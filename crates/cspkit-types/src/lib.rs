//! Stable IDs and DTOs used across the cspkit workspace.
//!
//! This crate is intentionally boring:
//! - directive type names, keywords and report field keys
//! - serializable receipts emitted by the CLI

#![forbid(unsafe_code)]

pub mod ids;
pub mod receipt;

pub use receipt::{
    ComparisonReceipt, GenerateReceipt, MatchReceipt, ToolMeta, SCHEMA_COMPARE_V1,
    SCHEMA_GENERATE_V1, SCHEMA_MATCH_V1,
};
