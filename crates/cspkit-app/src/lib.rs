//! Use case orchestration for cspkit.
//!
//! This crate is the application layer: each use case resolves parsers from the effective
//! settings, calls into the domain, and returns plain values or receipts. File IO goes through
//! `cspkit-store`.
//!
//! The CLI crate depends on this; it only handles argument parsing and output.

#![forbid(unsafe_code)]

mod combine;
mod compare;
mod config;
mod generate;
mod matching;
mod normalize;

pub use combine::run_combine;
pub use compare::run_compare;
pub use config::{config_schema_json, load_settings};
pub use generate::{GenerateInput, GenerateOutput, GenerateSource, run_generate};
pub use matching::{MatchInput, run_match};
pub use normalize::{NormalizeInput, NormalizeOutput, run_normalize};
