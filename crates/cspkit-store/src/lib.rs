//! Line-oriented storage: one policy, report or log entry per line.
//!
//! This crate does filesystem IO. Lines that fail to parse are skipped and logged, never fatal;
//! IO failures are errors carrying the path.

#![forbid(unsafe_code)]

mod reader;
mod writer;

pub use reader::{DataReader, LineParser, LogEntryReader, PolicyReader, ReportReader, TypedReader};
pub use writer::DataWriter;
