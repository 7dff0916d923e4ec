//! CSP violation reports and collector log entries.
//!
//! Both are immutable string-keyed maps decoded from JSON. Configured keys are parsed into
//! [`cspkit_domain::Uri`], [`cspkit_domain::Directive`] or [`cspkit_domain::Policy`] values;
//! everything else is kept as raw JSON.

#![forbid(unsafe_code)]

mod log_entry;
mod report;

pub use log_entry::{LogEntry, LogEntryParser, LogEntryParserConfig, LogEntryValue};
pub use report::{Report, ReportParser, ReportParserConfig, ReportValue};

/// Fuzz-friendly entry point: decodes `text` as a report and as a log entry. **Never panics.**
pub fn fuzz_parse(text: &str) {
    let report = ReportParser::default().parse_str(text);
    let _ = report.to_string();
    let entry = LogEntryParser::default().parse_str(text);
    let _ = entry.generate_policy();
}
