use anyhow::Context;
use camino::Utf8Path;
use cspkit_domain::Policy;
use cspkit_parser::{PolicyParser, PolicyParserConfig};
use cspkit_report::{LogEntry, LogEntryParser, Report, ReportParser};
use std::fs::File;
use std::io::{BufRead, BufReader};

/// Reads a file line by line, trimming each line and skipping blank ones.
#[derive(Clone, Copy, Debug, Default)]
pub struct DataReader;

impl DataReader {
    pub fn load(&self, path: &Utf8Path, mut callback: impl FnMut(&str)) -> anyhow::Result<()> {
        let file = File::open(path).with_context(|| format!("open {path}"))?;
        for (index, line) in BufReader::new(file).lines().enumerate() {
            let line = line.with_context(|| format!("read {path}:{}", index + 1))?;
            let line = line.trim();
            if !line.is_empty() {
                callback(line);
            }
        }
        Ok(())
    }

    pub fn load_all(&self, path: &Utf8Path) -> anyhow::Result<Vec<String>> {
        let mut lines = Vec::new();
        self.load(path, |line| lines.push(line.to_string()))?;
        Ok(lines)
    }
}

/// A parser that turns one stored line into a value, or rejects it.
pub trait LineParser {
    type Output;

    /// Used in log messages, e.g. `policy`.
    const KIND: &'static str;

    fn parse_line(&self, line: &str) -> Option<Self::Output>;
}

impl LineParser for PolicyParser {
    type Output = Policy;
    const KIND: &'static str = "policy";

    fn parse_line(&self, line: &str) -> Option<Policy> {
        let policy = self.parse(line);
        (!policy.is_invalid()).then_some(policy)
    }
}

impl LineParser for ReportParser {
    type Output = Report;
    const KIND: &'static str = "report";

    fn parse_line(&self, line: &str) -> Option<Report> {
        let report = self.parse_str(line);
        (!report.is_invalid()).then_some(report)
    }
}

impl LineParser for LogEntryParser {
    type Output = LogEntry;
    const KIND: &'static str = "log entry";

    fn parse_line(&self, line: &str) -> Option<LogEntry> {
        let entry = self.parse_str(line);
        (!entry.is_invalid()).then_some(entry)
    }
}

/// Loads one value per line with `P`, skipping lines that do not parse.
///
/// Skipped lines are logged at `warn` when `report_errors` is set, at `debug` otherwise.
#[derive(Clone, Debug)]
pub struct TypedReader<P> {
    parser: P,
    report_errors: bool,
}

pub type PolicyReader = TypedReader<PolicyParser>;
pub type ReportReader = TypedReader<ReportParser>;
pub type LogEntryReader = TypedReader<LogEntryParser>;

impl<P: LineParser> TypedReader<P> {
    pub fn new(parser: P, report_errors: bool) -> Self {
        Self {
            parser,
            report_errors,
        }
    }

    /// Calls `callback` for every valid value and returns how many lines were skipped.
    pub fn load(
        &self,
        path: &Utf8Path,
        mut callback: impl FnMut(P::Output),
    ) -> anyhow::Result<usize> {
        let mut skipped = 0;
        DataReader.load(path, |line| match self.parser.parse_line(line) {
            Some(value) => callback(value),
            None => {
                skipped += 1;
                if self.report_errors {
                    tracing::warn!(kind = P::KIND, %path, line, "could not parse line");
                } else {
                    tracing::debug!(kind = P::KIND, %path, line, "skipping unparsable line");
                }
            }
        })?;
        Ok(skipped)
    }

    pub fn load_all(&self, path: &Utf8Path) -> anyhow::Result<Vec<P::Output>> {
        let mut values = Vec::new();
        self.load(path, |value| values.push(value))?;
        Ok(values)
    }
}

impl PolicyReader {
    /// Stored policies are read without `default-src` fan-out.
    pub fn policies(report_errors: bool) -> Self {
        let parser = PolicyParser::new(PolicyParserConfig {
            expand_default_src: false,
            ..PolicyParserConfig::default()
        });
        Self::new(parser, report_errors)
    }
}

impl ReportReader {
    pub fn reports(report_errors: bool) -> Self {
        Self::new(ReportParser::default(), report_errors)
    }
}

impl LogEntryReader {
    pub fn log_entries(report_errors: bool) -> Self {
        Self::new(LogEntryParser::default(), report_errors)
    }
}
