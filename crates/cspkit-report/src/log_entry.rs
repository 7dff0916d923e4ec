use crate::report::{Report, ReportParser, ReportParserConfig};
use cspkit_domain::Policy;
use cspkit_domain::tables::to_strings;
use cspkit_types::ids;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;

#[derive(Clone, Debug, PartialEq)]
pub enum LogEntryValue {
    Report(Report),
    Json(Value),
}

impl From<Report> for LogEntryValue {
    fn from(value: Report) -> Self {
        LogEntryValue::Report(value)
    }
}

impl From<Value> for LogEntryValue {
    fn from(value: Value) -> Self {
        LogEntryValue::Json(value)
    }
}

/// One line of a report collector's log: a `csp-report` plus request metadata
/// (`policy-type`, `remote-addr`, `http-user-agent`, `timestamp-utc`, `header-type`).
#[derive(Clone, Debug, PartialEq)]
pub struct LogEntry {
    invalid: bool,
    fields: BTreeMap<String, LogEntryValue>,
}

impl LogEntry {
    pub const INVALID: LogEntry = LogEntry {
        invalid: true,
        fields: BTreeMap::new(),
    };

    pub fn new(fields: BTreeMap<String, LogEntryValue>) -> Self {
        Self {
            invalid: false,
            fields,
        }
    }

    pub fn is_invalid(&self) -> bool {
        self.invalid
    }

    pub fn get(&self, key: &str) -> Option<&LogEntryValue> {
        self.fields.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &LogEntryValue)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn report(&self) -> Option<&Report> {
        match self.fields.get(ids::KEY_CSP_REPORT) {
            Some(LogEntryValue::Report(report)) => Some(report),
            _ => None,
        }
    }

    pub fn policy_type(&self) -> Option<&str> {
        match self.fields.get(ids::KEY_POLICY_TYPE) {
            Some(LogEntryValue::Json(Value::String(ty))) => Some(ty),
            _ => None,
        }
    }

    /// Generates the report's policy using the logged `policy-type` as report type.
    pub fn generate_policy(&self) -> Policy {
        if self.invalid {
            return Policy::INVALID;
        }
        match (self.report(), self.policy_type()) {
            (Some(report), Some(ty)) => report.generate_policy_for(ty),
            _ => Policy::INVALID,
        }
    }

    pub fn to_json(&self) -> Value {
        if self.invalid {
            return Value::String("[invalid]".to_string());
        }
        let object: Map<String, Value> = self
            .fields
            .iter()
            .map(|(k, v)| {
                let value = match v {
                    LogEntryValue::Report(report) => report.to_json(),
                    LogEntryValue::Json(value) => value.clone(),
                };
                (k.clone(), value)
            })
            .collect();
        Value::Object(object)
    }
}

impl FromIterator<(String, LogEntryValue)> for LogEntry {
    fn from_iter<I: IntoIterator<Item = (String, LogEntryValue)>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl fmt::Display for LogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.invalid {
            return f.write_str("[invalid]");
        }
        write!(f, "{}", self.to_json())
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LogEntryParserConfig {
    /// Used for the nested `csp-report`; its `strict` flag also applies to the entry.
    pub report: ReportParserConfig,
    pub required_keys: Vec<String>,
}

impl Default for LogEntryParserConfig {
    fn default() -> Self {
        Self {
            report: ReportParserConfig::default(),
            required_keys: to_strings(&[ids::KEY_CSP_REPORT]),
        }
    }
}

#[derive(Clone, Debug)]
pub struct LogEntryParser {
    reports: ReportParser,
    required_keys: Vec<String>,
    strict: bool,
}

impl Default for LogEntryParser {
    fn default() -> Self {
        Self::new(LogEntryParserConfig::default())
    }
}

impl LogEntryParser {
    pub fn new(config: LogEntryParserConfig) -> Self {
        Self {
            strict: config.report.strict,
            reports: ReportParser::new(config.report),
            required_keys: config.required_keys,
        }
    }

    pub fn parse_str(&self, input: &str) -> LogEntry {
        match serde_json::from_str::<Value>(input) {
            Ok(value) => self.parse_json(&value),
            Err(_) => LogEntry::INVALID,
        }
    }

    pub fn parse_json(&self, value: &Value) -> LogEntry {
        let Some(object) = value.as_object() else {
            return LogEntry::INVALID;
        };
        let mut fields = BTreeMap::new();
        for (key, value) in object {
            if key != ids::KEY_CSP_REPORT {
                fields.insert(key.clone(), LogEntryValue::Json(value.clone()));
                continue;
            }
            let report = self.reports.parse_json(value);
            if report.is_invalid() {
                if self.strict {
                    return LogEntry::INVALID;
                }
                continue;
            }
            fields.insert(key.clone(), LogEntryValue::Report(report));
        }
        if self.required_keys.iter().any(|key| !fields.contains_key(key)) {
            return LogEntry::INVALID;
        }
        LogEntry::new(fields)
    }
}
