use cspkit_domain::tables::to_strings;
use cspkit_domain::{Directive, Policy, ReportType, Uri};
use cspkit_parser::{DirectiveParser, PolicyParser, PolicyParserConfig, UriParser, UriParserConfig};
use cspkit_types::ids;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;

/// A report field: one of the typed CSP values, or the raw JSON the browser sent.
#[derive(Clone, Debug, PartialEq)]
pub enum ReportValue {
    Uri(Uri),
    Directive(Directive),
    Policy(Policy),
    Json(Value),
}

impl ReportValue {
    pub fn to_json(&self) -> Value {
        match self {
            ReportValue::Uri(uri) => Value::String(uri.to_string()),
            ReportValue::Directive(directive) => Value::String(directive.to_string()),
            ReportValue::Policy(policy) => Value::String(policy.to_string()),
            ReportValue::Json(value) => value.clone(),
        }
    }
}

impl From<Uri> for ReportValue {
    fn from(value: Uri) -> Self {
        ReportValue::Uri(value)
    }
}

impl From<Directive> for ReportValue {
    fn from(value: Directive) -> Self {
        ReportValue::Directive(value)
    }
}

impl From<Policy> for ReportValue {
    fn from(value: Policy) -> Self {
        ReportValue::Policy(value)
    }
}

impl From<Value> for ReportValue {
    fn from(value: Value) -> Self {
        ReportValue::Json(value)
    }
}

/// A browser-submitted CSP violation report with selected fields parsed into typed values.
///
/// Immutable once built.
#[derive(Clone, Debug, PartialEq)]
pub struct Report {
    invalid: bool,
    fields: BTreeMap<String, ReportValue>,
}

impl Report {
    pub const INVALID: Report = Report {
        invalid: true,
        fields: BTreeMap::new(),
    };

    pub fn new(fields: BTreeMap<String, ReportValue>) -> Self {
        Self {
            invalid: false,
            fields,
        }
    }

    pub fn is_invalid(&self) -> bool {
        self.invalid
    }

    pub fn get(&self, key: &str) -> Option<&ReportValue> {
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

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ReportValue)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn uri(&self, key: &str) -> Option<&Uri> {
        match self.fields.get(key) {
            Some(ReportValue::Uri(uri)) => Some(uri),
            _ => None,
        }
    }

    pub fn directive(&self, key: &str) -> Option<&Directive> {
        match self.fields.get(key) {
            Some(ReportValue::Directive(directive)) => Some(directive),
            _ => None,
        }
    }

    pub fn policy(&self, key: &str) -> Option<&Policy> {
        match self.fields.get(key) {
            Some(ReportValue::Policy(policy)) => Some(policy),
            _ => None,
        }
    }

    /// A basic policy allowing exactly the event this report describes.
    ///
    /// `Policy::INVALID` when the report is invalid, lacks a typed `violated-directive` or
    /// `blocked-uri`, or the directive cannot be regenerated for `report_type`. The result is
    /// meant to be combined with the policies of other reports for the same site.
    pub fn generate_policy(&self, report_type: ReportType) -> Policy {
        if self.invalid {
            return Policy::INVALID;
        }
        let (Some(violated), Some(blocked)) = (
            self.directive(ids::KEY_VIOLATED_DIRECTIVE),
            self.uri(ids::KEY_BLOCKED_URI),
        ) else {
            return Policy::INVALID;
        };
        let generated = violated.generate_directive(report_type, blocked);
        if generated == Directive::INVALID {
            return Policy::INVALID;
        }
        Policy::new([generated])
    }

    /// Like [`Report::generate_policy`], with the type given by name. Unknown names give
    /// `Policy::INVALID`.
    pub fn generate_policy_for(&self, report_type: &str) -> Policy {
        match report_type.parse::<ReportType>() {
            Ok(report_type) => self.generate_policy(report_type),
            Err(_) => Policy::INVALID,
        }
    }

    /// JSON object with typed values rendered through their display form.
    pub fn to_json(&self) -> Value {
        if self.invalid {
            return Value::String("[invalid]".to_string());
        }
        let object: Map<String, Value> = self
            .fields
            .iter()
            .map(|(k, v)| (k.clone(), v.to_json()))
            .collect();
        Value::Object(object)
    }
}

impl FromIterator<(String, ReportValue)> for Report {
    fn from_iter<I: IntoIterator<Item = (String, ReportValue)>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.invalid {
            return f.write_str("[invalid]");
        }
        write!(f, "{}", self.to_json())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum FieldKind {
    Uri,
    Directive,
    Policy,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReportParserConfig {
    pub uri_keys: Vec<String>,
    pub directive_keys: Vec<String>,
    pub policy_keys: Vec<String>,
    /// Applied to lower-cased keys before anything else.
    pub key_renames: BTreeMap<String, String>,
    /// Checked after conversion, regardless of `strict`.
    pub required_keys: Vec<String>,
    /// Any invalid field invalidates the report; otherwise the field is dropped.
    /// Also governs the nested directive and policy parsers.
    pub strict: bool,
    pub uri: UriParserConfig,
    pub policy: PolicyParserConfig,
}

impl Default for ReportParserConfig {
    fn default() -> Self {
        Self {
            uri_keys: to_strings(&[ids::KEY_BLOCKED_URI, ids::KEY_DOCUMENT_URI, ids::KEY_REFERRER]),
            directive_keys: to_strings(&[ids::KEY_VIOLATED_DIRECTIVE]),
            policy_keys: to_strings(&[ids::KEY_ORIGINAL_POLICY]),
            key_renames: BTreeMap::from([(
                ids::KEY_DOCUMENT_URL.to_string(),
                ids::KEY_DOCUMENT_URI.to_string(),
            )]),
            required_keys: to_strings(&[
                ids::KEY_BLOCKED_URI,
                ids::KEY_VIOLATED_DIRECTIVE,
                ids::KEY_DOCUMENT_URI,
            ]),
            strict: true,
            uri: UriParserConfig {
                add_scheme: false,
                add_port: false,
                decode: true,
                ..UriParserConfig::default()
            },
            policy: PolicyParserConfig {
                expand_default_src: false,
                ..PolicyParserConfig::default()
            },
        }
    }
}

/// Decodes violation reports from JSON.
#[derive(Clone, Debug)]
pub struct ReportParser {
    kinds: BTreeMap<String, FieldKind>,
    document_is_uri: bool,
    key_renames: BTreeMap<String, String>,
    required_keys: Vec<String>,
    strict: bool,
    uris: UriParser,
    directives: DirectiveParser,
    policies: PolicyParser,
}

impl Default for ReportParser {
    fn default() -> Self {
        Self::new(ReportParserConfig::default())
    }
}

impl ReportParser {
    pub fn new(config: ReportParserConfig) -> Self {
        let mut kinds = BTreeMap::new();
        for (keys, kind) in [
            (&config.uri_keys, FieldKind::Uri),
            (&config.directive_keys, FieldKind::Directive),
            (&config.policy_keys, FieldKind::Policy),
        ] {
            for key in keys {
                kinds.entry(key.clone()).or_insert(kind);
            }
        }
        let document_is_uri = kinds.get(ids::KEY_DOCUMENT_URI) == Some(&FieldKind::Uri);

        let mut policy = config.policy;
        policy.directive.strict = config.strict;
        let directive = policy.directive.clone();

        Self {
            kinds,
            document_is_uri,
            key_renames: config.key_renames,
            required_keys: config.required_keys,
            strict: config.strict,
            uris: UriParser::new(config.uri),
            directives: DirectiveParser::new(directive),
            policies: PolicyParser::new(policy),
        }
    }

    /// Malformed JSON, or JSON that is not an object, gives `Report::INVALID`.
    pub fn parse_str(&self, input: &str) -> Report {
        match serde_json::from_str::<Value>(input) {
            Ok(value) => self.parse_json(&value),
            Err(_) => Report::INVALID,
        }
    }

    pub fn parse_json(&self, value: &Value) -> Report {
        match value.as_object() {
            Some(object) => self.parse_object(object),
            None => Report::INVALID,
        }
    }

    pub fn parse_object(&self, object: &Map<String, Value>) -> Report {
        let mut fields = BTreeMap::new();
        // Keys whose URI value was the literal `self`; they resolve to the document URI.
        let mut deferred_self = Vec::new();

        for (raw_key, value) in object {
            let key = self.rename(raw_key);
            let parsed = match self.kinds.get(&key) {
                None => Some(ReportValue::Json(value.clone())),
                Some(kind) => match value.as_str() {
                    None => None,
                    Some(text) if *kind == FieldKind::Uri && text.trim().eq_ignore_ascii_case("self") => {
                        deferred_self.push(key);
                        continue;
                    }
                    Some(text) => self.parse_typed(*kind, text),
                },
            };
            match parsed {
                Some(value) => {
                    fields.insert(key, value);
                }
                None if self.strict => return Report::INVALID,
                None => {}
            }
        }

        for key in deferred_self {
            let document = match fields.get(ids::KEY_DOCUMENT_URI) {
                Some(document @ ReportValue::Uri(_)) if self.document_is_uri => document.clone(),
                _ if self.strict => return Report::INVALID,
                _ => continue,
            };
            fields.insert(key, document);
        }

        if self.required_keys.iter().any(|key| !fields.contains_key(key)) {
            return Report::INVALID;
        }
        Report::new(fields)
    }

    /// `None` when the value does not parse.
    fn parse_typed(&self, kind: FieldKind, text: &str) -> Option<ReportValue> {
        match kind {
            FieldKind::Uri => {
                let uri = self.uris.parse(text);
                (uri != Uri::INVALID).then_some(ReportValue::Uri(uri))
            }
            FieldKind::Directive => {
                let directive = self.directives.parse(text);
                (directive != Directive::INVALID).then_some(ReportValue::Directive(directive))
            }
            FieldKind::Policy => {
                let policy = self.policies.parse(text);
                (!policy.is_invalid()).then_some(ReportValue::Policy(policy))
            }
        }
    }

    fn rename(&self, key: &str) -> String {
        let key = key.to_lowercase();
        match self.key_renames.get(&key) {
            Some(renamed) => renamed.clone(),
            None => key,
        }
    }
}
