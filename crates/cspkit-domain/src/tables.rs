//! Scheme/port lookup tables and the default directive type lists.
//!
//! Keep these readable. Anything site-specific belongs in `cspkit.toml`.

use cspkit_types::ids;
use std::collections::BTreeMap;

pub const DEFAULT_SCHEME: &str = "http";
pub const DEFAULT_PORT: u16 = 80;

/// Schemes written as `scheme:data` rather than `scheme://host`.
pub const NO_DOUBLE_SLASH_SCHEMES: &[&str] = &["data", "about", "view-source"];

/// Schemes whose source expressions are reduced to `scheme:` when paths are stripped.
pub const SCHEME_ONLY_SCHEMES: &[&str] = &[
    "data",
    "chrome-extension",
    "safari-extension",
    "chromenull",
    "chromeinvoke",
    "chromeinvokeimmediate",
    "mx",
    "moz-icon",
    "about",
    "view-source",
];

pub const ALLOWED_DIRECTIVE_TYPES: &[&str] = &[
    ids::BASE_URI,
    ids::CHILD_SRC,
    ids::CONNECT_SRC,
    ids::DEFAULT_SRC,
    ids::FONT_SRC,
    ids::FORM_ACTION,
    ids::FRAME_ANCESTORS,
    ids::FRAME_SRC,
    ids::IMG_SRC,
    ids::MEDIA_SRC,
    ids::OBJECT_SRC,
    ids::SCRIPT_SRC,
    ids::STYLE_SRC,
];

/// Directive types skipped when parsing a policy (no whitelist semantics).
pub const IGNORED_DIRECTIVE_TYPES: &[&str] = &[
    ids::PLUGIN_TYPES,
    ids::REFERRER_DIRECTIVE,
    ids::REFLECTED_XSS,
    ids::REPORT_URI,
    ids::SANDBOX,
];

/// Elementary types that fall back to `default-src`.
pub const DEFAULT_SRC_TYPES: &[&str] = &[
    ids::CHILD_SRC,
    ids::CONNECT_SRC,
    ids::FONT_SRC,
    ids::IMG_SRC,
    ids::MEDIA_SRC,
    ids::OBJECT_SRC,
    ids::SCRIPT_SRC,
    ids::STYLE_SRC,
];

pub const TYPE_TRANSLATIONS: &[(&str, &str)] = &[(ids::XHR_SRC, ids::CONNECT_SRC)];

pub fn is_no_double_slash_scheme(scheme: &str) -> bool {
    NO_DOUBLE_SLASH_SCHEMES.contains(&scheme)
}

pub fn to_strings(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

pub fn default_src_types() -> Vec<String> {
    to_strings(DEFAULT_SRC_TYPES)
}

pub fn scheme_only_schemes() -> Vec<String> {
    to_strings(SCHEME_ONLY_SCHEMES)
}

pub fn type_translations() -> BTreeMap<String, String> {
    TYPE_TRANSLATIONS
        .iter()
        .map(|(from, to)| (from.to_string(), to.to_string()))
        .collect()
}

/// Scheme → default port.
///
/// A scheme can be known without having a port (`data`, `chrome-extension`, ...). The keys of
/// this table double as the set of schemes accepted in source expressions.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SchemePorts {
    ports: BTreeMap<String, Option<u16>>,
}

impl SchemePorts {
    pub fn empty() -> Self {
        Self {
            ports: BTreeMap::new(),
        }
    }

    pub fn with(mut self, scheme: &str, port: Option<u16>) -> Self {
        self.insert(scheme, port);
        self
    }

    pub fn insert(&mut self, scheme: &str, port: Option<u16>) {
        self.ports.insert(scheme.to_ascii_lowercase(), port);
    }

    /// `None` if the scheme is unknown, `Some(None)` if it is known but has no port.
    pub fn lookup(&self, scheme: &str) -> Option<Option<u16>> {
        self.ports.get(scheme).copied()
    }

    pub fn default_port(&self, scheme: &str) -> Option<u16> {
        self.lookup(scheme).flatten()
    }

    pub fn contains(&self, scheme: &str) -> bool {
        self.ports.contains_key(scheme)
    }

    pub fn schemes(&self) -> impl Iterator<Item = &str> {
        self.ports.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.ports.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ports.is_empty()
    }
}

impl Default for SchemePorts {
    fn default() -> Self {
        let mut table = Self::empty().with("http", Some(80)).with("https", Some(443));
        for scheme in [
            "data",
            "chrome-extension",
            "safari-extension",
            "chromenull",
            "chromeinvoke",
            "chromeinvokeimmediate",
            "mx",
            "moz-icon",
            "about",
            "view-source",
            "se-extension",
            "ws",
        ] {
            table.insert(scheme, None);
        }
        table
    }
}

impl<'a> FromIterator<(&'a str, Option<u16>)> for SchemePorts {
    fn from_iter<I: IntoIterator<Item = (&'a str, Option<u16>)>>(iter: I) -> Self {
        let mut table = Self::empty();
        for (scheme, port) in iter {
            table.insert(scheme, port);
        }
        table
    }
}

/// Port → scheme, used to infer a missing scheme from an explicit port.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PortSchemes {
    schemes: BTreeMap<u16, String>,
}

impl PortSchemes {
    pub fn empty() -> Self {
        Self {
            schemes: BTreeMap::new(),
        }
    }

    pub fn with(mut self, port: u16, scheme: &str) -> Self {
        self.insert(port, scheme);
        self
    }

    pub fn insert(&mut self, port: u16, scheme: &str) {
        self.schemes.insert(port, scheme.to_ascii_lowercase());
    }

    pub fn lookup(&self, port: u16) -> Option<&str> {
        self.schemes.get(&port).map(String::as_str)
    }
}

impl Default for PortSchemes {
    fn default() -> Self {
        Self::empty()
            .with(80, "http")
            .with(443, "https")
            .with(8080, "http")
    }
}
