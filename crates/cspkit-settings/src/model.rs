use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// `cspkit.toml` schema v1.
///
/// Every field is optional; absent fields keep the profile's value.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct CspkitConfigV1 {
    /// Optional schema string for tooling (`cspkit.config.v1`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,

    /// `strict` (default) or `lenient`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile: Option<String>,

    /// Reject whole directives/policies/reports on any invalid part.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strict: Option<bool>,

    /// Fan `default-src` out to the elementary types when parsing policies.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expand_default_src: Option<bool>,

    #[serde(default)]
    pub uri: UriConfig,

    /// Extra known schemes (scheme -> default port). An empty table means the scheme has no port.
    #[serde(default)]
    pub schemes: BTreeMap<String, SchemeConfig>,

    /// Port (as a string key) -> scheme, used to infer missing schemes.
    #[serde(default)]
    pub port_schemes: BTreeMap<String, String>,

    #[serde(default)]
    pub directives: DirectivesConfig,

    #[serde(default)]
    pub report: ReportConfig,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct UriConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub add_scheme: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_scheme: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub add_port: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_port: Option<u16>,

    /// Percent-decode paths.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub decode: Option<bool>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct SchemeConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct DirectivesConfig {
    /// Replaces the allowed directive types.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allowed: Option<Vec<String>>,

    /// Replaces the directive types skipped when parsing policies.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ignored: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_src_types: Option<Vec<String>>,

    /// Schemes reduced to `scheme:` when paths are stripped.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scheme_only: Option<Vec<String>>,

    /// Legacy type name -> current name. Merged into the defaults.
    #[serde(default)]
    pub translations: BTreeMap<String, String>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ReportConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uri_keys: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub directive_keys: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub policy_keys: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required_keys: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub add_scheme: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub add_port: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expand_default_src: Option<bool>,

    /// Old report key -> new key. Merged into the defaults.
    #[serde(default)]
    pub key_renames: BTreeMap<String, String>,
}
