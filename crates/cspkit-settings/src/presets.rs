use crate::effective::EffectiveSettings;
use cspkit_domain::tables::scheme_only_schemes;
use cspkit_parser::{PolicyParserConfig, UriParserConfig};
use cspkit_report::ReportParserConfig;

/// Preset profiles.
///
/// Both share the default tables and differ only in strictness.
pub fn preset(profile: &str) -> EffectiveSettings {
    match profile {
        "lenient" => lenient_profile(),
        // default
        _ => strict_profile(),
    }
}

fn strict_profile() -> EffectiveSettings {
    base("strict", true)
}

fn lenient_profile() -> EffectiveSettings {
    base("lenient", false)
}

fn base(profile: &str, strict: bool) -> EffectiveSettings {
    let mut policy = PolicyParserConfig::default();
    policy.directive.strict = strict;
    let report = ReportParserConfig {
        strict,
        ..ReportParserConfig::default()
    };
    EffectiveSettings {
        profile: profile.to_string(),
        strict,
        uri: UriParserConfig::default(),
        policy,
        report,
        scheme_only: scheme_only_schemes(),
    }
}
