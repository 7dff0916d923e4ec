//! Config parsing and profile/preset resolution.
//!
//! This crate is intentionally IO-free: it parses and resolves configuration provided as strings.

#![forbid(unsafe_code)]

mod effective;
mod model;
mod presets;
mod resolve;

pub use effective::EffectiveSettings;
pub use model::{CspkitConfigV1, DirectivesConfig, ReportConfig, SchemeConfig, UriConfig};
pub use resolve::{Overrides, ResolvedConfig};

/// Stable schema identifier for `cspkit.toml`.
pub const SCHEMA_CONFIG_V1: &str = "cspkit.config.v1";

/// Parse `cspkit.toml` (or equivalent) into a typed model.
pub fn parse_config_toml(input: &str) -> anyhow::Result<CspkitConfigV1> {
    let cfg: CspkitConfigV1 = toml::from_str(input)?;
    if let Some(schema) = cfg.schema.as_deref()
        && schema != SCHEMA_CONFIG_V1
    {
        anyhow::bail!("unsupported config schema: {schema} (expected {SCHEMA_CONFIG_V1})");
    }
    Ok(cfg)
}

/// Resolve the effective settings (preset + config file + overrides).
pub fn resolve_config(
    cfg: CspkitConfigV1,
    overrides: Overrides,
) -> anyhow::Result<ResolvedConfig> {
    resolve::resolve_config(cfg, overrides)
}

#[cfg(test)]
mod tests {
    use super::*;
    use cspkit_domain::{Policy, Uri};
    use cspkit_types::ids;

    fn resolve(toml: &str) -> anyhow::Result<EffectiveSettings> {
        let cfg = parse_config_toml(toml)?;
        Ok(resolve_config(cfg, Overrides::default())?.effective)
    }

    #[test]
    fn empty_config_resolves_to_strict_defaults() {
        let effective = resolve("").expect("resolve");
        assert_eq!(effective.profile, "strict");
        assert!(effective.strict);
        assert!(effective.policy.directive.strict);
        assert!(effective.report.strict);
        assert!(effective.policy.expand_default_src);
        assert!(!effective.report.policy.expand_default_src);
        assert!(effective.uri.add_scheme);
        assert!(!effective.report.uri.add_scheme);
    }

    #[test]
    fn lenient_profile_drops_bad_tokens() {
        let effective = resolve(r#"profile = "lenient""#).expect("resolve");
        assert!(!effective.strict);
        let policy = effective.policy_parser().parse("img-src 'self' 'bogus'");
        assert!(!policy.is_invalid());
    }

    #[test]
    fn unknown_profile_falls_back_to_strict() {
        let effective = resolve(r#"profile = "paranoid""#).expect("resolve");
        assert_eq!(effective.profile, "strict");
    }

    #[test]
    fn overrides_win_over_file_and_file_over_preset() {
        let cfg = parse_config_toml("profile = \"lenient\"\nstrict = true\n").expect("parse");
        let effective = resolve_config(cfg.clone(), Overrides::default())
            .expect("resolve")
            .effective;
        assert!(effective.strict);

        let effective = resolve_config(
            cfg,
            Overrides {
                profile: None,
                strict: Some(false),
            },
        )
        .expect("resolve")
        .effective;
        assert!(!effective.strict);
        assert!(!effective.report.strict);
    }

    #[test]
    fn extra_schemes_are_known_everywhere() {
        let effective = resolve("[schemes.gopher]\nport = 70\n[schemes.blob]\n").expect("resolve");
        assert_eq!(effective.scheme_ports().lookup("gopher"), Some(Some(70)));
        assert_eq!(effective.scheme_ports().lookup("blob"), Some(None));
        let policy = effective.policy_parser().parse("img-src blob: gopher://hole.example");
        assert!(!policy.is_invalid());
        assert_eq!(effective.uri_parser().parse("blob:"), Uri::scheme_only("blob"));
    }

    #[test]
    fn port_schemes_infer_missing_scheme() {
        let effective = resolve("[port_schemes]\n\"8443\" = \"https\"\n").expect("resolve");
        let uri = effective.uri_parser().parse("example.com:8443/x");
        assert_eq!(uri.scheme(), Some("https"));
    }

    #[test]
    fn bad_port_key_is_rejected() {
        let err = resolve("[port_schemes]\n\"http\" = \"https\"\n").unwrap_err();
        assert!(format!("{err:#}").contains("invalid port"));
    }

    #[test]
    fn bad_scheme_name_is_rejected() {
        let err = resolve("[schemes.HTTP]\nport = 80\n").unwrap_err();
        assert!(format!("{err:#}").contains("invalid scheme name"));
    }

    #[test]
    fn default_src_types_must_be_allowed() {
        let err = resolve("[directives]\ndefault_src_types = [\"sandbox\"]\n").unwrap_err();
        assert!(err.to_string().contains("sandbox"));
    }

    #[test]
    fn report_keys_must_be_disjoint() {
        let err = resolve("[report]\npolicy_keys = [\"violated-directive\"]\n").unwrap_err();
        assert!(err.to_string().contains("violated-directive"));
    }

    #[test]
    fn translations_merge_into_defaults() {
        let effective =
            resolve("[directives.translations]\n\"frame-src\" = \"child-src\"\n").expect("resolve");
        let translations = &effective.policy.directive.type_translations;
        assert_eq!(translations.get(ids::XHR_SRC).map(String::as_str), Some(ids::CONNECT_SRC));
        assert_eq!(translations.get(ids::FRAME_SRC).map(String::as_str), Some(ids::CHILD_SRC));
    }

    #[test]
    fn expansion_switch_controls_default_src() {
        let effective = resolve("expand_default_src = false").expect("resolve");
        let policy = effective.policy_parser().parse("default-src 'self'");
        assert!(policy.directive(ids::DEFAULT_SRC).is_some());
        assert_ne!(policy, Policy::INVALID);
    }

    #[test]
    fn log_entries_keep_default_src_unexpanded() {
        let effective = resolve("").expect("resolve");
        let entry = effective.log_entry_parser().parse_str(
            r#"{"csp-report":{"document-uri":"http://seclab.nu","violated-directive":"default-src 'self'","original-policy":"default-src 'self'","blocked-uri":"http://evil.com"}}"#,
        );
        assert!(!entry.is_invalid());
        let policy = entry
            .report()
            .and_then(|r| r.policy(ids::KEY_ORIGINAL_POLICY))
            .expect("original policy");
        assert!(policy.directive(ids::DEFAULT_SRC).is_some());
        assert!(policy.directive(ids::SCRIPT_SRC).is_none());
    }

    #[test]
    fn unsupported_schema_string_is_rejected() {
        assert!(parse_config_toml("schema = \"cspkit.config.v9\"").is_err());
        assert!(parse_config_toml("schema = \"cspkit.config.v1\"").is_ok());
    }

    #[test]
    fn unknown_fields_are_ignored() {
        let cfg = parse_config_toml("future_option = 3").expect("parse");
        assert_eq!(cfg, CspkitConfigV1::default());
    }
}
