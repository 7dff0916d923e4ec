use crate::effective::EffectiveSettings;
use crate::{model::CspkitConfigV1, presets};
use anyhow::Context;
use std::collections::BTreeSet;

#[derive(Clone, Debug, Default)]
pub struct Overrides {
    pub profile: Option<String>,
    pub strict: Option<bool>,
}

#[derive(Clone, Debug)]
pub struct ResolvedConfig {
    pub effective: EffectiveSettings,
}

pub fn resolve_config(
    cfg: CspkitConfigV1,
    overrides: Overrides,
) -> anyhow::Result<ResolvedConfig> {
    let profile = overrides
        .profile
        .clone()
        .or(cfg.profile.clone())
        .unwrap_or_else(|| "strict".to_string());

    let mut effective = presets::preset(&profile);

    // Scheme tables feed every parser that knows schemes.
    for (scheme, sc) in &cfg.schemes {
        validate_scheme(scheme).context("invalid [schemes] entry")?;
        effective.uri.scheme_ports.insert(scheme, sc.port);
        effective.report.uri.scheme_ports.insert(scheme, sc.port);
        effective.policy.directive.known_schemes.insert(scheme, sc.port);
    }
    for (port, scheme) in &cfg.port_schemes {
        let port: u16 = port
            .parse()
            .with_context(|| format!("invalid port in [port_schemes]: {port}"))?;
        validate_scheme(scheme).with_context(|| format!("invalid scheme for port {port}"))?;
        effective.uri.port_schemes.insert(port, scheme);
        effective.report.uri.port_schemes.insert(port, scheme);
    }

    // URI parsing
    let uri = &cfg.uri;
    if let Some(add_scheme) = uri.add_scheme {
        effective.uri.add_scheme = add_scheme;
    }
    if let Some(default_scheme) = uri.default_scheme.as_deref() {
        validate_scheme(default_scheme).context("invalid uri.default_scheme")?;
        effective.uri.default_scheme = default_scheme.to_string();
        effective.report.uri.default_scheme = default_scheme.to_string();
    }
    if let Some(add_port) = uri.add_port {
        effective.uri.add_port = add_port;
    }
    if let Some(default_port) = uri.default_port {
        effective.uri.default_port = default_port;
        effective.report.uri.default_port = default_port;
    }
    if let Some(decode) = uri.decode {
        effective.uri.decode = decode;
        effective.report.uri.decode = decode;
    }

    // Directive tables
    let directives = &cfg.directives;
    for (from, to) in &directives.translations {
        effective
            .policy
            .directive
            .type_translations
            .insert(from.to_ascii_lowercase(), to.to_ascii_lowercase());
    }
    if let Some(allowed) = &directives.allowed {
        effective.policy.directive.allowed_types = lowercase_all(allowed);
    }
    if let Some(ignored) = &directives.ignored {
        effective.policy.ignored_types = lowercase_all(ignored);
    }
    if let Some(types) = &directives.default_src_types {
        effective.policy.default_src_types = lowercase_all(types);
    }
    if let Some(scheme_only) = &directives.scheme_only {
        effective.scheme_only = lowercase_all(scheme_only);
    }
    validate_default_src_types(
        &effective.policy.default_src_types,
        &effective.policy.directive.allowed_types,
    )?;
    if let Some(expand) = cfg.expand_default_src {
        effective.policy.expand_default_src = expand;
    }

    // Reports share the directive tables but keep their own fan-out and inference switches.
    let report = &cfg.report;
    effective.report.policy.directive = effective.policy.directive.clone();
    effective.report.policy.ignored_types = effective.policy.ignored_types.clone();
    effective.report.policy.default_src_types = effective.policy.default_src_types.clone();
    if let Some(keys) = &report.uri_keys {
        effective.report.uri_keys = keys.clone();
    }
    if let Some(keys) = &report.directive_keys {
        effective.report.directive_keys = keys.clone();
    }
    if let Some(keys) = &report.policy_keys {
        effective.report.policy_keys = keys.clone();
    }
    if let Some(keys) = &report.required_keys {
        effective.report.required_keys = keys.clone();
    }
    for (from, to) in &report.key_renames {
        effective
            .report
            .key_renames
            .insert(from.to_lowercase(), to.clone());
    }
    if let Some(add_scheme) = report.add_scheme {
        effective.report.uri.add_scheme = add_scheme;
    }
    if let Some(add_port) = report.add_port {
        effective.report.uri.add_port = add_port;
    }
    if let Some(expand) = report.expand_default_src {
        effective.report.policy.expand_default_src = expand;
    }
    validate_report_keys(
        &effective.report.uri_keys,
        &effective.report.directive_keys,
        &effective.report.policy_keys,
    )?;

    // Strictness last: overrides win over the file, the file over the preset.
    if let Some(strict) = overrides.strict.or(cfg.strict) {
        effective.strict = strict;
    }
    effective.policy.directive.strict = effective.strict;
    effective.report.strict = effective.strict;
    effective.report.policy.directive.strict = effective.strict;

    Ok(ResolvedConfig { effective })
}

fn lowercase_all(values: &[String]) -> Vec<String> {
    values.iter().map(|v| v.trim().to_ascii_lowercase()).collect()
}

fn validate_scheme(scheme: &str) -> anyhow::Result<()> {
    let well_formed = scheme
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || matches!(c, '+' | '-' | '.'));
    if scheme.is_empty() || !well_formed {
        anyhow::bail!("invalid scheme name: {scheme:?} (expected lowercase letters, digits, '+', '-' or '.')");
    }
    Ok(())
}

fn validate_default_src_types(types: &[String], allowed: &[String]) -> anyhow::Result<()> {
    for ty in types {
        if !allowed.contains(ty) {
            anyhow::bail!("default-src type {ty} is not an allowed directive type");
        }
    }
    Ok(())
}

fn validate_report_keys(
    uri_keys: &[String],
    directive_keys: &[String],
    policy_keys: &[String],
) -> anyhow::Result<()> {
    let mut seen = BTreeSet::new();
    for key in uri_keys.iter().chain(directive_keys).chain(policy_keys) {
        if !seen.insert(key.as_str()) {
            anyhow::bail!(
                "report key {key} is listed more than once across uri_keys, directive_keys and policy_keys"
            );
        }
    }
    Ok(())
}
