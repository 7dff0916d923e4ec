use anyhow::Context;
use cspkit_settings::{CspkitConfigV1, EffectiveSettings, Overrides};
use schemars::schema_for;

/// Parse and resolve config text; empty text means defaults.
pub fn load_settings(config_text: &str, overrides: Overrides) -> anyhow::Result<EffectiveSettings> {
    let cfg = if config_text.trim().is_empty() {
        CspkitConfigV1::default()
    } else {
        cspkit_settings::parse_config_toml(config_text).context("parse config")?
    };
    let resolved = cspkit_settings::resolve_config(cfg, overrides).context("resolve config")?;
    Ok(resolved.effective)
}

/// JSON schema of `cspkit.toml`, pretty-printed.
pub fn config_schema_json() -> anyhow::Result<String> {
    let schema = schema_for!(CspkitConfigV1);
    serde_json::to_string_pretty(&schema).context("serialize config schema")
}
