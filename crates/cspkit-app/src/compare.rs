//! The `compare` use case: basic policies two policies share or do not.

use cspkit_domain::Policy;
use cspkit_settings::EffectiveSettings;
use cspkit_types::{ComparisonReceipt, SCHEMA_COMPARE_V1, ToolMeta};
use std::collections::BTreeSet;

pub fn run_compare(
    settings: &EffectiveSettings,
    left: &str,
    right: &str,
) -> anyhow::Result<ComparisonReceipt> {
    let parser = settings.policy_parser();
    let parse = |text: &str| {
        let policy = parser.parse(text);
        if policy.is_invalid() {
            anyhow::bail!("invalid policy: {text:?}");
        }
        Ok(policy)
    };
    let left = parse(left)?;
    let right = parse(right)?;
    let comparison = left.compare_to(&right);

    Ok(ComparisonReceipt {
        schema: SCHEMA_COMPARE_V1.to_string(),
        tool: ToolMeta::current(),
        left: left.to_string(),
        right: right.to_string(),
        common: strings(&comparison.common),
        only_left: strings(&comparison.only_self),
        only_right: strings(&comparison.only_other),
    })
}

fn strings(policies: &BTreeSet<Policy>) -> Vec<String> {
    let mut out: Vec<String> = policies.iter().map(ToString::to_string).collect();
    out.sort();
    out
}
