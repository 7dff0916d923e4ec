//! The `normalize` use case: canonical form of a policy string.

use cspkit_domain::Policy;
use cspkit_settings::EffectiveSettings;

#[derive(Clone, Debug)]
pub struct NormalizeInput<'a> {
    pub policy: &'a str,
    /// Replace every source expression by its path-free form.
    pub strip_paths: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NormalizeOutput {
    pub policy: Policy,
    /// Basic-policy decomposition, sorted by canonical string.
    pub basic: Vec<Policy>,
}

pub fn run_normalize(
    settings: &EffectiveSettings,
    input: NormalizeInput<'_>,
) -> anyhow::Result<NormalizeOutput> {
    let mut policy = settings.policy_parser().parse(input.policy);
    if policy.is_invalid() {
        anyhow::bail!("invalid policy: {:?}", input.policy);
    }
    if input.strip_paths {
        policy = policy.without_paths(&settings.scheme_only);
    }
    let mut basic: Vec<Policy> = policy.as_basic_policies().into_iter().collect();
    basic.sort_by_cached_key(ToString::to_string);
    Ok(NormalizeOutput { policy, basic })
}
