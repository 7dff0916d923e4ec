//! The `combine` use case: union of several policies.

use cspkit_domain::Policy;
use cspkit_settings::EffectiveSettings;

/// Folds `combined_policy` over `policies`, starting from the empty policy.
pub fn run_combine<S: AsRef<str>>(
    settings: &EffectiveSettings,
    policies: &[S],
) -> anyhow::Result<Policy> {
    let parser = settings.policy_parser();
    let mut combined = Policy::new([]);
    for text in policies {
        let text = text.as_ref();
        let policy = parser.parse(text);
        if policy.is_invalid() {
            anyhow::bail!("invalid policy: {text:?}");
        }
        combined = combined.combined_policy(&policy);
        if combined.is_invalid() {
            anyhow::bail!("policy cannot be combined with the ones before it: {text:?}");
        }
    }
    Ok(combined)
}
