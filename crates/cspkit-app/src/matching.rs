//! The `match` use case: is a resource allowed by a policy?

use anyhow::Context;
use cspkit_domain::Uri;
use cspkit_settings::EffectiveSettings;
use cspkit_types::{MatchReceipt, SCHEMA_MATCH_V1, ToolMeta, ids};

#[derive(Clone, Debug)]
pub struct MatchInput<'a> {
    pub policy: &'a str,
    /// A URI, or `inline` / `eval` for inline script/style and `eval()` resources.
    pub resource: &'a str,
    pub resource_type: &'a str,
    /// The protected document, used for `'self'`.
    pub document: &'a str,
}

pub fn run_match(settings: &EffectiveSettings, input: MatchInput<'_>) -> anyhow::Result<MatchReceipt> {
    let policy = settings.policy_parser().parse(input.policy);
    if policy.is_invalid() {
        anyhow::bail!("invalid policy: {:?}", input.policy);
    }
    let resource = parse_resource(settings, input.resource).context("parse resource")?;
    let document = parse_uri(settings, input.document).context("parse document")?;

    let allowed = policy.matches(
        &resource,
        input.resource_type,
        &document,
        settings.scheme_ports(),
        &settings.policy.default_src_types,
    );
    tracing::debug!(%policy, %resource, resource_type = input.resource_type, allowed, "matched resource");

    Ok(MatchReceipt {
        schema: SCHEMA_MATCH_V1.to_string(),
        tool: ToolMeta::current(),
        policy: policy.to_string(),
        resource: resource.to_string(),
        resource_type: input.resource_type.to_ascii_lowercase(),
        document: document.to_string(),
        allowed,
    })
}

fn parse_resource(settings: &EffectiveSettings, text: &str) -> anyhow::Result<Uri> {
    match text.trim().to_ascii_lowercase().as_str() {
        ids::REPORT_TYPE_INLINE => Ok(Uri::INLINE),
        ids::REPORT_TYPE_EVAL => Ok(Uri::EVAL),
        _ => parse_uri(settings, text),
    }
}

fn parse_uri(settings: &EffectiveSettings, text: &str) -> anyhow::Result<Uri> {
    let uri = settings.uri_parser().parse(text);
    if uri == Uri::INVALID {
        anyhow::bail!("invalid URI: {text:?}");
    }
    Ok(uri)
}
