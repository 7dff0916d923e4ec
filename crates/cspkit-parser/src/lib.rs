//! String parsers for the CSP model: URIs, source expressions, directives and policies.
//!
//! Parsers are configured once and reused. They never fail: malformed input comes back as the
//! model's `Invalid` (or `Empty`) sentinel.

#![forbid(unsafe_code)]

mod directive;
mod policy;
mod source_expression;
mod split;
mod uri;

#[cfg(test)]
mod proptest;

pub use directive::{DirectiveParser, DirectiveParserConfig};
pub use policy::{PolicyParser, PolicyParserConfig};
pub use source_expression::SourceExpressionParser;
pub use uri::{UriParser, UriParserConfig};

/// Fuzz-friendly entry points. These run every parser with default settings and
/// **never panic** on any input.
pub mod fuzz {
    use super::*;

    pub fn parse_uri(text: &str) {
        let uri = UriParser::default().parse(text);
        let _ = uri.to_string();
    }

    pub fn parse_source_expression(text: &str) {
        let expression = SourceExpressionParser::default().parse(text);
        let _ = expression.to_string();
    }

    /// Parses a policy strictly and leniently, then exercises the algebra on the result.
    pub fn parse_policy(text: &str) {
        let strict = PolicyParser::default();
        let lenient = PolicyParser::new(PolicyParserConfig {
            directive: DirectiveParserConfig {
                strict: false,
                ..DirectiveParserConfig::default()
            },
            ..PolicyParserConfig::default()
        });
        for parser in [strict, lenient] {
            let policy = parser.parse(text);
            let _ = policy.to_string();
            let _ = policy.as_basic_policies();
            let _ = policy.combined_policy(&policy);
        }
    }
}
