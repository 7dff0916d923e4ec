//! Property-based tests for the parsers.
//!
//! These check that:
//! - no parser panics on arbitrary input
//! - canonical output of well-formed policies re-parses to an equal value
//! - parsed directives never carry invalid source expressions

use crate::{DirectiveParser, PolicyParser, SourceExpressionParser, UriParser};
use cspkit_domain::SourceExpression;
use cspkit_types::ids;
use proptest::prelude::*;

// ============================================================================
// Strategies
// ============================================================================

fn arb_host() -> impl Strategy<Value = String> {
    prop::string::string_regex("(\\*\\.)?[a-z]{1,8}\\.(com|nu|org)").unwrap()
}

fn arb_source_token() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("'self'".to_string()),
        Just("*".to_string()),
        Just("data:".to_string()),
        Just("https:".to_string()),
        arb_host(),
        (arb_host(), 1u16..10000).prop_map(|(h, p)| format!("{h}:{p}")),
        (prop::sample::select(vec!["http", "https"]), arb_host(), "(/[a-z0-9]{1,6}){0,3}")
            .prop_map(|(s, h, path)| format!("{s}://{h}{path}")),
    ]
}

fn arb_directive_text() -> impl Strategy<Value = String> {
    (
        prop::sample::select(vec![
            ids::DEFAULT_SRC,
            ids::SCRIPT_SRC,
            ids::STYLE_SRC,
            ids::IMG_SRC,
            ids::CONNECT_SRC,
            ids::FONT_SRC,
        ]),
        prop::collection::vec(arb_source_token(), 0..4),
    )
        .prop_map(|(ty, tokens)| {
            if tokens.is_empty() {
                format!("{ty} {}", ids::KEYWORD_NONE)
            } else {
                format!("{ty} {}", tokens.join(" "))
            }
        })
}

fn arb_policy_text() -> impl Strategy<Value = String> {
    prop::collection::vec(arb_directive_text(), 1..5).prop_map(|d| d.join("; "))
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    #[test]
    fn uri_parser_never_panics(input in ".{0,80}") {
        let _ = UriParser::default().parse(&input).to_string();
    }

    #[test]
    fn policy_parser_never_panics(input in "[ -~]{0,120}") {
        let _ = PolicyParser::default().parse(&input).to_string();
    }

    #[test]
    fn canonical_policy_text_reparses(text in arb_policy_text()) {
        let parser = PolicyParser::default();
        let policy = parser.parse(&text);
        prop_assert!(!policy.is_invalid());
        prop_assert_eq!(parser.parse(&policy.to_string()), policy);
    }

    #[test]
    fn directive_whitelists_hold_no_invalid_members(text in arb_directive_text()) {
        let directive = DirectiveParser::default().parse(&text);
        prop_assert!(directive.whitelist().iter().all(|e| !e.is_invalid()));
    }

    #[test]
    fn host_tokens_parse_to_uri_matches(host in arb_host()) {
        let parsed = SourceExpressionParser::default().parse(&host);
        prop_assert!(matches!(parsed, SourceExpression::UriMatch(_)));
        prop_assert_eq!(parsed.to_string(), host);
    }
}
