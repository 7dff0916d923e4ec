//! Property-based tests for the domain crate.
//!
//! These tests use proptest to verify invariants around:
//! - path stripping being idempotent
//! - the combination algebra (commutative, idempotent, absorbing `Invalid`)
//! - basic decomposition and comparison

use crate::directive::Directive;
use crate::policy::Policy;
use crate::source_expression::{PortSpec, SourceExpression, UriSourceExpression};
use crate::tables::{SchemePorts, default_src_types, scheme_only_schemes};
use crate::uri::Uri;
use cspkit_types::ids;
use proptest::prelude::*;
use std::collections::BTreeSet;

// ============================================================================
// Strategies for generating arbitrary values
// ============================================================================

fn arb_scheme() -> impl Strategy<Value = Option<String>> {
    prop_oneof![
        Just(None),
        Just(Some("http".to_string())),
        Just(Some("https".to_string())),
        Just(Some("data".to_string())),
        Just(Some("chrome-extension".to_string())),
    ]
}

fn arb_host() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("*".to_string()),
        prop::string::string_regex("(\\*\\.)?[a-z]{1,8}\\.(com|nu|org)").unwrap(),
    ]
}

fn arb_port() -> impl Strategy<Value = Option<PortSpec>> {
    prop_oneof![
        Just(None),
        Just(Some(PortSpec::Wildcard)),
        (1u16..10000).prop_map(|p| Some(PortSpec::Number(p))),
    ]
}

fn arb_path() -> impl Strategy<Value = Option<String>> {
    prop_oneof![
        Just(None),
        prop::string::string_regex("(/[a-z0-9]{1,6}){1,3}/?").unwrap().prop_map(Some),
    ]
}

fn arb_source_expression() -> impl Strategy<Value = SourceExpression> {
    prop_oneof![
        3 => (arb_scheme(), arb_host(), arb_port(), arb_path()).prop_map(|(s, h, p, path)| {
            SourceExpression::UriMatch(UriSourceExpression::new(
                s.as_deref(),
                Some(&h),
                p,
                path.as_deref(),
            ))
        }),
        1 => arb_scheme().prop_filter_map("scheme-only needs a scheme", |s| {
            s.map(|s| SourceExpression::UriMatch(UriSourceExpression::new(Some(&s), None, None, None)))
        }),
        1 => Just(SourceExpression::SelfRef),
        1 => Just(SourceExpression::UnsafeInline),
        1 => Just(SourceExpression::UnsafeEval),
    ]
}

fn arb_elementary_type() -> impl Strategy<Value = &'static str> {
    prop::sample::select(vec![
        ids::SCRIPT_SRC,
        ids::STYLE_SRC,
        ids::IMG_SRC,
        ids::CONNECT_SRC,
        ids::FONT_SRC,
    ])
}

fn arb_directive() -> impl Strategy<Value = Directive> {
    (
        arb_elementary_type(),
        prop::collection::vec(arb_source_expression(), 0..5),
    )
        .prop_map(|(ty, whitelist)| Directive::new(ty, whitelist))
}

fn arb_policy() -> impl Strategy<Value = Policy> {
    prop::collection::vec(arb_directive(), 0..4).prop_map(Policy::new)
}

fn arb_resource() -> impl Strategy<Value = Uri> {
    prop_oneof![
        4 => (arb_scheme(), "[a-z]{1,8}\\.(com|nu)", prop::option::of(1u16..10000), arb_path())
            .prop_map(|(s, h, port, path)| Uri::new(s.as_deref(), &h, port, path.as_deref(), None)),
        1 => Just(Uri::INLINE),
        1 => Just(Uri::EVAL),
        1 => Just(Uri::EMPTY),
    ]
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    #[test]
    fn without_paths_is_idempotent(policy in arb_policy()) {
        let scheme_only = scheme_only_schemes();
        let once = policy.without_paths(&scheme_only);
        prop_assert_eq!(once.without_paths(&scheme_only), once);
    }

    #[test]
    fn combined_policy_is_commutative(a in arb_policy(), b in arb_policy()) {
        prop_assert_eq!(a.combined_policy(&b), b.combined_policy(&a));
    }

    #[test]
    fn combined_policy_is_idempotent(policy in arb_policy()) {
        prop_assert_eq!(policy.combined_policy(&policy), policy);
    }

    #[test]
    fn invalid_absorbs_combination(policy in arb_policy()) {
        prop_assert_eq!(policy.combined_policy(&Policy::INVALID), Policy::INVALID);
        prop_assert_eq!(Policy::INVALID.combined_policy(&policy), Policy::INVALID);
    }

    #[test]
    fn basic_directives_are_fixed_points(directive in arb_directive()) {
        for basic in directive.as_basic_directives() {
            prop_assert!(basic.is_basic_directive());
            prop_assert_eq!(basic.as_basic_directives(), BTreeSet::from([basic.clone()]));
        }
    }

    #[test]
    fn basic_policies_recombine_to_original(policy in arb_policy()) {
        let recombined = policy
            .as_basic_policies()
            .iter()
            .fold(Policy::new([]), |acc, basic| acc.combined_policy(basic));
        prop_assert_eq!(recombined, policy);
    }

    #[test]
    fn self_comparison_has_no_differences(policy in arb_policy()) {
        let cmp = policy.compare_to(&policy);
        prop_assert!(cmp.only_self.is_empty());
        prop_assert!(cmp.only_other.is_empty());
        prop_assert_eq!(cmp.common, policy.as_basic_policies());
    }

    #[test]
    fn combined_policy_matches_at_least_what_either_side_matches(
        a in arb_policy(),
        b in arb_policy(),
        resource in arb_resource(),
        ty in arb_elementary_type(),
    ) {
        let combined = a.combined_policy(&b);
        prop_assume!(!combined.is_invalid());
        let document = Uri::new(Some("https"), "seclab.nu", None, None, None);
        let ports = SchemePorts::default();
        let types = default_src_types();
        for side in [&a, &b] {
            if side.directive(ty).is_some() && side.matches(&resource, ty, &document, &ports, &types) {
                prop_assert!(combined.matches(&resource, ty, &document, &ports, &types));
            }
        }
    }

    #[test]
    fn display_never_shows_invalid_members(directive in arb_directive()) {
        prop_assert!(!directive.to_string().contains("[invalid]"));
    }
}
