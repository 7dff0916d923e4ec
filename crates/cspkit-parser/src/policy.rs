use crate::directive::{DirectiveParser, DirectiveParserConfig};
use cspkit_domain::tables::{IGNORED_DIRECTIVE_TYPES, default_src_types, to_strings};
use cspkit_domain::{Directive, Policy};
use cspkit_types::ids;
use std::collections::BTreeMap;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PolicyParserConfig {
    pub directive: DirectiveParserConfig,
    /// Directives whose leading type token is listed here are skipped without error.
    pub ignored_types: Vec<String>,
    /// Replace `default-src` by copies for every type in `default_src_types` not already set.
    pub expand_default_src: bool,
    pub default_src_types: Vec<String>,
}

impl Default for PolicyParserConfig {
    fn default() -> Self {
        Self {
            directive: DirectiveParserConfig::default(),
            ignored_types: to_strings(IGNORED_DIRECTIVE_TYPES),
            expand_default_src: true,
            default_src_types: default_src_types(),
        }
    }
}

/// Parses `;`-separated policy headers into [`Policy`] values.
///
/// The first directive of each type wins; later duplicates are dropped. In strict mode any
/// segment that does not parse, blank ones included, makes the whole policy `Policy::INVALID`.
/// A policy with no parsed directives is `Policy::INVALID` as well.
#[derive(Clone, Debug)]
pub struct PolicyParser {
    directives: DirectiveParser,
    ignored_types: Vec<String>,
    expand_default_src: bool,
    default_src_types: Vec<String>,
}

impl Default for PolicyParser {
    fn default() -> Self {
        Self::new(PolicyParserConfig::default())
    }
}

impl PolicyParser {
    pub fn new(config: PolicyParserConfig) -> Self {
        Self {
            directives: DirectiveParser::new(config.directive),
            ignored_types: config.ignored_types,
            expand_default_src: config.expand_default_src,
            default_src_types: config.default_src_types,
        }
    }

    pub fn parse(&self, input: &str) -> Policy {
        let strict = self.directives.is_strict();
        let mut by_type: BTreeMap<String, Directive> = BTreeMap::new();

        for segment in input.split(';') {
            if self.is_ignored(segment) {
                continue;
            }
            // Blank segments parse as invalid too.
            let directive = self.directives.parse(segment);
            if directive == Directive::INVALID {
                if strict {
                    return Policy::INVALID;
                }
                continue;
            }
            // Browser phrases hold their type's slot until `Policy::new` drops them.
            by_type
                .entry(directive.directive_type().to_string())
                .or_insert(directive);
        }

        if self.expand_default_src
            && let Some(default) = by_type.remove(ids::DEFAULT_SRC)
        {
            for ty in &self.default_src_types {
                by_type
                    .entry(ty.clone())
                    .or_insert_with(|| Directive::new(ty.as_str(), default.whitelist().iter().cloned()));
            }
        }

        if by_type.is_empty() {
            return Policy::INVALID;
        }
        Policy::new(by_type.into_values())
    }

    fn is_ignored(&self, segment: &str) -> bool {
        let Some(leading) = segment.split_whitespace().next() else {
            return false;
        };
        self.ignored_types
            .iter()
            .any(|ignored| leading.eq_ignore_ascii_case(ignored))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cspkit_domain::{SourceExpression, UriSourceExpression};

    fn src(scheme: Option<&str>, host: Option<&str>, path: Option<&str>) -> SourceExpression {
        UriSourceExpression::new(scheme, host, None, path).into()
    }

    fn seclab() -> SourceExpression {
        src(Some("http"), Some("seclab.nu"), None)
    }

    fn connect_directive() -> Directive {
        Directive::new(
            ids::CONNECT_SRC,
            [
                SourceExpression::SelfRef,
                src(Some("chrome-extension"), None, None),
                src(Some("https"), Some("abc.seclab.nu"), Some("/path")),
            ],
        )
    }

    fn img_none() -> Directive {
        Directive::new(ids::IMG_SRC, [])
    }

    fn parser(f: impl FnOnce(&mut PolicyParserConfig)) -> PolicyParser {
        let mut config = PolicyParserConfig::default();
        f(&mut config);
        PolicyParser::new(config)
    }

    #[test]
    fn parses_multiple_directives() {
        let policy = PolicyParser::default()
            .parse("connect-src 'self' https://abc.seclab.nu/path chrome-extension:; img-src 'none'");
        assert_eq!(policy, Policy::new([connect_directive(), img_none()]));
    }

    #[test]
    fn strict_mode_rejects_invalid_segments() {
        let input = "img-src 'none'; script-src";
        assert_eq!(PolicyParser::default().parse(input), Policy::INVALID);
        assert_eq!(
            parser(|c| c.directive.strict = false).parse(input),
            Policy::new([img_none()])
        );
    }

    #[test]
    fn ignored_directives_are_skipped() {
        let policy = parser(|c| c.ignored_types = vec![ids::REPORT_URI.to_string()])
            .parse("img-src *; report-uri /csp.cgi");
        assert_eq!(
            policy,
            Policy::new([Directive::new(ids::IMG_SRC, [src(None, Some("*"), None)])])
        );
        assert_eq!(
            PolicyParser::default().parse("script-src 'self'; sandbox; REPORT-URI /r"),
            Policy::new([Directive::new(ids::SCRIPT_SRC, [SourceExpression::SelfRef])])
        );
    }

    #[test]
    fn default_src_fans_out_to_missing_types() {
        let p = parser(|c| {
            c.default_src_types = vec![ids::IMG_SRC.to_string(), ids::CONNECT_SRC.to_string()];
        });
        let policy = p.parse(
            "default-src 'self' http://seclab.nu; connect-src 'self' https://abc.seclab.nu/path chrome-extension:",
        );
        assert_eq!(
            policy,
            Policy::new([
                connect_directive(),
                Directive::new(ids::IMG_SRC, [seclab(), SourceExpression::SelfRef]),
            ])
        );
    }

    #[test]
    fn default_src_is_kept_without_expansion() {
        let p = parser(|c| {
            c.expand_default_src = false;
            c.default_src_types = vec![ids::IMG_SRC.to_string(), ids::CONNECT_SRC.to_string()];
        });
        assert_eq!(
            p.parse("default-src 'self' http://seclab.nu"),
            Policy::new([Directive::new(ids::DEFAULT_SRC, [seclab(), SourceExpression::SelfRef])])
        );
    }

    #[test]
    fn first_directive_of_a_type_wins() {
        let policy = PolicyParser::default().parse(
            "connect-src 'self' chrome-extension: https://abc.seclab.nu/path; \
             font-src 'self' http://seclab.nu; \
             connect-src 'self' https://example.com",
        );
        assert_eq!(
            policy,
            Policy::new([
                connect_directive(),
                Directive::new(ids::FONT_SRC, [seclab(), SourceExpression::SelfRef]),
            ])
        );
    }

    #[test]
    fn empty_input_is_invalid() {
        assert_eq!(PolicyParser::default().parse(""), Policy::INVALID);
        assert_eq!(PolicyParser::default().parse(" ; ;"), Policy::INVALID);
        assert_eq!(PolicyParser::default().parse("report-uri /x"), Policy::INVALID);
    }

    #[test]
    fn blank_segments_follow_strictness() {
        let strict = PolicyParser::default();
        let lenient = parser(|c| c.directive.strict = false);
        let star = Directive::new(ids::IMG_SRC, [src(None, Some("*"), None)]);
        let script_self = Directive::new(ids::SCRIPT_SRC, [SourceExpression::SelfRef]);

        assert_eq!(strict.parse("img-src 'none';"), Policy::INVALID);
        assert_eq!(strict.parse("img-src *;"), Policy::INVALID);
        assert_eq!(strict.parse("img-src *; ; script-src 'self'"), Policy::INVALID);

        assert_eq!(lenient.parse("img-src 'none';"), Policy::new([img_none()]));
        assert_eq!(
            lenient.parse("img-src *; ; script-src 'self'"),
            Policy::new([star, script_self])
        );
    }

    #[test]
    fn browser_phrase_claims_its_type() {
        let policy = PolicyParser::default()
            .parse("inline style base restriction; style-src 'self'; img-src 'none'");
        assert_eq!(policy, Policy::new([img_none()]));
        assert!(policy.directive(ids::STYLE_SRC).is_none());

        let alone = PolicyParser::default().parse("eval script base restriction");
        assert!(!alone.is_invalid());
        assert!(alone.is_empty());
    }

    #[test]
    fn browser_phrase_blocks_default_src_fan_out_for_its_type() {
        let policy = PolicyParser::default()
            .parse("inline script base restriction; default-src 'self'");
        assert!(policy.directive(ids::SCRIPT_SRC).is_none());
        assert_eq!(
            policy.directive(ids::IMG_SRC),
            Some(&Directive::new(ids::IMG_SRC, [SourceExpression::SelfRef]))
        );
    }

    #[test]
    fn display_output_reparses_to_the_same_policy() {
        let p = PolicyParser::default();
        let policy = p.parse(
            "default-src 'self'; script-src 'self' 'unsafe-inline' https://cdn.example.com; img-src *",
        );
        assert!(!policy.is_invalid());
        assert_eq!(p.parse(&policy.to_string()), policy);
    }
}
