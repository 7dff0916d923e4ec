use crate::split::{Split, split_uri};
use cspkit_domain::percent::percent_decode;
use cspkit_domain::{PortSpec, SchemePorts, SourceExpression, UriSourceExpression};
use cspkit_types::ids;
use regex::Regex;
use std::sync::LazyLock;

/// Host (optionally `*` or `*.`-prefixed) and optional numeric or `*` port. No user info.
static SOURCE_NETLOC: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(?P<host>\*|(\*\.)?[A-Za-z0-9._-]+)(:(?P<port>\*|[0-9]+))?$")
        .expect("source netloc regex is valid")
});

/// Parses one whitelist token into a [`SourceExpression`].
///
/// Only schemes present in the configured table are accepted; an explicit unknown scheme yields
/// `SourceExpression::Invalid`. Queries are ignored and paths are percent-decoded.
#[derive(Clone, Debug, Default)]
pub struct SourceExpressionParser {
    known_schemes: SchemePorts,
}

impl SourceExpressionParser {
    pub fn new(known_schemes: SchemePorts) -> Self {
        Self { known_schemes }
    }

    pub fn known_schemes(&self) -> &SchemePorts {
        &self.known_schemes
    }

    pub fn parse(&self, input: &str) -> SourceExpression {
        let input = input.trim();
        if input.eq_ignore_ascii_case(ids::KEYWORD_UNSAFE_EVAL) {
            return SourceExpression::UnsafeEval;
        }
        if input.eq_ignore_ascii_case(ids::KEYWORD_UNSAFE_INLINE) {
            return SourceExpression::UnsafeInline;
        }
        if input.eq_ignore_ascii_case(ids::KEYWORD_SELF) {
            return SourceExpression::SelfRef;
        }
        if input == "*" {
            return UriSourceExpression::any().into();
        }

        match split_uri(input, &self.known_schemes, &SOURCE_NETLOC) {
            Split::Empty | Split::Invalid => SourceExpression::Invalid,
            Split::SchemeOnly(scheme) => {
                UriSourceExpression::new(Some(&scheme), None, None, None).into()
            }
            Split::Opaque { scheme, data } => {
                if !self.known_schemes.contains(&scheme) {
                    return SourceExpression::Invalid;
                }
                UriSourceExpression::new(Some(&scheme), Some(&data), None, None).into()
            }
            Split::Hierarchical {
                scheme,
                host,
                port,
                path,
                query: _,
            } => {
                if let Some(scheme) = &scheme
                    && !self.known_schemes.contains(scheme)
                {
                    return SourceExpression::Invalid;
                }
                let port = match port.as_deref() {
                    None => None,
                    Some("*") => Some(PortSpec::Wildcard),
                    Some(digits) => match digits.parse::<u16>() {
                        Ok(port) => Some(PortSpec::Number(port)),
                        Err(_) => return SourceExpression::Invalid,
                    },
                };
                let Some(path) = percent_decode(&path) else {
                    return SourceExpression::Invalid;
                };
                UriSourceExpression::new(scheme.as_deref(), Some(&host), port, Some(&path)).into()
            }
        }
    }
}
