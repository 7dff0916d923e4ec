use crate::directive::Directive;
use crate::policy::Policy;
use crate::source_expression::{PortSpec, SourceExpression, UriSourceExpression};
use crate::uri::Uri;

pub fn uri(
    scheme: Option<&str>,
    host: &str,
    port: Option<u16>,
    path: Option<&str>,
    query: Option<&str>,
) -> Uri {
    Uri::new(scheme, host, port, path, query)
}

pub fn src(
    scheme: Option<&str>,
    host: Option<&str>,
    port: Option<PortSpec>,
    path: Option<&str>,
) -> SourceExpression {
    SourceExpression::UriMatch(UriSourceExpression::new(scheme, host, port, path))
}

pub fn directive<const N: usize>(directive_type: &str, whitelist: [SourceExpression; N]) -> Directive {
    Directive::new(directive_type, whitelist)
}

pub fn policy<const N: usize>(directives: [Directive; N]) -> Policy {
    Policy::new(directives)
}
