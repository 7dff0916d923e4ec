//! Whitelist entries and the matching rules of CSP level 1.1.

use crate::percent::percent_encode_path;
use crate::tables::SchemePorts;
use crate::uri::Uri;
use cspkit_types::ids;
use std::fmt;

/// Port part of a host source: a number or `*`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PortSpec {
    Number(u16),
    Wildcard,
}

impl fmt::Display for PortSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PortSpec::Number(port) => write!(f, "{port}"),
            PortSpec::Wildcard => f.write_str("*"),
        }
    }
}

/// A `scheme:` or `[scheme://]host[:port][path]` source.
///
/// Scheme and host are stored lower-cased; empty strings are stored as absent.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UriSourceExpression {
    scheme: Option<String>,
    host: Option<String>,
    port: Option<PortSpec>,
    path: Option<String>,
}

impl UriSourceExpression {
    pub fn new(
        scheme: Option<&str>,
        host: Option<&str>,
        port: Option<PortSpec>,
        path: Option<&str>,
    ) -> Self {
        Self {
            scheme: lowercase_non_empty(scheme),
            host: lowercase_non_empty(host),
            port,
            path: path.filter(|p| !p.is_empty()).map(str::to_string),
        }
    }

    /// The bare `*` source.
    pub fn any() -> Self {
        Self::new(None, Some("*"), None, None)
    }

    pub fn scheme(&self) -> Option<&str> {
        self.scheme.as_deref()
    }

    pub fn host(&self) -> Option<&str> {
        self.host.as_deref()
    }

    pub fn port(&self) -> Option<PortSpec> {
        self.port
    }

    pub fn path(&self) -> Option<&str> {
        self.path.as_deref()
    }

    pub fn without_path(&self) -> Self {
        Self {
            path: None,
            ..self.clone()
        }
    }

    /// Keep only the scheme. Without a scheme there is nothing left to match on.
    pub fn scheme_only(&self) -> SourceExpression {
        match &self.scheme {
            Some(scheme) => SourceExpression::UriMatch(Self::new(Some(scheme), None, None, None)),
            None => SourceExpression::Invalid,
        }
    }

    fn is_any(&self) -> bool {
        self.scheme.is_none()
            && self.host.as_deref() == Some("*")
            && self.port.is_none()
            && self.path.is_none()
    }

    fn is_scheme_only(&self) -> bool {
        self.scheme.is_some() && self.host.is_none() && self.port.is_none() && self.path.is_none()
    }

    pub fn matches(&self, resource: &Uri, document: &Uri, ports: &SchemePorts) -> bool {
        if !resource.is_regular() {
            return false;
        }
        if self.is_any() {
            return true;
        }

        let resource_scheme = resource.scheme().map(str::to_ascii_lowercase);
        let resource_scheme = resource_scheme.as_deref();
        if self.is_scheme_only() {
            return self.scheme.as_deref() == resource_scheme;
        }

        let resource_host = resource.host().to_ascii_lowercase();
        let known_default = resource_scheme.and_then(|s| ports.lookup(s));
        let resource_port = resource.port().or(known_default.flatten());
        let resource_path = resource.path().unwrap_or("/");

        match self.scheme.as_deref() {
            Some(scheme) => {
                if Some(scheme) != resource_scheme {
                    return false;
                }
            }
            None => {
                let Some(document_scheme) = document.scheme().map(str::to_ascii_lowercase) else {
                    return false;
                };
                if document_scheme == "http" {
                    if !matches!(resource_scheme, Some("http" | "https")) {
                        return false;
                    }
                } else if Some(document_scheme.as_str()) != resource_scheme {
                    return false;
                }
            }
        }

        if let Some(host) = self.host.as_deref() {
            if let Some(suffix) = host.strip_prefix('*') {
                if !suffix.is_empty() && !resource_host.ends_with(suffix) {
                    return false;
                }
            } else if host != resource_host {
                return false;
            }
        }

        match self.port {
            None => {
                if let Some(default) = known_default
                    && resource_port != default
                {
                    return false;
                }
            }
            Some(PortSpec::Number(port)) => {
                if resource_port != Some(port) {
                    return false;
                }
            }
            Some(PortSpec::Wildcard) => {}
        }

        match self.path.as_deref() {
            Some(path) if path.ends_with('/') => resource_path.starts_with(path),
            Some(path) => path == resource_path,
            None => true,
        }
    }
}

impl fmt::Display for UriSourceExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_scheme_only()
            && let Some(scheme) = &self.scheme
        {
            return write!(f, "{scheme}:");
        }
        if let Some(scheme) = &self.scheme {
            write!(f, "{scheme}://")?;
        }
        if let Some(host) = &self.host {
            f.write_str(host)?;
        }
        if let Some(port) = self.port {
            write!(f, ":{port}")?;
        }
        if let Some(path) = &self.path {
            f.write_str(&percent_encode_path(path))?;
        }
        Ok(())
    }
}

/// One entry of a directive whitelist.
///
/// Nonce and hash sources are not modelled.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SourceExpression {
    UriMatch(UriSourceExpression),
    SelfRef,
    UnsafeInline,
    UnsafeEval,
    Invalid,
}

impl SourceExpression {
    pub fn is_invalid(&self) -> bool {
        matches!(self, SourceExpression::Invalid)
    }

    /// Whether loading `resource` from within `document` is allowed by this entry.
    ///
    /// `resource` should have a decoded path; directories end in `/`.
    pub fn matches(&self, resource: &Uri, document: &Uri, ports: &SchemePorts) -> bool {
        match self {
            SourceExpression::UriMatch(expr) => expr.matches(resource, document, ports),
            SourceExpression::SelfRef => matches_self(resource, document, ports),
            SourceExpression::UnsafeInline => *resource == Uri::INLINE,
            SourceExpression::UnsafeEval => *resource == Uri::EVAL,
            SourceExpression::Invalid => false,
        }
    }

    /// Drops the path of a URI source; keywords are returned unchanged.
    pub fn without_path(&self) -> Self {
        match self {
            SourceExpression::UriMatch(expr) => SourceExpression::UriMatch(expr.without_path()),
            other => other.clone(),
        }
    }

    /// Reduces a URI source to `scheme:`; keywords are returned unchanged.
    pub fn scheme_only(&self) -> Self {
        match self {
            SourceExpression::UriMatch(expr) => expr.scheme_only(),
            other => other.clone(),
        }
    }
}

impl From<UriSourceExpression> for SourceExpression {
    fn from(expr: UriSourceExpression) -> Self {
        SourceExpression::UriMatch(expr)
    }
}

impl fmt::Display for SourceExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceExpression::UriMatch(expr) => expr.fmt(f),
            SourceExpression::SelfRef => f.write_str(ids::KEYWORD_SELF),
            SourceExpression::UnsafeInline => f.write_str(ids::KEYWORD_UNSAFE_INLINE),
            SourceExpression::UnsafeEval => f.write_str(ids::KEYWORD_UNSAFE_EVAL),
            SourceExpression::Invalid => f.write_str("[invalid]"),
        }
    }
}

fn matches_self(resource: &Uri, document: &Uri, ports: &SchemePorts) -> bool {
    if !resource.is_regular() {
        return false;
    }
    let (Some(document_scheme), Some(resource_scheme)) = (document.scheme(), resource.scheme())
    else {
        return false;
    };
    let document_scheme = document_scheme.to_ascii_lowercase();
    let resource_scheme = resource_scheme.to_ascii_lowercase();
    let document_port = document.port().or_else(|| ports.default_port(&document_scheme));
    let resource_port = resource.port().or_else(|| ports.default_port(&resource_scheme));
    let (Some(document_port), Some(resource_port)) = (document_port, resource_port) else {
        return false;
    };
    document_scheme == resource_scheme
        && document.host().eq_ignore_ascii_case(resource.host())
        && document_port == resource_port
}

fn lowercase_non_empty(value: Option<&str>) -> Option<String> {
    value.filter(|v| !v.is_empty()).map(str::to_ascii_lowercase)
}
