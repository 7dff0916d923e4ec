use crate::percent::percent_encode_path;
use crate::tables::is_no_double_slash_scheme;
use std::fmt;

/// What a [`Uri`] stands for.
///
/// Only `Regular` URIs carry meaningful components. `Inline` and `Eval` are the match targets
/// for inline code and `eval()`-style execution.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum UriKind {
    Regular,
    Empty,
    Invalid,
    Inline,
    Eval,
}

/// A parsed resource or document location.
///
/// Equality is structural over every component plus the kind. Empty strings passed for the
/// scheme, path or query are stored as absent.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Uri {
    kind: UriKind,
    scheme: Option<String>,
    host: String,
    port: Option<u16>,
    path: Option<String>,
    query: Option<String>,
}

impl Uri {
    pub const EMPTY: Uri = Uri::sentinel(UriKind::Empty);
    pub const INVALID: Uri = Uri::sentinel(UriKind::Invalid);
    pub const INLINE: Uri = Uri::sentinel(UriKind::Inline);
    pub const EVAL: Uri = Uri::sentinel(UriKind::Eval);

    pub fn new(
        scheme: Option<&str>,
        host: &str,
        port: Option<u16>,
        path: Option<&str>,
        query: Option<&str>,
    ) -> Self {
        Self {
            kind: UriKind::Regular,
            scheme: non_empty(scheme),
            host: host.to_string(),
            port,
            path: non_empty(path),
            query: non_empty(query),
        }
    }

    /// A URI consisting of a scheme only (`data:`, `chrome-extension:`).
    pub fn scheme_only(scheme: &str) -> Self {
        Self::new(Some(scheme), "", None, None, None)
    }

    const fn sentinel(kind: UriKind) -> Self {
        Self {
            kind,
            scheme: None,
            host: String::new(),
            port: None,
            path: None,
            query: None,
        }
    }

    pub fn kind(&self) -> UriKind {
        self.kind
    }

    pub fn is_regular(&self) -> bool {
        self.kind == UriKind::Regular
    }

    pub fn scheme(&self) -> Option<&str> {
        self.scheme.as_deref()
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> Option<u16> {
        self.port
    }

    /// Decoded path (no `%`-escapes), if any.
    pub fn path(&self) -> Option<&str> {
        self.path.as_deref()
    }

    pub fn query(&self) -> Option<&str> {
        self.query.as_deref()
    }

    /// Same scheme, host and port; no path and no query. Sentinels are returned unchanged.
    pub fn without_path(&self) -> Self {
        if !self.is_regular() {
            return self.clone();
        }
        Self {
            kind: UriKind::Regular,
            scheme: self.scheme.clone(),
            host: self.host.clone(),
            port: self.port,
            path: None,
            query: None,
        }
    }

    fn is_scheme_only(&self) -> bool {
        self.scheme.is_some()
            && self.host.is_empty()
            && self.port.is_none()
            && self.path.is_none()
            && self.query.is_none()
    }
}

impl fmt::Display for Uri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            UriKind::Invalid => return f.write_str("[invalid]"),
            UriKind::Empty => return Ok(()),
            UriKind::Inline => return f.write_str("[inline]"),
            UriKind::Eval => return f.write_str("[eval]"),
            UriKind::Regular => {}
        }
        if self.is_scheme_only()
            && let Some(scheme) = &self.scheme
        {
            return write!(f, "{scheme}:");
        }
        match self.scheme.as_deref() {
            Some(scheme) if is_no_double_slash_scheme(scheme) => write!(f, "{scheme}:")?,
            Some(scheme) => write!(f, "{scheme}://")?,
            None => {}
        }
        f.write_str(&self.host)?;
        if let Some(port) = self.port {
            write!(f, ":{port}")?;
        }
        if let Some(path) = &self.path {
            f.write_str(&percent_encode_path(path))?;
        }
        if let Some(query) = &self.query {
            write!(f, "?{query}")?;
        }
        Ok(())
    }
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value.filter(|v| !v.is_empty()).map(str::to_string)
}
