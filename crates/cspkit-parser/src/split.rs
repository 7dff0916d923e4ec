//! Generic URI splitting into scheme, netloc, path and query.
//!
//! The rules are deliberately loose (they accept things like `host:80/path` and treat the
//! first colon-delimited token as a candidate scheme); callers retry with a synthetic
//! `http://` prefix when no netloc was found.

use cspkit_domain::tables::is_no_double_slash_scheme;
use cspkit_domain::SchemePorts;
use regex::Regex;

/// Schemes whose last path segment may carry `;params`, which are dropped.
const PARAM_SCHEMES: &[&str] = &[
    "", "ftp", "hdl", "prospero", "http", "imap", "https", "shttp", "rtsp", "rtspu", "sip",
    "sips", "mms", "sftp", "tel",
];

#[derive(Debug, PartialEq, Eq)]
pub(crate) struct UriParts {
    /// Lower-cased; empty when absent.
    pub scheme: String,
    pub netloc: String,
    pub path: String,
    pub query: String,
}

pub(crate) fn split_parts(input: &str) -> UriParts {
    let mut scheme = String::new();
    let mut rest = input;
    if let Some(i) = input.find(':')
        && i > 0
    {
        let candidate = &input[..i];
        let after = &input[i + 1..];
        let looks_like_port = !after.is_empty() && after.bytes().all(|b| b.is_ascii_digit());
        if candidate == "http" || (candidate.chars().all(is_scheme_char) && !looks_like_port) {
            scheme = candidate.to_ascii_lowercase();
            rest = after;
        }
    }

    let mut netloc = "";
    if let Some(stripped) = rest.strip_prefix("//") {
        let end = stripped.find(['/', '?', '#']).unwrap_or(stripped.len());
        netloc = &stripped[..end];
        rest = &stripped[end..];
    }
    let rest = rest.split_once('#').map_or(rest, |(before, _)| before);
    let (mut path, query) = rest.split_once('?').unwrap_or((rest, ""));
    if PARAM_SCHEMES.contains(&scheme.as_str()) {
        path = strip_params(path);
    }

    UriParts {
        scheme,
        netloc: netloc.to_string(),
        path: path.to_string(),
        query: query.to_string(),
    }
}

fn is_scheme_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.')
}

fn strip_params(path: &str) -> &str {
    let segment_start = path.rfind('/').unwrap_or(0);
    match path[segment_start..].find(';') {
        Some(i) => &path[..segment_start + i],
        None => path,
    }
}

/// Intermediate result shared by the URI and source expression parsers.
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum Split {
    Empty,
    Invalid,
    /// The input was a known scheme name, optionally followed by `:` or `://`.
    SchemeOnly(String),
    /// `scheme:data` for schemes without `//`; the data is kept verbatim.
    Opaque { scheme: String, data: String },
    Hierarchical {
        scheme: Option<String>,
        host: String,
        port: Option<String>,
        path: String,
        query: String,
    },
}

/// Trim, classify and split `input`. `netloc` must have `host` and `port` capture groups.
pub(crate) fn split_uri(input: &str, known: &SchemePorts, netloc: &Regex) -> Split {
    let input = input.trim();
    if input.is_empty() || input.eq_ignore_ascii_case("null") {
        return Split::Empty;
    }

    let lower = input.to_ascii_lowercase();
    let bare_scheme = [
        Some(lower.as_str()),
        lower.strip_suffix(':'),
        lower.strip_suffix("://"),
    ]
    .into_iter()
    .flatten()
    .find(|candidate| known.contains(candidate));
    if let Some(scheme) = bare_scheme {
        return Split::SchemeOnly(scheme.to_string());
    }

    let mut parts = split_parts(input);
    if is_no_double_slash_scheme(&parts.scheme) {
        return Split::Opaque {
            scheme: parts.scheme,
            data: parts.path,
        };
    }

    let mut scheme = Some(std::mem::take(&mut parts.scheme)).filter(|s| !s.is_empty());
    if parts.netloc.is_empty() {
        parts = split_parts(&format!("http://{input}"));
        scheme = None;
    }

    let Some(captures) = netloc.captures(&parts.netloc) else {
        return Split::Invalid;
    };
    let Some(host) = captures.name("host") else {
        return Split::Invalid;
    };
    Split::Hierarchical {
        scheme,
        host: host.as_str().to_ascii_lowercase(),
        port: captures.name("port").map(|m| m.as_str().to_string()),
        path: parts.path,
        query: parts.query,
    }
}
