use crate::split::{Split, split_uri};
use cspkit_domain::percent::percent_decode;
use cspkit_domain::tables::{DEFAULT_PORT, DEFAULT_SCHEME};
use cspkit_domain::{PortSchemes, SchemePorts, Uri};
use regex::Regex;
use std::sync::LazyLock;

/// Optional `user[:password]@`, then host and optional numeric port.
static URI_NETLOC: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?i)^(([A-Za-z0-9`~!#$%^&*()_+={}\[\]\\|;"<>,./?-]+)(:([A-Za-z0-9`~!#$%^&*()_+={}\[\]\\|;"<>,./?-]+))?@)?(?P<host>[A-Za-z0-9._-]+)(:(?P<port>[0-9]+))?$"#,
    )
    .expect("netloc regex is valid")
});

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UriParserConfig {
    /// Fill a missing scheme from `port_schemes`, else `default_scheme`.
    pub add_scheme: bool,
    pub default_scheme: String,
    /// Fill a missing port from `scheme_ports`, else `default_port`.
    pub add_port: bool,
    pub default_port: u16,
    pub scheme_ports: SchemePorts,
    pub port_schemes: PortSchemes,
    /// Percent-decode the path (not the query).
    pub decode: bool,
}

impl Default for UriParserConfig {
    fn default() -> Self {
        Self {
            add_scheme: true,
            default_scheme: DEFAULT_SCHEME.to_string(),
            add_port: false,
            default_port: DEFAULT_PORT,
            scheme_ports: SchemePorts::default(),
            port_schemes: PortSchemes::default(),
            decode: true,
        }
    }
}

/// Parses strings into [`Uri`]s. Never fails: bad input yields `Uri::EMPTY` or `Uri::INVALID`.
///
/// User info and fragments are always dropped. Scheme and host are lower-cased, except for the
/// opaque data of `data:`, `about:` and `view-source:` URIs. IPv6 literals and punycode are not
/// supported.
#[derive(Clone, Debug, Default)]
pub struct UriParser {
    config: UriParserConfig,
}

impl UriParser {
    pub fn new(config: UriParserConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &UriParserConfig {
        &self.config
    }

    pub fn parse(&self, input: &str) -> Uri {
        let cfg = &self.config;
        let (scheme, host, port, path, query) =
            match split_uri(input, &cfg.scheme_ports, &URI_NETLOC) {
                Split::Empty => return Uri::EMPTY,
                Split::Invalid => return Uri::INVALID,
                Split::SchemeOnly(scheme) => return Uri::scheme_only(&scheme),
                Split::Opaque { scheme, data } => {
                    return Uri::new(Some(&scheme), &data, None, None, None);
                }
                Split::Hierarchical {
                    scheme,
                    host,
                    port,
                    path,
                    query,
                } => (scheme, host, port, path, query),
            };

        let mut port = match port.map(|p| p.parse::<u16>()) {
            Some(Ok(port)) => Some(port),
            Some(Err(_)) => return Uri::INVALID,
            None => None,
        };

        let mut scheme = scheme;
        if cfg.add_scheme && scheme.is_none() {
            let inferred = port.and_then(|p| cfg.port_schemes.lookup(p));
            scheme = Some(inferred.unwrap_or(&cfg.default_scheme).to_string());
        }
        if cfg.add_port && port.is_none() {
            port = match scheme.as_deref().and_then(|s| cfg.scheme_ports.lookup(s)) {
                Some(known) => known,
                None => Some(cfg.default_port),
            };
        }

        let path = if cfg.decode {
            match percent_decode(&path) {
                Some(decoded) => decoded,
                None => return Uri::INVALID,
            }
        } else {
            path
        };

        Uri::new(scheme.as_deref(), &host, port, Some(&path), Some(&query))
    }
}
