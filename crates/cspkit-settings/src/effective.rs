use cspkit_domain::SchemePorts;
use cspkit_parser::{PolicyParser, PolicyParserConfig, UriParser, UriParserConfig};
use cspkit_report::{LogEntryParser, LogEntryParserConfig, ReportParser, ReportParserConfig};

/// Fully resolved settings: parser configurations ready to build parsers from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EffectiveSettings {
    pub profile: String,
    pub strict: bool,
    /// For standalone URIs such as resources and protected documents.
    pub uri: UriParserConfig,
    pub policy: PolicyParserConfig,
    pub report: ReportParserConfig,
    pub scheme_only: Vec<String>,
}

impl EffectiveSettings {
    pub fn scheme_ports(&self) -> &SchemePorts {
        &self.uri.scheme_ports
    }

    pub fn uri_parser(&self) -> UriParser {
        UriParser::new(self.uri.clone())
    }

    pub fn policy_parser(&self) -> PolicyParser {
        PolicyParser::new(self.policy.clone())
    }

    pub fn report_parser(&self) -> ReportParser {
        ReportParser::new(self.report.clone())
    }

    pub fn log_entry_parser(&self) -> LogEntryParser {
        LogEntryParser::new(LogEntryParserConfig {
            report: ReportParserConfig {
                policy: PolicyParserConfig {
                    expand_default_src: false,
                    ..self.report.policy.clone()
                },
                ..self.report.clone()
            },
            ..LogEntryParserConfig::default()
        })
    }
}
