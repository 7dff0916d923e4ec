//! The `generate` use case: derive a policy from observed violations.
//!
//! Every stored report (or log entry) yields one basic policy allowing what was blocked. The
//! basic policies are combined into a single policy that would have allowed all of them.

use anyhow::Context;
use camino::{Utf8Path, Utf8PathBuf};
use cspkit_domain::{Policy, ReportType};
use cspkit_report::{LogEntry, Report};
use cspkit_settings::EffectiveSettings;
use cspkit_store::{LineParser, TypedReader};
use cspkit_types::{GenerateReceipt, SCHEMA_GENERATE_V1, ToolMeta};
use rayon::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GenerateSource {
    /// One report per line; all reports share `report_type`.
    Reports {
        path: Utf8PathBuf,
        report_type: ReportType,
    },
    /// One log entry per line; each carries its own `policy-type`.
    LogEntries { path: Utf8PathBuf },
}

#[derive(Clone, Debug)]
pub struct GenerateInput {
    pub source: GenerateSource,
    pub strip_paths: bool,
}

#[derive(Clone, Debug)]
pub struct GenerateOutput {
    pub policy: Policy,
    pub receipt: GenerateReceipt,
}

/// Counts gathered while reading and generating.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
struct Tally {
    parsed: usize,
    unparsable: usize,
    generated: usize,
}

pub fn run_generate(
    settings: &EffectiveSettings,
    input: GenerateInput,
) -> anyhow::Result<GenerateOutput> {
    let (generated, tally) = match &input.source {
        GenerateSource::Reports { path, report_type } => {
            let report_type = *report_type;
            generate_from(
                TypedReader::new(settings.report_parser(), true),
                path,
                |report: &Report| report.generate_policy(report_type),
            )?
        }
        GenerateSource::LogEntries { path } => generate_from(
            TypedReader::new(settings.log_entry_parser(), true),
            path,
            |entry: &LogEntry| entry.generate_policy(),
        )?,
    };

    let mut policy = generated
        .iter()
        .try_fold(Policy::new([]), |acc, basic| {
            let combined = acc.combined_policy(basic);
            (!combined.is_invalid()).then_some(combined)
        })
        .context("generated policies cannot be combined")?;
    if input.strip_paths {
        policy = policy.without_paths(&settings.scheme_only);
    }

    let entries_read = tally.parsed + tally.unparsable;
    let entries_skipped = entries_read - tally.generated;
    tracing::info!(
        entries_read,
        policies_generated = tally.generated,
        entries_skipped,
        "generated policy"
    );

    let receipt = GenerateReceipt {
        schema: SCHEMA_GENERATE_V1.to_string(),
        tool: ToolMeta::current(),
        policy: policy.to_string(),
        entries_read: entries_read as u64,
        policies_generated: tally.generated as u64,
        entries_skipped: entries_skipped as u64,
    };
    Ok(GenerateOutput { policy, receipt })
}

fn generate_from<P>(
    reader: TypedReader<P>,
    path: &Utf8Path,
    generate: impl Fn(&P::Output) -> Policy + Sync,
) -> anyhow::Result<(Vec<Policy>, Tally)>
where
    P: LineParser,
    P::Output: Sync,
{
    let mut entries = Vec::new();
    let unparsable = reader
        .load(path, |entry| entries.push(entry))
        .context("load entries")?;
    let generated: Vec<Policy> = entries
        .par_iter()
        .map(&generate)
        .filter(|policy| !policy.is_invalid())
        .collect();
    let tally = Tally {
        parsed: entries.len(),
        unparsable,
        generated: generated.len(),
    };
    Ok((generated, tally))
}

#[cfg(test)]
mod tests {
    use super::*;
    use cspkit_settings::Overrides;
    use tempfile::TempDir;

    const SCRIPT_REPORT: &str = r#"{"document-uri":"http://seclab.nu/","violated-directive":"script-src 'self'","blocked-uri":"http://evil.com/x.js"}"#;
    const IMG_REPORT: &str = r#"{"document-uri":"http://seclab.nu/","violated-directive":"img-src 'none'","blocked-uri":"http://cdn.com/a.png"}"#;
    const DEFAULT_REPORT: &str = r#"{"document-uri":"http://seclab.nu/","violated-directive":"default-src 'none'","blocked-uri":"http://cdn.com/a.png"}"#;
    const INLINE_REPORT: &str = r#"{"document-uri":"http://seclab.nu/","violated-directive":"inline script base restriction","blocked-uri":""}"#;

    fn write_lines(lines: &[&str]) -> (TempDir, Utf8PathBuf) {
        let temp = tempfile::tempdir().expect("tempdir");
        let root = Utf8PathBuf::from_path_buf(temp.path().to_path_buf()).expect("utf8 path");
        let path = root.join("input.jsonl");
        std::fs::write(&path, lines.join("\n")).expect("write input");
        (temp, path)
    }

    fn generate(source: GenerateSource, strip_paths: bool) -> GenerateOutput {
        let settings = crate::load_settings("", Overrides::default()).expect("settings");
        run_generate(
            &settings,
            GenerateInput {
                source,
                strip_paths,
            },
        )
        .expect("generate")
    }

    #[test]
    fn reports_combine_into_one_policy() {
        let (_temp, path) = write_lines(&[SCRIPT_REPORT, "not json", IMG_REPORT, DEFAULT_REPORT]);
        let out = generate(
            GenerateSource::Reports {
                path,
                report_type: ReportType::Regular,
            },
            false,
        );
        insta::assert_snapshot!(
            out.policy,
            @"img-src http://cdn.com/a.png; script-src http://evil.com/x.js"
        );
        assert_eq!(out.receipt.entries_read, 4);
        assert_eq!(out.receipt.policies_generated, 2);
        assert_eq!(out.receipt.entries_skipped, 2);
        assert_eq!(out.receipt.policy, out.policy.to_string());
    }

    #[test]
    fn strip_paths_applies_to_the_result() {
        let (_temp, path) = write_lines(&[SCRIPT_REPORT, IMG_REPORT]);
        let out = generate(
            GenerateSource::Reports {
                path,
                report_type: ReportType::Regular,
            },
            true,
        );
        insta::assert_snapshot!(out.policy, @"img-src http://cdn.com; script-src http://evil.com");
    }

    #[test]
    fn log_entries_use_their_own_policy_type() {
        let regular = format!(r#"{{"csp-report":{SCRIPT_REPORT},"policy-type":"regular"}}"#);
        let inline = format!(r#"{{"csp-report":{INLINE_REPORT},"policy-type":"inline"}}"#);
        let untyped = format!(r#"{{"csp-report":{IMG_REPORT}}}"#);
        let (_temp, path) = write_lines(&[&regular, &inline, &untyped]);
        let out = generate(GenerateSource::LogEntries { path }, false);
        insta::assert_snapshot!(out.policy, @"script-src 'unsafe-inline' http://evil.com/x.js");
        assert_eq!(out.receipt.entries_read, 3);
        assert_eq!(out.receipt.policies_generated, 2);
        assert_eq!(out.receipt.entries_skipped, 1);
    }

    #[test]
    fn empty_input_gives_empty_policy() {
        let (_temp, path) = write_lines(&[]);
        let out = generate(GenerateSource::LogEntries { path }, false);
        assert!(out.policy.is_empty());
        assert_eq!(out.receipt.entries_read, 0);
    }

    #[test]
    fn missing_file_is_an_error() {
        let settings = crate::load_settings("", Overrides::default()).expect("settings");
        let result = run_generate(
            &settings,
            GenerateInput {
                source: GenerateSource::LogEntries {
                    path: Utf8PathBuf::from("/nonexistent/cspkit/log.jsonl"),
                },
                strip_paths: false,
            },
        );
        assert!(result.is_err());
    }
}
