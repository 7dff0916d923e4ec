//! CLI entry point for cspkit.
//!
//! This module is intentionally thin: it handles argument parsing, I/O, and exit codes.
//! All business logic lives in the `cspkit-app` crate.

use anyhow::Context;
use camino::{Utf8Path, Utf8PathBuf};
use clap::{ArgGroup, Parser, Subcommand};
use cspkit_app::{
    GenerateInput, GenerateSource, MatchInput, NormalizeInput, config_schema_json, load_settings,
    run_combine, run_compare, run_generate, run_match, run_normalize,
};
use cspkit_domain::ReportType;
use cspkit_settings::{EffectiveSettings, Overrides};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[derive(Parser, Debug)]
#[command(
    name = "cspkit",
    version,
    about = "Content Security Policy parsing, matching, and policy generation"
)]
struct Cli {
    /// Path to cspkit config TOML (a missing file means defaults).
    #[arg(long, global = true, default_value = "cspkit.toml")]
    config: Utf8PathBuf,

    /// Override profile (strict|lenient).
    #[arg(long, global = true)]
    profile: Option<String>,

    /// Drop invalid parts instead of rejecting the whole policy or report.
    #[arg(long, global = true)]
    lenient: bool,

    /// Log filter (trace, debug, info, warn, error, or an EnvFilter directive).
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print the canonical form of a policy.
    Normalize {
        policy: String,

        /// Remove paths from source expressions.
        #[arg(long)]
        strip_paths: bool,

        /// Print the basic policies (one directive, one source) instead, one per line.
        #[arg(long)]
        basic: bool,
    },

    /// Check whether a resource is allowed. Exits 0 when allowed, 2 when blocked.
    Match {
        policy: String,

        /// Resource URI, or `inline` / `eval`.
        #[arg(long)]
        resource: String,

        /// Directive type governing the resource (e.g. script-src).
        #[arg(long = "type")]
        resource_type: String,

        /// URI of the protected document.
        #[arg(long)]
        document: String,

        /// Print a JSON receipt instead of `allowed` / `blocked`.
        #[arg(long)]
        json: bool,
    },

    /// Print the union of several policies.
    Combine {
        #[arg(required = true)]
        policies: Vec<String>,
    },

    /// Compare two policies as sets of basic policies (JSON receipt).
    Compare {
        left: String,
        right: String,

        /// Where to write the receipt (if not specified, prints to stdout).
        #[arg(long, short)]
        out: Option<Utf8PathBuf>,
    },

    /// Derive a policy from stored violation reports or log entries.
    #[command(group(ArgGroup::new("input").required(true).args(["reports", "log_entries"])))]
    Generate {
        /// File with one violation report per line.
        #[arg(long)]
        reports: Option<Utf8PathBuf>,

        /// Report type shared by all reports (regular|eval|inline).
        #[arg(long, default_value = "regular")]
        report_type: ReportType,

        /// File with one log entry per line.
        #[arg(long)]
        log_entries: Option<Utf8PathBuf>,

        /// Remove paths from the generated policy.
        #[arg(long)]
        strip_paths: bool,

        /// Where to write the JSON receipt.
        #[arg(long, short)]
        out: Option<Utf8PathBuf>,
    },

    /// Print the JSON schema of cspkit.toml.
    Schema,
}

fn main() {
    let cli = Cli::parse();
    init_tracing(&cli.log_level);

    match run(cli) {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("cspkit error: {err:#}");
            std::process::exit(1);
        }
    }
}

fn init_tracing(log_level: &str) {
    let filter = EnvFilter::try_new(log_level).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();
}

fn run(cli: Cli) -> anyhow::Result<i32> {
    if let Commands::Schema = cli.cmd {
        println!("{}", config_schema_json()?);
        return Ok(0);
    }
    let settings = settings(&cli)?;

    match cli.cmd {
        Commands::Normalize {
            policy,
            strip_paths,
            basic,
        } => cmd_normalize(&settings, &policy, strip_paths, basic),
        Commands::Match {
            policy,
            resource,
            resource_type,
            document,
            json,
        } => cmd_match(
            &settings,
            MatchInput {
                policy: &policy,
                resource: &resource,
                resource_type: &resource_type,
                document: &document,
            },
            json,
        ),
        Commands::Combine { policies } => cmd_combine(&settings, &policies),
        Commands::Compare { left, right, out } => {
            cmd_compare(&settings, &left, &right, out.as_deref())
        }
        Commands::Generate {
            reports,
            report_type,
            log_entries,
            strip_paths,
            out,
        } => {
            let source = match (reports, log_entries) {
                (Some(path), _) => GenerateSource::Reports { path, report_type },
                (None, Some(path)) => GenerateSource::LogEntries { path },
                (None, None) => anyhow::bail!("generate needs --reports or --log-entries"),
            };
            cmd_generate(
                &settings,
                GenerateInput {
                    source,
                    strip_paths,
                },
                out.as_deref(),
            )
        }
        Commands::Schema => Ok(0),
    }
}

/// Load config if present; a missing file is allowed (defaults apply).
fn settings(cli: &Cli) -> anyhow::Result<EffectiveSettings> {
    let text = if cli.config.exists() {
        std::fs::read_to_string(&cli.config)
            .with_context(|| format!("read config: {}", cli.config))?
    } else {
        tracing::debug!(path = %cli.config, "no config file, using defaults");
        String::new()
    };
    let overrides = Overrides {
        profile: cli.profile.clone(),
        strict: cli.lenient.then_some(false),
    };
    load_settings(&text, overrides).with_context(|| format!("config: {}", cli.config))
}

fn cmd_normalize(
    settings: &EffectiveSettings,
    policy: &str,
    strip_paths: bool,
    basic: bool,
) -> anyhow::Result<i32> {
    let output = run_normalize(
        settings,
        NormalizeInput {
            policy,
            strip_paths,
        },
    )?;
    if basic {
        for policy in &output.basic {
            println!("{policy}");
        }
    } else {
        println!("{}", output.policy);
    }
    Ok(0)
}

fn cmd_match(settings: &EffectiveSettings, input: MatchInput<'_>, json: bool) -> anyhow::Result<i32> {
    let receipt = run_match(settings, input)?;
    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&receipt).context("serialize match receipt")?
        );
    } else {
        println!("{}", if receipt.allowed { "allowed" } else { "blocked" });
    }
    Ok(if receipt.allowed { 0 } else { 2 })
}

fn cmd_combine(settings: &EffectiveSettings, policies: &[String]) -> anyhow::Result<i32> {
    let combined = run_combine(settings, policies)?;
    println!("{combined}");
    Ok(0)
}

fn cmd_compare(
    settings: &EffectiveSettings,
    left: &str,
    right: &str,
    out: Option<&Utf8Path>,
) -> anyhow::Result<i32> {
    let receipt = run_compare(settings, left, right)?;
    let json = serde_json::to_string_pretty(&receipt).context("serialize comparison receipt")?;
    match out {
        Some(path) => write_text_file(path, &json).context("write comparison receipt")?,
        None => println!("{json}"),
    }
    Ok(0)
}

fn cmd_generate(
    settings: &EffectiveSettings,
    input: GenerateInput,
    out: Option<&Utf8Path>,
) -> anyhow::Result<i32> {
    let output = run_generate(settings, input)?;
    println!("{}", output.policy);
    if let Some(path) = out {
        let json =
            serde_json::to_string_pretty(&output.receipt).context("serialize generate receipt")?;
        write_text_file(path, &json).context("write generate receipt")?;
    }
    Ok(0)
}

fn write_text_file(path: &Utf8Path, text: &str) -> anyhow::Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_str().is_empty()
    {
        std::fs::create_dir_all(parent).with_context(|| format!("create directory: {parent}"))?;
    }
    std::fs::write(path, format!("{text}\n")).with_context(|| format!("write: {path}"))?;
    Ok(())
}
