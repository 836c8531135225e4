//! CLI entry point for the dataset auditor.

use anyhow::{Result, anyhow};
use clap::{Args, Parser, Subcommand};
use dotenv::dotenv;
use lex_audit::baseline::{compute_baseline, read_baseline, write_baseline};
use lex_audit::ingest::load_csv;
use lex_audit::{
    AuditConfig, AuditError, AuditRecord, AuditResponse, Auditor, AuditorBuilder,
    write_audit_record,
};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{debug, info};

#[cfg(feature = "ai")]
use lex_audit::ai::OpenRouterProvider;
#[cfg(feature = "ai")]
use std::sync::Arc;

#[derive(Parser, Debug)]
#[command(
    name = "lex-audit",
    author = "Lex Machina Team",
    version,
    about = "Pre-training dataset auditor",
    long_about = "Audits a CSV dataset for missing values, near-constant columns, skew,\n\
                  target leakage and, given a baseline, distribution drift.\n\n\
                  ENVIRONMENT VARIABLES:\n  \
                  OPENROUTER_API_KEY    API key for OpenRouter (explanations)\n  \
                  OPENROUTER_MODEL      Model used for explanations\n\n\
                  EXAMPLES:\n  \
                  # Audit a single file\n  \
                  lex-audit audit -i data.csv\n\n  \
                  # Compare against the training data\n  \
                  lex-audit audit -i current.csv --baseline train.csv\n\n  \
                  # Store a snapshot once, audit against it later\n  \
                  lex-audit baseline -i train.csv -o baseline.json\n  \
                  lex-audit audit -i current.csv --baseline-snapshot baseline.json --json\n\n\
                  EXIT STATUS:\n  \
                  0  audit completed\n  \
                  1  audit failed\n  \
                  2  input rejected (not CSV, no columns, or too many rows)"
)]
struct Cli {
    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info", global = true)]
    log_level: String,

    /// Only show warnings and errors in the log
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Audit a dataset, optionally against a baseline
    Audit(AuditArgs),

    /// Write a mean/std snapshot of a reference dataset
    Baseline(BaselineArgs),
}

#[derive(Args, Debug)]
struct AuditArgs {
    /// Path to the CSV file to audit
    #[arg(short, long)]
    input: PathBuf,

    /// Baseline CSV to test for drift against (KS test)
    #[arg(long, conflicts_with = "baseline_snapshot")]
    baseline: Option<PathBuf>,

    /// Baseline snapshot JSON to test for drift against (mean shift)
    #[arg(long)]
    baseline_snapshot: Option<PathBuf>,

    /// Skip the LLM explanation
    #[arg(long)]
    no_explain: bool,

    /// Output JSON to stdout instead of a human-readable summary
    ///
    /// Disables all logs so stdout only carries the audit JSON.
    #[arg(long)]
    json: bool,

    /// Write the audit as <input_name>_audit.json into this directory
    #[arg(short = 'r', long)]
    emit_report: Option<PathBuf>,

    /// p-value below which a column counts as drifted
    #[arg(long, default_value_t = lex_audit::config::DEFAULT_DRIFT_P_THRESHOLD)]
    p_threshold: f64,

    /// Largest row count accepted per input file
    #[arg(long, default_value_t = lex_audit::config::DEFAULT_MAX_ROWS)]
    max_rows: usize,

    /// Extra regex marking a column name as possible target leakage
    #[arg(long = "leakage-pattern")]
    leakage_patterns: Vec<String>,
}

#[derive(Args, Debug)]
struct BaselineArgs {
    /// Path to the reference CSV file
    #[arg(short, long)]
    input: PathBuf,

    /// Where to write the snapshot JSON
    #[arg(short, long, default_value = "baseline.json")]
    output: PathBuf,

    /// Largest row count accepted
    #[arg(long, default_value_t = lex_audit::config::DEFAULT_MAX_ROWS)]
    max_rows: usize,
}

/// Initialize the tracing subscriber for logging.
///
/// When `json_output` is true, logging is completely disabled to ensure
/// only JSON is written to stdout.
fn init_logging(level: &str, quiet: bool, json_output: bool) {
    if json_output {
        return;
    }

    use tracing_subscriber::EnvFilter;

    let effective_level = if quiet { "warn" } else { level };

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(effective_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

/// Exit status when the input is refused before any audit runs.
const EXIT_REJECTED_INPUT: u8 = 2;

fn main() -> ExitCode {
    let cli = Cli::parse();

    let json_output = matches!(&cli.command, Command::Audit(args) if args.json);
    init_logging(&cli.log_level, cli.quiet, json_output);

    // Load environment variables from .env file
    dotenv().ok();

    let result = match cli.command {
        Command::Audit(args) => run_audit(&args),
        Command::Baseline(args) => run_baseline(&args),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::from(exit_status(&e))
        }
    }
}

fn exit_status(error: &anyhow::Error) -> u8 {
    match error.downcast_ref::<AuditError>() {
        Some(e) if e.is_rejected_input() => EXIT_REJECTED_INPUT,
        _ => 1,
    }
}

fn run_audit(args: &AuditArgs) -> Result<()> {
    ensure_exists(&args.input)?;

    let mut config_builder = AuditConfig::builder()
        .drift_p_threshold(args.p_threshold)
        .max_rows(args.max_rows);
    for pattern in &args.leakage_patterns {
        config_builder = config_builder.leakage_pattern(pattern);
    }
    let config = config_builder.build()?;

    let current = load_csv(&args.input, config.max_rows)?;
    let auditor = build_auditor(config, !args.no_explain)?;
    let explain = !args.no_explain;

    let (response, baseline_file) = if let Some(path) = &args.baseline {
        ensure_exists(path)?;
        let baseline = load_csv(path, auditor.config().max_rows)?;
        let response = auditor.audit(&current, Some(&baseline), explain)?;
        (response, Some(path.display().to_string()))
    } else if let Some(path) = &args.baseline_snapshot {
        let snapshot = read_baseline(path)?;
        let response = auditor.audit_against_snapshot(&current, &snapshot, explain)?;
        (response, Some(path.display().to_string()))
    } else {
        (auditor.audit(&current, None, explain)?, None)
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&response)?);
    } else {
        print_summary(&args.input, &response);
    }

    if let Some(dir) = &args.emit_report {
        let stem = args
            .input
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("dataset");
        let record = AuditRecord::new(args.input.display().to_string(), baseline_file, response);
        let path = write_audit_record(dir, stem, &record)?;
        if !args.json {
            println!("Report written to {}", path.display());
        }
    }

    Ok(())
}

fn run_baseline(args: &BaselineArgs) -> Result<()> {
    ensure_exists(&args.input)?;

    let reference = load_csv(&args.input, args.max_rows)?;
    let snapshot = compute_baseline(&reference)?;
    write_baseline(&snapshot, &args.output)?;

    println!(
        "Baseline snapshot of {} numeric columns written to {}",
        snapshot.len(),
        args.output.display()
    );
    Ok(())
}

fn ensure_exists(path: &Path) -> Result<()> {
    if !path.exists() {
        return Err(anyhow!("Input file not found: {}", path.display()));
    }
    Ok(())
}

fn build_auditor(config: AuditConfig, explain: bool) -> Result<Auditor> {
    let builder = Auditor::builder().config(config);
    let builder = if explain {
        with_explanation_provider(builder)?
    } else {
        builder
    };
    Ok(builder.build()?)
}

#[cfg(feature = "ai")]
fn with_explanation_provider(builder: AuditorBuilder) -> Result<AuditorBuilder> {
    match OpenRouterProvider::from_env()? {
        Some(provider) => {
            info!(
                "Explanations via OpenRouter ({})",
                lex_audit::ai::ExplanationProvider::model(&provider).unwrap_or("default model")
            );
            Ok(builder.explanation_provider(Arc::new(provider)))
        }
        None => {
            info!("OpenRouter not configured; explanation will be a placeholder");
            Ok(builder)
        }
    }
}

#[cfg(not(feature = "ai"))]
fn with_explanation_provider(builder: AuditorBuilder) -> Result<AuditorBuilder> {
    debug!("Built without the `ai` feature; explanation will be a placeholder");
    Ok(builder)
}

/// Print the human-readable audit summary.
///
/// Uses `println!` rather than logging: this is the command's output.
fn print_summary(input: &Path, response: &AuditResponse) {
    let report = &response.report;
    let issues = &report.issues;
    let (rows, cols) = report.dataset_shape;

    println!("\n{}", "=".repeat(60));
    println!("AUDIT SUMMARY: {}", input.display());
    println!("{}", "=".repeat(60));
    println!("  Shape:      {} rows x {} columns", rows, cols);
    println!("  Risk score: {}", report.risk_score);
    println!("  Risk level: {}", report.risk_level);
    println!();

    println!("ISSUES");
    println!("{}", "-".repeat(40));
    if issues.missingness.is_empty() {
        println!("  High missingness: none");
    } else {
        println!("  High missingness:");
        for (column, ratio) in &issues.missingness {
            println!("    - {:<24} {:>6.1}%", truncate_str(column, 24), ratio * 100.0);
        }
    }
    print_list("Low variance", &issues.low_variance);
    print_list("Skewed", &issues.skewed_features);
    print_list("Leakage risk", &issues.leakage_risk);

    match &issues.drifted_features {
        None => println!("  Drift:            not checked (no baseline)"),
        Some(drifted) if drifted.is_empty() => println!("  Drift:            none"),
        Some(drifted) => {
            println!("  Drift:");
            for feature in drifted {
                println!(
                    "    - {:<24} p = {:.5}",
                    truncate_str(&feature.feature, 24),
                    feature.p_value
                );
            }
        }
    }

    if !response.explanation.is_empty() {
        println!();
        println!("EXPLANATION");
        println!("{}", "-".repeat(40));
        println!("{}", response.explanation);
    }
    println!();
    debug!("{} issues printed", issues.total());
}

fn print_list(label: &str, columns: &[String]) {
    let label = format!("{}:", label);
    if columns.is_empty() {
        println!("  {:<17} none", label);
    } else {
        println!("  {:<17} {}", label, columns.join(", "));
    }
}

/// Truncate a string to a maximum number of characters.
fn truncate_str(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", truncated)
    }
}
