//! PEARL CLI - Command-line interface for fatigue scoring
//!
//! Commands:
//! - score: Score one observation window and print a fatigue report
//! - compare: Compare pre/post shift snapshots
//! - calibrate: Turn calibration samples into a baseline profile
//! - factors: Print the factor catalog and tier weights

use clap::{Parser, Subcommand, ValueEnum};
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use pearl_fatigue::encoder::FatigueReportEncoder;
use pearl_fatigue::factors::{tier_weights, FACTOR_DEFINITIONS};
use pearl_fatigue::pipeline::{SampleMap, ScoreRequest, ShiftRequest};
use pearl_fatigue::types::FatigueReport;
use pearl_fatigue::{
    compare_shift_phases, BaselineProfile, FatigueError, FatigueModel, ScoringConfig,
    PEARL_VERSION,
};

/// PEARL - on-premise fatigue risk scoring
#[derive(Parser)]
#[command(name = "pearl")]
#[command(version = PEARL_VERSION)]
#[command(about = "Score fatigue risk from baselines, live metrics and personal context", long_about = None)]
struct Cli {
    /// Log filter used when RUST_LOG is unset (e.g. "debug", "pearl_fatigue=debug")
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Score one observation window
    Score {
        /// Score request JSON (use - for stdin)
        #[arg(short, long)]
        input: PathBuf,

        /// Output file path (use - for stdout)
        #[arg(short, long, default_value = "-")]
        output: PathBuf,

        /// Scoring configuration JSON file
        #[arg(long)]
        config: Option<PathBuf>,

        /// Override the z-score at which a factor's risk saturates
        #[arg(long)]
        z_threshold: Option<f64>,

        /// Subject identifier recorded in the report provenance
        #[arg(long)]
        subject: Option<String>,

        /// Output format
        #[arg(long, default_value = "json-pretty")]
        output_format: OutputFormat,
    },

    /// Compare pre/post shift snapshots
    Compare {
        /// Shift request JSON (use - for stdin)
        #[arg(short, long)]
        input: PathBuf,

        /// Output file path (use - for stdout)
        #[arg(short, long, default_value = "-")]
        output: PathBuf,

        /// Print only the one-line summary
        #[arg(long)]
        summary: bool,

        /// Output format
        #[arg(long, default_value = "json-pretty")]
        output_format: OutputFormat,
    },

    /// Build a baseline profile from calibration samples
    Calibrate {
        /// Samples JSON, `{metric: [values...]}` (use - for stdin)
        #[arg(short, long)]
        input: PathBuf,

        /// Output file path (use - for stdout)
        #[arg(short, long, default_value = "-")]
        output: PathBuf,

        /// Existing baseline to merge the new statistics into
        #[arg(long)]
        merge_into: Option<PathBuf>,
    },

    /// Print the factor catalog
    Factors {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    /// Compact single-line JSON
    Json,
    /// Pretty-printed JSON
    JsonPretty,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(&cli.log_level);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!(
                "{}",
                serde_json::to_string(&CliError::from(e)).unwrap_or_else(|_| "Unknown error".to_string())
            );
            ExitCode::FAILURE
        }
    }
}

fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    // A second initialization only happens in tests; ignore it
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .compact()
        .try_init();
}

fn run(cli: Cli) -> Result<(), PearlCliError> {
    match cli.command {
        Commands::Score {
            input,
            output,
            config,
            z_threshold,
            subject,
            output_format,
        } => cmd_score(
            &input,
            &output,
            config.as_deref(),
            z_threshold,
            subject,
            output_format,
        ),

        Commands::Compare {
            input,
            output,
            summary,
            output_format,
        } => cmd_compare(&input, &output, summary, output_format),

        Commands::Calibrate {
            input,
            output,
            merge_into,
        } => cmd_calibrate(&input, &output, merge_into.as_deref()),

        Commands::Factors { json } => cmd_factors(json),
    }
}

fn cmd_score(
    input: &Path,
    output: &Path,
    config_path: Option<&Path>,
    z_threshold: Option<f64>,
    subject: Option<String>,
    output_format: OutputFormat,
) -> Result<(), PearlCliError> {
    let request: ScoreRequest = serde_json::from_str(&read_input(input)?)?;

    // Precedence: flag > config file > request document > default
    let mut config = request.config.unwrap_or_default();
    if let Some(path) = config_path {
        config = ScoringConfig::from_json(&fs::read_to_string(path)?)?;
    }
    if let Some(threshold) = z_threshold {
        config.z_threshold = threshold;
    }
    config.validate()?;
    debug!(z_threshold = config.z_threshold, "resolved scoring configuration");

    let baseline = request.resolve_baseline();
    let result = FatigueModel::with_config(config).compute_score(
        &baseline,
        &request.metrics,
        &request.profile,
        request.shift_delta,
    );
    info!(score = result.score, level = %result.level, "scored observation window");

    let mut encoder = FatigueReportEncoder::new().z_threshold(config.z_threshold);
    if let Some(subject) = subject.or(request.subject_id) {
        encoder = encoder.subject(subject);
    }
    let report = encoder.encode_assessment(&baseline, &request.metrics, &result);

    write_output(output, &format_report(&report, &output_format)?)
}

fn cmd_compare(
    input: &Path,
    output: &Path,
    summary_only: bool,
    output_format: OutputFormat,
) -> Result<(), PearlCliError> {
    let request: ShiftRequest = serde_json::from_str(&read_input(input)?)?;
    let review = compare_shift_phases(&request.pre_shift, &request.post_shift, request.fatigue_delta);

    if summary_only {
        return write_output(output, &format!("{}\n", review.summary()));
    }

    let mut encoder = FatigueReportEncoder::new();
    if let Some(subject) = request.subject_id {
        encoder = encoder.subject(subject);
    }
    let report = encoder.encode_shift_review(&review);
    write_output(output, &format_report(&report, &output_format)?)
}

fn cmd_calibrate(input: &Path, output: &Path, merge_into: Option<&Path>) -> Result<(), PearlCliError> {
    let samples: SampleMap = serde_json::from_str(&read_input(input)?)?;
    let calibrated = BaselineProfile::from_samples(&samples);

    let skipped = samples.len() - calibrated.len();
    if skipped > 0 {
        info!(skipped, "skipped metrics without samples");
    }

    let baseline = match merge_into {
        Some(path) => BaselineProfile::from_json(&fs::read_to_string(path)?)?.merge(&calibrated),
        None => calibrated,
    };

    let json = serde_json::to_string_pretty(&baseline)?;
    write_output(output, &format!("{json}\n"))
}

fn cmd_factors(json: bool) -> Result<(), PearlCliError> {
    if json {
        let report = FactorsReport {
            factors: &FACTOR_DEFINITIONS,
            tier_weights: tier_weights(),
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("{:<22} {:<24} {:>4} {:>7}  {:<9} {}", "KEY", "NAME", "TIER", "WEIGHT", "DIRECTION", "CATEGORY");
    for factor in FACTOR_DEFINITIONS.iter() {
        println!(
            "{:<22} {:<24} {:>4} {:>7.2}  {:<9} {}",
            factor.key, factor.name, factor.tier, factor.weight, factor.direction, factor.category
        );
    }
    println!();
    for (tier, weight) in tier_weights() {
        println!("Tier {tier}: total weight {weight:.2}");
    }
    Ok(())
}

fn read_input(input: &Path) -> Result<String, PearlCliError> {
    if input.to_string_lossy() == "-" {
        if atty::is(atty::Stream::Stdin) {
            return Err(PearlCliError::NoInput);
        }
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;
        Ok(buffer)
    } else {
        Ok(fs::read_to_string(input)?)
    }
}

fn write_output(output: &Path, data: &str) -> Result<(), PearlCliError> {
    if output.to_string_lossy() == "-" {
        print!("{}", data);
    } else {
        fs::write(output, data)?;
    }
    Ok(())
}

fn format_report(report: &FatigueReport, format: &OutputFormat) -> Result<String, PearlCliError> {
    let body = match format {
        OutputFormat::Json => serde_json::to_string(report)?,
        OutputFormat::JsonPretty => serde_json::to_string_pretty(report)?,
    };
    Ok(format!("{body}\n"))
}

#[derive(Debug)]
enum PearlCliError {
    Io(io::Error),
    Engine(FatigueError),
    Json(serde_json::Error),
    NoInput,
}

impl From<io::Error> for PearlCliError {
    fn from(e: io::Error) -> Self {
        PearlCliError::Io(e)
    }
}

impl From<FatigueError> for PearlCliError {
    fn from(e: FatigueError) -> Self {
        PearlCliError::Engine(e)
    }
}

impl From<serde_json::Error> for PearlCliError {
    fn from(e: serde_json::Error) -> Self {
        PearlCliError::Json(e)
    }
}

#[derive(serde::Serialize)]
struct CliError {
    code: String,
    message: String,
    hint: Option<String>,
}

impl From<PearlCliError> for CliError {
    fn from(e: PearlCliError) -> Self {
        match e {
            PearlCliError::Io(e) => CliError {
                code: "IO_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check file paths and permissions".to_string()),
            },
            PearlCliError::Engine(FatigueError::InvalidConfig(msg)) => CliError {
                code: "CONFIG_ERROR".to_string(),
                message: msg,
                hint: Some("z_threshold must be a positive number".to_string()),
            },
            PearlCliError::Engine(e) => CliError {
                code: "ENGINE_ERROR".to_string(),
                message: e.to_string(),
                hint: None,
            },
            PearlCliError::Json(e) => CliError {
                code: "JSON_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check JSON syntax and required fields".to_string()),
            },
            PearlCliError::NoInput => CliError {
                code: "NO_INPUT".to_string(),
                message: "No input piped on stdin".to_string(),
                hint: Some("Pipe a JSON document or pass --input <file>".to_string()),
            },
        }
    }
}

// Report types

#[derive(serde::Serialize)]
struct FactorsReport {
    factors: &'static [pearl_fatigue::FactorDefinition],
    tier_weights: std::collections::BTreeMap<u8, f64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_score_flags() {
        let cli = Cli::try_parse_from([
            "pearl",
            "score",
            "--input",
            "request.json",
            "--z-threshold",
            "3.0",
            "--output-format",
            "json",
        ])
        .unwrap();

        match cli.command {
            Commands::Score {
                z_threshold,
                output,
                ..
            } => {
                assert_eq!(z_threshold, Some(3.0));
                assert_eq!(output, PathBuf::from("-"));
            }
            _ => panic!("expected score command"),
        }
    }

    #[test]
    fn test_factors_report_lists_catalog() {
        let report = FactorsReport {
            factors: &FACTOR_DEFINITIONS,
            tier_weights: tier_weights(),
        };
        let value = serde_json::to_value(&report).unwrap();

        assert_eq!(value["factors"].as_array().unwrap().len(), 15);
        assert_eq!(value["factors"][5]["direction"], "decrease");
        assert_eq!(value["factors"][0]["key"], "response_delay");
        assert_eq!(value["tier_weights"].as_object().unwrap().len(), 3);
    }
}
