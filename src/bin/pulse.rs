//! Pulse CLI - Command-line interface for WorkPulse
//!
//! Commands:
//! - score: Score time metrics into performance reports
//! - classify: Classify a stream of landmark frames (NDJSON)
//! - validate: Report every range violation in time metrics
//! - doctor: Diagnose configuration and environment

use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use log::{debug, info};
use std::collections::BTreeMap;
use std::fs;
use std::io::{self, BufRead, BufReader, Read, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use workpulse::activity::{
    ActivityClassifier, ClassifiedActivity, ClassifierConfig, LandmarkFrame,
};
use workpulse::performance::{
    evaluate_performance, ReportEncoder, ReportEnvelope, TimeMetrics, TimeMetricsValidator,
};
use workpulse::{PRODUCER_NAME, PULSE_VERSION};

/// Pulse - On-device activity classification and performance scoring
#[derive(Parser)]
#[command(name = "pulse")]
#[command(version = PULSE_VERSION)]
#[command(about = "Classify workplace activity and score time metrics", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Score time metrics into performance reports
    Score {
        /// Input file path (use - for stdin); one request object or an array
        #[arg(short, long)]
        input: PathBuf,

        /// Output file path (use - for stdout)
        #[arg(short, long, default_value = "-")]
        output: PathBuf,

        /// Output format
        #[arg(long, default_value = "json-pretty")]
        output_format: OutputFormat,
    },

    /// Classify landmark frames (one JSON frame per line)
    Classify {
        /// Input file path (use - for stdin)
        #[arg(short, long, default_value = "-")]
        input: PathBuf,

        /// Classifier configuration file (JSON)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Override the smoothing factor
        #[arg(long)]
        smoothing_factor: Option<f64>,

        /// Override the history capacity
        #[arg(long)]
        history: Option<usize>,

        /// Print only a per-label frame count at the end
        #[arg(long)]
        summary: bool,

        /// Flush output after each frame (`--flush=false` to buffer)
        #[arg(long, action = ArgAction::Set, default_value_t = true)]
        flush: bool,
    },

    /// Validate time metrics without scoring
    Validate {
        /// Input file path (use - for stdin)
        #[arg(short, long)]
        input: PathBuf,

        /// Output validation report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Diagnose configuration and environment
    Doctor {
        /// Check a classifier configuration file
        #[arg(long)]
        config: Option<PathBuf>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    /// Newline-delimited JSON (one report per line)
    Ndjson,
    /// JSON array of reports
    Json,
    /// Pretty-printed JSON
    JsonPretty,
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!(
                "{}",
                serde_json::to_string(&CliError::from(e))
                    .unwrap_or_else(|_| "Unknown error".to_string())
            );
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), PulseCliError> {
    match cli.command {
        Commands::Score {
            input,
            output,
            output_format,
        } => cmd_score(&input, &output, output_format),

        Commands::Classify {
            input,
            config,
            smoothing_factor,
            history,
            summary,
            flush,
        } => {
            let config = load_config(config.as_deref(), smoothing_factor, history)?;
            cmd_classify(&input, config, summary, flush)
        }

        Commands::Validate { input, json } => cmd_validate(&input, json),

        Commands::Doctor { config, json } => cmd_doctor(config.as_deref(), json),
    }
}

fn cmd_score(
    input: &Path,
    output: &Path,
    output_format: OutputFormat,
) -> Result<(), PulseCliError> {
    let requests = parse_requests(&read_input(input)?)?;
    if requests.is_empty() {
        return Err(PulseCliError::NoInput);
    }

    // One encoder so every report in a run shares the same instance id
    let encoder = ReportEncoder::new();
    let mut envelopes: Vec<ReportEnvelope> = Vec::with_capacity(requests.len());
    for metrics in &requests {
        let report = evaluate_performance(metrics)?;
        envelopes.push(encoder.encode(report, metrics.date));
    }
    info!("scored {} period(s)", envelopes.len());

    let output_data = format_output(&envelopes, &output_format)?;
    if output.to_string_lossy() == "-" {
        print!("{}", output_data);
    } else {
        fs::write(output, output_data)?;
    }

    Ok(())
}

fn cmd_classify(
    input: &Path,
    config: ClassifierConfig,
    summary: bool,
    flush: bool,
) -> Result<(), PulseCliError> {
    let mut classifier = ActivityClassifier::with_config(config)?;
    let reader: Box<dyn BufRead> = if input.to_string_lossy() == "-" {
        Box::new(BufReader::new(io::stdin()))
    } else {
        Box::new(BufReader::new(fs::File::open(input)?))
    };

    let mut stdout = io::stdout();
    let mut counts: BTreeMap<&'static str, u64> = BTreeMap::new();
    let mut frames = 0u64;

    for line in reader.lines() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        let frame = LandmarkFrame::from_json(trimmed).map_err(|e| {
            PulseCliError::ParseError(format!("Failed to parse frame {}: {}", frames, e))
        })?;
        let output = classifier.classify_frame(&frame);
        frames += 1;
        *counts.entry(output.activity.as_str()).or_insert(0) += 1;

        if !summary {
            writeln!(stdout, "{}", serde_json::to_string(&output)?)?;
            if flush {
                stdout.flush()?;
            }
        }
    }

    debug!("classified {} frame(s)", frames);

    if summary {
        let report = ClassifySummary {
            frames,
            no_data: counts
                .get(ClassifiedActivity::NoData.as_str())
                .copied()
                .unwrap_or(0),
            counts,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
    }

    Ok(())
}

fn cmd_validate(input: &Path, json: bool) -> Result<(), PulseCliError> {
    let requests = parse_requests(&read_input(input)?)?;

    let results: Vec<ValidationResult> = requests
        .iter()
        .enumerate()
        .map(|(index, metrics)| {
            let mut errors = TimeMetricsValidator::violations(metrics);
            if errors.is_empty() && metrics.total() == 0 {
                errors.push("Total time cannot be zero".to_string());
            }
            ValidationResult {
                index,
                date: metrics.date.map(|d| d.to_string()),
                errors,
            }
        })
        .collect();

    let invalid = results.iter().filter(|r| !r.errors.is_empty()).count();
    let report = ValidationReport {
        total_records: results.len(),
        valid_records: results.len() - invalid,
        invalid_records: invalid,
        results: results.into_iter().filter(|r| !r.errors.is_empty()).collect(),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("Validation Report");
        println!("=================");
        println!("Total records:   {}", report.total_records);
        println!("Valid records:   {}", report.valid_records);
        println!("Invalid records: {}", report.invalid_records);

        if !report.results.is_empty() {
            println!("\nErrors:");
            for result in &report.results {
                for error in &result.errors {
                    println!(
                        "  - Record {} ({}): {}",
                        result.index,
                        result.date.as_deref().unwrap_or("no date"),
                        error
                    );
                }
            }
        }
    }

    if report.invalid_records > 0 {
        Err(PulseCliError::ValidationFailed(report.invalid_records))
    } else {
        Ok(())
    }
}

fn cmd_doctor(config: Option<&Path>, json: bool) -> Result<(), PulseCliError> {
    let mut checks: Vec<DoctorCheck> = vec![DoctorCheck {
        name: "pulse_version".to_string(),
        status: CheckStatus::Ok,
        message: format!("WorkPulse version {}", PULSE_VERSION),
    }];

    if let Some(config_path) = config {
        let check = if !config_path.exists() {
            DoctorCheck {
                name: "config".to_string(),
                status: CheckStatus::Warning,
                message: "Config file does not exist".to_string(),
            }
        } else {
            match fs::read_to_string(config_path) {
                Ok(content) => match ClassifierConfig::from_json(&content) {
                    Ok(parsed) => DoctorCheck {
                        name: "config".to_string(),
                        status: CheckStatus::Ok,
                        message: format!(
                            "Config valid (smoothing {}, threshold {}, history {})",
                            parsed.smoothing_factor,
                            parsed.confidence_threshold,
                            parsed.history_capacity
                        ),
                    },
                    Err(e) => DoctorCheck {
                        name: "config".to_string(),
                        status: CheckStatus::Error,
                        message: e.to_string(),
                    },
                },
                Err(e) => DoctorCheck {
                    name: "config".to_string(),
                    status: CheckStatus::Error,
                    message: format!("Cannot read config file: {}", e),
                },
            }
        };
        checks.push(check);
    }

    // stdin mode matters for `classify`
    checks.push(DoctorCheck {
        name: "stdin".to_string(),
        status: CheckStatus::Ok,
        message: if atty::is(atty::Stream::Stdin) {
            "stdin is a TTY (interactive mode)".to_string()
        } else {
            "stdin is a pipe (frame streaming ready)".to_string()
        },
    });

    let report = DoctorReport {
        producer: PRODUCER_NAME.to_string(),
        version: PULSE_VERSION.to_string(),
        checks,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("Pulse Doctor Report");
        println!("===================");
        println!("Producer: {}", report.producer);
        println!("Version:  {}", report.version);
        println!("\nChecks:");

        for check in &report.checks {
            let status_icon = match check.status {
                CheckStatus::Ok => "[OK]",
                CheckStatus::Warning => "[WARN]",
                CheckStatus::Error => "[ERR]",
            };
            println!("  {} {}: {}", status_icon, check.name, check.message);
        }
    }

    if report.checks.iter().any(|c| matches!(c.status, CheckStatus::Error)) {
        Err(PulseCliError::DoctorFailed)
    } else {
        Ok(())
    }
}

// Helper functions

fn read_input(input: &Path) -> Result<String, PulseCliError> {
    if input.to_string_lossy() == "-" {
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;
        Ok(buffer)
    } else {
        Ok(fs::read_to_string(input)?)
    }
}

/// Accept a single request object or an array of them
fn parse_requests(data: &str) -> Result<Vec<TimeMetrics>, PulseCliError> {
    let value: serde_json::Value = serde_json::from_str(data)?;
    match value {
        serde_json::Value::Array(_) => Ok(serde_json::from_value(value)?),
        other => Ok(vec![serde_json::from_value(other)?]),
    }
}

fn load_config(
    path: Option<&Path>,
    smoothing_factor: Option<f64>,
    history: Option<usize>,
) -> Result<ClassifierConfig, PulseCliError> {
    let mut config = match path {
        Some(path) => ClassifierConfig::from_json(&fs::read_to_string(path)?)?,
        None => ClassifierConfig::default(),
    };
    if let Some(factor) = smoothing_factor {
        config.smoothing_factor = factor;
    }
    if let Some(capacity) = history {
        config.history_capacity = capacity;
    }
    config.validate()?;
    Ok(config)
}

fn format_output(
    envelopes: &[ReportEnvelope],
    format: &OutputFormat,
) -> Result<String, PulseCliError> {
    match format {
        OutputFormat::Ndjson => {
            let mut lines: Vec<String> = Vec::new();
            for envelope in envelopes {
                lines.push(serde_json::to_string(envelope)?);
            }
            Ok(lines.join("\n") + "\n")
        }
        OutputFormat::Json => Ok(serde_json::to_string(envelopes)?),
        OutputFormat::JsonPretty => Ok(serde_json::to_string_pretty(envelopes)? + "\n"),
    }
}

// Error types

#[derive(Debug)]
enum PulseCliError {
    Io(io::Error),
    Compute(workpulse::ComputeError),
    Json(serde_json::Error),
    NoInput,
    ValidationFailed(usize),
    DoctorFailed,
    ParseError(String),
}

impl From<io::Error> for PulseCliError {
    fn from(e: io::Error) -> Self {
        PulseCliError::Io(e)
    }
}

impl From<workpulse::ComputeError> for PulseCliError {
    fn from(e: workpulse::ComputeError) -> Self {
        PulseCliError::Compute(e)
    }
}

impl From<serde_json::Error> for PulseCliError {
    fn from(e: serde_json::Error) -> Self {
        PulseCliError::Json(e)
    }
}

#[derive(serde::Serialize)]
struct CliError {
    code: String,
    message: String,
    hint: Option<String>,
}

impl From<PulseCliError> for CliError {
    fn from(e: PulseCliError) -> Self {
        match e {
            PulseCliError::Io(e) => CliError {
                code: "IO_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check file paths and permissions".to_string()),
            },
            PulseCliError::Compute(e) => {
                let (code, hint) = match &e {
                    workpulse::ComputeError::InvalidTimeMetrics(_) => (
                        "VALIDATION_ERROR",
                        "Run 'pulse validate' for details",
                    ),
                    workpulse::ComputeError::ZeroTotalTime => (
                        "ZERO_TOTAL_TIME",
                        "At least one time bucket must be non-zero",
                    ),
                    workpulse::ComputeError::InvalidConfig(_) => (
                        "CONFIG_ERROR",
                        "Run 'pulse doctor --config <file>' to check the configuration",
                    ),
                    _ => ("PARSE_ERROR", "Ensure input matches the expected schema"),
                };
                CliError {
                    code: code.to_string(),
                    message: e.to_string(),
                    hint: Some(hint.to_string()),
                }
            }
            PulseCliError::Json(e) => CliError {
                code: "JSON_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check JSON syntax".to_string()),
            },
            PulseCliError::NoInput => CliError {
                code: "NO_INPUT".to_string(),
                message: "No time metrics found in input".to_string(),
                hint: Some("Ensure input file is not empty".to_string()),
            },
            PulseCliError::ValidationFailed(count) => CliError {
                code: "VALIDATION_FAILED".to_string(),
                message: format!("{} records failed validation", count),
                hint: Some("Fix validation errors and retry".to_string()),
            },
            PulseCliError::DoctorFailed => CliError {
                code: "DOCTOR_FAILED".to_string(),
                message: "One or more health checks failed".to_string(),
                hint: Some("Review the doctor report for details".to_string()),
            },
            PulseCliError::ParseError(msg) => CliError {
                code: "PARSE_ERROR".to_string(),
                message: msg,
                hint: Some("Each line must be one landmark frame JSON object".to_string()),
            },
        }
    }
}

// Report types

#[derive(serde::Serialize)]
struct ValidationReport {
    total_records: usize,
    valid_records: usize,
    invalid_records: usize,
    results: Vec<ValidationResult>,
}

#[derive(serde::Serialize)]
struct ValidationResult {
    index: usize,
    date: Option<String>,
    errors: Vec<String>,
}

#[derive(serde::Serialize)]
struct ClassifySummary {
    frames: u64,
    no_data: u64,
    counts: BTreeMap<&'static str, u64>,
}

#[derive(serde::Serialize)]
struct DoctorReport {
    producer: String,
    version: String,
    checks: Vec<DoctorCheck>,
}

#[derive(serde::Serialize)]
struct DoctorCheck {
    name: String,
    status: CheckStatus,
    message: String,
}

#[derive(serde::Serialize)]
enum CheckStatus {
    Ok,
    Warning,
    Error,
}
