//! hbench CLI - Command-line interface for humanbench
//!
//! Commands:
//! - analyze: Analyze capture bundles into report envelopes
//! - difficulty: Score the typing difficulty of a text
//! - islands: Count the islands of a grid
//! - doctor: Diagnose configuration and environment

use clap::{Parser, Subcommand, ValueEnum};
use serde::Deserialize;
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{debug, info, Level};

use humanbench::encoder::ReportEnvelope;
use humanbench::types::DifficultyScore;
use humanbench::{
    difficulty_score, get_islands, AnalysisConfig, AnalysisError, BenchmarkAnalyzer,
    CaptureBundle, TextSample, PRODUCER_NAME, VERSION,
};

/// hbench - Derived metrics for human benchmark telemetry
#[derive(Parser)]
#[command(name = "hbench")]
#[command(version = VERSION)]
#[command(about = "Analyze human benchmark captures", long_about = None)]
struct Cli {
    /// Log analyzer decisions to stderr
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Only log errors
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze capture bundles into report envelopes
    Analyze {
        /// Input file path (use - for stdin)
        #[arg(short, long)]
        input: PathBuf,

        /// Output file path (use - for stdout)
        #[arg(short, long)]
        output: PathBuf,

        /// Input format
        #[arg(long, default_value = "json")]
        input_format: InputFormat,

        /// Output format
        #[arg(long, default_value = "ndjson")]
        output_format: OutputFormat,

        /// Analysis configuration file
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Score the typing difficulty of a text
    Difficulty {
        /// Text to score
        #[arg(long, conflicts_with = "input", required_unless_present = "input")]
        text: Option<String>,

        /// Read the text from a file (use - for stdin)
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Analysis configuration file
        #[arg(long)]
        config: Option<PathBuf>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Count the islands of a grid given as a JSON array of rows
    Islands {
        /// Grid JSON, e.g. "[[1,1,0],[0,0,1]]"
        #[arg(long)]
        grid: String,
    },

    /// Diagnose configuration and environment
    Doctor {
        /// Check an analysis configuration file
        #[arg(long)]
        config: Option<PathBuf>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Clone, ValueEnum)]
enum InputFormat {
    /// Newline-delimited JSON (one capture bundle per line)
    Ndjson,
    /// A single capture bundle or a JSON array of bundles
    Json,
}

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    /// Newline-delimited JSON (one report envelope per line)
    Ndjson,
    /// JSON array of report envelopes
    Json,
    /// Pretty-printed JSON
    JsonPretty,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum BundleInput {
    Many(Vec<CaptureBundle>),
    One(Box<CaptureBundle>),
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    match run(cli.command) {
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

fn init_logging(verbose: bool, quiet: bool) {
    let level = if verbose {
        Level::DEBUG
    } else if quiet {
        Level::ERROR
    } else {
        Level::WARN
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(io::stderr)
        .init();
}

fn run(command: Commands) -> Result<(), HbenchCliError> {
    match command {
        Commands::Analyze {
            input,
            output,
            input_format,
            output_format,
            config,
        } => cmd_analyze(
            &input,
            &output,
            input_format,
            output_format,
            config.as_deref(),
        ),

        Commands::Difficulty {
            text,
            input,
            config,
            json,
        } => cmd_difficulty(text, input.as_deref(), config.as_deref(), json),

        Commands::Islands { grid } => cmd_islands(&grid),

        Commands::Doctor { config, json } => cmd_doctor(config.as_deref(), json),
    }
}

fn read_input(path: &Path) -> Result<String, HbenchCliError> {
    if path.to_string_lossy() == "-" {
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;
        Ok(buffer)
    } else {
        Ok(fs::read_to_string(path)?)
    }
}

fn load_config(path: Option<&Path>) -> Result<AnalysisConfig, HbenchCliError> {
    match path {
        Some(path) => {
            let config = AnalysisConfig::from_json(&fs::read_to_string(path)?)?;
            debug!(path = %path.display(), "loaded analysis configuration");
            Ok(config)
        }
        None => Ok(AnalysisConfig::default()),
    }
}

fn cmd_analyze(
    input: &Path,
    output: &Path,
    input_format: InputFormat,
    output_format: OutputFormat,
    config: Option<&Path>,
) -> Result<(), HbenchCliError> {
    let analyzer = BenchmarkAnalyzer::with_config(load_config(config)?)?;
    let input_data = read_input(input)?;

    let bundles = match input_format {
        InputFormat::Ndjson => CaptureBundle::parse_ndjson(&input_data)?,
        InputFormat::Json => match serde_json::from_str::<BundleInput>(&input_data)? {
            BundleInput::Many(bundles) => bundles,
            BundleInput::One(bundle) => vec![*bundle],
        },
    };

    if bundles.is_empty() {
        return Err(HbenchCliError::NoBundles);
    }

    let mut envelopes: Vec<ReportEnvelope> = Vec::with_capacity(bundles.len());
    for bundle in bundles {
        let report = analyzer.analyze(&bundle)?;
        envelopes.push(analyzer.encoder().encode(bundle.session_id, report));
    }
    info!(reports = envelopes.len(), "analysis complete");

    let output_data = format_output(&envelopes, &output_format)?;
    if output.to_string_lossy() == "-" {
        print!("{}", output_data);
    } else {
        fs::write(output, output_data)?;
    }

    Ok(())
}

fn cmd_difficulty(
    text: Option<String>,
    input: Option<&Path>,
    config: Option<&Path>,
    json: bool,
) -> Result<(), HbenchCliError> {
    let config = load_config(config)?;
    let text = match (text, input) {
        (Some(text), _) => text,
        (None, Some(path)) => read_input(path)?,
        (None, None) => return Err(HbenchCliError::NoText),
    };

    let sample = TextSample::parse(&text);
    if sample.words.is_empty() {
        return Err(HbenchCliError::NoText);
    }
    let score = difficulty_score(&sample, &config.difficulty);

    if json {
        println!("{}", serde_json::to_string_pretty(&score)?);
    } else {
        print_difficulty(&sample, &score);
    }
    Ok(())
}

fn print_difficulty(sample: &TextSample, score: &DifficultyScore) {
    let show = |value: Option<f64>| match value {
        Some(v) => format!("{v:.1}"),
        None => "n/a".to_string(),
    };

    println!("Typing Difficulty");
    println!("=================");
    println!("Words:           {}", sample.words.len());
    println!("Characters:      {}", sample.character_count);
    println!("Punctuation:     {}", sample.punctuation_count());
    println!();
    println!("Repeated words:  {:.1}", score.repeated_words);
    println!("Capital letters: {}", show(score.capital_letters));
    println!("Punctuation:     {}", show(score.punctuation));
    println!("Overall:         {}", show(score.overall));
}

fn cmd_islands(grid: &str) -> Result<(), HbenchCliError> {
    let rows: Vec<Vec<u32>> = serde_json::from_str(grid)?;
    let islands = get_islands(&rows)?;
    println!("{}", serde_json::to_string(&islands)?);
    Ok(())
}

fn cmd_doctor(config: Option<&Path>, json: bool) -> Result<(), HbenchCliError> {
    let mut checks: Vec<DoctorCheck> = Vec::new();

    checks.push(DoctorCheck {
        name: "version".to_string(),
        status: CheckStatus::Ok,
        message: format!("humanbench version {}", VERSION),
    });

    // Check configuration file if provided
    if let Some(config_path) = config {
        if config_path.exists() {
            match fs::read_to_string(config_path) {
                Ok(content) => match AnalysisConfig::from_json(&content) {
                    Ok(config) => checks.push(DoctorCheck {
                        name: "config".to_string(),
                        status: CheckStatus::Ok,
                        message: format!(
                            "Configuration valid (target radius {}, top {} words)",
                            config.target_radius, config.most_common_count
                        ),
                    }),
                    Err(e) => checks.push(DoctorCheck {
                        name: "config".to_string(),
                        status: CheckStatus::Error,
                        message: e.to_string(),
                    }),
                },
                Err(e) => checks.push(DoctorCheck {
                    name: "config".to_string(),
                    status: CheckStatus::Error,
                    message: format!("Cannot read configuration file: {}", e),
                }),
            }
        } else {
            checks.push(DoctorCheck {
                name: "config".to_string(),
                status: CheckStatus::Warning,
                message: "Configuration file does not exist, defaults apply".to_string(),
            });
        }
    }

    // Check stdin is available (for piping captures)
    let stdin_check = if atty::is(atty::Stream::Stdin) {
        DoctorCheck {
            name: "stdin".to_string(),
            status: CheckStatus::Ok,
            message: "stdin is a TTY (interactive mode)".to_string(),
        }
    } else {
        DoctorCheck {
            name: "stdin".to_string(),
            status: CheckStatus::Ok,
            message: "stdin is a pipe (ready for `analyze --input -`)".to_string(),
        }
    };
    checks.push(stdin_check);

    let report = DoctorReport {
        producer: PRODUCER_NAME.to_string(),
        version: VERSION.to_string(),
        checks,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("hbench Doctor Report");
        println!("====================");
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

    let has_errors = report
        .checks
        .iter()
        .any(|c| matches!(c.status, CheckStatus::Error));
    if has_errors {
        Err(HbenchCliError::DoctorFailed)
    } else {
        Ok(())
    }
}

fn format_output(
    envelopes: &[ReportEnvelope],
    format: &OutputFormat,
) -> Result<String, HbenchCliError> {
    match format {
        OutputFormat::Ndjson => {
            let mut lines: Vec<String> = Vec::new();
            for envelope in envelopes {
                lines.push(serde_json::to_string(envelope)?);
            }
            Ok(lines.join("\n") + "\n")
        }
        OutputFormat::Json => Ok(serde_json::to_string(envelopes)?),
        OutputFormat::JsonPretty => Ok(serde_json::to_string_pretty(envelopes)?),
    }
}

// Error types

#[derive(Debug)]
enum HbenchCliError {
    Io(io::Error),
    Analysis(AnalysisError),
    Json(serde_json::Error),
    NoBundles,
    NoText,
    DoctorFailed,
}

impl From<io::Error> for HbenchCliError {
    fn from(e: io::Error) -> Self {
        HbenchCliError::Io(e)
    }
}

impl From<AnalysisError> for HbenchCliError {
    fn from(e: AnalysisError) -> Self {
        HbenchCliError::Analysis(e)
    }
}

impl From<serde_json::Error> for HbenchCliError {
    fn from(e: serde_json::Error) -> Self {
        HbenchCliError::Json(e)
    }
}

#[derive(serde::Serialize)]
struct CliError {
    code: String,
    message: String,
    hint: Option<String>,
}

impl From<HbenchCliError> for CliError {
    fn from(e: HbenchCliError) -> Self {
        match e {
            HbenchCliError::Io(e) => CliError {
                code: "IO_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check file paths and permissions".to_string()),
            },
            HbenchCliError::Analysis(AnalysisError::InvalidConfig(msg)) => CliError {
                code: "CONFIG_ERROR".to_string(),
                message: msg,
                hint: Some("Run 'hbench doctor --config <file>' for details".to_string()),
            },
            HbenchCliError::Analysis(e) => CliError {
                code: "ANALYSIS_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Ensure input is a valid capture bundle".to_string()),
            },
            HbenchCliError::Json(e) => CliError {
                code: "JSON_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check JSON syntax".to_string()),
            },
            HbenchCliError::NoBundles => CliError {
                code: "NO_BUNDLES".to_string(),
                message: "No capture bundles found in input".to_string(),
                hint: Some("Ensure input file is not empty".to_string()),
            },
            HbenchCliError::NoText => CliError {
                code: "NO_TEXT".to_string(),
                message: "No words found in text".to_string(),
                hint: Some("Pass --text or --input with a non-empty extract".to_string()),
            },
            HbenchCliError::DoctorFailed => CliError {
                code: "DOCTOR_FAILED".to_string(),
                message: "One or more health checks failed".to_string(),
                hint: Some("Review the doctor report for details".to_string()),
            },
        }
    }
}

// Report types

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
