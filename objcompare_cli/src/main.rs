use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use objcompare_common::{default_settings_path, load_or_default, ComparisonSettings, Difference};
use objcompare_core::Comparer;
use serde::Serialize;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{debug, error, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "objcompare")]
#[command(author = "ObjCompare Contributors")]
#[command(version = "0.1.0")]
#[command(about = "Structural comparison of JSON and TOML documents", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compare two documents and list every difference
    Diff {
        /// Left document
        left: PathBuf,

        /// Right document
        right: PathBuf,

        /// Document format; `auto` picks by file extension
        #[arg(short, long, value_enum, default_value_t = Format::Auto)]
        format: Format,

        /// Output results as JSON
        #[arg(long)]
        json: bool,

        /// Settings file (defaults to the user config directory)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Treat null and empty arrays as equal
        #[arg(long)]
        empty_equals_null: bool,

        /// Report a differing nested object once instead of per member
        #[arg(long)]
        no_recursive: bool,

        /// Member names to ignore (can be specified multiple times)
        #[arg(short, long)]
        ignore: Vec<String>,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Format {
    Auto,
    Json,
    Toml,
}

/// Exit status: 0 when equal, 1 when differences were found, 2 on error
fn main() -> ExitCode {
    // Initialize tracing to stderr (so reports can go cleanly to stdout)
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Diff {
            left,
            right,
            format,
            json,
            config,
            empty_equals_null,
            no_recursive,
            ignore,
        } => {
            let options = DiffOptions {
                format,
                json,
                config,
                empty_equals_null,
                no_recursive,
                ignore,
            };
            match run_diff(&left, &right, options) {
                Ok(true) => ExitCode::SUCCESS,
                Ok(false) => ExitCode::from(1),
                Err(e) => {
                    error!("Diff failed: {:#}", e);
                    eprintln!("error: {:#}", e);
                    ExitCode::from(2)
                }
            }
        }
    }
}

struct DiffOptions {
    format: Format,
    json: bool,
    config: Option<PathBuf>,
    empty_equals_null: bool,
    no_recursive: bool,
    ignore: Vec<String>,
}

/// Returns whether both documents are equal
fn run_diff(left: &Path, right: &Path, options: DiffOptions) -> Result<bool> {
    let settings = resolve_settings(&options)?;

    info!("Comparing:");
    info!("  Left:  {}", left.display());
    info!("  Right: {}", right.display());

    let left_doc = read_document(left, options.format)?;
    let right_doc = read_document(right, options.format)?;

    let builder = Comparer::<Value>::builder().with_settings(settings);
    let comparer = options
        .ignore
        .iter()
        .fold(builder, |builder, name| builder.ignore_member_name(name))
        .build::<Value>();

    let differences = comparer
        .calculate_differences(&left_doc, &right_doc)
        .context("Comparison failed")?;
    info!("Found {} differences", differences.len());

    if options.json {
        let report = build_json_report(left, right, &differences);
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_differences(&differences);
    }

    Ok(differences.is_empty())
}

fn resolve_settings(options: &DiffOptions) -> Result<ComparisonSettings> {
    let path = match &options.config {
        Some(path) => {
            if !path.exists() {
                bail!("Settings file does not exist: {}", path.display());
            }
            path.clone()
        }
        None => default_settings_path()?,
    };

    let loaded = load_or_default(&path)?;
    if loaded.exists {
        debug!("Loaded settings from {}", loaded.path.display());
    }

    let mut settings = loaded.settings;
    if options.empty_equals_null {
        settings.empty_and_null_enumerables_equal = true;
    }
    if options.no_recursive {
        settings.recursive_comparison = false;
    }
    Ok(settings)
}

fn detect_format(path: &Path, format: Format) -> Format {
    if format != Format::Auto {
        return format;
    }
    match path.extension().and_then(|ext| ext.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("toml") => Format::Toml,
        _ => Format::Json,
    }
}

fn read_document(path: &Path, format: Format) -> Result<Value> {
    if !path.exists() {
        bail!("Path does not exist: {}", path.display());
    }
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    match detect_format(path, format) {
        Format::Toml => {
            let table: toml::Value = toml::from_str(&text)
                .with_context(|| format!("Invalid TOML in {}", path.display()))?;
            Ok(serde_json::to_value(table)?)
        }
        _ => serde_json::from_str(&text)
            .with_context(|| format!("Invalid JSON in {}", path.display())),
    }
}

fn print_differences(differences: &[Difference]) {
    if differences.is_empty() {
        println!("Documents are equal");
        return;
    }

    for difference in differences {
        println!("{}", difference);
    }
    println!("{} difference(s)", differences.len());
}

#[derive(Serialize)]
struct JsonReport<'a> {
    left: String,
    right: String,
    equal: bool,
    differences: &'a [Difference],
}

fn build_json_report<'a>(left: &Path, right: &Path, differences: &'a [Difference]) -> JsonReport<'a> {
    JsonReport {
        left: left.to_string_lossy().to_string(),
        right: right.to_string_lossy().to_string(),
        equal: differences.is_empty(),
        differences,
    }
}
