mod config;
mod logging;
mod prompt;
mod summary;

use std::io;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use fhirsynth_core::Error as CoreError;
use fhirsynth_generate::{GenerateOptions, GenerationEngine, GenerationError, OutputFormat};
use fhirsynth_introspect::{DiscoveryOptions, ResourceProvider, discover};
use thiserror::Error;
use tracing::{debug, info};

use config::{ConfigError, GeneratorConfig, find_default_config, load_config, save_config};
use logging::init_logging;
use prompt::{PromptError, Prompter};
use summary::write_summary;

#[derive(Debug, Error)]
enum CliError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("core error: {0}")]
    Core(#[from] CoreError),
    #[error("generation error: {0}")]
    Generation(#[from] GenerationError),
    #[error("prompt error: {0}")]
    Prompt(#[from] PromptError),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("logging error: {0}")]
    Logging(String),
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

#[derive(Parser, Debug)]
#[command(name = "fhirsynth", version, about = "Synthetic FHIR resource datasets")]
struct Cli {
    /// Append JSON log events to this file.
    #[arg(long, global = true, value_name = "PATH")]
    log_file: Option<PathBuf>,
    /// Enable debug logging.
    #[arg(short, long, global = true, default_value_t = false)]
    verbose: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate a dataset for one resource type.
    Generate(GenerateArgs),
    /// Print the flattened column names of a resource type.
    Columns(ColumnsArgs),
    /// List the resource types of a catalog.
    Resources(ResourcesArgs),
    /// Write a default configuration file.
    Init(InitArgs),
    /// Print the JSON Schema of the configuration file.
    ConfigSchema,
}

#[derive(Args, Debug)]
struct GenerateArgs {
    /// Configuration file; searched beside the executable when omitted.
    config: Option<PathBuf>,
    /// Number of records.
    #[arg(long)]
    count: Option<u64>,
    /// Output format (parquet+zstd, parquet, csv, ndjson).
    #[arg(long)]
    format: Option<OutputFormat>,
    /// Output file.
    #[arg(long)]
    out: Option<PathBuf>,
    /// Seed for reproducible output.
    #[arg(long)]
    seed: Option<u64>,
    /// Write the generation report as JSON to this path.
    #[arg(long, value_name = "PATH")]
    report: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct ColumnsArgs {
    config: Option<PathBuf>,
    /// Resource type, overriding the configuration.
    #[arg(long)]
    resource: Option<String>,
}

#[derive(Args, Debug)]
struct ResourcesArgs {
    #[arg(long, default_value = fhirsynth_introspect::BUILTIN_FHIR_VERSION)]
    fhir_version: String,
    /// Catalog document replacing the builtin one.
    #[arg(long)]
    catalog: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct InitArgs {
    #[arg(default_value = "fhirsynth.jsonc")]
    path: PathBuf,
}

fn main() -> Result<(), CliError> {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.log_file.as_deref())?;

    let result = match cli.command {
        Command::Generate(args) => run_generate(args),
        Command::Columns(args) => run_columns(args),
        Command::Resources(args) => run_resources(args),
        Command::Init(args) => run_init(args),
        Command::ConfigSchema => run_config_schema(),
    };

    match result {
        Err(CliError::Prompt(PromptError::Quit)) => {
            println!("Goodbye!");
            Ok(())
        }
        other => other,
    }
}

fn run_generate(args: GenerateArgs) -> Result<(), CliError> {
    let mut config = match args.config {
        Some(path) => load_logged(&path)?,
        None => match find_default_config(&std::env::current_dir()?) {
            Some(path) => load_logged(&path)?,
            None => interactive_config()?,
        },
    };

    if let Some(count) = args.count {
        config.output.count = count;
    }
    if let Some(format) = args.format {
        config.output.format = format;
    }
    if args.out.is_some() {
        config.output.path = args.out;
    }
    if args.seed.is_some() {
        config.output.seed = args.seed;
    }

    let provider = discover(&config.discovery_options())?;
    let resource = config.resolve_resource(&provider)?;

    let seed = config.output.seed.unwrap_or_else(rand::random);
    let options = GenerateOptions {
        format: config.output.format,
        out_dir: config.output.dir.clone(),
        path: config.output.path.clone(),
        count: config.output.count,
        seed,
        base_date: config
            .output
            .base_date
            .unwrap_or_else(|| chrono::Local::now().date_naive()),
    };
    info!(
        event = "generate_requested",
        resource = %resource.name,
        fhir_version = %provider.fhir_version(),
        seed,
        base_date = %options.base_date
    );

    let result = GenerationEngine::new(options).run(resource, provider.catalog(), &config.schema)?;

    if let Some(path) = args.report {
        std::fs::write(&path, serde_json::to_vec_pretty(&result.report)?)?;
        info!(event = "report_written", path = %path.display());
    }

    write_summary(&mut io::stdout().lock(), &result.report)?;
    Ok(())
}

fn run_columns(args: ColumnsArgs) -> Result<(), CliError> {
    let mut config = match args.config {
        Some(path) => load_logged(&path)?,
        None => match find_default_config(&std::env::current_dir()?) {
            Some(path) => load_logged(&path)?,
            None => GeneratorConfig::default(),
        },
    };
    if let Some(resource) = args.resource {
        config.resource_type = resource;
    }

    let provider = discover(&config.discovery_options())?;
    let resource = config.resolve_resource(&provider)?;
    let columns = fhirsynth_core::column_list(resource, provider.catalog(), &config.schema);
    if columns.is_empty() {
        return Err(GenerationError::NoColumns(resource.name.clone()).into());
    }
    for column in &columns {
        println!("{column}");
    }
    Ok(())
}

fn run_resources(args: ResourcesArgs) -> Result<(), CliError> {
    let options = DiscoveryOptions {
        fhir_version: args.fhir_version,
        catalog_path: args.catalog,
        ..DiscoveryOptions::default()
    };
    let provider = discover(&options)?;
    for name in provider.resource_types() {
        println!("{name}");
    }
    Ok(())
}

fn run_init(args: InitArgs) -> Result<(), CliError> {
    if args.path.exists() {
        return Err(CliError::InvalidConfig(format!(
            "{} already exists",
            args.path.display()
        )));
    }
    save_config(&args.path, &GeneratorConfig::default())?;
    info!(event = "config_written", path = %args.path.display());
    println!("Wrote {}", args.path.display());
    Ok(())
}

fn run_config_schema() -> Result<(), CliError> {
    let schema = schemars::schema_for!(GeneratorConfig);
    println!("{}", serde_json::to_string_pretty(&schema)?);
    Ok(())
}

fn load_logged(path: &std::path::Path) -> Result<GeneratorConfig, CliError> {
    let config = load_config(path)?;
    info!(event = "config_loaded", path = %path.display());
    Ok(config)
}

/// Build a configuration from terminal prompts against the builtin catalog.
fn interactive_config() -> Result<GeneratorConfig, CliError> {
    println!("No configuration file found.");
    println!("Tip: create 'fhirsynth.jsonc' (see `fhirsynth init`) for automatic loading.");

    let mut config = GeneratorConfig::default();
    let provider = discover(&config.discovery_options())?;
    let resources = provider.resource_types();
    debug!(resources = resources.len(), "interactive setup started");

    let mut prompter = Prompter::new(io::stdin().lock(), io::stdout());
    config.resource_type = prompter.select_resource(&resources)?;
    config.output.format = prompter.select_format()?;
    config.output.count = prompter.select_count()?;

    println!("\nConfiguration summary:");
    println!("  Resource: {}", config.resource_type);
    println!("  Format: {}", config.output.format);
    println!("  Count: {} records", summary::group_thousands(config.output.count));
    Ok(config)
}
