use std::process::ExitCode;

use camino::Utf8PathBuf;
use clap::{Args, Parser, Subcommand};
use miette::IntoDiagnostic;
use tracing_subscriber::EnvFilter;

use sra_fetch::app::{App, ListResult, ToolsResult};
use sra_fetch::config::ConfigLoader;
use sra_fetch::domain::RunId;
use sra_fetch::error::FetchError;
use sra_fetch::output::{JsonOutput, OutputMode, TextOutput};
use sra_fetch::sra::SystemSraClient;

#[derive(Parser)]
#[command(name = "sra-fetch")]
#[command(about = "Download SRA sequencing runs and convert them to split FASTQ")]
#[command(version, author)]
struct Cli {
    /// Print results as JSON and suppress progress output.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(about = "Fetch runs and convert them to FASTQ")]
    Fetch(FetchArgs),
    #[command(about = "List runs already fetched into an output directory")]
    List(ListArgs),
    #[command(about = "Show SRA Toolkit availability and versions")]
    Tools,
}

#[derive(Args)]
struct FetchArgs {
    /// Run accessions; read from the config file when omitted.
    accessions: Vec<String>,

    /// Output directory; falls back to the config's output_dir.
    #[arg(long)]
    out_dir: Option<String>,

    /// Config file path (default: sra-fetch.json in the current directory).
    #[arg(long)]
    config: Option<String>,
}

#[derive(Args)]
struct ListArgs {
    #[arg(long, default_value = ".")]
    out_dir: String,
}

fn main() -> ExitCode {
    if let Err(report) = run() {
        eprintln!("{report:?}");
        if let Some(fetch) = report.downcast_ref::<FetchError>() {
            return ExitCode::from(map_exit_code(fetch));
        }
        return ExitCode::from(1);
    }
    ExitCode::SUCCESS
}

fn map_exit_code(error: &FetchError) -> u8 {
    match error {
        FetchError::MissingConfig
        | FetchError::ConfigRead(_)
        | FetchError::ConfigParse(_)
        | FetchError::MissingOutputDir => 2,
        FetchError::MissingTool(_) | FetchError::Subprocess(_) => 3,
        _ => 1,
    }
}

fn run() -> miette::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let output_mode = if cli.json {
        OutputMode::Json
    } else {
        OutputMode::Text
    };

    let app = App::new(SystemSraClient::new());

    match cli.command {
        Commands::Fetch(args) => run_fetch(args, app, output_mode),
        Commands::List(args) => run_list(args, app, output_mode),
        Commands::Tools => run_tools(app, output_mode),
    }
}

fn run_fetch(
    args: FetchArgs,
    app: App<SystemSraClient>,
    output_mode: OutputMode,
) -> miette::Result<()> {
    let explicit = args
        .accessions
        .iter()
        .map(|value| value.parse::<RunId>())
        .collect::<Result<Vec<_>, _>>()
        .into_diagnostic()?;

    let config = if explicit.is_empty() || args.config.is_some() {
        Some(ConfigLoader::resolve(args.config.as_deref()).into_diagnostic()?)
    } else {
        None
    };

    let (runs, config_out_dir) = match config {
        Some(config) => {
            let runs = if explicit.is_empty() {
                config.runs
            } else {
                explicit
            };
            (runs, config.output_dir)
        }
        None => (explicit, None),
    };

    let out_dir = args
        .out_dir
        .map(Utf8PathBuf::from)
        .or(config_out_dir)
        .ok_or(FetchError::MissingOutputDir)
        .into_diagnostic()?;

    match output_mode {
        OutputMode::Json => {
            let result = app.fetch(&runs, &out_dir, &JsonOutput).into_diagnostic()?;
            JsonOutput::print_fetch(&result).into_diagnostic()
        }
        OutputMode::Text => {
            app.fetch(&runs, &out_dir, &TextOutput).into_diagnostic()?;
            Ok(())
        }
    }
}

fn run_list(
    args: ListArgs,
    app: App<SystemSraClient>,
    output_mode: OutputMode,
) -> miette::Result<()> {
    let out_dir = Utf8PathBuf::from(args.out_dir);

    match output_mode {
        OutputMode::Json => {
            let result = app.list(&out_dir, &JsonOutput).into_diagnostic()?;
            JsonOutput::print_list(&result).into_diagnostic()
        }
        OutputMode::Text => {
            let result = app.list(&out_dir, &TextOutput).into_diagnostic()?;
            print_list_text(&result);
            Ok(())
        }
    }
}

fn run_tools(app: App<SystemSraClient>, output_mode: OutputMode) -> miette::Result<()> {
    match output_mode {
        OutputMode::Json => {
            let result = app.tools(&JsonOutput).into_diagnostic()?;
            JsonOutput::print_tools(&result).into_diagnostic()
        }
        OutputMode::Text => {
            let result = app.tools(&TextOutput).into_diagnostic()?;
            print_tools_text(&result);
            Ok(())
        }
    }
}

fn print_list_text(result: &ListResult) {
    if result.runs.is_empty() {
        println!("no fetched runs");
        return;
    }
    for entry in &result.runs {
        println!(
            "{}  {}  {} fastq file(s)",
            entry.id,
            entry.fetched_at,
            entry.fastq_files.len()
        );
    }
}

fn print_tools_text(result: &ToolsResult) {
    match &result.missing {
        None => println!("SRA Toolkit: ready"),
        Some(message) => println!("SRA Toolkit: {message}"),
    }
    println!("prefetch: {}", result.prefetch.as_deref().unwrap_or("not found"));
    println!(
        "fastq-dump: {}",
        result.fastq_dump.as_deref().unwrap_or("not found")
    );
}
