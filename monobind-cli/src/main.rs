// monobind-cli: CLI entry point for monobind tools (generate, inspect).

use std::error::Error;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing::error;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "monobind", about = "monobind CLI: C bindings to managed code over the Mono embedding API")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate the C runtime, assembly binder and per-unit thunks.
    Generate {
        /// Path to monobind.config.toml.
        #[arg(long, default_value = "monobind.config.toml")]
        config: PathBuf,
    },
    /// Print the filtered binding plan (class ids, thunk names, descriptors) as JSON.
    Inspect {
        /// Path to monobind.config.toml.
        #[arg(long, default_value = "monobind.config.toml")]
        config: PathBuf,
    },
}

fn main() -> ExitCode {
    init_logging();
    let cli = Cli::parse();

    let result: Result<(), Box<dyn Error>> = match cli.command {
        Commands::Generate { config } => generate(&config),
        Commands::Inspect { config } => inspect_json(&config).map(|json| println!("{json}")),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn generate(config: &Path) -> Result<(), Box<dyn Error>> {
    let summary = monobind_codegen::run_generate(config)?;
    println!(
        "wrote {} files ({} classes, {} thunks) to {}",
        summary.files.len(),
        summary.classes,
        summary.thunks,
        summary.out_dir.display()
    );
    Ok(())
}

/// The filtered binding plan as pretty-printed JSON.
fn inspect_json(config: &Path) -> Result<String, Box<dyn Error>> {
    let plan = monobind_codegen::plan_from_config(config)?;
    Ok(serde_json::to_string_pretty(&plan)?)
}

/// Logs go to stderr so `inspect` output stays pipeable.
/// `MONOBIND_LOG` wins over `RUST_LOG`; the default level is `info`.
fn init_logging() {
    let filter = EnvFilter::try_from_env("MONOBIND_LOG")
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
