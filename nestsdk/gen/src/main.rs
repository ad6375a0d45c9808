//! nestsdk code generator
//!
//! Generates a typed TypeScript client from an OpenAPI/Swagger JSON document.

use std::path::{Path, PathBuf};

use clap::Parser;
use colored::Colorize;
use nestsdk_gen::config::{GeneratorConfig, InvalidOperationIdPolicy};
use nestsdk_gen::diagnostics::{Diagnostics, Severity};
use nestsdk_gen::errors::GeneratorError;
use nestsdk_gen::output::{Generation, generate_and_write};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// nestsdk generator - turns an API document into a TypeScript client
#[derive(Parser, Debug)]
#[command(name = "nestsdk-gen")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// API document (OpenAPI 3 or Swagger 2 JSON)
    #[arg(short, long, default_value = "swagger.json")]
    input: PathBuf,

    /// Output TypeScript file
    #[arg(short, long, default_value = "sdk.ts")]
    output: PathBuf,

    /// Generator configuration file (TOML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Name of the exported client class
    #[arg(long)]
    client_name: Option<String>,

    /// Abort on operations without a usable operationId instead of skipping them
    #[arg(long)]
    strict: bool,

    /// Print generated code without writing the file
    #[arg(long)]
    dry_run: bool,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

/// Initializes logging to stderr.
///
/// `RUST_LOG` wins over `-v`. Without either only warnings are shown.
fn init_tracing(verbose: u8) {
    let base_filter = match std::env::var("RUST_LOG") {
        Ok(filter) => filter,
        Err(_) => match verbose {
            // Diagnostics are reported in the final summary
            0 => "warn,nestsdk_gen::diagnostics=off".to_string(),
            // -v: progress and disambiguations
            1 => "warn,nestsdk_gen=info,nestsdk_define=info".to_string(),
            // -vv: import bookkeeping
            2 => "info,nestsdk_gen=debug,nestsdk_define=debug".to_string(),
            _ => "debug,nestsdk_gen=trace,nestsdk_define=trace".to_string(),
        },
    };

    let filter = EnvFilter::try_new(&base_filter).unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(verbose >= 2)
                .with_level(true)
                .with_file(verbose >= 4)
                .with_line_number(verbose >= 4)
                .with_writer(std::io::stderr)
                .compact(),
        )
        .init();
}

fn load_config(cli: &Cli) -> Result<GeneratorConfig, GeneratorError> {
    let mut config = match &cli.config {
        Some(path) => GeneratorConfig::load(path)?,
        None => GeneratorConfig::default(),
    };

    if let Some(name) = &cli.client_name {
        config.client_name = name.clone();
    }
    if cli.strict {
        config.on_invalid_operation_id = InvalidOperationIdPolicy::Abort;
    }

    config.validate()?;
    Ok(config)
}

fn print_diagnostics(diagnostics: &Diagnostics) {
    for diagnostic in diagnostics {
        let label = match diagnostic.severity() {
            Severity::Info => "info".dimmed(),
            Severity::Warning => "warning".yellow(),
            Severity::Error => "error".red().bold(),
        };
        eprintln!("{}: {}", label, diagnostic);
    }
}

fn print_summary(generation: &Generation, output: &Path, dry_run: bool) {
    let diagnostics = &generation.diagnostics;
    let errors = diagnostics.count(Severity::Error);
    let warnings = diagnostics.count(Severity::Warning);

    let counts = format!(
        "{} controller(s), {} method(s)",
        generation.controller_count, generation.method_count
    );
    let findings = format!("{} error(s), {} warning(s)", errors, warnings);
    let findings = if errors > 0 {
        findings.red().to_string()
    } else if warnings > 0 {
        findings.yellow().to_string()
    } else {
        findings.green().to_string()
    };

    if dry_run {
        eprintln!("{} {} ({})", "Dry run:".bold(), counts, findings);
    } else {
        eprintln!(
            "{} {} to {} ({})",
            "Generated".green().bold(),
            counts,
            output.display(),
            findings
        );
    }
}

fn run(cli: &Cli) -> Result<Generation, GeneratorError> {
    let config = load_config(cli)?;

    tracing::info!(
        input = %cli.input.display(),
        output = %cli.output.display(),
        dry_run = cli.dry_run,
        "generating client"
    );

    generate_and_write(&cli.input, &cli.output, &config, cli.dry_run)
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(&cli) {
        Ok(generation) => {
            print_diagnostics(&generation.diagnostics);
            print_summary(&generation, &cli.output, cli.dry_run);
        }
        Err(error) => {
            if let GeneratorError::InvalidOperationId { diagnostics, .. } = &error {
                print_diagnostics(diagnostics);
            }
            eprintln!("{} {}", "Generation failed:".red().bold(), error);
            std::process::exit(1);
        }
    }
}
