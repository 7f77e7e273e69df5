//! CLI entry point for ino2cpp.
//!
//! Converts each sketch given on the command line into a `.h`/`.cpp` pair.
//! Files are processed in order; a failing file does not stop the rest.

use anyhow::{anyhow, bail};
use clap::{
    Parser,
    builder::styling::{AnsiColor, Effects, Styles},
};
use ino2cpp::io::{ExitCode, OutputFormat, OutputManager, ResponseMeta};
use ino2cpp::{Converter, Settings, logging};
use std::path::PathBuf;
use std::time::Instant;

fn clap_cargo_style() -> Styles {
    Styles::styled()
        .header(AnsiColor::Cyan.on_default() | Effects::BOLD)
        .usage(AnsiColor::Cyan.on_default() | Effects::BOLD)
        .literal(AnsiColor::Green.on_default())
        .placeholder(AnsiColor::Green.on_default())
}

/// ino2cpp converts arduino INO files to C++ files
#[derive(Parser)]
#[command(
    name = "ino2cpp",
    version = env!("CARGO_PKG_VERSION"),
    about = "ino2cpp converts arduino INO files to C++ files",
    long_about = "Writes <name>.h with a forward declaration for every top-level function \
                  and <name>.cpp with the sketch behind #include <Arduino.h> and #include \"<name>.h\".",
    styles = clap_cargo_style()
)]
struct Cli {
    /// INO file(s) to convert
    #[arg(value_name = "INO_FILE", required = true)]
    ino_files: Vec<PathBuf>,

    /// Target directory, created if missing
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Path to custom settings.toml file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Print a JSON report on stdout
    #[arg(long)]
    json: bool,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

/// Resolve settings: explicit file or workspace discovery, then CLI flags.
fn load_settings(cli: &Cli) -> anyhow::Result<Settings> {
    let mut settings = match &cli.config {
        Some(path) => {
            if !path.is_file() {
                bail!("settings file {} not found", path.display());
            }
            Settings::load_from(path)
                .map_err(|e| anyhow!("loading settings from {}: {e}", path.display()))?
        }
        None => Settings::load().unwrap_or_else(|e| {
            eprintln!("Configuration error: {e}");
            eprintln!("Using default configuration.");
            Settings::default()
        }),
    };

    if let Some(output) = &cli.output {
        settings.output_dir = output.clone();
    }
    if cli.verbose {
        settings.debug = true;
    }
    Ok(settings)
}

fn main() -> std::process::ExitCode {
    let cli = Cli::parse();
    let started = Instant::now();

    let mut output = OutputManager::new(OutputFormat::from_json_flag(cli.json));

    let settings = match load_settings(&cli) {
        Ok(settings) => settings,
        Err(e) => {
            return output
                .config_error(&format!("{e:#}"))
                .unwrap_or(ExitCode::ConfigError)
                .into();
        }
    };

    if let Err(e) = logging::init_logging(settings.debug) {
        eprintln!("Warning: {e}");
    }

    let mut converter = match Converter::from_settings(&settings) {
        Ok(converter) => converter,
        Err(e) => {
            return output
                .error(&e)
                .unwrap_or(ExitCode::GeneralError)
                .into();
        }
    };

    let results = converter.convert_all(&cli.ino_files);

    let meta = ResponseMeta::now(Some(started.elapsed().as_millis() as u64));
    output
        .report(&cli.ino_files, &results, Some(meta))
        .unwrap_or(ExitCode::GeneralError)
        .into()
}
