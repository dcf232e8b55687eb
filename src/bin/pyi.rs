//! Command-line interface for pyi
//! This binary parses stub files and prints them at different pipeline stages.
//!
//! Usage:
//!   pyi process `<path>` [--format F]    - Process a file and output to stdout
//!   pyi check `<path>`                   - Parse a file and report the first error
//!   pyi list-formats                     - List all available formats
//!
//! The target python version and platform come from `pyi.toml` in the working
//! directory (if present), `--config`, and the `--python-version` / `--platform` flags,
//! in increasing priority.

use clap::{Arg, ArgMatches, Command};
use log::{debug, info};
use pyi::pyi::config::{Loader, PyiConfig};
use pyi::pyi::parser::parse;
use pyi::pyi::processor::{available_formats, process_file, ProcessingError, ProcessingSpec};

fn main() {
    env_logger::init();

    let target_args = [
        Arg::new("config")
            .long("config")
            .value_name("FILE")
            .help("Configuration file (TOML)"),
        Arg::new("python-version")
            .long("python-version")
            .value_name("VERSION")
            .help("Target python version, e.g. 3.8"),
        Arg::new("platform")
            .long("platform")
            .value_name("PLATFORM")
            .help("Target platform, e.g. linux or win32"),
    ];

    let matches = Command::new("pyi")
        .version(env!("CARGO_PKG_VERSION"))
        .about("A tool for parsing and inspecting .pyi stub files")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(
            Command::new("process")
                .about("Process a file and output to stdout")
                .arg(
                    Arg::new("path")
                        .help("Path to the stub file to process")
                        .required(true)
                        .index(1),
                )
                .arg(
                    Arg::new("format")
                        .long("format")
                        .short('f')
                        .help("Output format (e.g., token-simple, ast-treeviz)"),
                )
                .args(target_args.clone()),
        )
        .subcommand(
            Command::new("check")
                .about("Parse a file and report the first error")
                .arg(
                    Arg::new("path")
                        .help("Path to the stub file to check")
                        .required(true)
                        .index(1),
                )
                .args(target_args),
        )
        .subcommand(Command::new("list-formats").about("List all available output formats"))
        .try_get_matches()
        .unwrap_or_else(|e| e.exit());

    match matches.subcommand() {
        Some(("process", process_matches)) => handle_process_command(process_matches),
        Some(("check", check_matches)) => handle_check_command(check_matches),
        Some(("list-formats", _)) => handle_formats_command(),
        _ => unreachable!("a subcommand is required"),
    }
}

/// Build the configuration from the default layers plus command-line overrides
fn load_config(matches: &ArgMatches) -> Result<PyiConfig, String> {
    let mut loader = Loader::new().with_optional_file("pyi.toml");
    if let Some(path) = matches.get_one::<String>("config") {
        loader = loader.with_file(path);
    }
    let overrides = [
        ("target.python_version", "python-version"),
        ("target.platform", "platform"),
        ("output.format", "format"),
    ];
    for (key, arg) in overrides {
        let value = matches.try_get_one::<String>(arg).ok().flatten();
        if let Some(value) = value {
            loader = loader
                .set_override(key, value.as_str())
                .map_err(|e| e.to_string())?;
        }
    }
    let config = loader.build().map_err(|e| e.to_string())?;
    debug!("loaded configuration: {:?}", config);
    Ok(config)
}

fn config_or_exit(matches: &ArgMatches) -> PyiConfig {
    load_config(matches).unwrap_or_else(|e| {
        eprintln!("Error: invalid configuration: {}", e);
        std::process::exit(1);
    })
}

/// Handle the process command
fn handle_process_command(matches: &ArgMatches) {
    let config = config_or_exit(matches);
    let path = required_path(matches);

    let result = ProcessingSpec::from_string(&config.output.format)
        .and_then(|spec| process_file(path, &spec, &config.target));
    match result {
        Ok(output) => print!("{}", output),
        Err(e) => {
            eprintln!("Error: {}", e);
            if matches!(
                e,
                ProcessingError::InvalidFormat(_)
                    | ProcessingError::InvalidStage(_)
                    | ProcessingError::InvalidFormatType(_)
            ) {
                eprintln!("\nAvailable formats:");
                for format in available_formats() {
                    eprintln!("  {}", format);
                }
            }
            std::process::exit(1);
        }
    }
}

/// Handle the check command
fn handle_check_command(matches: &ArgMatches) {
    let config = config_or_exit(matches);
    let path = required_path(matches);

    let source = std::fs::read_to_string(path).unwrap_or_else(|e| {
        eprintln!("Error: failed to read {}: {}", path, e);
        std::process::exit(1);
    });
    match parse(&source, &config) {
        Ok(module) => {
            info!("{}: {} definitions", path, module.definitions.len());
            println!("{}: ok", path);
        }
        Err(e) => {
            eprintln!("{}:{}:{}: {}", path, e.line, e.column, e.message);
            std::process::exit(1);
        }
    }
}

/// Handle the list-formats command
fn handle_formats_command() {
    println!("Available formats:");
    for format in available_formats() {
        println!("  {}", format);
    }
}

fn required_path(matches: &ArgMatches) -> &str {
    matches
        .get_one::<String>("path")
        .map(String::as_str)
        .unwrap_or_else(|| {
            eprintln!("Error: missing path");
            std::process::exit(1);
        })
}
