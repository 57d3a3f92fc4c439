//! # typeassert CLI entry point
//!
//! Parses command-line arguments and dispatches to subcommand handlers.

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use typeassert_cli::check::{run_check, CheckArgs};
use typeassert_cli::compile::{run_compile, CompileArgs};
use typeassert_cli::EXIT_FAULT;

/// Check JSON and YAML documents against a JSON Schema.
#[derive(Parser, Debug)]
#[command(name = "typeassert", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Validate data files against a schema, one JSON result line per file.
    Check(CheckArgs),

    /// Compile a schema and report whether it is usable.
    Compile(CompileArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    // stdout carries the result lines.
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    tracing::debug!(version = env!("CARGO_PKG_VERSION"), "typeassert starting");

    let result = match &cli.command {
        Commands::Check(args) => run_check(args),
        Commands::Compile(args) => run_compile(args),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(EXIT_FAULT)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use typeassert_core::{CoerceTypes, RemoveAdditional, UseDefaults};

    #[test]
    fn cli_parse_check_minimal() {
        let cli =
            Cli::try_parse_from(["typeassert", "check", "--schema", "s.json", "a.json"]).unwrap();
        let Commands::Check(args) = cli.command else {
            panic!("expected check");
        };
        assert_eq!(args.schema, PathBuf::from("s.json"));
        assert_eq!(args.files, vec![PathBuf::from("a.json")]);
        assert!(!args.eager);
        assert!(args.fallback.is_none());
        assert!(args.options.remove_additional.is_none());
    }

    #[test]
    fn cli_parse_check_all_flags() {
        let cli = Cli::try_parse_from([
            "typeassert",
            "-vv",
            "check",
            "--schema",
            "s.yaml",
            "a.json",
            "b.yaml",
            "--config",
            "opts.json",
            "--remove-additional",
            "failing",
            "--use-defaults",
            "empty",
            "--coerce-types",
            "array",
            "--eager",
            "--all-errors",
            "--fallback",
            "null",
        ])
        .unwrap();
        assert_eq!(cli.verbose, 2);
        let Commands::Check(args) = cli.command else {
            panic!("expected check");
        };
        assert_eq!(args.files.len(), 2);
        assert_eq!(args.options.config, Some(PathBuf::from("opts.json")));
        assert_eq!(args.options.remove_additional, Some(RemoveAdditional::Failing));
        assert_eq!(args.options.use_defaults, Some(UseDefaults::Empty));
        assert_eq!(args.options.coerce_types, Some(CoerceTypes::Array));
        assert!(args.options.all_errors);
        assert!(args.eager);
        assert_eq!(args.fallback.as_deref(), Some("null"));
    }

    #[test]
    fn cli_parse_boolean_spelling_of_modes() {
        let cli = Cli::try_parse_from([
            "typeassert",
            "check",
            "--schema",
            "s.json",
            "a.json",
            "--remove-additional",
            "true",
        ])
        .unwrap();
        let Commands::Check(args) = cli.command else {
            panic!("expected check");
        };
        assert_eq!(args.options.remove_additional, Some(RemoveAdditional::Declared));
    }

    #[test]
    fn cli_parse_check_requires_data_file() {
        assert!(Cli::try_parse_from(["typeassert", "check", "--schema", "s.json"]).is_err());
    }

    #[test]
    fn cli_parse_rejects_unknown_mode() {
        let parsed = Cli::try_parse_from([
            "typeassert",
            "check",
            "--schema",
            "s.json",
            "a.json",
            "--coerce-types",
            "object",
        ]);
        assert!(parsed.is_err());
    }

    #[test]
    fn cli_parse_compile() {
        let cli = Cli::try_parse_from(["typeassert", "compile", "--schema", "s.json"]).unwrap();
        let Commands::Compile(args) = cli.command else {
            panic!("expected compile");
        };
        assert_eq!(args.schema, PathBuf::from("s.json"));
        assert!(args.options.config.is_none());
    }
}
