//! # pcae CLI entry point
//!
//! Parses command-line arguments and dispatches to subcommand handlers.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use pcae_cli::audit::{run_audit, AuditArgs};
use pcae_cli::config::{run_config, ConfigArgs};
use pcae_cli::keygen::{run_keygen, KeygenArgs};

/// Parametric configuration and audit engine CLI.
#[derive(Parser, Debug)]
#[command(name = "pcae", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Fixture document (YAML or JSON) backing the data source.
    #[arg(long, global = true)]
    data: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Resolve, score, scaffold and apply tenant configurations.
    Config(ConfigArgs),

    /// Record into, query, export and verify audit trail files.
    Audit(AuditArgs),

    /// Generate an Ed25519 audit signing key.
    Keygen(KeygenArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let data = cli.data.as_deref();
    let result = match &cli.command {
        Commands::Config(args) => run_config(args, data),
        Commands::Audit(args) => run_audit(args, data),
        Commands::Keygen(args) => run_keygen(args),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(1)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn global_flags_parse_after_subcommand() {
        let cli = Cli::try_parse_from([
            "pcae", "config", "get", "CO", "healthcare", "--data", "data/tenants.yaml", "-vv",
        ])
        .unwrap();
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.data, Some(PathBuf::from("data/tenants.yaml")));
        assert!(matches!(cli.command, Commands::Config(_)));
    }

    #[test]
    fn record_requires_key_and_log() {
        let result = Cli::try_parse_from([
            "pcae", "audit", "record", "--country", "CO", "--industry", "healthcare", "--type",
            "case_created", "--level", "low",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn repeated_context_entries_collect() {
        let cli = Cli::try_parse_from([
            "pcae", "audit", "record", "--log", "t.json", "--key", "k", "--country", "CO",
            "--industry", "healthcare", "--type", "case_created", "--level", "low", "--context",
            "case_type=queja", "--context", "priority=high",
        ])
        .unwrap();
        match cli.command {
            Commands::Audit(AuditArgs {
                command: pcae_cli::audit::AuditCommand::Record(record),
            }) => assert_eq!(record.context.len(), 2),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn list_accepts_rfc3339_bounds() {
        let cli = Cli::try_parse_from([
            "pcae", "audit", "list", "trail.json", "--from", "2026-01-01T00:00:00Z", "--level",
            "high",
        ]);
        assert!(cli.is_ok());
    }
}
