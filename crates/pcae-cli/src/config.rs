//! # Config Subcommand
//!
//! Tenant configuration queries against a fixture document.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use pcae_config::{CaseEntity, ConfigurationEngine};

use crate::{block_on, load_engine, print_json};

#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Resolve and print a tenant configuration.
    Get {
        country: String,
        industry: String,
        /// Include the per-facet resolution outcomes.
        #[arg(long)]
        report: bool,
    },

    /// Score a tenant configuration. Exits 2 when it has errors.
    Validate { country: String, industry: String },

    /// Print default case scaffolding for a case type.
    UseCase {
        country: String,
        industry: String,
        case_type: String,
    },

    /// Stamp a case entity (JSON file) with its tenant configuration.
    Apply {
        country: String,
        industry: String,
        /// JSON object with at least `case_type` and `priority`.
        #[arg(value_name = "FILE")]
        entity: PathBuf,
    },
}

pub fn run_config(args: &ConfigArgs, data: Option<&Path>) -> Result<u8> {
    match &args.command {
        // Scaffolding needs no data source.
        ConfigCommand::UseCase {
            country,
            industry,
            case_type,
        } => {
            print_json(&pcae_config::configure_use_case(country, industry, case_type))?;
            Ok(0)
        }
        command => {
            let engine = load_engine(data)?;
            block_on(run_with_engine(command, &engine))?
        }
    }
}

async fn run_with_engine(command: &ConfigCommand, engine: &ConfigurationEngine) -> Result<u8> {
    match command {
        ConfigCommand::Get {
            country,
            industry,
            report,
        } => {
            let resolution = engine.resolve(country, industry).await?;
            let degraded = resolution.report.degraded();
            if !degraded.is_empty() {
                tracing::warn!(?degraded, "some facets fell back to defaults");
            }
            if *report {
                print_json(&resolution)?;
            } else {
                print_json(&resolution.configuration)?;
            }
            Ok(0)
        }
        ConfigCommand::Validate { country, industry } => {
            let configuration = engine.get_configuration(country, industry).await?;
            let result = engine.validate_configuration(&configuration);
            print_json(&result)?;
            Ok(if result.is_valid { 0 } else { 2 })
        }
        ConfigCommand::Apply {
            country,
            industry,
            entity,
        } => {
            let content = std::fs::read_to_string(entity)
                .with_context(|| format!("failed to read entity: {}", entity.display()))?;
            let case: CaseEntity = serde_json::from_str(&content)
                .with_context(|| format!("failed to parse entity JSON: {}", entity.display()))?;
            let configuration = engine.get_configuration(country, industry).await?;
            print_json(&engine.apply_configuration(case, &configuration))?;
            Ok(0)
        }
        ConfigCommand::UseCase {
            country,
            industry,
            case_type,
        } => {
            print_json(&engine.configure_use_case(country, industry, case_type))?;
            Ok(0)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixture() -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR"))
            .join("..")
            .join("..")
            .join("data")
            .join("tenants.yaml")
    }

    #[test]
    fn validate_complete_tenant_exits_zero() {
        let args = ConfigArgs {
            command: ConfigCommand::Validate {
                country: "CO".into(),
                industry: "healthcare".into(),
            },
        };
        assert_eq!(run_config(&args, Some(fixture().as_path())).unwrap(), 0);
    }

    #[test]
    fn unknown_country_fails_validation() {
        let args = ConfigArgs {
            command: ConfigCommand::Validate {
                country: "ZZ".into(),
                industry: "healthcare".into(),
            },
        };
        assert_eq!(run_config(&args, Some(fixture().as_path())).unwrap(), 2);
    }

    #[test]
    fn get_without_data_is_an_error() {
        let args = ConfigArgs {
            command: ConfigCommand::Get {
                country: "CO".into(),
                industry: "healthcare".into(),
                report: false,
            },
        };
        let err = run_config(&args, None).unwrap_err();
        assert!(err.to_string().contains("--data"));
    }

    #[test]
    fn use_case_needs_no_data() {
        let args = ConfigArgs {
            command: ConfigCommand::UseCase {
                country: "CO".into(),
                industry: "healthcare".into(),
                case_type: "queja".into(),
            },
        };
        assert_eq!(run_config(&args, None).unwrap(), 0);
    }

    #[test]
    fn apply_reads_entity_file() {
        let dir = tempfile::tempdir().unwrap();
        let entity = dir.path().join("case.json");
        std::fs::write(&entity, r#"{"case_type":"queja","priority":"high","case_number":"X-1"}"#)
            .unwrap();
        let args = ConfigArgs {
            command: ConfigCommand::Apply {
                country: "CO".into(),
                industry: "healthcare".into(),
                entity,
            },
        };
        assert_eq!(run_config(&args, Some(fixture().as_path())).unwrap(), 0);
    }

    #[test]
    fn apply_rejects_malformed_entity() {
        let dir = tempfile::tempdir().unwrap();
        let entity = dir.path().join("case.json");
        std::fs::write(&entity, "not json").unwrap();
        let args = ConfigArgs {
            command: ConfigCommand::Apply {
                country: "CO".into(),
                industry: "healthcare".into(),
                entity,
            },
        };
        assert!(run_config(&args, Some(fixture().as_path())).is_err());
    }
}
