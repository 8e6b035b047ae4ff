//! # Audit Subcommand
//!
//! Works on audit trail files: JSON arrays of events as produced by
//! `AuditLog::export`. `record` refuses to append to a file whose chain
//! does not verify under the signing key.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use clap::{Args, Subcommand};
use pcae_audit::{
    ActorContext, AuditDetails, AuditEventFactory, AuditEventType, AuditFilter, AuditLevel,
    AuditLog, AuditStatus,
};
use serde::de::DeserializeOwned;

use crate::{block_on, load_engine, print_json, read_public_key, read_signing_key};

#[derive(Args, Debug)]
pub struct AuditArgs {
    #[command(subcommand)]
    pub command: AuditCommand,
}

#[derive(Subcommand, Debug)]
pub enum AuditCommand {
    /// Append a signed event to a trail file, creating it if needed.
    Record(RecordArgs),

    /// Verify the hash chain and signatures of a trail file. Exits 2 when broken.
    Verify {
        #[arg(value_name = "FILE")]
        file: PathBuf,
        /// Require every event to be signed by this key (hex file).
        #[arg(long)]
        pubkey: Option<PathBuf>,
    },

    /// Print the events matching a filter.
    List {
        #[arg(value_name = "FILE")]
        file: PathBuf,
        #[command(flatten)]
        filter: FilterArgs,
    },

    /// Print event counts.
    Stats {
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },

    /// Export the events matching a filter as a JSON array.
    Export {
        #[arg(value_name = "FILE")]
        file: PathBuf,
        #[command(flatten)]
        filter: FilterArgs,
        /// Write to this file instead of stdout.
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
}

#[derive(Args, Debug)]
pub struct RecordArgs {
    /// Trail file to append to.
    #[arg(long)]
    pub log: PathBuf,
    /// Signing key (hex seed file, as written by `pcae keygen`).
    #[arg(long)]
    pub key: PathBuf,
    #[arg(long)]
    pub country: String,
    #[arg(long)]
    pub industry: String,
    /// Event type, e.g. `case_created`.
    #[arg(long = "type")]
    pub event_type: String,
    /// One of low, medium, high, critical.
    #[arg(long)]
    pub level: String,
    #[arg(long)]
    pub description: Option<String>,
    /// Context entry as `key=value`. Repeatable.
    #[arg(long = "context", value_name = "KEY=VALUE")]
    pub context: Vec<String>,
    #[arg(long)]
    pub resource: Option<String>,
    /// Acting user name; defaults to the system actor.
    #[arg(long)]
    pub user: Option<String>,
}

#[derive(Args, Debug, Default)]
pub struct FilterArgs {
    #[arg(long = "type")]
    pub event_type: Option<String>,
    #[arg(long)]
    pub level: Option<String>,
    #[arg(long)]
    pub status: Option<String>,
    #[arg(long)]
    pub user: Option<String>,
    #[arg(long)]
    pub resource: Option<String>,
    /// RFC 3339 lower bound, inclusive.
    #[arg(long)]
    pub from: Option<DateTime<Utc>>,
    /// RFC 3339 upper bound, inclusive.
    #[arg(long)]
    pub to: Option<DateTime<Utc>>,
    /// Free-text search over description, user and resource.
    #[arg(long)]
    pub query: Option<String>,
}

impl FilterArgs {
    fn to_filter(&self) -> Result<AuditFilter> {
        Ok(AuditFilter {
            event_type: self
                .event_type
                .as_deref()
                .map(|s| parse_name::<AuditEventType>("event type", s))
                .transpose()?,
            level: self
                .level
                .as_deref()
                .map(|s| parse_name::<AuditLevel>("level", s))
                .transpose()?,
            status: self
                .status
                .as_deref()
                .map(|s| parse_name::<AuditStatus>("status", s))
                .transpose()?,
            user: self.user.clone(),
            resource: self.resource.clone(),
            from: self.from,
            to: self.to,
            query: self.query.clone(),
        })
    }
}

pub fn run_audit(args: &AuditArgs, data: Option<&Path>) -> Result<u8> {
    match &args.command {
        AuditCommand::Record(record) => cmd_record(record, data),
        AuditCommand::Verify { file, pubkey } => cmd_verify(file, pubkey.as_deref()),
        AuditCommand::List { file, filter } => {
            let log = read_trail(file, None)?;
            print_json(&log.filter(&filter.to_filter()?))?;
            Ok(0)
        }
        AuditCommand::Stats { file } => {
            print_json(&read_trail(file, None)?.statistics())?;
            Ok(0)
        }
        AuditCommand::Export {
            file,
            filter,
            output,
        } => {
            let log = read_trail(file, None)?;
            let exported = AuditLog::export(log.filter(&filter.to_filter()?))?;
            match output {
                Some(path) => {
                    std::fs::write(path, exported)
                        .with_context(|| format!("failed to write export: {}", path.display()))?;
                    println!("OK: exported to {}", path.display());
                }
                None => println!("{exported}"),
            }
            Ok(0)
        }
    }
}

fn cmd_record(args: &RecordArgs, data: Option<&Path>) -> Result<u8> {
    let event_type = parse_name::<AuditEventType>("event type", &args.event_type)?;
    let level = parse_name::<AuditLevel>("level", &args.level)?;
    let key = read_signing_key(&args.key)?;

    let mut log = if args.log.exists() {
        let log = read_trail(&args.log, Some(key.public_key()))?;
        let verification = log.verify_chain_integrity();
        if !verification.valid {
            bail!(
                "refusing to append to {}: chain broken at event {:?} ({})",
                args.log.display(),
                verification.first_broken_at,
                verification
                    .reason
                    .map(|r| r.to_string())
                    .unwrap_or_default()
            );
        }
        log
    } else {
        AuditLog::with_trusted_key(key.public_key())
    };

    let engine = load_engine(data)?;
    let configuration = block_on(engine.get_configuration(&args.country, &args.industry))??;

    let mut details = AuditDetails::describe(args.description.clone().unwrap_or_default());
    for entry in &args.context {
        let (k, v) = entry
            .split_once('=')
            .with_context(|| format!("context entry {entry:?} is not KEY=VALUE"))?;
        details = details.with_context(k.trim(), v.trim());
    }

    let mut factory = AuditEventFactory::new(configuration, Arc::new(key));
    if let Some(resource) = &args.resource {
        factory = factory.resource(resource.clone());
    }
    if let Some(user) = &args.user {
        factory = factory.actor(ActorContext {
            user_id: user.clone(),
            user_name: user.clone(),
            user_role: "OPERATOR".to_string(),
            ..ActorContext::system()
        });
    }

    let event = log.record(&factory, event_type, level, details)?;
    println!("OK: recorded {} {}", event.event_type, event.id);
    println!("  hash: {}", event.hash);

    let exported = AuditLog::export(log.events())?;
    std::fs::write(&args.log, exported)
        .with_context(|| format!("failed to write trail: {}", args.log.display()))?;
    Ok(0)
}

fn cmd_verify(file: &Path, pubkey: Option<&Path>) -> Result<u8> {
    let trusted = pubkey.map(read_public_key).transpose()?;
    let verification = read_trail(file, trusted)?.verify_chain_integrity();
    if verification.valid {
        println!("OK: {} events verified", verification.events_checked);
        Ok(0)
    } else {
        println!(
            "FAIL: chain broken at event {} ({})",
            verification.first_broken_at.unwrap_or_default(),
            verification
                .reason
                .map(|r| r.to_string())
                .unwrap_or_default()
        );
        Ok(2)
    }
}

fn read_trail(
    path: &Path,
    trusted: Option<pcae_crypto::Ed25519PublicKey>,
) -> Result<AuditLog> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read trail: {}", path.display()))?;
    let events = AuditLog::import(&content)
        .with_context(|| format!("failed to parse trail: {}", path.display()))?;
    Ok(AuditLog::from_events(events, trusted))
}

/// Parse a snake_case enum name the same way the JSON form is read.
fn parse_name<T: DeserializeOwned>(kind: &str, name: &str) -> Result<T> {
    serde_json::from_value(serde_json::Value::String(name.trim().to_ascii_lowercase()))
        .with_context(|| format!("unknown {kind}: {name:?}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keygen::cmd_keygen;

    fn fixture() -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR"))
            .join("..")
            .join("..")
            .join("data")
            .join("tenants.yaml")
    }

    fn record_args(dir: &Path, event_type: &str, level: &str) -> RecordArgs {
        RecordArgs {
            log: dir.join("trail.json"),
            key: dir.join("pcae.key"),
            country: "CO".into(),
            industry: "healthcare".into(),
            event_type: event_type.into(),
            level: level.into(),
            description: Some("PQRS case".into()),
            context: vec!["case_type=queja".into(), "priority=high".into()],
            resource: Some("PQRS-1".into()),
            user: Some("ana".into()),
        }
    }

    #[test]
    fn record_then_verify_with_pubkey() {
        let dir = tempfile::tempdir().unwrap();
        cmd_keygen(dir.path(), "pcae").unwrap();
        let data = fixture();

        assert_eq!(cmd_record(&record_args(dir.path(), "case_created", "high"), Some(data.as_path())).unwrap(), 0);
        assert_eq!(cmd_record(&record_args(dir.path(), "case_resolved", "critical"), Some(data.as_path())).unwrap(), 0);

        let trail = dir.path().join("trail.json");
        let log = read_trail(&trail, None).unwrap();
        assert_eq!(log.len(), 2);
        assert_eq!(log.events()[0].actor.user_name, "ana");
        assert_eq!(
            log.events()[1].previous_hash.as_deref(),
            Some(log.events()[0].hash.as_str())
        );

        let pubkey = dir.path().join("pcae.pub");
        assert_eq!(cmd_verify(&trail, Some(pubkey.as_path())).unwrap(), 0);
    }

    #[test]
    fn verify_flags_foreign_signer() {
        let dir = tempfile::tempdir().unwrap();
        cmd_keygen(dir.path(), "pcae").unwrap();
        cmd_keygen(dir.path(), "other").unwrap();
        cmd_record(&record_args(dir.path(), "case_created", "low"), Some(fixture().as_path())).unwrap();

        let trail = dir.path().join("trail.json");
        assert_eq!(cmd_verify(&trail, Some(dir.path().join("other.pub").as_path())).unwrap(), 2);
    }

    #[test]
    fn tampered_trail_fails_and_blocks_append() {
        let dir = tempfile::tempdir().unwrap();
        cmd_keygen(dir.path(), "pcae").unwrap();
        let data = fixture();
        cmd_record(&record_args(dir.path(), "case_created", "low"), Some(data.as_path())).unwrap();

        let trail = dir.path().join("trail.json");
        let content = std::fs::read_to_string(&trail).unwrap();
        std::fs::write(&trail, content.replace("PQRS case", "nothing to see")).unwrap();

        assert_eq!(cmd_verify(&trail, None).unwrap(), 2);
        let err = cmd_record(&record_args(dir.path(), "case_updated", "low"), Some(data.as_path())).unwrap_err();
        assert!(err.to_string().contains("refusing to append"));
    }

    #[test]
    fn unknown_event_type_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        cmd_keygen(dir.path(), "pcae").unwrap();
        let err = cmd_record(&record_args(dir.path(), "case_teleported", "low"), Some(fixture().as_path()))
            .unwrap_err();
        assert!(err.to_string().contains("unknown event type"));
    }

    #[test]
    fn filter_args_parse_names() {
        let args = FilterArgs {
            level: Some("Critical".into()),
            status: Some("flagged".into()),
            ..FilterArgs::default()
        };
        let filter = args.to_filter().unwrap();
        assert_eq!(filter.level, Some(AuditLevel::Critical));
        assert_eq!(filter.status, Some(AuditStatus::Flagged));

        let bad = FilterArgs {
            level: Some("extreme".into()),
            ..FilterArgs::default()
        };
        assert!(bad.to_filter().is_err());
    }

    #[test]
    fn export_writes_filtered_array() {
        let dir = tempfile::tempdir().unwrap();
        cmd_keygen(dir.path(), "pcae").unwrap();
        let data = fixture();
        cmd_record(&record_args(dir.path(), "case_created", "low"), Some(data.as_path())).unwrap();
        cmd_record(&record_args(dir.path(), "case_escalated", "critical"), Some(data.as_path())).unwrap();

        let output = dir.path().join("critical.json");
        let args = AuditArgs {
            command: AuditCommand::Export {
                file: dir.path().join("trail.json"),
                filter: FilterArgs {
                    level: Some("critical".into()),
                    ..FilterArgs::default()
                },
                output: Some(output.clone()),
            },
        };
        assert_eq!(run_audit(&args, None).unwrap(), 0);
        let events = AuditLog::import(&std::fs::read_to_string(output).unwrap()).unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].event_type, AuditEventType::CaseEscalated);
    }
}
