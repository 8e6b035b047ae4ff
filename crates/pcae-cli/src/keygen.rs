//! # Keygen Subcommand
//!
//! Writes `<prefix>.key` (hex seed, the value `PCAE_SIGNING_KEY_HEX`
//! expects) and `<prefix>.pub` (hex public key).

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use pcae_crypto::Ed25519KeyPair;

#[derive(Args, Debug)]
pub struct KeygenArgs {
    /// Output directory for the key files.
    #[arg(long, short, default_value = ".")]
    pub output: PathBuf,
    #[arg(long, default_value = "pcae")]
    pub prefix: String,
}

pub fn run_keygen(args: &KeygenArgs) -> Result<u8> {
    cmd_keygen(&args.output, &args.prefix)
}

pub(crate) fn cmd_keygen(output_dir: &Path, prefix: &str) -> Result<u8> {
    std::fs::create_dir_all(output_dir).with_context(|| {
        format!(
            "failed to create output directory: {}",
            output_dir.display()
        )
    })?;

    let key = Ed25519KeyPair::generate();
    let public_hex = key.public_key().to_hex();

    let key_path = output_dir.join(format!("{prefix}.key"));
    let pub_path = output_dir.join(format!("{prefix}.pub"));

    std::fs::write(&key_path, key.seed_hex().as_bytes())
        .with_context(|| format!("failed to write signing key: {}", key_path.display()))?;
    std::fs::write(&pub_path, &public_hex)
        .with_context(|| format!("failed to write public key: {}", pub_path.display()))?;

    println!("OK: generated Ed25519 audit signing key");
    println!("  Signing key: {}", key_path.display());
    println!("  Public key:  {}", pub_path.display());
    println!("  Public key (hex): {public_hex}");

    Ok(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{read_public_key, read_signing_key};

    #[test]
    fn keygen_writes_matching_pair() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(cmd_keygen(dir.path(), "test").unwrap(), 0);

        let seed = std::fs::read_to_string(dir.path().join("test.key")).unwrap();
        assert_eq!(seed.len(), 64);

        let key = read_signing_key(&dir.path().join("test.key")).unwrap();
        let public = read_public_key(&dir.path().join("test.pub")).unwrap();
        assert_eq!(key.public_key(), public);
    }

    #[test]
    fn keygen_creates_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("keys").join("audit");
        cmd_keygen(&nested, "pcae").unwrap();
        assert!(nested.join("pcae.pub").exists());
    }

    #[test]
    fn garbage_key_file_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.key");
        std::fs::write(&path, "zz").unwrap();
        assert!(read_signing_key(&path).is_err());
    }
}
