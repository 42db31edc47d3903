//! GPG key operations
//!
//! Public keys come either from an ASCII-armored file or from the local
//! GnuPG keyring (`gpg --armor --export`). Signing keys of a public
//! provider release can be fetched from the source registry and written
//! to disk for import.

use provmirror_errors::{Error, OpsError, StorageError};
use provmirror_events::EventEmitter;
use provmirror_registry::{GpgKeyRecord, GpgPublicKey, KeyRegistry, SourceRegistry};
use provmirror_types::ProviderRef;
use std::path::{Path, PathBuf};
use tokio::process::Command;

/// Where an ASCII-armored public key is read from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeySource {
    File(PathBuf),
    /// Key id or fingerprint in the local keyring
    Keyring(String),
}

impl KeySource {
    /// Read the armored key
    ///
    /// # Errors
    ///
    /// Returns a storage error if the file cannot be read, or
    /// `KeyExportFailed` if `gpg` fails or exports nothing.
    pub async fn read(&self) -> Result<String, Error> {
        match self {
            Self::File(path) => tokio::fs::read_to_string(path)
                .await
                .map_err(|err| StorageError::at_path(&err, path).into()),
            Self::Keyring(key_id) => export_from_keyring(key_id).await,
        }
    }
}

async fn export_from_keyring(key_id: &str) -> Result<String, Error> {
    let failed = |message: String| -> Error {
        OpsError::KeyExportFailed {
            key_id: key_id.to_string(),
            message,
        }
        .into()
    };

    let output = Command::new("gpg")
        .args(["--armor", "--export", key_id])
        .output()
        .await
        .map_err(|err| failed(format!("could not run gpg: {err}")))?;
    if !output.status.success() {
        return Err(failed(
            String::from_utf8_lossy(&output.stderr).trim().to_string(),
        ));
    }

    let armor = String::from_utf8_lossy(&output.stdout).trim().to_string();
    if armor.is_empty() {
        return Err(failed("no key exported".to_string()));
    }
    Ok(armor)
}

/// Signing keys of a release on the source registry
///
/// # Errors
///
/// Returns the source registry error.
pub async fn fetch_signing_keys(
    source: &dyn SourceRegistry,
    provider: &ProviderRef,
    version: Option<&str>,
) -> Result<Vec<GpgPublicKey>, Error> {
    source.signing_keys(provider, version).await
}

/// Write fetched keys as `.asc` files
///
/// A single key is written to `output`. Several keys are written next to
/// it as `{stem}_{key_id}{ext}`.
///
/// # Errors
///
/// Returns a storage error if a file cannot be written.
pub async fn save_signing_keys(keys: &[GpgPublicKey], output: &Path) -> Result<Vec<PathBuf>, Error> {
    let paths: Vec<PathBuf> = match keys {
        [_] => vec![output.to_path_buf()],
        _ => keys.iter().map(|key| keyed_path(output, &key.key_id)).collect(),
    };

    for (key, path) in keys.iter().zip(&paths) {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|err| StorageError::at_path(&err, parent))?;
        }
        tokio::fs::write(path, &key.ascii_armor)
            .await
            .map_err(|err| StorageError::at_path(&err, path))?;
    }
    Ok(paths)
}

fn keyed_path(output: &Path, key_id: &str) -> PathBuf {
    let stem = output
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let name = match output.extension() {
        Some(ext) => format!("{stem}_{key_id}.{}", ext.to_string_lossy()),
        None => format!("{stem}_{key_id}"),
    };
    output.with_file_name(name)
}

/// Register a public key with the private registry
///
/// # Errors
///
/// Returns the read error or the registry error.
pub async fn create_key<E: EventEmitter + ?Sized>(
    emitter: &E,
    keys: &dyn KeyRegistry,
    source: &KeySource,
) -> Result<GpgKeyRecord, Error> {
    let armor = source.read().await?;
    let record = keys.create_key(&armor).await?;
    emitter.emit_debug(format!("registered gpg key {}", record.key_id));
    Ok(record)
}

/// Replace the armored material of a registered key
///
/// # Errors
///
/// Returns the read error or the registry error.
pub async fn update_key<E: EventEmitter + ?Sized>(
    emitter: &E,
    keys: &dyn KeyRegistry,
    key_id: &str,
    source: &KeySource,
) -> Result<GpgKeyRecord, Error> {
    let armor = source.read().await?;
    let record = keys.update_key(key_id, &armor).await?;
    emitter.emit_debug(format!("updated gpg key {}", record.key_id));
    Ok(record)
}
