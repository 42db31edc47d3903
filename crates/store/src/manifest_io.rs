//! Manifest I/O helpers colocated with the store.

use crate::ArtifactStore;
use provmirror_errors::{Error, OpsError};
use provmirror_types::StoredManifest;

/// Write a manifest under its canonical key and return the key
///
/// # Errors
/// Returns an error if serialization or writing fails.
pub async fn save_manifest<S>(store: &S, manifest: &StoredManifest) -> Result<String, Error>
where
    S: ArtifactStore + ?Sized,
{
    let key = manifest.key();
    let json = serde_json::to_vec_pretty(manifest).map_err(|e| OpsError::SerializationError {
        message: format!("failed to serialize manifest: {e}"),
    })?;
    store.put_object(&key, &json).await?;
    Ok(key)
}

/// Read a manifest written by [`save_manifest`]
///
/// # Errors
/// Returns an error if reading or parsing the manifest fails.
pub async fn load_manifest<S>(store: &S, key: &str) -> Result<StoredManifest, Error>
where
    S: ArtifactStore + ?Sized,
{
    let bytes = store.get_object(key).await?;
    serde_json::from_slice(&bytes).map_err(|e| {
        OpsError::SerializationError {
            message: format!("invalid manifest {key}: {e}"),
        }
        .into()
    })
}
