#![warn(mismatched_lifetime_syntaxes)]
#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Artifact storage for provmirror
//!
//! Fetched binaries, checksum manifests and signatures are streamed into
//! an [`ArtifactStore`] and read back from it when publishing. The store
//! also keeps the manifest that links a fetch to a later publish.

mod file_store;
mod manifest_io;

pub use file_store::LocalStore;
pub use manifest_io::{load_manifest, save_manifest};

use bytes::Bytes;
use futures::stream::BoxStream;
use provmirror_errors::Error;
use provmirror_hash::Hash;
use provmirror_types::ArtifactLocation;

/// Byte stream moving through the store
pub type ByteStream = BoxStream<'static, Result<Bytes, Error>>;

/// Where fetched artifacts live until they are published
#[async_trait::async_trait]
pub trait ArtifactStore: Send + Sync {
    /// Write a stream under `key`, returning its location and byte count.
    ///
    /// Nothing is visible under `key` unless the whole stream was written.
    async fn put_stream(&self, key: &str, stream: ByteStream)
        -> Result<(ArtifactLocation, u64), Error>;

    /// Read a stored artifact back as a stream
    async fn open(&self, location: &ArtifactLocation) -> Result<ByteStream, Error>;

    /// Size of a stored artifact in bytes
    async fn size(&self, location: &ArtifactLocation) -> Result<u64, Error>;

    async fn put_object(&self, key: &str, bytes: &[u8]) -> Result<ArtifactLocation, Error>;

    async fn get_object(&self, key: &str) -> Result<Vec<u8>, Error>;

    /// Keys of the objects directly under `prefix`
    async fn list_prefix(&self, prefix: &str) -> Result<Vec<String>, Error>;

    /// Remove one object; a missing object is not an error
    async fn remove(&self, key: &str) -> Result<(), Error>;

    /// Remove everything under `prefix`; a missing prefix is not an error
    async fn remove_prefix(&self, prefix: &str) -> Result<(), Error>;
}

/// SHA-256 of a stored artifact, streamed in fixed-size chunks
///
/// # Errors
///
/// Returns an error if the artifact cannot be opened or read.
pub async fn digest<S>(store: &S, location: &ArtifactLocation) -> Result<Hash, Error>
where
    S: ArtifactStore + ?Sized,
{
    let stream = store.open(location).await?;
    let (hash, _) = Hash::hash_stream(stream).await?;
    Ok(hash)
}
