//! Integration tests for hash crate

#[cfg(test)]
mod tests {
    use bytes::Bytes;
    use futures::stream;
    use provmirror_errors::{Error, StorageError};
    use provmirror_hash::*;
    use tempfile::tempdir;
    use tokio::fs;

    #[tokio::test]
    async fn test_stream_matches_file_digest() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("terraform-provider-aws_6.26.0_linux_amd64.zip");
        let data = b"provider archive bytes".repeat(1000);
        fs::write(&file_path, &data).await.unwrap();

        let chunks: Vec<Result<Bytes, Error>> = data
            .chunks(4096)
            .map(|c| Ok(Bytes::copy_from_slice(c)))
            .collect();
        let (streamed, total) = Hash::hash_stream(stream::iter(chunks)).await.unwrap();

        assert_eq!(total, data.len() as u64);
        assert_eq!(streamed, Hash::hash_file(&file_path).await.unwrap());
    }

    #[tokio::test]
    async fn test_stream_error_propagates() {
        let chunks: Vec<Result<Bytes, Error>> = vec![
            Ok(Bytes::from_static(b"partial")),
            Err(StorageError::Io {
                message: "connection reset".into(),
            }
            .into()),
        ];
        assert!(Hash::hash_stream(stream::iter(chunks)).await.is_err());
    }

    #[tokio::test]
    async fn test_reader_digest() {
        let data: &[u8] = b"hello world";
        let hash = Hash::hash_reader(data).await.unwrap();
        assert_eq!(hash, Hash::from_data(b"hello world"));
        assert_eq!(hash.to_string(), hash.to_hex());
    }
}
