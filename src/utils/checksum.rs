//! Artifact checksum calculation.
//!
//! SHA-256 checksums are computed for generated installers and logged so
//! users can verify downloaded release assets.

use crate::error::StageError;
use sha2::{Digest, Sha256};
use std::path::Path;
use tokio::io::AsyncReadExt;

/// Calculates the SHA-256 checksum of a file.
///
/// Reads the file in 8KB chunks to handle large installers efficiently.
/// Returns the hex-encoded hash (64 characters).
pub async fn sha256_file(path: &Path) -> Result<String, StageError> {
    let mut file = tokio::fs::File::open(path).await?;
    let mut hasher = Sha256::new();
    let mut buffer = vec![0u8; 8192];

    loop {
        let n = file.read(&mut buffer).await?;
        if n == 0 {
            break;
        }
        hasher.update(&buffer[..n]);
    }

    Ok(hex::encode(hasher.finalize()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn hashes_known_content() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("artifact.bin");
        std::fs::write(&path, b"abc").unwrap();

        let digest = sha256_file(&path).await.unwrap();
        // SHA-256 of "abc"
        assert_eq!(
            digest,
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[tokio::test]
    async fn missing_file_is_an_error() {
        let err = sha256_file(Path::new("/no/such/artifact.exe"))
            .await
            .unwrap_err();
        assert!(matches!(err, StageError::Io(_)));
    }
}
