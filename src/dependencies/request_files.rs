use std::{io, path::Path};

use async_trait::async_trait;

/// Reads request bodies passed with `--file`.
#[derive(Debug, Clone, Copy, Default)]
pub struct RequestFiles;

// Dependency to read request bodies from disk
#[async_trait]
pub trait FileReader {
    async fn read_to_string(&self, path: &Path) -> io::Result<String>;
}

#[async_trait]
impl FileReader for RequestFiles {
    async fn read_to_string(&self, path: &Path) -> io::Result<String> {
        // Only regular files can hold a request body.
        if !tokio::fs::metadata(path).await?.is_file() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "not a regular file",
            ));
        }

        tokio::fs::read_to_string(path).await
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_read_request_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cluster.json");
        std::fs::write(&path, r#"{"name": "Cluster0"}"#).unwrap();

        let contents = RequestFiles.read_to_string(&path).await.unwrap();
        assert_eq!(contents, r#"{"name": "Cluster0"}"#);
    }

    #[tokio::test]
    async fn test_directory_is_rejected() {
        let dir = tempfile::tempdir().unwrap();

        let err = RequestFiles.read_to_string(dir.path()).await.unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
    }
}
