//! Loading request bodies from JSON or YAML files.
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

use crate::dependencies::FileReader;

#[derive(Debug, thiserror::Error)]
pub enum FileLoadError {
    #[error("failed to read file {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("unsupported file extension for {0}, use a .json, .yaml or .yml file")]
    UnsupportedExtension(PathBuf),
    #[error("failed to parse {path}: {message}")]
    Parse { path: PathBuf, message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DocumentKind {
    Json,
    Yaml,
}

fn document_kind(path: &Path) -> Result<DocumentKind, FileLoadError> {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase);

    match extension.as_deref() {
        Some("json") => Ok(DocumentKind::Json),
        Some("yaml") | Some("yml") => Ok(DocumentKind::Yaml),
        _ => Err(FileLoadError::UnsupportedExtension(path.to_path_buf())),
    }
}

/// Parse the contents of `path` into a JSON document.
pub fn parse_document(path: &Path, contents: &str) -> Result<Value, FileLoadError> {
    let parse_error = |message: String| FileLoadError::Parse {
        path: path.to_path_buf(),
        message,
    };

    match document_kind(path)? {
        DocumentKind::Json => serde_json::from_str(contents).map_err(|e| parse_error(e.to_string())),
        DocumentKind::Yaml => {
            serde_yaml::from_str(contents).map_err(|e| parse_error(e.to_string()))
        }
    }
}

/// Read and parse a JSON or YAML document.
pub async fn load_document(
    reader: &(dyn FileReader + Send + Sync),
    path: &Path,
) -> Result<Value, FileLoadError> {
    // Reject unsupported files before touching the disk.
    document_kind(path)?;

    debug!(path = %path.display(), "loading file");
    let contents = reader
        .read_to_string(path)
        .await
        .map_err(|source| FileLoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;

    parse_document(path, &contents)
}

/// Convert a loaded document into a typed request body.
pub fn from_document<T: DeserializeOwned>(path: &Path, document: Value) -> Result<T, FileLoadError> {
    serde_json::from_value(document).map_err(|e| FileLoadError::Parse {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::dependencies::mocks::MockRequestFiles;

    #[test]
    fn test_parse_yaml_and_json() {
        let yaml = parse_document(Path::new("cluster.yaml"), "name: Cluster0\npaused: false\n").unwrap();
        assert_eq!(yaml, json!({"name": "Cluster0", "paused": false}));

        let json = parse_document(Path::new("cluster.JSON"), r#"{"name": "Cluster0"}"#).unwrap();
        assert_eq!(json, json!({"name": "Cluster0"}));
    }

    #[test]
    fn test_parse_invalid_contents() {
        let err = parse_document(Path::new("cluster.json"), "{").unwrap_err();
        assert!(matches!(err, FileLoadError::Parse { .. }));
    }

    #[tokio::test]
    async fn test_unsupported_extension_is_not_read() {
        let mut reader = MockRequestFiles::new();
        reader.expect_read_to_string().never();

        let err = load_document(&reader, Path::new("cluster.txt"))
            .await
            .unwrap_err();
        assert!(matches!(err, FileLoadError::UnsupportedExtension(_)));
    }

    #[tokio::test]
    async fn test_load_typed() {
        #[derive(Debug, serde::Deserialize)]
        struct Body {
            name: String,
        }

        let mut reader = MockRequestFiles::new();
        reader
            .expect_read_to_string()
            .returning(|_| Ok("name: Cluster0".to_string()));

        let path = Path::new("cluster.yml");
        let document = load_document(&reader, path).await.unwrap();
        let body: Body = from_document(path, document).unwrap();
        assert_eq!(body.name, "Cluster0");

        let err = from_document::<Body>(path, json!({"name": 1})).unwrap_err();
        assert!(matches!(err, FileLoadError::Parse { .. }));
    }

    #[tokio::test]
    async fn test_load_missing_file() {
        let mut reader = MockRequestFiles::new();
        reader.expect_read_to_string().returning(|_| {
            Err(std::io::Error::new(std::io::ErrorKind::NotFound, "missing"))
        });

        let err = load_document(&reader, Path::new("cluster.json"))
            .await
            .unwrap_err();
        assert!(matches!(err, FileLoadError::Io { .. }));
    }
}
