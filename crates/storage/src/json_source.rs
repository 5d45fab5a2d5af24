//! JSON file item source.
//!
//! Reads a snapshot from either a single JSON file (a bare array of records or
//! an object with an `items` array) or a directory of such files.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use levelup_core::RawSnapshot;
use serde_json::Value;
use tokio::fs;
use tracing::debug;

use super::{ItemSource, Result, StorageError};

/// Split a snapshot document into its records: a bare array, an object with
/// an `items` array, or a single record.
fn document_records(document: Value) -> Vec<Value> {
    match document {
        Value::Array(records) => records,
        Value::Object(mut map) if map.get("items").is_some_and(Value::is_array) => {
            match map.remove("items") {
                Some(Value::Array(records)) => records,
                _ => Vec::new(),
            }
        }
        record => vec![record],
    }
}

/// File-based JSON item source.
pub struct JsonFileSource {
    path: PathBuf,
}

impl JsonFileSource {
    /// Create a source reading from `path` (file or directory).
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// The path read on every fetch.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl ItemSource for JsonFileSource {
    async fn fetch_snapshot(&self) -> Result<RawSnapshot> {
        let meta = match fs::metadata(&self.path).await {
            Ok(meta) => meta,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(StorageError::NotFound(self.path.display().to_string()));
            }
            Err(e) => return Err(e.into()),
        };

        let snapshot = if meta.is_dir() {
            list_dir(&self.path).await?
        } else {
            read_snapshot(&self.path).await?
        };

        debug!(
            "Read {} records ({} rejected) from {}",
            snapshot.len(),
            snapshot.rejected.len(),
            self.path.display()
        );
        Ok(snapshot)
    }

    fn describe(&self) -> String {
        format!("JSON snapshot at {}", self.path.display())
    }
}

async fn read_snapshot(path: &Path) -> Result<RawSnapshot> {
    let json = fs::read_to_string(path).await?;
    let document: Value = serde_json::from_str(&json)?;
    Ok(RawSnapshot::decode(document_records(document)))
}

async fn list_dir(dir: &Path) -> Result<RawSnapshot> {
    let mut paths = Vec::new();
    let mut rd = fs::read_dir(dir).await?;
    while let Some(entry) = rd.next_entry().await? {
        let path = entry.path();
        if path.extension().and_then(|s| s.to_str()) == Some("json") {
            paths.push(path);
        }
    }
    // read_dir order is platform dependent
    paths.sort();

    let mut snapshot = RawSnapshot::default();
    for path in paths {
        snapshot.extend(read_snapshot(&path).await?);
    }
    Ok(snapshot)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_reads_bare_array() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("snapshot.json");
        std::fs::write(
            &path,
            r#"[{"id": 1, "object": "radical"}, {"id": 2, "object": "kanji", "data": {"component_subject_ids": [1]}}]"#,
        )
        .unwrap();

        let items = JsonFileSource::new(&path).fetch_snapshot().await.unwrap().items;
        assert_eq!(items.len(), 2);
        assert_eq!(items[1].data.component_subject_ids, vec![1]);
    }

    #[tokio::test]
    async fn test_reads_wrapped_document() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("snapshot.json");
        std::fs::write(&path, r#"{"items": [{"id": 7, "object": "kanji"}]}"#).unwrap();

        let items = JsonFileSource::new(&path).fetch_snapshot().await.unwrap().items;
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].id, Some(7));
    }

    #[tokio::test]
    async fn test_reads_directory_in_name_order() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("b.json"), r#"{"id": 2, "object": "kanji"}"#).unwrap();
        std::fs::write(dir.path().join("a.json"), r#"[{"id": 1, "object": "radical"}]"#).unwrap();
        std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let items = JsonFileSource::new(dir.path()).fetch_snapshot().await.unwrap().items;
        let ids: Vec<_> = items.iter().map(|i| i.id).collect();
        assert_eq!(ids, vec![Some(1), Some(2)]);
    }

    #[tokio::test]
    async fn test_missing_file_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let source = JsonFileSource::new(dir.path().join("missing.json"));
        let err = source.fetch_snapshot().await.unwrap_err();
        assert!(matches!(err, StorageError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_invalid_json_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("snapshot.json");
        std::fs::write(&path, "not json").unwrap();

        let err = JsonFileSource::new(&path).fetch_snapshot().await.unwrap_err();
        assert!(matches!(err, StorageError::Json(_)));
    }

    #[tokio::test]
    async fn test_mistyped_records_do_not_sink_the_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("snapshot.json");
        std::fs::write(
            &path,
            r#"[{"id": 1, "object": "radical"}, {"id": "oops", "object": "kanji"}, {"id": 3, "object": "kanji", "assignments": {"srs_stage": -1}}]"#,
        )
        .unwrap();

        let snapshot = JsonFileSource::new(&path).fetch_snapshot().await.unwrap();
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot.items[0].id, Some(1));
        assert_eq!(snapshot.rejected.len(), 2);
        assert!(matches!(
            snapshot.rejected[1],
            levelup_core::Diagnostic::MalformedItem { id: Some(id), .. } if id.get() == 3
        ));
    }

    #[tokio::test]
    async fn test_wrapped_document_with_bad_record() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("snapshot.json");
        std::fs::write(
            &path,
            r#"{"items": [{"id": 7, "object": "kanji"}, {"id": 8, "data": {"component_subject_ids": "1,2"}}]}"#,
        )
        .unwrap();

        let snapshot = JsonFileSource::new(&path).fetch_snapshot().await.unwrap();
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot.rejected.len(), 1);
    }
}
