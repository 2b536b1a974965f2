use std::io::ErrorKind;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::sync::Mutex;

use crate::error::Result;

/// A JSON array on disk treated as a small table.
///
/// Reads return an empty table when the file does not exist yet. Writes go
/// through a temp file and a rename so readers never see a partial file.
pub struct JsonTable<T> {
    path: PathBuf,
    write_lock: Mutex<()>,
    _row: PhantomData<fn() -> T>,
}

impl<T> JsonTable<T>
where
    T: Serialize + DeserializeOwned,
{
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
            _row: PhantomData,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn load(&self) -> Result<Vec<T>> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) if bytes.iter().all(u8::is_ascii_whitespace) => Ok(Vec::new()),
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(Vec::new()),
            Err(e) => Err(e.into()),
        }
    }

    /// Read-modify-write under the table lock; the closure's result is returned
    /// after the new rows are on disk.
    pub async fn update<F, R>(&self, f: F) -> Result<R>
    where
        F: FnOnce(&mut Vec<T>) -> R,
    {
        let _guard = self.write_lock.lock().await;
        let mut rows = self.load().await?;
        let result = f(&mut rows);
        self.write_rows(&rows).await?;
        Ok(result)
    }

    async fn write_rows(&self, rows: &[T]) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }

        let staged = self.path.with_extension("json.tmp");
        tokio::fs::write(&staged, serde_json::to_vec_pretty(rows)?).await?;
        tokio::fs::rename(&staged, &self.path).await?;
        tracing::debug!(path = %self.path.display(), rows = rows.len(), "Wrote JSON table");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Row {
        id: u32,
        name: String,
    }

    #[tokio::test]
    async fn test_missing_file_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let table: JsonTable<Row> = JsonTable::new(dir.path().join("rows.json"));
        assert!(table.load().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_update_persists_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("rows.json");
        let table: JsonTable<Row> = JsonTable::new(&path);

        let count = table
            .update(|rows| {
                rows.push(Row { id: 1, name: "a".into() });
                rows.len()
            })
            .await
            .unwrap();
        assert_eq!(count, 1);

        let reopened: JsonTable<Row> = JsonTable::new(&path);
        assert_eq!(reopened.load().await.unwrap(), vec![Row { id: 1, name: "a".into() }]);
        assert!(!path.with_extension("json.tmp").exists());
    }

    #[tokio::test]
    async fn test_corrupt_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rows.json");
        std::fs::write(&path, "{not an array").unwrap();

        let table: JsonTable<Row> = JsonTable::new(&path);
        assert!(table.load().await.is_err());
    }
}
