use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

use super::{ObjectInfo, ObjectSource};
use crate::error::RetrievalError;

/// Serves the files below a directory as objects named by their
/// `/`-separated relative path
pub struct LocalDirSource {
    root: PathBuf,
}

impl LocalDirSource {
    pub fn new(root: PathBuf) -> Result<Self> {
        if !root.is_dir() {
            anyhow::bail!("Source directory does not exist: {:?}", root);
        }
        let root = root
            .canonicalize()
            .with_context(|| format!("Failed to resolve source directory {:?}", root))?;
        Ok(Self { root })
    }

    fn walk(&self, dir: &Path, objects: &mut Vec<ObjectInfo>) -> Result<(), RetrievalError> {
        let io_err = |source| RetrievalError::Io {
            object: dir.display().to_string(),
            source,
        };

        let mut entries = fs::read_dir(dir)
            .map_err(io_err)?
            .collect::<Result<Vec<_>, _>>()
            .map_err(io_err)?;
        entries.sort_by_key(|entry| entry.file_name());

        for entry in entries {
            let path = entry.path();
            let file_type = entry.file_type().map_err(io_err)?;

            if file_type.is_dir() {
                self.walk(&path, objects)?;
            } else if file_type.is_file() {
                let size = entry.metadata().ok().map(|m| m.len());
                objects.push(ObjectInfo {
                    name: self.object_name(&path),
                    size,
                });
            }
        }

        Ok(())
    }

    fn object_name(&self, path: &Path) -> String {
        let relative = path.strip_prefix(&self.root).unwrap_or(path);
        relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/")
    }

    /// Resolve an object name without letting it escape the root
    fn resolve(&self, name: &str) -> Option<PathBuf> {
        let mut path = self.root.clone();
        for part in name.split('/') {
            if part.is_empty() || part == "." || part == ".." {
                return None;
            }
            path.push(part);
        }
        Some(path)
    }
}

impl ObjectSource for LocalDirSource {
    fn describe(&self) -> String {
        format!("directory {}", self.root.display())
    }

    fn list_objects(&self) -> Result<Vec<ObjectInfo>, RetrievalError> {
        let mut objects = Vec::new();
        self.walk(&self.root, &mut objects)?;
        Ok(objects)
    }

    fn fetch(&self, name: &str) -> Result<Vec<u8>, RetrievalError> {
        let path = self
            .resolve(name)
            .ok_or_else(|| RetrievalError::NotFound(name.to_string()))?;

        fs::read(&path).map_err(|source| match source.kind() {
            std::io::ErrorKind::NotFound => RetrievalError::NotFound(name.to_string()),
            _ => RetrievalError::Io {
                object: name.to_string(),
                source,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn fixture() -> TempDir {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("flights/2023/07")).unwrap();
        fs::write(dir.path().join("flights/2023/07/flight_data.json"), "[]").unwrap();
        fs::write(dir.path().join("tickets.csv"), "1,2,LA100,Economy,1A\n").unwrap();
        dir
    }

    #[test]
    fn test_lists_nested_files() {
        let dir = fixture();
        let source = LocalDirSource::new(dir.path().to_path_buf()).unwrap();
        let names: Vec<_> = source
            .list_objects()
            .unwrap()
            .into_iter()
            .map(|o| o.name)
            .collect();
        assert_eq!(names, vec!["flights/2023/07/flight_data.json", "tickets.csv"]);
    }

    #[test]
    fn test_fetch() {
        let dir = fixture();
        let source = LocalDirSource::new(dir.path().to_path_buf()).unwrap();
        assert_eq!(source.fetch("flights/2023/07/flight_data.json").unwrap(), b"[]");
        assert!(matches!(
            source.fetch("missing.csv"),
            Err(RetrievalError::NotFound(_))
        ));
        assert!(matches!(
            source.fetch("../tickets.csv"),
            Err(RetrievalError::NotFound(_))
        ));
    }

    #[test]
    fn test_missing_root() {
        let dir = TempDir::new().unwrap();
        assert!(LocalDirSource::new(dir.path().join("nope")).is_err());
    }
}
