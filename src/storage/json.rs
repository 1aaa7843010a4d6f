use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::models::{Assignments, Catalog, Snapshot};

pub const STARRED_REPOS_FILE: &str = "starred_repos.json";
pub const CATEGORIES_FILE: &str = "categories.json";
pub const REPO_CATEGORY_MAPPING_FILE: &str = "repo_category_mapping.json";

/// Whole-document JSON state kept in one directory.
pub struct Storage {
    dir: PathBuf,
}

impl Storage {
    pub fn new<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn load_snapshot(&self) -> Result<Snapshot> {
        self.load(STARRED_REPOS_FILE)
    }

    pub fn save_snapshot(&self, snapshot: &Snapshot) -> Result<()> {
        self.save(STARRED_REPOS_FILE, snapshot)
    }

    /// The catalog is curated by hand; this crate never writes it.
    pub fn load_catalog(&self) -> Result<Catalog> {
        self.load(CATEGORIES_FILE)
    }

    pub fn load_assignments(&self) -> Result<Assignments> {
        self.load(REPO_CATEGORY_MAPPING_FILE)
    }

    pub fn save_assignments(&self, assignments: &Assignments) -> Result<()> {
        self.save(REPO_CATEGORY_MAPPING_FILE, assignments)
    }

    fn load<T: DeserializeOwned + Default>(&self, file: &str) -> Result<T> {
        let path = self.dir.join(file);
        if !path.exists() {
            tracing::debug!("{} not found, starting empty", path.display());
            return Ok(T::default());
        }

        let raw = std::fs::read_to_string(&path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    fn save<T: Serialize>(&self, file: &str, data: &T) -> Result<()> {
        let path = self.dir.join(file);
        let json = serde_json::to_string_pretty(data)?;
        std::fs::write(&path, json)?;
        tracing::info!("Saved data to {}", path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::StarredRepo;

    fn repo(full_name: &str) -> StarredRepo {
        let (owner, name) = full_name.split_once('/').unwrap();
        StarredRepo {
            name: name.to_string(),
            url: format!("https://github.com/{}", full_name),
            description: String::new(),
            owner: owner.to_string(),
            full_name: full_name.to_string(),
            readme: String::new(),
            starred_at: None,
        }
    }

    #[test]
    fn test_missing_files_load_empty() {
        let dir = tempfile::tempdir().unwrap();
        let storage = Storage::new(dir.path()).unwrap();

        assert!(storage.load_snapshot().unwrap().is_empty());
        assert!(storage.load_catalog().unwrap().is_empty());
        assert!(storage.load_assignments().unwrap().is_empty());
    }

    #[test]
    fn test_state_survives_reload() {
        let dir = tempfile::tempdir().unwrap();
        let storage = Storage::new(dir.path()).unwrap();

        let mut snapshot = Snapshot::new();
        snapshot.insert("a/one".to_string(), repo("a/one"));
        storage.save_snapshot(&snapshot).unwrap();

        let mut assignments = Assignments::new();
        assignments.insert("a/one".to_string(), vec!["Tooling".to_string()]);
        storage.save_assignments(&assignments).unwrap();

        let reopened = Storage::new(dir.path()).unwrap();
        assert_eq!(reopened.load_snapshot().unwrap(), snapshot);
        assert_eq!(reopened.load_assignments().unwrap(), assignments);
    }

    #[test]
    fn test_written_json_is_indented() {
        let dir = tempfile::tempdir().unwrap();
        let storage = Storage::new(dir.path()).unwrap();

        let mut assignments = Assignments::new();
        assignments.insert("a/one".to_string(), vec!["Other".to_string()]);
        storage.save_assignments(&assignments).unwrap();

        let raw = std::fs::read_to_string(dir.path().join(REPO_CATEGORY_MAPPING_FILE)).unwrap();
        assert!(raw.contains("\n  \"a/one\": [\n    \"Other\"\n  ]"));
    }

    #[test]
    fn test_catalog_read_from_hand_written_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(CATEGORIES_FILE),
            r#"{"Tooling": "dev tools", "Databases": "storage engines"}"#,
        )
        .unwrap();

        let catalog = Storage::new(dir.path()).unwrap().load_catalog().unwrap();
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog["Tooling"], "dev tools");
    }

    #[test]
    fn test_corrupt_state_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(STARRED_REPOS_FILE), "{not json").unwrap();

        let storage = Storage::new(dir.path()).unwrap();
        assert!(storage.load_snapshot().is_err());
    }
}
