use chrono::{DateTime, Utc};
use std::collections::BTreeSet;
use std::path::PathBuf;
use std::sync::Arc;

use crate::error::Result;
use crate::github::RemoteRepository;
use crate::models::{Assignments, Catalog, Snapshot, StarredRepo};
use crate::progress::progress_bar;
use crate::publish::render::{
    document_filename, filename_collisions, group_by_category, is_listing_document,
    render_category, render_index, IndexStats, INDEX_FILE,
};

/// Writes the category lists and the index to disk and to the target repository.
///
/// The first remote error stops the call; files already written stay written.
pub struct Publisher {
    remote: Arc<dyn RemoteRepository>,
    output_dir: PathBuf,
}

impl Publisher {
    pub fn new(remote: Arc<dyn RemoteRepository>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            remote,
            output_dir: output_dir.into(),
        }
    }

    /// Returns whether any remote file was created, updated or deleted.
    pub async fn publish_lists(
        &self,
        catalog: &Catalog,
        snapshot: &Snapshot,
        assignments: &Assignments,
    ) -> Result<bool> {
        // The first category in catalog order owns a shared filename
        let mut shadowed = BTreeSet::new();
        for (file_name, first, second) in filename_collisions(catalog) {
            tracing::warn!(
                "Categories '{}' and '{}' both map to {}; only '{}' is published",
                first,
                second,
                file_name,
                first
            );
            shadowed.insert(second);
        }

        let grouped = group_by_category(catalog, assignments);
        let mut existing: BTreeSet<String> = self
            .remote
            .list_root_files()
            .await?
            .into_iter()
            .filter(|path| is_listing_document(path))
            .collect();

        std::fs::create_dir_all(&self.output_dir)?;

        let pb = progress_bar(catalog.len() as u64, "categories");
        let mut changes_made = false;

        for (category, description) in catalog {
            if shadowed.contains(category) {
                pb.inc(1);
                continue;
            }

            let file_name = document_filename(category);
            let repo_ids = grouped.get(category).map(Vec::as_slice).unwrap_or_default();

            if repo_ids.is_empty() {
                if existing.remove(&file_name) {
                    let message = format!("Remove empty category: {}", category);
                    if self.delete_if_present(&file_name, &message).await? {
                        tracing::info!("Deleted empty category file: {}", file_name);
                        changes_made = true;
                    }
                }
                pb.inc(1);
                continue;
            }

            let repos = resolve(snapshot, repo_ids);
            let content = render_category(category, description, &repos);

            let local_file_path = self.output_dir.join(&file_name);
            std::fs::write(&local_file_path, &content)?;
            tracing::info!("Saved {} locally to {}", file_name, local_file_path.display());

            let was_listed = existing.remove(&file_name);
            let current = if was_listed {
                self.remote.get_file(&file_name).await?
            } else {
                None
            };

            match current {
                Some(file) if file.content == content => {
                    tracing::debug!("{} is up to date", file_name);
                }
                Some(file) => {
                    let message = format!("Update {} list", category);
                    self.remote
                        .update_file(&file_name, &message, &content, &file.sha)
                        .await?;
                    tracing::info!("Updated {} in the repo", file_name);
                    changes_made = true;
                }
                None => {
                    let message = format!("Create {} list", category);
                    self.remote.create_file(&file_name, &message, &content).await?;
                    tracing::info!("Created {} in the repo", file_name);
                    changes_made = true;
                }
            }

            pb.inc(1);
        }

        pb.finish_with_message("Category lists published");

        // Whatever is left belongs to categories that are gone from the catalog
        for file_name in existing {
            let message = format!("Remove {}", file_name);
            if self.delete_if_present(&file_name, &message).await? {
                tracing::info!("Deleted {} from the repo", file_name);
                changes_made = true;
            }
        }

        Ok(changes_made)
    }

    /// Rewrites the index locally and remotely, even when nothing changed.
    pub async fn publish_index(
        &self,
        snapshot: &Snapshot,
        assignments: &Assignments,
        updated_at: DateTime<Utc>,
    ) -> Result<()> {
        let stats = IndexStats::compute(snapshot, assignments);
        let content = render_index(&stats, updated_at);

        std::fs::create_dir_all(&self.output_dir)?;
        let readme_path = self.output_dir.join(INDEX_FILE);
        std::fs::write(&readme_path, &content)?;
        tracing::info!("Saved {} locally to {}", INDEX_FILE, readme_path.display());

        match self.remote.get_file(INDEX_FILE).await? {
            Some(file) => {
                self.remote
                    .update_file(INDEX_FILE, "Update README with latest stats", &content, &file.sha)
                    .await?;
                tracing::info!("Updated {} in the repo", INDEX_FILE);
            }
            None => {
                self.remote
                    .create_file(INDEX_FILE, "Create README with stats", &content)
                    .await?;
                tracing::info!("Created {} in the repo", INDEX_FILE);
            }
        }

        Ok(())
    }

    async fn delete_if_present(&self, path: &str, message: &str) -> Result<bool> {
        match self.remote.get_file(path).await? {
            Some(file) => {
                self.remote.delete_file(path, message, &file.sha).await?;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

fn resolve<'a>(snapshot: &'a Snapshot, repo_ids: &[String]) -> Vec<&'a StarredRepo> {
    repo_ids
        .iter()
        .filter_map(|id| {
            let repo = snapshot.get(id);
            if repo.is_none() {
                tracing::warn!("Assigned repository {} is not in the snapshot", id);
            }
            repo
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::models::RemoteFile;
    use async_trait::async_trait;
    use chrono::TimeZone;
    use std::collections::BTreeMap;
    use std::sync::Mutex;

    #[derive(Default)]
    struct MemoryRepo {
        files: Mutex<BTreeMap<String, (String, String)>>,
        mutations: Mutex<Vec<String>>,
        next_sha: Mutex<u32>,
        fail_writes: bool,
    }

    impl MemoryRepo {
        fn with_files(files: &[(&str, &str)]) -> Self {
            let repo = Self::default();
            for (path, content) in files {
                let sha = repo.sha();
                repo.files
                    .lock()
                    .unwrap()
                    .insert(path.to_string(), (sha, content.to_string()));
            }
            repo
        }

        fn sha(&self) -> String {
            let mut next = self.next_sha.lock().unwrap();
            *next += 1;
            format!("sha{}", next)
        }

        fn mutations(&self) -> Vec<String> {
            self.mutations.lock().unwrap().clone()
        }

        fn content(&self, path: &str) -> Option<String> {
            self.files.lock().unwrap().get(path).map(|(_, c)| c.clone())
        }

        fn write(&self, op: &str, path: &str, content: Option<&str>) -> Result<()> {
            if self.fail_writes {
                return Err(Error::GitHubApi("500 Internal Server Error".to_string()));
            }
            let mut files = self.files.lock().unwrap();
            if op == "create" && files.contains_key(path) {
                return Err(Error::GitHubApi(format!("422 {} already exists", path)));
            }
            match content {
                Some(content) => {
                    files.insert(path.to_string(), (self.sha(), content.to_string()));
                }
                None => {
                    files.remove(path);
                }
            }
            self.mutations.lock().unwrap().push(format!("{} {}", op, path));
            Ok(())
        }
    }

    #[async_trait]
    impl RemoteRepository for MemoryRepo {
        async fn list_root_files(&self) -> Result<Vec<String>> {
            Ok(self.files.lock().unwrap().keys().cloned().collect())
        }

        async fn get_file(&self, path: &str) -> Result<Option<RemoteFile>> {
            Ok(self
                .files
                .lock()
                .unwrap()
                .get(path)
                .map(|(sha, content)| RemoteFile {
                    path: path.to_string(),
                    sha: sha.clone(),
                    content: content.clone(),
                }))
        }

        async fn create_file(&self, path: &str, _message: &str, content: &str) -> Result<()> {
            self.write("create", path, Some(content))
        }

        async fn update_file(
            &self,
            path: &str,
            _message: &str,
            content: &str,
            _sha: &str,
        ) -> Result<()> {
            self.write("update", path, Some(content))
        }

        async fn delete_file(&self, path: &str, _message: &str, _sha: &str) -> Result<()> {
            self.write("delete", path, None)
        }
    }

    fn repo(full_name: &str) -> StarredRepo {
        let (owner, name) = full_name.split_once('/').unwrap();
        StarredRepo {
            name: name.to_string(),
            url: format!("https://github.com/{}", full_name),
            description: format!("{} description", name),
            owner: owner.to_string(),
            full_name: full_name.to_string(),
            readme: String::new(),
            starred_at: None,
        }
    }

    fn fixture() -> (Catalog, Snapshot, Assignments) {
        let mut catalog = Catalog::new();
        catalog.insert("Tooling".to_string(), "dev tools".to_string());
        catalog.insert("Web".to_string(), "web frameworks".to_string());

        let snapshot: Snapshot = ["o/a", "o/b"]
            .iter()
            .map(|n| (n.to_string(), repo(n)))
            .collect();

        let mut assignments = Assignments::new();
        assignments.insert("o/a".to_string(), vec!["Tooling".to_string()]);
        assignments.insert("o/b".to_string(), vec![]);

        (catalog, snapshot, assignments)
    }

    #[tokio::test]
    async fn test_lists_created_and_empty_categories_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let remote = Arc::new(MemoryRepo::default());
        let publisher = Publisher::new(remote.clone(), dir.path());
        let (catalog, snapshot, assignments) = fixture();

        let changed = publisher
            .publish_lists(&catalog, &snapshot, &assignments)
            .await
            .unwrap();

        assert!(changed);
        assert_eq!(remote.mutations(), vec!["create tooling.md"]);
        let local = std::fs::read_to_string(dir.path().join("tooling.md")).unwrap();
        assert!(local.contains("## [a](https://github.com/o/a)"));
        assert!(!local.contains("o/b"));
        assert!(!dir.path().join("web.md").exists());
    }

    #[tokio::test]
    async fn test_second_publish_is_a_no_op_for_lists() {
        let dir = tempfile::tempdir().unwrap();
        let remote = Arc::new(MemoryRepo::default());
        let publisher = Publisher::new(remote.clone(), dir.path());
        let (catalog, snapshot, assignments) = fixture();
        let at = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();

        publisher.publish_lists(&catalog, &snapshot, &assignments).await.unwrap();
        publisher.publish_index(&snapshot, &assignments, at).await.unwrap();
        let after_first = remote.mutations().len();

        let changed = publisher
            .publish_lists(&catalog, &snapshot, &assignments)
            .await
            .unwrap();
        assert!(!changed);
        assert_eq!(remote.mutations().len(), after_first);

        publisher.publish_index(&snapshot, &assignments, at).await.unwrap();
        assert_eq!(remote.mutations().last().unwrap(), "update README.md");
        assert_eq!(remote.mutations().len(), after_first + 1);
    }

    #[tokio::test]
    async fn test_changed_list_updated() {
        let dir = tempfile::tempdir().unwrap();
        let remote = Arc::new(MemoryRepo::with_files(&[("tooling.md", "# Tooling\n\nold\n\n")]));
        let publisher = Publisher::new(remote.clone(), dir.path());
        let (catalog, snapshot, assignments) = fixture();

        assert!(publisher
            .publish_lists(&catalog, &snapshot, &assignments)
            .await
            .unwrap());
        assert_eq!(remote.mutations(), vec!["update tooling.md"]);
        assert!(remote.content("tooling.md").unwrap().contains("dev tools"));
    }

    #[tokio::test]
    async fn test_empty_and_stale_documents_deleted() {
        let dir = tempfile::tempdir().unwrap();
        let remote = Arc::new(MemoryRepo::with_files(&[
            ("web.md", "# Web\n"),
            ("retired.md", "# Retired\n"),
            ("README.md", "# Starred Repositories\n"),
            ("notes.txt", "keep me"),
        ]));
        let publisher = Publisher::new(remote.clone(), dir.path());
        let (catalog, snapshot, assignments) = fixture();

        publisher
            .publish_lists(&catalog, &snapshot, &assignments)
            .await
            .unwrap();

        let mutations = remote.mutations();
        assert!(mutations.contains(&"delete web.md".to_string()));
        assert!(mutations.contains(&"delete retired.md".to_string()));
        assert_eq!(mutations.iter().filter(|m| m.starts_with("delete")).count(), 2);
        assert!(remote.content("README.md").is_some());
        assert!(remote.content("notes.txt").is_some());
    }

    #[tokio::test]
    async fn test_index_created_then_updated() {
        let dir = tempfile::tempdir().unwrap();
        let remote = Arc::new(MemoryRepo::default());
        let publisher = Publisher::new(remote.clone(), dir.path());
        let (_, snapshot, assignments) = fixture();
        let at = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();

        publisher.publish_index(&snapshot, &assignments, at).await.unwrap();
        publisher.publish_index(&snapshot, &assignments, at).await.unwrap();

        assert_eq!(remote.mutations(), vec!["create README.md", "update README.md"]);
        let local = std::fs::read_to_string(dir.path().join("README.md")).unwrap();
        assert!(local.contains("- **Total Starred Repositories:** 2\n"));
        assert!(local.contains("- **Total Categories:** 1\n"));
        assert!(local.contains("- Most Common Category: Tooling\n"));
    }

    #[tokio::test]
    async fn test_colliding_categories_publish_first_only() {
        let dir = tempfile::tempdir().unwrap();
        let remote = Arc::new(MemoryRepo::default());
        let publisher = Publisher::new(remote.clone(), dir.path());

        let mut catalog = Catalog::new();
        catalog.insert("Web Dev".to_string(), "sites".to_string());
        catalog.insert("web dev!".to_string(), "more sites".to_string());

        let snapshot: Snapshot = ["o/a", "o/b"]
            .iter()
            .map(|n| (n.to_string(), repo(n)))
            .collect();
        let mut assignments = Assignments::new();
        assignments.insert("o/a".to_string(), vec!["Web Dev".to_string()]);
        assignments.insert("o/b".to_string(), vec!["web dev!".to_string()]);

        let changed = publisher
            .publish_lists(&catalog, &snapshot, &assignments)
            .await
            .unwrap();

        assert!(changed);
        assert_eq!(remote.mutations(), vec!["create web_dev.md"]);
        let content = remote.content("web_dev.md").unwrap();
        assert!(content.starts_with("# Web Dev\n\nsites\n\n"));
        assert!(content.contains("o/a"));
        assert!(!content.contains("o/b"));

        // Stable on the next run: nothing rewritten, nothing deleted
        assert!(!publisher
            .publish_lists(&catalog, &snapshot, &assignments)
            .await
            .unwrap());
        assert_eq!(remote.mutations().len(), 1);
    }

    #[tokio::test]
    async fn test_remote_error_stops_publishing() {
        let dir = tempfile::tempdir().unwrap();
        let remote = Arc::new(MemoryRepo {
            fail_writes: true,
            ..Default::default()
        });
        let publisher = Publisher::new(remote.clone(), dir.path());
        let (mut catalog, mut snapshot, mut assignments) = fixture();
        catalog.insert("Zig".to_string(), "zig things".to_string());
        snapshot.insert("o/z".to_string(), repo("o/z"));
        assignments.insert("o/z".to_string(), vec!["Zig".to_string()]);

        let result = publisher
            .publish_lists(&catalog, &snapshot, &assignments)
            .await;

        assert!(result.is_err());
        assert!(dir.path().join("tooling.md").exists());
        assert!(!dir.path().join("zig.md").exists());
    }
}
