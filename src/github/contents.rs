use async_trait::async_trait;
use reqwest::Method;

use crate::error::Result;
use crate::github::client::GitHubClient;
use crate::github::remote::RemoteRepository;
use crate::models::{
    ContentEntry, ContentFile, DeleteContentRequest, PutContentRequest, RemoteFile,
};

/// Contents API bound to one repository.
pub struct RepoContents {
    github: GitHubClient,
    full_name: String,
}

impl RepoContents {
    pub fn new(github: GitHubClient, full_name: &str) -> Self {
        Self {
            github,
            full_name: full_name.to_string(),
        }
    }

    pub fn full_name(&self) -> &str {
        &self.full_name
    }

    fn contents_url(&self, path: &str) -> String {
        let base = format!("{}/repos/{}/contents", self.github.base_url(), self.full_name);
        if path.is_empty() {
            base
        } else {
            format!("{}/{}", base, path)
        }
    }
}

#[async_trait]
impl RemoteRepository for RepoContents {
    async fn list_root_files(&self) -> Result<Vec<String>> {
        let entries: Vec<ContentEntry> = self
            .github
            .get_json(&self.contents_url(""))
            .await?
            .unwrap_or_default();

        Ok(entries
            .into_iter()
            .filter(ContentEntry::is_file)
            .map(|e| e.path)
            .collect())
    }

    async fn get_file(&self, path: &str) -> Result<Option<RemoteFile>> {
        let Some(file) = self
            .github
            .get_json::<ContentFile>(&self.contents_url(path))
            .await?
        else {
            return Ok(None);
        };

        let content = file.decoded_content()?;
        Ok(Some(RemoteFile {
            path: file.path,
            sha: file.sha,
            content,
        }))
    }

    async fn create_file(&self, path: &str, message: &str, content: &str) -> Result<()> {
        let body = PutContentRequest::new(message, content, None);
        self.github
            .send_json(Method::PUT, &self.contents_url(path), &body)
            .await
    }

    async fn update_file(
        &self,
        path: &str,
        message: &str,
        content: &str,
        sha: &str,
    ) -> Result<()> {
        let body = PutContentRequest::new(message, content, Some(sha));
        self.github
            .send_json(Method::PUT, &self.contents_url(path), &body)
            .await
    }

    async fn delete_file(&self, path: &str, message: &str, sha: &str) -> Result<()> {
        let body = DeleteContentRequest { message, sha };
        self.github
            .send_json(Method::DELETE, &self.contents_url(path), &body)
            .await
    }
}
