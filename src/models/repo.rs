use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// README excerpts are cut to this many characters before they are stored.
pub const README_CHAR_LIMIT: usize = 5000;

/// A starred repository as persisted in the snapshot file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StarredRepo {
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "URL")]
    pub url: String,
    #[serde(rename = "Description", default)]
    pub description: String,
    #[serde(rename = "Owner")]
    pub owner: String,
    #[serde(rename = "FullName")]
    pub full_name: String,
    #[serde(rename = "README", default)]
    pub readme: String,
    #[serde(rename = "StarredAt", default, skip_serializing_if = "Option::is_none")]
    pub starred_at: Option<DateTime<Utc>>,
}

impl StarredRepo {
    pub fn from_api(item: StarredItem, readme: &str) -> Self {
        let StarredItem { starred_at, repo } = item;
        Self {
            name: repo.name,
            url: repo.html_url,
            description: repo.description.unwrap_or_default(),
            owner: repo.owner.login,
            full_name: repo.full_name,
            readme: truncate_chars(readme, README_CHAR_LIMIT).to_string(),
            starred_at,
        }
    }
}

/// One entry of `GET /user/starred` requested with the `star+json` media type.
#[derive(Debug, Clone, Deserialize)]
pub struct StarredItem {
    #[serde(default)]
    pub starred_at: Option<DateTime<Utc>>,
    pub repo: ApiRepository,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiRepository {
    pub name: String,
    pub full_name: String,
    pub html_url: String,
    pub description: Option<String>,
    pub owner: RepositoryOwner,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepositoryOwner {
    pub login: String,
}

/// Returns the prefix of `text` holding at most `max_chars` characters.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
