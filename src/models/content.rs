use base64::{engine::general_purpose, Engine as _};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Directory listing entry from the contents API.
#[derive(Debug, Clone, Deserialize)]
pub struct ContentEntry {
    pub name: String,
    pub path: String,
    pub sha: String,
    #[serde(rename = "type")]
    pub kind: String,
}

impl ContentEntry {
    pub fn is_file(&self) -> bool {
        self.kind == "file"
    }
}

/// Single file payload from the contents or readme endpoints.
#[derive(Debug, Clone, Deserialize)]
pub struct ContentFile {
    pub path: String,
    pub sha: String,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub encoding: Option<String>,
}

impl ContentFile {
    pub fn decoded_content(&self) -> Result<String> {
        let raw = self.content.as_deref().unwrap_or_default();
        match self.encoding.as_deref() {
            Some("base64") => {
                // GitHub wraps base64 payloads every 60 columns
                let compact: String = raw.chars().filter(|c| !c.is_whitespace()).collect();
                let bytes = general_purpose::STANDARD.decode(compact)?;
                String::from_utf8(bytes).map_err(|e| {
                    Error::ParseError(format!("{} is not valid UTF-8: {}", self.path, e))
                })
            }
            Some("") | None => Ok(raw.to_string()),
            Some(other) => Err(Error::ParseError(format!(
                "unsupported encoding '{}' for {}",
                other, self.path
            ))),
        }
    }
}

/// A remote file with its decoded text and revision.
#[derive(Debug, Clone, PartialEq)]
pub struct RemoteFile {
    pub path: String,
    pub sha: String,
    pub content: String,
}

/// Body of `PUT /repos/{repo}/contents/{path}`.
#[derive(Debug, Serialize)]
pub struct PutContentRequest<'a> {
    pub message: &'a str,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sha: Option<&'a str>,
}

impl<'a> PutContentRequest<'a> {
    pub fn new(message: &'a str, content: &str, sha: Option<&'a str>) -> Self {
        Self {
            message,
            content: general_purpose::STANDARD.encode(content.as_bytes()),
            sha,
        }
    }
}

/// Body of `DELETE /repos/{repo}/contents/{path}`.
#[derive(Debug, Serialize)]
pub struct DeleteContentRequest<'a> {
    pub message: &'a str,
    pub sha: &'a str,
}
