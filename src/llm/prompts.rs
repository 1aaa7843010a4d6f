use crate::error::{Error, Result};
use crate::models::{truncate_chars, Catalog, StarredRepo, OTHER_CATEGORY};

/// README characters sent per repository; the stored excerpt is longer.
pub const PROMPT_README_CHARS: usize = 500;

/// Output budget for one classification reply.
pub const CLASSIFY_MAX_TOKENS: u32 = 4096;

pub const REQUEST_HEADER: [&str; 4] = ["FullName", "URL", "Description", "README"];
pub const RESPONSE_HEADER: [&str; 2] = ["Repository FullName", "Category"];

#[derive(Debug, Clone)]
pub struct ClassificationRequest<'a> {
    pub repos: &'a [StarredRepo],
    pub catalog: &'a Catalog,
}

impl<'a> ClassificationRequest<'a> {
    pub fn new(repos: &'a [StarredRepo], catalog: &'a Catalog) -> Self {
        Self { repos, catalog }
    }

    /// The batch as CSV with a header row, one repository per record.
    pub fn repos_csv(&self) -> Result<String> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        writer.write_record(REQUEST_HEADER)?;

        for repo in self.repos {
            writer.write_record([
                repo.full_name.as_str(),
                repo.url.as_str(),
                repo.description.as_str(),
                truncate_chars(&repo.readme, PROMPT_README_CHARS),
            ])?;
        }

        let bytes = writer
            .into_inner()
            .map_err(|e| Error::ParseError(format!("Failed to build request CSV: {}", e)))?;
        String::from_utf8(bytes)
            .map_err(|e| Error::ParseError(format!("Request CSV is not UTF-8: {}", e)))
    }

    pub fn categories_list(&self) -> String {
        self.catalog
            .iter()
            .map(|(name, description)| format!("{}: {}", name, description))
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn to_prompt(&self) -> Result<String> {
        let repos_csv = self.repos_csv()?;

        Ok(format!(
            r#"Below is a CSV export of GitHub repositories a user has starred:

{repos}
Classify every repository using ONLY these predefined categories:
{categories}

Base the decision on both the Description and the README columns.
When none of the categories fits a repository, use the category "{other}".
Answer with a CSV that has exactly two columns, with the header row: {header}
A repository may belong to several categories when each one is clearly relevant; write one row per repository and category.
Return only the CSV, with no commentary before or after it."#,
            repos = repos_csv,
            categories = self.categories_list(),
            other = OTHER_CATEGORY,
            header = RESPONSE_HEADER.join(","),
        ))
    }
}
