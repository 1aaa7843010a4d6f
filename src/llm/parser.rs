use std::collections::HashSet;

use crate::llm::prompts::RESPONSE_HEADER;
use crate::models::{is_known_category, Assignments, Catalog, OTHER_CATEGORY};

/// Assignments recovered from one reply plus counts of what had to be fixed up.
#[derive(Debug, Default)]
pub struct ParsedClassification {
    pub assignments: Assignments,
    pub skipped_rows: usize,
    pub coerced_rows: usize,
}

/// Reads the two-column CSV reply. Bad rows are skipped, unknown categories
/// become `Other`, and repositories outside `batch` are ignored. Categories are
/// appended in row order without deduplication.
pub fn parse_classification(
    response: &str,
    catalog: &Catalog,
    batch: &HashSet<&str>,
) -> ParsedClassification {
    let body = extract_csv(response);
    let mut parsed = ParsedClassification::default();

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(body.as_bytes());

    for result in reader.records() {
        let record = match result {
            Ok(record) => record,
            Err(e) => {
                tracing::warn!("Skipping unreadable row: {}", e);
                parsed.skipped_rows += 1;
                continue;
            }
        };

        if record.len() != RESPONSE_HEADER.len() {
            tracing::warn!("Skipping invalid row: {:?}", record.iter().collect::<Vec<_>>());
            parsed.skipped_rows += 1;
            continue;
        }

        let repo_full_name = &record[0];
        let mut category = &record[1];

        if !batch.contains(repo_full_name) {
            tracing::warn!(
                "Skipping row for '{}', which was not part of this batch",
                repo_full_name
            );
            parsed.skipped_rows += 1;
            continue;
        }

        if !is_known_category(catalog, category) {
            tracing::warn!(
                "Invalid category '{}' for repo '{}'. Using '{}' instead.",
                category,
                repo_full_name,
                OTHER_CATEGORY
            );
            category = OTHER_CATEGORY;
            parsed.coerced_rows += 1;
        }

        if category == OTHER_CATEGORY {
            tracing::info!("Repository '{}' categorized as '{}'", repo_full_name, OTHER_CATEGORY);
        }

        parsed
            .assignments
            .entry(repo_full_name.to_string())
            .or_default()
            .push(category.to_string());
    }

    parsed
}

fn extract_csv(text: &str) -> &str {
    // Models sometimes wrap the table in a fenced block
    if let Some(start) = text.find("```") {
        let start = start + 3;
        // Skip any language identifier on the same line
        let start = text[start..]
            .find('\n')
            .map(|i| start + i + 1)
            .unwrap_or(start);
        if let Some(end) = text[start..].find("```") {
            return text[start..start + end].trim();
        }
    }

    text.trim()
}
