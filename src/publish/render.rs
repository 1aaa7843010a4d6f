use chrono::{DateTime, Utc};
use regex::Regex;
use std::collections::BTreeMap;
use std::sync::OnceLock;

use crate::models::{Assignments, Catalog, Snapshot, StarredRepo};

pub const INDEX_FILE: &str = "README.md";
pub const RECENTLY_ADDED_COUNT: usize = 5;
const NOT_AVAILABLE: &str = "N/A";

fn filename_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"[^\w\-. ]").expect("valid filename pattern"))
}

/// Lowercased category name with everything but word characters, `-`, `.` and
/// spaces removed, and spaces turned into underscores.
pub fn clean_filename(name: &str) -> String {
    filename_pattern()
        .replace_all(name, "")
        .trim()
        .replace(' ', "_")
        .to_lowercase()
}

pub fn document_filename(category: &str) -> String {
    format!("{}.md", clean_filename(category))
}

/// Listing documents are the markdown files other than the index.
pub fn is_listing_document(path: &str) -> bool {
    path.ends_with(".md") && path != INDEX_FILE
}

/// Pairs of catalog categories that would be written to the same file.
pub fn filename_collisions(catalog: &Catalog) -> Vec<(String, String, String)> {
    let mut seen: BTreeMap<String, &str> = BTreeMap::new();
    let mut collisions = Vec::new();

    for category in catalog.keys() {
        let file_name = document_filename(category);
        match seen.get(&file_name) {
            Some(first) => collisions.push((file_name, first.to_string(), category.clone())),
            None => {
                seen.insert(file_name, category);
            }
        }
    }

    collisions
}

/// Category to the repositories assigned to it, in assignment order. Every
/// catalog category is present, categories outside the catalog are not.
pub fn group_by_category(
    catalog: &Catalog,
    assignments: &Assignments,
) -> BTreeMap<String, Vec<String>> {
    let mut grouped: BTreeMap<String, Vec<String>> = catalog
        .keys()
        .map(|category| (category.clone(), Vec::new()))
        .collect();

    for (repo_full_name, categories) in assignments {
        for category in categories {
            if let Some(repos) = grouped.get_mut(category) {
                repos.push(repo_full_name.clone());
            }
        }
    }

    grouped
}

pub fn render_category(category: &str, description: &str, repos: &[&StarredRepo]) -> String {
    let mut content = format!("# {}\n\n{}\n\n", category, description);

    for repo in repos {
        content.push_str(&format!("## [{}]({})\n\n", repo.name, repo.url));
        content.push_str(&format!("{}\n\n", repo.description));
        content.push_str(&format!(
            "[![GitHub stars](https://img.shields.io/github/stars/{0}?style=social)](https://github.com/{0})\n\n",
            repo.full_name
        ));
        content.push_str("---\n\n");
    }

    content
}

#[derive(Debug)]
pub struct IndexStats<'a> {
    pub total_repos: usize,
    pub total_categories: usize,
    pub most_common: Option<String>,
    pub recently_added: Vec<&'a StarredRepo>,
}

impl<'a> IndexStats<'a> {
    pub fn compute(snapshot: &'a Snapshot, assignments: &Assignments) -> Self {
        // Counts in first-seen order so ties go to the earliest category
        let mut counts: Vec<(&str, usize)> = Vec::new();
        for category in assignments.values().flatten() {
            match counts.iter_mut().find(|(name, _)| *name == category.as_str()) {
                Some((_, count)) => *count += 1,
                None => counts.push((category.as_str(), 1)),
            }
        }

        let most_common = counts
            .iter()
            .fold(None::<(&str, usize)>, |best, &(name, count)| match best {
                Some((_, best_count)) if best_count >= count => best,
                _ => Some((name, count)),
            })
            .map(|(name, _)| name.to_string());

        Self {
            total_repos: snapshot.len(),
            total_categories: counts.len(),
            most_common,
            recently_added: recently_added(snapshot, RECENTLY_ADDED_COUNT),
        }
    }
}

/// Newest stars first. Repositories without a star date sort after dated ones,
/// by reverse `owner/name`.
pub fn recently_added(snapshot: &Snapshot, count: usize) -> Vec<&StarredRepo> {
    let mut repos: Vec<&StarredRepo> = snapshot.values().collect();
    repos.sort_by(|a, b| (b.starred_at, &b.full_name).cmp(&(a.starred_at, &a.full_name)));
    repos.truncate(count);
    repos
}

pub fn render_index(stats: &IndexStats<'_>, updated_at: DateTime<Utc>) -> String {
    let recently_added = if stats.recently_added.is_empty() {
        NOT_AVAILABLE.to_string()
    } else {
        stats
            .recently_added
            .iter()
            .map(|repo| format!("[{}]({})", repo.name, repo.url))
            .collect::<Vec<_>>()
            .join(", ")
    };

    format!(
        r#"# Starred Repositories

- **Last Updated:** {updated}
- **Total Starred Repositories:** {total}
- **Total Categories:** {categories}

## Quick Stats

- Most Common Category: {most_common}
- Recently Added: {recent}

Each category has its own list in this repository.
"#,
        updated = updated_at.format("%Y-%m-%d %H:%M:%S UTC"),
        total = stats.total_repos,
        categories = stats.total_categories,
        most_common = stats.most_common.as_deref().unwrap_or(NOT_AVAILABLE),
        recent = recently_added,
    )
}
