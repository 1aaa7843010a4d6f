use crate::models::{Assignments, Snapshot};

/// Result of comparing a fresh snapshot with the stored assignments.
#[derive(Debug, Default)]
pub struct Reconciliation {
    /// Repositories no longer starred, dropped from the assignments.
    pub removed: Vec<String>,
    /// Starred repositories that have no assignment yet.
    pub to_classify: Snapshot,
}

pub fn reconcile(snapshot: &Snapshot, assignments: &mut Assignments) -> Reconciliation {
    let removed = remove_unstarred(snapshot, assignments);
    let to_classify = pending_classification(snapshot, assignments);
    Reconciliation {
        removed,
        to_classify,
    }
}

/// Afterwards every key of `assignments` is a key of `snapshot`.
pub fn remove_unstarred(snapshot: &Snapshot, assignments: &mut Assignments) -> Vec<String> {
    let unstarred: Vec<String> = assignments
        .keys()
        .filter(|name| !snapshot.contains_key(*name))
        .cloned()
        .collect();

    for name in &unstarred {
        assignments.remove(name);
        tracing::info!("Removed unstarred repo from categories: {}", name);
    }

    unstarred
}

pub fn pending_classification(snapshot: &Snapshot, assignments: &Assignments) -> Snapshot {
    snapshot
        .iter()
        .filter(|(name, _)| !assignments.contains_key(*name))
        .map(|(name, repo)| (name.clone(), repo.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::StarredRepo;

    fn snapshot(names: &[&str]) -> Snapshot {
        names
            .iter()
            .map(|name| {
                (
                    name.to_string(),
                    StarredRepo {
                        name: name.to_string(),
                        url: format!("https://github.com/{}", name),
                        description: String::new(),
                        owner: "o".to_string(),
                        full_name: name.to_string(),
                        readme: String::new(),
                        starred_at: None,
                    },
                )
            })
            .collect()
    }

    fn assignments(pairs: &[(&str, &[&str])]) -> Assignments {
        pairs
            .iter()
            .map(|(name, cats)| (name.to_string(), cats.iter().map(|c| c.to_string()).collect()))
            .collect()
    }

    #[test]
    fn test_unstarred_removed_and_new_pending() {
        let snap = snapshot(&["o/kept", "o/new"]);
        let mut mapping = assignments(&[("o/kept", &["Tooling"]), ("o/gone", &["Web"])]);

        let result = reconcile(&snap, &mut mapping);

        assert_eq!(result.removed, vec!["o/gone"]);
        assert_eq!(result.to_classify.keys().collect::<Vec<_>>(), vec!["o/new"]);
        assert_eq!(mapping.keys().collect::<Vec<_>>(), vec!["o/kept"]);
    }

    #[test]
    fn test_empty_assignment_counts_as_categorized() {
        let snap = snapshot(&["o/empty"]);
        let mut mapping = assignments(&[("o/empty", &[])]);

        let result = reconcile(&snap, &mut mapping);
        assert!(result.to_classify.is_empty());
        assert!(result.removed.is_empty());
    }

    #[test]
    fn test_no_orphans_survive() {
        let cases: Vec<(Vec<&str>, Vec<&str>)> = vec![
            (vec![], vec!["o/a", "o/b"]),
            (vec!["o/a"], vec!["o/a", "o/b", "o/c"]),
            (vec!["o/a", "o/b"], vec![]),
            (vec!["o/x", "o/y"], vec!["o/y", "o/z"]),
        ];

        for (starred, assigned) in cases {
            let snap = snapshot(&starred);
            let mut mapping: Assignments = assigned
                .iter()
                .map(|name| (name.to_string(), vec!["Other".to_string()]))
                .collect();

            reconcile(&snap, &mut mapping);
            assert!(mapping.keys().all(|name| snap.contains_key(name)));
        }
    }
}
