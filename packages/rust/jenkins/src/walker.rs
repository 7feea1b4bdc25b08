//! Recursive job tree discovery.
//!
//! [`discover`] walks the folder tree under a root container and returns the
//! slash-joined paths of every buildable job, pre-order, parents before
//! children, siblings in server order. Each call re-walks the live tree; no
//! state is carried between runs. A container whose listing fails is logged
//! and skipped so one broken folder cannot sink the export.

use std::pin::Pin;

use tracing::{debug, info, instrument, warn};

use paramexport_shared::{BUILTIN_EXCLUDE_MARKERS, Result};

use crate::{JobEntry, JobLister};

// ---------------------------------------------------------------------------
// ExclusionFilter
// ---------------------------------------------------------------------------

/// Decides which job paths are excluded from discovery: built-in
/// internal-tooling markers (substring match) plus user-configured
/// glob patterns matched against the full path.
pub struct ExclusionFilter {
    patterns: Vec<regex::Regex>,
}

impl ExclusionFilter {
    pub fn new(extra_patterns: &[String]) -> Self {
        let patterns = extra_patterns
            .iter()
            .filter_map(|p| glob_to_regex(p))
            .collect();
        Self { patterns }
    }

    /// True when the slash-joined path must not be exported.
    pub fn is_excluded(&self, path: &str) -> bool {
        if BUILTIN_EXCLUDE_MARKERS
            .iter()
            .any(|marker| path.contains(marker))
        {
            return true;
        }
        self.patterns.iter().any(|p| p.is_match(path))
    }
}

/// Convert a glob-like pattern to a regex.
fn glob_to_regex(pattern: &str) -> Option<regex::Regex> {
    let escaped = regex::escape(pattern)
        .replace(r"\*\*", ".*")
        .replace(r"\*", "[^/]*")
        .replace(r"\?", ".");
    regex::Regex::new(&format!("^{escaped}$")).ok()
}

// ---------------------------------------------------------------------------
// Discovery
// ---------------------------------------------------------------------------

/// Collect all job paths under `root`, pre-order.
///
/// A failed listing of the root itself is fatal; a failed listing of a
/// nested container is reported and skipped.
#[instrument(skip_all, fields(root = %root))]
pub async fn discover<L: JobLister>(
    lister: &L,
    root: &str,
    filter: &ExclusionFilter,
) -> Result<Vec<String>> {
    let mut paths = Vec::new();
    let entries = lister.list_children(root).await?;
    for entry in entries {
        visit(lister, root, &entry, filter, &mut paths).await;
    }
    info!(root, jobs = paths.len(), "job discovery finished");
    Ok(paths)
}

fn visit<'a, L: JobLister>(
    lister: &'a L,
    parent: &'a str,
    entry: &'a JobEntry,
    filter: &'a ExclusionFilter,
    paths: &'a mut Vec<String>,
) -> Pin<Box<dyn Future<Output = ()> + 'a>> {
    Box::pin(async move {
        let path = if parent.is_empty() {
            entry.name.clone()
        } else {
            format!("{parent}/{}", entry.name)
        };

        if filter.is_excluded(&path) {
            debug!(%path, "excluded from discovery");
            return;
        }

        if !entry.is_folder {
            paths.push(path);
            return;
        }

        match lister.list_children(&path).await {
            Ok(children) => {
                for child in children {
                    visit(lister, &path, &child, filter, paths).await;
                }
            }
            Err(e) => {
                warn!(%path, error = %e, "failed to list container, skipping subtree");
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use paramexport_shared::ExportError;
    use std::collections::BTreeMap;

    /// Listing fixture keyed by slash-joined container path.
    struct FakeLister {
        tree: BTreeMap<String, Vec<JobEntry>>,
        broken: Vec<String>,
    }

    impl FakeLister {
        fn new(tree: &[(&str, &[(&str, bool)])]) -> Self {
            let tree = tree
                .iter()
                .map(|(path, entries)| {
                    let entries = entries
                        .iter()
                        .map(|(name, is_folder)| JobEntry {
                            name: (*name).to_string(),
                            is_folder: *is_folder,
                        })
                        .collect();
                    ((*path).to_string(), entries)
                })
                .collect();
            Self {
                tree,
                broken: Vec::new(),
            }
        }

        fn broken(mut self, path: &str) -> Self {
            self.broken.push(path.to_string());
            self
        }
    }

    impl JobLister for FakeLister {
        async fn list_children(&self, path: &str) -> Result<Vec<JobEntry>> {
            if self.broken.iter().any(|b| b == path) {
                return Err(ExportError::Network(format!("{path}: HTTP 500")));
            }
            Ok(self.tree.get(path).cloned().unwrap_or_default())
        }
    }

    fn no_filter() -> ExclusionFilter {
        ExclusionFilter::new(&[])
    }

    #[tokio::test]
    async fn walk_is_preorder_parents_before_children() {
        let lister = FakeLister::new(&[
            ("Root", &[("A", false), ("Sub", true), ("B", false)]),
            ("Root/Sub", &[("D", false)]),
        ]);

        let paths = discover(&lister, "Root", &no_filter()).await.unwrap();
        assert_eq!(paths, vec!["Root/A", "Root/Sub/D", "Root/B"]);
    }

    #[tokio::test]
    async fn repeated_walks_return_fresh_results() {
        let lister = FakeLister::new(&[("Root", &[("job", false)])]);
        let filter = no_filter();

        let first = discover(&lister, "Root", &filter).await.unwrap();
        let second = discover(&lister, "Root", &filter).await.unwrap();
        assert_eq!(first, second);
        assert_eq!(first, vec!["Root/job"]);
    }

    #[tokio::test]
    async fn builtin_markers_prune_subtrees() {
        let lister = FakeLister::new(&[
            ("Root", &[("__DSL__seed", false), ("__factory", true), ("app", false)]),
            ("Root/__factory", &[("hidden", false)]),
        ]);

        let paths = discover(&lister, "Root", &no_filter()).await.unwrap();
        assert_eq!(paths, vec!["Root/app"]);
    }

    #[tokio::test]
    async fn configured_globs_exclude_paths() {
        let lister = FakeLister::new(&[(
            "Root",
            &[("sandbox-a", false), ("sandbox-b", false), ("release", false)],
        )]);
        let filter = ExclusionFilter::new(&["**/sandbox-*".into()]);

        let paths = discover(&lister, "Root", &filter).await.unwrap();
        assert_eq!(paths, vec!["Root/release"]);
    }

    #[tokio::test]
    async fn broken_container_skipped_not_fatal() {
        let lister = FakeLister::new(&[
            ("Root", &[("ok", false), ("Bad", true), ("after", false)]),
            ("Root/Bad", &[("never", false)]),
        ])
        .broken("Root/Bad");

        let paths = discover(&lister, "Root", &no_filter()).await.unwrap();
        assert_eq!(paths, vec!["Root/ok", "Root/after"]);
    }

    #[tokio::test]
    async fn broken_root_is_fatal() {
        let lister = FakeLister::new(&[]).broken("Root");
        let err = discover(&lister, "Root", &no_filter())
            .await
            .unwrap_err();
        assert!(matches!(err, ExportError::Network(_)));
    }

    #[test]
    fn glob_star_does_not_cross_segments() {
        let filter = ExclusionFilter::new(&["Root/*-test".into()]);
        assert!(filter.is_excluded("Root/api-test"));
        assert!(!filter.is_excluded("Root/Sub/api-test"));
    }
}
