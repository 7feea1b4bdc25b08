//! End-to-end export pipeline: discover → catalog → normalize → assemble.
//!
//! The pipeline is deliberately fault-tolerant at the job level: one job
//! whose configuration cannot be fetched or parsed is reported and skipped,
//! never aborting the run. The schema artifact is checkpointed after every
//! job, so both a crash and a cancellation leave a usable partial document.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use tracing::{info, instrument, warn};

use paramexport_jenkins::{ExclusionFilter, JenkinsApi, discover};
use paramexport_normalize::Registry;
use paramexport_store::CacheStore;
use paramexport_shared::Result;
use paramexport_xml::convert;

use crate::assembler::SchemaAssembler;

/// Configuration for one export run.
#[derive(Debug, Clone)]
pub struct ExportConfig {
    /// Slash-joined path of the folder to export.
    pub root: String,
    /// Reuse cached job paths and catalog instead of hitting the server.
    pub use_cache: bool,
    /// Extra exclusion patterns on top of the built-in markers.
    pub exclude_patterns: Vec<String>,
}

/// What went wrong (non-fatally) during an export.
#[derive(Debug, Clone, Default)]
pub struct ExportReport {
    /// Jobs whose configuration could not be fetched or parsed (path, error).
    pub failed_jobs: Vec<(String, String)>,
    /// Parameter kinds seen without a registered normalizer (job, identifier).
    pub unmapped: Vec<(String, String)>,
}

/// Result of a completed (or cancelled) export run.
#[derive(Debug)]
pub struct ExportResult {
    /// Path of the written schema artifact.
    pub schema_path: PathBuf,
    /// Jobs recorded in the schema.
    pub job_count: usize,
    /// Jobs that declared at least one parameter group.
    pub parameterized_count: usize,
    /// Non-fatal problems encountered.
    pub report: ExportReport,
    /// True when the run stopped early on a cancellation signal.
    pub cancelled: bool,
    /// Total elapsed time.
    pub elapsed: std::time::Duration,
}

/// Progress callback for reporting pipeline status.
pub trait ProgressReporter: Send + Sync {
    /// Called when entering a new phase.
    fn phase(&self, name: &str);
    /// Called after each job is processed.
    fn job_processed(&self, path: &str, current: usize, total: usize);
    /// Called when the pipeline completes.
    fn done(&self, result: &ExportResult);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn phase(&self, _name: &str) {}
    fn job_processed(&self, _path: &str, _current: usize, _total: usize) {}
    fn done(&self, _result: &ExportResult) {}
}

/// Run the full export pipeline.
///
/// 1. Discover job paths under the root (or load them from cache)
/// 2. Fetch the DSL catalog (or load it from cache) and build the registry
/// 3. Per job: fetch configuration, convert, normalize, append, checkpoint
#[instrument(skip_all, fields(root = %config.root, use_cache = config.use_cache))]
pub async fn export<A: JenkinsApi>(
    config: &ExportConfig,
    api: &A,
    store: &CacheStore,
    progress: &dyn ProgressReporter,
    cancel: &AtomicBool,
) -> Result<ExportResult> {
    let start = Instant::now();
    let root = config.root.as_str();

    // --- Phase 1: Discovery ---
    progress.phase("Discovering jobs");
    let cached_paths = if config.use_cache {
        store.read_job_paths(root)?
    } else {
        None
    };
    let job_paths = match cached_paths {
        Some(paths) => {
            info!(jobs = paths.len(), "using cached job paths");
            paths
        }
        None => {
            let filter = ExclusionFilter::new(&config.exclude_patterns);
            let paths = discover(api, root, &filter).await?;
            store.write_job_paths(root, &paths)?;
            paths
        }
    };

    // --- Phase 2: Catalog / registry ---
    progress.phase("Resolving parameter catalog");
    let cached_catalog = if config.use_cache {
        store.read_catalog(root)?
    } else {
        None
    };
    let raw_catalog = match cached_catalog {
        Some(catalog) => {
            info!(entries = catalog.len(), "using cached catalog");
            catalog
        }
        None => api.fetch_catalog().await?,
    };
    let registry = Registry::build(&raw_catalog);
    store.write_catalog(root, registry.catalog())?;
    info!(kinds = registry.len(), "parameter registry built");

    // --- Phase 3: Per-job normalization ---
    progress.phase("Exporting job parameters");
    let mut assembler = SchemaAssembler::new(root);
    let mut report = ExportReport::default();
    let mut parameterized = 0usize;
    let mut cancelled = false;
    let total = job_paths.len();

    for (i, path) in job_paths.iter().enumerate() {
        if cancel.load(Ordering::Relaxed) {
            warn!(processed = i, total, "export cancelled, keeping checkpoint");
            cancelled = true;
            break;
        }

        match process_job(api, &registry, &mut assembler, path).await {
            Ok(outcome) => {
                if outcome.group_count > 0 {
                    parameterized += 1;
                }
                report
                    .unmapped
                    .extend(outcome.unmapped.into_iter().map(|id| (path.clone(), id)));
            }
            Err(e) => {
                warn!(job = %path, error = %e, "job export failed, skipping");
                report.failed_jobs.push((path.clone(), e.to_string()));
            }
        }

        // Checkpoint after every job so interruption never loses progress.
        store.write_schema(root, assembler.schema())?;
        progress.job_processed(path, i + 1, total);
    }

    if total == 0 {
        store.write_schema(root, assembler.schema())?;
    }

    let result = ExportResult {
        schema_path: store.schema_path(root),
        job_count: assembler.job_count(),
        parameterized_count: parameterized,
        report,
        cancelled,
        elapsed: start.elapsed(),
    };

    progress.done(&result);

    info!(
        jobs = result.job_count,
        parameterized = result.parameterized_count,
        failed = result.report.failed_jobs.len(),
        unmapped = result.report.unmapped.len(),
        cancelled = result.cancelled,
        elapsed_ms = result.elapsed.as_millis(),
        "export complete"
    );

    Ok(result)
}

/// Fetch, convert, and normalize one job.
async fn process_job<A: JenkinsApi>(
    api: &A,
    registry: &Registry,
    assembler: &mut SchemaAssembler,
    path: &str,
) -> Result<crate::assembler::JobOutcome> {
    let xml = api.fetch_config(path).await?;
    let document = convert(&xml)?;
    Ok(assembler.push_job(registry, path, &document))
}

#[cfg(test)]
mod tests {
    use super::*;
    use paramexport_jenkins::{JobEntry, JobLister};
    use paramexport_shared::{ExportError, ParameterConfig};
    use std::collections::BTreeMap;
    use std::sync::atomic::AtomicBool;

    struct FakeApi {
        tree: BTreeMap<String, Vec<JobEntry>>,
        configs: BTreeMap<String, String>,
        catalog: BTreeMap<String, String>,
        fail_listing: bool,
    }

    impl FakeApi {
        fn new() -> Self {
            Self {
                tree: BTreeMap::new(),
                configs: BTreeMap::new(),
                catalog: default_catalog(),
                fail_listing: false,
            }
        }

        fn folder(mut self, path: &str, entries: &[(&str, bool)]) -> Self {
            self.tree.insert(
                path.to_string(),
                entries
                    .iter()
                    .map(|(name, is_folder)| JobEntry {
                        name: (*name).to_string(),
                        is_folder: *is_folder,
                    })
                    .collect(),
            );
            self
        }

        fn config(mut self, path: &str, xml: &str) -> Self {
            self.configs.insert(path.to_string(), xml.to_string());
            self
        }
    }

    impl JobLister for FakeApi {
        async fn list_children(&self, path: &str) -> Result<Vec<JobEntry>> {
            if self.fail_listing {
                return Err(ExportError::Network("listing disabled".into()));
            }
            Ok(self.tree.get(path).cloned().unwrap_or_default())
        }
    }

    impl JenkinsApi for FakeApi {
        async fn fetch_config(&self, path: &str) -> Result<String> {
            self.configs
                .get(path)
                .cloned()
                .ok_or_else(|| ExportError::Network(format!("{path}: HTTP 404")))
        }

        async fn fetch_catalog(&self) -> Result<BTreeMap<String, String>> {
            Ok(self.catalog.clone())
        }
    }

    fn default_catalog() -> BTreeMap<String, String> {
        [
            ("booleanParam", "hudson.model.BooleanParameterDefinition"),
            ("choiceParam", "hudson.model.ChoiceParameterDefinition"),
            ("stringParam", "hudson.model.StringParameterDefinition"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
    }

    fn temp_store(label: &str) -> CacheStore {
        let dir = std::env::temp_dir().join(format!(
            "paramexport-pipeline-{label}-{}",
            std::process::id()
        ));
        let _ = std::fs::remove_dir_all(&dir);
        CacheStore::new(dir)
    }

    fn pipeline_xml(definitions: &str) -> String {
        format!(
            concat!(
                "<flow-definition><properties>",
                "<hudson.model.ParametersDefinitionProperty>",
                "<parameterDefinitions>{}</parameterDefinitions>",
                "</hudson.model.ParametersDefinitionProperty>",
                "</properties></flow-definition>",
            ),
            definitions
        )
    }

    fn no_cancel() -> AtomicBool {
        AtomicBool::new(false)
    }

    fn run_config(root: &str) -> ExportConfig {
        ExportConfig {
            root: root.to_string(),
            use_cache: false,
            exclude_patterns: Vec::new(),
        }
    }

    #[tokio::test]
    async fn end_to_end_export() {
        let api = FakeApi::new()
            .folder("Root", &[("deploy", false), ("Sub", true)])
            .folder("Root/Sub", &[("release", false)])
            .config(
                "Root/deploy",
                &pipeline_xml(concat!(
                    "<hudson.model.BooleanParameterDefinition>",
                    "<name>DRY_RUN</name><defaultValue>true</defaultValue>",
                    "</hudson.model.BooleanParameterDefinition>",
                    "<hudson.model.ChoiceParameterDefinition>",
                    "<name>ENV</name>",
                    r#"<choices class="java.util.Arrays$ArrayList">"#,
                    "<a><string>dev</string><string>prod</string></a>",
                    "</choices>",
                    "</hudson.model.ChoiceParameterDefinition>",
                )),
            )
            .config("Root/Sub/release", "<flow-definition/>");

        let store = temp_store("e2e");
        let result = export(&run_config("Root"), &api, &store, &SilentProgress, &no_cancel())
            .await
            .unwrap();

        assert_eq!(result.job_count, 2);
        assert_eq!(result.parameterized_count, 1);
        assert!(result.report.failed_jobs.is_empty());
        assert!(!result.cancelled);

        let schema = store.read_schema("Root").unwrap().unwrap();
        assert_eq!(schema.root, "Root");
        assert_eq!(schema.pipelines[0].name, "Root/deploy");
        assert_eq!(schema.pipelines[0].parameters.len(), 2);
        assert_eq!(schema.pipelines[1].name, "Root/Sub/release");

        let ParameterConfig::Choice(choice) = &schema.pipelines[0].parameters[1].configs[0] else {
            panic!("expected choice config");
        };
        assert_eq!(choice.choices, vec!["dev", "prod"]);

        // Discovery and catalog artifacts were cached alongside
        assert!(store.read_job_paths("Root").unwrap().is_some());
        assert!(store.read_catalog("Root").unwrap().is_some());

        let _ = std::fs::remove_dir_all(store.dir());
    }

    #[tokio::test]
    async fn failed_job_is_skipped_not_fatal() {
        let api = FakeApi::new()
            .folder("Root", &[("broken", false), ("ok", false)])
            .config("Root/ok", "<flow-definition/>");

        let store = temp_store("failtol");
        let result = export(&run_config("Root"), &api, &store, &SilentProgress, &no_cancel())
            .await
            .unwrap();

        assert_eq!(result.job_count, 1);
        assert_eq!(result.report.failed_jobs.len(), 1);
        assert_eq!(result.report.failed_jobs[0].0, "Root/broken");

        let schema = store.read_schema("Root").unwrap().unwrap();
        assert_eq!(schema.pipelines.len(), 1);
        assert_eq!(schema.pipelines[0].name, "Root/ok");

        let _ = std::fs::remove_dir_all(store.dir());
    }

    #[tokio::test]
    async fn malformed_config_reported_per_job() {
        let api = FakeApi::new()
            .folder("Root", &[("bad-xml", false)])
            .config("Root/bad-xml", "<flow-definition><unclosed>");

        let store = temp_store("badxml");
        let result = export(&run_config("Root"), &api, &store, &SilentProgress, &no_cancel())
            .await
            .unwrap();

        assert_eq!(result.job_count, 0);
        assert_eq!(result.report.failed_jobs.len(), 1);

        let _ = std::fs::remove_dir_all(store.dir());
    }

    #[tokio::test]
    async fn unmapped_kinds_reported_per_job() {
        let odd = pipeline_xml(
            "<org.example.OddParameterDefinition><name>x</name></org.example.OddParameterDefinition>",
        );
        let api = FakeApi::new()
            .folder("Root", &[("a", false), ("b", false)])
            .config("Root/a", &odd)
            .config("Root/b", &odd);

        let store = temp_store("unmapped");
        let result = export(&run_config("Root"), &api, &store, &SilentProgress, &no_cancel())
            .await
            .unwrap();

        assert_eq!(
            result.report.unmapped,
            vec![
                ("Root/a".to_string(), "org.example.OddParameterDefinition".to_string()),
                ("Root/b".to_string(), "org.example.OddParameterDefinition".to_string()),
            ]
        );
        // Unmapped kinds never abort the job itself
        assert_eq!(result.job_count, 2);

        let _ = std::fs::remove_dir_all(store.dir());
    }

    #[tokio::test]
    async fn cached_run_never_lists_the_server() {
        let store = temp_store("cached");
        store
            .write_job_paths("Root", &["Root/deploy".to_string()])
            .unwrap();
        store.write_catalog("Root", &default_catalog()).unwrap();

        let mut api = FakeApi::new().config("Root/deploy", "<flow-definition/>");
        api.fail_listing = true;

        let config = ExportConfig {
            use_cache: true,
            ..run_config("Root")
        };
        let result = export(&config, &api, &store, &SilentProgress, &no_cancel())
            .await
            .unwrap();

        assert_eq!(result.job_count, 1);
        assert!(result.report.failed_jobs.is_empty());

        let _ = std::fs::remove_dir_all(store.dir());
    }

    #[tokio::test]
    async fn cancellation_keeps_checkpoint() {
        let api = FakeApi::new()
            .folder("Root", &[("a", false), ("b", false)])
            .config("Root/a", "<flow-definition/>")
            .config("Root/b", "<flow-definition/>");

        let store = temp_store("cancel");
        let cancel = AtomicBool::new(true);
        let result = export(&run_config("Root"), &api, &store, &SilentProgress, &cancel)
            .await
            .unwrap();

        assert!(result.cancelled);
        assert_eq!(result.job_count, 0);

        let _ = std::fs::remove_dir_all(store.dir());
    }

    #[tokio::test]
    async fn empty_folder_writes_empty_schema() {
        let api = FakeApi::new().folder("Root", &[]);
        let store = temp_store("empty");

        let result = export(&run_config("Root"), &api, &store, &SilentProgress, &no_cancel())
            .await
            .unwrap();

        assert_eq!(result.job_count, 0);
        let schema = store.read_schema("Root").unwrap().unwrap();
        assert!(schema.pipelines.is_empty());

        let _ = std::fs::remove_dir_all(store.dir());
    }
}
