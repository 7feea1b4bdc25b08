//! Jenkins HTTP collaborators: folder listing, raw job configuration, and
//! the DSL method catalog.
//!
//! All access goes through the [`JobLister`] / [`JenkinsApi`] traits so the
//! walker and pipeline can run against fakes in tests. [`JenkinsClient`] is
//! the production implementation on top of `reqwest`.

use std::collections::BTreeMap;
use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;
use tracing::debug;
use url::Url;

use paramexport_shared::{ExportError, JenkinsConfig, Result};

pub mod walker;

pub use walker::{ExclusionFilter, discover};

/// User-Agent string for export requests.
const USER_AGENT: &str = concat!("paramexport/", env!("CARGO_PKG_VERSION"));

/// Implementation class marking a job container rather than a buildable job.
pub const FOLDER_CLASS: &str = "com.cloudbees.hudson.plugins.folder.Folder";

/// DSL context whose methods describe build parameters.
const PARAMETERS_CONTEXT: &str = "javaposse.jobdsl.dsl.helpers.BuildParametersContext";

// ---------------------------------------------------------------------------
// Traits
// ---------------------------------------------------------------------------

/// One entry in a folder listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobEntry {
    /// Job or folder name, a single path segment.
    pub name: String,
    /// True when the entry is a container the walker must descend into.
    pub is_folder: bool,
}

/// Listing of a job container's direct children.
pub trait JobLister {
    /// Children of the container at `path` (slash-joined segments from the
    /// server root; empty string means the root itself), in server order.
    fn list_children(&self, path: &str) -> impl Future<Output = Result<Vec<JobEntry>>>;
}

/// Full server surface the export pipeline needs.
pub trait JenkinsApi: JobLister {
    /// Raw configuration document for the job at `path`.
    fn fetch_config(&self, path: &str) -> impl Future<Output = Result<String>>;

    /// Method-name → type-identifier catalog from the DSL viewer endpoint.
    fn fetch_catalog(&self) -> impl Future<Output = Result<BTreeMap<String, String>>>;
}

// ---------------------------------------------------------------------------
// JenkinsClient
// ---------------------------------------------------------------------------

/// Authenticated HTTP client for a single Jenkins server.
pub struct JenkinsClient {
    base: Url,
    client: Client,
    auth_header: String,
    token: String,
}

impl JenkinsClient {
    /// Build a client from configuration and a resolved API token.
    pub fn new(config: &JenkinsConfig, token: String) -> Result<Self> {
        let base = Url::parse(&config.url)
            .map_err(|e| ExportError::config(format!("invalid server URL {}: {e}", config.url)))?;

        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ExportError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            base,
            client,
            auth_header: config.auth_header.clone(),
            token,
        })
    }

    /// URL of the job at `path`: one `/job/<segment>` hop per path segment.
    fn job_url(&self, path: &str) -> String {
        let mut url = self.base.as_str().trim_end_matches('/').to_string();
        for segment in path.split('/').filter(|s| !s.is_empty()) {
            url.push_str("/job/");
            url.push_str(segment);
        }
        url
    }

    async fn get_text(&self, url: &str) -> Result<String> {
        debug!(%url, "GET");
        let response = self
            .client
            .get(url)
            .header(self.auth_header.as_str(), self.token.as_str())
            .send()
            .await
            .map_err(|e| ExportError::Network(format!("{url}: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ExportError::Network(format!("{url}: HTTP {status}")));
        }

        response
            .text()
            .await
            .map_err(|e| ExportError::Network(format!("{url}: body read failed: {e}")))
    }
}

impl JobLister for JenkinsClient {
    async fn list_children(&self, path: &str) -> Result<Vec<JobEntry>> {
        let url = format!("{}/api/json", self.job_url(path));
        let body = self.get_text(&url).await?;
        let listing: FolderListing = serde_json::from_str(&body)
            .map_err(|e| ExportError::parse(format!("{url}: bad folder listing: {e}")))?;

        Ok(listing
            .jobs
            .into_iter()
            .map(|job| JobEntry {
                is_folder: job.class == FOLDER_CLASS,
                name: job.name,
            })
            .collect())
    }
}

impl JenkinsApi for JenkinsClient {
    async fn fetch_config(&self, path: &str) -> Result<String> {
        let url = format!("{}/config.xml", self.job_url(path));
        self.get_text(&url).await
    }

    async fn fetch_catalog(&self) -> Result<BTreeMap<String, String>> {
        let url = format!(
            "{}/job-dsl-api-viewer/data",
            self.base.as_str().trim_end_matches('/')
        );
        let body = self.get_text(&url).await?;
        let data: DslData = serde_json::from_str(&body)
            .map_err(|e| ExportError::parse(format!("{url}: bad catalog payload: {e}")))?;

        let context = data.contexts.get(PARAMETERS_CONTEXT).ok_or_else(|| {
            ExportError::parse(format!("catalog has no {PARAMETERS_CONTEXT} context"))
        })?;

        let mut catalog = BTreeMap::new();
        for method in &context.methods {
            let Some(identifier) = method
                .signatures
                .iter()
                .find_map(|sig| sig.context_class.clone())
            else {
                debug!(method = %method.name, "catalog method has no context class");
                continue;
            };
            catalog.insert(method.name.clone(), identifier);
        }
        Ok(catalog)
    }
}

// ---------------------------------------------------------------------------
// Wire payloads
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct FolderListing {
    #[serde(default)]
    jobs: Vec<ListedJob>,
}

#[derive(Debug, Deserialize)]
struct ListedJob {
    name: String,
    #[serde(rename = "_class", default)]
    class: String,
}

#[derive(Debug, Deserialize)]
struct DslData {
    contexts: BTreeMap<String, DslContext>,
}

#[derive(Debug, Deserialize)]
struct DslContext {
    #[serde(default)]
    methods: Vec<DslMethod>,
}

#[derive(Debug, Deserialize)]
struct DslMethod {
    name: String,
    #[serde(default)]
    signatures: Vec<DslSignature>,
}

#[derive(Debug, Deserialize)]
struct DslSignature {
    #[serde(rename = "contextClass")]
    context_class: Option<String>,
}
