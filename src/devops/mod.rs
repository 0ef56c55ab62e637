pub mod aggregate;
pub mod types;

pub use aggregate::FileAggregates;
pub use types::{Commit, Credentials};

use async_trait::async_trait;
use reqwest::header::{HeaderValue, CONTENT_TYPE};
use reqwest::Url;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, info, instrument};

use crate::config::AzureDevOpsConfig;
use types::{ChangeList, Repository, ValueList};

/// Maximum number of characters of an error body kept for diagnostics.
const SNIPPET_LEN: usize = 200;

#[derive(Debug, Error)]
pub enum DevOpsError {
    #[error("Azure DevOps request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Failed to fetch {what} (HTTP {status}) from {url}: {snippet}")]
    Upstream {
        what: &'static str,
        url: String,
        status: u16,
        snippet: String,
    },

    #[error("Repository '{repository}' not found in project '{project}'")]
    RepositoryNotFound { repository: String, project: String },

    #[error("Failed to decode {what}: {source}")]
    Decode {
        what: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid Azure DevOps base URL: {0}")]
    InvalidBaseUrl(String),
}

/// Raw HTTP response handed back by a `Transport`.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    /// Only 200 counts. Azure DevOps answers an invalid or expired PAT with
    /// 203 and an HTML sign-in page.
    pub fn is_success(&self) -> bool {
        self.status == 200
    }
}

/// The authenticated session used by `DevOpsClient`.
/// Implementations must not retry; every call maps to exactly one request.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn get(&self, url: &Url) -> Result<HttpResponse, DevOpsError>;
}

/// reqwest-backed session authenticating with basic auth:
/// empty username, personal access token as password.
pub struct HttpTransport {
    client: reqwest::Client,
    token: String,
}

impl HttpTransport {
    pub fn new(token: &str) -> Result<Self, DevOpsError> {
        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        let client = reqwest::Client::builder()
            .user_agent(concat!("pr-file-extractor/", env!("CARGO_PKG_VERSION")))
            .default_headers(headers)
            .build()?;
        Ok(Self {
            client,
            token: token.to_string(),
        })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get(&self, url: &Url) -> Result<HttpResponse, DevOpsError> {
        let response = self
            .client
            .get(url.clone())
            .basic_auth("", Some(&self.token))
            .send()
            .await?;
        let status = response.status().as_u16();
        let body = response.text().await?;
        Ok(HttpResponse { status, body })
    }
}

/// A session scoped to one organization/project/repository/pull request.
///
/// The repository id is resolved once in `connect` and reused for every
/// later call. Release the session with `close`.
pub struct DevOpsClient<T> {
    transport: T,
    base_url: Url,
    api_version: String,
    organization: String,
    project: String,
    pr_number: u64,
    repository_id: String,
}

impl<T: Transport> DevOpsClient<T> {
    /// Open a session over `transport` and resolve the repository id.
    #[instrument(skip(transport, credentials, settings), fields(org = %credentials.organization, project = %credentials.project, repo = %credentials.repository))]
    pub async fn connect(
        transport: T,
        credentials: &Credentials,
        settings: &AzureDevOpsConfig,
    ) -> Result<Self, DevOpsError> {
        let base_url = Url::parse(&settings.base_url)
            .map_err(|_| DevOpsError::InvalidBaseUrl(settings.base_url.clone()))?;
        if base_url.cannot_be_a_base() {
            return Err(DevOpsError::InvalidBaseUrl(settings.base_url.clone()));
        }

        let mut client = Self {
            transport,
            base_url,
            api_version: settings.api_version.clone(),
            organization: credentials.organization.clone(),
            project: credentials.project.clone(),
            pr_number: credentials.pr_number,
            repository_id: String::new(),
        };
        client.repository_id = client.resolve_repository_id(&credentials.repository).await?;
        info!(repository_id = %client.repository_id, "resolved repository");
        Ok(client)
    }

    pub fn repository_id(&self) -> &str {
        &self.repository_id
    }

    async fn resolve_repository_id(&self, name: &str) -> Result<String, DevOpsError> {
        let url = self.api_url(&[])?;
        let repositories: ValueList<Repository> = self.get_json(&url, "repository list").await?;
        debug!(count = repositories.value.len(), "received repository list");

        let wanted = name.to_lowercase();
        repositories
            .value
            .into_iter()
            .find(|repo| repo.name.to_lowercase() == wanted)
            .map(|repo| repo.id)
            .ok_or_else(|| DevOpsError::RepositoryNotFound {
                repository: name.to_string(),
                project: self.project.clone(),
            })
    }

    /// Fetch the commits of the pull request in the order the API returns them.
    #[instrument(skip(self), fields(pr = self.pr_number))]
    pub async fn list_pull_request_commits(&self) -> Result<Vec<Commit>, DevOpsError> {
        let pr_number = self.pr_number.to_string();
        let url = self.api_url(&[
            self.repository_id.as_str(),
            "pullRequests",
            pr_number.as_str(),
            "commits",
        ])?;
        let commits: ValueList<Commit> = self.get_json(&url, "commits").await?;
        debug!(commits = commits.value.len(), "received PR commits");
        Ok(commits.value)
    }

    /// Fetch every commit's change list and fold the blob changes into
    /// per-file aggregates. The first failed request aborts the whole pass.
    #[instrument(skip(self), fields(pr = self.pr_number))]
    pub async fn collect_changed_files(&self) -> Result<FileAggregates, DevOpsError> {
        let mut aggregates = FileAggregates::new();

        for commit in self.list_pull_request_commits().await? {
            let url = self.api_url(&[
                self.repository_id.as_str(),
                "commits",
                commit.commit_id.as_str(),
                "changes",
            ])?;
            let changes: ChangeList = self.get_json(&url, "commit changes").await?;
            let recorded = aggregate::fold_commit(&mut aggregates, &commit.author.name, &changes.changes);
            debug!(commit = %commit.commit_id, author = %commit.author.name, changes = changes.changes.len(), recorded, "folded commit");
        }

        info!(files = aggregates.len(), "aggregated changed files");
        Ok(aggregates)
    }

    /// Release the session.
    pub fn close(self) {
        debug!(repository_id = %self.repository_id, "closing Azure DevOps session");
        drop(self.transport);
    }

    /// `{base}/{org}/{project}/_apis/git/repositories/{segments...}?api-version=...`
    fn api_url(&self, segments: &[&str]) -> Result<Url, DevOpsError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| DevOpsError::InvalidBaseUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend([
                self.organization.as_str(),
                self.project.as_str(),
                "_apis",
                "git",
                "repositories",
            ])
            .extend(segments);
        url.query_pairs_mut()
            .append_pair("api-version", &self.api_version);
        Ok(url)
    }

    async fn get_json<R: DeserializeOwned>(
        &self,
        url: &Url,
        what: &'static str,
    ) -> Result<R, DevOpsError> {
        debug!(%url, "GET");
        let response = self.transport.get(url).await?;
        if !response.is_success() {
            return Err(DevOpsError::Upstream {
                what,
                url: url.to_string(),
                status: response.status,
                snippet: snippet(&response.body),
            });
        }
        serde_json::from_str(&response.body).map_err(|source| DevOpsError::Decode { what, source })
    }
}

/// Fetch the per-file aggregates for one pull request.
pub async fn fetch_pr_files(
    credentials: &Credentials,
    settings: &AzureDevOpsConfig,
) -> Result<FileAggregates, DevOpsError> {
    let transport = HttpTransport::new(&credentials.token)?;
    fetch_pr_files_with(transport, credentials, settings).await
}

/// Connect over `transport`, collect, and close the session whether or not
/// collection succeeded.
#[instrument(skip_all, fields(org = %credentials.organization, project = %credentials.project, pr = credentials.pr_number))]
pub async fn fetch_pr_files_with<T: Transport>(
    transport: T,
    credentials: &Credentials,
    settings: &AzureDevOpsConfig,
) -> Result<FileAggregates, DevOpsError> {
    let client = DevOpsClient::connect(transport, credentials, settings).await?;
    debug!(repository_id = client.repository_id(), "session open");
    let result = client.collect_changed_files().await;
    client.close();
    result
}

fn snippet(body: &str) -> String {
    body.chars().take(SNIPPET_LEN).collect()
}
