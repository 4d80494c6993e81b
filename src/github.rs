//! Commit metadata and diff retrieval from the GitHub API.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::error::{NotifierError, Result};

pub const GITHUB_API_BASE: &str = "https://api.github.com";

const ACCEPT_JSON: &str = "application/vnd.github+json";
const ACCEPT_DIFF: &str = "application/vnd.github.v3.diff";
const USER_AGENT: &str = concat!("github-diff-notifier/", env!("CARGO_PKG_VERSION"));

/// Commit resource as returned by `GET /repos/{owner}/{repo}/commits/{sha}`,
/// reduced to the fields the notification needs.
#[derive(Debug, Clone, Deserialize)]
pub struct GithubCommit {
    pub sha: String,
    pub html_url: String,
    pub commit: CommitDetail,
    #[serde(default)]
    pub files: Vec<FileChange>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CommitDetail {
    #[serde(default)]
    pub message: String,
    pub author: Option<GitAuthor>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GitAuthor {
    pub name: Option<String>,
    pub email: Option<String>,
    pub date: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FileChange {
    pub filename: String,
    #[serde(default)]
    pub status: FileStatus,
}

/// Change status of a file within a commit. GitHub also reports statuses
/// like "renamed" and "copied"; anything unrecognized maps to `Other`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileStatus {
    Added,
    Modified,
    Removed,
    #[default]
    #[serde(other)]
    Other,
}

/// Fully resolved commit, ready for composition. The branch comes from the
/// push-event ref, not from the API response.
#[derive(Debug, Clone)]
pub struct CommitRecord {
    pub sha: String,
    pub html_url: String,
    pub branch: String,
    pub message: String,
    pub author_name: String,
    pub author_email: String,
    pub author_date: Option<DateTime<Utc>>,
    pub files: Vec<FileChange>,
}

impl CommitRecord {
    pub fn from_api(api: GithubCommit, branch: String) -> Self {
        let author = api.commit.author.unwrap_or_default();
        Self {
            sha: api.sha,
            html_url: api.html_url,
            branch,
            message: api.commit.message,
            author_name: author.name.unwrap_or_else(|| "Unknown".to_string()),
            author_email: author.email.unwrap_or_default(),
            author_date: author.date,
            files: api.files,
        }
    }

    /// First 12 hex characters of the sha, for display.
    pub fn short_sha(&self) -> &str {
        self.sha.get(..12).unwrap_or(&self.sha)
    }
}

/// Source of commit metadata and raw diff text.
#[async_trait]
pub trait DiffSource: Send + Sync {
    async fn fetch_commit(
        &self,
        owner: &str,
        repo: &str,
        sha: &str,
    ) -> Result<(GithubCommit, String)>;
}

/// GitHub-backed diff source. Issues two reads against the commit endpoint,
/// differentiated only by the `Accept` header.
pub struct GithubDiffSource {
    client: reqwest::Client,
    token: Option<String>,
    api_base: String,
}

impl GithubDiffSource {
    pub fn new(client: reqwest::Client, token: Option<String>) -> Self {
        Self {
            client,
            token,
            api_base: GITHUB_API_BASE.to_string(),
        }
    }

    fn commit_request(&self, url: &str, accept: &str) -> reqwest::RequestBuilder {
        let mut request = self
            .client
            .get(url)
            .header("Accept", accept)
            .header("User-Agent", USER_AGENT);
        // Unauthenticated calls are permitted; GitHub rate-limits them.
        if let Some(token) = &self.token {
            request = request.header("Authorization", format!("token {token}"));
        }
        request
    }
}

#[async_trait]
impl DiffSource for GithubDiffSource {
    async fn fetch_commit(
        &self,
        owner: &str,
        repo: &str,
        sha: &str,
    ) -> Result<(GithubCommit, String)> {
        let url = format!("{}/repos/{}/{}/commits/{}", self.api_base, owner, repo, sha);
        let fetch_err = |e: reqwest::Error| NotifierError::Fetch {
            sha: sha.to_string(),
            message: e.to_string(),
        };

        let metadata_body = self
            .commit_request(&url, ACCEPT_JSON)
            .send()
            .await
            .map_err(fetch_err)?
            .error_for_status()
            .map_err(fetch_err)?
            .text()
            .await
            .map_err(fetch_err)?;
        let commit: GithubCommit = serde_json::from_str(&metadata_body).map_err(|e| {
            NotifierError::MalformedResponse {
                sha: sha.to_string(),
                message: e.to_string(),
            }
        })?;

        let diff_text = self
            .commit_request(&url, ACCEPT_DIFF)
            .send()
            .await
            .map_err(fetch_err)?
            .error_for_status()
            .map_err(fetch_err)?
            .text()
            .await
            .map_err(fetch_err)?;

        Ok((commit, diff_text))
    }
}
