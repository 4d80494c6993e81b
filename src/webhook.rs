//! Push-event payload structures

use serde::Deserialize;

/// GitHub push-event webhook payload, reduced to the fields the
/// notification pipeline needs.
#[derive(Debug, Clone, Deserialize)]
pub struct PushEvent {
    #[serde(rename = "ref")]
    pub git_ref: String,
    pub repository: RepositoryRef,
    /// May be empty, e.g. on branch deletion.
    #[serde(default)]
    pub commits: Vec<CommitStub>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RepositoryRef {
    pub name: String,
    pub owner: RepositoryOwner,
    pub html_url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RepositoryOwner {
    pub login: String,
}

/// Partial commit data present in the push payload. Only used to derive
/// the email subject before the full record is fetched from the API.
#[derive(Debug, Clone, Deserialize)]
pub struct CommitStub {
    pub id: String,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub author: StubAuthor,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StubAuthor {
    pub name: Option<String>,
    pub email: Option<String>,
}
