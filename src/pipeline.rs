//! Drives the notification pipeline for one push event: fetch each commit,
//! render its diff, compose the document, deliver it.

use tracing::{error, info};

use crate::email::{compose_html, compose_plain, compose_subject};
use crate::error::{NotifierError, Result};
use crate::github::{CommitRecord, DiffSource};
use crate::mailer::Dispatcher;
use crate::render::{DEFAULT_MAX_DIFF_LINES, render_diff};
use crate::utils::branch_from_ref;
use crate::webhook::{CommitStub, PushEvent};

/// Outcome of one webhook delivery. Commits are isolated: a failing commit
/// lands in `failures` and the remaining commits still run.
#[derive(Debug, Default)]
pub struct PipelineReport {
    pub branch: String,
    /// Short shas of commits whose email went out.
    pub delivered: Vec<String>,
    pub failures: Vec<CommitFailure>,
}

#[derive(Debug)]
pub struct CommitFailure {
    pub sha: String,
    pub error: NotifierError,
}

impl PipelineReport {
    pub fn error_summary(&self) -> String {
        self.failures
            .iter()
            .map(|f| {
                let short = f.sha.get(..12).unwrap_or(&f.sha);
                format!("{}: {}", short, f.error)
            })
            .collect::<Vec<_>>()
            .join("; ")
    }
}

pub struct WebhookPipeline<S, D> {
    source: S,
    dispatcher: D,
}

impl<S: DiffSource, D: Dispatcher> WebhookPipeline<S, D> {
    pub fn new(source: S, dispatcher: D) -> Self {
        Self { source, dispatcher }
    }

    /// Processes the commits of one push event, strictly in order. An empty
    /// commit list is a no-op. Each commit blocks on its fetch and its
    /// delivery before the next one starts; a push with many commits
    /// serializes that many round trips.
    pub async fn process(&self, event: &PushEvent) -> PipelineReport {
        let branch = branch_from_ref(&event.git_ref).to_string();
        let mut report = PipelineReport {
            branch: branch.clone(),
            ..Default::default()
        };

        for stub in &event.commits {
            match self.process_commit(event, stub, &branch).await {
                Ok(short_sha) => {
                    info!("Email sent for commit {}", short_sha);
                    report.delivered.push(short_sha);
                }
                Err(e) => {
                    error!("Commit {} failed: {}", stub.id, e);
                    report.failures.push(CommitFailure {
                        sha: stub.id.clone(),
                        error: e,
                    });
                }
            }
        }
        report
    }

    async fn process_commit(
        &self,
        event: &PushEvent,
        stub: &CommitStub,
        branch: &str,
    ) -> Result<String> {
        let owner = &event.repository.owner.login;
        let repo = &event.repository.name;
        let repo_url = &event.repository.html_url;

        let (api_commit, diff_text) = self.source.fetch_commit(owner, repo, &stub.id).await?;
        let record = CommitRecord::from_api(api_commit, branch.to_string());

        let diff = render_diff(&diff_text, DEFAULT_MAX_DIFF_LINES);
        let html = compose_html(&record, repo_url, &diff);
        let plain = compose_plain(&record, repo_url);
        let subject = compose_subject(stub);

        self.dispatcher.send(&subject, &html, Some(&plain)).await?;
        Ok(record.short_sha().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::github::{CommitDetail, FileChange, FileStatus, GitAuthor, GithubCommit};
    use async_trait::async_trait;
    use std::sync::Mutex;

    fn sample_api_commit(sha: &str) -> GithubCommit {
        GithubCommit {
            sha: sha.to_string(),
            html_url: format!(
                "https://github.com/hotwax/mantle-shopify-connector/commit/{sha}"
            ),
            commit: CommitDetail {
                message: "updated orders and returns services".to_string(),
                author: Some(GitAuthor {
                    name: Some("Prerak Ghatode".to_string()),
                    email: Some("prerakghatode4@gmail.com".to_string()),
                    date: None,
                }),
            },
            files: vec![FileChange {
                filename: "service/OrderServices.xml".to_string(),
                status: FileStatus::Modified,
            }],
        }
    }

    fn sample_event(commit_ids: &[&str]) -> PushEvent {
        let commits = commit_ids
            .iter()
            .map(|id| format!(
                r#"{{"id": "{id}", "message": "updated orders and returns services",
                    "author": {{"name": "Prerak Ghatode", "email": "prerakghatode4@gmail.com"}}}}"#
            ))
            .collect::<Vec<_>>()
            .join(",");
        serde_json::from_str(&format!(
            r#"{{
                "ref": "refs/heads/refund-processing",
                "repository": {{
                    "name": "mantle-shopify-connector",
                    "owner": {{"login": "hotwax"}},
                    "html_url": "https://github.com/hotwax/mantle-shopify-connector"
                }},
                "commits": [{commits}]
            }}"#
        ))
        .unwrap()
    }

    struct FakeSource {
        fetched: Mutex<Vec<String>>,
        fail_sha: Option<String>,
    }

    impl FakeSource {
        fn new() -> Self {
            Self {
                fetched: Mutex::new(Vec::new()),
                fail_sha: None,
            }
        }

        fn failing_on(sha: &str) -> Self {
            Self {
                fetched: Mutex::new(Vec::new()),
                fail_sha: Some(sha.to_string()),
            }
        }
    }

    #[async_trait]
    impl DiffSource for FakeSource {
        async fn fetch_commit(
            &self,
            _owner: &str,
            _repo: &str,
            sha: &str,
        ) -> Result<(GithubCommit, String)> {
            self.fetched.lock().unwrap().push(sha.to_string());
            if self.fail_sha.as_deref() == Some(sha) {
                return Err(NotifierError::Fetch {
                    sha: sha.to_string(),
                    message: "boom".to_string(),
                });
            }
            Ok((sample_api_commit(sha), "+added line\n-removed line".to_string()))
        }
    }

    #[derive(Default)]
    struct FakeDispatcher {
        sent: Mutex<Vec<(String, String)>>,
    }

    #[async_trait]
    impl Dispatcher for FakeDispatcher {
        async fn send(&self, subject: &str, html: &str, _text: Option<&str>) -> Result<()> {
            self.sent
                .lock()
                .unwrap()
                .push((subject.to_string(), html.to_string()));
            Ok(())
        }
    }

    #[tokio::test]
    async fn single_commit_push_sends_one_email() {
        let pipeline = WebhookPipeline::new(FakeSource::new(), FakeDispatcher::default());
        let event = sample_event(&["f11d0c0937dbb35248a53b1ee5583eca90eb9cde"]);

        let report = pipeline.process(&event).await;

        assert_eq!(report.branch, "refund-processing");
        assert_eq!(report.delivered, vec!["f11d0c0937db"]);
        assert!(report.failures.is_empty());

        let fetched = pipeline.source.fetched.lock().unwrap();
        assert_eq!(
            *fetched,
            vec!["f11d0c0937dbb35248a53b1ee5583eca90eb9cde".to_string()]
        );

        let sent = pipeline.dispatcher.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        let (subject, html) = &sent[0];
        assert!(subject.contains("Prerak Ghatode"));
        assert!(html.contains("refund-processing"));
        assert!(html.contains("f11d0c0937db"));
    }

    #[tokio::test]
    async fn empty_push_does_nothing() {
        let pipeline = WebhookPipeline::new(FakeSource::new(), FakeDispatcher::default());
        let event = sample_event(&[]);

        let report = pipeline.process(&event).await;

        assert!(report.delivered.is_empty());
        assert!(report.failures.is_empty());
        assert!(pipeline.source.fetched.lock().unwrap().is_empty());
        assert!(pipeline.dispatcher.sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn failed_commit_does_not_abort_the_rest() {
        let first = "f11d0c0937dbb35248a53b1ee5583eca90eb9cde";
        let second = "2344c05c8136207b55090d1d2e37b094db37c112";
        let pipeline = WebhookPipeline::new(
            FakeSource::failing_on(first),
            FakeDispatcher::default(),
        );
        let event = sample_event(&[first, second]);

        let report = pipeline.process(&event).await;

        assert_eq!(report.delivered, vec!["2344c05c8136"]);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].sha, first);
        assert!(report.error_summary().contains("f11d0c0937db"));
        assert_eq!(pipeline.source.fetched.lock().unwrap().len(), 2);
        assert_eq!(pipeline.dispatcher.sent.lock().unwrap().len(), 1);
    }
}
