//! HTTP boundary for the notifier: webhook intake and health check.

use axum::{
    Json,
    body::Bytes,
    extract::State as AxumState,
    http::{HeaderMap, StatusCode},
};
use serde_json::{Value, json};
use tracing::{error, info};

use github_diff_notifier::SharedState;
use github_diff_notifier::github::GithubDiffSource;
use github_diff_notifier::mailer::SmtpDispatcher;
use github_diff_notifier::pipeline::WebhookPipeline;
use github_diff_notifier::utils::verify_github_signature;
use github_diff_notifier::webhook::PushEvent;

pub async fn health() -> Json<Value> {
    Json(json!({"status": "healthy"}))
}

/// Handles the GitHub webhook POST request. Signature is checked before
/// anything else touches the payload; non-push events and commit-less
/// pushes are acknowledged without doing work.
pub async fn handle_webhook(
    AxumState(state): AxumState<SharedState>,
    headers: HeaderMap,
    body: Bytes,
) -> (StatusCode, Json<Value>) {
    let signature = headers
        .get("X-Hub-Signature-256")
        .and_then(|v| v.to_str().ok());
    if !verify_github_signature(state.config.webhook_secret.as_deref(), &body, signature) {
        error!("Webhook signature verification failed");
        return (
            StatusCode::FORBIDDEN,
            Json(json!({"error": "Invalid signature"})),
        );
    }

    let event_type = headers.get("X-GitHub-Event").and_then(|v| v.to_str().ok());
    if event_type != Some("push") {
        info!("Ignoring {:?} event", event_type);
        return (
            StatusCode::OK,
            Json(json!({
                "message": format!("Ignored event type: {}", event_type.unwrap_or("unknown"))
            })),
        );
    }

    let event: PushEvent = match serde_json::from_slice(&body) {
        Ok(event) => event,
        Err(e) => {
            info!("Could not parse push payload: {:?}", e);
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({"error": "Malformed push payload"})),
            );
        }
    };

    // Branch deletions arrive as pushes with no commits.
    if event.commits.is_empty() {
        info!("Push on {} has no commits, nothing to process", event.git_ref);
        return (
            StatusCode::OK,
            Json(json!({"message": "No commits to process"})),
        );
    }

    info!(
        "Processing push on {} with {} commit(s)",
        event.git_ref,
        event.commits.len()
    );

    let pipeline = WebhookPipeline::new(
        GithubDiffSource::new(state.http.clone(), state.config.github_token.clone()),
        SmtpDispatcher::new(state.config.smtp.clone()),
    );
    let report = pipeline.process(&event).await;

    if report.failures.is_empty() {
        (
            StatusCode::OK,
            Json(json!({
                "message": "Emails sent successfully",
                "delivered": report.delivered.len()
            })),
        )
    } else {
        let summary = report.error_summary();
        error!("Webhook processing failed: {}", summary);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({
                "error": summary,
                "delivered": report.delivered.len()
            })),
        )
    }
}
