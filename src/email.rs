//! Assembles the notification document from a commit record.

use chrono::SecondsFormat;
use html_escape::{encode_double_quoted_attribute, encode_text};

use crate::github::{CommitRecord, FileStatus};
use crate::render::RenderedDiff;
use crate::webhook::CommitStub;

const LIST_NAME: &str = "General Commit Notification List";

/// One-letter status code for the changed-files summary.
/// Unrecognized statuses fall back to `D` rather than failing.
pub fn status_letter(status: FileStatus) -> char {
    match status {
        FileStatus::Modified => 'M',
        FileStatus::Added => 'A',
        FileStatus::Removed | FileStatus::Other => 'D',
    }
}

/// Email subject, derived from the push payload before the full record is
/// fetched.
pub fn compose_subject(stub: &CommitStub) -> String {
    let author_name = stub.author.name.as_deref().unwrap_or("Unknown");
    format!("'{author_name}' via {LIST_NAME}")
}

fn changed_paths(record: &CommitRecord) -> String {
    record
        .files
        .iter()
        .map(|f| format!("  {} {}", status_letter(f.status), encode_text(&f.filename)))
        .collect::<Vec<_>>()
        .join("\n")
}

fn author_date(record: &CommitRecord) -> String {
    record
        .author_date
        .map(|d| d.to_rfc3339_opts(SecondsFormat::Secs, true))
        .unwrap_or_default()
}

/// Builds the full HTML notification body in the legacy SCM format: header
/// metadata, changed-files summary, commit message, rendered diff, footer.
/// All free-text fields are escaped; none of them is trusted.
pub fn compose_html(record: &CommitRecord, repo_url: &str, diff: &RenderedDiff) -> String {
    let repo_href = encode_double_quoted_attribute(repo_url);
    let repo_text = encode_text(repo_url);
    let commit_href = encode_double_quoted_attribute(&record.html_url);
    let commit_text = encode_text(&record.html_url);
    let branch = encode_text(&record.branch);
    let author_name = encode_text(&record.author_name);
    let author_email = encode_text(&record.author_email);
    let message = encode_text(&record.message);
    let date = author_date(record);
    let short_sha = record.short_sha();
    let paths = changed_paths(record);
    let diff_html = &diff.html;

    format!(
        r#"<html>
<head>
    <style>
        body {{ font-family: Arial, sans-serif; color: #24292e; }}
        .header {{ background-color: #f6f8fa; padding: 15px; border-left: 4px solid #0366d6; margin-bottom: 20px; }}
        .info-section {{ margin: 10px 0; }}
        .label {{ font-weight: bold; color: #586069; }}
        .commit-msg {{ font-style: italic; color: #24292e; padding: 10px; background-color: #f6f8fa; margin: 10px 0; }}
    </style>
</head>
<body>
    <div class="header">
        <h3 style="margin: 0; color: #0366d6;">New Commit Notification</h3>
    </div>

    <div class="info-section">
        <span class="label">Branch:</span> {branch}<br>
        <span class="label">Home:</span> <a href="{repo_href}">{repo_text}</a><br>
        <span class="label">Commit:</span> {short_sha}<br>
        <span style="margin-left: 20px;"><a href="{commit_href}">{commit_text}</a></span><br>
        <span class="label">Author:</span> {author_name} &lt;{author_email}&gt;<br>
        <span class="label">Date:</span> {date}
    </div>

    <div class="info-section">
        <span class="label">Changed paths:</span>
        <pre style="margin: 5px 0; padding: 10px; background-color: #f6f8fa;">{paths}</pre>
    </div>

    <div class="info-section">
        <span class="label">Log Message:</span>
        <div class="commit-msg">
        -----------<br>
        {message}
        </div>
    </div>

    <hr style="border: 1px solid #e1e4e8; margin: 20px 0;">

    <div class="info-section">
        <span class="label">Changes:</span>
        {diff_html}
    </div>

    <hr style="border: 1px solid #e1e4e8; margin: 20px 0;">

    <p style="font-size: 11px; color: #6a737d;">
        To unsubscribe from these emails, change your notification settings at
        <a href="{repo_href}/settings/notifications">{repo_text}/settings/notifications</a>
    </p>
</body>
</html>
"#
    )
}

/// Plain-text alternative carrying the same metadata and message, without
/// the diff.
pub fn compose_plain(record: &CommitRecord, repo_url: &str) -> String {
    let paths = record
        .files
        .iter()
        .map(|f| format!("  {} {}", status_letter(f.status), f.filename))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "New commit on branch {branch}\n\
         Home: {repo_url}\n\
         Commit: {short_sha}\n\
         {commit_url}\n\
         Author: {author_name} <{author_email}>\n\
         Date: {date}\n\
         \n\
         Changed paths:\n\
         {paths}\n\
         \n\
         {message}\n",
        branch = record.branch,
        short_sha = record.short_sha(),
        commit_url = record.html_url,
        author_name = record.author_name,
        author_email = record.author_email,
        date = author_date(record),
        message = record.message,
    )
}
