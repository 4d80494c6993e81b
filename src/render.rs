//! Renders raw unified-diff text into styled HTML.

use html_escape::encode_text;

/// Maximum number of diff lines rendered before truncation
pub const DEFAULT_MAX_DIFF_LINES: usize = 500;

/// Rendered diff markup. Opaque to everything downstream except the
/// truncation flag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedDiff {
    pub html: String,
    pub truncated: bool,
}

/// Formats diff text into HTML with GitLab-style coloring.
///
/// Lines are classified by prefix, first match wins: `+++`/`---` file
/// headers, then `+` added, `-` removed, `@@` hunk headers, `diff --git`
/// separators, and everything else as context. Every line is HTML-escaped;
/// diff content is attacker-influenced.
pub fn render_diff(diff_text: &str, max_lines: usize) -> RenderedDiff {
    let mut html = String::from(
        "<pre style=\"font-family: monospace; font-size: 12px; \
         background-color: #f6f8fa; padding: 10px; overflow-x: auto;\">",
    );

    if diff_text.is_empty() {
        html.push_str("</pre>");
        return RenderedDiff {
            html,
            truncated: false,
        };
    }

    let total_lines = diff_text.split('\n').count();
    for line in diff_text.split('\n').take(max_lines) {
        let escaped = encode_text(line);
        html.push('\n');
        if line.starts_with("+++") || line.starts_with("---") {
            // File headers
            html.push_str(&format!(
                "<span style=\"font-weight: bold; color: #000;\">{escaped}</span>"
            ));
        } else if line.starts_with('+') {
            // Added lines
            html.push_str(&format!(
                "<span style=\"background-color: #d4edda; color: #155724; display: block;\">{escaped}</span>"
            ));
        } else if line.starts_with('-') {
            // Removed lines
            html.push_str(&format!(
                "<span style=\"background-color: #f8d7da; color: #721c24; display: block;\">{escaped}</span>"
            ));
        } else if line.starts_with("@@") {
            // Hunk headers
            html.push_str(&format!(
                "<span style=\"background-color: #e7f3ff; color: #0366d6; display: block;\">{escaped}</span>"
            ));
        } else if line.starts_with("diff --git") {
            // File separators
            html.push_str(&format!(
                "<span style=\"font-weight: bold; color: #6a737d; display: block; margin-top: 10px;\">{escaped}</span>"
            ));
        } else {
            // Context lines
            html.push_str(&format!(
                "<span style=\"color: #24292e;\">{escaped}</span>"
            ));
        }
    }

    let truncated = total_lines > max_lines;
    if truncated {
        html.push_str(&format!(
            "\n<span style=\"color: #6a737d; font-style: italic;\">\
             ... (diff truncated, showing first {max_lines} lines)</span>"
        ));
    }

    html.push_str("\n</pre>");
    RenderedDiff { html, truncated }
}
