// For signature verification
use hmac::{Hmac, Mac};
use sha2::Sha256;
type HmacSha256 = Hmac<Sha256>;

/// Helper function for verifying GitHub webhook signatures.
///
/// When no secret is configured, verification is skipped and every payload
/// passes — operators must set a secret to get real protection. When a
/// secret is set, the header must carry `sha256=<hex(HMAC-SHA256(secret, payload))>`
/// and is checked with a constant-time comparison.
pub fn verify_github_signature(
    secret: Option<&str>,
    payload: &[u8],
    signature_header: Option<&str>,
) -> bool {
    let Some(secret) = secret else {
        return true;
    };
    let Some(signature_header) = signature_header else {
        return false;
    };

    // Expected format: "sha256=..."
    let Some(git_signature) = signature_header.strip_prefix("sha256=") else {
        return false;
    };
    let git_signature_bytes = match hex::decode(git_signature) {
        Ok(bytes) => bytes,
        Err(_) => return false,
    };

    let mut mac = match HmacSha256::new_from_slice(secret.as_bytes()) {
        Ok(mac) => mac,
        Err(_) => return false,
    };
    mac.update(payload);
    mac.verify_slice(&git_signature_bytes).is_ok()
}

/// Extracts the branch name from a push-event ref.
/// `"refs/heads/main"` becomes `"main"`; a ref without a slash is used as-is.
pub fn branch_from_ref(git_ref: &str) -> &str {
    git_ref.rsplit('/').next().unwrap_or(git_ref)
}
