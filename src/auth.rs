//! LMv1 request signing.
//!
//! The platform authenticates each request with an HMAC-SHA256 over
//! `verb + epoch + body + resource_path`, keyed by the access key. The hex
//! digest is base64 encoded and sent as
//! `Authorization: LMv1 <access_id>:<signature>:<epoch>`.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Compute the signature component of an LMv1 header.
///
/// `resource_path` is the path below `/santaba/rest`, without query string.
pub fn signature(
    access_key: &str,
    verb: &str,
    resource_path: &str,
    body: &str,
    epoch_ms: i64,
) -> String {
    let request_vars = format!("{verb}{epoch_ms}{body}{resource_path}");

    let mut mac = HmacSha256::new_from_slice(access_key.as_bytes())
        .unwrap_or_else(|_| unreachable!("HMAC accepts keys of any length"));
    mac.update(request_vars.as_bytes());
    let digest = hex::encode(mac.finalize().into_bytes());

    STANDARD.encode(digest.as_bytes())
}

/// Build the full `Authorization` header value.
pub fn authorization(
    access_id: &str,
    access_key: &str,
    verb: &str,
    resource_path: &str,
    body: &str,
    epoch_ms: i64,
) -> String {
    let sig = signature(access_key, verb, resource_path, body, epoch_ms);
    format!("LMv1 {access_id}:{sig}:{epoch_ms}")
}

/// Split an `LMv1 id:signature:epoch` header into its parts.
pub fn parse_authorization(header: &str) -> Option<(&str, &str, i64)> {
    let rest = header.strip_prefix("LMv1 ")?;
    let mut parts = rest.splitn(3, ':');
    let id = parts.next()?;
    let sig = parts.next()?;
    let epoch = parts.next()?.parse().ok()?;
    Some((id, sig, epoch))
}
