//! SDK-HMAC-SHA256 request signing for the billing API.
//!
//! Implements the API-gateway signing scheme: the request is reduced to a
//! canonical string, hashed into a string-to-sign, and HMAC-SHA256'd with
//! the secret key. The resulting `Authorization` header carries the access
//! key, the list of signed headers, and the hex signature.
//!
//! This module lives in `core` (zero internal deps) so it can be used by
//! the agent and any future CLI tooling.

use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256};

/// Signing algorithm identifier, also the `Authorization` scheme name.
pub const ALGORITHM: &str = "SDK-HMAC-SHA256";

/// Header carrying the signing timestamp.
pub const DATE_HEADER: &str = "X-Sdk-Date";

/// Timestamp format used by the scheme (UTC, e.g. `20250826T120000Z`).
pub const DATE_FORMAT: &str = "%Y%m%dT%H%M%SZ";

type HmacSha256 = Hmac<Sha256>;

/// Access/secret key pair for the billing API.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub access_key: String,
    pub secret_key: String,
}

/// A request about to be signed.
///
/// Headers are raw `(name, value)` pairs; the signer lowercases, trims,
/// and sorts them itself. The `X-Sdk-Date` header is added by the signer
/// and must not be supplied by the caller.
#[derive(Debug, Clone)]
pub struct SigningRequest<'a> {
    pub method: &'a str,
    /// URL path, e.g. `/v2/payments/free-resources/usages/details/query`.
    pub path: &'a str,
    /// Query parameters as unencoded key/value pairs.
    pub query: &'a [(String, String)],
    pub headers: &'a [(String, String)],
    pub body: &'a [u8],
}

/// Headers to attach to the outgoing request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signature {
    /// Value for the `Authorization` header.
    pub authorization: String,
    /// Value for the `X-Sdk-Date` header; it participates in the signature.
    pub sdk_date: String,
}

/// Sign a request at the given instant.
pub fn sign(
    request: &SigningRequest<'_>,
    credentials: &Credentials,
    signed_at: DateTime<Utc>,
) -> Signature {
    let sdk_date = signed_at.format(DATE_FORMAT).to_string();

    let mut headers: Vec<(String, String)> = request
        .headers
        .iter()
        .map(|(name, value)| (name.to_ascii_lowercase(), value.trim().to_string()))
        .collect();
    headers.push((DATE_HEADER.to_ascii_lowercase(), sdk_date.clone()));
    headers.sort();

    let signed_headers = headers
        .iter()
        .map(|(name, _)| name.as_str())
        .collect::<Vec<_>>()
        .join(";");

    let canonical = canonical_request(request, &headers, &signed_headers);
    let string_to_sign = format!("{ALGORITHM}\n{sdk_date}\n{}", sha256_hex(canonical.as_bytes()));
    let signature = hmac_sha256_hex(credentials.secret_key.as_bytes(), string_to_sign.as_bytes());

    Signature {
        authorization: format!(
            "{ALGORITHM} Access={}, SignedHeaders={}, Signature={}",
            credentials.access_key, signed_headers, signature
        ),
        sdk_date,
    }
}

/// Build the canonical request string: method, canonical URI (with a
/// trailing slash), canonical query, canonical headers, signed-header
/// list, and the hex digest of the body.
fn canonical_request(
    request: &SigningRequest<'_>,
    headers: &[(String, String)],
    signed_headers: &str,
) -> String {
    let mut path = request.path.to_string();
    if !path.ends_with('/') {
        path.push('/');
    }

    let canonical_headers: String = headers
        .iter()
        .map(|(name, value)| format!("{name}:{value}\n"))
        .collect();

    format!(
        "{}\n{}\n{}\n{}\n{}\n{}",
        request.method.to_ascii_uppercase(),
        path,
        canonical_query(request.query),
        canonical_headers,
        signed_headers,
        sha256_hex(request.body),
    )
}

/// Percent-encode and sort the query parameters.
fn canonical_query(query: &[(String, String)]) -> String {
    let mut pairs: Vec<(String, String)> = query
        .iter()
        .map(|(key, value)| (percent_encode(key), percent_encode(value)))
        .collect();
    pairs.sort();
    pairs
        .iter()
        .map(|(key, value)| format!("{key}={value}"))
        .collect::<Vec<_>>()
        .join("&")
}

/// RFC 3986 percent-encoding with `-._~` unreserved.
fn percent_encode(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for byte in value.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'.' | b'_' | b'~' => {
                out.push(byte as char)
            }
            _ => out.push_str(&format!("%{byte:02X}")),
        }
    }
    out
}

/// Compute a SHA-256 hex digest of the given bytes.
pub fn sha256_hex(data: &[u8]) -> String {
    let hash = Sha256::digest(data);
    format!("{hash:x}")
}

fn hmac_sha256_hex(key: &[u8], data: &[u8]) -> String {
    let mut mac = HmacSha256::new_from_slice(key).expect("HMAC accepts any key length");
    mac.update(data);
    hex::encode(mac.finalize().into_bytes())
}

// ---------------------------------------------------------------------------
// hex encoding helper (no extra dep)
// ---------------------------------------------------------------------------

mod hex {
    /// Encode bytes as a lowercase hex string.
    pub fn encode(bytes: impl AsRef<[u8]>) -> String {
        bytes.as_ref().iter().map(|b| format!("{b:02x}")).collect()
    }
}
