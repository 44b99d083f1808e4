//! `CEA` HMAC-SHA256 request signing for the partner gateway.
//!
//! The signed message is `signed-date + METHOD + path + query`, where
//! `signed-date` is UTC formatted as `yyMMddTHHmmssZ` and `query` is the raw
//! (already percent-encoded) query string without the leading `?`.

use chrono::{DateTime, Utc};
use giftrank_core::PartnerCredentials;
use hmac::{Hmac, Mac};
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use sha2::Sha256;

use crate::error::PartnerError;

type HmacSha256 = Hmac<Sha256>;

/// `encodeURIComponent` rules, except that `'` is escaped as well: the URL
/// parser re-encodes it in http query strings, and the gateway verifies the
/// signature against the query exactly as received.
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'(')
    .remove(b')');

#[must_use]
pub fn encode_component(value: &str) -> String {
    utf8_percent_encode(value, URI_COMPONENT).to_string()
}

#[must_use]
pub fn signed_date(at: DateTime<Utc>) -> String {
    at.format("%y%m%dT%H%M%SZ").to_string()
}

/// Builds the `Authorization` header value for one request.
///
/// # Errors
///
/// Returns [`PartnerError::Signing`] if the HMAC cannot be keyed.
pub fn authorization(
    credentials: &PartnerCredentials,
    method: &str,
    path: &str,
    query: &str,
    at: DateTime<Utc>,
) -> Result<String, PartnerError> {
    let datetime = signed_date(at);
    let message = format!("{datetime}{method}{path}{query}");

    let mut mac = HmacSha256::new_from_slice(credentials.secret_key.as_bytes())
        .map_err(|e| PartnerError::Signing(e.to_string()))?;
    mac.update(message.as_bytes());
    let signature = hex::encode(mac.finalize().into_bytes());

    Ok(format!(
        "CEA algorithm=HmacSHA256, access-key={}, signed-date={datetime}, signature={signature}",
        credentials.access_key
    ))
}
