//! Local decoding of JWT-shaped bearer tokens.
//!
//! Tokens are issued by the external API. Only the payload segment is read;
//! the signature is never verified, so every claim here is untrusted input.
//! Decoding never fails loudly: anything that does not look like
//! `header.payload.signature` with a JSON object payload decodes to `None`
//! and counts as expired.

use base64::Engine;
use base64::engine::general_purpose::{STANDARD_NO_PAD, URL_SAFE_NO_PAD};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Claims carried in the token payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Expiration time in seconds since the Unix epoch. NumericDate allows
    /// fractions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exp: Option<f64>,
    /// Every other claim, untouched
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl TokenClaims {
    /// Expiry in Unix milliseconds, floored and saturated to `i64`
    // `as` saturates out-of-range floats
    #[allow(clippy::cast_possible_truncation)]
    pub fn expires_at_millis(&self) -> Option<i64> {
        self.exp
            .filter(|exp| exp.is_finite())
            .map(|exp| (exp * 1000.0).floor() as i64)
    }

    /// Expiry as a timestamp, clamped to the representable range
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.expires_at_millis().map(millis_to_datetime)
    }

    /// Subject claim, when the issuer sets one
    pub fn subject(&self) -> Option<&str> {
        self.extra.get("sub").and_then(Value::as_str)
    }
}

/// Timestamp for `millis`, saturating at chrono's bounds
pub(crate) fn millis_to_datetime(millis: i64) -> DateTime<Utc> {
    DateTime::from_timestamp_millis(millis).unwrap_or(if millis < 0 {
        DateTime::<Utc>::MIN_UTC
    } else {
        DateTime::<Utc>::MAX_UTC
    })
}

/// Decode the payload segment of `token`.
pub fn decode_token(token: &str) -> Option<TokenClaims> {
    let mut segments = token.split('.');
    let (Some(_header), Some(payload), Some(_signature), None) = (
        segments.next(),
        segments.next(),
        segments.next(),
        segments.next(),
    ) else {
        return None;
    };

    let bytes = decode_segment(payload)?;
    match serde_json::from_slice::<Value>(&bytes).ok()? {
        Value::Object(map) => serde_json::from_value(Value::Object(map)).ok(),
        _ => None,
    }
}

fn decode_segment(segment: &str) -> Option<Vec<u8>> {
    let trimmed = segment.trim_end_matches('=');
    if trimmed.is_empty() {
        return None;
    }
    URL_SAFE_NO_PAD
        .decode(trimmed)
        .or_else(|_| STANDARD_NO_PAD.decode(trimmed))
        .ok()
}

/// Expiry of `token`, or `None` when it is malformed or carries no `exp`
pub fn token_expiry(token: &str) -> Option<DateTime<Utc>> {
    decode_token(token).and_then(|claims| claims.expires_at())
}

/// Whether `token` must be treated as expired at `now`.
///
/// Malformed tokens and tokens without an `exp` claim are expired. The
/// comparison is done in milliseconds: a token is expired once
/// `floor(exp * 1000) < now`.
pub fn is_token_expired(token: &str, now: DateTime<Utc>) -> bool {
    decode_token(token)
        .and_then(|claims| claims.expires_at_millis())
        .is_none_or(|expires_ms| expires_ms < now.timestamp_millis())
}
