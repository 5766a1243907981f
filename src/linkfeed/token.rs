//! Stateless identity tokens.
//!
//! Tokens are compact JWS strings (`header.claims.signature`, base64url without
//! padding) signed with `HS256`. The claims carry the user id and an absolute
//! expiry; nothing is stored server-side.

use base64ct::{Base64UrlUnpadded, Encoding};
use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use std::time::SystemTime;
use thiserror::Error;
use uuid::Uuid;

type HmacSha256 = Hmac<Sha256>;

pub const DEFAULT_TOKEN_TTL_SECONDS: u64 = 7 * 24 * 60 * 60;
const MIN_KEY_BYTES: usize = 32;
const ALG: &str = "HS256";
const TYP: &str = "JWT";

// Values that have shipped as "defaults" in sample configs.
const PLACEHOLDER_KEYS: &[&str] = &["fallback-secret", "secret", "changeme", "change-me"];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TokenError {
    #[error("token is malformed")]
    Malformed,
    #[error("token signature is invalid")]
    Invalid,
    #[error("token expired")]
    Expired,
    #[error("signing key is missing, too short or a known placeholder")]
    WeakKey,
    #[error("token ttl must be between 1 second and i64::MAX")]
    InvalidTtl,
    #[error("failed to encode token: {0}")]
    Encode(String),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
struct TokenHeader {
    alg: String,
    typ: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TokenClaims {
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
}

/// Issues and verifies tokens with a process-wide signing key.
pub struct TokenService {
    key: SecretString,
    ttl_seconds: i64,
}

impl std::fmt::Debug for TokenService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenService")
            .field("key", &"***")
            .field("ttl_seconds", &self.ttl_seconds)
            .finish()
    }
}

impl TokenService {
    /// Build the service from an explicit signing key and validity window.
    ///
    /// # Errors
    /// Returns `WeakKey` if the key is shorter than 32 bytes or a known
    /// placeholder, `InvalidTtl` for a zero or out of range ttl.
    pub fn new(key: SecretString, ttl_seconds: u64) -> Result<Self, TokenError> {
        let raw = key.expose_secret();
        if raw.len() < MIN_KEY_BYTES || PLACEHOLDER_KEYS.contains(&raw) {
            return Err(TokenError::WeakKey);
        }

        let ttl_seconds = i64::try_from(ttl_seconds).map_err(|_| TokenError::InvalidTtl)?;
        if ttl_seconds <= 0 {
            return Err(TokenError::InvalidTtl);
        }

        Ok(Self { key, ttl_seconds })
    }

    #[must_use]
    pub const fn ttl_seconds(&self) -> i64 {
        self.ttl_seconds
    }

    /// Issue a token for `user_id` expiring `ttl` from now.
    ///
    /// # Errors
    /// Returns `Encode` if the header or claims cannot be serialized.
    pub fn issue(&self, user_id: Uuid) -> Result<String, TokenError> {
        self.issue_at(user_id, now_unix_seconds())
    }

    /// Issue a token as if the current time were `now` (unix seconds).
    ///
    /// # Errors
    /// Returns `Encode` if the header or claims cannot be serialized.
    pub fn issue_at(&self, user_id: Uuid, now: i64) -> Result<String, TokenError> {
        let header = TokenHeader {
            alg: ALG.to_string(),
            typ: TYP.to_string(),
        };
        let claims = TokenClaims {
            sub: user_id.to_string(),
            iat: now,
            exp: now.saturating_add(self.ttl_seconds),
        };

        let signing_input = format!("{}.{}", b64e_json(&header)?, b64e_json(&claims)?);

        let mut mac = self.mac()?;
        mac.update(signing_input.as_bytes());
        let signature = mac.finalize().into_bytes();

        Ok(format!(
            "{signing_input}.{}",
            Base64UrlUnpadded::encode_string(&signature)
        ))
    }

    /// Verify a token and return the embedded user id.
    ///
    /// # Errors
    /// `Malformed` if it cannot be parsed, `Invalid` if the signature does not
    /// match, `Expired` if its expiry has elapsed.
    pub fn verify(&self, token: &str) -> Result<Uuid, TokenError> {
        self.verify_at(token, now_unix_seconds())
    }

    /// Verify a token against the given current time (unix seconds).
    ///
    /// # Errors
    /// Same as [`TokenService::verify`].
    pub fn verify_at(&self, token: &str, now: i64) -> Result<Uuid, TokenError> {
        let mut parts = token.split('.');
        let (Some(header_b64), Some(claims_b64), Some(signature_b64), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(TokenError::Malformed);
        };

        let header: TokenHeader = b64d_json(header_b64)?;
        if header.alg != ALG {
            return Err(TokenError::Invalid);
        }

        let signature =
            Base64UrlUnpadded::decode_vec(signature_b64).map_err(|_| TokenError::Malformed)?;

        let mut mac = self.mac()?;
        mac.update(header_b64.as_bytes());
        mac.update(b".");
        mac.update(claims_b64.as_bytes());
        mac.verify_slice(&signature)
            .map_err(|_| TokenError::Invalid)?;

        let claims: TokenClaims = b64d_json(claims_b64)?;
        if now > claims.exp {
            return Err(TokenError::Expired);
        }

        Uuid::parse_str(&claims.sub).map_err(|_| TokenError::Malformed)
    }

    fn mac(&self) -> Result<HmacSha256, TokenError> {
        HmacSha256::new_from_slice(self.key.expose_secret().as_bytes())
            .map_err(|_| TokenError::WeakKey)
    }
}

fn b64e_json<T: Serialize>(value: &T) -> Result<String, TokenError> {
    let json = serde_json::to_vec(value).map_err(|e| TokenError::Encode(e.to_string()))?;
    Ok(Base64UrlUnpadded::encode_string(&json))
}

fn b64d_json<T: for<'de> Deserialize<'de>>(s: &str) -> Result<T, TokenError> {
    let bytes = Base64UrlUnpadded::decode_vec(s).map_err(|_| TokenError::Malformed)?;
    serde_json::from_slice(&bytes).map_err(|_| TokenError::Malformed)
}

pub(crate) fn now_unix_seconds() -> i64 {
    SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .map(|d| i64::try_from(d.as_secs()).unwrap_or(i64::MAX))
        .unwrap_or(0)
}
