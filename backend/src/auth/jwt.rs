//! JWT issuance and verification
//!
//! Access and refresh tokens are HS256-signed, carry identity claims
//! (subject, role, email) and a token kind, and are verified with
//! pre-computed keys cached in `AppState`.

use anyhow::Result;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use smart_school_shared::roles::Role;
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

use crate::error::ApiError;

/// Which of the two token flavors a credential is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Access,
    Refresh,
}

/// JWT claims
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (principal ID)
    pub sub: String,
    /// Role of the principal at issuance time
    pub role: Role,
    /// Email of the principal at issuance time
    pub email: String,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Access or refresh
    pub kind: TokenKind,
}

impl Claims {
    /// Parse the subject back into a principal id
    pub fn principal_id(&self) -> Result<Uuid, uuid::Error> {
        Uuid::parse_str(&self.sub)
    }
}

/// Verification failure, kept to exactly two cases so callers can surface
/// distinguishable 401 messages without leaking signature internals
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TokenError {
    #[error("token expired")]
    Expired,
    #[error("token invalid")]
    Invalid,
}

impl From<TokenError> for ApiError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Expired => ApiError::TokenExpired,
            TokenError::Invalid => ApiError::InvalidToken,
        }
    }
}

/// Pre-computed signing/verification keys for one secret
///
/// Key derivation is not free, so keys are built once at startup and shared
/// via Arc.
#[derive(Clone)]
pub struct JwtKeys {
    encoding: Arc<EncodingKey>,
    decoding: Arc<DecodingKey>,
}

impl JwtKeys {
    pub fn new(secret: &str) -> Self {
        Self {
            encoding: Arc::new(EncodingKey::from_secret(secret.as_bytes())),
            decoding: Arc::new(DecodingKey::from_secret(secret.as_bytes())),
        }
    }
}

/// JWT service: issues and verifies both token kinds
///
/// Refresh tokens use their own keys when a refresh secret is configured,
/// otherwise they share the access keys. Create once at startup and store
/// in `AppState`; cloning is cheap.
#[derive(Clone)]
pub struct JwtService {
    access_keys: JwtKeys,
    refresh_keys: JwtKeys,
    access_expiry_secs: i64,
    refresh_expiry_secs: i64,
}

impl JwtService {
    pub fn new(
        secret: &str,
        refresh_secret: Option<&str>,
        access_expiry_secs: i64,
        refresh_expiry_secs: i64,
    ) -> Self {
        let access_keys = JwtKeys::new(secret);
        let refresh_keys = match refresh_secret {
            Some(s) => JwtKeys::new(s),
            None => access_keys.clone(),
        };
        Self {
            access_keys,
            refresh_keys,
            access_expiry_secs,
            refresh_expiry_secs,
        }
    }

    /// Issue an access token for a principal
    pub fn issue_access_token(&self, id: Uuid, role: Role, email: &str) -> Result<String> {
        self.issue(&self.access_keys, TokenKind::Access, self.access_expiry_secs, id, role, email)
    }

    /// Issue a refresh token for a principal
    pub fn issue_refresh_token(&self, id: Uuid, role: Role, email: &str) -> Result<String> {
        self.issue(
            &self.refresh_keys,
            TokenKind::Refresh,
            self.refresh_expiry_secs,
            id,
            role,
            email,
        )
    }

    fn issue(
        &self,
        keys: &JwtKeys,
        kind: TokenKind,
        expiry_secs: i64,
        id: Uuid,
        role: Role,
        email: &str,
    ) -> Result<String> {
        // Fresh iat on every call; two tokens for the same principal are
        // never byte-identical across seconds.
        let now = Utc::now();
        let claims = Claims {
            sub: id.to_string(),
            role,
            email: email.to_string(),
            iat: now.timestamp(),
            exp: (now + Duration::seconds(expiry_secs)).timestamp(),
            kind,
        };

        encode(&Header::default(), &claims, &keys.encoding)
            .map_err(|e| anyhow::anyhow!("Failed to sign {:?} token: {}", kind, e))
    }

    /// Verify an access token and return its claims
    pub fn verify_access_token(&self, token: &str) -> Result<Claims, TokenError> {
        self.verify(&self.access_keys, TokenKind::Access, token)
    }

    /// Verify a refresh token and return its claims
    pub fn verify_refresh_token(&self, token: &str) -> Result<Claims, TokenError> {
        self.verify(&self.refresh_keys, TokenKind::Refresh, token)
    }

    fn verify(&self, keys: &JwtKeys, kind: TokenKind, token: &str) -> Result<Claims, TokenError> {
        // HS256 only; a token claiming any other algorithm is invalid even
        // if it was signed with our secret. Expiry is exact, no leeway.
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        let data = decode::<Claims>(token, &keys.decoding, &validation).map_err(|e| {
            match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::Invalid,
            }
        })?;

        if data.claims.kind != kind {
            return Err(TokenError::Invalid);
        }

        Ok(data.claims)
    }

    /// Access token lifetime in seconds, surfaced as `expires_in`
    pub fn access_token_expiry_secs(&self) -> i64 {
        self.access_expiry_secs
    }
}
