use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use crate::auth::jwks::JwksCache;
use crate::config::AuthConfig;
use crate::models::users::Roles;

/// Claims issued by the identity provider.
///
/// `sub` is the user's UUID; `user_metadata.user_type` carries the role tag
/// chosen at sign-up.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    /// Token expiration (Unix timestamp).
    pub exp: usize,
    pub iat: Option<usize>,
    pub iss: Option<String>,
    pub email: Option<String>,
    /// Provider role (e.g. "authenticated"), not the school role.
    pub role: Option<String>,
    pub user_metadata: Option<UserMetadata>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct UserMetadata {
    pub full_name: Option<String>,
    pub name: Option<String>,
    pub email: Option<String>,
    /// `student` or `teacher`.
    pub user_type: Option<String>,
}

impl Claims {
    /// Extract the user UUID from the `sub` claim.
    pub fn user_id(&self) -> Result<Uuid, String> {
        Uuid::parse_str(&self.sub).map_err(|e| format!("Invalid UUID in sub claim: {e}"))
    }

    /// Best-effort display name from metadata.
    pub fn display_name(&self) -> Option<String> {
        self.user_metadata
            .as_ref()
            .and_then(|m| m.full_name.clone().or_else(|| m.name.clone()))
    }

    /// Best-effort email: prefer top-level, fall back to metadata.
    pub fn user_email(&self) -> Option<String> {
        self.email
            .clone()
            .or_else(|| self.user_metadata.as_ref().and_then(|m| m.email.clone()))
    }

    /// School role from metadata; unknown or missing tags mean student.
    pub fn school_role(&self) -> Roles {
        self.user_metadata
            .as_ref()
            .and_then(|m| m.user_type.as_deref())
            .and_then(Roles::from_tag)
            .unwrap_or(Roles::Student)
    }
}

/// Checks bearer tokens, either against the provider's published keys or
/// a shared HS256 secret.
#[derive(Clone)]
pub enum TokenValidator {
    Jwks(Arc<JwksCache>),
    SharedSecret(String),
}

impl TokenValidator {
    pub fn from_config(auth: &AuthConfig) -> Self {
        match auth {
            AuthConfig::Jwks { url, api_key } => {
                TokenValidator::Jwks(Arc::new(JwksCache::new(url, api_key.as_deref())))
            }
            AuthConfig::SharedSecret(secret) => TokenValidator::SharedSecret(secret.clone()),
        }
    }

    pub async fn validate_token(&self, token: &str) -> Result<Claims, String> {
        match self {
            TokenValidator::Jwks(jwks) => jwks.validate_token(token).await.map(|td| td.claims),
            TokenValidator::SharedSecret(secret) => validate_hs256(token, secret),
        }
    }
}

/// Validate an HS256 token signed with `secret` and return its claims.
pub fn validate_hs256(token: &str, secret: &str) -> Result<Claims, String> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_aud = false;

    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map(|td| td.claims)
    .map_err(|e| format!("{:?}", e.kind()))
}
