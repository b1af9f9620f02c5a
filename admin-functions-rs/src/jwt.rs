// admin-functions-rs/src/jwt.rs
//
// Identity token implementation
// Provides:
// - Token issuance snapshotting a principal's custom claims
// - Validation of signature, issuer, audience and expiry
//
// A token never changes after issuance. Claim updates on the principal only
// show up in tokens issued afterwards.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use tracing::debug;
use zeroize::Zeroize;

use shared_types::{claims_grant_admin, CustomClaims, Principal};

/// Claim names the provider owns; custom claims may not shadow them.
const RESERVED_CLAIMS: [&str; 8] = [
    "sub",
    "iss",
    "aud",
    "iat",
    "exp",
    "auth_time",
    "email",
    "email_verified",
];

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TokenError {
    #[error("Token has expired")]
    Expired,

    #[error("Invalid token: {0}")]
    Invalid(String),

    #[error("The user account has been disabled ({0})")]
    PrincipalDisabled(String),

    #[error("Failed to sign token: {0}")]
    Signing(String),
}

/// Claims carried by an identity token
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IdentityClaims {
    pub sub: String,
    pub iss: String,
    pub aud: String,
    pub iat: u64,
    pub exp: u64,
    pub auth_time: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default)]
    pub email_verified: bool,
    /// Custom claims as they were when the token was issued
    #[serde(flatten)]
    pub custom_claims: CustomClaims,
}

impl IdentityClaims {
    /// Strict admin check: only a boolean `true` counts.
    pub fn is_admin(&self) -> bool {
        claims_grant_admin(&self.custom_claims)
    }
}

/// Issues and verifies HS256 identity tokens for one project.
pub struct IdentityTokenIssuer {
    secret: Vec<u8>,
    issuer: String,
    audience: String,
    ttl: Duration,
}

impl Drop for IdentityTokenIssuer {
    fn drop(&mut self) {
        self.secret.zeroize();
    }
}

impl IdentityTokenIssuer {
    pub fn new(secret: &str, project_id: &str, ttl: Duration) -> Self {
        Self {
            secret: secret.as_bytes().to_vec(),
            issuer: format!("https://securetoken.photonotes.dev/{}", project_id),
            audience: project_id.to_string(),
            ttl,
        }
    }

    pub fn issuer(&self) -> &str {
        &self.issuer
    }

    pub fn audience(&self) -> &str {
        &self.audience
    }

    /// Issue a token for the principal as it is right now.
    pub fn issue(&self, principal: &Principal) -> Result<(String, IdentityClaims), TokenError> {
        if principal.disabled {
            return Err(TokenError::PrincipalDisabled(principal.uid.clone()));
        }

        let now = current_timestamp();
        let auth_time = principal
            .metadata
            .last_sign_in_time
            .map(|t| t.timestamp().max(0) as u64)
            .unwrap_or(now);

        let custom_claims: CustomClaims = principal
            .custom_claims
            .iter()
            .filter(|(key, _)| !RESERVED_CLAIMS.contains(&key.as_str()))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();

        let claims = IdentityClaims {
            sub: principal.uid.clone(),
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
            iat: now,
            exp: now + self.ttl.as_secs(),
            auth_time,
            email: principal.email.clone(),
            email_verified: principal.email_verified,
            custom_claims,
        };

        let token = self.sign(&claims)?;
        debug!(uid = %claims.sub, admin = claims.is_admin(), "Issued identity token");
        Ok((token, claims))
    }

    /// Sign an arbitrary claim set with this issuer's key.
    pub fn sign(&self, claims: &IdentityClaims) -> Result<String, TokenError> {
        encode(
            &Header::new(Algorithm::HS256),
            claims,
            &EncodingKey::from_secret(&self.secret),
        )
        .map_err(|e| TokenError::Signing(e.to_string()))
    }

    /// Verify a bearer token and return its claims.
    pub fn verify(&self, token: &str) -> Result<IdentityClaims, TokenError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_audience(&[self.audience.as_str()]);
        validation.set_issuer(&[self.issuer.as_str()]);
        validation.leeway = 0;

        decode::<IdentityClaims>(token, &DecodingKey::from_secret(&self.secret), &validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::Invalid(e.to_string()),
            })
    }
}

// Helper function to get current Unix timestamp
pub(crate) fn current_timestamp() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or(Duration::from_secs(0))
        .as_secs()
}
