// shared-types-rs/src/principal.rs
//
// Identity records as exposed by the privileged admin functions

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Custom claim key carrying the admin flag.
pub const ADMIN_CLAIM: &str = "admin";

/// Custom claims attached to a principal (keys unique).
pub type CustomClaims = Map<String, Value>;

/// Creation and sign-in timestamps for a principal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrincipalMetadata {
    pub creation_time: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_sign_in_time: Option<DateTime<Utc>>,
}

/// A user identity record held by the identity provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Principal {
    pub uid: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default)]
    pub email_verified: bool,
    #[serde(default)]
    pub disabled: bool,
    #[serde(default)]
    pub custom_claims: CustomClaims,
    pub metadata: PrincipalMetadata,
}

impl Principal {
    /// True only when the `admin` claim is the boolean `true`.
    pub fn is_admin(&self) -> bool {
        claims_grant_admin(&self.custom_claims)
    }

    /// Case-insensitive email comparison, the way the provider matches accounts.
    pub fn has_email(&self, email: &str) -> bool {
        self.email
            .as_deref()
            .map(|own| own.eq_ignore_ascii_case(email))
            .unwrap_or(false)
    }
}

/// Strict admin check over a claim map: anything other than `true` is not admin.
pub fn claims_grant_admin(claims: &CustomClaims) -> bool {
    matches!(claims.get(ADMIN_CLAIM), Some(Value::Bool(true)))
}
