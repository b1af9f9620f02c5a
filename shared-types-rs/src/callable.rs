// shared-types-rs/src/callable.rs
//
// Wire contract for the privileged callable functions
// Provides:
// - Operation names
// - Structured failure kinds shared by server and console
// - Request/result payloads and the JSON call envelope

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::principal::Principal;

pub const ADD_ADMIN_ROLE: &str = "addAdminRole";
pub const REMOVE_ADMIN_ROLE: &str = "removeAdminRole";
pub const LIST_ALL_USERS: &str = "listAllUsers";
pub const GET_USER_BY_EMAIL: &str = "getUserByEmail";
pub const SET_USER_DISABLED: &str = "setUserDisabled";

/// All callable operation names, in declaration order.
pub const OPERATIONS: [&str; 5] = [
    ADD_ADMIN_ROLE,
    REMOVE_ADMIN_ROLE,
    LIST_ALL_USERS,
    GET_USER_BY_EMAIL,
    SET_USER_DISABLED,
];

/// Page size used by `listAllUsers` when the caller does not ask for one.
pub const DEFAULT_MAX_RESULTS: usize = 1000;

/// Failure categories for privileged calls
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ErrorKind {
    /// Caller's token does not carry `admin == true`
    PermissionDenied,
    /// Missing or malformed request field
    InvalidArgument,
    /// Target principal absent
    NotFound,
    /// Unexpected provider error
    Internal,
    /// Bearer token presented but rejected
    Unauthenticated,
    /// Remote call channel not ready (client-side only)
    #[serde(rename = "failed-precondition")]
    Uninitialized,
}

impl ErrorKind {
    /// Lowercase status used in messages and logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::PermissionDenied => "permission-denied",
            ErrorKind::InvalidArgument => "invalid-argument",
            ErrorKind::NotFound => "not-found",
            ErrorKind::Internal => "internal",
            ErrorKind::Unauthenticated => "unauthenticated",
            ErrorKind::Uninitialized => "failed-precondition",
        }
    }

    /// Canonical upper-case status carried in the HTTP error envelope.
    pub fn wire_status(&self) -> &'static str {
        match self {
            ErrorKind::PermissionDenied => "PERMISSION_DENIED",
            ErrorKind::InvalidArgument => "INVALID_ARGUMENT",
            ErrorKind::NotFound => "NOT_FOUND",
            ErrorKind::Internal => "INTERNAL",
            ErrorKind::Unauthenticated => "UNAUTHENTICATED",
            ErrorKind::Uninitialized => "FAILED_PRECONDITION",
        }
    }

    /// Parse the envelope status; unknown values collapse to `Internal`.
    pub fn from_wire_status(status: &str) -> Self {
        match status {
            "PERMISSION_DENIED" => ErrorKind::PermissionDenied,
            "INVALID_ARGUMENT" => ErrorKind::InvalidArgument,
            "NOT_FOUND" => ErrorKind::NotFound,
            "UNAUTHENTICATED" => ErrorKind::Unauthenticated,
            "FAILED_PRECONDITION" => ErrorKind::Uninitialized,
            _ => ErrorKind::Internal,
        }
    }

    /// HTTP status code for the envelope.
    pub fn http_status(&self) -> u16 {
        match self {
            ErrorKind::PermissionDenied => 403,
            ErrorKind::InvalidArgument => 400,
            ErrorKind::NotFound => 404,
            ErrorKind::Internal => 500,
            ErrorKind::Unauthenticated => 401,
            ErrorKind::Uninitialized => 400,
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Structured failure of a privileged call (kind + message).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct CallableError {
    pub kind: ErrorKind,
    pub message: String,
}

impl CallableError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn permission_denied(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::PermissionDenied, message)
    }

    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidArgument, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotFound, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Internal, message)
    }

    pub fn unauthenticated(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Unauthenticated, message)
    }

    pub fn uninitialized(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Uninitialized, message)
    }
}

/// Payload for `addAdminRole`, `removeAdminRole` and `getUserByEmail`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailRequest {
    pub email: String,
}

/// Payload for `listAllUsers`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListUsersRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_results: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_token: Option<String>,
}

/// Payload for `setUserDisabled`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetDisabledRequest {
    pub uid: String,
    pub disabled: bool,
}

/// Result of grant/revoke/disable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdminRoleResult {
    pub message: String,
    pub uid: String,
}

/// One page of principals plus the continuation cursor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListUsersResult {
    pub users: Vec<Principal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_token: Option<String>,
}

/// Request body of a callable invocation: `{"data": ...}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CallRequest {
    #[serde(default)]
    pub data: Value,
}

/// Error body carried by a failed invocation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WireError {
    pub status: String,
    pub message: String,
}

/// Response body of a callable invocation: `{"result": ...}` or `{"error": {...}}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CallResponse {
    Result { result: Value },
    Error { error: WireError },
}

impl CallResponse {
    pub fn from_outcome(outcome: Result<Value, CallableError>) -> Self {
        match outcome {
            Ok(result) => CallResponse::Result { result },
            Err(err) => CallResponse::Error {
                error: WireError {
                    status: err.kind.wire_status().to_string(),
                    message: err.message,
                },
            },
        }
    }

    pub fn into_outcome(self) -> Result<Value, CallableError> {
        match self {
            CallResponse::Result { result } => Ok(result),
            CallResponse::Error { error } => Err(CallableError::new(
                ErrorKind::from_wire_status(&error.status),
                error.message,
            )),
        }
    }
}
