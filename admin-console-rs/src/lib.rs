// admin-console-rs/src/lib.rs
//
// Client side of PhotoNotes admin authorization
//
// Primary features:
// - Admin status resolution from force-refreshed identity tokens
// - Admin session state with superseded-resolution discard
// - Typed privileged operations over the callable functions
// - Admin screen workflows (role changes, user management, first-admin setup)

pub mod callable;
pub mod console;
pub mod facade;
pub mod identity;
pub mod resolver;
pub mod session;

pub use callable::HttpCallableChannel;
pub use console::{AdminConsole, RoleChangeOutcome, PROPAGATION_NOTICE};
pub use facade::{CallableChannel, PrivilegedOperations};
pub use identity::{admin_claim_present, AuthUser, IdTokenResult, IdentityError, IdentityProvider};
pub use resolver::{check_is_admin, inspect_claims, ClaimInspection};
pub use session::{AdminSession, AdminSnapshot, Resolution, SessionStatus};
