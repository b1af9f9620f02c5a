pub mod callable;
pub mod config;
pub mod logging;
pub mod principal;

pub use callable::{
    AdminRoleResult, CallRequest, CallResponse, CallableError, EmailRequest, ErrorKind,
    ListUsersRequest, ListUsersResult, SetDisabledRequest, DEFAULT_MAX_RESULTS,
};
pub use config::{ConfigError, PhotoNotesConfig};
pub use logging::init_logging;
pub use principal::{claims_grant_admin, CustomClaims, Principal, PrincipalMetadata, ADMIN_CLAIM};
