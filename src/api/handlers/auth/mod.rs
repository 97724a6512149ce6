//! Authentication: credentials, access tokens, and refresh-token rotation.
//!
//! ## Token model
//!
//! - **Access tokens** are short-lived HS256 JWTs carrying `sub`/`email`,
//!   verifiable without a store lookup.
//! - **Refresh tokens** are opaque `"<rowId>.<hexSecret>"` values backed by
//!   hashed rows; consuming one revokes it and mints a replacement in the
//!   same operation (strict single-use rotation).
//!
//! All 401 responses are deliberately uninformative to prevent account
//! enumeration; only the middleware distinguishes header-shape problems.

pub(crate) mod login;
pub(crate) mod me;
mod password;
pub(crate) mod principal;
mod refresh;
pub(crate) mod service;
pub(crate) mod session;
pub(crate) mod signup;
mod state;
mod storage;
mod token;
pub(crate) mod types;
mod utils;

pub use service::AuthService;
pub use state::{AuthConfig, AuthState};

pub(crate) use storage::{CredentialStore, PgCredentialStore};

#[cfg(test)]
mod tests;
