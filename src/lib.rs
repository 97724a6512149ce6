//! # Tessera (Membership & Subscription API)
//!
//! `tessera` is a multi-tenant membership backend: it authenticates users and
//! manages tenant and subscription-plan records over an HTTP JSON API.
//!
//! ## Authentication
//!
//! Credentials are verified against bcrypt hashes. A successful login returns
//! a short-lived HS256 access token plus an opaque, store-backed refresh
//! token in the form `"<rowId>.<hexSecret>"`. Only a bcrypt hash of the
//! secret is persisted, so a database compromise does not expose usable
//! refresh tokens.
//!
//! ## Refresh-token rotation
//!
//! Refresh tokens are strictly single-use: consuming one revokes the stored
//! row and issues a replacement in the same operation. Concurrent consumers
//! of the same token are serialized by a conditional update, so at most one
//! of them rotates it. Revoked and expired rows are kept as an audit trail.
//!
//! ## Tenants and plans
//!
//! Tenants are identified by a unique, lowercased slug. Each tenant owns
//! subscription plans, unique by name within the tenant. All tenant routes
//! require a bearer access token.

pub mod api;
pub mod cli;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};

pub const APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"),);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_git_commit_hash_format() {
        if GIT_COMMIT_HASH == "unknown" {
            // Acceptable in non-git build environments
            return;
        }
        assert!(
            GIT_COMMIT_HASH.chars().all(|c| c.is_ascii_hexdigit()),
            "GIT_COMMIT_HASH should be a hex string, got: {GIT_COMMIT_HASH}"
        );
        assert!(GIT_COMMIT_HASH.len() >= 7);
    }

    #[test]
    fn test_app_user_agent_format() {
        assert!(APP_USER_AGENT.starts_with(env!("CARGO_PKG_NAME")));
        assert!(APP_USER_AGENT.contains(env!("CARGO_PKG_VERSION")));
    }
}
