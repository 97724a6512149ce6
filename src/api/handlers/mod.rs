//! API handlers for Tessera.
//!
//! This module organizes the service's route handlers: authentication and
//! session management under `auth`, tenant and plan CRUD under `tenants`, plus
//! the health and root probes.

pub mod auth;
pub mod health;
pub mod root;
pub mod tenants;
