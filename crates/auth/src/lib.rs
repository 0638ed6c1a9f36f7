//! # gridbook-auth
//!
//! Identity types and a process-local authentication service.
//!
//! The worksheet core only consumes the current user for edit
//! attribution; role checks are left to callers.

mod service;
mod user;

/// Re-export the auth service and its error type.
pub use service::{AuthError, AuthService};
/// Re-export identity types.
pub use user::{User, UserRole};
