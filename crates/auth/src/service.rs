use thiserror::Error;
use tracing::info;

use crate::user::{User, UserRole};

/// Errors from the authentication service.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Invalid registration details")]
    InvalidDetails,
}

/// Process-local authentication state.
///
/// Stands in for a real identity provider: credentials are validated for
/// shape only, and the signed-in user is kept in memory so callers can
/// attribute edits to them.
#[derive(Debug, Clone, Default)]
pub struct AuthService {
    current: Option<User>,
}

impl AuthService {
    /// Create a service with nobody signed in.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sign in with an email and password.
    ///
    /// The display name is the local part of the email; accounts whose
    /// email contains "admin" get the admin role, everyone else is an
    /// editor.
    pub fn login(&mut self, email: &str, password: &str) -> Result<&User, AuthError> {
        if email.is_empty() || password.is_empty() {
            return Err(AuthError::InvalidCredentials);
        }

        let name = email.split('@').next().unwrap_or(email).to_string();
        let role = if email.contains("admin") {
            UserRole::Admin
        } else {
            UserRole::Editor
        };
        let user = User {
            id: "1".to_string(),
            email: email.to_string(),
            name,
            role,
        };

        info!(user = %user.name, "login successful");
        Ok(self.current.insert(user))
    }

    /// Register a new account and sign it in with the editor role.
    pub fn register(&mut self, email: &str, name: &str, password: &str) -> Result<&User, AuthError> {
        if email.is_empty() || name.is_empty() || password.is_empty() {
            return Err(AuthError::InvalidDetails);
        }

        let user = User {
            id: "1".to_string(),
            email: email.to_string(),
            name: name.to_string(),
            role: UserRole::Editor,
        };

        info!(user = %user.name, "registration successful");
        Ok(self.current.insert(user))
    }

    /// Sign the current user out.
    pub fn logout(&mut self) {
        if self.current.take().is_some() {
            info!("logged out");
        }
    }

    /// The signed-in user, if any.
    #[must_use]
    pub fn current_user(&self) -> Option<&User> {
        self.current.as_ref()
    }

    /// Whether anyone is signed in.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.current.is_some()
    }
}
