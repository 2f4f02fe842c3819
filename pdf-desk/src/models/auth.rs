use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Opaque bearer token issued by the backend at login.
#[derive(Debug)]
pub struct Credential(Secret<String>);

impl Credential {
    pub fn new(token: impl Into<String>) -> Self {
        Self(Secret::new(token.into()))
    }

    /// The raw token, for building the `Authorization` header only.
    pub fn expose(&self) -> &str {
        self.0.expose_secret()
    }

    pub fn is_empty(&self) -> bool {
        self.0.expose_secret().trim().is_empty()
    }
}

impl Clone for Credential {
    fn clone(&self) -> Self {
        Self::new(self.0.expose_secret().clone())
    }
}

impl PartialEq for Credential {
    fn eq(&self, other: &Self) -> bool {
        self.expose() == other.expose()
    }
}

/// Snapshot of the session as seen by views.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthStatus {
    pub is_authenticated: bool,
    /// True from start-up until the first validity check has finished.
    pub is_loading: bool,
}

impl Default for AuthStatus {
    fn default() -> Self {
        Self {
            is_authenticated: false,
            is_loading: true,
        }
    }
}

/// OAuth2 password form posted to the login endpoint.
#[derive(Debug, Serialize, Validate)]
pub struct LoginForm {
    #[validate(length(min = 1, message = "Username is required"))]
    pub username: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub token_type: Option<String>,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct TokenValidation {
    pub valid: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub expires_at: Option<String>,
    #[serde(default)]
    pub remaining_minutes: Option<f64>,
}
