//! Authenticated user and session.

use serde::{Deserialize, Serialize};

/// User profile as returned by the auth endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}

/// Current user plus bearer token.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub user: User,
    pub token: Option<String>,
}

/// Successful login/register response body.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthResponse {
    pub user: User,
    #[serde(default)]
    pub token: Option<String>,
}
