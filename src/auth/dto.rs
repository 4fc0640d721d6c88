use serde::{Deserialize, Serialize};

use crate::users::PublicUser;

/// Request body for signup. Fields are optional so a missing one is a
/// validation error rather than a body rejection.
#[derive(Debug, Default, Deserialize)]
pub struct SignupRequest {
    #[serde(default, alias = "full_name", alias = "username")]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

/// Request body for login.
#[derive(Debug, Default, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SignupResponse {
    pub id: u64,
    pub message: String,
}

/// Response returned after login.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: PublicUser,
}

#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub user: PublicUser,
}
