use serde::{Deserialize, Serialize};

/// Body of `POST /api/login`. Missing fields count as a mismatch.
#[derive(Debug, Default, Deserialize)]
pub struct LoginInput {
    #[serde(default)]
    pub username: Option<String>,

    #[serde(default)]
    pub password: Option<String>,
}

/// Identity returned on a successful login
#[derive(Debug, Serialize)]
pub struct LoginUser {
    pub username: String,
    pub role: String,
}

/// Response for a successful login
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub success: bool,
    pub message: String,
    pub token: String,
    pub user: LoginUser,
}
