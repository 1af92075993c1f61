use serde::{Deserialize, Serialize};

pub const USERS_BASE_PATH: &str = "/users";

/// A registered user record. `id` is an opaque unique string (v4 uuid),
/// `username` is unique and case-sensitive; only `full_name` is mutable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    pub id: String,
    pub username: String,
    pub full_name: String,
}

/// Registration request. The password is consumed by the credential store and
/// never echoed back in any response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewIdentity {
    pub username: String,
    pub full_name: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Wire shape the HTTP layer returns from a successful login.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    pub token: String,
}
