use serde::{Deserialize, Serialize};

// -- Profiles --

/// The identity provider's view of an account. Wire-shaped and transient;
/// always translated into a `UserRecord` before anything is persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteProfile {
    pub id: i64,
    pub name: String,
    pub last_name: String,
    pub email: String,
    pub region: String,
    pub registered_at: String,
}

// -- Auth --

#[derive(Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RegisterRequest {
    pub name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
    pub region: String,
    pub registered_at: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Successful login body: an opaque bearer token plus, depending on the
/// provider version, a thin copy of the profile.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginSession {
    pub token: String,
    #[serde(default)]
    pub profile: Option<RemoteProfile>,
}
