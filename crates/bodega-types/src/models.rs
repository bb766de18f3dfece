use serde::{Deserialize, Serialize};

/// One account known to this device.
///
/// Owned by the local store; everything else works on transient copies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    /// Store-assigned primary key. `None` until the first insert, stable
    /// forever after.
    pub local_id: Option<i64>,
    /// The identity provider's id, once a registration or login has
    /// resolved it. `None` for accounts created purely offline.
    pub remote_id: Option<i64>,
    pub name: String,
    pub last_name: String,
    pub email: String,
    pub region: String,
    /// Opaque timestamp, copied verbatim from the provider or from the
    /// registration input.
    pub registered_at: String,
    /// Current-session marker. At most one record in the store carries it.
    pub active: bool,
    pub photo_uri: Option<String>,
}

impl UserRecord {
    /// A record carrying nothing but an email, for accounts first seen on
    /// this device during login.
    pub fn with_email(email: impl Into<String>) -> Self {
        Self {
            local_id: None,
            remote_id: None,
            name: String::new(),
            last_name: String::new(),
            email: email.into(),
            region: String::new(),
            registered_at: String::new(),
            active: false,
            photo_uri: None,
        }
    }
}

/// Registration form data as collected by the UI layer.
///
/// Field-level validation happens upstream; by the time this reaches the
/// sync service it is assumed well-formed.
#[derive(Debug, Clone)]
pub struct RegistrationInput {
    pub name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
    pub region: String,
    pub registered_at: String,
}
