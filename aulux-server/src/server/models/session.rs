use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::common::TokenPair;

/// Signed-in user, keyed by the value of the session cookie.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserSession {
    pub session_id: String,
    pub email: String,
    pub name: Option<String>,
    pub role: Role,
    pub tokens: TokenPair,
    pub created_at: DateTime<Utc>,
}

/// CSRF state handed out by `/auth/login`, consumed once by the callback.
#[derive(Debug, Clone)]
pub struct PendingLogin {
    pub state: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Coordinador,
    Profesor,
    Alumno,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Coordinador => "coordinador",
            Role::Profesor => "profesor",
            Role::Alumno => "alumno",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
