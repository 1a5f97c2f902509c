use std::fmt;

use chrono::DateTime;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;

use crate::domain::token::models::SubjectId;

/// Confirmation code row identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CodeId(pub i64);

impl fmt::Display for CodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Category of action a confirmation code authorizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Purpose {
    Registration,
    ResetPassword,
}

impl Purpose {
    pub fn as_str(&self) -> &'static str {
        match self {
            Purpose::Registration => "registration",
            Purpose::ResetPassword => "reset_password",
        }
    }

    /// Parse a purpose from its stored text form.
    pub fn from_string(s: &str) -> Option<Self> {
        match s {
            "registration" => Some(Purpose::Registration),
            "reset_password" => Some(Purpose::ResetPassword),
            _ => None,
        }
    }
}

impl fmt::Display for Purpose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Single-use confirmation code authorizing a pending action on a subject.
///
/// The code value is six ASCII digits stored as text: leading zeros are
/// significant. Rows are retained after use for audit, never deleted.
#[derive(Debug, Clone, PartialEq)]
pub struct Code {
    pub id: CodeId,
    pub code: String,
    pub subject_id: SubjectId,
    pub purpose: Purpose,
    /// Opaque payload carried to confirmation, e.g. a pre-hashed new
    /// password for the reset flow.
    pub payload: String,
    pub is_used: bool,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl Code {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at < now
    }
}

/// Command to persist a freshly generated confirmation code.
#[derive(Debug, Clone)]
pub struct NewCode {
    pub code: String,
    pub subject_id: SubjectId,
    pub purpose: Purpose,
    pub payload: String,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}
