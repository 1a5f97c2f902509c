use std::fmt;

use serde::Deserialize;
use serde::Serialize;
use uuid::Uuid;

/// Subject (account) identifier carried in credential claims.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SubjectId(pub i64);

impl fmt::Display for SubjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Role carried in credential claims, used by callers for authorization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Customer,
    Staff,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Customer => "customer",
            Role::Staff => "staff",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unique opaque identifier embedded in a credential.
///
/// Generated fresh on every issuance, never reused. Doubles as the
/// credential's session-cache key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CredentialId(pub Uuid);

impl CredentialId {
    /// Generate a new random credential ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for CredentialId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for CredentialId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Claims embedded in an access credential.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AccessClaims {
    pub access_id: CredentialId,
    pub subject_id: SubjectId,
    pub role: Role,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

/// Claims embedded in a refresh credential.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RefreshClaims {
    pub refresh_id: CredentialId,
    pub subject_id: SubjectId,
    pub role: Role,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

/// Signed credential pair returned by issuance and rotation.
#[derive(Debug, Clone)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

/// Session-cache value stored under the access credential ID.
///
/// Records which refresh credential was co-issued with the access
/// credential; rotation compares against this to detect replay.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AccessEntry {
    pub subject_id: SubjectId,
    pub refresh_id: CredentialId,
}
