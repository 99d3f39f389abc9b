//! Principal references bound to tokens.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Kind of identity a token is issued for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrincipalKind {
    Organization,
    AdminUser,
    Application,
    ApplicationUser,
}

impl PrincipalKind {
    /// Persisted lowercase name
    pub fn as_str(&self) -> &'static str {
        match self {
            PrincipalKind::Organization => "organization",
            PrincipalKind::AdminUser => "admin_user",
            PrincipalKind::Application => "application",
            PrincipalKind::ApplicationUser => "application_user",
        }
    }
}

impl std::fmt::Display for PrincipalKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for PrincipalKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "organization" => Ok(PrincipalKind::Organization),
            "admin_user" => Ok(PrincipalKind::AdminUser),
            "application" => Ok(PrincipalKind::Application),
            "application_user" => Ok(PrincipalKind::ApplicationUser),
            _ => Err(format!("Invalid principal kind: {}", s)),
        }
    }
}

/// Principal reference: who the token speaks for and in which scope
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AuthPrincipal {
    /// Principal kind
    pub kind: PrincipalKind,

    /// Principal entity id
    pub id: Uuid,

    /// Owning application (or organization) scope
    pub application_id: Uuid,
}

impl AuthPrincipal {
    pub fn new(kind: PrincipalKind, id: Uuid, application_id: Uuid) -> Self {
        Self {
            kind,
            id,
            application_id,
        }
    }
}
