use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;

/// User role as enforced by the authorization gate.
///
/// Persisted as a string column; anything outside the known set maps to
/// `Unknown`, which callers must treat as its own error condition rather
/// than a usable role.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    JobSeeker,
    Employer,
    Unknown,
}

impl Role {
    pub fn from_db(role: &str) -> Role {
        match role {
            "admin" => Role::Admin,
            "jobseeker" => Role::JobSeeker,
            "employer" => Role::Employer,
            _ => Role::Unknown,
        }
    }

    pub fn as_db(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::JobSeeker => "jobseeker",
            Role::Employer => "employer",
            Role::Unknown => "",
        }
    }
}

/// User record in the database.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: i64,
    pub full_name: String,
    #[serde(skip_serializing)]
    pub passhash: String, // argon2 PHC string, never exposed in JSON
    pub phone: String,
    pub email: String,
    pub user_role: String,
    pub deleted: bool,
}

impl User {
    pub fn role(&self) -> Role {
        Role::from_db(&self.user_role)
    }
}

/// One-shot password reset link.
#[derive(Debug, Clone, FromRow)]
pub struct ResetLink {
    pub id: i64,
    pub link: String,
    pub user_id: i64,
    pub expiration: OffsetDateTime,
}

impl ResetLink {
    pub fn is_expired(&self, now: OffsetDateTime) -> bool {
        now > self.expiration
    }
}
