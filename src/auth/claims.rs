use serde::{Deserialize, Serialize};

use crate::auth::repo_types::Role;

/// JWT payload for a session token. Every field is required at decode
/// time; there is no untyped claim map anywhere.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub user_id: i64,   // subject user ID
    pub user_role: Role, // role at issue time, informational only
    pub exp: usize,     // expires at (unix timestamp)
}
