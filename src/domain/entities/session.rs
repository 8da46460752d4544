use serde::{Deserialize, Serialize};

use super::user::Role;

/// The authenticated identity, established outside this layer and passed in
/// by value wherever scoping needs it. Never mutated here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub user_id: String,
    pub email: String,
    pub display_name: String,
    pub role: Role,
}

impl Session {
    pub fn new(user_id: String, email: String, display_name: String, role: Role) -> Self {
        Self {
            user_id,
            email,
            display_name,
            role,
        }
    }

    pub fn is_organiser(&self) -> bool {
        self.role == Role::Organiser
    }
}
