use crate::role::Role;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Authenticated caller identity, resolved by the presentation layer and
/// passed explicitly into service calls that re-validate ownership.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Principal {
    pub user_id: Uuid,
    pub role: Role,
}

impl Principal {
    pub fn new(user_id: Uuid, role: Role) -> Self {
        Self { user_id, role }
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}
