use crate::result::{OptRepoResult, UserRepoError};
use engine::id::UserId;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Stored role of a user. Anything other than `Admin` is a regular member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
pub enum UserRole {
    Admin,
    #[default]
    #[serde(other)]
    Member,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(rename = "_id")]
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub avatar: Option<String>,
    #[serde(default)]
    pub user_role: UserRole,
}

impl User {
    pub fn is_admin(&self) -> bool {
        self.user_role == UserRole::Admin
    }
}

/// Read-only access to user records. Users are registered elsewhere.
pub trait UserRepository {
    fn get(&self, id: UserId) -> impl Future<Output = OptRepoResult<User, UserRepoError>> + Send;
}

#[cfg(test)]
mod tests {
    use super::{User, UserRole};
    use serde_json::json;

    #[test]
    fn unknown_roles_are_members() {
        let user: User = serde_json::from_value(json!({
            "_id": "65f1c2a9e4b0a1b2c3d4e5f6",
            "name": "sam",
            "email": "sam@example.com",
            "avatar": null,
            "userRole": "Tester",
        }))
        .unwrap();

        assert_eq!(UserRole::Member, user.user_role);
        assert!(!user.is_admin());
    }

    #[test]
    fn admin_role_is_recognized() {
        let user: User = serde_json::from_value(json!({
            "_id": "65f1c2a9e4b0a1b2c3d4e5f6",
            "name": "root",
            "email": "root@example.com",
            "avatar": null,
            "userRole": "Admin",
        }))
        .unwrap();

        assert!(user.is_admin());
    }
}
