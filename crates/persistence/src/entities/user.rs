//! User document mapping.

use domain::models::User;
use serde::{Deserialize, Serialize};
use shared::password::PasswordDigest;

use crate::config::CollectionNames;
use crate::repositories::scoped::{GroupScope, ScopedDocument};

/// Stored form of a user.
///
/// Absent optional fields are written as `null` so that an update clears
/// them. The password digest is the exception: without a new one the
/// stored digest is kept.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserEntity {
    #[serde(rename = "_id")]
    pub login: String,
    pub group_id: Option<String>,
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

impl From<User> for UserEntity {
    fn from(user: User) -> Self {
        Self {
            login: user.login,
            group_id: user.group_id,
            name: user.name,
            password: user.password.map(|digest| digest.as_str().to_string()),
        }
    }
}

impl From<UserEntity> for User {
    fn from(entity: UserEntity) -> Self {
        Self {
            login: entity.login,
            group_id: entity.group_id,
            name: entity.name,
            password: entity.password.map(PasswordDigest::from_stored),
        }
    }
}

impl ScopedDocument for UserEntity {
    type Scope = GroupScope;

    const KIND: &'static str = "user";
    const HIDDEN_ON_GET: &'static [&'static str] = &["password"];
    const HIDDEN_ON_LIST: &'static [&'static str] = &["password", "groupId"];

    fn collection_name(names: &CollectionNames) -> &str {
        &names.users
    }

    fn id(&self) -> String {
        self.login.clone()
    }

    fn assign_scope(&mut self, scope: &GroupScope) {
        self.group_id = Some(scope.group_id.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_user_entity_field_names() {
        let entity = UserEntity {
            login: "a@x.com".to_string(),
            group_id: Some("g1".to_string()),
            name: None,
            password: Some("$argon2id$digest".to_string()),
        };
        assert_eq!(
            serde_json::to_value(&entity).unwrap(),
            json!({"_id": "a@x.com", "groupId": "g1", "name": null, "password": "$argon2id$digest"})
        );
    }

    #[test]
    fn test_user_entity_omits_missing_password() {
        let entity = UserEntity::from(User::new("a@x.com"));
        let value = serde_json::to_value(&entity).unwrap();
        assert!(value.get("password").is_none());
        assert_eq!(value["name"], serde_json::Value::Null);
    }

    #[test]
    fn test_user_entity_from_projected_document() {
        let entity: UserEntity = serde_json::from_value(json!({"_id": "a@x.com"})).unwrap();
        let user = User::from(entity);
        assert_eq!(user.login, "a@x.com");
        assert!(user.group_id.is_none());
        assert!(user.password.is_none());
    }

    #[test]
    fn test_user_entity_keeps_digest() {
        let mut user = User::new("a@x.com");
        user.set_password("secret1").unwrap();

        let back = User::from(UserEntity::from(user));
        assert!(back.check_password("secret1"));
        assert!(!back.check_password("wrong"));
    }

    #[test]
    fn test_assign_scope_overwrites_group() {
        let mut entity = UserEntity::from(User::new("a@x.com"));
        entity.group_id = Some("other".to_string());
        entity.assign_scope(&GroupScope::new("g1"));
        assert_eq!(entity.group_id.as_deref(), Some("g1"));
    }
}
