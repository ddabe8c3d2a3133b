//! User repository.

use domain::models::User;
use shared::id::new_id;

use crate::db::Store;
use crate::entities::UserEntity;
use crate::error::StoreError;
use crate::repositories::scoped::{GroupScope, ScopedRepository};

/// Users of one store, addressed through their group.
pub struct UserRepository<'a> {
    inner: ScopedRepository<'a, UserEntity>,
}

impl<'a> UserRepository<'a> {
    pub fn new(store: &'a Store) -> Self {
        Self {
            inner: ScopedRepository::new(store),
        }
    }

    /// Finds a user by login within a group. The password digest is never
    /// returned.
    pub async fn get(&self, group_id: &str, login: &str) -> Result<User, StoreError> {
        let entity = self.inner.get(&GroupScope::new(group_id), login).await?;
        Ok(entity.into())
    }

    /// Lists the users of a group, without passwords or group ids.
    pub async fn list(&self, group_id: &str) -> Result<Vec<User>, StoreError> {
        let entities = self.inner.list(&GroupScope::new(group_id)).await?;
        Ok(entities.into_iter().map(User::from).collect())
    }

    /// Stores a new user in the group.
    ///
    /// An empty login is replaced by a generated one. `user` is updated in
    /// place with the login and group it was stored under.
    pub async fn create(&self, group_id: &str, user: &mut User) -> Result<(), StoreError> {
        if user.login.is_empty() {
            user.login = new_id();
        }
        user.group_id = Some(group_id.to_string());

        self.inner
            .create(&GroupScope::new(group_id), vec![UserEntity::from(user.clone())])
            .await
    }

    /// Replaces the user's fields and moves it into the group.
    ///
    /// Without a new password the stored digest is kept.
    pub async fn update(&self, group_id: &str, user: &mut User) -> Result<(), StoreError> {
        if user.login.is_empty() {
            return Err(StoreError::Validation("user login is required".to_string()));
        }
        user.group_id = Some(group_id.to_string());

        self.inner
            .update(&GroupScope::new(group_id), UserEntity::from(user.clone()))
            .await
    }

    pub async fn delete(&self, group_id: &str, login: &str) -> Result<(), StoreError> {
        self.inner.delete(&GroupScope::new(group_id), login).await
    }

    /// Reads a user for authentication, across all groups and including
    /// the password digest.
    pub async fn login(&self, login: &str) -> Result<User, StoreError> {
        let entity = self.inner.find_by_id(login).await?;
        tracing::debug!(login = %login, "User loaded for authentication");
        Ok(entity.into())
    }
}
