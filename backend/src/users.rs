//! User directory and profile management.

use std::sync::Arc;

use connect_common::{CurrentUser, UserId, UserProfile};

use crate::error::{Error, Result};
use crate::models::{NewUser, User};
use crate::store::Store;

pub struct UserService {
    store: Arc<Store>,
}

impl UserService {
    pub fn new(store: Arc<Store>) -> Self {
        Self { store }
    }

    /// Everyone except the viewer, newest first.
    pub fn list_others(&self, viewer: UserId) -> Result<Vec<UserProfile>> {
        let users = self.store.list_users_except(viewer)?;
        Ok(users.iter().map(User::profile).collect())
    }

    pub fn get(&self, id: UserId) -> Result<UserProfile> {
        Ok(self.find(id)?.profile())
    }

    pub fn current(&self, id: UserId) -> Result<CurrentUser> {
        Ok(self.find(id)?.current())
    }

    /// Replace the viewer's display name and avatar.
    ///
    /// The name is trimmed and must not be empty; a blank avatar clears it.
    pub fn update_profile(
        &self,
        viewer: UserId,
        name: Option<&str>,
        avatar_url: Option<&str>,
    ) -> Result<UserProfile> {
        let name = name.map(str::trim).unwrap_or_default();
        if name.is_empty() {
            return Err(Error::InvalidRequest("Name is required".to_string()));
        }
        let avatar_url = avatar_url.map(str::trim).filter(|url| !url.is_empty());

        let user = self
            .store
            .update_profile(viewer, name, avatar_url)?
            .ok_or_else(user_not_found)?;

        tracing::info!(user_id = viewer, "Profile updated");
        Ok(user.profile())
    }

    /// Resolve a verified provider identity to a local user, creating it on
    /// first login.
    pub fn login(&self, new_user: &NewUser) -> Result<User> {
        Ok(self.store.find_or_create_oauth_user(new_user)?)
    }

    fn find(&self, id: UserId) -> Result<User> {
        self.store.get_user(id)?.ok_or_else(user_not_found)
    }
}

fn user_not_found() -> Error {
    Error::NotFound("User not found".to_string())
}
