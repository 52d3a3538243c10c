use std::sync::Arc;

use chrono::Utc;
use taskdeck_shared::{ExternalProfile, User, UserId};
use uuid::Uuid;

use crate::error::TaskError;
use crate::store::UserStore;

#[derive(Clone)]
pub struct UserService {
    store: Arc<dyn UserStore>,
}

impl UserService {
    pub fn new(store: Arc<dyn UserStore>) -> Self {
        Self { store }
    }

    /// Creates the user on first login and refreshes the profile on every
    /// later one.
    pub async fn record_login(&self, profile: ExternalProfile) -> Result<User, TaskError> {
        let now = Utc::now();
        let user = match self.store.find_by_external_id(&profile.external_id).await? {
            Some(mut user) => {
                user.apply_login(profile, now);
                self.store.save(user).await?
            }
            None => {
                let user = User {
                    id: UserId::new(Uuid::new_v4().to_string()),
                    external_id: profile.external_id,
                    username: profile.username,
                    avatar: profile.avatar,
                    email: profile.email,
                    role: User::DEFAULT_ROLE.to_string(),
                    last_login: now,
                    created_at: now,
                };
                log::info!("registered user {} ({})", user.id, user.username);
                self.store.insert(user).await?
            }
        };
        Ok(user)
    }

    pub async fn find(&self, id: &UserId) -> Result<User, TaskError> {
        self.store
            .find_by_id(id)
            .await?
            .ok_or(TaskError::UserNotFound)
    }
}
