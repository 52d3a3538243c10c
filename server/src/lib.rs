//! HTTP service exposing per-user task resources.

use std::sync::Arc;

pub mod auth;
pub mod config;
pub mod error;
pub mod routes;
pub mod service;
pub mod store;
pub mod users;

use auth::{IdentityResolver, StaticTokens};
use config::Config;
use error::TaskError;
use service::TaskService;
use store::{InMemoryTaskStore, InMemoryUserStore};
use users::UserService;

/// Handles shared by every request.
#[derive(Clone)]
pub struct AppState {
    pub tasks: TaskService,
    pub users: UserService,
    pub identities: Arc<dyn IdentityResolver>,
}

impl AppState {
    pub fn new(
        tasks: TaskService,
        users: UserService,
        identities: Arc<dyn IdentityResolver>,
    ) -> Self {
        Self {
            tasks,
            users,
            identities,
        }
    }

    /// Builds in-memory stores and logs in every configured token so it
    /// resolves to a user record.
    pub async fn from_config(config: &Config) -> Result<Self, TaskError> {
        let tasks = TaskService::new(Arc::new(InMemoryTaskStore::new()));
        let users = UserService::new(Arc::new(InMemoryUserStore::new()));

        let mut identities = StaticTokens::new();
        for grant in &config.tokens {
            let user = users.record_login(grant.profile.clone()).await?;
            identities.register(grant.token.clone(), user.id);
        }
        log::info!("{} access token(s) registered", identities.len());

        Ok(Self::new(tasks, users, Arc::new(identities)))
    }
}
