//! Persistence ports for tasks and users.
//!
//! Services only talk to the [`TaskStore`] and [`UserStore`] traits; every
//! call reads or writes through, nothing is cached above this layer.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use taskdeck_shared::{Task, TaskId, TaskPriority, TaskStatus, User, UserId};
use thiserror::Error;

mod memory;

pub use memory::{InMemoryTaskStore, InMemoryUserStore};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The backing store could not be reached or answered with a failure.
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// A write violated a uniqueness or integrity constraint.
    #[error("constraint violated: {0}")]
    Constraint(String),
}

/// Fields of a task before the store assigns id and timestamps.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTask {
    pub title: String,
    pub description: Option<String>,
    pub status: TaskStatus,
    pub priority: TaskPriority,
    pub owner: UserId,
    pub due_date: Option<DateTime<Utc>>,
}

/// Exact-match selector over an owner's tasks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskQuery {
    pub owner: UserId,
    pub status: Option<TaskStatus>,
    pub priority: Option<TaskPriority>,
}

impl TaskQuery {
    pub fn owned_by(owner: &UserId) -> Self {
        Self {
            owner: owner.clone(),
            status: None,
            priority: None,
        }
    }

    pub fn with_status(mut self, status: Option<TaskStatus>) -> Self {
        self.status = status;
        self
    }

    pub fn with_priority(mut self, priority: Option<TaskPriority>) -> Self {
        self.priority = priority;
        self
    }

    pub fn matches(&self, task: &Task) -> bool {
        task.owner == self.owner
            && self.status.map_or(true, |status| task.status == status)
            && self.priority.map_or(true, |priority| task.priority == priority)
    }
}

#[async_trait]
pub trait TaskStore: Send + Sync {
    async fn insert(&self, task: NewTask) -> Result<Task, StoreError>;

    async fn find_by_id(&self, id: TaskId) -> Result<Option<Task>, StoreError>;

    /// Matching tasks, newest first, after skipping `skip` of them.
    async fn find(&self, query: &TaskQuery, skip: u64, limit: u64)
        -> Result<Vec<Task>, StoreError>;

    async fn count(&self, query: &TaskQuery) -> Result<u64, StoreError>;

    /// Replaces a stored task and bumps `updated_at`. Returns `None` when
    /// the task no longer exists.
    async fn save(&self, task: Task) -> Result<Option<Task>, StoreError>;

    /// Returns whether a task was removed.
    async fn delete(&self, id: TaskId) -> Result<bool, StoreError>;
}

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, StoreError>;

    async fn find_by_external_id(&self, external_id: &str) -> Result<Option<User>, StoreError>;

    async fn insert(&self, user: User) -> Result<User, StoreError>;

    async fn save(&self, user: User) -> Result<User, StoreError>;
}
