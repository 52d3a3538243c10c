//! In-memory document store.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use taskdeck_shared::{Task, TaskId, User, UserId};
use tokio::sync::RwLock;

use super::{NewTask, StoreError, TaskQuery, TaskStore, UserStore};

/// A stored task plus its insertion sequence, used to order tasks created
/// within the same clock tick.
#[derive(Debug, Clone)]
struct TaskDocument {
    seq: u64,
    task: Task,
}

#[derive(Debug, Default)]
struct TaskTable {
    next_seq: u64,
    documents: HashMap<TaskId, TaskDocument>,
}

#[derive(Debug, Default)]
pub struct InMemoryTaskStore {
    table: RwLock<TaskTable>,
}

impl InMemoryTaskStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TaskStore for InMemoryTaskStore {
    async fn insert(&self, new: NewTask) -> Result<Task, StoreError> {
        let now = Utc::now();
        let task = Task {
            id: TaskId::generate(),
            title: new.title,
            description: new.description,
            status: new.status,
            priority: new.priority,
            owner: new.owner,
            due_date: new.due_date,
            completed_at: None,
            created_at: now,
            updated_at: now,
        };

        let mut table = self.table.write().await;
        let seq = table.next_seq;
        table.next_seq += 1;
        table.documents.insert(
            task.id,
            TaskDocument {
                seq,
                task: task.clone(),
            },
        );
        Ok(task)
    }

    async fn find_by_id(&self, id: TaskId) -> Result<Option<Task>, StoreError> {
        let table = self.table.read().await;
        Ok(table.documents.get(&id).map(|doc| doc.task.clone()))
    }

    async fn find(
        &self,
        query: &TaskQuery,
        skip: u64,
        limit: u64,
    ) -> Result<Vec<Task>, StoreError> {
        let table = self.table.read().await;
        let mut matching: Vec<&TaskDocument> = table
            .documents
            .values()
            .filter(|doc| query.matches(&doc.task))
            .collect();
        matching.sort_by(|a, b| {
            b.task
                .created_at
                .cmp(&a.task.created_at)
                .then(b.seq.cmp(&a.seq))
        });

        let skip = usize::try_from(skip).unwrap_or(usize::MAX);
        let limit = usize::try_from(limit).unwrap_or(usize::MAX);
        Ok(matching
            .into_iter()
            .skip(skip)
            .take(limit)
            .map(|doc| doc.task.clone())
            .collect())
    }

    async fn count(&self, query: &TaskQuery) -> Result<u64, StoreError> {
        let table = self.table.read().await;
        let count = table
            .documents
            .values()
            .filter(|doc| query.matches(&doc.task))
            .count();
        Ok(count as u64)
    }

    async fn save(&self, mut task: Task) -> Result<Option<Task>, StoreError> {
        let mut table = self.table.write().await;
        let Some(doc) = table.documents.get_mut(&task.id) else {
            return Ok(None);
        };
        task.created_at = doc.task.created_at;
        task.updated_at = Utc::now();
        doc.task = task.clone();
        Ok(Some(task))
    }

    async fn delete(&self, id: TaskId) -> Result<bool, StoreError> {
        let mut table = self.table.write().await;
        Ok(table.documents.remove(&id).is_some())
    }
}

#[derive(Debug, Default)]
struct UserTable {
    users: HashMap<UserId, User>,
    by_external_id: HashMap<String, UserId>,
}

#[derive(Debug, Default)]
pub struct InMemoryUserStore {
    table: RwLock<UserTable>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, StoreError> {
        let table = self.table.read().await;
        Ok(table.users.get(id).cloned())
    }

    async fn find_by_external_id(&self, external_id: &str) -> Result<Option<User>, StoreError> {
        let table = self.table.read().await;
        Ok(table
            .by_external_id
            .get(external_id)
            .and_then(|id| table.users.get(id))
            .cloned())
    }

    async fn insert(&self, user: User) -> Result<User, StoreError> {
        let mut table = self.table.write().await;
        if table.by_external_id.contains_key(&user.external_id) {
            return Err(StoreError::Constraint(format!(
                "duplicate external id {}",
                user.external_id
            )));
        }
        if table.users.contains_key(&user.id) {
            return Err(StoreError::Constraint(format!("duplicate user id {}", user.id)));
        }
        table
            .by_external_id
            .insert(user.external_id.clone(), user.id.clone());
        table.users.insert(user.id.clone(), user.clone());
        Ok(user)
    }

    async fn save(&self, user: User) -> Result<User, StoreError> {
        let mut table = self.table.write().await;
        let Some(existing) = table.users.get_mut(&user.id) else {
            return Err(StoreError::Constraint(format!("unknown user {}", user.id)));
        };
        if existing.external_id != user.external_id {
            return Err(StoreError::Constraint(format!(
                "external id of user {} is immutable",
                user.id
            )));
        }
        *existing = user.clone();
        Ok(user)
    }
}
