//! Task operations scoped to the calling user.

use std::sync::Arc;

use chrono::Utc;
use taskdeck_shared::{
    CreateTaskRequest, Task, TaskId, TaskListQuery, TaskPage, TaskStats, TaskStatus,
    UpdateTaskRequest, UserId,
};

use crate::error::TaskError;
use crate::store::{NewTask, TaskQuery, TaskStore};

#[derive(Clone)]
pub struct TaskService {
    store: Arc<dyn TaskStore>,
}

impl TaskService {
    pub fn new(store: Arc<dyn TaskStore>) -> Self {
        Self { store }
    }

    pub async fn create(
        &self,
        input: CreateTaskRequest,
        owner: &UserId,
    ) -> Result<Task, TaskError> {
        input.validate()?;

        let task = self
            .store
            .insert(NewTask {
                title: input.title,
                description: input.description,
                status: TaskStatus::Todo,
                priority: input.priority.unwrap_or_default(),
                owner: owner.clone(),
                due_date: input.due_date,
            })
            .await?;

        log::debug!("created task {} for {}", task.id, owner);
        Ok(task)
    }

    pub async fn list(&self, owner: &UserId, query: TaskListQuery) -> Result<TaskPage, TaskError> {
        query.validate()?;

        let limit = query.limit();
        let selector = TaskQuery::owned_by(owner)
            .with_status(query.status)
            .with_priority(query.priority);

        let tasks = match query.offset() {
            Some(skip) => self.store.find(&selector, skip, u64::from(limit)).await?,
            None => Vec::new(),
        };
        let total = self.store.count(&selector).await?;

        Ok(TaskPage {
            tasks,
            total,
            page: query.page(),
            total_pages: TaskPage::total_pages(total, limit),
        })
    }

    pub async fn get(&self, id: TaskId, caller: &UserId) -> Result<Task, TaskError> {
        self.owned_task(id, caller).await
    }

    pub async fn update(
        &self,
        id: TaskId,
        patch: UpdateTaskRequest,
        caller: &UserId,
    ) -> Result<Task, TaskError> {
        patch.validate()?;
        let mut task = self.owned_task(id, caller).await?;

        if let Some(title) = patch.title {
            task.title = title;
        }
        if let Some(description) = patch.description {
            task.description = Some(description);
        }
        if let Some(priority) = patch.priority {
            task.priority = priority;
        }
        if let Some(due_date) = patch.due_date {
            task.due_date = Some(due_date);
        }
        if let Some(status) = patch.status {
            task.status = status;
            if status == TaskStatus::Completed {
                task.completed_at.get_or_insert_with(Utc::now);
            } else {
                task.completed_at = None;
            }
        }

        let task = self.store.save(task).await?.ok_or(TaskError::NotFound)?;
        log::debug!("updated task {} for {}", task.id, caller);
        Ok(task)
    }

    pub async fn remove(&self, id: TaskId, caller: &UserId) -> Result<(), TaskError> {
        self.owned_task(id, caller).await?;
        if !self.store.delete(id).await? {
            return Err(TaskError::NotFound);
        }
        log::debug!("deleted task {id} for {caller}");
        Ok(())
    }

    pub async fn stats(&self, owner: &UserId) -> Result<TaskStats, TaskError> {
        let all = TaskQuery::owned_by(owner);
        let by_status = |status| all.clone().with_status(Some(status));

        Ok(TaskStats {
            total: self.store.count(&all).await?,
            completed: self.store.count(&by_status(TaskStatus::Completed)).await?,
            in_progress: self.store.count(&by_status(TaskStatus::InProgress)).await?,
            todo: self.store.count(&by_status(TaskStatus::Todo)).await?,
        })
    }

    /// Loads a task the caller owns. Existence is checked before ownership,
    /// so a non-owner learns that the id exists.
    async fn owned_task(&self, id: TaskId, caller: &UserId) -> Result<Task, TaskError> {
        let task = self.store.find_by_id(id).await?.ok_or(TaskError::NotFound)?;
        if !task.is_owned_by(caller) {
            log::warn!("{caller} denied access to task {id}");
            return Err(TaskError::Forbidden);
        }
        Ok(task)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{InMemoryTaskStore, StoreError};
    use async_trait::async_trait;
    use taskdeck_shared::TaskPriority;

    fn service() -> TaskService {
        TaskService::new(Arc::new(InMemoryTaskStore::new()))
    }

    fn alice() -> UserId {
        UserId::new("alice")
    }

    fn bob() -> UserId {
        UserId::new("bob")
    }

    fn titled(title: &str) -> CreateTaskRequest {
        CreateTaskRequest {
            title: title.to_string(),
            ..CreateTaskRequest::default()
        }
    }

    #[actix_web::test]
    async fn create_applies_defaults_and_owner() {
        let tasks = service();
        let task = tasks.create(titled("Buy milk"), &alice()).await.unwrap();

        assert_eq!(task.owner, alice());
        assert_eq!(task.status, TaskStatus::Todo);
        assert_eq!(task.priority, TaskPriority::Medium);
        assert_eq!(task.completed_at, None);
    }

    #[actix_web::test]
    async fn create_rejects_bad_titles() {
        let tasks = service();

        let empty = tasks.create(titled(""), &alice()).await;
        assert!(matches!(empty, Err(TaskError::Validation(_))));

        let long = tasks.create(titled(&"t".repeat(201)), &alice()).await;
        assert!(matches!(long, Err(TaskError::Validation(_))));

        let exact = tasks.create(titled(&"t".repeat(200)), &alice()).await;
        assert!(exact.is_ok());
    }

    #[actix_web::test]
    async fn list_is_scoped_to_owner_and_newest_first() {
        let tasks = service();
        for n in 0..12 {
            tasks
                .create(titled(&format!("alice {n}")), &alice())
                .await
                .unwrap();
        }
        tasks.create(titled("bob 0"), &bob()).await.unwrap();

        let first = tasks
            .list(&alice(), TaskListQuery::default())
            .await
            .unwrap();
        assert_eq!(first.total, 12);
        assert_eq!(first.total_pages, 2);
        assert_eq!(first.page, 1);
        assert_eq!(first.tasks.len(), 10);
        assert_eq!(first.tasks[0].title, "alice 11");
        assert!(first.tasks.iter().all(|task| task.owner == alice()));

        let second = tasks
            .list(
                &alice(),
                TaskListQuery {
                    page: Some(2),
                    ..TaskListQuery::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(second.tasks.len(), 2);
        assert_eq!(second.tasks[1].title, "alice 0");

        let beyond = tasks
            .list(
                &alice(),
                TaskListQuery {
                    page: Some(9),
                    ..TaskListQuery::default()
                },
            )
            .await
            .unwrap();
        assert!(beyond.tasks.is_empty());
        assert_eq!(beyond.total, 12);
    }

    #[actix_web::test]
    async fn list_filters_by_status_and_priority() {
        let tasks = service();
        let urgent = tasks
            .create(
                CreateTaskRequest {
                    priority: Some(TaskPriority::Urgent),
                    ..titled("urgent")
                },
                &alice(),
            )
            .await
            .unwrap();
        tasks.create(titled("normal"), &alice()).await.unwrap();
        tasks
            .update(
                urgent.id,
                UpdateTaskRequest::with_status(TaskStatus::InProgress),
                &alice(),
            )
            .await
            .unwrap();

        let page = tasks
            .list(
                &alice(),
                TaskListQuery {
                    status: Some(TaskStatus::InProgress),
                    priority: Some(TaskPriority::Urgent),
                    ..TaskListQuery::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(page.total, 1);
        assert_eq!(page.tasks[0].id, urgent.id);
    }

    #[actix_web::test]
    async fn list_below_first_page_is_empty() {
        let tasks = service();
        tasks.create(titled("only"), &alice()).await.unwrap();

        for page in [0, -1, i64::MIN] {
            let listed = tasks
                .list(
                    &alice(),
                    TaskListQuery {
                        page: Some(page),
                        ..TaskListQuery::default()
                    },
                )
                .await
                .unwrap();
            assert!(listed.tasks.is_empty(), "page {page}");
            assert_eq!(listed.page, page);
            assert_eq!(listed.total, 1);
            assert_eq!(listed.total_pages, 1);
        }
    }

    #[actix_web::test]
    async fn not_found_precedes_forbidden() {
        let tasks = service();
        let task = tasks.create(titled("mine"), &alice()).await.unwrap();
        let missing = TaskId::generate();

        assert!(matches!(tasks.get(missing, &bob()).await, Err(TaskError::NotFound)));
        assert!(matches!(tasks.get(task.id, &bob()).await, Err(TaskError::Forbidden)));
        assert!(matches!(
            tasks
                .update(task.id, UpdateTaskRequest::default(), &bob())
                .await,
            Err(TaskError::Forbidden)
        ));
        assert!(matches!(
            tasks.update(missing, UpdateTaskRequest::default(), &bob()).await,
            Err(TaskError::NotFound)
        ));
        assert!(matches!(tasks.remove(task.id, &bob()).await, Err(TaskError::Forbidden)));
        assert!(matches!(tasks.remove(missing, &alice()).await, Err(TaskError::NotFound)));

        assert_eq!(tasks.get(task.id, &alice()).await.unwrap(), task);
    }

    #[actix_web::test]
    async fn completed_at_follows_status() {
        let tasks = service();
        let task = tasks.create(titled("ship"), &alice()).await.unwrap();

        let done = tasks
            .update(
                task.id,
                UpdateTaskRequest::with_status(TaskStatus::Completed),
                &alice(),
            )
            .await
            .unwrap();
        let stamped = done.completed_at.expect("completion time");

        let again = tasks
            .update(
                task.id,
                UpdateTaskRequest::with_status(TaskStatus::Completed),
                &alice(),
            )
            .await
            .unwrap();
        assert_eq!(again.completed_at, Some(stamped));

        let renamed = tasks
            .update(
                task.id,
                UpdateTaskRequest {
                    title: Some("ship it".to_string()),
                    ..UpdateTaskRequest::default()
                },
                &alice(),
            )
            .await
            .unwrap();
        assert_eq!(renamed.completed_at, Some(stamped));

        let reopened = tasks
            .update(
                task.id,
                UpdateTaskRequest::with_status(TaskStatus::Todo),
                &alice(),
            )
            .await
            .unwrap();
        assert_eq!(reopened.completed_at, None);
        assert_eq!(reopened.owner, alice());
    }

    #[actix_web::test]
    async fn update_applies_only_present_fields() {
        let tasks = service();
        let task = tasks
            .create(
                CreateTaskRequest {
                    description: Some("details".to_string()),
                    ..titled("keep")
                },
                &alice(),
            )
            .await
            .unwrap();

        let updated = tasks
            .update(
                task.id,
                UpdateTaskRequest {
                    priority: Some(TaskPriority::High),
                    ..UpdateTaskRequest::default()
                },
                &alice(),
            )
            .await
            .unwrap();
        assert_eq!(updated.title, "keep");
        assert_eq!(updated.description.as_deref(), Some("details"));
        assert_eq!(updated.priority, TaskPriority::High);
        assert_eq!(updated.status, TaskStatus::Todo);

        let invalid = tasks
            .update(
                task.id,
                UpdateTaskRequest {
                    title: Some(" ".to_string()),
                    ..UpdateTaskRequest::default()
                },
                &alice(),
            )
            .await;
        assert!(matches!(invalid, Err(TaskError::Validation(_))));
    }

    #[actix_web::test]
    async fn remove_twice_reports_not_found() {
        let tasks = service();
        let task = tasks.create(titled("gone"), &alice()).await.unwrap();

        tasks.remove(task.id, &alice()).await.unwrap();
        assert!(matches!(tasks.remove(task.id, &alice()).await, Err(TaskError::NotFound)));
        assert!(matches!(tasks.get(task.id, &alice()).await, Err(TaskError::NotFound)));
    }

    #[actix_web::test]
    async fn stats_partition_owner_tasks() {
        let tasks = service();
        let statuses = [
            TaskStatus::Todo,
            TaskStatus::Todo,
            TaskStatus::InProgress,
            TaskStatus::Completed,
        ];
        for (n, status) in statuses.into_iter().enumerate() {
            let task = tasks
                .create(titled(&format!("task {n}")), &alice())
                .await
                .unwrap();
            tasks
                .update(task.id, UpdateTaskRequest::with_status(status), &alice())
                .await
                .unwrap();
        }
        tasks.create(titled("not counted"), &bob()).await.unwrap();

        let stats = tasks.stats(&alice()).await.unwrap();
        assert_eq!(
            stats,
            TaskStats {
                total: 4,
                completed: 1,
                in_progress: 1,
                todo: 2,
            }
        );
        assert_eq!(stats.completed + stats.in_progress + stats.todo, stats.total);
    }

    struct BrokenStore;

    #[async_trait]
    impl TaskStore for BrokenStore {
        async fn insert(&self, _task: NewTask) -> Result<Task, StoreError> {
            Err(StoreError::Unavailable("connection refused".into()))
        }

        async fn find_by_id(&self, _id: TaskId) -> Result<Option<Task>, StoreError> {
            Err(StoreError::Unavailable("connection refused".into()))
        }

        async fn find(
            &self,
            _query: &TaskQuery,
            _skip: u64,
            _limit: u64,
        ) -> Result<Vec<Task>, StoreError> {
            Err(StoreError::Unavailable("connection refused".into()))
        }

        async fn count(&self, _query: &TaskQuery) -> Result<u64, StoreError> {
            Err(StoreError::Unavailable("connection refused".into()))
        }

        async fn save(&self, _task: Task) -> Result<Option<Task>, StoreError> {
            Err(StoreError::Unavailable("connection refused".into()))
        }

        async fn delete(&self, _id: TaskId) -> Result<bool, StoreError> {
            Err(StoreError::Unavailable("connection refused".into()))
        }
    }

    #[actix_web::test]
    async fn store_failures_propagate() {
        let tasks = TaskService::new(Arc::new(BrokenStore));

        assert!(matches!(
            tasks.create(titled("x"), &alice()).await,
            Err(TaskError::Store(_))
        ));
        assert!(matches!(tasks.stats(&alice()).await, Err(TaskError::Store(_))));
        // Validation runs before the store is touched.
        assert!(matches!(
            tasks.create(titled(""), &alice()).await,
            Err(TaskError::Validation(_))
        ));
    }
}
