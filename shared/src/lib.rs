use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

mod user;
pub mod validation;

pub use user::{ExternalProfile, User, UserId};
pub use validation::{FieldError, ValidationErrors};

pub const DEFAULT_PAGE: i64 = 1;
pub const DEFAULT_LIMIT: u32 = 10;
pub const MAX_LIMIT: u32 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(Uuid);

impl TaskId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for TaskId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Hash, Clone, Copy, Default)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    #[default]
    Todo,
    InProgress,
    Completed,
}

impl TaskStatus {
    pub const ALL: [TaskStatus; 3] = [Self::Todo, Self::InProgress, Self::Completed];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Todo => "todo",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
        }
    }

    /// Next status in the todo -> in_progress -> completed -> todo cycle.
    pub const fn next(self) -> Self {
        match self {
            Self::Todo => Self::InProgress,
            Self::InProgress => Self::Completed,
            Self::Completed => Self::Todo,
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Hash, Clone, Copy, Default)]
#[serde(rename_all = "snake_case")]
pub enum TaskPriority {
    Low,
    #[default]
    Medium,
    High,
    Urgent,
}

impl TaskPriority {
    pub const ALL: [TaskPriority; 4] = [Self::Low, Self::Medium, Self::High, Self::Urgent];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Urgent => "urgent",
        }
    }
}

impl fmt::Display for TaskPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A task as stored and as returned over the wire.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub status: TaskStatus,
    pub priority: TaskPriority,
    #[serde(rename = "userId")]
    pub owner: UserId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Task {
    pub fn is_owned_by(&self, user: &UserId) -> bool {
        &self.owner == user
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CreateTaskRequest {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<TaskPriority>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<DateTime<Utc>>,
}

/// Partial update; absent fields are left untouched.
#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UpdateTaskRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<TaskStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<TaskPriority>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<DateTime<Utc>>,
}

impl UpdateTaskRequest {
    pub fn with_status(status: TaskStatus) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }
}

/// Query string of `GET /tasks`. Pages are 1-based; any page outside
/// `1..=totalPages` yields an empty task list.
#[derive(Debug, Deserialize, Serialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct TaskListQuery {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<TaskStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<TaskPriority>,
}

impl TaskListQuery {
    pub fn page(&self) -> i64 {
        self.page.unwrap_or(DEFAULT_PAGE)
    }

    /// Number of matching tasks preceding the requested page, or `None`
    /// when the page number is below 1.
    pub fn offset(&self) -> Option<u64> {
        let preceding = u64::try_from(self.page().checked_sub(1)?).ok()?;
        Some(preceding.saturating_mul(u64::from(self.limit())))
    }

    pub fn limit(&self) -> u32 {
        self.limit.unwrap_or(DEFAULT_LIMIT)
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TaskPage {
    pub tasks: Vec<Task>,
    pub total: u64,
    pub page: i64,
    pub total_pages: u64,
}

impl TaskPage {
    pub fn total_pages(total: u64, limit: u32) -> u64 {
        total.div_ceil(u64::from(limit.max(1)))
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TaskStats {
    pub total: u64,
    pub completed: u64,
    pub in_progress: u64,
    pub todo: u64,
}

impl TaskStats {
    /// Completed share of all tasks, rounded to a whole percent.
    pub fn completion_rate(&self) -> u64 {
        if self.total == 0 {
            return 0;
        }
        (self.completed * 100 + self.total / 2) / self.total
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn task_serializes_with_camel_case_fields() {
        let now = Utc::now();
        let task = Task {
            id: TaskId::generate(),
            title: "Write report".to_string(),
            description: None,
            status: TaskStatus::InProgress,
            priority: TaskPriority::Urgent,
            owner: UserId::new("u-1"),
            due_date: None,
            completed_at: None,
            created_at: now,
            updated_at: now,
        };

        let value = serde_json::to_value(&task).unwrap();
        assert_eq!(value["status"], "in_progress");
        assert_eq!(value["priority"], "urgent");
        assert_eq!(value["userId"], "u-1");
        assert!(value.get("createdAt").is_some());
        assert!(value.get("completedAt").is_none());
    }

    #[test]
    fn cancelled_is_not_a_status() {
        let result = serde_json::from_str::<TaskStatus>("\"cancelled\"");
        assert!(result.is_err());
    }

    #[test]
    fn update_request_rejects_owner_field() {
        let result = serde_json::from_str::<UpdateTaskRequest>(r#"{"userId":"someone-else"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn list_query_defaults() {
        let query = TaskListQuery::default();
        assert_eq!(query.page(), 1);
        assert_eq!(query.limit(), 10);
    }

    #[rstest]
    #[case(Some(1), Some(10), Some(0))]
    #[case(Some(3), Some(10), Some(20))]
    #[case(None, Some(25), Some(0))]
    #[case(Some(0), None, None)]
    #[case(Some(-4), None, None)]
    #[case(Some(i64::MAX), Some(100), Some(u64::MAX))]
    fn list_query_offset(
        #[case] page: Option<i64>,
        #[case] limit: Option<u32>,
        #[case] expected: Option<u64>,
    ) {
        let query = TaskListQuery {
            page,
            limit,
            ..TaskListQuery::default()
        };
        assert_eq!(query.offset(), expected);
    }

    #[rstest]
    #[case(0, 10, 0)]
    #[case(1, 10, 1)]
    #[case(10, 10, 1)]
    #[case(11, 10, 2)]
    #[case(25, 7, 4)]
    fn total_pages_rounds_up(#[case] total: u64, #[case] limit: u32, #[case] expected: u64) {
        assert_eq!(TaskPage::total_pages(total, limit), expected);
    }

    #[rstest]
    #[case(TaskStatus::Todo, TaskStatus::InProgress)]
    #[case(TaskStatus::InProgress, TaskStatus::Completed)]
    #[case(TaskStatus::Completed, TaskStatus::Todo)]
    fn status_cycles(#[case] from: TaskStatus, #[case] to: TaskStatus) {
        assert_eq!(from.next(), to);
    }

    #[test]
    fn completion_rate_of_empty_stats_is_zero() {
        assert_eq!(TaskStats::default().completion_rate(), 0);
        let stats = TaskStats {
            total: 3,
            completed: 2,
            in_progress: 0,
            todo: 1,
        };
        assert_eq!(stats.completion_rate(), 67);
    }
}
