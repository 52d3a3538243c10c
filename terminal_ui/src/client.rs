use reqwest::{RequestBuilder, Response, StatusCode};
use serde_json::Value;
use taskdeck_shared::{
    CreateTaskRequest, Task, TaskId, TaskListQuery, TaskPage, TaskStats, UpdateTaskRequest,
};
use thiserror::Error;
use url::Url;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("TASKDECK_TOKEN is not set")]
    MissingToken,

    #[error("invalid server url: {0}")]
    Url(#[from] url::ParseError),

    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("server answered {status}: {message}")]
    Api { status: StatusCode, message: String },
}

/// Thin client over the task API, authenticated with a bearer token.
pub struct TaskClient {
    http: reqwest::Client,
    base: Url,
    token: String,
}

impl TaskClient {
    pub fn new(base: &str, token: impl Into<String>) -> Result<Self, ClientError> {
        let mut base = Url::parse(base)?;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        Ok(Self {
            http: reqwest::Client::new(),
            base,
            token: token.into(),
        })
    }

    pub fn from_env() -> Result<Self, ClientError> {
        let base =
            std::env::var("TASKDECK_URL").unwrap_or_else(|_| "http://localhost:3000".to_string());
        let token = std::env::var("TASKDECK_TOKEN").map_err(|_| ClientError::MissingToken)?;
        Self::new(&base, token)
    }

    fn url(&self, path: &str) -> Result<Url, ClientError> {
        Ok(self.base.join(path)?)
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request.bearer_auth(&self.token)
    }

    pub async fn list(&self, query: &TaskListQuery) -> Result<TaskPage, ClientError> {
        let request = self.http.get(self.url("tasks")?).query(query);
        let response = self.authorized(request).send().await?;
        Ok(checked(response).await?.json().await?)
    }

    pub async fn stats(&self) -> Result<TaskStats, ClientError> {
        let request = self.http.get(self.url("tasks/stats")?);
        let response = self.authorized(request).send().await?;
        Ok(checked(response).await?.json().await?)
    }

    pub async fn create(&self, input: &CreateTaskRequest) -> Result<Task, ClientError> {
        let request = self.http.post(self.url("tasks")?).json(input);
        let response = self.authorized(request).send().await?;
        Ok(checked(response).await?.json().await?)
    }

    pub async fn update(&self, id: TaskId, patch: &UpdateTaskRequest) -> Result<Task, ClientError> {
        let request = self.http.patch(self.url(&format!("tasks/{id}"))?).json(patch);
        let response = self.authorized(request).send().await?;
        Ok(checked(response).await?.json().await?)
    }

    pub async fn delete(&self, id: TaskId) -> Result<(), ClientError> {
        let request = self.http.delete(self.url(&format!("tasks/{id}"))?);
        let response = self.authorized(request).send().await?;
        checked(response).await?;
        Ok(())
    }
}

/// Turns non-success responses into [`ClientError::Api`], keeping the
/// server's message when the body carries one.
async fn checked(response: Response) -> Result<Response, ClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let message = response
        .json::<Value>()
        .await
        .ok()
        .and_then(|body| body.get("message").and_then(Value::as_str).map(str::to_string))
        .unwrap_or_else(|| status.canonical_reason().unwrap_or("error").to_string());
    Err(ClientError::Api { status, message })
}
