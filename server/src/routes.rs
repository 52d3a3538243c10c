use actix_web::{
    delete, error::InternalError, get, http::StatusCode, patch, post, web, HttpRequest,
    HttpResponse,
};
use taskdeck_shared::{CreateTaskRequest, TaskId, TaskListQuery, UpdateTaskRequest};

use crate::auth::Caller;
use crate::error::{ErrorBody, TaskError};
use crate::AppState;

/// Registers every route plus the JSON/query decoding error handlers.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(|err, _req: &HttpRequest| {
        let message = err.to_string();
        InternalError::from_response(err, bad_request(message)).into()
    }))
    .app_data(web::QueryConfig::default().error_handler(|err, _req: &HttpRequest| {
        let message = err.to_string();
        InternalError::from_response(err, bad_request(message)).into()
    }))
    .service(create_task)
    .service(list_tasks)
    .service(task_stats)
    .service(get_task)
    .service(update_task)
    .service(delete_task)
    .service(me);
}

fn bad_request(message: String) -> HttpResponse {
    ErrorBody::new(StatusCode::BAD_REQUEST, "Bad request")
        .with_errors(vec![message])
        .into_response()
}

/// Ids that are not UUIDs cannot name a stored task.
fn task_id(raw: &str) -> Result<TaskId, TaskError> {
    raw.parse().map_err(|_| TaskError::NotFound)
}

#[post("/tasks")]
async fn create_task(
    state: web::Data<AppState>,
    caller: Caller,
    body: web::Json<CreateTaskRequest>,
) -> Result<HttpResponse, TaskError> {
    let task = state.tasks.create(body.into_inner(), caller.id()).await?;
    Ok(HttpResponse::Created().json(task))
}

#[get("/tasks")]
async fn list_tasks(
    state: web::Data<AppState>,
    caller: Caller,
    query: web::Query<TaskListQuery>,
) -> Result<HttpResponse, TaskError> {
    let page = state.tasks.list(caller.id(), query.into_inner()).await?;
    Ok(HttpResponse::Ok().json(page))
}

#[get("/tasks/stats")]
async fn task_stats(
    state: web::Data<AppState>,
    caller: Caller,
) -> Result<HttpResponse, TaskError> {
    let stats = state.tasks.stats(caller.id()).await?;
    Ok(HttpResponse::Ok().json(stats))
}

#[get("/tasks/{id}")]
async fn get_task(
    state: web::Data<AppState>,
    caller: Caller,
    path: web::Path<String>,
) -> Result<HttpResponse, TaskError> {
    let task = state.tasks.get(task_id(&path)?, caller.id()).await?;
    Ok(HttpResponse::Ok().json(task))
}

#[patch("/tasks/{id}")]
async fn update_task(
    state: web::Data<AppState>,
    caller: Caller,
    path: web::Path<String>,
    body: web::Json<UpdateTaskRequest>,
) -> Result<HttpResponse, TaskError> {
    let task = state
        .tasks
        .update(task_id(&path)?, body.into_inner(), caller.id())
        .await?;
    Ok(HttpResponse::Ok().json(task))
}

#[delete("/tasks/{id}")]
async fn delete_task(
    state: web::Data<AppState>,
    caller: Caller,
    path: web::Path<String>,
) -> Result<HttpResponse, TaskError> {
    state.tasks.remove(task_id(&path)?, caller.id()).await?;
    Ok(HttpResponse::NoContent().finish())
}

#[get("/auth/me")]
async fn me(state: web::Data<AppState>, caller: Caller) -> Result<HttpResponse, TaskError> {
    let user = state.users.find(caller.id()).await?;
    Ok(HttpResponse::Ok().json(user))
}
