// src/handlers/tasks.rs

use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use utoipa::IntoParams;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::{
        error::AppError,
        extract::{JsonBody, PathParam, QueryParams},
    },
    config::AppState,
    db::{NewTask, TaskFilter},
    models::task::{
        CreateTaskPayload, SuccessResponse, Task, TaskMutationResponse, TaskStatus, TaskSummary,
        ToggleTaskPayload,
    },
};

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct TaskListQuery {
    pub status: Option<TaskStatus>,
}

// GET /api/tasks
#[utoipa::path(
    get,
    path = "/api/tasks",
    tag = "Tasks",
    params(TaskListQuery),
    responses(
        (status = 200, description = "Tarefas com o pedido de serviço/empresa embutidos", body = Vec<TaskSummary>)
    )
)]
pub async fn list_tasks(
    State(app_state): State<AppState>,
    QueryParams(query): QueryParams<TaskListQuery>,
) -> Result<impl IntoResponse, AppError> {
    let tasks = app_state
        .task_service
        .list_tasks(TaskFilter { status: query.status })
        .await?;

    Ok((StatusCode::OK, Json(tasks)))
}

// POST /api/tasks
#[utoipa::path(
    post,
    path = "/api/tasks",
    tag = "Tasks",
    request_body = CreateTaskPayload,
    responses(
        (status = 201, description = "Tarefa criada (Open)", body = Task),
        (status = 400, description = "Dados inválidos")
    )
)]
pub async fn create_task(
    State(app_state): State<AppState>,
    JsonBody(payload): JsonBody<CreateTaskPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let task = app_state
        .task_service
        .create_task(NewTask {
            title: payload.title.trim().to_string(),
            description: payload.description,
            task_type: payload.task_type,
            due_date: payload.due_date,
            assigned_to_user_id: payload.assigned_to_user_id,
            service_request_id: payload.service_request_id,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(task)))
}

// POST /api/tasks/{id}/toggle
#[utoipa::path(
    post,
    path = "/api/tasks/{id}/toggle",
    tag = "Tasks",
    request_body = ToggleTaskPayload,
    params(("id" = Uuid, Path, description = "ID da tarefa")),
    responses(
        (status = 200, description = "Status invertido", body = TaskMutationResponse),
        (status = 404, description = "Tarefa não encontrada")
    )
)]
pub async fn toggle_task_status(
    State(app_state): State<AppState>,
    PathParam(id): PathParam<Uuid>,
    JsonBody(payload): JsonBody<ToggleTaskPayload>,
) -> Result<impl IntoResponse, AppError> {
    let task = app_state
        .task_service
        .toggle_task_status(id, payload.current_status)
        .await?;

    Ok((StatusCode::OK, Json(TaskMutationResponse { success: true, task })))
}

// DELETE /api/tasks/{id}
#[utoipa::path(
    delete,
    path = "/api/tasks/{id}",
    tag = "Tasks",
    params(("id" = Uuid, Path, description = "ID da tarefa")),
    responses(
        (status = 200, description = "Tarefa removida", body = SuccessResponse),
        (status = 404, description = "Tarefa não encontrada")
    )
)]
pub async fn delete_task(
    State(app_state): State<AppState>,
    PathParam(id): PathParam<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    app_state.task_service.delete_task(id).await?;
    Ok((StatusCode::OK, Json(SuccessResponse { success: true })))
}
