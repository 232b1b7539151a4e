// src/db/task_repo.rs

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{NewTask, TaskFilter, TaskStore},
    models::task::{
        CompanySummary, ServiceRequestSummary, Task, TaskStatus, TaskSummary, TaskType,
    },
};

const TASK_COLUMNS: &str = "id, title, description, status, task_type, due_date, \
     assigned_to_user_id, service_request_id, created_at, updated_at";

// Linha "achatada" do JOIN tasks + service_requests + companies
#[derive(Debug, FromRow)]
struct TaskRow {
    id: Uuid,
    title: String,
    description: Option<String>,
    status: TaskStatus,
    task_type: TaskType,
    due_date: Option<NaiveDate>,
    assigned_to_user_id: Option<Uuid>,
    service_request_id: Option<Uuid>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    sr_title: Option<String>,
    company_id: Option<Uuid>,
    company_name: Option<String>,
}

impl From<TaskRow> for TaskSummary {
    fn from(row: TaskRow) -> Self {
        let company = match (row.company_id, row.company_name) {
            (Some(id), Some(name)) => Some(CompanySummary { id, name }),
            _ => None,
        };
        // O JOIN pode não achar o pedido (FK anulada), então só montamos se houver título
        let service_request = match (row.service_request_id, row.sr_title) {
            (Some(id), Some(title)) => Some(ServiceRequestSummary { id, title, company }),
            _ => None,
        };

        TaskSummary {
            task: Task {
                id: row.id,
                title: row.title,
                description: row.description,
                status: row.status,
                task_type: row.task_type,
                due_date: row.due_date,
                assigned_to_user_id: row.assigned_to_user_id,
                service_request_id: row.service_request_id,
                created_at: row.created_at,
                updated_at: row.updated_at,
            },
            service_request,
        }
    }
}

#[derive(Clone)]
pub struct PgTaskRepository {
    pool: PgPool,
}

impl PgTaskRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TaskStore for PgTaskRepository {
    async fn list_tasks(&self, filter: TaskFilter) -> Result<Vec<TaskSummary>, AppError> {
        let rows = sqlx::query_as::<_, TaskRow>(
            r#"
            SELECT
                t.id, t.title, t.description, t.status, t.task_type, t.due_date,
                t.assigned_to_user_id, t.service_request_id, t.created_at, t.updated_at,
                sr.title AS sr_title,
                c.id AS company_id,
                c.name AS company_name
            FROM tasks t
            LEFT JOIN service_requests sr ON sr.id = t.service_request_id
            LEFT JOIN companies c ON c.id = sr.company_id
            WHERE ($1::task_status IS NULL OR t.status = $1)
            ORDER BY (t.status = 'Done') ASC, t.due_date ASC NULLS LAST, t.created_at ASC
            "#,
        )
        .bind(filter.status)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(TaskSummary::from).collect())
    }

    async fn insert_task(&self, task: NewTask) -> Result<Task, AppError> {
        let created = sqlx::query_as::<_, Task>(&format!(
            r#"
            INSERT INTO tasks (
                title, description, status, task_type, due_date,
                assigned_to_user_id, service_request_id
            )
            VALUES ($1, $2, 'Open', $3, $4, $5, $6)
            RETURNING {TASK_COLUMNS}
            "#
        ))
        .bind(&task.title)
        .bind(&task.description)
        .bind(task.task_type)
        .bind(task.due_date)
        .bind(task.assigned_to_user_id)
        .bind(task.service_request_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(created)
    }

    async fn set_task_status(&self, id: Uuid, status: TaskStatus) -> Result<Option<Task>, AppError> {
        let task = sqlx::query_as::<_, Task>(&format!(
            "UPDATE tasks SET status = $2, updated_at = NOW() WHERE id = $1 RETURNING {TASK_COLUMNS}"
        ))
        .bind(id)
        .bind(status)
        .fetch_optional(&self.pool)
        .await?;
        Ok(task)
    }

    async fn delete_task(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
