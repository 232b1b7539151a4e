// src/services/task_service.rs

use std::sync::Arc;

use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{NewTask, TaskFilter, TaskStore},
    models::task::{Task, TaskStatus, TaskSummary},
};

#[derive(Clone)]
pub struct TaskService {
    tasks: Arc<dyn TaskStore>,
}

impl TaskService {
    pub fn new(tasks: Arc<dyn TaskStore>) -> Self {
        Self { tasks }
    }

    pub async fn list_tasks(&self, filter: TaskFilter) -> Result<Vec<TaskSummary>, AppError> {
        self.tasks.list_tasks(filter).await
    }

    pub async fn create_task(&self, task: NewTask) -> Result<Task, AppError> {
        let created = self.tasks.insert_task(task).await?;
        tracing::info!(task_id = %created.id, kind = ?created.task_type, "🗂️ Tarefa criada");
        Ok(created)
    }

    /// toggleTaskStatus: o novo status é o oposto do que o cliente *viu*
    /// (`current_status`), não do que está gravado. Dois cliques vindos da
    /// mesma tela convergem para o mesmo valor.
    pub async fn toggle_task_status(
        &self,
        id: Uuid,
        current_status: TaskStatus,
    ) -> Result<Task, AppError> {
        let next = current_status.toggled();
        self.tasks
            .set_task_status(id, next)
            .await?
            .ok_or(AppError::TaskNotFound(id))
    }

    pub async fn delete_task(&self, id: Uuid) -> Result<(), AppError> {
        if !self.tasks.delete_task(id).await? {
            return Err(AppError::TaskNotFound(id));
        }
        tracing::info!(task_id = %id, "🗑️ Tarefa removida");
        Ok(())
    }
}
