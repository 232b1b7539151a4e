// src/client/dashboard.rs
// Lista de tarefas do dashboard com ações otimistas.

use uuid::Uuid;

use crate::{
    client::{
        api::{ClientError, TaskApi},
        optimistic::{self, Notice},
    },
    models::task::TaskSummary,
};

pub struct TaskBoard<A> {
    api: A,
    tasks: Vec<TaskSummary>,
    notices: Vec<Notice>,
    reload_required: bool,
}

impl<A: TaskApi> TaskBoard<A> {
    pub fn new(api: A) -> Self {
        Self { api, tasks: Vec::new(), notices: Vec::new(), reload_required: false }
    }

    pub fn with_tasks(api: A, tasks: Vec<TaskSummary>) -> Self {
        Self { tasks, ..Self::new(api) }
    }

    pub fn tasks(&self) -> &[TaskSummary] {
        &self.tasks
    }

    /// Verdadeiro depois de uma exclusão que falhou: a lista local pode estar divergente.
    pub fn reload_required(&self) -> bool {
        self.reload_required
    }

    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    pub async fn refresh(&mut self) -> Result<(), ClientError> {
        match self.api.list_tasks().await {
            Ok(tasks) => {
                self.tasks = tasks;
                self.reload_required = false;
                Ok(())
            }
            Err(e) => {
                tracing::error!(error = %e, "falha ao carregar tarefas");
                self.notices.push(Notice::Error("Could not load tasks".into()));
                Err(e)
            }
        }
    }

    /// Inverte Open/Done na hora; desfaz se o servidor recusar.
    pub async fn toggle(&mut self, task_id: Uuid) -> Result<(), ClientError> {
        let current = self
            .tasks
            .iter()
            .find(|t| t.task.id == task_id)
            .map(|t| t.task.status)
            .ok_or(ClientError::UnknownTask(task_id))?;
        let target = current.toggled();

        let remote = self.api.toggle_task_status(task_id, current);
        let result = optimistic::execute(
            &mut self.tasks,
            |tasks| {
                if let Some(t) = tasks.iter_mut().find(|t| t.task.id == task_id) {
                    t.task.status = target;
                }
            },
            remote,
        )
        .await;

        match result {
            Ok(updated) => {
                if let Some(t) = self.tasks.iter_mut().find(|t| t.task.id == task_id) {
                    t.task = updated;
                }
                self.notices.push(Notice::Success(format!("Task marked as {target:?}")));
                Ok(())
            }
            Err(e) => {
                tracing::error!(%task_id, error = %e, "falha ao alternar tarefa");
                self.notices.push(Notice::Error("Failed to update task".into()));
                Err(e)
            }
        }
    }

    /// Remove da lista na hora; se falhar, restaura e pede recarga.
    pub async fn delete(&mut self, task_id: Uuid) -> Result<(), ClientError> {
        if !self.tasks.iter().any(|t| t.task.id == task_id) {
            return Err(ClientError::UnknownTask(task_id));
        }

        let remote = self.api.delete_task(task_id);
        let result = optimistic::execute(
            &mut self.tasks,
            |tasks| tasks.retain(|t| t.task.id != task_id),
            remote,
        )
        .await;

        match result {
            Ok(()) => {
                self.notices.push(Notice::Success("Task deleted".into()));
                Ok(())
            }
            Err(e) => {
                tracing::error!(%task_id, error = %e, "falha ao excluir tarefa");
                self.notices.push(Notice::Error("Failed to delete task".into()));
                self.reload_required = true;
                Err(e)
            }
        }
    }
}
