// src/db/memory.rs

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{
        InitialDocument, LeadFilter, LeadPatch, LeadStore, NewDocument, NewLead, NewTask,
        TaskFilter, TaskStore,
    },
    models::{
        lead::{Document, Lead, LeadStatus, StatusEvent},
        task::{CompanySummary, ServiceRequestSummary, Task, TaskStatus, TaskSummary},
    },
};

#[derive(Default)]
struct MemoryState {
    leads: HashMap<Uuid, Lead>,
    // Vetores em ordem de inserção = ordem cronológica
    status_events: Vec<StatusEvent>,
    documents: Vec<Document>,
    tasks: HashMap<Uuid, Task>,
    service_requests: HashMap<Uuid, ServiceRequestSummary>,
}

/// Store em memória para desenvolvimento (sem DATABASE_URL) e testes.
#[derive(Default)]
pub struct MemoryStore {
    state: RwLock<MemoryState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cadastra um pedido de serviço (e empresa) para as tarefas referenciarem.
    pub async fn insert_service_request(
        &self,
        title: &str,
        company_name: Option<&str>,
    ) -> ServiceRequestSummary {
        let summary = ServiceRequestSummary {
            id: Uuid::new_v4(),
            title: title.to_string(),
            company: company_name.map(|name| CompanySummary {
                id: Uuid::new_v4(),
                name: name.to_string(),
            }),
        };
        self.state
            .write()
            .await
            .service_requests
            .insert(summary.id, summary.clone());
        summary
    }
}

#[async_trait]
impl LeadStore for MemoryStore {
    async fn create_lead(
        &self,
        lead: NewLead,
        creation_comment: Option<&str>,
        documents: Vec<InitialDocument>,
    ) -> Result<Lead, AppError> {
        // Um único write lock: lead, evento e documentos entram juntos ou nada entra
        let mut state = self.state.write().await;

        if state.leads.values().any(|l| l.portal_token == lead.portal_token) {
            return Err(AppError::UniqueConstraintViolation(format!(
                "A referência '{}' já existe.",
                lead.reference_id
            )));
        }

        let now = Utc::now();
        let created = Lead {
            id: Uuid::new_v4(),
            reference_id: lead.reference_id,
            portal_token: lead.portal_token,
            full_name: lead.full_name,
            first_name: lead.first_name,
            last_name: lead.last_name,
            email: lead.email,
            phone: lead.phone,
            company_name: lead.company_name,
            service_type: lead.service_type,
            industry: lead.industry,
            urgency: lead.urgency,
            budget_range: lead.budget_range,
            source: lead.source,
            lead_score: None,
            priority_tag: None,
            message: lead.message,
            status: LeadStatus::NEW,
            last_step_completed: lead.last_step_completed,
            device_metadata: lead.device_metadata,
            submitted_at: lead.submitted.then_some(now),
            created_at: now,
            updated_at: now,
        };
        state.status_events.push(StatusEvent {
            id: Uuid::new_v4(),
            lead_id: created.id,
            old_status: None,
            new_status: LeadStatus::NEW,
            comment: creation_comment.map(str::to_string),
            created_at: now,
        });
        state.documents.extend(documents.into_iter().map(|doc| Document {
            id: Uuid::new_v4(),
            lead_id: created.id,
            name: doc.name,
            file_type: doc.file_type,
            size: doc.size,
            source: doc.source,
            created_at: now,
        }));
        state.leads.insert(created.id, created.clone());
        Ok(created)
    }

    async fn update_lead(&self, id: Uuid, patch: LeadPatch) -> Result<Option<Lead>, AppError> {
        let mut state = self.state.write().await;
        let Some(lead) = state.leads.get_mut(&id) else {
            return Ok(None);
        };

        if let Some(name) = patch.name {
            lead.full_name = name.full;
            lead.first_name = name.first;
            lead.last_name = name.last;
        }

        fn keep_or_set(slot: &mut Option<String>, value: Option<String>) {
            if value.is_some() {
                *slot = value;
            }
        }

        if let Some(email) = patch.email {
            lead.email = email;
        }
        keep_or_set(&mut lead.phone, patch.phone);
        keep_or_set(&mut lead.company_name, patch.company_name);
        keep_or_set(&mut lead.service_type, patch.service_type);
        keep_or_set(&mut lead.industry, patch.industry);
        keep_or_set(&mut lead.urgency, patch.urgency);
        keep_or_set(&mut lead.budget_range, patch.budget_range);
        keep_or_set(&mut lead.source, patch.source);
        keep_or_set(&mut lead.message, patch.message);
        keep_or_set(&mut lead.priority_tag, patch.priority_tag);

        if let Some(step) = patch.last_step_completed {
            lead.last_step_completed = lead.last_step_completed.max(step);
        }
        if patch.device_metadata.is_some() {
            lead.device_metadata = patch.device_metadata;
        }
        if patch.submitted && lead.submitted_at.is_none() {
            lead.submitted_at = Some(Utc::now());
        }
        if patch.lead_score.is_some() {
            lead.lead_score = patch.lead_score;
        }
        lead.updated_at = Utc::now();

        Ok(Some(lead.clone()))
    }

    async fn find_lead(&self, id: Uuid) -> Result<Option<Lead>, AppError> {
        Ok(self.state.read().await.leads.get(&id).cloned())
    }

    async fn find_lead_by_token(&self, token: &str) -> Result<Option<Lead>, AppError> {
        let state = self.state.read().await;
        Ok(state.leads.values().find(|l| l.portal_token == token).cloned())
    }

    async fn list_leads(&self, filter: LeadFilter) -> Result<Vec<Lead>, AppError> {
        let state = self.state.read().await;
        let mut leads: Vec<Lead> = state
            .leads
            .values()
            .filter(|l| filter.status.is_none_or(|s| l.status == s))
            .cloned()
            .collect();
        leads.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(leads)
    }

    async fn set_status(
        &self,
        id: Uuid,
        new_status: LeadStatus,
        comment: Option<&str>,
    ) -> Result<Option<(Lead, Option<StatusEvent>)>, AppError> {
        let mut state = self.state.write().await;
        let Some(lead) = state.leads.get_mut(&id) else {
            return Ok(None);
        };

        if lead.status == new_status {
            return Ok(Some((lead.clone(), None)));
        }

        let now = Utc::now();
        let event = StatusEvent {
            id: Uuid::new_v4(),
            lead_id: id,
            old_status: Some(lead.status),
            new_status,
            comment: comment.map(str::to_string),
            created_at: now,
        };
        lead.status = new_status;
        lead.updated_at = now;
        let lead = lead.clone();

        state.status_events.push(event.clone());
        Ok(Some((lead, Some(event))))
    }

    async fn list_status_events(&self, lead_id: Uuid) -> Result<Vec<StatusEvent>, AppError> {
        let state = self.state.read().await;
        Ok(state
            .status_events
            .iter()
            .filter(|e| e.lead_id == lead_id)
            .cloned()
            .collect())
    }

    async fn add_document(&self, document: NewDocument) -> Result<Document, AppError> {
        let doc = Document {
            id: Uuid::new_v4(),
            lead_id: document.lead_id,
            name: document.name,
            file_type: document.file_type,
            size: document.size,
            source: document.source,
            created_at: Utc::now(),
        };
        self.state.write().await.documents.push(doc.clone());
        Ok(doc)
    }

    async fn list_documents(&self, lead_id: Uuid) -> Result<Vec<Document>, AppError> {
        let state = self.state.read().await;
        Ok(state
            .documents
            .iter()
            .filter(|d| d.lead_id == lead_id)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl TaskStore for MemoryStore {
    async fn list_tasks(&self, filter: TaskFilter) -> Result<Vec<TaskSummary>, AppError> {
        let state = self.state.read().await;
        let mut tasks: Vec<TaskSummary> = state
            .tasks
            .values()
            .filter(|t| filter.status.is_none_or(|s| t.status == s))
            .map(|t| TaskSummary {
                task: t.clone(),
                service_request: t
                    .service_request_id
                    .and_then(|id| state.service_requests.get(&id).cloned()),
            })
            .collect();

        // Abertas primeiro; sem vencimento vai para o fim
        tasks.sort_by(|a, b| {
            let a = &a.task;
            let b = &b.task;
            (a.status == TaskStatus::Done)
                .cmp(&(b.status == TaskStatus::Done))
                .then_with(|| match (a.due_date, b.due_date) {
                    (Some(x), Some(y)) => x.cmp(&y),
                    (Some(_), None) => std::cmp::Ordering::Less,
                    (None, Some(_)) => std::cmp::Ordering::Greater,
                    (None, None) => std::cmp::Ordering::Equal,
                })
                .then_with(|| a.created_at.cmp(&b.created_at))
        });
        Ok(tasks)
    }

    async fn insert_task(&self, task: NewTask) -> Result<Task, AppError> {
        let now = Utc::now();
        let created = Task {
            id: Uuid::new_v4(),
            title: task.title,
            description: task.description,
            status: TaskStatus::Open,
            task_type: task.task_type,
            due_date: task.due_date,
            assigned_to_user_id: task.assigned_to_user_id,
            service_request_id: task.service_request_id,
            created_at: now,
            updated_at: now,
        };
        self.state.write().await.tasks.insert(created.id, created.clone());
        Ok(created)
    }

    async fn set_task_status(&self, id: Uuid, status: TaskStatus) -> Result<Option<Task>, AppError> {
        let mut state = self.state.write().await;
        Ok(state.tasks.get_mut(&id).map(|task| {
            task.status = status;
            task.updated_at = Utc::now();
            task.clone()
        }))
    }

    async fn delete_task(&self, id: Uuid) -> Result<bool, AppError> {
        Ok(self.state.write().await.tasks.remove(&id).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::NameParts;
    use crate::models::lead::{DocumentSource, Stage};
    use crate::models::task::TaskType;
    use chrono::NaiveDate;

    fn new_lead(token: &str) -> NewLead {
        NewLead {
            reference_id: format!("QT-TEST-{token}"),
            portal_token: token.to_string(),
            full_name: "Jane Doe".into(),
            first_name: "Jane".into(),
            last_name: Some("Doe".into()),
            email: "jane@x.co".into(),
            phone: None,
            company_name: None,
            service_type: Some("Tax".into()),
            industry: None,
            urgency: None,
            budget_range: None,
            source: None,
            message: None,
            last_step_completed: 1,
            device_metadata: None,
            submitted: false,
        }
    }

    fn new_task(title: &str, due: Option<NaiveDate>) -> NewTask {
        NewTask {
            title: title.into(),
            description: None,
            task_type: TaskType::FollowUp,
            due_date: due,
            assigned_to_user_id: None,
            service_request_id: None,
        }
    }

    fn wizard_doc(name: &str) -> InitialDocument {
        InitialDocument {
            name: name.into(),
            file_type: Some("application/pdf".into()),
            size: Some(2048),
            source: DocumentSource::Wizard,
        }
    }

    #[tokio::test]
    async fn create_records_lead_event_and_documents_together() {
        let store = MemoryStore::new();
        let lead = store
            .create_lead(new_lead("tok-new"), Some("captured"), vec![wizard_doc("IRP5.pdf")])
            .await
            .unwrap();

        let events = store.list_status_events(lead.id).await.unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].old_status, None);
        assert_eq!(events[0].new_status, LeadStatus::NEW);
        assert_eq!(events[0].comment.as_deref(), Some("captured"));

        let docs = store.list_documents(lead.id).await.unwrap();
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].lead_id, lead.id);
    }

    #[tokio::test]
    async fn rejected_create_leaves_nothing_behind() {
        let store = MemoryStore::new();
        store.create_lead(new_lead("tok-dup"), None, Vec::new()).await.unwrap();

        let err = store
            .create_lead(new_lead("tok-dup"), None, vec![wizard_doc("ID.pdf")])
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::UniqueConstraintViolation(_)));

        let state = store.state.read().await;
        assert_eq!(state.leads.len(), 1);
        assert_eq!(state.status_events.len(), 1);
        assert!(state.documents.is_empty());
    }

    #[tokio::test]
    async fn list_returns_every_lead_without_row_cap() {
        let store = MemoryStore::new();
        for i in 0..501 {
            store
                .create_lead(new_lead(&format!("tok-{i}")), None, Vec::new())
                .await
                .unwrap();
        }
        let all = store.list_leads(LeadFilter::default()).await.unwrap();
        assert_eq!(all.len(), 501);
        assert!(all.windows(2).all(|w| w[0].created_at >= w[1].created_at));
    }

    #[tokio::test]
    async fn update_keeps_unset_fields_and_step_only_moves_forward() {
        let store = MemoryStore::new();
        let lead = store.create_lead(new_lead("tok-a"), None, Vec::new()).await.unwrap();

        let patch = LeadPatch {
            industry: Some("Agriculture".into()),
            last_step_completed: Some(3),
            ..Default::default()
        };
        let updated = store.update_lead(lead.id, patch).await.unwrap().unwrap();
        assert_eq!(updated.industry.as_deref(), Some("Agriculture"));
        assert_eq!(updated.service_type.as_deref(), Some("Tax"));
        assert_eq!(updated.last_step_completed, 3);

        let patch = LeadPatch { last_step_completed: Some(2), ..Default::default() };
        let updated = store.update_lead(lead.id, patch).await.unwrap().unwrap();
        assert_eq!(updated.last_step_completed, 3);
    }

    #[tokio::test]
    async fn renaming_to_single_word_clears_last_name() {
        let store = MemoryStore::new();
        let lead = store.create_lead(new_lead("tok-b"), None, Vec::new()).await.unwrap();
        let patch = LeadPatch {
            name: Some(NameParts { full: "Thabo".into(), first: "Thabo".into(), last: None }),
            ..Default::default()
        };
        let updated = store.update_lead(lead.id, patch).await.unwrap().unwrap();
        assert_eq!(updated.last_name, None);
    }

    #[tokio::test]
    async fn submitted_at_is_set_once() {
        let store = MemoryStore::new();
        let lead = store.create_lead(new_lead("tok-c"), None, Vec::new()).await.unwrap();
        let first = store
            .update_lead(lead.id, LeadPatch { submitted: true, ..Default::default() })
            .await
            .unwrap()
            .unwrap();
        let stamp = first.submitted_at.expect("submitted");
        let second = store
            .update_lead(lead.id, LeadPatch { submitted: true, ..Default::default() })
            .await
            .unwrap()
            .unwrap();
        assert_eq!(second.submitted_at, Some(stamp));
    }

    #[tokio::test]
    async fn status_change_appends_event_and_same_status_does_not() {
        let store = MemoryStore::new();
        let lead = store.create_lead(new_lead("tok-d"), None, Vec::new()).await.unwrap();
        let contacted = LeadStatus::Active(Stage::Contacted);

        let (updated, event) = store.set_status(lead.id, contacted, Some("called")).await.unwrap().unwrap();
        assert_eq!(updated.status, contacted);
        let event = event.expect("event recorded");
        assert_eq!(event.old_status, Some(LeadStatus::NEW));
        assert_eq!(event.comment.as_deref(), Some("called"));

        let (_, none) = store.set_status(lead.id, contacted, None).await.unwrap().unwrap();
        assert!(none.is_none());
        // criação + Contacted
        assert_eq!(store.list_status_events(lead.id).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn set_status_on_unknown_lead_returns_none() {
        let store = MemoryStore::new();
        let result = store.set_status(Uuid::new_v4(), LeadStatus::Lost, None).await.unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn tasks_list_open_first_then_by_due_date() {
        let store = MemoryStore::new();
        let late = store
            .insert_task(new_task("late", NaiveDate::from_ymd_opt(2026, 12, 1)))
            .await
            .unwrap();
        let soon = store
            .insert_task(new_task("soon", NaiveDate::from_ymd_opt(2026, 10, 20)))
            .await
            .unwrap();
        let undated = store.insert_task(new_task("undated", None)).await.unwrap();
        store.set_task_status(soon.id, TaskStatus::Done).await.unwrap();

        let titles: Vec<String> = store
            .list_tasks(TaskFilter::default())
            .await
            .unwrap()
            .into_iter()
            .map(|t| t.task.title)
            .collect();
        assert_eq!(titles, vec!["late", "undated", "soon"]);
        assert_ne!(late.id, undated.id);
    }

    #[tokio::test]
    async fn task_summary_embeds_service_request_and_company() {
        let store = MemoryStore::new();
        let sr = store
            .insert_service_request("Annual financial statements", Some("Karoo Logistics"))
            .await;
        let mut task = new_task("Collect trial balance", None);
        task.service_request_id = Some(sr.id);
        store.insert_task(task).await.unwrap();

        let listed = store.list_tasks(TaskFilter::default()).await.unwrap();
        let embedded = listed[0].service_request.as_ref().expect("embedded");
        assert_eq!(embedded.title, "Annual financial statements");
        assert_eq!(embedded.company.as_ref().unwrap().name, "Karoo Logistics");
    }

    #[tokio::test]
    async fn delete_reports_whether_task_existed() {
        let store = MemoryStore::new();
        let task = store.insert_task(new_task("x", None)).await.unwrap();
        assert!(store.delete_task(task.id).await.unwrap());
        assert!(!store.delete_task(task.id).await.unwrap());
    }
}
