// src/db/lead_repo.rs

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{InitialDocument, LeadFilter, LeadPatch, LeadStore, NewDocument, NewLead},
    models::lead::{Document, Lead, LeadStatus, StatusEvent},
};

// O repositório de leads, responsável pelas tabelas 'leads', 'lead_documents' e 'lead_status_events'
#[derive(Clone)]
pub struct PgLeadRepository {
    pool: PgPool,
}

impl PgLeadRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LeadStore for PgLeadRepository {
    async fn create_lead(
        &self,
        lead: NewLead,
        creation_comment: Option<&str>,
        documents: Vec<InitialDocument>,
    ) -> Result<Lead, AppError> {
        let mut tx = self.pool.begin().await?;

        let created = sqlx::query_as::<_, Lead>(
            r#"
            INSERT INTO leads (
                reference_id, portal_token, full_name, first_name, last_name,
                email, phone, company_name, service_type, industry, urgency,
                budget_range, source, message, status, last_step_completed,
                device_metadata, submitted_at
            )
            VALUES (
                $1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14,
                $15, $16, $17, CASE WHEN $18 THEN NOW() ELSE NULL END
            )
            RETURNING *
            "#,
        )
        .bind(&lead.reference_id)
        .bind(&lead.portal_token)
        .bind(&lead.full_name)
        .bind(&lead.first_name)
        .bind(&lead.last_name)
        .bind(&lead.email)
        .bind(&lead.phone)
        .bind(&lead.company_name)
        .bind(&lead.service_type)
        .bind(&lead.industry)
        .bind(&lead.urgency)
        .bind(&lead.budget_range)
        .bind(&lead.source)
        .bind(&lead.message)
        .bind(LeadStatus::NEW)
        .bind(lead.last_step_completed)
        .bind(&lead.device_metadata)
        .bind(lead.submitted)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            // Token e referência são únicos; colisão aqui é praticamente impossível
            if let Some(db_err) = e.as_database_error() {
                if db_err.is_unique_violation() {
                    return AppError::UniqueConstraintViolation(format!(
                        "A referência '{}' já existe.",
                        lead.reference_id
                    ));
                }
            }
            AppError::from(e)
        })?;

        sqlx::query(
            r#"
            INSERT INTO lead_status_events (lead_id, old_status, new_status, comment)
            VALUES ($1, NULL, $2, $3)
            "#,
        )
        .bind(created.id)
        .bind(LeadStatus::NEW)
        .bind(creation_comment)
        .execute(&mut *tx)
        .await?;

        for doc in documents {
            sqlx::query(
                r#"
                INSERT INTO lead_documents (lead_id, name, file_type, size, source)
                VALUES ($1, $2, $3, $4, $5)
                "#,
            )
            .bind(created.id)
            .bind(&doc.name)
            .bind(&doc.file_type)
            .bind(doc.size)
            .bind(doc.source)
            .execute(&mut *tx)
            .await?;
        }

        // Sem commit (erro acima), o drop da transação faz rollback
        tx.commit().await?;

        Ok(created)
    }

    async fn update_lead(&self, id: Uuid, patch: LeadPatch) -> Result<Option<Lead>, AppError> {
        let (full_name, first_name, last_name) = match patch.name {
            Some(name) => (Some(name.full), Some(name.first), name.last),
            None => (None, None, None),
        };

        let lead = sqlx::query_as::<_, Lead>(
            r#"
            UPDATE leads SET
                full_name = COALESCE($2, full_name),
                first_name = COALESCE($3, first_name),
                last_name = CASE WHEN $2::text IS NULL THEN last_name ELSE $4 END,
                email = COALESCE($5, email),
                phone = COALESCE($6, phone),
                company_name = COALESCE($7, company_name),
                service_type = COALESCE($8, service_type),
                industry = COALESCE($9, industry),
                urgency = COALESCE($10, urgency),
                budget_range = COALESCE($11, budget_range),
                source = COALESCE($12, source),
                message = COALESCE($13, message),
                last_step_completed = GREATEST(last_step_completed, COALESCE($14, last_step_completed)),
                device_metadata = COALESCE($15, device_metadata),
                submitted_at = CASE
                    WHEN $16 AND submitted_at IS NULL THEN NOW()
                    ELSE submitted_at
                END,
                lead_score = COALESCE($17, lead_score),
                priority_tag = COALESCE($18, priority_tag),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(full_name)
        .bind(first_name)
        .bind(last_name)
        .bind(patch.email)
        .bind(patch.phone)
        .bind(patch.company_name)
        .bind(patch.service_type)
        .bind(patch.industry)
        .bind(patch.urgency)
        .bind(patch.budget_range)
        .bind(patch.source)
        .bind(patch.message)
        .bind(patch.last_step_completed)
        .bind(patch.device_metadata)
        .bind(patch.submitted)
        .bind(patch.lead_score)
        .bind(patch.priority_tag)
        .fetch_optional(&self.pool)
        .await?;

        Ok(lead)
    }

    async fn find_lead(&self, id: Uuid) -> Result<Option<Lead>, AppError> {
        let lead = sqlx::query_as::<_, Lead>("SELECT * FROM leads WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(lead)
    }

    async fn find_lead_by_token(&self, token: &str) -> Result<Option<Lead>, AppError> {
        let lead = sqlx::query_as::<_, Lead>("SELECT * FROM leads WHERE portal_token = $1")
            .bind(token)
            .fetch_optional(&self.pool)
            .await?;
        Ok(lead)
    }

    async fn list_leads(&self, filter: LeadFilter) -> Result<Vec<Lead>, AppError> {
        let leads = sqlx::query_as::<_, Lead>(
            r#"
            SELECT * FROM leads
            WHERE ($1::text IS NULL OR status = $1)
            ORDER BY created_at DESC
            "#,
        )
        .bind(filter.status)
        .fetch_all(&self.pool)
        .await?;
        Ok(leads)
    }

    async fn set_status(
        &self,
        id: Uuid,
        new_status: LeadStatus,
        comment: Option<&str>,
    ) -> Result<Option<(Lead, Option<StatusEvent>)>, AppError> {
        let mut tx = self.pool.begin().await?;

        // Trava a linha para que o evento grave o status antigo correto
        let current = sqlx::query_as::<_, Lead>("SELECT * FROM leads WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?;

        let Some(current) = current else {
            return Ok(None);
        };

        if current.status == new_status {
            tx.commit().await?;
            return Ok(Some((current, None)));
        }

        let lead = sqlx::query_as::<_, Lead>(
            "UPDATE leads SET status = $2, updated_at = NOW() WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(new_status)
        .fetch_one(&mut *tx)
        .await?;

        let event = sqlx::query_as::<_, StatusEvent>(
            r#"
            INSERT INTO lead_status_events (lead_id, old_status, new_status, comment)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(current.status)
        .bind(new_status)
        .bind(comment)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(Some((lead, Some(event))))
    }

    async fn list_status_events(&self, lead_id: Uuid) -> Result<Vec<StatusEvent>, AppError> {
        let events = sqlx::query_as::<_, StatusEvent>(
            "SELECT * FROM lead_status_events WHERE lead_id = $1 ORDER BY created_at ASC, seq ASC",
        )
        .bind(lead_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(events)
    }

    async fn add_document(&self, document: NewDocument) -> Result<Document, AppError> {
        let doc = sqlx::query_as::<_, Document>(
            r#"
            INSERT INTO lead_documents (lead_id, name, file_type, size, source)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, lead_id, name, file_type, size, source, created_at
            "#,
        )
        .bind(document.lead_id)
        .bind(&document.name)
        .bind(&document.file_type)
        .bind(document.size)
        .bind(document.source)
        .fetch_one(&self.pool)
        .await?;
        Ok(doc)
    }

    async fn list_documents(&self, lead_id: Uuid) -> Result<Vec<Document>, AppError> {
        let docs = sqlx::query_as::<_, Document>(
            r#"
            SELECT id, lead_id, name, file_type, size, source, created_at
            FROM lead_documents
            WHERE lead_id = $1
            ORDER BY created_at ASC
            "#,
        )
        .bind(lead_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(docs)
    }
}
