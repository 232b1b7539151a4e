// src/config.rs

use std::{env, sync::Arc, time::Duration};

use anyhow::Context;
use sqlx::postgres::PgPoolOptions;

use crate::{
    common::tokens::MIN_PORTAL_TOKEN_LENGTH,
    db::{MemoryStore, PgLeadRepository, PgTaskRepository},
    services::{LeadService, TaskService},
};

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
const DEFAULT_PORTAL_TOKEN_LENGTH: usize = 24;

/// Configuração lida do ambiente (.env + variáveis do processo).
#[derive(Debug, Clone)]
pub struct Config {
    /// Sem DATABASE_URL o servidor roda com o store em memória.
    pub database_url: Option<String>,
    pub bind_addr: String,
    /// Caracteres do token do portal (mínimo `MIN_PORTAL_TOKEN_LENGTH`).
    pub portal_token_length: usize,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let database_url = env::var("DATABASE_URL").ok().filter(|v| !v.trim().is_empty());
        let bind_addr = env::var("BIND_ADDR").unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string());
        let portal_token_length =
            parse_portal_token_length(env::var("PORTAL_TOKEN_LENGTH").ok().as_deref())?;

        Ok(Self { database_url, bind_addr, portal_token_length })
    }
}

fn parse_portal_token_length(raw: Option<&str>) -> anyhow::Result<usize> {
    let Some(raw) = raw else {
        return Ok(DEFAULT_PORTAL_TOKEN_LENGTH);
    };
    let length: usize = raw
        .trim()
        .parse()
        .with_context(|| format!("PORTAL_TOKEN_LENGTH inválido: '{raw}'"))?;
    if length < MIN_PORTAL_TOKEN_LENGTH {
        anyhow::bail!(
            "PORTAL_TOKEN_LENGTH deve ser pelo menos {MIN_PORTAL_TOKEN_LENGTH} (recebido {length})"
        );
    }
    Ok(length)
}

#[derive(Clone)]
pub struct AppState {
    pub lead_service: LeadService,
    pub task_service: TaskService,
}

impl AppState {
    pub async fn new(config: &Config) -> anyhow::Result<Self> {
        let Some(database_url) = &config.database_url else {
            tracing::warn!("⚠️ DATABASE_URL não definida; usando store em memória (dados somem ao reiniciar)");
            return Ok(Self::in_memory(config.portal_token_length));
        };

        let db_pool = PgPoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(3))
            .connect(database_url)
            .await
            .context("Falha ao conectar ao banco de dados")?;

        tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

        sqlx::migrate!()
            .run(&db_pool)
            .await
            .context("Falha ao rodar as migrações do banco de dados")?;

        tracing::info!("✅ Migrações do banco de dados executadas com sucesso!");

        // --- Monta o gráfico de dependências ---
        let lead_repo = Arc::new(PgLeadRepository::new(db_pool.clone()));
        let task_repo = Arc::new(PgTaskRepository::new(db_pool));

        Ok(Self {
            lead_service: LeadService::new(lead_repo, config.portal_token_length),
            task_service: TaskService::new(task_repo),
        })
    }

    pub fn in_memory(portal_token_length: usize) -> Self {
        Self::with_memory_store(Arc::new(MemoryStore::new()), portal_token_length)
    }

    /// Útil nos testes que precisam semear o store diretamente.
    pub fn with_memory_store(store: Arc<MemoryStore>, portal_token_length: usize) -> Self {
        Self {
            lead_service: LeadService::new(store.clone(), portal_token_length),
            task_service: TaskService::new(store),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_length_defaults_when_unset() {
        assert_eq!(parse_portal_token_length(None).unwrap(), DEFAULT_PORTAL_TOKEN_LENGTH);
    }

    #[test]
    fn token_length_accepts_minimum_and_above() {
        assert_eq!(parse_portal_token_length(Some("16")).unwrap(), 16);
        assert_eq!(parse_portal_token_length(Some(" 32 ")).unwrap(), 32);
    }

    #[test]
    fn short_or_garbage_token_length_is_rejected() {
        let err = parse_portal_token_length(Some("8")).unwrap_err();
        assert!(err.to_string().contains("pelo menos 16"));
        assert!(parse_portal_token_length(Some("abc")).is_err());
    }
}
