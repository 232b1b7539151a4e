// src/client.rs
// Lado do navegador: wizard, dashboard de tarefas e portal, sobre a API HTTP.

pub mod api;
pub mod autosave;
pub mod dashboard;
pub mod optimistic;
pub mod portal;
pub mod wizard;

pub use api::{ClientError, HttpApi, PortalApi, QuoteApi, TaskApi};
