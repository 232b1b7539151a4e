// src/app.rs

use axum::{
    routing::{delete, get, patch, post},
    Router,
};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{config::AppState, docs::ApiDoc, handlers};

/// Monta o router completo. Usado pelo `main` e pelos testes de API.
pub fn router(app_state: AppState) -> Router {
    // Wizard + portal (públicos)
    let quote_routes = Router::new()
        .route("/quote", post(handlers::leads::save_quote))
        .route("/portal/{token}", get(handlers::portal::get_portal_lead))
        .route("/portal/{token}/documents", post(handlers::portal::upload_document));

    // Dashboard interno
    let lead_routes = Router::new()
        .route("/", get(handlers::leads::list_leads))
        .route(
            "/{id}",
            get(handlers::leads::get_lead).patch(handlers::leads::update_triage),
        )
        .route("/{id}/status", patch(handlers::leads::change_status))
        .route("/{id}/documents", post(handlers::leads::add_document));

    let task_routes = Router::new()
        .route(
            "/",
            get(handlers::tasks::list_tasks).post(handlers::tasks::create_task),
        )
        .route("/{id}", delete(handlers::tasks::delete_task))
        .route("/{id}/toggle", post(handlers::tasks::toggle_task_status));

    Router::new()
        .route("/api/health", get(|| async { "OK" }))
        .nest("/api/leads", quote_routes.merge(lead_routes))
        .nest("/api/tasks", task_routes)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}
