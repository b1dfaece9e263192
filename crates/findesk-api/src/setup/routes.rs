//! Router assembly: routes, CORS, tracing, and body limits.

use axum::extract::DefaultBodyLimit;
use axum::http::HeaderValue;
use axum::routing::{get, post, put};
use axum::Router;
use findesk_core::Config;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_rapidoc::RapiDoc;

use crate::api_doc::ApiDoc;
use crate::handlers::{
    companies, completion, health, records, settings, storage_locations, workflow_files,
};
use crate::state::AppState;

/// Extra headroom over the configured max file size for multipart framing.
const BODY_LIMIT_SLACK: usize = 1024 * 1024;

pub fn setup_routes(config: &Config, state: Arc<AppState>) -> Router {
    let cors = build_cors_layer(config);

    Router::new()
        .route("/health", get(health::health))
        .route(
            "/api/v0/files",
            post(workflow_files::upload_file).get(workflow_files::list_files),
        )
        .route(
            "/api/v0/files/{id}",
            get(workflow_files::get_file)
                .patch(workflow_files::update_file)
                .delete(workflow_files::delete_file),
        )
        .route(
            "/api/v0/files/{id}/download",
            get(workflow_files::download_file),
        )
        .route("/api/v0/files/{id}/record", get(records::get_record))
        .route(
            "/api/v0/files/{id}/transaction",
            post(records::create_transaction),
        )
        .route(
            "/api/v0/files/{id}/document",
            post(records::attach_document),
        )
        .route(
            "/api/v0/files/{id}/loan-draft",
            put(records::save_loan_draft).get(records::get_loan_draft),
        )
        .route(
            "/api/v0/files/{id}/complete",
            post(completion::complete_file),
        )
        .route(
            "/api/v0/files/{id}/complete-without-record",
            post(completion::complete_without_record),
        )
        .route(
            "/api/v0/completion/recover",
            post(completion::recover_stalled),
        )
        .route(
            "/api/v0/companies",
            get(companies::list_companies).post(companies::create_company),
        )
        .route(
            "/api/v0/companies/{id}/folders",
            get(companies::list_folders),
        )
        .route("/api/v0/folders", post(companies::create_folder))
        .route(
            "/api/v0/bank-accounts",
            get(companies::list_bank_accounts).post(companies::create_bank_account),
        )
        .route(
            "/api/v0/storage-locations",
            get(storage_locations::list_storage_locations)
                .put(storage_locations::upsert_storage_location),
        )
        .route(
            "/api/v0/settings",
            get(settings::get_settings).patch(settings::update_settings),
        )
        .merge(RapiDoc::with_openapi("/api-docs/openapi.json", ApiDoc::openapi()).path("/docs"))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(DefaultBodyLimit::max(
            state.uploads.max_file_size + BODY_LIMIT_SLACK,
        ))
        .with_state(state)
}

fn build_cors_layer(config: &Config) -> CorsLayer {
    if config.cors_origins().iter().any(|origin| origin == "*") {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        let origins: Vec<HeaderValue> = config
            .cors_origins()
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(Any)
            .allow_headers(Any)
    }
}
