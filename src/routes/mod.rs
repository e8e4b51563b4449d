pub mod documents;
pub mod projects;
pub mod requests;
pub mod versions;

use axum::routing::{delete, get, post};
use axum::Router;

use crate::state::SharedState;

pub fn api_routes() -> Router<SharedState> {
    Router::new()
        // Projects
        .route("/api/v1/projects", get(projects::list).post(projects::create))
        .route(
            "/api/v1/projects/{id}",
            get(projects::get)
                .put(projects::update)
                .delete(projects::delete),
        )
        .route("/api/v1/projects/{id}/status", post(projects::update_status))
        .route("/api/v1/projects/{id}/phase", post(projects::update_phase))
        // Versions
        .route(
            "/api/v1/projects/{id}/versions",
            get(versions::list_by_project).post(versions::create),
        )
        .route(
            "/api/v1/projects/{id}/versions/{version_id}",
            delete(versions::delete),
        )
        .route("/api/v1/versions/{id}", get(versions::get))
        .route("/api/v1/versions/{id}/field", post(versions::update_field))
        .route("/api/v1/versions/{id}/fields", post(versions::update_fields))
        .route("/api/v1/versions/{id}/schedule", get(versions::schedule))
        // Context requests
        .route("/api/v1/requests", get(requests::list))
        .route("/api/v1/versions/{id}/requests", post(requests::create))
        .route(
            "/api/v1/requests/{id}",
            get(requests::get)
                .put(requests::update)
                .delete(requests::delete),
        )
        // Custom fields & documents
        .route(
            "/api/v1/projects/{id}/custom-fields",
            get(documents::list_custom_fields).post(documents::add_custom_field),
        )
        .route("/api/v1/custom-fields/{id}", delete(documents::delete_custom_field))
        .route(
            "/api/v1/projects/{id}/documents",
            get(documents::list).post(documents::upload),
        )
        .route(
            "/api/v1/documents/{id}",
            get(documents::download).delete(documents::delete),
        )
}
