use axum::middleware as axum_middleware;
use axum::routing::{get, post};
use axum::{Json, Router};
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnFailure, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use common::envelope::ApiResponse;

use crate::middleware::require_auth;
use crate::openapi::ApiDoc;
use crate::state::AppState;

pub mod auth;
pub mod company;
pub mod institute;

#[utoipa::path(get, path = "/health", tag = "health", responses((status = 200, description = "OK")))]
pub async fn health() -> Json<ApiResponse<()>> {
    Json(ApiResponse::ok_empty("OK"))
}

/// Build the full application router: public auth endpoints, the protected
/// API surface, health, and the Swagger UI.
pub fn build_router(state: AppState, cors: CorsLayer) -> Router {
    let public_auth = Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/refresh-token", post(auth::refresh_token))
        .route("/forgot-password", post(auth::forgot_password))
        .route("/reset-password", post(auth::reset_password));

    let protected_auth = Router::new()
        .route("/logout", post(auth::logout))
        .route("/change-password", post(auth::change_password))
        .route("/profile", get(auth::get_profile).patch(auth::update_profile))
        .route_layer(axum_middleware::from_fn_with_state(state.clone(), require_auth));

    let companies = Router::new()
        .route("/", get(company::list).post(company::create))
        .route("/:id", get(company::get).patch(company::update).delete(company::delete))
        .route("/:id/statistics", get(company::statistics))
        .route_layer(axum_middleware::from_fn_with_state(state.clone(), require_auth));

    let institutes = Router::new()
        .route("/", get(institute::list).post(institute::create))
        .route("/company/:company_id", get(institute::by_company))
        .route("/:id", get(institute::get).patch(institute::update).delete(institute::delete))
        .route("/:id/statistics", get(institute::statistics))
        .route_layer(axum_middleware::from_fn_with_state(state.clone(), require_auth));

    let api = Router::new()
        .nest("/auth", public_auth.merge(protected_auth))
        .nest("/companies", companies)
        .nest("/institutes", institutes);

    Router::new()
        .route("/health", get(health))
        .nest("/api/v1", api)
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .with_state(state)
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO).include_headers(false))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO).include_headers(false))
                .on_failure(DefaultOnFailure::new().level(Level::ERROR)),
        )
}
