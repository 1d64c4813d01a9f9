use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use uuid::Uuid;

use common::envelope::ApiResponse;
use models::institute as institute_model;
use service::institute::{
    self, CreateInstituteInput, InstituteFilter, InstituteStatistics, InstituteView,
    UpdateInstituteInput,
};
use service::listing::ListOptions;

use crate::errors::ApiError;
use crate::middleware::ensure_admin;
use crate::state::AppState;
use service::auth::domain::Principal;

#[utoipa::path(post, path = "/api/v1/institutes", tag = "institutes", request_body = crate::openapi::CreateInstituteDoc, responses((status = 201, description = "Created"), (status = 404, description = "Company Not Found")))]
pub async fn create(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Json(input): Json<CreateInstituteInput>,
) -> Result<(StatusCode, Json<ApiResponse<institute_model::Model>>), ApiError> {
    ensure_admin(&principal)?;
    let created = institute::create(&state.db, input).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok("Institute created successfully!", created))))
}

#[utoipa::path(get, path = "/api/v1/institutes", tag = "institutes", responses((status = 200, description = "Listed")))]
pub async fn list(
    State(state): State<AppState>,
    Query(filter): Query<InstituteFilter>,
    Query(opts): Query<ListOptions>,
) -> Result<Json<ApiResponse<Vec<InstituteView>>>, ApiError> {
    let page = institute::list(&state.db, &filter, &opts).await?;
    let meta = page.meta();
    Ok(Json(ApiResponse::paginated("Institutes retrieved successfully!", page.data, meta)))
}

#[utoipa::path(get, path = "/api/v1/institutes/{id}", tag = "institutes", responses((status = 200, description = "Found"), (status = 404, description = "Not Found")))]
pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<InstituteView>>, ApiError> {
    let view = institute::get(&state.db, id).await?;
    Ok(Json(ApiResponse::ok("Institute retrieved successfully!", view)))
}

#[utoipa::path(patch, path = "/api/v1/institutes/{id}", tag = "institutes", responses((status = 200, description = "Updated"), (status = 404, description = "Not Found")))]
pub async fn update(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<Uuid>,
    Json(input): Json<UpdateInstituteInput>,
) -> Result<Json<ApiResponse<institute_model::Model>>, ApiError> {
    ensure_admin(&principal)?;
    let updated = institute::update(&state.db, id, input).await?;
    Ok(Json(ApiResponse::ok("Institute updated successfully!", updated)))
}

#[utoipa::path(delete, path = "/api/v1/institutes/{id}", tag = "institutes", responses((status = 200, description = "Deleted"), (status = 400, description = "Bad Request"), (status = 404, description = "Not Found")))]
pub async fn delete(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    ensure_admin(&principal)?;
    institute::delete(&state.db, id).await?;
    Ok(Json(ApiResponse::ok_empty("Institute deleted successfully!")))
}

#[utoipa::path(get, path = "/api/v1/institutes/company/{companyId}", tag = "institutes", responses((status = 200, description = "Listed"), (status = 404, description = "Company Not Found")))]
pub async fn by_company(
    State(state): State<AppState>,
    Path(company_id): Path<Uuid>,
    Query(opts): Query<ListOptions>,
) -> Result<Json<ApiResponse<Vec<InstituteView>>>, ApiError> {
    let page = institute::list_by_company(&state.db, company_id, &opts).await?;
    let meta = page.meta();
    Ok(Json(ApiResponse::paginated("Institutes retrieved successfully!", page.data, meta)))
}

#[utoipa::path(get, path = "/api/v1/institutes/{id}/statistics", tag = "institutes", responses((status = 200, description = "Statistics"), (status = 404, description = "Not Found")))]
pub async fn statistics(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<InstituteStatistics>>, ApiError> {
    let stats = institute::statistics(&state.db, id).await?;
    Ok(Json(ApiResponse::ok("Institute statistics retrieved successfully!", stats)))
}
