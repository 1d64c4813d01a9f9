use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use uuid::Uuid;

use common::envelope::ApiResponse;
use models::company as company_model;
use service::company::{
    self, CompanyFilter, CompanyStatistics, CompanyView, CreateCompanyInput, UpdateCompanyInput,
};
use service::listing::ListOptions;

use crate::errors::ApiError;
use crate::middleware::ensure_admin;
use crate::state::AppState;
use service::auth::domain::Principal;

#[utoipa::path(post, path = "/api/v1/companies", tag = "companies", request_body = crate::openapi::CreateCompanyDoc, responses((status = 201, description = "Created"), (status = 400, description = "Bad Request")))]
pub async fn create(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Json(input): Json<CreateCompanyInput>,
) -> Result<(StatusCode, Json<ApiResponse<company_model::Model>>), ApiError> {
    ensure_admin(&principal)?;
    let created = company::create(&state.db, input).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok("Company created successfully!", created))))
}

/// Filter and pagination both come from the same query bag; unknown keys
/// are ignored.
#[utoipa::path(get, path = "/api/v1/companies", tag = "companies", responses((status = 200, description = "Listed")))]
pub async fn list(
    State(state): State<AppState>,
    Query(filter): Query<CompanyFilter>,
    Query(opts): Query<ListOptions>,
) -> Result<Json<ApiResponse<Vec<CompanyView>>>, ApiError> {
    let page = company::list(&state.db, &filter, &opts).await?;
    let meta = page.meta();
    Ok(Json(ApiResponse::paginated("Companies retrieved successfully!", page.data, meta)))
}

#[utoipa::path(get, path = "/api/v1/companies/{id}", tag = "companies", responses((status = 200, description = "Found"), (status = 404, description = "Not Found")))]
pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<CompanyView>>, ApiError> {
    let view = company::get(&state.db, id).await?;
    Ok(Json(ApiResponse::ok("Company retrieved successfully!", view)))
}

#[utoipa::path(patch, path = "/api/v1/companies/{id}", tag = "companies", responses((status = 200, description = "Updated"), (status = 404, description = "Not Found")))]
pub async fn update(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<Uuid>,
    Json(input): Json<UpdateCompanyInput>,
) -> Result<Json<ApiResponse<company_model::Model>>, ApiError> {
    ensure_admin(&principal)?;
    let updated = company::update(&state.db, id, input).await?;
    Ok(Json(ApiResponse::ok("Company updated successfully!", updated)))
}

#[utoipa::path(delete, path = "/api/v1/companies/{id}", tag = "companies", responses((status = 200, description = "Deleted"), (status = 400, description = "Bad Request"), (status = 404, description = "Not Found")))]
pub async fn delete(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    ensure_admin(&principal)?;
    company::delete(&state.db, id).await?;
    Ok(Json(ApiResponse::ok_empty("Company deleted successfully!")))
}

#[utoipa::path(get, path = "/api/v1/companies/{id}/statistics", tag = "companies", responses((status = 200, description = "Statistics"), (status = 404, description = "Not Found")))]
pub async fn statistics(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<CompanyStatistics>>, ApiError> {
    let stats = company::statistics(&state.db, id).await?;
    Ok(Json(ApiResponse::ok("Company statistics retrieved successfully!", stats)))
}
