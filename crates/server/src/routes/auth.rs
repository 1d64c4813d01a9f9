use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::{Extension, Json};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::Deserialize;
use uuid::Uuid;

use common::envelope::ApiResponse;
use service::auth::domain::{
    AuthSession, ChangePasswordInput, LoginInput, Principal, RegisterInput, UpdateProfileInput,
    UserView,
};

use crate::errors::ApiError;
use crate::state::AppState;

pub const REFRESH_COOKIE: &str = "refreshToken";

/// `{user, accessToken}`; the refresh token travels in the cookie only.
#[derive(serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionPayload {
    pub user: UserView,
    pub access_token: String,
}

#[derive(serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessTokenPayload {
    pub access_token: String,
}

#[derive(Debug, Deserialize)]
pub struct ForgotPasswordRequest {
    pub email: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResetPasswordRequest {
    pub id: Uuid,
    pub new_password: String,
}

fn refresh_cookie(token: String, production: bool) -> Cookie<'static> {
    let mut cookie = Cookie::new(REFRESH_COOKIE, token);
    cookie.set_path("/");
    cookie.set_http_only(true);
    cookie.set_secure(production);
    cookie.set_same_site(SameSite::Lax);
    cookie.set_max_age(time::Duration::days(365));
    cookie
}

fn split_session(session: AuthSession) -> (String, SessionPayload) {
    let AuthSession { user, access_token, refresh_token } = session;
    (refresh_token, SessionPayload { user, access_token })
}

#[utoipa::path(post, path = "/api/v1/auth/register", tag = "auth", request_body = crate::openapi::RegisterRequest, responses((status = 201, description = "Registered"), (status = 400, description = "Bad Request"), (status = 409, description = "Conflict")))]
pub async fn register(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(input): Json<RegisterInput>,
) -> Result<(StatusCode, CookieJar, Json<ApiResponse<SessionPayload>>), ApiError> {
    let session = state.auth.register(input).await?;
    let (refresh_token, payload) = split_session(session);
    let jar = jar.add(refresh_cookie(refresh_token, state.production));
    Ok((
        StatusCode::CREATED,
        jar,
        Json(ApiResponse::ok("User registered successfully!", payload)),
    ))
}

#[utoipa::path(post, path = "/api/v1/auth/login", tag = "auth", request_body = crate::openapi::LoginRequest, responses((status = 200, description = "Logged In"), (status = 401, description = "Unauthorized"), (status = 404, description = "Not Found")))]
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(input): Json<LoginInput>,
) -> Result<(CookieJar, Json<ApiResponse<SessionPayload>>), ApiError> {
    let session = state.auth.login(input).await?;
    let (refresh_token, payload) = split_session(session);
    let jar = jar.add(refresh_cookie(refresh_token, state.production));
    Ok((jar, Json(ApiResponse::ok("Login successful!", payload))))
}

#[utoipa::path(post, path = "/api/v1/auth/refresh-token", tag = "auth", responses((status = 200, description = "Refreshed"), (status = 401, description = "Unauthorized")))]
pub async fn refresh_token(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<Json<ApiResponse<AccessTokenPayload>>, ApiError> {
    let token = jar
        .get(REFRESH_COOKIE)
        .map(|c| c.value().to_string())
        .ok_or_else(ApiError::unauthorized)?;
    let refreshed = state.auth.refresh(&token).await?;
    Ok(Json(ApiResponse::ok(
        "Token refreshed successfully!",
        AccessTokenPayload { access_token: refreshed.access_token },
    )))
}

#[utoipa::path(post, path = "/api/v1/auth/logout", tag = "auth", responses((status = 200, description = "Logged Out")))]
pub async fn logout(jar: CookieJar) -> (CookieJar, Json<ApiResponse<()>>) {
    let mut removal = Cookie::from(REFRESH_COOKIE);
    removal.set_path("/");
    let jar = jar.remove(removal);
    (jar, Json(ApiResponse::ok_empty("Logged out successfully!")))
}

#[utoipa::path(post, path = "/api/v1/auth/change-password", tag = "auth", responses((status = 200, description = "Changed"), (status = 401, description = "Unauthorized")))]
pub async fn change_password(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Json(input): Json<ChangePasswordInput>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    state.auth.change_password(&principal, input).await?;
    Ok(Json(ApiResponse::ok_empty("Password changed successfully!")))
}

#[utoipa::path(post, path = "/api/v1/auth/forgot-password", tag = "auth", responses((status = 200, description = "Link Sent"), (status = 404, description = "Not Found")))]
pub async fn forgot_password(
    State(state): State<AppState>,
    Json(input): Json<ForgotPasswordRequest>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    state.auth.forgot_password(&input.email).await?;
    Ok(Json(ApiResponse::ok_empty("Password reset link sent to your email!")))
}

/// The reset token arrives in the Authorization header, with or without the
/// `Bearer` prefix; the target user id rides in the body.
#[utoipa::path(post, path = "/api/v1/auth/reset-password", tag = "auth", request_body = crate::openapi::ResetPasswordDoc, responses((status = 200, description = "Reset"), (status = 403, description = "Forbidden")))]
pub async fn reset_password(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(input): Json<ResetPasswordRequest>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    let token = headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(|h| h.strip_prefix("Bearer ").unwrap_or(h))
        .filter(|t| !t.is_empty())
        .ok_or_else(ApiError::unauthorized)?;
    state.auth.reset_password(token, input.id, &input.new_password).await?;
    Ok(Json(ApiResponse::ok_empty("Password reset successfully!")))
}

#[utoipa::path(get, path = "/api/v1/auth/profile", tag = "auth", responses((status = 200, description = "Profile"), (status = 401, description = "Unauthorized")))]
pub async fn get_profile(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
) -> Result<Json<ApiResponse<UserView>>, ApiError> {
    let view = state.auth.get_profile(principal.user_id).await?;
    Ok(Json(ApiResponse::ok("Profile retrieved successfully!", view)))
}

#[utoipa::path(patch, path = "/api/v1/auth/profile", tag = "auth", responses((status = 200, description = "Updated"), (status = 400, description = "Bad Request")))]
pub async fn update_profile(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Json(patch): Json<UpdateProfileInput>,
) -> Result<Json<ApiResponse<UserView>>, ApiError> {
    if patch.is_empty() {
        return Err(ApiError::bad_request("No fields to update!"));
    }
    let view = state.auth.update_profile(principal.user_id, patch).await?;
    Ok(Json(ApiResponse::ok("Profile updated successfully!", view)))
}
