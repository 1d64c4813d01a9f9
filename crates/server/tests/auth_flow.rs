use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use migration::MigratorTrait;
use serde_json::{json, Value};
use tower::Service;
use uuid::Uuid;

use server::routes;
use server::state::AppState;

fn cors() -> tower_http::cors::CorsLayer {
    tower_http::cors::CorsLayer::very_permissive()
}

async fn build_app() -> anyhow::Result<Router> {
    let mut cfg = configs::AppConfig::load_and_validate()?;
    cfg.jwt.access_secret = "test-access-secret".into();
    cfg.jwt.refresh_secret = "test-refresh-secret".into();
    cfg.jwt.reset_secret = "test-reset-secret".into();

    let db = models::db::connect(&cfg.database).await?;
    // repeated runs against the same database are fine
    if let Err(e) = migration::Migrator::up(&db, None).await {
        let msg = format!("{}", e);
        if !msg.contains("already exists") {
            return Err(e.into());
        }
    }
    Ok(routes::build_router(AppState::new(db, &cfg), cors()))
}

fn register_body(email: &str, role: &str) -> Value {
    json!({
        "email": email,
        "password": "Secret123!",
        "firstName": "Test",
        "lastName": "User",
        "gender": "MALE",
        "role": role,
        "userType": "GENERAL",
    })
}

async fn post_json(app: &mut Router, uri: &str, body: &Value) -> anyhow::Result<axum::response::Response> {
    let req = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_vec(body)?))?;
    Ok(app.call(req).await?)
}

async fn json_body(resp: axum::response::Response) -> anyhow::Result<Value> {
    let bytes = resp.into_body().collect().await?.to_bytes();
    Ok(serde_json::from_slice(&bytes)?)
}

#[tokio::test]
async fn register_and_login_flow() -> anyhow::Result<()> {
    if std::env::var("SKIP_DB_TESTS").is_ok() {
        return Ok(());
    }
    let mut app = build_app().await?;
    let email = format!("user_{}@example.com", Uuid::new_v4());

    let resp = post_json(&mut app, "/api/v1/auth/register", &register_body(&email, "EMPLOYEE")).await?;
    assert_eq!(resp.status(), StatusCode::CREATED);
    assert!(resp.headers().get("set-cookie").is_some());
    let body = json_body(resp).await?;
    assert_eq!(body["success"], true);
    assert!(body["data"]["accessToken"].is_string());
    // password hash must never leak
    assert!(body["data"]["user"].get("passwordHash").is_none());

    let resp = post_json(
        &mut app,
        "/api/v1/auth/login",
        &json!({"email": email, "password": "Secret123!"}),
    )
    .await?;
    assert_eq!(resp.status(), StatusCode::OK);
    let cookie = resp.headers().get("set-cookie").and_then(|v| v.to_str().ok()).unwrap_or("");
    assert!(cookie.starts_with("refreshToken="));
    assert!(cookie.contains("HttpOnly"));
    Ok(())
}

#[tokio::test]
async fn login_wrong_password_is_unauthorized() -> anyhow::Result<()> {
    if std::env::var("SKIP_DB_TESTS").is_ok() {
        return Ok(());
    }
    let mut app = build_app().await?;
    let email = format!("user_{}@example.com", Uuid::new_v4());
    let _ = post_json(&mut app, "/api/v1/auth/register", &register_body(&email, "EMPLOYEE")).await?;

    let resp = post_json(
        &mut app,
        "/api/v1/auth/login",
        &json!({"email": email, "password": "wrong-password"}),
    )
    .await?;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let body = json_body(resp).await?;
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "Password incorrect!");
    Ok(())
}

#[tokio::test]
async fn register_duplicate_email_conflicts() -> anyhow::Result<()> {
    if std::env::var("SKIP_DB_TESTS").is_ok() {
        return Ok(());
    }
    let mut app = build_app().await?;
    let email = format!("user_{}@example.com", Uuid::new_v4());
    let resp = post_json(&mut app, "/api/v1/auth/register", &register_body(&email, "EMPLOYEE")).await?;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let resp = post_json(&mut app, "/api/v1/auth/register", &register_body(&email, "EMPLOYEE")).await?;
    assert_eq!(resp.status(), StatusCode::CONFLICT);
    Ok(())
}

#[tokio::test]
async fn refresh_token_comes_from_cookie() -> anyhow::Result<()> {
    if std::env::var("SKIP_DB_TESTS").is_ok() {
        return Ok(());
    }
    let mut app = build_app().await?;
    let email = format!("user_{}@example.com", Uuid::new_v4());
    let resp = post_json(&mut app, "/api/v1/auth/register", &register_body(&email, "EMPLOYEE")).await?;
    let cookie = resp
        .headers()
        .get("set-cookie")
        .and_then(|v| v.to_str().ok())
        .and_then(|c| c.split(';').next())
        .map(str::to_string)
        .unwrap_or_default();

    let req = Request::builder()
        .method("POST")
        .uri("/api/v1/auth/refresh-token")
        .header("cookie", &cookie)
        .body(Body::empty())?;
    let resp = app.call(req).await?;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = json_body(resp).await?;
    assert!(body["data"]["accessToken"].is_string());

    // without the cookie the endpoint refuses
    let req = Request::builder()
        .method("POST")
        .uri("/api/v1/auth/refresh-token")
        .body(Body::empty())?;
    let resp = app.call(req).await?;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn profile_requires_bearer_token() -> anyhow::Result<()> {
    if std::env::var("SKIP_DB_TESTS").is_ok() {
        return Ok(());
    }
    let mut app = build_app().await?;

    let req = Request::builder().method("GET").uri("/api/v1/auth/profile").body(Body::empty())?;
    let resp = app.call(req).await?;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let email = format!("user_{}@example.com", Uuid::new_v4());
    let resp = post_json(&mut app, "/api/v1/auth/register", &register_body(&email, "EMPLOYEE")).await?;
    let body = json_body(resp).await?;
    let token = body["data"]["accessToken"].as_str().unwrap_or_default().to_string();

    let req = Request::builder()
        .method("GET")
        .uri("/api/v1/auth/profile")
        .header("authorization", format!("Bearer {}", token))
        .body(Body::empty())?;
    let resp = app.call(req).await?;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = json_body(resp).await?;
    assert_eq!(body["data"]["email"], email.as_str());
    Ok(())
}
