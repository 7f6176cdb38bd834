use anyhow::Result;
use axum::body::{self, Body};
use axum::http::{Request, StatusCode};
use axum::routing::get;
use axum::{Extension, Router};
use serde_json::json;
use tower::util::ServiceExt; // for `oneshot`

use hr_access::app::AppState;
use hr_access::authz::guard::{check_access, protect, CurrentActor, Requirement};
use hr_access::authz::templates::InMemoryRoleTemplates;
use hr_access::authz::{Actor, AuthzEngine, AuthzMode};
use hr_access::errors::AppError;

fn state(mode: AuthzMode) -> AppState {
    AppState::new(AuthzEngine::hr_default(), InMemoryRoleTemplates::new(), mode)
}

async fn whoami(CurrentActor(actor): CurrentActor) -> String {
    actor.role
}

fn payroll_router(mode: AuthzMode, actor: Option<Actor>) -> Router {
    let routes = Router::new()
        .route("/payroll", get(whoami))
        .route("/payroll/health", get(|| async { "ok" }));
    let router = protect(routes, state(mode), "payroll", "view");
    match actor {
        Some(actor) => router.layer(Extension(actor)),
        None => router,
    }
}

async fn call(app: Router, uri: &str) -> Result<(StatusCode, String)> {
    let req = Request::builder().method("GET").uri(uri).body(Body::empty())?;
    let resp = app.oneshot(req).await?;
    let status = resp.status();
    let bytes = body::to_bytes(resp.into_body(), 1_048_576).await?;
    Ok((status, String::from_utf8_lossy(&bytes).into_owned()))
}

fn payroll_clerk() -> Actor {
    Actor::new("Manager").with_direct_permissions(json!(["payroll.view"]))
}

#[tokio::test]
async fn strict_mode_allows_granted_actor() -> Result<()> {
    let (status, body) = call(payroll_router(AuthzMode::Strict, Some(payroll_clerk())), "/payroll").await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "Manager");
    Ok(())
}

#[tokio::test]
async fn strict_mode_forbids_missing_grant() -> Result<()> {
    let (status, body) = call(payroll_router(AuthzMode::Strict, Some(Actor::new("Employee"))), "/payroll").await?;
    assert_eq!(status, StatusCode::FORBIDDEN, "unexpected body: {}", body);
    assert!(body.contains("forbidden"));
    Ok(())
}

#[tokio::test]
async fn strict_mode_requires_an_actor() -> Result<()> {
    let (status, _) = call(payroll_router(AuthzMode::Strict, None), "/payroll/health").await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn advisory_mode_lets_denied_actor_through() -> Result<()> {
    let (status, body) = call(payroll_router(AuthzMode::Advisory, Some(Actor::new("Employee"))), "/payroll").await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "Employee");
    Ok(())
}

#[tokio::test]
async fn off_mode_skips_checks() -> Result<()> {
    let (status, body) = call(payroll_router(AuthzMode::Off, None), "/payroll/health").await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "ok");
    Ok(())
}

#[tokio::test]
async fn current_actor_rejects_requests_without_actor() -> Result<()> {
    // the guard lets it through in off mode, the extractor still needs an actor
    let (status, _) = call(payroll_router(AuthzMode::Off, None), "/payroll").await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn check_access_follows_mode() {
    let requirement = Requirement::new("candidates", "start_interview");
    let interviewer = Actor::new("Manager").with_direct_permissions(json!(["interview_start"]));
    let outsider = Actor::new("Employee");

    let strict = state(AuthzMode::Strict);
    assert!(check_access(&strict, Some(&interviewer), &requirement).await.is_ok());
    assert!(matches!(
        check_access(&strict, Some(&outsider), &requirement).await,
        Err(AppError::Forbidden(_))
    ));
    assert!(matches!(
        check_access(&strict, None, &requirement).await,
        Err(AppError::Unauthorized(_))
    ));

    let advisory = state(AuthzMode::Advisory);
    assert!(check_access(&advisory, Some(&outsider), &requirement).await.is_ok());
    assert!(check_access(&advisory, None, &requirement).await.is_ok());
}
