//! Route guard for the host HTTP layer.
//!
//! Authentication happens upstream: it is expected to insert the
//! authenticated [`Actor`] into the request extensions. The guard resolves
//! that actor and enforces one `(module, action)` requirement per route,
//! following the configured [`AuthzMode`].

use axum::async_trait;
use axum::extract::{FromRequestParts, Request, State};
use axum::http::request::Parts;
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::Router;

use super::principal::Actor;
use super::templates::resolve_with_source;
use super::{has_action, AuthzMode};
use crate::app::AppState;
use crate::errors::AppError;

/// Access a route demands.
#[derive(Debug, Clone)]
pub struct Requirement {
    pub module: String,
    pub action: String,
}

impl Requirement {
    pub fn new(module: impl Into<String>, action: impl Into<String>) -> Self {
        Self {
            module: module.into(),
            action: action.into(),
        }
    }
}

#[derive(Clone)]
struct GuardState {
    app: AppState,
    requirement: Requirement,
}

/// Extractor for the actor placed on the request by the authentication layer.
#[derive(Debug, Clone)]
pub struct CurrentActor(pub Actor);

#[async_trait]
impl<S> FromRequestParts<S> for CurrentActor
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Actor>()
            .cloned()
            .map(CurrentActor)
            .ok_or_else(|| AppError::unauthorized("no authenticated actor on request"))
    }
}

/// Wraps every route of `router` with a check for `module` / `action`.
pub fn protect<S>(
    router: Router<S>,
    app: AppState,
    module: impl Into<String>,
    action: impl Into<String>,
) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    let guard = GuardState {
        app,
        requirement: Requirement::new(module, action),
    };
    router.route_layer(middleware::from_fn_with_state(guard, enforce))
}

async fn enforce(
    State(guard): State<GuardState>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let actor = request.extensions().get::<Actor>().cloned();
    check_access(&guard.app, actor.as_ref(), &guard.requirement).await?;
    Ok(next.run(request).await)
}

/// Decides whether `actor` meets `requirement` under the state's mode.
///
/// `Off` allows everything, `Advisory` logs denials and allows, `Strict`
/// answers 401 without an actor and 403 on denial.
pub async fn check_access(
    app: &AppState,
    actor: Option<&Actor>,
    requirement: &Requirement,
) -> Result<(), AppError> {
    if app.mode == AuthzMode::Off {
        return Ok(());
    }

    let Some(actor) = actor else {
        return deny(app.mode, AppError::unauthorized("no authenticated actor on request"), requirement);
    };

    let resolution = resolve_with_source(&app.engine, app.templates.as_ref(), actor).await;
    if has_action(&resolution.permissions, &requirement.module, &requirement.action) {
        tracing::debug!(
            user_id = ?actor.user_id,
            role = %actor.role,
            module = %requirement.module,
            action = %requirement.action,
            "access granted"
        );
        return Ok(());
    }

    deny(
        app.mode,
        AppError::forbidden(format!(
            "role `{}` may not {} on {}",
            actor.role, requirement.action, requirement.module
        )),
        requirement,
    )
}

fn deny(mode: AuthzMode, error: AppError, requirement: &Requirement) -> Result<(), AppError> {
    match mode {
        AuthzMode::Strict => {
            tracing::info!(
                module = %requirement.module,
                action = %requirement.action,
                reason = %error,
                "access denied"
            );
            Err(error)
        }
        _ => {
            tracing::warn!(
                module = %requirement.module,
                action = %requirement.action,
                mode = mode.as_str(),
                reason = %error,
                "access would be denied; allowing"
            );
            Ok(())
        }
    }
}
