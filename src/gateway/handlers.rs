//! Request handlers: the parse, authenticate, authorize, forward pipeline.

use axum::Json;
use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::{StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use serde_json::{Map, Value, json};
use tracing::{info, warn};
use uuid::Uuid;

use super::GatewayState;
use crate::error::GatewayError;
use crate::routes::{self, RouteDescriptor, RouteKind};
use crate::token::SessionClaims;

/// `POST /api/{route}`: the action pipeline.
pub(super) async fn dispatch(
    State(state): State<GatewayState>,
    Path(route): Path<String>,
    body: Bytes,
) -> Response {
    let correlation_id = Uuid::new_v4();
    match handle(&state, &route, &body, correlation_id).await {
        Ok(response) => response,
        Err(error) => {
            warn!(
                correlation_id = %correlation_id,
                route = %route,
                code = error.code().as_str(),
                error = %error,
                "request rejected"
            );
            error.into_response()
        }
    }
}

/// Gate order: route lookup, body parse, authentication, capability check,
/// then local answer or upstream forward. The first failing gate wins.
async fn handle(
    state: &GatewayState,
    route: &str,
    body: &Bytes,
    correlation_id: Uuid,
) -> Result<Response, GatewayError> {
    let descriptor = routes::find(route).ok_or_else(|| GatewayError::UnknownRoute {
        route: route.to_string(),
    })?;
    let payload = parse_object(body)?;

    let claims = if descriptor.requires_auth {
        Some(verify_token(state, &payload)?)
    } else {
        None
    };

    if descriptor.requires_can_view_logs
        && !claims.as_ref().is_some_and(|claims| claims.can_view_logs)
    {
        return Err(GatewayError::Forbidden {
            capability: "canViewLogs",
        });
    }

    match descriptor.kind {
        RouteKind::Login => login(state, &payload, correlation_id).await,
        RouteKind::Whoami => whoami(claims),
        RouteKind::Proxy => forward(state, descriptor, payload, correlation_id).await,
    }
}

async fn login(
    state: &GatewayState,
    payload: &Map<String, Value>,
    correlation_id: Uuid,
) -> Result<Response, GatewayError> {
    let email = payload
        .get("email")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .trim();
    let password = payload
        .get("password")
        .and_then(Value::as_str)
        .unwrap_or_default();
    if email.is_empty() || password.is_empty() {
        return Err(GatewayError::MissingLoginFields);
    }

    let profile = state.credentials.authenticate(email, password).await?;
    let token = state.tokens.mint(&profile)?;
    info!(
        correlation_id = %correlation_id,
        email = %profile.email,
        can_view_logs = profile.can_view_logs,
        "admin login succeeded"
    );
    Ok(envelope(
        StatusCode::OK,
        json!({ "ok": true, "token": token, "admin": profile }),
    ))
}

/// Answered from the verified claims; a valid token never costs an upstream
/// round trip.
fn whoami(claims: Option<SessionClaims>) -> Result<Response, GatewayError> {
    let claims = claims.ok_or_else(|| {
        GatewayError::Internal(anyhow::anyhow!("whoami dispatched without verified claims"))
    })?;
    Ok(envelope(
        StatusCode::OK,
        json!({ "ok": true, "admin": claims.profile() }),
    ))
}

async fn forward(
    state: &GatewayState,
    descriptor: &RouteDescriptor,
    payload: Map<String, Value>,
    correlation_id: Uuid,
) -> Result<Response, GatewayError> {
    let reply = state
        .upstream
        .forward(descriptor.action, &Value::Object(payload))
        .await?;
    info!(
        correlation_id = %correlation_id,
        route = descriptor.route,
        action = descriptor.action,
        status = reply.status,
        "relayed upstream reply"
    );
    let status = StatusCode::from_u16(reply.status).unwrap_or(StatusCode::BAD_GATEWAY);
    Ok(envelope(status, reply.body))
}

fn verify_token(
    state: &GatewayState,
    payload: &Map<String, Value>,
) -> Result<SessionClaims, GatewayError> {
    let token = payload
        .get("token")
        .and_then(Value::as_str)
        .filter(|token| !token.is_empty())
        .ok_or(GatewayError::TokenMissing)?;
    state.tokens.verify(token)
}

/// Strict body parse: present, valid JSON, and a JSON object.
fn parse_object(body: &Bytes) -> Result<Map<String, Value>, GatewayError> {
    if body.is_empty() {
        return Err(GatewayError::MalformedRequest {
            reason: "empty body".to_string(),
        });
    }
    let value: Value =
        serde_json::from_slice(body).map_err(|e| GatewayError::MalformedRequest {
            reason: e.to_string(),
        })?;
    match value {
        Value::Object(fields) => Ok(fields),
        _ => Err(GatewayError::MalformedRequest {
            reason: "body is not a JSON object".to_string(),
        }),
    }
}

/// `POST /api`: service health envelope.
pub(super) async fn service_info() -> Response {
    envelope(
        StatusCode::OK,
        json!({
            "ok": true,
            "service": env!("CARGO_PKG_NAME"),
            "hint": "POST /api/<route> with a JSON body",
        }),
    )
}

/// `GET /api/{route}`: liveness echo.
pub(super) async fn route_echo(Path(route): Path<String>) -> Response {
    envelope(StatusCode::OK, json!({ "ok": true, "route": route }))
}

/// `GET /api`: liveness echo for the bare prefix.
pub(super) async fn route_echo_root() -> Response {
    envelope(StatusCode::OK, json!({ "ok": true, "route": "" }))
}

/// Unsupported method on an action route.
pub(super) async fn method_not_allowed() -> GatewayError {
    GatewayError::MethodNotAllowed
}

/// Any path outside `/api`.
pub(super) async fn not_found(uri: Uri) -> GatewayError {
    GatewayError::UnknownRoute {
        route: uri.path().to_string(),
    }
}

fn envelope(status: StatusCode, body: Value) -> Response {
    (status, Json(body)).into_response()
}
