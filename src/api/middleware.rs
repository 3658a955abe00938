//! API Middleware
//!
//! Token authentication and request logging.

use axum::{
    body::Body,
    extract::State,
    http::{HeaderMap, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use sha2::{Digest, Sha256};
use uuid::Uuid;

use super::routes::AppState;

/// The authenticated caller, resolved from the `X-API-Key` header.
#[derive(Debug, Clone)]
pub struct AuthenticatedCaller {
    pub token_id: Uuid,
    pub name: String,
}

/// Hex-encoded SHA-256 of an API token, as stored in `api_tokens`.
pub fn hash_token(token: &str) -> String {
    hex::encode(Sha256::digest(token.as_bytes()))
}

// =========================================================================
// Token authentication
// =========================================================================

/// Validate the `X-API-Key` header against the `api_tokens` table and
/// attach the resolved caller to the request. The engine never sees an
/// unauthenticated request.
pub async fn auth_middleware(
    State(state): State<AppState>,
    headers: HeaderMap,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, Response> {
    let token = match headers.get("X-API-Key").and_then(|v| v.to_str().ok()) {
        Some(token) => token,
        None => {
            return Err(unauthorized("Missing X-API-Key header"));
        }
    };

    let record: Option<(Uuid, String, bool)> = match sqlx::query_as(
        r#"
        SELECT id, name, is_active
        FROM api_tokens
        WHERE token_hash = $1
        "#,
    )
    .bind(hash_token(token))
    .fetch_optional(&state.pool)
    .await
    {
        Ok(record) => record,
        Err(e) => {
            tracing::error!("Database error during token validation: {}", e);
            return Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "status": 500,
                    "message": "error",
                    "data": "token validation failed"
                })),
            )
                .into_response());
        }
    };

    let (token_id, name, is_active) = match record {
        Some(record) => record,
        None => return Err(unauthorized("Invalid API key")),
    };

    if !is_active {
        return Err(unauthorized("API key is disabled"));
    }

    request
        .extensions_mut()
        .insert(AuthenticatedCaller { token_id, name });

    Ok(next.run(request).await)
}

fn unauthorized(message: &str) -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({
            "status": 401,
            "message": message,
            "data": null
        })),
    )
        .into_response()
}

// =========================================================================
// Request logging
// =========================================================================

/// Headers that are masked in logs
const SENSITIVE_HEADERS: &[&str] = &["x-api-key", "authorization", "cookie", "set-cookie"];

/// Mask sensitive headers for logging
pub fn mask_headers_for_logging(headers: &HeaderMap) -> Vec<(String, String)> {
    headers
        .iter()
        .map(|(name, value)| {
            let name_lower = name.as_str().to_lowercase();
            let masked_value = if SENSITIVE_HEADERS.contains(&name_lower.as_str()) {
                "[REDACTED]".to_string()
            } else {
                value.to_str().unwrap_or("[invalid utf8]").to_string()
            };
            (name.to_string(), masked_value)
        })
        .collect()
}

/// Request logging middleware
pub async fn logging_middleware(request: Request<Body>, next: Next) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let headers = mask_headers_for_logging(request.headers());

    let start = std::time::Instant::now();

    tracing::info!(
        method = %method,
        uri = %uri,
        headers = ?headers,
        "Incoming request"
    );

    let response = next.run(request).await;

    let duration = start.elapsed();
    tracing::info!(
        method = %method,
        uri = %uri,
        status = %response.status(),
        duration_ms = %duration.as_millis(),
        "Request completed"
    );

    response
}
