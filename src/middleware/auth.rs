use axum::{
    extract::{Request, State},
    http::{header, StatusCode},
    middleware::Next,
    response::{IntoResponse, Json, Response},
};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::models::user::Role;
use crate::AppState;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub exp: usize,
    pub role: Option<String>,
}

pub fn decode_session(token: &str) -> Option<Claims> {
    let config = crate::config::get_config();
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = true;
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.identity_jwt_secret.as_bytes()),
        &validation,
    )
    .map(|data| data.claims)
    .ok()
}

/// Session token from the Authorization header, falling back to the
/// `session_token` cookie set after provider sign-in.
pub fn session_token(req: &Request) -> Option<String> {
    if let Some(value) = req.headers().get(header::AUTHORIZATION) {
        if let Ok(raw) = value.to_str() {
            if let Some(token) = raw.strip_prefix("Bearer ") {
                return Some(token.to_string());
            }
        }
    }

    let cookies = req.headers().get(header::COOKIE)?.to_str().ok()?;
    cookies.split(';').find_map(|pair| {
        let (name, value) = pair.trim().split_once('=')?;
        if name == "session_token" {
            Some(value.to_string())
        } else {
            None
        }
    })
}

pub async fn require_session_auth(mut req: Request, next: Next) -> Response {
    let Some(token) = session_token(&req) else {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({"error": "Authentication required"})),
        )
            .into_response();
    };
    let Some(claims) = decode_session(&token) else {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({"error": "Invalid or expired session"})),
        )
            .into_response();
    };

    req.extensions_mut().insert(claims);
    next.run(req).await
}

// The role claim in the token is only a hint; the directory is authoritative.
// On success the resolved User is inserted for handlers to reuse.
async fn require_role(state: AppState, mut req: Request, next: Next, role: Role) -> Response {
    let Some(claims) = req.extensions().get::<Claims>().cloned() else {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({"error": "Authentication required"})),
        )
            .into_response();
    };

    let user = match state.user_service.get_by_external_id(&claims.sub).await {
        Ok(Some(user)) => user,
        Ok(None) => {
            return (
                StatusCode::FORBIDDEN,
                Json(json!({"error": "Registration required"})),
            )
                .into_response();
        }
        Err(err) => return err.into_response(),
    };

    if user.resolved_role() != Some(role) {
        let message = match role {
            Role::Employer => "Employer account required",
            Role::Candidate => "Candidate account required",
        };
        return (StatusCode::FORBIDDEN, Json(json!({"error": message}))).into_response();
    }

    req.extensions_mut().insert(user);
    next.run(req).await
}

pub async fn require_employer(State(state): State<AppState>, req: Request, next: Next) -> Response {
    require_role(state, req, next, Role::Employer).await
}

pub async fn require_candidate(State(state): State<AppState>, req: Request, next: Next) -> Response {
    require_role(state, req, next, Role::Candidate).await
}
