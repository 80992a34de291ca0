use axum::{
    extract::{Extension, State},
    response::{IntoResponse, Json},
};
use validator::Validate;

use crate::{
    dto::user_dto::{RegisterUserPayload, UpdateUserPayload, UserResponse},
    error::Result,
    middleware::auth::Claims,
    AppState,
};

/// Returns the directory record for the current session, creating it on first
/// contact from the identity provider's profile.
#[axum::debug_handler]
pub async fn me(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse> {
    if let Some(user) = state.user_service.get_by_external_id(&claims.sub).await? {
        return Ok(Json(UserResponse::from(user)));
    }

    let profile = state.identity_service.fetch_profile(&claims.sub).await?;
    let name = profile.display_name();
    let user = state
        .user_service
        .resolve(
            &claims.sub,
            &profile.email,
            name.as_deref(),
            profile.avatar_url.as_deref(),
        )
        .await?;
    Ok(Json(UserResponse::from(user)))
}

#[axum::debug_handler]
pub async fn register(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<RegisterUserPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;

    let email = match state.user_service.get_by_external_id(&claims.sub).await? {
        Some(user) => user.email,
        None => {
            state
                .identity_service
                .fetch_profile(&claims.sub)
                .await?
                .email
        }
    };

    let user = state
        .user_service
        .register(&claims.sub, &email, payload)
        .await?;
    Ok(Json(UserResponse::from(user)))
}

#[axum::debug_handler]
pub async fn update_me(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<UpdateUserPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let user = state
        .user_service
        .update_profile(&claims.sub, payload)
        .await?;
    Ok(Json(UserResponse::from(user)))
}
