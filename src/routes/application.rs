use axum::{
    extract::{Extension, Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    dto::application_dto::{
        ApplicationListResponse, ApplicationResponse, ApplyPayload,
        CandidateApplicationListResponse, UpdateApplicationPayload,
    },
    error::Result,
    models::user::User,
    AppState,
};

#[axum::debug_handler]
pub async fn apply_to_job(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path(job_id): Path<Uuid>,
    Json(payload): Json<ApplyPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let application = state
        .application_service
        .apply(job_id, &user.external_id, payload)
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(ApplicationResponse::from(application)),
    ))
}

#[axum::debug_handler]
pub async fn list_job_applications(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path(job_id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let applications = state
        .application_service
        .list_for_job(job_id, &user.external_id)
        .await?;
    Ok(Json(ApplicationListResponse {
        items: applications.into_iter().map(Into::into).collect(),
    }))
}

#[axum::debug_handler]
pub async fn update_application_status(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateApplicationPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let application = state
        .application_service
        .update_status(id, &user.external_id, &payload.status)
        .await?;
    Ok(Json(ApplicationResponse::from(application)))
}

#[axum::debug_handler]
pub async fn list_my_applications(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
) -> Result<impl IntoResponse> {
    let applications = state
        .application_service
        .list_for_candidate(&user.external_id)
        .await?;
    Ok(Json(CandidateApplicationListResponse {
        items: applications.into_iter().map(Into::into).collect(),
    }))
}
