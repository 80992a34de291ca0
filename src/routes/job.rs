use axum::{
    extract::{Extension, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    dto::job_dto::{
        CreateJobPayload, DiscoveryQuery, EmployerJobListResponse, EmployerStatsResponse,
        JobDiscoveryResponse, JobListQuery, JobListResponse, JobPublicSummary, JobResponse,
        UpdateJobPayload,
    },
    error::{Error, Result},
    models::{job::PlanType, user::User},
    services::payment_service,
    AppState,
};

#[utoipa::path(
    get,
    path = "/api/jobs",
    responses(
        (status = 200, description = "List publicly visible jobs", body = Json<JobListResponse>)
    )
)]
#[axum::debug_handler]
pub async fn list_public_jobs(
    State(state): State<AppState>,
    Query(query): Query<JobListQuery>,
) -> Result<impl IntoResponse> {
    let list = state.job_service.list_public(query).await?;
    Ok(Json(JobListResponse::from(list)))
}

#[utoipa::path(
    get,
    path = "/api/jobs/{id}",
    params(
        ("id" = Uuid, Path, description = "Job ID")
    ),
    responses(
        (status = 200, description = "Job detail", body = Json<JobResponse>),
        (status = 404, description = "Job not found or not visible")
    )
)]
#[axum::debug_handler]
pub async fn get_public_job(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let job = state.job_service.get_visible_by_id(id).await?;
    Ok(Json(JobResponse::from(job)))
}

#[axum::debug_handler]
pub async fn discover_jobs(
    State(state): State<AppState>,
    Query(query): Query<DiscoveryQuery>,
) -> Result<impl IntoResponse> {
    let jobs = state.job_service.discover(query).await?;
    let items: Vec<JobPublicSummary> = jobs.into_iter().map(Into::into).collect();
    Ok(Json(JobDiscoveryResponse { items }))
}

#[utoipa::path(
    post,
    path = "/api/jobs",
    request_body = CreateJobPayload,
    responses(
        (status = 201, description = "Job created successfully", body = Json<JobResponse>),
        (status = 400, description = "Invalid payload"),
        (status = 403, description = "company_id does not match the session")
    )
)]
#[axum::debug_handler]
pub async fn create_job(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Json(payload): Json<CreateJobPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;

    if let Some(requested) = payload.company_id.as_deref() {
        if requested != user.external_id {
            return Err(Error::Forbidden(
                "company_id does not match the authenticated employer".to_string(),
            ));
        }
    }

    let plan = match payload.plan_type.as_deref() {
        Some(raw) => PlanType::parse(raw).ok_or_else(|| {
            Error::BadRequest("plan_type must be one of: basic, premium".to_string())
        })?,
        None => PlanType::Basic,
    };

    let jobs_posted = state.user_service.claim_job_slot(&user.external_id).await?;
    let activation = payment_service::activation_for(jobs_posted, plan);
    if activation.is_free_tier() {
        tracing::info!(
            employer_id = %user.external_id,
            jobs_posted,
            "job falls inside the free tier, activating immediately"
        );
    }

    let company_name = payload
        .company_name
        .clone()
        .or_else(|| user.company_display_name())
        .unwrap_or_else(|| user.email.clone());

    let job = state
        .job_service
        .create(&user.external_id, &company_name, payload, &activation)
        .await?;
    Ok((StatusCode::CREATED, Json(JobResponse::from(job))))
}

#[utoipa::path(
    put,
    path = "/api/jobs/{id}",
    params(
        ("id" = Uuid, Path, description = "Job ID")
    ),
    request_body = UpdateJobPayload,
    responses(
        (status = 200, description = "Job updated successfully", body = Json<JobResponse>),
        (status = 400, description = "Invalid payload"),
        (status = 403, description = "Job belongs to another employer"),
        (status = 404, description = "Job not found")
    )
)]
#[axum::debug_handler]
pub async fn update_job(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateJobPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let job = state
        .job_service
        .update(id, &user.external_id, payload)
        .await?;
    Ok(Json(JobResponse::from(job)))
}

#[utoipa::path(
    delete,
    path = "/api/jobs/{id}",
    params(
        ("id" = Uuid, Path, description = "Job ID")
    ),
    responses(
        (status = 204, description = "Job deleted"),
        (status = 403, description = "Job belongs to another employer"),
        (status = 404, description = "Job not found")
    )
)]
#[axum::debug_handler]
pub async fn delete_job(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    state.job_service.delete(id, &user.external_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[axum::debug_handler]
pub async fn list_employer_jobs(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
) -> Result<impl IntoResponse> {
    let jobs = state.job_service.list_by_company(&user.external_id).await?;
    Ok(Json(EmployerJobListResponse {
        items: jobs.into_iter().map(Into::into).collect(),
    }))
}

#[axum::debug_handler]
pub async fn employer_stats(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
) -> Result<impl IntoResponse> {
    let stats = state.job_service.employer_stats(&user.external_id).await?;
    Ok(Json(EmployerStatsResponse::from(stats)))
}
