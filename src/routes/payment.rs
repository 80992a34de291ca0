use axum::{
    extract::{Extension, State},
    response::{IntoResponse, Json},
};

use crate::{
    dto::payment_dto::{CheckoutSessionResponse, CreateCheckoutSessionPayload},
    error::Result,
    models::user::User,
    AppState,
};

#[utoipa::path(
    post,
    path = "/api/payments/create-checkout-session",
    request_body = CreateCheckoutSessionPayload,
    responses(
        (status = 200, description = "Checkout session created", body = Json<CheckoutSessionResponse>),
        (status = 400, description = "Missing or invalid job_id / plan_type"),
        (status = 403, description = "Job belongs to another employer"),
        (status = 404, description = "Job not found")
    )
)]
#[axum::debug_handler]
pub async fn create_checkout_session(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Json(payload): Json<CreateCheckoutSessionPayload>,
) -> Result<impl IntoResponse> {
    let session = state
        .payment_service
        .create_checkout_session(&user.external_id, &user.email, payload)
        .await?;
    Ok(Json(session))
}
