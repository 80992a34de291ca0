use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    Json,
};
use serde_json::{json, Value as JsonValue};

use crate::{
    config::get_config,
    dto::webhook_dto::{LemonSqueezyEvent, StripeCheckoutSession, StripeEvent, StripePaymentIntent},
    error::{Error, Result},
    models::payment::{PROVIDER_LEMONSQUEEZY, PROVIDER_STRIPE},
    utils::{signature, time},
    AppState,
};

/// Signature verification happens on the raw bytes, before any JSON parsing.
#[axum::debug_handler]
pub async fn stripe_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<(StatusCode, Json<JsonValue>)> {
    let config = get_config();
    let signature_header = headers
        .get("stripe-signature")
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| Error::BadRequest("Missing Stripe-Signature header".to_string()))?;

    if !signature::verify_timestamped_signature(
        &config.stripe_webhook_secret,
        signature_header,
        &body,
        time::unix_now(),
    ) {
        return Err(Error::Unauthorized("Invalid webhook signature".to_string()));
    }

    let payload: JsonValue = serde_json::from_slice(&body)?;
    let event: StripeEvent = serde_json::from_value(payload.clone())?;

    state
        .payment_service
        .record_webhook_event(PROVIDER_STRIPE, &event.event_type, &event.id, &payload)
        .await;

    match event.event_type.as_str() {
        "checkout.session.completed" => {
            let session: StripeCheckoutSession = serde_json::from_value(event.data.object)?;
            let outcome = state
                .payment_service
                .apply_checkout_completed(&session.id, session.payment_intent.as_deref(), None)
                .await?;
            tracing::info!(session_id = %session.id, ?outcome, "processed checkout completion");
        }
        "checkout.session.async_payment_failed" | "checkout.session.expired" => {
            let session: StripeCheckoutSession = serde_json::from_value(event.data.object)?;
            let outcome = state
                .payment_service
                .apply_payment_failed(Some(&session.id), None)
                .await?;
            tracing::info!(session_id = %session.id, ?outcome, "marked checkout as failed");
        }
        "payment_intent.payment_failed" => {
            let intent: StripePaymentIntent = serde_json::from_value(event.data.object)?;
            let outcome = state
                .payment_service
                .apply_payment_failed(None, Some(&intent.id))
                .await?;
            tracing::info!(payment_intent = %intent.id, ?outcome, "marked payment as failed");
        }
        other => {
            tracing::debug!(event_type = other, "ignoring unhandled event");
        }
    }

    Ok((StatusCode::OK, Json(json!({ "received": true }))))
}

#[axum::debug_handler]
pub async fn lemonsqueezy_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<(StatusCode, Json<JsonValue>)> {
    let config = get_config();
    let signature_header = headers
        .get("x-signature")
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| Error::BadRequest("Missing X-Signature header".to_string()))?;

    if !signature::verify_hex_signature(
        &config.lemonsqueezy_webhook_secret,
        signature_header,
        &body,
    ) {
        return Err(Error::Unauthorized("Invalid webhook signature".to_string()));
    }

    let payload: JsonValue = serde_json::from_slice(&body)?;
    let event: LemonSqueezyEvent = serde_json::from_value(payload.clone())?;

    state
        .payment_service
        .record_webhook_event(
            PROVIDER_LEMONSQUEEZY,
            &event.meta.event_name,
            &event.data.id,
            &payload,
        )
        .await;

    match event.meta.event_name.as_str() {
        "order_created" => {
            let Some(session_id) = event.meta.custom_data.get("session_id") else {
                tracing::warn!(
                    order_id = %event.data.id,
                    "order carries no session_id, nothing to reconcile"
                );
                return Ok((StatusCode::OK, Json(json!({ "received": true }))));
            };
            let outcome = state
                .payment_service
                .apply_checkout_completed(session_id, None, Some(&event.data.id))
                .await?;
            tracing::info!(
                session_id = %session_id,
                order_id = %event.data.id,
                ?outcome,
                "processed order"
            );
        }
        "order_refunded" => {
            let outcome = state.payment_service.apply_refund(&event.data.id).await?;
            tracing::info!(order_id = %event.data.id, ?outcome, "processed refund");
        }
        other => {
            tracing::debug!(event_name = other, "ignoring unhandled event");
        }
    }

    Ok((StatusCode::OK, Json(json!({ "received": true }))))
}
