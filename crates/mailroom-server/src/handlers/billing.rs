//! Plans, checkout and subscription endpoints

use axum::{
    Json,
    extract::{Path, State},
};
use axum_extra::extract::cookie::SignedCookieJar;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use mailroom_core::model::{BillingCycle, SubscriptionPlan, VirtualAddress};
use mailroom_payments::{
    CheckoutRequest, CheckoutSession, LineItem, LinkRequest, PayMongoClient, PaymentLink,
};

use super::Ack;
use crate::error::ApiError;
use crate::extract::{CurrentUser, clear_auth_data};
use crate::state::AppState;

fn paymongo(state: &AppState) -> Result<&Arc<PayMongoClient>, ApiError> {
    state.paymongo.as_ref().ok_or(ApiError::Unavailable("Payments"))
}

pub async fn plans(State(state): State<AppState>) -> Json<Vec<SubscriptionPlan>> {
    Json(state.service_actions().get_subscription_plans().await)
}

pub async fn locations(State(state): State<AppState>) -> Json<Vec<VirtualAddress>> {
    Json(state.service_actions().get_mailroom_locations().await)
}

#[derive(Debug, Deserialize)]
pub struct CheckoutBody {
    pub plan_id: Uuid,
    #[serde(default)]
    pub billing_cycle: BillingCycle,
}

#[derive(Debug, Serialize)]
pub struct CheckoutResponse {
    pub checkout_url: String,
    pub session_id: String,
}

/// Open a hosted checkout for a plan and record the pending subscription
pub async fn create_checkout(
    State(state): State<AppState>,
    user: CurrentUser,
    jar: SignedCookieJar,
    Json(body): Json<CheckoutBody>,
) -> Result<(SignedCookieJar, Json<CheckoutResponse>), ApiError> {
    let client = paymongo(&state)?;

    let plan = state
        .service_actions()
        .get_subscription_plans()
        .await
        .into_iter()
        .find(|p| p.id == body.plan_id)
        .ok_or_else(|| ApiError::NotFound("Plan".into()))?;

    let amount = plan.price_for(body.billing_cycle);
    if amount <= 0 {
        return Err(ApiError::BadRequest("Plan has no price for this billing cycle".into()));
    }

    let cycle = body.billing_cycle.as_str();
    let mut item = LineItem::new(format!("{} ({cycle})", plan.name), amount);
    item.description.clone_from(&plan.description);

    let request = CheckoutRequest::single(
        item,
        state.config.payment_success_url(),
        state.config.payment_cancel_url(),
    )
    .with_metadata("user_id", user.id().to_string())
    .with_metadata("plan_id", plan.id.to_string())
    .with_metadata("billing_cycle", cycle);

    let session = client.create_checkout_session(&request).await?;

    user.actions(&state)
        .init_subscription_payment(user.id(), plan.id, body.billing_cycle, &session.id)
        .await?;

    tracing::info!(
        user_id = %user.id(),
        plan = %plan.name,
        session_id = %session.id,
        "Checkout started"
    );

    Ok((
        clear_auth_data(jar),
        Json(CheckoutResponse {
            checkout_url: session.checkout_url,
            session_id: session.id,
        }),
    ))
}

pub async fn get_checkout(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path(session_id): Path<String>,
) -> Result<Json<CheckoutSession>, ApiError> {
    let session = paymongo(&state)?
        .retrieve_checkout_session(&session_id)
        .await?;
    Ok(Json(session))
}

pub async fn create_link(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(request): Json<LinkRequest>,
) -> Result<Json<PaymentLink>, ApiError> {
    if request.description.trim().is_empty() {
        return Err(ApiError::BadRequest("Description is required".into()));
    }

    let link = paymongo(&state)?.create_link(&request).await?;
    tracing::info!(user_id = %user.id(), link_id = %link.id, "Payment link created");
    Ok(Json(link))
}

pub async fn get_link(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path(link_id): Path<String>,
) -> Result<Json<PaymentLink>, ApiError> {
    let link = paymongo(&state)?.retrieve_link(&link_id).await?;
    Ok(Json(link))
}

pub async fn cancel_subscription(
    State(state): State<AppState>,
    user: CurrentUser,
    jar: SignedCookieJar,
) -> Result<(SignedCookieJar, Json<Ack>), ApiError> {
    user.actions(&state).cancel_subscription(user.id()).await?;
    tracing::info!(user_id = %user.id(), "Subscription cancelled");
    Ok((clear_auth_data(jar), Json(Ack::OK)))
}
