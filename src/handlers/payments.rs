use axum::{
    Json,
    extract::{Path, State},
    response::IntoResponse,
};
use bigdecimal::BigDecimal;
use serde::Deserialize;

use crate::AppState;
use crate::auth::AuthenticatedUser;
use crate::error::AppError;

#[derive(Debug, Deserialize)]
pub struct InitiatePaymentRequest {
    pub amount: BigDecimal,
}

pub async fn initiate_payment(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(request): Json<InitiatePaymentRequest>,
) -> Result<impl IntoResponse, AppError> {
    let envelope = state.payments.initiate_payment(&user, request.amount).await?;
    Ok(Json(envelope))
}

pub async fn verify_payment(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(reference): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let envelope = state.payments.verify_payment(&user, &reference).await?;
    Ok(Json(envelope))
}

pub async fn get_user_payments(
    State(state): State<AppState>,
    Path(email): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let envelope = state.payments.get_payments_by_user_email(&email).await?;
    Ok(Json(envelope))
}

/// Absent references come back as a 200 with a "404" status_code in the
/// envelope body, matching the lookup contract of the payment service.
pub async fn find_payment_by_reference(
    State(state): State<AppState>,
    Path(reference): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let envelope = state.payments.find_payment_by_reference(&reference).await?;
    Ok(Json(envelope))
}
