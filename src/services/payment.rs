use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::auth::AuthenticatedUser;
use crate::db::models::{Payment, PaymentStatus};
use crate::db::queries;
use crate::error::AppError;
use crate::paystack::{PaystackClient, VerifyData};
use crate::utils::timestamps::{format_gateway_timestamp, parse_gateway_timestamp};

/// Response envelope shared by every payment operation: a human message, a
/// stringly status code, and the payload.
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiEnvelope<T> {
    pub message: String,
    pub status_code: String,
    pub data: Option<T>,
}

impl<T> ApiEnvelope<T> {
    fn ok(message: &str, data: T) -> Self {
        Self {
            message: message.to_string(),
            status_code: "200".to_string(),
            data: Some(data),
        }
    }

    fn not_found(message: String) -> Self {
        Self {
            message,
            status_code: "404".to_string(),
            data: None,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct InitializationData {
    pub authorization_url: String,
    pub reference: String,
}

/// Verification payload returned to the caller. Built from the gateway
/// response independently of the reconciliation write; `amount` stays in the
/// gateway's minor units, rendered as a string.
#[derive(Debug, Serialize, Deserialize)]
pub struct VerificationData {
    pub status: String,
    pub reference: String,
    pub amount: String,
    pub channel: String,
    pub currency: String,
    pub paid_at: String,
}

/// External shape of a stored payment.
#[derive(Debug, Serialize, Deserialize)]
pub struct PaymentRecord {
    pub reference: String,
    pub user_email: String,
    pub amount: String,
    pub status: PaymentStatus,
    pub channel: Option<String>,
    pub currency: Option<String>,
    pub initiated_at: DateTime<Utc>,
    pub completed_at: Option<String>,
}

impl From<Payment> for PaymentRecord {
    fn from(payment: Payment) -> Self {
        Self {
            reference: payment.transaction_reference,
            user_email: payment.user_email,
            amount: payment.amount.to_string(),
            status: payment.status,
            channel: payment.payment_channel,
            currency: payment.currency,
            initiated_at: payment.initiated_at,
            completed_at: payment
                .completed_at
                .map(|ts| format_gateway_timestamp(&ts)),
        }
    }
}

/// Orchestrates payment initiation, verification and lookups. Holds its
/// dependencies explicitly; constructed once at startup and shared through
/// the application state.
#[derive(Clone)]
pub struct PaymentService {
    pool: PgPool,
    paystack: PaystackClient,
}

impl PaymentService {
    pub fn new(pool: PgPool, paystack: PaystackClient) -> Self {
        Self { pool, paystack }
    }

    /// Starts a payment for the authenticated user. On gateway success the
    /// pending row is persisted under the gateway-assigned reference; on a
    /// non-200 gateway reply the status and body are relayed verbatim.
    pub async fn initiate_payment(
        &self,
        user: &AuthenticatedUser,
        amount: BigDecimal,
    ) -> Result<ApiEnvelope<InitializationData>, AppError> {
        let init = self
            .paystack
            .initialize_transaction(&user.email, &amount)
            .await
            .map_err(|e| {
                tracing::error!("Failed to initiate payment: {}", e);
                AppError::from(e)
            })?;

        let payment = Payment::new(init.reference.clone(), user.email.clone(), amount);
        queries::insert_payment(&self.pool, &payment).await?;

        Ok(ApiEnvelope::ok(
            "Paystack Payment Successfully Initialized",
            InitializationData {
                authorization_url: init.authorization_url,
                reference: init.reference,
            },
        ))
    }

    /// Looks up the reference with the gateway, reconciles the stored row as
    /// a side effect, then builds a second payload straight from the same
    /// gateway response.
    pub async fn verify_payment(
        &self,
        user: &AuthenticatedUser,
        reference: &str,
    ) -> Result<ApiEnvelope<VerificationData>, AppError> {
        let data = match self.paystack.verify_transaction(reference).await {
            Ok(data) => data,
            Err(e) => {
                tracing::error!("Failed to verify payment {}: {}", reference, e);
                return Err(e.into());
            }
        };

        self.reconcile_verification(&user.email, reference, &data)
            .await?;

        Ok(ApiEnvelope::ok(
            "Verification Successful",
            build_verification_payload(reference, &data),
        ))
    }

    /// Applies a verification response to the stored row. A missing row is a
    /// no-op: verification is best-effort reconciliation, not an upsert.
    async fn reconcile_verification(
        &self,
        email: &str,
        reference: &str,
        data: &VerifyData,
    ) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;

        let Some(payment) =
            queries::lock_by_user_email_and_reference(&mut tx, email, reference).await?
        else {
            tracing::debug!(
                "No stored payment for {} with reference {}, skipping reconciliation",
                email,
                reference
            );
            tx.rollback().await?;
            return Ok(());
        };

        let status = PaymentStatus::from_gateway(&data.status);
        let completed_at = data
            .paid_at
            .as_deref()
            .and_then(|raw| parse_gateway_timestamp(raw).ok());

        queries::apply_verification(
            &mut tx,
            payment.id,
            status,
            &data.channel,
            &BigDecimal::from(data.amount),
            &data.currency,
            completed_at,
        )
        .await?;

        tx.commit().await?;
        Ok(())
    }

    pub async fn get_payments_by_user_email(
        &self,
        email: &str,
    ) -> Result<ApiEnvelope<Vec<PaymentRecord>>, AppError> {
        let payments = queries::find_by_user_email(&self.pool, email).await?;
        let records = payments.into_iter().map(PaymentRecord::from).collect();

        Ok(ApiEnvelope::ok(
            "User payments successfully fetched",
            records,
        ))
    }

    /// Absence is a structured result here, not an error: the envelope
    /// carries a "404" code and a null payload.
    pub async fn find_payment_by_reference(
        &self,
        reference: &str,
    ) -> Result<ApiEnvelope<PaymentRecord>, AppError> {
        match queries::find_by_reference(&self.pool, reference).await? {
            Some(payment) => Ok(ApiEnvelope::ok(
                "Payment fetched successfully",
                PaymentRecord::from(payment),
            )),
            None => Ok(ApiEnvelope::not_found(format!(
                "Payment with {} not found",
                reference
            ))),
        }
    }
}

fn build_verification_payload(reference: &str, data: &VerifyData) -> VerificationData {
    let paid_at = data
        .paid_at
        .as_deref()
        .and_then(|raw| parse_gateway_timestamp(raw).ok())
        .map(|ts| format_gateway_timestamp(&ts))
        .unwrap_or_default();

    VerificationData {
        status: data.status.clone(),
        reference: reference.to_string(),
        amount: data.amount.to_string(),
        channel: data.channel.clone(),
        currency: data.currency.clone(),
        paid_at,
    }
}
