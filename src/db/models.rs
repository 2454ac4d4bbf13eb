use bigdecimal::BigDecimal;
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Lifecycle of a payment attempt. Rows start at `Pending` and only move
/// forward during reconciliation; anything the gateway reports outside the
/// known set lands on `Unknown`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "payment_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Pending,
    Successful,
    Failed,
    Processing,
    Abandoned,
    Reversed,
    Unknown,
}

impl PaymentStatus {
    /// Maps the gateway's textual status onto the internal enum. The match is
    /// exact and case-sensitive; unrecognized values (including case
    /// variants) become `Unknown`.
    pub fn from_gateway(status: &str) -> Self {
        match status {
            "success" => PaymentStatus::Successful,
            "failed" => PaymentStatus::Failed,
            "processing" => PaymentStatus::Processing,
            "abandoned" => PaymentStatus::Abandoned,
            "reversed" => PaymentStatus::Reversed,
            _ => PaymentStatus::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Successful => "successful",
            PaymentStatus::Failed => "failed",
            PaymentStatus::Processing => "processing",
            PaymentStatus::Abandoned => "abandoned",
            PaymentStatus::Reversed => "reversed",
            PaymentStatus::Unknown => "unknown",
        }
    }
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Payment {
    pub id: Uuid,
    pub transaction_reference: String,
    pub user_email: String,
    pub amount: BigDecimal,
    pub status: PaymentStatus,
    pub payment_channel: Option<String>,
    pub currency: Option<String>,
    pub initiated_at: DateTime<Utc>,
    /// Populated only when the gateway reported a paid timestamp; the value
    /// is the gateway's local timestamp with its zone suffix stripped.
    pub completed_at: Option<NaiveDateTime>,
}

impl Payment {
    /// A freshly initiated payment: reference from the gateway, amount as
    /// supplied by the caller, channel and currency unknown until verified.
    pub fn new(transaction_reference: String, user_email: String, amount: BigDecimal) -> Self {
        Self {
            id: Uuid::new_v4(),
            transaction_reference,
            user_email,
            amount,
            status: PaymentStatus::Pending,
            payment_channel: None,
            currency: None,
            initiated_at: Utc::now(),
            completed_at: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gateway_status_mapping() {
        assert_eq!(
            PaymentStatus::from_gateway("success"),
            PaymentStatus::Successful
        );
        assert_eq!(PaymentStatus::from_gateway("failed"), PaymentStatus::Failed);
        assert_eq!(
            PaymentStatus::from_gateway("processing"),
            PaymentStatus::Processing
        );
        assert_eq!(
            PaymentStatus::from_gateway("abandoned"),
            PaymentStatus::Abandoned
        );
        assert_eq!(
            PaymentStatus::from_gateway("reversed"),
            PaymentStatus::Reversed
        );
    }

    #[test]
    fn test_unrecognized_status_maps_to_unknown() {
        assert_eq!(PaymentStatus::from_gateway(""), PaymentStatus::Unknown);
        assert_eq!(
            PaymentStatus::from_gateway("ongoing"),
            PaymentStatus::Unknown
        );
        assert_eq!(
            PaymentStatus::from_gateway("queued"),
            PaymentStatus::Unknown
        );
    }

    #[test]
    fn test_status_mapping_is_case_sensitive() {
        assert_eq!(
            PaymentStatus::from_gateway("Success"),
            PaymentStatus::Unknown
        );
        assert_eq!(
            PaymentStatus::from_gateway("FAILED"),
            PaymentStatus::Unknown
        );
    }

    #[test]
    fn test_new_payment_defaults() {
        let payment = Payment::new(
            "abc123".to_string(),
            "user@example.com".to_string(),
            "500.00".parse::<BigDecimal>().unwrap(),
        );

        assert_eq!(payment.status, PaymentStatus::Pending);
        assert_eq!(payment.transaction_reference, "abc123");
        assert!(payment.payment_channel.is_none());
        assert!(payment.currency.is_none());
        assert!(payment.completed_at.is_none());
    }
}
