use bigdecimal::{BigDecimal, ToPrimitive};
use failsafe::futures::CircuitBreaker as FuturesCircuitBreaker;
use failsafe::{backoff, failure_policy, Config, Error as FailsafeError, StateMachine};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::time::Duration;
use thiserror::Error;

/// Channels offered to the payer on the gateway's checkout page.
const PAYMENT_CHANNELS: [&str; 5] = ["card", "bank", "ussd", "qr", "bank_transfer"];

#[derive(Error, Debug)]
pub enum PaystackError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),
    #[error("Gateway returned status {status}")]
    UnexpectedStatus { status: u16, body: String },
    #[error("Amount not representable in minor units: {0}")]
    InvalidAmount(String),
    #[error("Circuit breaker open: {0}")]
    CircuitBreakerOpen(String),
}

/// Payload of a successful `POST /transaction/initialize`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InitializeData {
    pub authorization_url: String,
    pub access_code: Option<String>,
    pub reference: String,
}

#[derive(Debug, Deserialize)]
struct InitializeResponse {
    data: InitializeData,
}

/// Payload of a successful `GET /transaction/verify/{reference}`.
///
/// `amount` is in the gateway's minor units. `paid_at`, when present, is the
/// gateway's zone-suffixed timestamp string, passed through raw; callers
/// parse it with `utils::timestamps::parse_gateway_timestamp`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerifyData {
    pub status: String,
    pub reference: String,
    pub amount: i64,
    pub channel: String,
    pub currency: String,
    pub paid_at: Option<String>,
}

#[derive(Debug, Deserialize)]
struct VerifyResponse {
    data: VerifyData,
}

/// HTTP client for the Paystack transaction API.
#[derive(Clone)]
pub struct PaystackClient {
    client: Client,
    base_url: String,
    secret_key: String,
    circuit_breaker: StateMachine<failure_policy::ConsecutiveFailures<backoff::EqualJittered>, ()>,
}

impl PaystackClient {
    /// Creates a new client. `timeout` bounds every outbound call; there is
    /// no retry and no cancellation once a call is issued.
    pub fn new(base_url: String, secret_key: String, timeout: Duration) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_default();

        let backoff = backoff::equal_jittered(Duration::from_secs(60), Duration::from_secs(120));
        let policy = failure_policy::consecutive_failures(3, backoff);
        let circuit_breaker = Config::new().failure_policy(policy).build();

        PaystackClient {
            client,
            base_url,
            secret_key,
            circuit_breaker,
        }
    }

    /// Returns the current state of the circuit breaker
    pub fn circuit_state(&self) -> String {
        if self.circuit_breaker.is_call_permitted() {
            "closed".to_string()
        } else {
            "open".to_string()
        }
    }

    /// Starts a transaction with the gateway. The caller supplies the amount
    /// in major currency units; the wire format wants minor units (x100).
    ///
    /// A non-200 reply is not an HTTP-level failure here: the status and raw
    /// body come back as `UnexpectedStatus` for the orchestration layer to
    /// log and relay.
    pub async fn initialize_transaction(
        &self,
        email: &str,
        amount: &BigDecimal,
    ) -> Result<InitializeData, PaystackError> {
        let minor_units = (amount.clone() * BigDecimal::from(100))
            .to_i64()
            .ok_or_else(|| PaystackError::InvalidAmount(amount.to_string()))?;

        let url = format!(
            "{}/transaction/initialize",
            self.base_url.trim_end_matches('/')
        );
        let client = self.client.clone();
        let secret_key = self.secret_key.clone();
        let payload = json!({
            "email": email,
            "amount": minor_units,
            "channels": PAYMENT_CHANNELS,
        });

        let result = self
            .circuit_breaker
            .call(async move {
                let response = client
                    .post(&url)
                    .bearer_auth(&secret_key)
                    .json(&payload)
                    .send()
                    .await?;

                let status = response.status();
                if status != StatusCode::OK {
                    let body = response.text().await.unwrap_or_default();
                    return Err(PaystackError::UnexpectedStatus {
                        status: status.as_u16(),
                        body,
                    });
                }

                let parsed = response.json::<InitializeResponse>().await?;
                Ok(parsed.data)
            })
            .await;

        match result {
            Ok(data) => Ok(data),
            Err(FailsafeError::Rejected) => Err(PaystackError::CircuitBreakerOpen(
                "Paystack circuit breaker is open".to_string(),
            )),
            Err(FailsafeError::Inner(e)) => Err(e),
        }
    }

    /// Read-only status lookup by reference. Same non-200 contract as
    /// `initialize_transaction`; no store access, no side effects.
    pub async fn verify_transaction(&self, reference: &str) -> Result<VerifyData, PaystackError> {
        let url = format!(
            "{}/transaction/verify/{}",
            self.base_url.trim_end_matches('/'),
            reference
        );
        let client = self.client.clone();
        let secret_key = self.secret_key.clone();

        let result = self
            .circuit_breaker
            .call(async move {
                let response = client.get(&url).bearer_auth(&secret_key).send().await?;

                let status = response.status();
                if status != StatusCode::OK {
                    let body = response.text().await.unwrap_or_default();
                    return Err(PaystackError::UnexpectedStatus {
                        status: status.as_u16(),
                        body,
                    });
                }

                let parsed = response.json::<VerifyResponse>().await?;
                Ok(parsed.data)
            })
            .await;

        match result {
            Ok(data) => Ok(data),
            Err(FailsafeError::Rejected) => Err(PaystackError::CircuitBreakerOpen(
                "Paystack circuit breaker is open".to_string(),
            )),
            Err(FailsafeError::Inner(e)) => Err(e),
        }
    }
}
