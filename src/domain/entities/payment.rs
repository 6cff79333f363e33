use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::subscription::BillingCycle;

/// Lifecycle of a payment order. A record is created `Pending` and settles at
/// most once to `Completed` or `Failed`; settled records are never reopened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    Pending,
    Completed,
    Failed,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "PENDING",
            PaymentStatus::Completed => "COMPLETED",
            PaymentStatus::Failed => "FAILED",
        }
    }

    /// Map the gateway's callback `state` field. Anything other than a literal
    /// "COMPLETED" settles the payment as failed; never complete on unknown input.
    pub fn from_gateway_state(state: &str) -> Self {
        if state == "COMPLETED" {
            PaymentStatus::Completed
        } else {
            PaymentStatus::Failed
        }
    }

    pub fn is_settled(&self) -> bool {
        !matches!(self, PaymentStatus::Pending)
    }
}

impl std::fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A payment attempt, keyed by the merchant transaction id this service assigns
/// at order creation. `amount` is in minor currency units (paise).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRecord {
    pub merchant_transaction_id: String,
    pub merchant_id: String,
    pub user_id: String,
    pub amount: i64,
    pub currency: String,
    pub plan_name: String,
    pub billing_cycle: BillingCycle,
    pub status: PaymentStatus,
    /// Transaction id assigned by the gateway, known only after the callback.
    #[serde(rename = "transactionId", skip_serializing_if = "Option::is_none")]
    pub gateway_transaction_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gateway_state_maps_completed() {
        assert_eq!(
            PaymentStatus::from_gateway_state("COMPLETED"),
            PaymentStatus::Completed
        );
    }

    #[test]
    fn gateway_state_never_completes_on_unknown_input() {
        for state in ["FAILED", "PENDING", "completed", "", "SUCCESS"] {
            assert_eq!(
                PaymentStatus::from_gateway_state(state),
                PaymentStatus::Failed,
                "state {state:?} must not settle as completed"
            );
        }
    }

    #[test]
    fn settled_statuses() {
        assert!(!PaymentStatus::Pending.is_settled());
        assert!(PaymentStatus::Completed.is_settled());
        assert!(PaymentStatus::Failed.is_settled());
    }

    #[test]
    fn status_serializes_screaming_case() {
        assert_eq!(
            serde_json::to_string(&PaymentStatus::Pending).unwrap(),
            "\"PENDING\""
        );
        assert_eq!(
            serde_json::to_string(&PaymentStatus::Completed).unwrap(),
            "\"COMPLETED\""
        );
    }
}
