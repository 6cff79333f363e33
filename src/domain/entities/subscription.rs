use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BillingCycle {
    #[default]
    Monthly,
    Annual,
}

impl BillingCycle {
    pub fn as_str(&self) -> &'static str {
        match self {
            BillingCycle::Monthly => "monthly",
            BillingCycle::Annual => "annual",
        }
    }

    /// Length of one billing period, used as the expiry offset on activation.
    pub fn period(&self) -> Duration {
        match self {
            BillingCycle::Monthly => Duration::days(30),
            BillingCycle::Annual => Duration::days(365),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubscriptionStatus {
    Active,
    Inactive,
}

impl SubscriptionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubscriptionStatus::Active => "active",
            SubscriptionStatus::Inactive => "inactive",
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self, SubscriptionStatus::Active)
    }
}

/// Who activated a subscription: the payment webhook or an administrator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivationSource {
    Webhook,
    Admin,
}

/// Subscription state for one user, keyed by user id. Activation always
/// overwrites the whole record. `expires_at` is advisory metadata; nothing
/// sweeps expired records.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionRecord {
    pub user_id: String,
    pub plan_name: String,
    pub billing_cycle: BillingCycle,
    pub status: SubscriptionStatus,
    pub activated_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub activated_by: ActivationSource,
}

impl SubscriptionRecord {
    pub fn activate(
        user_id: impl Into<String>,
        plan_name: impl Into<String>,
        billing_cycle: BillingCycle,
        activated_by: ActivationSource,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            plan_name: plan_name.into(),
            billing_cycle,
            status: SubscriptionStatus::Active,
            activated_at: now,
            expires_at: now + billing_cycle.period(),
            activated_by,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn monthly_expiry_is_thirty_days_out() {
        let now = Utc::now();
        let sub = SubscriptionRecord::activate(
            "u1",
            "premium",
            BillingCycle::Monthly,
            ActivationSource::Webhook,
            now,
        );
        assert_eq!(sub.expires_at - now, Duration::days(30));
        assert_eq!(sub.status, SubscriptionStatus::Active);
    }

    #[test]
    fn annual_expiry_is_a_year_out() {
        let now = Utc::now();
        let sub = SubscriptionRecord::activate(
            "u1",
            "premium",
            BillingCycle::Annual,
            ActivationSource::Admin,
            now,
        );
        assert_eq!(sub.expires_at - now, Duration::days(365));
        assert_eq!(sub.activated_by, ActivationSource::Admin);
    }

    #[test]
    fn billing_cycle_deserializes_lowercase() {
        assert_eq!(
            serde_json::from_str::<BillingCycle>("\"annual\"").unwrap(),
            BillingCycle::Annual
        );
        assert_eq!(
            serde_json::from_str::<BillingCycle>("\"monthly\"").unwrap(),
            BillingCycle::Monthly
        );
    }

    #[test]
    fn activation_source_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&ActivationSource::Webhook).unwrap(),
            "\"webhook\""
        );
        assert_eq!(
            serde_json::to_string(&ActivationSource::Admin).unwrap(),
            "\"admin\""
        );
    }
}
