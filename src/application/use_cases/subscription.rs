//! Subscription state: queries, admin activation, listing.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;

use crate::{
    app_error::AppResult,
    domain::entities::subscription::{ActivationSource, BillingCycle, SubscriptionRecord},
};

/// Plan assigned when the caller does not name one.
pub const DEFAULT_PLAN_NAME: &str = "premium";

#[async_trait]
pub trait SubscriptionRepoTrait: Send + Sync {
    /// Replaces the user's record wholesale. Activation never merges fields.
    async fn upsert(&self, record: SubscriptionRecord) -> AppResult<SubscriptionRecord>;
    async fn get(&self, user_id: &str) -> AppResult<Option<SubscriptionRecord>>;
    async fn list(&self) -> AppResult<Vec<SubscriptionRecord>>;
}

pub struct SubscriptionUseCases {
    subscriptions: Arc<dyn SubscriptionRepoTrait>,
}

impl SubscriptionUseCases {
    pub fn new(subscriptions: Arc<dyn SubscriptionRepoTrait>) -> Self {
        Self { subscriptions }
    }

    /// Returns the stored record, or `None` for users that never subscribed.
    /// Absence means inactive; the HTTP layer renders the synthetic view.
    pub async fn status(&self, user_id: &str) -> AppResult<Option<SubscriptionRecord>> {
        self.subscriptions.get(user_id).await
    }

    /// Administrative override: activates a subscription without any payment
    /// check, replacing whatever record the user had.
    pub async fn admin_activate(
        &self,
        user_id: &str,
        plan_name: Option<String>,
        billing_cycle: Option<BillingCycle>,
    ) -> AppResult<SubscriptionRecord> {
        let record = SubscriptionRecord::activate(
            user_id,
            plan_name.unwrap_or_else(|| DEFAULT_PLAN_NAME.to_string()),
            billing_cycle.unwrap_or_default(),
            ActivationSource::Admin,
            Utc::now(),
        );
        let record = self.subscriptions.upsert(record).await?;
        tracing::info!(
            user_id,
            plan_name = %record.plan_name,
            billing_cycle = record.billing_cycle.as_str(),
            "Subscription activated by admin"
        );
        Ok(record)
    }

    pub async fn list_all(&self) -> AppResult<Vec<SubscriptionRecord>> {
        self.subscriptions.list().await
    }
}
