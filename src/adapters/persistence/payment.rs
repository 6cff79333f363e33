//! Process-lifetime payment store.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::{
    app_error::{AppError, AppResult},
    application::use_cases::payment::{PaymentRepoTrait, PaymentTransition},
    domain::entities::payment::{PaymentRecord, PaymentStatus},
};

/// In-memory payment store keyed by merchant transaction id. State lives for
/// the process lifetime; a durable datastore substitutes behind the same trait.
#[derive(Default)]
pub struct InMemoryPaymentRepo {
    records: Mutex<HashMap<String, PaymentRecord>>,
}

impl InMemoryPaymentRepo {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_records(records: Vec<PaymentRecord>) -> Self {
        let map: HashMap<String, PaymentRecord> = records
            .into_iter()
            .map(|r| (r.merchant_transaction_id.clone(), r))
            .collect();
        Self {
            records: Mutex::new(map),
        }
    }
}

#[async_trait]
impl PaymentRepoTrait for InMemoryPaymentRepo {
    async fn insert(&self, record: PaymentRecord) -> AppResult<()> {
        let mut records = self
            .records
            .lock()
            .map_err(|_| AppError::Internal("payment store lock poisoned".into()))?;
        if records.contains_key(&record.merchant_transaction_id) {
            return Err(AppError::Internal(format!(
                "duplicate merchant transaction id: {}",
                record.merchant_transaction_id
            )));
        }
        records.insert(record.merchant_transaction_id.clone(), record);
        Ok(())
    }

    async fn get(&self, merchant_transaction_id: &str) -> AppResult<Option<PaymentRecord>> {
        let records = self
            .records
            .lock()
            .map_err(|_| AppError::Internal("payment store lock poisoned".into()))?;
        Ok(records.get(merchant_transaction_id).cloned())
    }

    async fn settle(
        &self,
        merchant_transaction_id: &str,
        status: PaymentStatus,
        gateway_transaction_id: Option<String>,
        now: DateTime<Utc>,
    ) -> AppResult<PaymentTransition> {
        let mut records = self
            .records
            .lock()
            .map_err(|_| AppError::Internal("payment store lock poisoned".into()))?;

        let Some(record) = records.get_mut(merchant_transaction_id) else {
            return Ok(PaymentTransition::Unknown);
        };
        if record.status.is_settled() {
            return Ok(PaymentTransition::AlreadySettled(record.clone()));
        }

        record.status = status;
        record.gateway_transaction_id = gateway_transaction_id;
        record.updated_at = now;
        Ok(PaymentTransition::Applied(record.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::create_test_payment;

    #[tokio::test]
    async fn insert_then_get_round_trips() {
        let repo = InMemoryPaymentRepo::new();
        let record = create_test_payment(|_| {});
        repo.insert(record.clone()).await.unwrap();

        let stored = repo.get(&record.merchant_transaction_id).await.unwrap();
        assert_eq!(stored, Some(record));
    }

    #[tokio::test]
    async fn get_unknown_is_none() {
        let repo = InMemoryPaymentRepo::new();
        assert_eq!(repo.get("MT-missing").await.unwrap(), None);
    }

    #[tokio::test]
    async fn duplicate_insert_is_an_error() {
        let repo = InMemoryPaymentRepo::new();
        let record = create_test_payment(|_| {});
        repo.insert(record.clone()).await.unwrap();

        let err = repo.insert(record).await.unwrap_err();
        assert!(matches!(err, AppError::Internal(_)));
    }

    #[tokio::test]
    async fn settle_unknown_transaction() {
        let repo = InMemoryPaymentRepo::new();
        let outcome = repo
            .settle("MT-missing", PaymentStatus::Completed, None, Utc::now())
            .await
            .unwrap();
        assert_eq!(outcome, PaymentTransition::Unknown);
    }

    #[tokio::test]
    async fn settle_applies_once_then_reports_settled() {
        let repo = InMemoryPaymentRepo::new();
        let record = create_test_payment(|_| {});
        let id = record.merchant_transaction_id.clone();
        repo.insert(record).await.unwrap();

        let now = Utc::now();
        let outcome = repo
            .settle(&id, PaymentStatus::Completed, Some("T1".into()), now)
            .await
            .unwrap();
        let PaymentTransition::Applied(settled) = outcome else {
            panic!("expected Applied");
        };
        assert_eq!(settled.status, PaymentStatus::Completed);
        assert_eq!(settled.gateway_transaction_id.as_deref(), Some("T1"));
        assert_eq!(settled.updated_at, now);

        // A second settle, even with a different status, leaves the record alone.
        let outcome = repo
            .settle(&id, PaymentStatus::Failed, Some("T2".into()), Utc::now())
            .await
            .unwrap();
        let PaymentTransition::AlreadySettled(unchanged) = outcome else {
            panic!("expected AlreadySettled");
        };
        assert_eq!(unchanged, settled);
    }
}
