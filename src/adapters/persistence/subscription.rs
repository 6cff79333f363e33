//! Process-lifetime subscription store.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::{
    app_error::{AppError, AppResult},
    application::use_cases::subscription::SubscriptionRepoTrait,
    domain::entities::subscription::SubscriptionRecord,
};

/// In-memory subscription store keyed by user id. Absence of an entry means
/// the user is inactive.
#[derive(Default)]
pub struct InMemorySubscriptionRepo {
    records: Mutex<HashMap<String, SubscriptionRecord>>,
}

impl InMemorySubscriptionRepo {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_records(records: Vec<SubscriptionRecord>) -> Self {
        let map: HashMap<String, SubscriptionRecord> = records
            .into_iter()
            .map(|r| (r.user_id.clone(), r))
            .collect();
        Self {
            records: Mutex::new(map),
        }
    }
}

#[async_trait]
impl SubscriptionRepoTrait for InMemorySubscriptionRepo {
    async fn upsert(&self, record: SubscriptionRecord) -> AppResult<SubscriptionRecord> {
        let mut records = self
            .records
            .lock()
            .map_err(|_| AppError::Internal("subscription store lock poisoned".into()))?;
        records.insert(record.user_id.clone(), record.clone());
        Ok(record)
    }

    async fn get(&self, user_id: &str) -> AppResult<Option<SubscriptionRecord>> {
        let records = self
            .records
            .lock()
            .map_err(|_| AppError::Internal("subscription store lock poisoned".into()))?;
        Ok(records.get(user_id).cloned())
    }

    async fn list(&self) -> AppResult<Vec<SubscriptionRecord>> {
        let records = self
            .records
            .lock()
            .map_err(|_| AppError::Internal("subscription store lock poisoned".into()))?;
        Ok(records.values().cloned().collect())
    }
}
