use chrono::{DateTime, Utc};
use common::Entry;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::{error::StoreError, EntryStore};

#[derive(Clone)]
pub struct InMemoryStore {
    entries: Arc<RwLock<Vec<Entry>>>,
    online: Arc<AtomicBool>,
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self {
            entries: Arc::default(),
            online: Arc::new(AtomicBool::new(true)),
        }
    }
}

impl InMemoryStore {
    /// Flips what `health` reports.
    pub fn set_online(&self, online: bool) {
        self.online.store(online, Ordering::SeqCst);
    }
}

fn within(entry: &Entry, start: DateTime<Utc>, end: DateTime<Utc>) -> bool {
    start <= entry.time && entry.time <= end
}

#[axum::async_trait]
impl EntryStore for InMemoryStore {
    async fn add(&self, entry: &Entry) -> Result<(), StoreError> {
        self.entries.write().await.push(entry.clone());
        Ok(())
    }

    async fn query(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Entry>, StoreError> {
        let mut found: Vec<Entry> = self
            .entries
            .read()
            .await
            .iter()
            .filter(|e| within(e, start, end))
            .cloned()
            .collect();
        found.sort_by_key(|e| e.time);
        Ok(found)
    }

    async fn last(&self) -> Result<Entry, StoreError> {
        self.entries
            .read()
            .await
            .last()
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    async fn health(&self) -> Result<(), StoreError> {
        if self.online.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(StoreError::Unavailable("store is offline".into()))
        }
    }

    async fn close(&self) {
        self.set_online(false);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(hour: u32, user: &str) -> Entry {
        Entry {
            time: Utc.with_ymd_and_hms(2024, 3, 1, hour, 0, 0).unwrap(),
            user: user.into(),
            content: format!("at {hour}"),
        }
    }

    #[tokio::test]
    async fn query_range_is_inclusive() {
        let store = InMemoryStore::default();
        let (t1, t2, t3) = (at(1, "a"), at(2, "b"), at(3, "c"));
        // inserted out of order on purpose
        for e in [&t3, &t1, &t2] {
            store.add(e).await.unwrap();
        }

        let found = store.query(t1.time, t2.time).await.unwrap();
        assert_eq!(found, vec![t1.clone(), t2.clone()]);

        let empty = store
            .query(t3.time + chrono::Duration::hours(1), t3.time + chrono::Duration::hours(2))
            .await
            .unwrap();
        assert!(empty.is_empty());
    }

    #[tokio::test]
    async fn last_follows_insertion_order() {
        let store = InMemoryStore::default();
        assert!(matches!(store.last().await, Err(StoreError::NotFound)));

        store.add(&at(5, "late")).await.unwrap();
        store.add(&at(1, "early")).await.unwrap();
        assert_eq!(store.last().await.unwrap().user, "early");
    }

    #[tokio::test]
    async fn close_takes_store_offline() {
        let store = InMemoryStore::default();
        assert!(store.health().await.is_ok());
        store.close().await;
        assert!(matches!(store.health().await, Err(StoreError::Unavailable(_))));
    }
}
