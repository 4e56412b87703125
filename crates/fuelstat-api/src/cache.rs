//! Short-lived memoization of fetch results
//!
//! Identical queries issued within the TTL are answered from memory. The key
//! is the full encoded query string, so any difference in projection, order,
//! filter, or limit is a separate entry.

use crate::client::TransactionSource;
use crate::query::Query;
use async_trait::async_trait;
use fuelstat_core::error::Result;
use fuelstat_core::types::TransactionTable;
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tracing::debug;

pub struct FetchCache<S> {
    inner: S,
    ttl: Duration,
    entries: RwLock<HashMap<String, (Instant, TransactionTable)>>,
}

impl<S: TransactionSource> FetchCache<S> {
    pub fn new(inner: S, ttl: Duration) -> Self {
        Self {
            inner,
            ttl,
            entries: RwLock::new(HashMap::new()),
        }
    }

    async fn fetch_at(&self, query: &Query, now: Instant) -> Result<TransactionTable> {
        let key = query.query_string();

        if !self.ttl.is_zero() {
            let entries = self.entries.read().await;
            if let Some((stored_at, table)) = entries.get(&key) {
                if now.saturating_duration_since(*stored_at) < self.ttl {
                    debug!("Cache hit for {}", key);
                    return Ok(table.clone());
                }
            }
        }

        let table = self.inner.fetch(query).await?;

        if !self.ttl.is_zero() {
            let mut entries = self.entries.write().await;
            entries.retain(|_, (stored_at, _)| now.saturating_duration_since(*stored_at) < self.ttl);
            entries.insert(key, (now, table.clone()));
        }
        Ok(table)
    }
}

#[async_trait]
impl<S: TransactionSource> TransactionSource for FetchCache<S> {
    async fn fetch(&self, query: &Query) -> Result<TransactionTable> {
        self.fetch_at(query, Instant::now()).await
    }
}
