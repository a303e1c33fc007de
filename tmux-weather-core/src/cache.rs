//! Fetch-with-cache policy.
//!
//! [`CachedFetch`] wraps a [`Producer`] and a single [`EntryStore`] key:
//!
//! - a fresh entry (younger than the freshness window) is returned without
//!   calling the producer;
//! - a missing or stale entry triggers the producer, whose value is written
//!   back on success;
//! - an unreadable entry is reported to the [`ErrorSink`], erased, and treated
//!   as missing;
//! - when the producer fails (or its value can't be stored) and fallback is
//!   enabled, whatever entry is stored is returned regardless of age.

use async_trait::async_trait;
use chrono::Duration;
use serde::{Serialize, de::DeserializeOwned};
use std::{error::Error as StdError, sync::Arc};
use tracing::{debug, info, warn};

use crate::store::{EntryStore, StoreError};

/// The expensive or unreliable operation that yields a fresh value.
#[async_trait]
pub trait Producer: Send + Sync {
    type Args: Send + Sync;
    type Output: Serialize + DeserializeOwned + Send;

    async fn produce(&self, args: &Self::Args) -> anyhow::Result<Self::Output>;
}

/// Receives errors that the policy recovers from on its own.
pub trait ErrorSink: Send + Sync {
    fn submit(&self, err: &(dyn StdError + 'static));
}

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("failed to produce a value for '{key}'")]
    Producer {
        key: String,
        #[source]
        source: anyhow::Error,
    },

    #[error(transparent)]
    Store(#[from] StoreError),
}

pub struct CachedFetch<P> {
    key: String,
    producer: P,
    freshness: Duration,
    fallback_on_failure: bool,
    store: EntryStore,
    sink: Arc<dyn ErrorSink>,
}

impl<P: Producer> CachedFetch<P> {
    pub fn new(
        key: impl Into<String>,
        producer: P,
        freshness: Duration,
        fallback_on_failure: bool,
        store: EntryStore,
        sink: Arc<dyn ErrorSink>,
    ) -> Self {
        Self { key: key.into(), producer, freshness, fallback_on_failure, store, sink }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn producer(&self) -> &P {
        &self.producer
    }

    pub async fn fetch(&self, args: &P::Args) -> Result<P::Output, FetchError> {
        let key = self.key.as_str();

        match self.store.read::<P::Output>(key) {
            Ok(entry) => {
                let age = self.store.now() - entry.modified;
                if age < self.freshness {
                    debug!(key, age_secs = age.num_seconds(), "serving fresh cache entry");
                    return Ok(entry.value);
                }
                debug!(key, age_secs = age.num_seconds(), "cache entry is stale");
            }
            Err(err) if err.is_not_found() => {
                debug!(key, "no cache entry");
            }
            Err(err) => {
                warn!(key, error = ?err, "discarding unreadable cache entry");
                self.sink.submit(&err);
                self.store.erase(key)?;
            }
        }

        // a value that can't be stored is treated like a failed producer
        let failure = match self.producer.produce(args).await {
            Ok(value) => match self.store.write(key, &value) {
                Ok(()) => return Ok(value),
                Err(err) => FetchError::from(err),
            },
            Err(source) => FetchError::Producer { key: self.key.clone(), source },
        };

        if self.fallback_on_failure {
            match self.store.read::<P::Output>(key) {
                Ok(entry) => {
                    info!(
                        key,
                        error = %failure,
                        written_at = %entry.modified,
                        "refresh failed, serving stored entry"
                    );
                    return Ok(entry.value);
                }
                Err(err) => debug!(key, error = %err, "nothing to fall back to"),
            }
        }

        Err(failure)
    }
}
