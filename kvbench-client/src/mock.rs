//! # Reference DbClient Implementations
//!
//! Purpose: Concrete, in-process stand-ins for the real (out-of-scope) database client, so the
//! benchmark core has something to build, test, and run end to end against. These are test/demo
//! doubles, not wire clients — the same role `MemoryEngine` plays against the `KVEngine` trait
//! elsewhere in this codebase.
//!
//! ## Design Principles
//! 1. **Binary-Safe Storage**: Keys and values are stored as raw bytes, matching the trait's
//!    contract.
//! 2. **Deterministic Failure Injection**: `MockDbClient::with_timeout_every` lets tests and
//!    scenario harnesses reproduce the timeout-simulation scenario without sleeping.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex as StdMutex;

use tokio::sync::Mutex as AsyncMutex;

use kvbench_common::ClientError;

use crate::traits::{AsyncDbClient, BatchPolicy, Key, ReadPolicy, Record, SyncDbClient, WritePolicy};

/// Blocking in-memory `DbClient`, optionally injecting a timeout on every Nth call.
pub struct MockDbClient {
    store: StdMutex<HashMap<Vec<u8>, Vec<u8>>>,
    call_count: AtomicU64,
    timeout_every: Option<u64>,
}

impl MockDbClient {
    /// Creates an always-succeeding mock client.
    pub fn new() -> Self {
        MockDbClient {
            store: StdMutex::new(HashMap::new()),
            call_count: AtomicU64::new(0),
            timeout_every: None,
        }
    }

    /// Creates a mock client that returns `ClientError::Timeout` on every `nth` call
    /// (1-indexed: `nth=2` times out every other call, matching the spec's timeout-simulation
    /// scenario).
    pub fn with_timeout_every(nth: u64) -> Self {
        assert!(nth > 0, "nth must be positive");
        MockDbClient {
            store: StdMutex::new(HashMap::new()),
            call_count: AtomicU64::new(0),
            timeout_every: Some(nth),
        }
    }

    fn maybe_timeout(&self) -> Result<(), ClientError> {
        let Some(nth) = self.timeout_every else {
            return Ok(());
        };
        let count = self.call_count.fetch_add(1, Ordering::Relaxed) + 1;
        if count % nth == 0 {
            Err(ClientError::Timeout)
        } else {
            Ok(())
        }
    }
}

impl Default for MockDbClient {
    fn default() -> Self {
        Self::new()
    }
}

impl SyncDbClient for MockDbClient {
    fn put(&self, _policy: &WritePolicy, key: &Key, _bin_name: &str, value: &[u8]) -> Result<(), ClientError> {
        self.maybe_timeout()?;
        self.store.lock().unwrap().insert(key.0.clone(), value.to_vec());
        Ok(())
    }

    fn get(&self, _policy: &ReadPolicy, key: &Key, _bin_name: &str) -> Result<Option<Record>, ClientError> {
        self.maybe_timeout()?;
        let store = self.store.lock().unwrap();
        Ok(store.get(&key.0).map(|bin| Record { bin: bin.clone() }))
    }

    fn batch_get(
        &self,
        _policy: &BatchPolicy,
        keys: &[Key],
        _bin_name: &str,
    ) -> Result<Vec<Option<Record>>, ClientError> {
        self.maybe_timeout()?;
        let store = self.store.lock().unwrap();
        Ok(keys
            .iter()
            .map(|k| store.get(&k.0).map(|bin| Record { bin: bin.clone() }))
            .collect())
    }
}

/// Async in-memory `DbClient`, optionally injecting a timeout on every Nth call.
pub struct MockAsyncDbClient {
    store: AsyncMutex<HashMap<Vec<u8>, Vec<u8>>>,
    call_count: AtomicU64,
    timeout_every: Option<u64>,
}

impl MockAsyncDbClient {
    /// Creates an always-succeeding mock client.
    pub fn new() -> Self {
        MockAsyncDbClient {
            store: AsyncMutex::new(HashMap::new()),
            call_count: AtomicU64::new(0),
            timeout_every: None,
        }
    }

    /// Creates a mock client that returns `ClientError::Timeout` on every `nth` call.
    pub fn with_timeout_every(nth: u64) -> Self {
        assert!(nth > 0, "nth must be positive");
        MockAsyncDbClient {
            store: AsyncMutex::new(HashMap::new()),
            call_count: AtomicU64::new(0),
            timeout_every: Some(nth),
        }
    }

    fn maybe_timeout(&self) -> Result<(), ClientError> {
        let Some(nth) = self.timeout_every else {
            return Ok(());
        };
        let count = self.call_count.fetch_add(1, Ordering::Relaxed) + 1;
        if count % nth == 0 {
            Err(ClientError::Timeout)
        } else {
            Ok(())
        }
    }
}

impl Default for MockAsyncDbClient {
    fn default() -> Self {
        Self::new()
    }
}

impl AsyncDbClient for MockAsyncDbClient {
    async fn put(&self, _policy: &WritePolicy, key: &Key, _bin_name: &str, value: &[u8]) -> Result<(), ClientError> {
        self.maybe_timeout()?;
        self.store.lock().await.insert(key.0.clone(), value.to_vec());
        Ok(())
    }

    async fn get(&self, _policy: &ReadPolicy, key: &Key, _bin_name: &str) -> Result<Option<Record>, ClientError> {
        self.maybe_timeout()?;
        let store = self.store.lock().await;
        Ok(store.get(&key.0).map(|bin| Record { bin: bin.clone() }))
    }

    async fn batch_get(
        &self,
        _policy: &BatchPolicy,
        keys: &[Key],
        _bin_name: &str,
    ) -> Result<Vec<Option<Record>>, ClientError> {
        self.maybe_timeout()?;
        let store = self.store.lock().await;
        Ok(keys
            .iter()
            .map(|k| store.get(&k.0).map(|bin| Record { bin: bin.clone() }))
            .collect())
    }
}
