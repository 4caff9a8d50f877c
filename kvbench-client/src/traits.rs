//! # DbClient Contract
//!
//! Purpose: Define the external database-client capability the benchmark core consumes. The
//! core never interprets keys, records, or policies; it only threads them through.
//!
//! ## Design Principles
//! 1. **Strategy Pattern**: Workers are generic over a client type so calls monomorphize to
//!    avoid dynamic dispatch overhead — the same posture the storage-engine trait in this
//!    codebase takes toward its concrete implementation.
//! 2. **Binary-Safe Keys**: Keys are opaque byte buffers; the core does not hash or compare
//!    them beyond what the client requires.
//! 3. **No Boxed Futures**: The async flavor uses a plain `async fn` in the trait. Because
//!    callers are generic (never `dyn AsyncDbClient`), this compiles to a concrete future per
//!    call site with no allocation.

use std::future::Future;

use kvbench_common::ClientError;

/// Opaque primary key. The core never inspects the bytes, only selects indices into the
/// keyspace and hands the resulting key to the client.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Key(pub Vec<u8>);

impl Key {
    /// Builds a key from a numeric index, matching the common benchmark convention of keys
    /// named `user<index>` or similar; the exact encoding is a client-side concern, but the
    /// core needs *some* deterministic byte form to pass to `DbClient`.
    pub fn from_index(index: u64) -> Self {
        Key(format!("key:{index}").into_bytes())
    }
}

/// A single field value read back from the database.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    /// Raw bytes of the requested bin.
    pub bin: Vec<u8>,
}

/// Policy for a read. Opaque to the core; fields exist so a real client has somewhere to hang
/// timeouts, consistency levels, and so on.
#[derive(Debug, Clone, Default)]
pub struct ReadPolicy {
    /// Client-side timeout, if any.
    pub timeout_ms: Option<u64>,
}

/// Policy for a write. Opaque to the core.
#[derive(Debug, Clone, Default)]
pub struct WritePolicy {
    /// Client-side timeout, if any.
    pub timeout_ms: Option<u64>,
}

/// Policy for a batch read. Opaque to the core.
#[derive(Debug, Clone, Default)]
pub struct BatchPolicy {
    /// Client-side timeout, if any.
    pub timeout_ms: Option<u64>,
}

/// Blocking database client capability, used by `SyncWorker` and `InitWorker`.
pub trait SyncDbClient: Send + Sync {
    /// Writes `bin` to `key`. Writes are always single-key, even when batching is configured.
    fn put(&self, policy: &WritePolicy, key: &Key, bin_name: &str, value: &[u8]) -> Result<(), ClientError>;

    /// Reads `bin_name` from `key`, or `Ok(None)` if the key does not exist.
    fn get(&self, policy: &ReadPolicy, key: &Key, bin_name: &str) -> Result<Option<Record>, ClientError>;

    /// Reads `bin_name` from each of `keys` in one request; the result vector has one entry per
    /// key, in the same order, with `None` for keys that do not exist.
    fn batch_get(
        &self,
        policy: &BatchPolicy,
        keys: &[Key],
        bin_name: &str,
    ) -> Result<Vec<Option<Record>>, ClientError>;
}

/// Async database client capability, used by `AsyncWorker`.
pub trait AsyncDbClient: Send + Sync {
    /// Writes `bin` to `key`. Writes are always single-key, even when batching is configured.
    fn put(
        &self,
        policy: &WritePolicy,
        key: &Key,
        bin_name: &str,
        value: &[u8],
    ) -> impl Future<Output = Result<(), ClientError>> + Send;

    /// Reads `bin_name` from `key`, or `Ok(None)` if the key does not exist.
    fn get(
        &self,
        policy: &ReadPolicy,
        key: &Key,
        bin_name: &str,
    ) -> impl Future<Output = Result<Option<Record>, ClientError>> + Send;

    /// Reads `bin_name` from each of `keys` in one request.
    fn batch_get(
        &self,
        policy: &BatchPolicy,
        keys: &[Key],
        bin_name: &str,
    ) -> impl Future<Output = Result<Vec<Option<Record>>, ClientError>> + Send;
}
