// kvbench-client - The external DbClient contract and reference in-memory implementations.
//
// The real database client (connection pool, partition map, wire codec, retry, TLS) is outside
// this workspace's scope; this crate only defines the capability the core consumes, plus a
// mock good enough to build, test, and run the harness against.

pub mod mock;
pub mod traits;

pub use mock::{MockAsyncDbClient, MockDbClient};
pub use traits::{AsyncDbClient, BatchPolicy, Key, ReadPolicy, Record, SyncDbClient, WritePolicy};
