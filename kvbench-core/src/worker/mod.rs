//! Worker variants sharing one outer loop shape, differing only in scheduling model.

pub mod async_worker;
pub mod init_worker;
pub mod sync_worker;

pub use async_worker::AsyncWorker;
pub use init_worker::{InitWorker, MAX_INIT_RETRIES};
pub use sync_worker::SyncWorker;
