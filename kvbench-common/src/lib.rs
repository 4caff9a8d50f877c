// kvbench-common - Shared types for the KV benchmark harness
//
// Config, errors, the deterministic RNG, and bin-value generation live here so every other
// crate in the workspace depends on one small, dependency-light foundation.

pub mod config;
pub mod error;
pub mod rng;
pub mod value;

pub use config::{BenchmarkConfig, BinType, Mode};
pub use error::{BenchError, ClientError};
pub use rng::FastRng;
pub use value::{BinValue, ValueSource};
