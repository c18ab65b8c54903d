//! # Crate Topology
//!
//! The `select-bench` project is implemented as multiple sub-crates, which are then re-exported by this top-level
//! crate.
//!
//! The current list of sub-crates is:
//!
//! * [`select-bench-core`][select_bench_core] - the core traits and types, and the materializer turning the rows of a
//!   one-to-many join into nested entities
//! * [`select-bench-blocking`][select_bench_blocking] - blocking connections and statements
//! * [`select-bench-async`][select_bench_async] - asynchronous adapter for the drivers
//! * [`select-bench-sqlite`][select_bench_sqlite] - the [SQLite](https://sqlite.org) driver
//!
//! This crate holds the order model, the fetch strategies being compared and the fixtures used to seed and check the
//! benchmark database.

pub mod fixtures;
pub mod model;
pub mod queries;
pub mod strategies;

pub use select_bench_blocking::Connection;
pub use select_bench_blocking::Rows;
pub use select_bench_blocking::Statement;
pub use select_bench_core::materialize::{materialize, materialize_one, JoinRow, Materializer, Nested};
pub use select_bench_core::parameters::Parameters;
pub use select_bench_core::row::{FromRow, Row};
pub use select_bench_core::Error;
pub use select_bench_core::Result;

// Re-export the `params!` and `execute!` macros.
pub use select_bench_core::execute;
pub use select_bench_core::params;

pub mod futures {
    pub use select_bench_async::Connection;
    pub use select_bench_async::RecordBatchStream;
    pub use select_bench_async::RowStream;
}

pub fn register_drivers() {
    #[cfg(feature = "sqlite")]
    select_bench_sqlite::register_driver();
}
