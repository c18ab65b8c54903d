#![forbid(unsafe_code)]
//! Blocking access to the drivers: a [Connection] prepares [Statement]s whose rows are read one at a time or grouped
//! into nested entities.

pub mod connection;
pub mod statement;

pub use connection::Connection;
pub use select_bench_core::rows::Rows;
pub use statement::Statement;
