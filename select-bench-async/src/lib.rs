#![forbid(unsafe_code)]

pub mod connection;
pub mod materialize;
pub mod streams;

pub use connection::Connection;
pub use materialize::{materialize_one_row, materialize_one_stream, materialize_rows, materialize_stream};
pub use streams::RecordBatchStream;
pub use streams::RowStream;
