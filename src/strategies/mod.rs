//! The ways of fetching orders with their items that are compared by the benchmarks.
//!
//! Every strategy returns the same result for the same data: the orders in the order of their ids, each of them with
//! its items in the order of their ids. Orders without any item are returned with an empty list of items.

use crate::model::OrderWithItems;
use select_bench_blocking::Connection;
use select_bench_core::Result;

mod json_agg;
mod manual;
mod mapper;
mod preload;
pub mod streaming;
mod struct_mapping;

pub use json_agg::JsonAgg;
pub use manual::ManualScan;
pub use mapper::RowMapper;
pub use preload::Preload;
pub use struct_mapping::StructMapping;

pub trait Strategy {
    /// The name of the strategy as displayed in the reports.
    const NAME: &'static str;

    /// Fetch all the orders with their items.
    fn fetch_all(conn: &mut Connection) -> Result<Vec<OrderWithItems>>;

    /// Fetch a single order with its items.
    ///
    /// Returns `Ok(None)` if there is no order with the given id.
    fn fetch_one(conn: &mut Connection, order_id: i32) -> Result<Option<OrderWithItems>>;
}
