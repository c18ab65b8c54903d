//! Rows are streamed from the async connection and grouped as they arrive.
//!
//! The connection runs the driver on its own thread, the record batches are fetched one at a time while the previous
//! one is being materialized.

use crate::model::{OrderItemRow, OrderWithItems};
use crate::queries;
use select_bench_async::{materialize_one_row, materialize_rows, Connection};
use select_bench_core::{params, Result};

pub const NAME: &str = "streaming";

pub async fn fetch_all(conn: &mut Connection) -> Result<Vec<OrderWithItems>> {
    let rows = conn.query_rows(queries::SELECT_ORDERS_WITH_ITEMS, None).await?;
    materialize_rows::<OrderItemRow>(rows).await
}

pub async fn fetch_one(conn: &mut Connection, order_id: i32) -> Result<Option<OrderWithItems>> {
    let rows = conn.query_rows(queries::SELECT_ORDER_WITH_ITEMS, params!(order_id)).await?;
    materialize_one_row::<OrderItemRow>(rows).await
}
