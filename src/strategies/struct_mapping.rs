use crate::model::{OrderItemRow, OrderWithItems};
use crate::queries;
use crate::strategies::Strategy;
use select_bench_blocking::Connection;
use select_bench_core::{params, Result};

/// Rows are decoded and grouped in a single pass as they are read from the record batches.
pub struct StructMapping;

impl Strategy for StructMapping {
    const NAME: &'static str = "struct_mapping";

    fn fetch_all(conn: &mut Connection) -> Result<Vec<OrderWithItems>> {
        conn.prepare(queries::SELECT_ORDERS_WITH_ITEMS)?.materialize::<OrderItemRow>(None)
    }

    fn fetch_one(conn: &mut Connection, order_id: i32) -> Result<Option<OrderWithItems>> {
        conn.prepare(queries::SELECT_ORDER_WITH_ITEMS)?.materialize_one::<OrderItemRow>(params!(order_id))
    }
}
