use crate::model::{OrderAggRow, OrderWithItems};
use crate::queries;
use crate::strategies::Strategy;
use select_bench_blocking::Connection;
use select_bench_core::{params, Result};

/// The database groups the items of each order into a JSON array, a single row is returned per order.
pub struct JsonAgg;

impl Strategy for JsonAgg {
    const NAME: &'static str = "json_agg";

    fn fetch_all(conn: &mut Connection) -> Result<Vec<OrderWithItems>> {
        let rows = conn.prepare(queries::SELECT_ORDERS_JSON)?.query_as::<OrderAggRow>(None)?;
        Ok(rows.into_iter().map(OrderWithItems::from).collect())
    }

    fn fetch_one(conn: &mut Connection, order_id: i32) -> Result<Option<OrderWithItems>> {
        let rows = conn.prepare(queries::SELECT_ORDER_JSON)?.query_as::<OrderAggRow>(params!(order_id))?;
        Ok(rows.into_iter().next().map(OrderWithItems::from))
    }
}
