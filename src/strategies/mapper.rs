use crate::model::{OrderItemRow, OrderWithItems};
use crate::queries;
use crate::strategies::Strategy;
use select_bench_blocking::Connection;
use select_bench_core::materialize::{materialize, materialize_one};
use select_bench_core::{params, Result};

/// All the rows are first mapped by column name into a `Vec<OrderItemRow>`, then grouped.
pub struct RowMapper;

impl Strategy for RowMapper {
    const NAME: &'static str = "mapper";

    fn fetch_all(conn: &mut Connection) -> Result<Vec<OrderWithItems>> {
        let rows = conn.prepare(queries::SELECT_ORDERS_WITH_ITEMS)?.query_as::<OrderItemRow>(None)?;
        materialize(rows.into_iter().map(Ok))
    }

    fn fetch_one(conn: &mut Connection, order_id: i32) -> Result<Option<OrderWithItems>> {
        let rows = conn.prepare(queries::SELECT_ORDER_WITH_ITEMS)?.query_as::<OrderItemRow>(params!(order_id))?;
        materialize_one(rows.into_iter().map(Ok))
    }
}
