use crate::model::{Order, OrderItem, OrderWithItems};
use crate::queries;
use crate::strategies::Strategy;
use select_bench_blocking::Connection;
use select_bench_core::materialize::{Materializer, Nested};
use select_bench_core::{params, Result};

/// Two queries: the orders first, then their items which are attached to the orders already loaded.
pub struct Preload;

impl Strategy for Preload {
    const NAME: &'static str = "preload";

    fn fetch_all(conn: &mut Connection) -> Result<Vec<OrderWithItems>> {
        let orders = conn.prepare(queries::SELECT_ORDERS)?.query_as::<Order>(None)?;
        let mut materializer = Materializer::with_capacity(orders.len());
        for order in orders {
            materializer.insert_parent(order.id, order);
        }
        let items = conn.prepare(queries::SELECT_ORDER_ITEMS)?.query_as::<OrderItem>(None)?;
        for item in items {
            if let Some(order_id) = item.order_id {
                materializer.attach_child(&order_id, item)?;
            }
        }
        Ok(materializer.finish())
    }

    fn fetch_one(conn: &mut Connection, order_id: i32) -> Result<Option<OrderWithItems>> {
        let orders = conn.prepare(queries::SELECT_ORDER)?.query_as::<Order>(params!(order_id))?;
        let order = match orders.into_iter().next() {
            Some(order) => order,
            None => return Ok(None),
        };
        let items = conn.prepare(queries::SELECT_ORDER_ITEMS_BY_ORDER)?.query_as::<OrderItem>(params!(order_id))?;
        Ok(Some(Nested { parent: order, children: items }))
    }
}
