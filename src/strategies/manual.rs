use crate::model::{Order, OrderItem, OrderWithItems};
use crate::queries;
use crate::strategies::Strategy;
use select_bench_blocking::{Connection, Rows};
use select_bench_core::materialize::Materializer;
use select_bench_core::{params, Result};

/// Columns are read by position and grouped by hand, without any mapping to an intermediate row type.
pub struct ManualScan;

impl ManualScan {
    fn scan(rows: Rows<'_>, materializer: &mut Materializer<i32, Order, OrderItem>) -> Result<()> {
        for row in rows {
            let row = row?;
            let order_id: i32 = row.try_get(0)?;
            if !materializer.contains(&order_id) {
                let order = Order { id: order_id, customer_name: row.try_get(1)?, created_at: row.try_get_nullable(2)? };
                if !materializer.insert_parent(order_id, order) {
                    continue;
                }
            }
            if let (Some(item_id), Some(item_order_id)) =
                (row.try_get_nullable::<_, i32>(3)?, row.try_get_nullable::<_, i32>(4)?)
            {
                let item = OrderItem {
                    id: item_id,
                    order_id: Some(item_order_id),
                    product_name: row.try_get(5)?,
                    price: row.try_get(6)?,
                    quantity: row.try_get_nullable(7)?,
                };
                materializer.attach_child(&item_order_id, item)?;
            }
        }
        Ok(())
    }
}

impl Strategy for ManualScan {
    const NAME: &'static str = "manual";

    fn fetch_all(conn: &mut Connection) -> Result<Vec<OrderWithItems>> {
        let mut stmt = conn.prepare(queries::SELECT_ORDERS_WITH_ITEMS)?;
        let mut materializer = Materializer::new();
        Self::scan(stmt.query_rows(None)?, &mut materializer)?;
        Ok(materializer.finish())
    }

    fn fetch_one(conn: &mut Connection, order_id: i32) -> Result<Option<OrderWithItems>> {
        let mut stmt = conn.prepare(queries::SELECT_ORDER_WITH_ITEMS)?;
        let mut materializer = Materializer::bounded(1);
        Self::scan(stmt.query_rows(params!(order_id))?, &mut materializer)?;
        Ok(materializer.finish().into_iter().next())
    }
}
