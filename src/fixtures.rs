use crate::model::OrderWithItems;
use crate::queries;
use chrono::{DateTime, Duration, Utc};
use select_bench_blocking::Connection;
use select_bench_core::{params, Error, Result};
use tracing::{debug, error};

/// The shape of the data the strategies are benchmarked against.
///
/// Orders have ids from `1` to `orders`. The last `empty_orders` of them have no item, all the others have
/// `items_per_order` items.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    pub orders: usize,
    pub items_per_order: usize,
    pub empty_orders: usize,
}

impl Default for Dataset {
    fn default() -> Self {
        Self { orders: 50_000, items_per_order: 5, empty_orders: 0 }
    }
}

impl Dataset {
    pub fn new(orders: usize, items_per_order: usize) -> Self {
        Self { orders, items_per_order, empty_orders: 0 }
    }

    pub fn with_empty_orders(self, empty_orders: usize) -> Self {
        Self { empty_orders: empty_orders.min(self.orders), ..self }
    }

    /// The default dataset, overridden by the variables `SELECT_BENCH_ORDERS`, `SELECT_BENCH_ITEMS_PER_ORDER` and
    /// `SELECT_BENCH_EMPTY_ORDERS` when they are set.
    pub fn from_env() -> Result<Self> {
        let default = Self::default();
        let orders = env_usize("SELECT_BENCH_ORDERS", default.orders)?;
        let items_per_order = env_usize("SELECT_BENCH_ITEMS_PER_ORDER", default.items_per_order)?;
        let empty_orders = env_usize("SELECT_BENCH_EMPTY_ORDERS", default.empty_orders)?;
        let dataset = Self::new(orders, items_per_order).with_empty_orders(empty_orders);
        dataset.last_order_id()?;
        Ok(dataset)
    }

    /// The id of the last order, the ids being stored in 32-bit integer columns.
    pub fn last_order_id(&self) -> Result<i32> {
        i32::try_from(self.orders).map_err(|_| Error::from(format!("Too many orders: {}", self.orders)))
    }

    /// The number of items the order with the given id is expected to have.
    pub fn items_of(&self, order_id: i32) -> usize {
        match order_id {
            id if id < 1 || id as usize > self.orders => 0,
            id if id as usize > self.orders.saturating_sub(self.empty_orders) => 0,
            _ => self.items_per_order,
        }
    }

    pub fn total_items(&self) -> usize {
        self.orders.saturating_sub(self.empty_orders) * self.items_per_order
    }
}

fn env_usize(name: &str, default: usize) -> Result<usize> {
    match std::env::var(name) {
        Ok(value) => {
            value.trim().parse::<usize>().map_err(|e| Error::from(format!("Invalid {}='{}': {}", name, value, e)))
        }
        Err(_) => Ok(default),
    }
}

/// Create the tables and insert the orders and their items.
///
/// The inserts are done in a single transaction, rolled back if any of them fails.
pub fn seed(conn: &mut Connection, dataset: &Dataset) -> Result<()> {
    debug!("Seeding dataset: {:?}", dataset);
    conn.execute_batch(queries::CREATE_TABLES)?;
    conn.execute("BEGIN", None)?;
    match insert(conn, dataset) {
        Ok(()) => {
            conn.execute("COMMIT", None)?;
            Ok(())
        }
        Err(e) => {
            error!("Seeding failed: {}", e);
            if let Err(rollback_error) = conn.execute("ROLLBACK", None) {
                error!("Rollback failed: {}", rollback_error);
            }
            Err(e)
        }
    }
}

fn insert(conn: &mut Connection, dataset: &Dataset) -> Result<()> {
    let epoch = DateTime::<Utc>::UNIX_EPOCH + Duration::days(19_723);
    let last_order_id = dataset.last_order_id()?;
    let mut stmt = conn.prepare(queries::INSERT_ORDER)?;
    for order_id in 1..=last_order_id {
        let created_at = epoch + Duration::minutes(order_id as i64);
        stmt.execute(params!(
            order_id,
            format!("customer{}", order_id),
            created_at.format("%Y-%m-%d %H:%M:%S").to_string()
        ))?;
    }
    drop(stmt);

    let mut stmt = conn.prepare(queries::INSERT_ORDER_ITEM)?;
    let mut item_id: i32 = 0;
    for order_id in 1..=last_order_id {
        for _ in 0..dataset.items_of(order_id) {
            item_id += 1;
            let quantity = match item_id % 3 {
                0 => None,
                _ => Some(item_id % 7 + 1),
            };
            stmt.execute(params!(
                item_id,
                order_id,
                format!("product{}", item_id),
                item_id as f64 * 0.5,
                quantity
            ))?;
        }
    }
    Ok(())
}

/// Check the orders returned by a strategy fetching all of them.
///
/// Fails with {{Error::UnexpectedRowCount}} if the number of orders, or the number of items of any order, is not the
/// one expected from the dataset.
pub fn verify(dataset: &Dataset, orders: &[OrderWithItems]) -> Result<()> {
    if orders.len() != dataset.orders {
        return Err(Error::UnexpectedRowCount {
            what: "orders".to_string(),
            expected: dataset.orders,
            actual: orders.len(),
        });
    }
    orders.iter().try_for_each(|order| verify_items(dataset, order))
}

/// Check the order returned by a strategy fetching a single order.
pub fn verify_one(dataset: &Dataset, order: Option<&OrderWithItems>) -> Result<()> {
    match order {
        Some(order) => verify_items(dataset, order),
        None => Err(Error::UnexpectedRowCount { what: "orders".to_string(), expected: 1, actual: 0 }),
    }
}

fn verify_items(dataset: &Dataset, order: &OrderWithItems) -> Result<()> {
    let expected = dataset.items_of(order.parent.id);
    if order.children.len() != expected {
        return Err(Error::UnexpectedRowCount {
            what: format!("items of order {}", order.parent.id),
            expected,
            actual: order.children.len(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Order, OrderItem};
    use select_bench_core::materialize::Nested;

    fn order(id: i32, items: usize) -> OrderWithItems {
        Nested {
            parent: Order { id, customer_name: format!("customer{}", id), created_at: None },
            children: (0..items)
                .map(|n| OrderItem {
                    id: n as i32,
                    order_id: Some(id),
                    product_name: format!("product{}", n),
                    price: 1.0,
                    quantity: None,
                })
                .collect(),
        }
    }

    #[test]
    fn test_dataset() {
        let dataset = Dataset::default();
        assert_eq!(dataset.orders, 50_000);
        assert_eq!(dataset.items_per_order, 5);
        assert_eq!(dataset.total_items(), 250_000);

        let dataset = Dataset::new(10, 3).with_empty_orders(2);
        assert_eq!(dataset.items_of(1), 3);
        assert_eq!(dataset.items_of(8), 3);
        assert_eq!(dataset.items_of(9), 0);
        assert_eq!(dataset.items_of(11), 0);
        assert_eq!(dataset.items_of(0), 0);
        assert_eq!(dataset.total_items(), 24);
        assert_eq!(Dataset::new(2, 1).with_empty_orders(5).empty_orders, 2);
    }

    #[test]
    fn test_last_order_id() {
        assert_eq!(Dataset::new(10, 3).last_order_id().unwrap(), 10);
        assert_eq!(Dataset::new(i32::MAX as usize, 0).last_order_id().unwrap(), i32::MAX);
        assert!(matches!(Dataset::new(i32::MAX as usize + 1, 0).last_order_id(), Err(Error::InternalError { .. })));
    }

    #[test]
    fn test_verify() {
        let dataset = Dataset::new(2, 2).with_empty_orders(1);
        assert!(verify(&dataset, &[order(1, 2), order(2, 0)]).is_ok());
        assert!(matches!(
            verify(&dataset, &[order(1, 2)]),
            Err(Error::UnexpectedRowCount { expected: 2, actual: 1, .. })
        ));
        assert!(matches!(
            verify(&dataset, &[order(1, 1), order(2, 0)]),
            Err(Error::UnexpectedRowCount { expected: 2, actual: 1, .. })
        ));
        assert!(verify_one(&dataset, Some(&order(1, 2))).is_ok());
        assert!(verify_one(&dataset, Some(&order(2, 1))).is_err());
        assert!(matches!(verify_one(&dataset, None), Err(Error::UnexpectedRowCount { expected: 1, actual: 0, .. })));
    }
}
