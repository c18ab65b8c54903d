use chrono::{DateTime, Utc};
use select_bench_core::decode::Json;
use select_bench_core::materialize::{JoinRow, Nested};
use select_bench_core::row::{FromRow, Row};
use select_bench_core::Result;
use serde::Deserialize;

#[derive(Debug, Clone, PartialEq)]
pub struct Order {
    pub id: i32,
    pub customer_name: String,
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct OrderItem {
    pub id: i32,
    pub order_id: Option<i32>,
    pub product_name: String,
    pub price: f64,
    pub quantity: Option<i32>,
}

/// An order with its items, in the order of their ids.
pub type OrderWithItems = Nested<Order, OrderItem>;

impl Order {
    pub(crate) fn try_from_row(row: &Row) -> Result<Self> {
        Ok(Order {
            id: row.try_get("orders.id")?,
            customer_name: row.try_get("orders.customer_name")?,
            created_at: row.try_get_nullable("orders.created_at")?,
        })
    }
}

impl FromRow for Order {
    fn from_row(row: &Row) -> Result<Self> {
        Order::try_from_row(row)
    }
}

impl FromRow for OrderItem {
    fn from_row(row: &Row) -> Result<Self> {
        Ok(OrderItem {
            id: row.try_get("order_items.id")?,
            order_id: row.try_get_nullable("order_items.order_id")?,
            product_name: row.try_get("order_items.product_name")?,
            price: row.try_get("order_items.price")?,
            quantity: row.try_get_nullable("order_items.quantity")?,
        })
    }
}

/// A row of `orders LEFT JOIN order_items`.
///
/// The item is `None` when the order has no item: all the columns of `order_items` are null for this row.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderItemRow {
    pub order: Order,
    pub item: Option<OrderItem>,
}

impl FromRow for OrderItemRow {
    fn from_row(row: &Row) -> Result<Self> {
        let order = Order::try_from_row(row)?;
        let item = match row.try_get_nullable::<_, i32>("order_items.id")? {
            Some(_) => Some(OrderItem::from_row(row)?),
            None => None,
        };
        Ok(OrderItemRow { order, item })
    }
}

impl JoinRow for OrderItemRow {
    type Key = i32;
    type Parent = Order;
    type Child = OrderItem;

    fn parent_key(&self) -> i32 {
        self.order.id
    }

    fn parent(&self) -> Order {
        self.order.clone()
    }

    fn into_child(self) -> Option<(i32, OrderItem)> {
        let item = self.item?;
        item.order_id.map(|order_id| (order_id, item))
    }
}

/// A row of the query aggregating the items of each order into a JSON array.
#[derive(Debug)]
pub struct OrderAggRow {
    pub order: Order,
    pub items: Json<Vec<OrderItem>>,
}

impl FromRow for OrderAggRow {
    fn from_row(row: &Row) -> Result<Self> {
        Ok(OrderAggRow { order: Order::try_from_row(row)?, items: row.try_get("order_items")? })
    }
}

impl From<OrderAggRow> for OrderWithItems {
    fn from(row: OrderAggRow) -> Self {
        Nested { parent: row.order, children: row.items.into_inner() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use select_bench_blocking::Connection;
    use select_bench_core::Error;

    #[ctor::ctor]
    fn init() {
        select_bench_core::mock::register_driver();
    }

    fn join_rows(statement: &str) -> Vec<OrderItemRow> {
        let mut conn = Connection::open("mock://").unwrap();
        let mut stmt = conn.prepare(statement).unwrap();
        stmt.query_as::<OrderItemRow>(None).unwrap()
    }

    #[test]
    fn test_order_item_row() {
        let rows = join_rows("JOIN 2 3");
        assert_eq!(rows.len(), 6);
        assert_eq!(rows[0].order.id, 1);
        assert_eq!(rows[0].order.customer_name, "customer1");
        assert!(rows[0].order.created_at.is_some());
        let item = rows[2].item.as_ref().unwrap();
        assert_eq!(item.order_id, Some(1));
        assert_eq!(item.quantity, None);
        assert_eq!(rows[3].clone().into_child().map(|(key, _)| key), Some(2));
    }

    #[test]
    fn test_order_item_row_without_item() {
        let rows = join_rows("JOIN 2 0");
        assert_eq!(rows.len(), 2);
        assert!(rows.iter().all(|row| row.item.is_none()));
        assert!(rows[0].clone().into_child().is_none());
    }

    #[test]
    fn test_null_back_reference() {
        let row = OrderItemRow {
            order: Order { id: 1, customer_name: "Alice".to_string(), created_at: None },
            item: Some(OrderItem {
                id: 1,
                order_id: None,
                product_name: "pen".to_string(),
                price: 1.5,
                quantity: Some(1),
            }),
        };
        assert!(row.into_child().is_none());
    }

    #[test]
    fn test_decode_error() {
        let mut conn = Connection::open("mock://").unwrap();
        let mut stmt = conn.prepare("SELECT 2").unwrap();
        assert!(matches!(stmt.query_as::<OrderItemRow>(None), Err(Error::NotFound)));
    }
}
