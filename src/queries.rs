//! The SQL statements used by the fetch strategies and the fixtures.
//!
//! The columns are aliased as `<table>.<column>` so the rows can be decoded by name whatever the strategy. Orders
//! without any item are kept by the `LEFT JOIN`, their `order_items` columns are null.

pub const CREATE_TABLES: &str = r#"
CREATE TABLE IF NOT EXISTS orders (
    id INTEGER PRIMARY KEY,
    customer_name TEXT NOT NULL,
    created_at TEXT
);
CREATE TABLE IF NOT EXISTS order_items (
    id INTEGER PRIMARY KEY,
    order_id INTEGER REFERENCES orders (id),
    product_name TEXT NOT NULL,
    price REAL NOT NULL,
    quantity INTEGER
);
CREATE INDEX IF NOT EXISTS order_items_order_id ON order_items (order_id)
"#;

pub const INSERT_ORDER: &str = "INSERT INTO orders (id, customer_name, created_at) VALUES (?, ?, ?)";

pub const INSERT_ORDER_ITEM: &str =
    "INSERT INTO order_items (id, order_id, product_name, price, quantity) VALUES (?, ?, ?, ?, ?)";

pub const SELECT_ORDERS_WITH_ITEMS: &str = r#"
SELECT orders.id AS "orders.id",
       orders.customer_name AS "orders.customer_name",
       orders.created_at AS "orders.created_at",
       order_items.id AS "order_items.id",
       order_items.order_id AS "order_items.order_id",
       order_items.product_name AS "order_items.product_name",
       order_items.price AS "order_items.price",
       order_items.quantity AS "order_items.quantity"
FROM orders
    LEFT JOIN order_items ON (orders.id = order_items.order_id)
ORDER BY orders.id, order_items.id
"#;

pub const SELECT_ORDER_WITH_ITEMS: &str = r#"
SELECT orders.id AS "orders.id",
       orders.customer_name AS "orders.customer_name",
       orders.created_at AS "orders.created_at",
       order_items.id AS "order_items.id",
       order_items.order_id AS "order_items.order_id",
       order_items.product_name AS "order_items.product_name",
       order_items.price AS "order_items.price",
       order_items.quantity AS "order_items.quantity"
FROM orders
    LEFT JOIN order_items ON (orders.id = order_items.order_id)
WHERE orders.id = ?
ORDER BY order_items.id
"#;

pub const SELECT_ORDERS: &str = r#"
SELECT id AS "orders.id", customer_name AS "orders.customer_name", created_at AS "orders.created_at"
FROM orders
ORDER BY id
"#;

pub const SELECT_ORDER: &str = r#"
SELECT id AS "orders.id", customer_name AS "orders.customer_name", created_at AS "orders.created_at"
FROM orders
WHERE id = ?
"#;

pub const SELECT_ORDER_ITEMS: &str = r#"
SELECT id AS "order_items.id",
       order_id AS "order_items.order_id",
       product_name AS "order_items.product_name",
       price AS "order_items.price",
       quantity AS "order_items.quantity"
FROM order_items
WHERE order_id IS NOT NULL
ORDER BY id
"#;

pub const SELECT_ORDER_ITEMS_BY_ORDER: &str = r#"
SELECT id AS "order_items.id",
       order_id AS "order_items.order_id",
       product_name AS "order_items.product_name",
       price AS "order_items.price",
       quantity AS "order_items.quantity"
FROM order_items
WHERE order_id = ?
ORDER BY id
"#;

pub const SELECT_ORDERS_JSON: &str = r#"
SELECT orders.id AS "orders.id",
       orders.customer_name AS "orders.customer_name",
       orders.created_at AS "orders.created_at",
       COALESCE(json_group_array(json_object(
           'id', order_items.id,
           'order_id', order_items.order_id,
           'product_name', order_items.product_name,
           'price', order_items.price,
           'quantity', order_items.quantity
       )) FILTER (WHERE order_items.id IS NOT NULL), '[]') AS "order_items"
FROM orders
    LEFT JOIN order_items ON (orders.id = order_items.order_id)
GROUP BY orders.id, orders.customer_name, orders.created_at
ORDER BY orders.id
"#;

pub const SELECT_ORDER_JSON: &str = r#"
SELECT orders.id AS "orders.id",
       orders.customer_name AS "orders.customer_name",
       orders.created_at AS "orders.created_at",
       COALESCE(json_group_array(json_object(
           'id', order_items.id,
           'order_id', order_items.order_id,
           'product_name', order_items.product_name,
           'price', order_items.price,
           'quantity', order_items.quantity
       )) FILTER (WHERE order_items.id IS NOT NULL), '[]') AS "order_items"
FROM orders
    LEFT JOIN order_items ON (orders.id = order_items.order_id)
WHERE orders.id = ?
GROUP BY orders.id, orders.customer_name, orders.created_at
"#;
