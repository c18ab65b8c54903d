use chrono::{TimeZone, Utc};
use path_slash::PathExt;
use select_bench::fixtures::{self, Dataset};
use select_bench::model::{OrderItemRow, OrderWithItems};
use select_bench::strategies::{streaming, JsonAgg, ManualScan, Preload, RowMapper, Strategy, StructMapping};
use select_bench::{execute, Connection, Error};

const IN_MEMORY_URI: &str = "sqlite:///:memory:";

#[ctor::ctor]
fn init() {
    select_bench::register_drivers();
}

fn seeded(dataset: &Dataset) -> Connection {
    let mut conn = Connection::open(IN_MEMORY_URI).unwrap();
    fixtures::seed(&mut conn, dataset).unwrap();
    conn
}

fn check_strategy<S: Strategy>(conn: &mut Connection, dataset: &Dataset, expected: &[OrderWithItems]) {
    let orders = S::fetch_all(conn).unwrap();
    fixtures::verify(dataset, &orders).unwrap();
    assert_eq!(orders, expected, "fetch_all of {}", S::NAME);

    let order = S::fetch_one(conn, 3).unwrap();
    fixtures::verify_one(dataset, order.as_ref()).unwrap();
    assert_eq!(order.as_ref(), expected.get(2), "fetch_one of {}", S::NAME);

    let empty_order = S::fetch_one(conn, dataset.orders as i32).unwrap().unwrap();
    assert!(empty_order.children.is_empty(), "fetch_one of {} for an order without items", S::NAME);

    assert!(S::fetch_one(conn, 999).unwrap().is_none(), "fetch_one of {} for an unknown order", S::NAME);
}

#[test]
fn test_strategies_agree() {
    let dataset = Dataset::new(25, 3).with_empty_orders(4);
    let mut conn = seeded(&dataset);
    let expected = ManualScan::fetch_all(&mut conn).unwrap();
    assert_eq!(expected.len(), 25);

    check_strategy::<ManualScan>(&mut conn, &dataset, &expected);
    check_strategy::<RowMapper>(&mut conn, &dataset, &expected);
    check_strategy::<StructMapping>(&mut conn, &dataset, &expected);
    check_strategy::<Preload>(&mut conn, &dataset, &expected);
    check_strategy::<JsonAgg>(&mut conn, &dataset, &expected);
    conn.close().unwrap();
}

#[test]
fn test_seeded_values() {
    let dataset = Dataset::new(3, 2);
    let mut conn = seeded(&dataset);
    let orders = StructMapping::fetch_all(&mut conn).unwrap();
    let first = &orders[0];
    assert_eq!(first.parent.id, 1);
    assert_eq!(first.parent.customer_name, "customer1");
    assert_eq!(first.parent.created_at, Some(Utc.with_ymd_and_hms(2024, 1, 1, 0, 1, 0).unwrap()));
    assert_eq!(first.children.iter().map(|item| item.id).collect::<Vec<_>>(), vec![1, 2]);
    assert_eq!(first.children[1].product_name, "product2");
    assert_eq!(first.children[1].price, 1.0);
    assert_eq!(first.children[1].quantity, Some(3));
    assert_eq!(orders[1].children[0].quantity, None);
    assert!(orders.iter().all(|order| order.children.iter().all(|item| item.order_id == Some(order.parent.id))));
}

#[test]
fn test_orders_with_and_without_items() {
    let mut conn = Connection::open(IN_MEMORY_URI).unwrap();
    conn.execute_batch(select_bench::queries::CREATE_TABLES).unwrap();
    execute!(conn, "INSERT INTO orders (id, customer_name) VALUES (?, ?)", 1, "Alice").unwrap();
    execute!(conn, "INSERT INTO orders (id, customer_name) VALUES (?, ?)", 2, "Bob").unwrap();
    execute!(conn, "INSERT INTO order_items (id, order_id, product_name, price) VALUES (?, ?, ?, ?)", 10, 1, "pen", 1.5)
        .unwrap();
    execute!(conn, "INSERT INTO order_items (id, order_id, product_name, price) VALUES (?, ?, ?, ?)", 11, 1, "ink", 3.0)
        .unwrap();

    let orders = StructMapping::fetch_all(&mut conn).unwrap();
    assert_eq!(orders.len(), 2);
    assert_eq!(orders[0].parent.customer_name, "Alice");
    assert_eq!(orders[0].parent.created_at, None);
    let products: Vec<&str> = orders[0].children.iter().map(|item| item.product_name.as_str()).collect();
    assert_eq!(products, vec!["pen", "ink"]);
    assert_eq!(orders[1].parent.customer_name, "Bob");
    assert!(orders[1].children.is_empty());
    assert_eq!(JsonAgg::fetch_all(&mut conn).unwrap(), orders);
}

#[test]
fn test_decode_error() {
    let mut conn = Connection::open(IN_MEMORY_URI).unwrap();
    let mut stmt = conn
        .prepare(
            r#"SELECT 'one' AS "orders.id", 'Alice' AS "orders.customer_name", NULL AS "orders.created_at",
                      NULL AS "order_items.id""#,
        )
        .unwrap();
    assert!(matches!(
        stmt.materialize::<OrderItemRow>(None),
        Err(Error::DecodeError { column, .. }) if column == "orders.id"
    ));
}

#[tokio::test]
async fn test_streaming() {
    let dataset = Dataset::new(12, 4).with_empty_orders(2);
    let temp_dir = tempfile::tempdir().unwrap();
    let uri = format!("sqlite://{}", temp_dir.path().join("orders.db").to_slash_lossy());
    let mut conn = Connection::open(&uri).unwrap();
    fixtures::seed(&mut conn, &dataset).unwrap();
    let expected = StructMapping::fetch_all(&mut conn).unwrap();

    let mut async_conn = select_bench::futures::Connection::open(uri.as_str()).await.unwrap();
    let orders = streaming::fetch_all(&mut async_conn).await.unwrap();
    fixtures::verify(&dataset, &orders).unwrap();
    assert_eq!(orders, expected);
    let order = streaming::fetch_one(&mut async_conn, 5).await.unwrap();
    assert_eq!(order.as_ref(), expected.get(4));
    assert!(streaming::fetch_one(&mut async_conn, 999).await.unwrap().is_none());
    async_conn.close().await.unwrap();
    conn.close().unwrap();
}
