use crate::driver::{DriverConnection, DriverError, DriverStatement, MockDriverFactory, Result};
use crate::parameters::Parameters;
use arrow_array::{Float64Array, Int32Array, RecordBatch, StringArray, TimestampMicrosecondArray};
use arrow_schema::{DataType, Field, Schema, TimeUnit};
use ctor::ctor;
use lazy_static::lazy_static;
use std::sync::Arc;

lazy_static! {
    static ref SELECT_REGEX: regex::Regex = regex::Regex::new(r"^SELECT\s+(-?[0-9]+)").unwrap();
    static ref JOIN_REGEX: regex::Regex = regex::Regex::new(r"^JOIN\s+([0-9]+)\s+([0-9]+)").unwrap();
}

/// The number of rows per batch returned by the `JOIN` statements of the mock driver.
pub const MOCK_BATCH_ROWS: usize = 4;

/// A factory for mocking a {{DriverConnection}}.
///
/// # Example
/// ```rust
/// use select_bench_core::driver::DriverConnection;
/// use select_bench_core::factory::Factory;
///
/// select_bench_core::mock::register_driver();
///
/// // This should return a mock connection
/// let conn = Factory::open("mock://").unwrap();
///
/// // Opening a connection with the URI "mock://?error" should return an error
/// assert!(Factory::open("mock://?error").is_err());
///
/// // Calling `prepare` should return a mock statement unless the statement is "XINSERT"
/// assert!(conn.prepare("XINSERT").is_err());
/// assert!(conn.prepare("SELECT 1").is_ok());
///
/// // Calling `execute` should return an error if the statement starts with "SELECT"
/// let mut stmt = conn.prepare("INSERT").unwrap();
/// assert!(stmt.execute(None).is_ok());
/// let mut stmt = conn.prepare("SELECT 1").unwrap();
/// assert!(stmt.execute(None).is_err());
///
/// // `SELECT <n>` returns a single batch of `n` rows (id, username), a negative number fails at the first iteration
/// let mut stmt = conn.prepare("SELECT 0").unwrap();
/// assert!(stmt.query(None).unwrap().next().is_none());
/// let mut stmt = conn.prepare("SELECT -1").unwrap();
/// assert!(stmt.query(None).unwrap().next().unwrap().is_err());
///
/// // `JOIN <orders> <items_per_order>` returns the rows of orders joined with their items
/// let mut stmt = conn.prepare("JOIN 3 2").unwrap();
/// let rows: usize = stmt.query(None).unwrap().map(|batch| batch.unwrap().num_rows()).sum();
/// assert_eq!(rows, 6);
///
/// // Anything else returns an error
/// let mut stmt = conn.prepare("INSERT 1").unwrap();
/// assert!(stmt.query(None).is_err());
/// ```
impl MockDriverFactory {
    pub fn register_with_default(schemes: &'static [&'static str]) {
        let mut mock_factory = MockDriverFactory::default();
        mock_factory.expect_open().returning(|uri| match uri.contains("?error") {
            false => Ok(Box::new(MockDriverConnection::default())),
            true => Err("Invalid URI".into()),
        });
        mock_factory.register(schemes);
    }

    pub fn register(mut self, schemes: &'static [&'static str]) {
        self.expect_schemes().returning(move || schemes);
        crate::factory::Factory::register(Box::new(self));
    }
}

#[derive(Default)]
pub struct MockDriverConnection {}

impl DriverConnection for MockDriverConnection {
    fn driver_name(&self) -> &str {
        "mock"
    }

    fn prepare<'c, 's>(&'c self, statement: &str) -> Result<Box<dyn DriverStatement + 's>>
    where
        'c: 's,
    {
        match statement {
            "XINSERT" => Err("Invalid statement".into()),
            _ => Ok(Box::new(MockDriverStatement { statement: statement.to_string() })),
        }
    }

    fn close(self: Box<Self>) -> Result<()> {
        Ok(())
    }
}

pub struct MockDriverStatement {
    statement: String,
}

impl MockDriverStatement {
    fn check_parameters(&self, parameters: &Option<Parameters>) -> Result<()> {
        let expected = self.statement.matches('?').count();
        let actual = parameters.as_ref().map_or(0, |parameters| parameters.len());
        if expected != actual {
            return Err(Box::new(crate::Error::InvalidParameterCount { expected, actual }));
        }
        Ok(())
    }
}

impl DriverStatement for MockDriverStatement {
    fn execute(&mut self, parameters: Option<Parameters>) -> Result<u64> {
        if self.statement.starts_with("SELECT ") || self.statement.starts_with("JOIN ") {
            return Err("Invalid statement".into());
        }
        self.check_parameters(&parameters)?;
        Ok(1)
    }

    fn query<'s>(
        &'s mut self,
        parameters: Option<Parameters>,
    ) -> Result<Box<dyn Iterator<Item = Result<RecordBatch>> + 's>> {
        self.check_parameters(&parameters)?;
        if let Some(captures) = SELECT_REGEX.captures(&self.statement) {
            let count = captures[1].parse::<i64>()?;
            return match count {
                // Fails at the first iteration
                _ if count < 0 => Ok(Box::new(std::iter::once(Err("Invalid count".into()) as Result<RecordBatch>))),
                0 => Ok(Box::new(std::iter::empty())),
                _ => Ok(Box::new(std::iter::once(users(count as usize)))),
            };
        }
        if let Some(captures) = JOIN_REGEX.captures(&self.statement) {
            let orders = captures[1].parse::<usize>()?;
            let items_per_order = captures[2].parse::<usize>()?;
            let batch = orders_with_items(orders, items_per_order)?;
            let num_rows = batch.num_rows();
            return Ok(Box::new(
                (0..num_rows)
                    .step_by(MOCK_BATCH_ROWS)
                    .map(move |offset| Ok(batch.slice(offset, MOCK_BATCH_ROWS.min(num_rows - offset)))),
            ));
        }
        Err(format!("Invalid statement: {}", self.statement).into())
    }
}

fn users(count: usize) -> Result<RecordBatch> {
    let ids: Vec<Option<i32>> = (1..=count).map(|n| Some(n as i32)).collect();
    let usernames: Vec<Option<String>> = (1..=count).map(|n| Some(format!("user{}", n))).collect();
    RecordBatch::try_new(
        Arc::new(Schema::new(vec![
            Field::new("id", DataType::Int32, true),
            Field::new("username", DataType::Utf8, true),
        ])),
        vec![Arc::new(Int32Array::from(ids)), Arc::new(StringArray::from(usernames))],
    )
    .map_err(|e| Box::new(e) as DriverError)
}

/// The rows of `orders LEFT JOIN order_items`, ordered by order id then item id.
///
/// - the customer of the order `n` is `customer<n>`,
/// - the creation date of every 10th order is null, the others are created `n` minutes after the epoch,
/// - the quantity of every 3rd item is null,
/// - with 0 items per order, each order comes with a single row where all the item columns are null.
fn orders_with_items(orders: usize, items_per_order: usize) -> Result<RecordBatch> {
    let mut order_ids = Vec::new();
    let mut customer_names = Vec::new();
    let mut created_ats = Vec::new();
    let mut item_ids = Vec::new();
    let mut item_order_ids = Vec::new();
    let mut product_names = Vec::new();
    let mut prices = Vec::new();
    let mut quantities = Vec::new();
    let mut item_id = 0;
    for order_id in 1..=orders as i32 {
        for n in 0..items_per_order.max(1) {
            order_ids.push(order_id);
            customer_names.push(format!("customer{}", order_id));
            created_ats.push(match order_id % 10 {
                0 => None,
                _ => Some(order_id as i64 * 60_000_000),
            });
            if n < items_per_order {
                item_id += 1;
                item_ids.push(Some(item_id));
                item_order_ids.push(Some(order_id));
                product_names.push(Some(format!("product{}", item_id)));
                prices.push(Some(item_id as f64 * 0.5));
                quantities.push(match item_id % 3 {
                    0 => None,
                    _ => Some(item_id % 7 + 1),
                });
            } else {
                item_ids.push(None);
                item_order_ids.push(None);
                product_names.push(None);
                prices.push(None);
                quantities.push(None);
            }
        }
    }
    RecordBatch::try_new(
        Arc::new(Schema::new(vec![
            Field::new("orders.id", DataType::Int32, false),
            Field::new("orders.customer_name", DataType::Utf8, false),
            Field::new("orders.created_at", DataType::Timestamp(TimeUnit::Microsecond, Some("UTC".into())), true),
            Field::new("order_items.id", DataType::Int32, true),
            Field::new("order_items.order_id", DataType::Int32, true),
            Field::new("order_items.product_name", DataType::Utf8, true),
            Field::new("order_items.price", DataType::Float64, true),
            Field::new("order_items.quantity", DataType::Int32, true),
        ])),
        vec![
            Arc::new(Int32Array::from(order_ids)),
            Arc::new(StringArray::from(customer_names)),
            Arc::new(TimestampMicrosecondArray::from(created_ats).with_timezone("UTC")),
            Arc::new(Int32Array::from(item_ids)),
            Arc::new(Int32Array::from(item_order_ids)),
            Arc::new(StringArray::from(product_names)),
            Arc::new(Float64Array::from(prices)),
            Arc::new(Int32Array::from(quantities)),
        ],
    )
    .map_err(|e| Box::new(e) as DriverError)
}

pub fn register_driver() {
    static INIT: std::sync::Once = std::sync::Once::new();
    INIT.call_once(|| {
        MockDriverFactory::register_with_default(&["mock"]);
    });
}

#[ctor]
fn init() {
    register_driver();
}
