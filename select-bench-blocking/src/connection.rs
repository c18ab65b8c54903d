use crate::statement::Statement;
use select_bench_core::driver::DriverConnection;
use select_bench_core::factory::Factory;
use select_bench_core::parameters::Parameters;
use select_bench_core::row::Row;
use select_bench_core::{clean_statement, Error, Result};
use tracing::debug;

/// A blocking connection opened from a URI such as `sqlite://:memory:`.
///
/// ```rust
/// use select_bench_blocking::Connection;
/// use select_bench_core::params;
///
/// select_bench_core::mock::register_driver();
/// let mut conn = Connection::open("mock://").unwrap();
///
/// assert_eq!(conn.execute("INSERT INTO orders (id, customer_name) VALUES (?, ?)", params!(1, "Alice")).unwrap(), 1);
///
/// let mut stmt = conn.prepare("JOIN 2 3").unwrap();
/// assert_eq!(stmt.query_rows(None).unwrap().count(), 6);
/// ```
pub struct Connection {
    inner: Box<dyn DriverConnection>,
}

impl Connection {
    /// Open a connection with the driver registered for the scheme of the URI.
    pub fn open(uri: &str) -> Result<Self> {
        Ok(Self { inner: Factory::open(uri)? })
    }

    pub fn driver_name(&self) -> &str {
        self.inner.driver_name()
    }

    /// The returned [Statement] borrows the connection and can be run any number of times.
    pub fn prepare<S: AsRef<str>>(&mut self, statement: S) -> Result<Statement<'_>> {
        debug!("Preparing statement: {}", clean_statement(statement.as_ref()));
        Ok(Statement { inner: self.inner.prepare(statement.as_ref())? })
    }

    /// Prepare and run a statement once, returning the number of rows affected.
    pub fn execute<S: AsRef<str>>(&mut self, statement: S, parameters: Option<Parameters>) -> Result<u64> {
        self.prepare(statement)?.execute(parameters)
    }

    /// Run a script of statements separated by semicolons, such as the creation of the order tables.
    ///
    /// Returns the total number of rows affected. The script stops on the first failing statement.
    pub fn execute_batch<S: AsRef<str>>(&mut self, statements: S) -> Result<u64> {
        statements
            .as_ref()
            .split(';')
            .map(str::trim)
            .filter(|statement| !statement.is_empty())
            .try_fold(0, |affected_rows, statement| Ok(affected_rows + self.execute(statement, None)?))
    }

    /// See [Statement::query_row].
    pub fn query_row<S: AsRef<str>>(&mut self, statement: S, parameters: Option<Parameters>) -> Result<Option<Row>> {
        self.prepare(statement)?.query_row(parameters)
    }

    /// Close the connection. The statements borrowing it must have been dropped first.
    pub fn close(self) -> Result<()> {
        self.inner.close().map_err(Error::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use select_bench_core::materialize::JoinRow;
    use select_bench_core::params;
    use select_bench_core::row::FromRow;

    #[test]
    fn test_open() {
        assert!(Connection::open("unknown://").is_err());
        assert!(Connection::open("mock://?error").is_err());
        let conn = Connection::open("mock://").unwrap();
        assert_eq!(conn.driver_name(), "mock");
        assert!(conn.close().is_ok());
    }

    #[test]
    fn test_seed() {
        let mut conn = Connection::open("mock://").unwrap();
        assert!(conn.prepare("XINSERT").is_err());
        assert_eq!(conn.execute("INSERT INTO orders VALUES (?, ?)", params!(1, "customer1")).unwrap(), 1);
        assert!(matches!(
            conn.execute("INSERT INTO orders VALUES (?)", params!(1, "customer1")),
            Err(Error::InvalidParameterCount { expected: 1, actual: 2 })
        ));
        // Rows are fetched, not executed.
        assert!(conn.execute("JOIN 1 1", None).is_err());

        let mut stmt = conn.prepare("INSERT INTO order_items VALUES (?, ?)").unwrap();
        for item_id in 1..=3 {
            assert_eq!(stmt.execute(params!(item_id, 1)).unwrap(), 1);
        }
        drop(stmt);

        assert_eq!(conn.execute_batch("CREATE orders;\n CREATE order_items; ").unwrap(), 2);
        assert!(conn.execute_batch("CREATE orders; JOIN 1 1; CREATE order_items").is_err());
    }

    #[test]
    fn test_query_row() {
        let mut conn = Connection::open("mock://").unwrap();
        let row = conn.query_row("JOIN 3 2", None).unwrap().unwrap();
        assert_eq!(row.get::<_, i32>("orders.id"), 1);
        assert_eq!(row.get::<_, i32>("order_items.id"), 1);
        assert!(conn.query_row("JOIN 0 2", None).unwrap().is_none());
        assert!(conn.query_row("SELECT -1", None).is_err());
        assert!(conn.query_row("UPDATE orders", None).is_err());

        // A prepared statement is run again from its first row.
        let mut stmt = conn.prepare("JOIN 2 0").unwrap();
        for _ in 0..2 {
            let row = stmt.query_row(None).unwrap().unwrap();
            assert!(row.is_null("order_items.id"));
        }
    }

    struct Item {
        order_id: i32,
        item_id: Option<i32>,
    }

    impl FromRow for Item {
        fn from_row(row: &Row) -> Result<Self> {
            Ok(Item { order_id: row.try_get("orders.id")?, item_id: row.try_get_nullable("order_items.id")? })
        }
    }

    impl JoinRow for Item {
        type Key = i32;
        type Parent = i32;
        type Child = i32;

        fn parent_key(&self) -> i32 {
            self.order_id
        }

        fn parent(&self) -> i32 {
            self.order_id
        }

        fn into_child(self) -> Option<(i32, i32)> {
            self.item_id.map(|item_id| (self.order_id, item_id))
        }
    }

    #[test]
    fn test_materialize() {
        let mut conn = Connection::open("mock://").unwrap();
        let mut stmt = conn.prepare("JOIN 3 2").unwrap();

        let orders = stmt.materialize::<Item>(None).unwrap();
        assert_eq!(orders.iter().map(|o| o.parent).collect::<Vec<_>>(), vec![1, 2, 3]);
        assert_eq!(orders[1].children, vec![3, 4]);

        let order = stmt.materialize_one::<Item>(None).unwrap().unwrap();
        assert_eq!(order.parent, 1);
        assert_eq!(order.children, vec![1, 2]);

        assert_eq!(stmt.query_as::<Item>(None).unwrap().len(), 6);
        drop(stmt);

        let mut stmt = conn.prepare("JOIN 2 0").unwrap();
        let orders = stmt.materialize::<Item>(None).unwrap();
        assert_eq!(orders.len(), 2);
        assert!(orders.iter().all(|order| order.children.is_empty()));
        drop(stmt);

        assert!(conn.prepare("SELECT -1").unwrap().materialize::<Item>(None).is_err());
    }
}
