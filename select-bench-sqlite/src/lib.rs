use select_bench_core::factory::Factory;
use std::sync::Arc;

mod driver;
mod errors;
mod factory;
mod statement;
mod value;

/// The name of the driver for SQLite.
pub const DRIVER_NAME: &str = "sqlite";

/// The path in a URI for in-memory databases.
pub const IN_MEMORY_URI_PATH: &str = "/:memory:";

/// The URI for in-memory databases.
///
/// Each connection opened with this URI is using its own database.
///
/// # Example
/// ```rust
/// # use select_bench_blocking::Connection;
/// select_bench_sqlite::register_driver();
/// let conn = Connection::open(select_bench_sqlite::IN_MEMORY_URI).unwrap();
/// ```
pub const IN_MEMORY_URI: &str = "sqlite:///:memory:";

/// The options of a SQLite connection.
///
/// They are given as parameters of the URI used to open the connection, for example:
/// `sqlite:///tmp/orders.db?max_batch_rows=1000&max_batch_bytes=1MiB`.
#[derive(Debug, Clone)]
pub struct SqliteOptions {
    /// The maximum number of rows in a record batch returned by a query.
    pub max_batch_rows: usize,

    /// The maximum size of a record batch returned by a query.
    ///
    /// The size is an estimation of the size of the values, a batch is closed as soon as it reaches this size.
    pub max_batch_bytes: usize,
}

impl Default for SqliteOptions {
    fn default() -> Self {
        Self { max_batch_rows: 10_000, max_batch_bytes: 4 * 1024 * 1024 }
    }
}

pub(crate) type SqliteOptionsRef = Arc<SqliteOptions>;

pub(crate) struct Sqlite {
    conn: rusqlite::Connection,
    options: SqliteOptionsRef,
}

pub fn register_driver() {
    static INIT: std::sync::Once = std::sync::Once::new();
    INIT.call_once(|| {
        Factory::register(Box::new(factory::SqliteFactory {}));
    });
}
