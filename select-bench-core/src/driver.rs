//! The traits a database engine implements to be benchmarked.
//!
//! A driver turns the rows of a query into Arrow record batches. Everything above it (rows, decoding,
//! materialization) only sees those batches, so a fetch strategy measures the same work whatever the engine.
use crate::parameters::Parameters;
use arrow_array::RecordBatch;

#[cfg(any(test, feature = "mock"))]
use mockall::automock;

/// Errors raised by a driver, usually the ones of the engine's own crate.
///
/// They are downcast back into a [crate::Error] when the driver returned one, otherwise wrapped into
/// [crate::Error::DriverError].
pub type DriverError = Box<dyn std::error::Error + Send + Sync>;

pub type Result<T> = std::result::Result<T, DriverError>;

pub trait DriverConnection {
    /// A name for the logs, usually the scheme the driver is registered with.
    fn driver_name(&self) -> &str;

    /// Prepare a statement using the placeholders of the engine (`?` for SQLite).
    fn prepare<'c, 's>(&'c self, statement: &str) -> Result<Box<dyn DriverStatement + 's>>
    where
        'c: 's;

    fn close(self: Box<Self>) -> Result<()>;
}

pub trait DriverStatement {
    /// Bind the parameters and run a statement returning no rows.
    ///
    /// Fails with [crate::Error::InvalidParameterCount] when the parameters don't match the placeholders. Returns the
    /// number of rows affected.
    fn execute(&mut self, parameters: Option<Parameters>) -> Result<u64>;

    /// Bind the parameters and run a query.
    ///
    /// The batches hold the rows in the order the engine produced them, which is what lets a join ordered by parent
    /// key be materialized while it is read.
    fn query<'s>(
        &'s mut self,
        parameters: Option<Parameters>,
    ) -> Result<Box<dyn Iterator<Item = Result<RecordBatch>> + 's>>;
}

/// Opens the connections of a driver, see [crate::factory::Factory::register].
#[cfg_attr(any(test, feature = "mock"), automock)]
pub trait DriverFactory: Sync + Send {
    fn schemes(&self) -> &'static [&'static str];
    fn open(&self, uri: &str) -> Result<Box<dyn DriverConnection>>;
}
