use arrow_array::RecordBatch;
use select_bench_core::driver::DriverStatement;
use select_bench_core::materialize::{self, JoinRow, Nested};
use select_bench_core::parameters::Parameters;
use select_bench_core::row::{FromRow, Row};
use select_bench_core::rows::Rows;
use select_bench_core::{Error, Result};

/// A statement prepared on a [crate::Connection].
///
/// The fetch strategies prepare their query once and run it with the id of an order, or without parameters to fetch
/// all the orders.
pub struct Statement<'c> {
    pub(crate) inner: Box<dyn DriverStatement + 'c>,
}

impl Statement<'_> {
    /// Run a statement returning no rows, such as the inserts seeding the orders.
    pub fn execute(&mut self, parameters: Option<Parameters>) -> Result<u64> {
        Ok(self.inner.execute(parameters)?)
    }

    /// The record batches produced by the driver.
    pub fn query<'s: 'i, 'i>(
        &'s mut self,
        parameters: Option<Parameters>,
    ) -> Result<Box<dyn Iterator<Item = Result<RecordBatch>> + 'i>> {
        let batches = self.inner.query(parameters)?;
        Ok(Box::new(batches.map(|batch| batch.map_err(Error::from))))
    }

    /// The rows of the record batches, one at a time.
    pub fn query_rows<'s: 'i, 'i>(&'s mut self, parameters: Option<Parameters>) -> Result<Rows<'i>> {
        Ok(Rows::from(self.query(parameters)?))
    }

    /// The first row, or `None` when the query has no row. The other rows are not read.
    pub fn query_row(&mut self, parameters: Option<Parameters>) -> Result<Option<Row>> {
        self.query_rows(parameters)?.next().transpose()
    }

    /// Decode every row with [FromRow], failing on the first row that cannot be decoded.
    pub fn query_as<T: FromRow>(&mut self, parameters: Option<Parameters>) -> Result<Vec<T>> {
        self.query_rows(parameters)?.map_rows::<T>().collect()
    }

    /// Group the rows of a one-to-many join into their parents, in the order the parents are first seen.
    pub fn materialize<R>(&mut self, parameters: Option<Parameters>) -> Result<Vec<Nested<R::Parent, R::Child>>>
    where
        R: FromRow + JoinRow,
    {
        materialize::materialize_rows::<R, _>(self.query_rows(parameters)?)
    }

    /// Same as [Statement::materialize], keeping only the parent of the first row.
    pub fn materialize_one<R>(&mut self, parameters: Option<Parameters>) -> Result<Option<Nested<R::Parent, R::Child>>>
    where
        R: FromRow + JoinRow,
    {
        materialize::materialize_one_row::<R, _>(self.query_rows(parameters)?)
    }
}
