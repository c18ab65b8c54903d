use crate::row::{FromRow, Row};
use crate::Result;
use arrow_array::RecordBatch;
use std::sync::Arc;

/// An iterator over the rows of a stream of record batches.
///
/// Empty batches are skipped and errors raised by the underlying iterator are given back as is.
pub struct Rows<'i> {
    last_record_batch: Option<Arc<RecordBatch>>,
    iterator: Box<dyn Iterator<Item = Result<RecordBatch>> + 'i>,
    index_in_batch: usize,
}

impl<'i> From<Box<dyn Iterator<Item = Result<RecordBatch>> + 'i>> for Rows<'i> {
    fn from(iterator: Box<dyn Iterator<Item = Result<RecordBatch>> + 'i>) -> Self {
        Rows { last_record_batch: None, iterator, index_in_batch: 0 }
    }
}

impl<'i> Rows<'i> {
    /// Map each row using {{FromRow}}.
    pub fn map_rows<T: FromRow>(self) -> impl Iterator<Item = Result<T>> + 'i {
        self.map(|row| row.and_then(|row| T::from_row(&row)))
    }
}

impl<'i> Iterator for Rows<'i> {
    type Item = Result<Row>;

    fn next(&mut self) -> Option<Result<Row>> {
        loop {
            if let Some(record_batch) = &self.last_record_batch {
                if self.index_in_batch < record_batch.num_rows() {
                    let row = Row::new(record_batch.clone(), self.index_in_batch);
                    self.index_in_batch += 1;
                    return Some(Ok(row));
                }
            }
            match self.iterator.next() {
                Some(Ok(record_batch)) => {
                    self.last_record_batch = Some(Arc::new(record_batch));
                    self.index_in_batch = 0;
                }
                Some(Err(e)) => return Some(Err(e)),
                None => {
                    self.last_record_batch = None;
                    return None;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;
    use arrow_array::Int32Array;
    use arrow_schema::{DataType, Field, Schema};

    fn batch(values: Vec<i32>) -> Result<RecordBatch> {
        let schema = Arc::new(Schema::new(vec![Field::new("id", DataType::Int32, false)]));
        Ok(RecordBatch::try_new(schema, vec![Arc::new(Int32Array::from(values))])?)
    }

    struct Id(i32);

    impl FromRow for Id {
        fn from_row(row: &Row) -> Result<Self> {
            Ok(Id(row.try_get("id")?))
        }
    }

    #[test]
    fn test_rows() {
        let batches: Vec<Result<RecordBatch>> = vec![batch(vec![1, 2]), batch(vec![]), batch(vec![3])];
        let iterator: Box<dyn Iterator<Item = Result<RecordBatch>>> = Box::new(batches.into_iter());
        let ids: Vec<i32> = Rows::from(iterator).map_rows::<Id>().map(|id| id.unwrap().0).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn test_rows_error() {
        let batches: Vec<Result<RecordBatch>> = vec![batch(vec![1]), Err(Error::NotFound)];
        let iterator: Box<dyn Iterator<Item = Result<RecordBatch>>> = Box::new(batches.into_iter());
        let mut rows = Rows::from(iterator);
        assert_eq!(rows.next().unwrap().unwrap().get::<_, i32>(0), 1);
        assert!(matches!(rows.next(), Some(Err(Error::NotFound))));
        assert!(rows.next().is_none());
    }
}
