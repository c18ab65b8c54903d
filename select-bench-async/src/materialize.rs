use crate::RowStream;
use futures::{pin_mut, Stream, StreamExt};
use select_bench_core::materialize::{JoinRow, Materializer, Nested};
use select_bench_core::row::FromRow;
use select_bench_core::Result;

/// Group the rows of a one-to-many join produced by a stream.
///
/// Gives the same result as {{select_bench_core::materialize::materialize}} for the same sequence of rows. The first
/// error aborts the materialization and the rest of the stream is not polled.
pub async fn materialize_stream<R, S>(rows: S) -> Result<Vec<Nested<R::Parent, R::Child>>>
where
    R: JoinRow,
    S: Stream<Item = Result<R>>,
{
    pin_mut!(rows);
    let mut materializer = Materializer::new();
    while let Some(row) = rows.next().await {
        materializer.push(row?)?;
    }
    Ok(materializer.finish())
}

/// Same as {{materialize_stream}} but only keeps the first parent.
pub async fn materialize_one_stream<R, S>(rows: S) -> Result<Option<Nested<R::Parent, R::Child>>>
where
    R: JoinRow,
    S: Stream<Item = Result<R>>,
{
    pin_mut!(rows);
    let mut materializer = Materializer::bounded(1);
    while let Some(row) = rows.next().await {
        materializer.push(row?)?;
    }
    Ok(materializer.finish().into_iter().next())
}

/// Decode the rows of a query with {{FromRow}} and group them.
pub async fn materialize_rows<R>(rows: RowStream<'_>) -> Result<Vec<Nested<R::Parent, R::Child>>>
where
    R: FromRow + JoinRow,
{
    materialize_stream(rows.map_rows::<R>()).await
}

pub async fn materialize_one_row<R>(rows: RowStream<'_>) -> Result<Option<Nested<R::Parent, R::Child>>>
where
    R: FromRow + JoinRow,
{
    materialize_one_stream(rows.map_rows::<R>()).await
}
