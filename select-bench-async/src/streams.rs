use crate::connection::Command;
use arrow_array::RecordBatch;
use futures::{Stream, StreamExt};
use select_bench_core::driver;
use select_bench_core::row::{FromRow, Row};
use select_bench_core::Error;
use select_bench_core::Result;
use std::pin::Pin;
use std::sync::Arc;
use std::task::Poll;

/// A non-blocking stream of Arrow's record batches.
pub struct RecordBatchStream<'s> {
    command_sent: bool,
    exhausted: bool,
    command_tx: crossbeam_channel::Sender<Command>,
    poll_tx: tokio::sync::mpsc::Sender<driver::Result<Option<RecordBatch>>>,
    poll_rx: tokio::sync::mpsc::Receiver<driver::Result<Option<RecordBatch>>>,
    phantom: std::marker::PhantomData<&'s mut ()>,
}

impl<'s> RecordBatchStream<'s> {
    pub(crate) fn new(command_tx: crossbeam_channel::Sender<Command>) -> Self {
        let (poll_tx, poll_rx) = tokio::sync::mpsc::channel(1);
        Self { command_sent: false, exhausted: false, poll_tx, poll_rx, command_tx, phantom: std::marker::PhantomData }
    }

    fn fetch_cursor(&self, tx: tokio::sync::mpsc::Sender<driver::Result<Option<RecordBatch>>>) -> Result<()> {
        if let Err(e) = self.command_tx.send(Command::FetchCursor { tx }) {
            return Err(Error::InternalError { error: e.into() });
        }
        Ok(())
    }

    fn drop_cursor(&self) -> Result<()> {
        if let Err(e) = self.command_tx.send(Command::DropCursor) {
            return Err(Error::InternalError { error: e.into() });
        }
        Ok(())
    }
}

impl<'s> Stream for RecordBatchStream<'s> {
    type Item = Result<RecordBatch>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut std::task::Context) -> std::task::Poll<Option<Self::Item>> {
        let this = self.get_mut();
        if this.exhausted {
            return Poll::Ready(None);
        }

        if !this.command_sent {
            this.fetch_cursor(this.poll_tx.clone())?;
            this.command_sent = true;
        }

        match Pin::new(&mut this.poll_rx).poll_recv(cx) {
            Poll::Ready(Some(result)) => {
                this.command_sent = false; // Reset the flag for the next fetch
                match result {
                    Ok(Some(batch)) => Poll::Ready(Some(Ok(batch))),
                    Ok(None) => {
                        this.exhausted = true;
                        Poll::Ready(None)
                    }
                    Err(error) => Poll::Ready(Some(Err(Error::from(error)))),
                }
            }
            Poll::Ready(None) => Poll::Ready(None), // Channel closed
            Poll::Pending => Poll::Pending,
        }
    }
}

/// Release the cursor when the stream is dropped.
///
/// While a stream exists, the connection can only fetch records from that stream and cannot perform other operations.
/// Once exhausted, the cursor is already released by the connection's thread, otherwise the cursor must be dropped to
/// let the connection perform other operations.
impl Drop for RecordBatchStream<'_> {
    fn drop(&mut self) {
        if !self.exhausted {
            let _ = self.drop_cursor();
        }
    }
}

/// A non-blocking stream of rows.
pub struct RowStream<'i> {
    // The stream used to poll the RecordBatch.
    iterator: RecordBatchStream<'i>,

    // The last record batch that was polled.
    last_record_batch: Option<Arc<RecordBatch>>,

    // The index of the next row to poll in the last record batch.
    index_in_batch: usize,
}

impl<'i> From<RecordBatchStream<'i>> for RowStream<'i> {
    fn from(iterator: RecordBatchStream<'i>) -> Self {
        RowStream { last_record_batch: None, iterator, index_in_batch: 0 }
    }
}

impl<'i> RowStream<'i> {
    /// Map each row using {{FromRow}}.
    pub fn map_rows<T: FromRow>(self) -> impl Stream<Item = Result<T>> + 'i {
        self.map(|row| row.and_then(|row| T::from_row(&row)))
    }
}

impl<'i> Stream for RowStream<'i> {
    type Item = Result<Row>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut std::task::Context) -> std::task::Poll<Option<Self::Item>> {
        let this = self.get_mut();
        loop {
            if let Some(last_record_batch) = &this.last_record_batch {
                if this.index_in_batch < last_record_batch.num_rows() {
                    let row = Row::new(last_record_batch.clone(), this.index_in_batch);
                    this.index_in_batch += 1;
                    return Poll::Ready(Some(Ok(row)));
                }
            }
            // First call or we've exhausted the last batch.
            match Pin::new(&mut this.iterator).poll_next(cx) {
                Poll::Ready(Some(Ok(record_batch))) => {
                    this.last_record_batch = Some(Arc::new(record_batch));
                    this.index_in_batch = 0;
                }
                Poll::Ready(Some(Err(error))) => return Poll::Ready(Some(Err(error))),
                Poll::Ready(None) => {
                    this.last_record_batch = None;
                    return Poll::Ready(None);
                }
                Poll::Pending => return Poll::Pending,
            }
        }
    }
}
