use crate::{RecordBatchStream, RowStream};
use arrow_array::RecordBatch;
use futures::future::{err, BoxFuture};
use select_bench_core::driver;
use select_bench_core::driver::DriverConnection;
use select_bench_core::factory::Factory;
use select_bench_core::parameters::Parameters;
use select_bench_core::{clean_statement, Error, Result};
use std::thread;
use tokio::sync::oneshot;
use tracing::{debug, error};

#[macro_export]
macro_rules! await_on {
    ($rx:expr) => {
        Box::pin(async move {
            match $rx.await {
                Ok(Ok(value)) => Ok(value),
                Ok(Err(e)) => Err(Error::from(e)),
                Err(e) => Err(Error::InternalError { error: e.into() }),
            }
        })
    };
}

/// A non-blocking connection.
///
/// The driver connection lives on a dedicated thread, each method of the connection sends a command to that thread
/// and returns a future resolved when the thread replies.
///
/// While a {{RecordBatchStream}} or a {{RowStream}} is alive, the connection is mutably borrowed and cannot be used for
/// anything else.
pub struct Connection {
    pub(crate) command_tx: crossbeam_channel::Sender<Command>,
}

impl Connection {
    pub fn open<T: Into<String>>(uri: T) -> BoxFuture<'static, Result<Self>> {
        let (command_tx, command_rx): (crossbeam_channel::Sender<Command>, crossbeam_channel::Receiver<Command>) =
            crossbeam_channel::bounded(1);
        let uri: String = uri.into();
        let (open_tx, open_rx) = oneshot::channel();

        let thread_spawn_result = thread::Builder::new().name("select-bench-connection".to_string()).spawn(move || {
            match Factory::open(&uri) {
                Ok(inner_conn) => {
                    if open_tx.send(Ok(Self { command_tx })).is_err() {
                        error!("Channel communication failed.");
                    } else {
                        Self::command_loop(inner_conn, command_rx);
                    }
                }
                Err(e) => {
                    if open_tx.send(Err(e)).is_err() {
                        error!("Channel communication error while opening the connection.");
                    }
                }
            }
        });

        if thread_spawn_result.is_err() {
            Box::pin(async { Err("Failed to spawn thread".into()) })
        } else {
            Box::pin(async {
                match open_rx.await {
                    Ok(Ok(conn)) => Ok(conn),
                    Ok(Err(e)) => Err(e),
                    Err(e) => Err(Error::InternalError { error: e.into() }),
                }
            })
        }
    }

    pub fn close(self) -> BoxFuture<'static, Result<()>> {
        let (tx, rx) = oneshot::channel();
        if let Err(e) = self.command_tx.send(Command::Close { tx }) {
            return Box::pin(err::<(), Error>(Error::InternalError { error: e.into() }));
        }
        await_on!(rx)
    }

    /// Prepare and execute a statement.
    ///
    /// Returns the number of rows affected.
    pub fn execute<S: Into<String>>(&self, statement: S, parameters: Option<Parameters>) -> BoxFuture<'_, Result<u64>> {
        let (tx, rx) = oneshot::channel();
        if let Err(e) = self.command_tx.send(Command::Execute { statement: statement.into(), parameters, tx }) {
            return Box::pin(err::<u64, Error>(Error::InternalError { error: e.into() }));
        }
        await_on!(rx)
    }

    /// Prepare and query a statement.
    ///
    /// Returns a stream of the record batches produced by the query, fetched one at a time from the connection's
    /// thread.
    pub fn query<S: Into<String>>(
        &mut self,
        statement: S,
        parameters: Option<Parameters>,
    ) -> BoxFuture<'_, Result<RecordBatchStream<'_>>> {
        let (tx, rx) = oneshot::channel();
        if let Err(e) = self.command_tx.send(Command::Query { statement: statement.into(), parameters, tx }) {
            return Box::pin(err::<RecordBatchStream<'_>, Error>(Error::InternalError { error: e.into() }));
        }
        let command_tx = self.command_tx.clone();
        Box::pin(async move {
            match rx.await {
                Ok(Ok(())) => Ok(RecordBatchStream::new(command_tx)),
                Ok(Err(error)) => Err(Error::from(error)),
                Err(error) => Err(Error::InternalError { error: error.into() }),
            }
        })
    }

    /// Prepare and query a statement.
    ///
    /// Returns a stream of the rows produced by the query.
    pub fn query_rows<S: Into<String>>(
        &mut self,
        statement: S,
        parameters: Option<Parameters>,
    ) -> BoxFuture<'_, Result<RowStream<'_>>> {
        let query = self.query(statement, parameters);
        Box::pin(async move { Ok(RowStream::from(query.await?)) })
    }
}

pub(crate) enum Command {
    Close {
        tx: oneshot::Sender<driver::Result<()>>,
    },
    DropCursor,
    Execute {
        statement: String,
        parameters: Option<Parameters>,
        tx: oneshot::Sender<driver::Result<u64>>,
    },
    FetchCursor {
        tx: tokio::sync::mpsc::Sender<driver::Result<Option<RecordBatch>>>,
    },
    Query {
        statement: String,
        parameters: Option<Parameters>,
        tx: oneshot::Sender<driver::Result<()>>,
    },
}

macro_rules! blocking_send_response_and_break_on_error {
    ($tx:expr, $value:expr) => {
        if $tx.blocking_send($value).is_err() {
            error!("Channel communication failed while sending statement fetching response.");
            break;
        }
    };
}

macro_rules! send_response_and_break_on_error {
    ($tx:expr, $value:expr) => {
        if $tx.send($value).is_err() {
            error!("Channel communication failed while sending command response.");
            break;
        }
    };
}

impl Connection {
    fn command_loop(inner_conn: Box<dyn DriverConnection>, command_rx: crossbeam_channel::Receiver<Command>) {
        loop {
            match command_rx.recv() {
                //
                // Close the connection.
                //
                Ok(Command::Close { tx }) => {
                    let result = inner_conn.close();
                    // We don't care if the receiver is closed, because we are closing the connection anyway.
                    let _ = tx.send(result);
                    // Once the connection is closed, we need to break the loop and exit the thread.
                    return;
                }

                // Prepare and execute a statement at once.
                Ok(Command::Execute { statement, parameters, tx }) => {
                    debug!("Executing statement: {}", clean_statement(&statement));
                    match inner_conn.prepare(&statement) {
                        Ok(mut stmt) => send_response_and_break_on_error!(tx, stmt.execute(parameters)),
                        Err(e) => send_response_and_break_on_error!(tx, Err(e)),
                    }
                }

                // Prepare and query a statement.
                //
                // Once the query is started, the thread only serves the cursor until it is exhausted or dropped.
                Ok(Command::Query { statement, parameters, tx }) => {
                    debug!("Querying statement: {}", clean_statement(&statement));
                    let mut stmt = match inner_conn.prepare(&statement) {
                        Ok(stmt) => stmt,
                        Err(e) => {
                            send_response_and_break_on_error!(tx, Err(e));
                            continue;
                        }
                    };
                    let mut rows = match stmt.query(parameters) {
                        Ok(rows) => rows,
                        Err(e) => {
                            send_response_and_break_on_error!(tx, Err(e));
                            continue;
                        }
                    };
                    send_response_and_break_on_error!(tx, Ok(()));
                    loop {
                        match command_rx.recv() {
                            Ok(Command::DropCursor) => {
                                // The cursor is dropped, so we need to break the cursor loop.
                                break;
                            }
                            Ok(Command::FetchCursor { tx }) => match rows.next() {
                                Some(Ok(batch)) => {
                                    blocking_send_response_and_break_on_error!(tx, Ok(Some(batch)));
                                }
                                Some(Err(e)) => {
                                    // An error occurred while fetching the next record batch, the stream is
                                    // expected to be dropped by the caller which will end the cursor loop.
                                    error!("Error getting next record batch: {:?}", e);
                                    blocking_send_response_and_break_on_error!(tx, Err(e));
                                }
                                None => {
                                    // The iterator is exhausted, the connection is available for other operations.
                                    blocking_send_response_and_break_on_error!(tx, Ok(None));
                                    break;
                                }
                            },
                            Err(e) => {
                                debug!("Connection dropped while fetching rows: {:?}", e);
                                return;
                            }
                            Ok(_) => {
                                // The streams are borrowing the connection mutably, no other command can be sent
                                // while the cursor is open.
                                error!("Unexpected command while fetching rows.");
                                return;
                            }
                        }
                    }
                }

                Ok(Command::FetchCursor { tx }) => {
                    // Fetching a cursor that is already exhausted.
                    if tx.blocking_send(Ok(None)).is_err() {
                        error!("Channel communication failed while sending statement fetching response.");
                    }
                }

                Ok(Command::DropCursor) => {
                    // The stream was dropped after an error or after the cursor was exhausted, nothing to do.
                }

                Err(_) => {
                    // The connection was dropped without being closed.
                    debug!("Connection dropped, closing the driver connection.");
                    if let Err(e) = inner_conn.close() {
                        error!("Error closing the connection: {:?}", e);
                    }
                    return;
                }
            }
        }
    }
}
