use crate::errors::driver_error;
use crate::statement::SqliteStatement;
use crate::{Sqlite, DRIVER_NAME};
use select_bench_core::driver::{DriverConnection, DriverStatement, Result};

impl DriverConnection for Sqlite {
    fn driver_name(&self) -> &str {
        DRIVER_NAME
    }

    fn prepare<'c, 's>(&'c self, statement: &str) -> Result<Box<dyn DriverStatement + 's>>
    where
        'c: 's,
    {
        Ok(Box::new(SqliteStatement {
            inner: self.conn.prepare(statement).map_err(driver_error)?,
            options: self.options.clone(),
        }))
    }

    fn close(self: Box<Self>) -> Result<()> {
        match self.conn.close() {
            Ok(()) => Ok(()),
            Err((_conn, e)) => Err(driver_error(e).into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::IN_MEMORY_URI;
    use ctor::ctor;
    use path_slash::PathExt;
    use select_bench_blocking::Connection;
    use select_bench_core::{execute, Error};

    #[ctor]
    fn before_all() {
        crate::register_driver();
    }

    #[test]
    fn test_open_memory() {
        let conn = Connection::open(IN_MEMORY_URI).unwrap();
        assert_eq!(conn.driver_name(), "sqlite");
        assert!(conn.close().is_ok());
    }

    #[test]
    fn test_open_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        let file_path = temp_dir.path().join("test.db");

        // trying to open a file that does not exist in read-only should fail
        assert!(Connection::open(&format!("sqlite://{}?mode=ro", file_path.to_slash_lossy())).is_err());
        // trying to open a file that does not exist in read-write should create it
        let uri = format!("sqlite://{}?mode=rwc&max_batch_rows=12", file_path.to_slash_lossy());
        let mut conn = Connection::open(&uri).unwrap();
        assert_eq!(execute!(conn, "CREATE TABLE test (id INTEGER PRIMARY KEY)").unwrap(), 0);
        conn.close().unwrap();
        assert!(file_path.exists());
    }

    #[test]
    fn test_open_invalid_options() {
        assert!(matches!(
            Connection::open(&format!("{}?max_batch_rows=many", IN_MEMORY_URI)),
            Err(Error::InvalidUri { .. })
        ));
        assert!(matches!(
            Connection::open(&format!("{}?max_batch_rows=0", IN_MEMORY_URI)),
            Err(Error::InvalidUri { .. })
        ));
        assert!(matches!(
            Connection::open(&format!("{}?max_batch_bytes=lots", IN_MEMORY_URI)),
            Err(Error::InvalidUri { .. })
        ));
        assert!(Connection::open(&format!("{}?max_batch_bytes=1MiB&max_batch_rows=5", IN_MEMORY_URI)).is_ok());
    }

    #[test]
    fn test_execute() {
        let mut conn = Connection::open(IN_MEMORY_URI).unwrap();
        assert_eq!(execute!(conn, "CREATE TABLE test (id INTEGER PRIMARY KEY, name TEXT UNIQUE)").unwrap(), 0);
        assert_eq!(execute!(conn, "INSERT INTO test (id, name) VALUES (1, 'Alice')").unwrap(), 1);
        assert_eq!(execute!(conn, "INSERT INTO test (id, name) VALUES (?, ?)", 2, "Bob").unwrap(), 1);
        assert_eq!(execute!(conn, "INSERT INTO test (id, name) VALUES (?, ?)", 3, None::<String>).unwrap(), 1);
        assert!(matches!(
            execute!(conn, "INSERT INTO test (id, name) VALUES (?, ?)", 4, "Alice"),
            Err(Error::ConstraintViolation { .. })
        ));
        assert!(matches!(
            execute!(conn, "INSERT INTO test (id, name) VALUES (?, ?)", 5),
            Err(Error::InvalidParameterCount { expected: 2, actual: 1 })
        ));
        assert!(conn.execute("INSERT INTO unknown (id) VALUES (1)", None).is_err());
        assert!(execute!(conn, "UPDATE test SET name = ? WHERE id >= ?", "Carol", 2).is_err());
        assert_eq!(execute!(conn, "DELETE FROM test WHERE id >= ?", 2).unwrap(), 2);

        conn.close().unwrap();
    }
}
