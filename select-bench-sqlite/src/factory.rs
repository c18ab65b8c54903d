use crate::errors::driver_error;
use crate::Sqlite;
use crate::SqliteOptions;
use crate::DRIVER_NAME;
use crate::IN_MEMORY_URI;
use crate::IN_MEMORY_URI_PATH;
use select_bench_core::driver::{DriverConnection, DriverFactory, Result};
use select_bench_core::Error;
use std::sync::Arc;
use tracing::debug;

pub(crate) struct SqliteFactory {}

impl SqliteFactory {
    fn parse_options(parsed_uri: &url::Url, uri: &str) -> std::result::Result<SqliteOptions, Error> {
        let mut options = SqliteOptions::default();
        parsed_uri.query_pairs().try_for_each(|(key, value)| {
            if key == "max_batch_rows" {
                match value.parse::<usize>() {
                    Ok(value) if value > 0 => options.max_batch_rows = value,
                    _ => {
                        return Err(Error::InvalidUri {
                            uri: uri.to_string(),
                            reason: format!("invalid max_batch_rows '{}'", value),
                        })
                    }
                }
            } else if key == "max_batch_bytes" {
                match value.parse::<bytesize::ByteSize>() {
                    Ok(max_batch_bytes) if max_batch_bytes.0 > 0 => options.max_batch_bytes = max_batch_bytes.0 as usize,
                    _ => {
                        return Err(Error::InvalidUri {
                            uri: uri.to_string(),
                            reason: format!("invalid max_batch_bytes '{}'", value),
                        })
                    }
                }
            }
            Ok(())
        })?;
        Ok(options)
    }
}

impl DriverFactory for SqliteFactory {
    fn schemes(&self) -> &'static [&'static str] {
        &[DRIVER_NAME]
    }

    fn open(&self, uri: &str) -> Result<Box<dyn DriverConnection>> {
        let parsed_uri = url::Url::parse(uri)
            .map_err(|e| Error::InvalidUri { uri: uri.to_string(), reason: e.to_string() })?;
        let options = Self::parse_options(&parsed_uri, uri)?;
        let mut sqlite_uri = uri.to_string();
        // SQLite is expecting to have some flags set when opening a database even if the `mode` URI parameter will
        // eventually override them.
        let mut flags = rusqlite::OpenFlags::SQLITE_OPEN_URI | rusqlite::OpenFlags::SQLITE_OPEN_READ_WRITE;
        if parsed_uri.path() == IN_MEMORY_URI_PATH {
            sqlite_uri.replace_range(0..IN_MEMORY_URI.len(), "file::memory:");
        } else {
            flags.insert(rusqlite::OpenFlags::SQLITE_OPEN_CREATE);
            sqlite_uri.replace_range(0.."sqlite:".len(), "file:");
        }
        debug!("Opening SQLite database: uri={} options={:?}", sqlite_uri, options);
        let conn = rusqlite::Connection::open_with_flags(sqlite_uri, flags).map_err(driver_error)?;
        Ok(Box::new(Sqlite { conn, options: Arc::new(options) }))
    }
}
