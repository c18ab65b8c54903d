use lazy_static::lazy_static;
use std::sync::Arc;
use std::sync::Mutex;
use tracing::debug;

use crate::driver::DriverConnection;
use crate::driver::DriverFactory;
use crate::{Error, Result};

lazy_static! {
    static ref DRIVER_FACTORIES: Factory = Factory { registered_factories: Mutex::new(Vec::new()) };
    static ref SCHEME_REGEX: regex::Regex = regex::Regex::new("^[a-zA-Z][a-zA-Z0-9+.-]*$").unwrap();
}

/// The registry of drivers.
///
/// The registry only knows how to open connections, it never holds one: each caller owns the connection it opened
/// and is responsible for closing it.
pub struct Factory {
    registered_factories: Mutex<Vec<Arc<Box<dyn DriverFactory>>>>,
}

impl Factory {
    pub fn register(driver: Box<dyn DriverFactory>) {
        debug!("Registering driver for schemes {:?}", driver.schemes());
        match DRIVER_FACTORIES.registered_factories.lock() {
            Ok(mut factories) => factories.push(Arc::new(driver)),
            Err(poisoned) => poisoned.into_inner().push(Arc::new(driver)),
        }
    }

    #[cfg(test)]
    pub fn unregister(scheme: &str) {
        if let Ok(mut factories) = DRIVER_FACTORIES.registered_factories.lock() {
            factories.retain(|f| !f.schemes().contains(&scheme));
        }
    }

    /// Open a connection to the data source identified by the given URI.
    ///
    /// The scheme of the URI is used to find the driver, for example `sqlite:///:memory:` is using the driver
    /// registered for the scheme `sqlite`.
    pub fn open(uri: &str) -> Result<Box<dyn DriverConnection>> {
        let scheme = match uri.split_once(':') {
            Some((scheme, _)) => scheme,
            None => return Err(Error::InvalidUri { uri: uri.to_string(), reason: "missing scheme".to_string() }),
        };
        if !SCHEME_REGEX.is_match(scheme) {
            return Err(Error::InvalidUri { uri: uri.to_string(), reason: format!("invalid scheme '{}'", scheme) });
        }
        match DRIVER_FACTORIES.find(scheme) {
            Some(driver) => {
                debug!("Opening connection with driver '{}'", scheme);
                driver.open(uri).map_err(Error::from)
            }
            None => Err(Error::DriverNotFound { scheme: scheme.to_string() }),
        }
    }

    fn find(&self, scheme: &str) -> Option<Arc<Box<dyn DriverFactory>>> {
        let factories = match self.registered_factories.lock() {
            Ok(factories) => factories,
            Err(poisoned) => poisoned.into_inner(),
        };
        factories.iter().find(|driver_factory| driver_factory.schemes().contains(&scheme)).cloned()
    }
}
