#![forbid(unsafe_code)]

pub mod decode;
pub mod driver;
pub mod error;
pub mod factory;
pub mod macros;
pub mod materialize;
pub mod parameters;
pub mod row;
pub mod rows;

/// The mock module is only available when running test or when the `mock` feature is enabled.
/// It provides a mock implementation of the driver and connection to be used in tests.
#[cfg(any(test, feature = "mock"))]
pub mod mock;

/// The error type used across the library.
///
/// All errors produced by the crates in this workspace are supposed to be {{Error}}. Only the drivers are allowed to
/// return their own error types {{DriverError}} which will be then converted to an {{Error}}.
pub type Error = error::Error;

/// A specialized `Result` type for this library.
pub type Result<T> = std::result::Result<T, Error>;

/// Return a clean version of the input string for logging purposes.
/// The returned statement is cleaned by removing all non significant characters.
pub fn clean_statement(input: &str) -> String {
    let mut result = String::with_capacity(input.len());
    let mut chars = input.trim().chars().peekable();

    while let Some(c) = chars.next() {
        if c.is_whitespace() {
            // Collapse any run of whitespace (including new lines and tabs) into a single space.
            while matches!(chars.peek(), Some(next) if next.is_whitespace()) {
                chars.next();
            }
            result.push(' ');
        } else {
            result.push(c);
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_statement() {
        assert_eq!(clean_statement("SELECT 1"), "SELECT 1");
        assert_eq!(clean_statement("\n  SELECT id,\n\t\tname\n  FROM orders\n"), "SELECT id, name FROM orders");
        assert_eq!(clean_statement(""), "");
    }
}
