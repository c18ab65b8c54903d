use crate::{Error, Result};
use arrow_array::array::Array;
use arrow_schema::{DataType, TimeUnit};
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;

/// A trait to decode values from an Arrow array.
pub trait Decode: Sized {
    fn decode(array: &dyn Array, index: usize) -> Self {
        match Self::try_decode(array, index) {
            Ok(value) => value,
            Err(e) => panic!("Unable to decode value at index {} (reason: {})", index, e),
        }
    }

    fn try_decode(array: &dyn Array, index: usize) -> Result<Self>;
}

/// Returns whether the value at the given index is null.
///
/// This is a helper function to work around the surprising behavior `is_null` method in the Arrow `Array` trait which
/// will always return `false` for a [arrow_array::NullArray].
pub fn is_null(array: &dyn Array, index: usize) -> bool {
    if array.is_null(index) {
        true
    } else {
        array.as_any().downcast_ref::<arrow_array::NullArray>().is_some()
    }
}

fn check_bounds(array: &dyn Array, index: usize) -> Result<()> {
    if index >= array.len() {
        return Err(Error::OutOfBounds { index });
    }
    Ok(())
}

fn invalid_type(expected: &str, array: &dyn Array) -> Error {
    Error::InvalidType { expected: expected.to_string(), actual: array.data_type().to_string() }
}

impl Decode for String {
    fn try_decode(array: &dyn Array, index: usize) -> Result<Self> {
        check_bounds(array, index)?;
        match array.as_any().downcast_ref::<arrow_array::StringArray>() {
            Some(strings) => Ok(strings.value(index).to_string()),
            None => Err(invalid_type("StringArray", array)),
        }
    }
}

/// Decoding a 32-bit integer.
///
/// SQLite only knows about 64-bit integers, so a {{arrow_array::Int64Array}} is accepted as long as the value fits.
impl Decode for i32 {
    fn try_decode(array: &dyn Array, index: usize) -> Result<Self> {
        check_bounds(array, index)?;
        match array.data_type() {
            DataType::Int32 => Ok(array.as_any().downcast_ref::<arrow_array::Int32Array>().unwrap().value(index)),
            DataType::Int64 => {
                let value = array.as_any().downcast_ref::<arrow_array::Int64Array>().unwrap().value(index);
                i32::try_from(value)
                    .map_err(|_| Error::InternalError { error: format!("Out of range integer: {}.", value).into() })
            }
            _ => Err(invalid_type("Int32Array", array)),
        }
    }
}

impl Decode for i64 {
    fn try_decode(array: &dyn Array, index: usize) -> Result<Self> {
        check_bounds(array, index)?;
        match array.data_type() {
            DataType::Int64 => Ok(array.as_any().downcast_ref::<arrow_array::Int64Array>().unwrap().value(index)),
            DataType::Int32 => {
                Ok(array.as_any().downcast_ref::<arrow_array::Int32Array>().unwrap().value(index).into())
            }
            _ => Err(invalid_type("Int64Array", array)),
        }
    }
}

/// Decoding a 64-bit float.
///
/// SQLite may store an integral value in a `REAL` column as an integer, so a {{arrow_array::Int64Array}} is accepted.
impl Decode for f64 {
    fn try_decode(array: &dyn Array, index: usize) -> Result<Self> {
        check_bounds(array, index)?;
        match array.data_type() {
            DataType::Float64 => Ok(array.as_any().downcast_ref::<arrow_array::Float64Array>().unwrap().value(index)),
            DataType::Int64 => Ok(array.as_any().downcast_ref::<arrow_array::Int64Array>().unwrap().value(index) as f64),
            _ => Err(invalid_type("Float64Array", array)),
        }
    }
}

/// Decoding a DateTime from {{arrow_array::Array}}
impl Decode for chrono::DateTime<chrono::Utc> {
    fn try_decode(array: &dyn Array, index: usize) -> Result<Self> {
        check_bounds(array, index)?;
        match array.data_type() {
            DataType::Timestamp(TimeUnit::Second, _) => {
                let secs = array.as_any().downcast_ref::<arrow_array::TimestampSecondArray>().unwrap().value(index);
                match chrono::DateTime::<Utc>::from_timestamp(secs, 0) {
                    Some(datetime) => Ok(datetime),
                    None => Err(Error::InternalError { error: format!("Out of range datetime: {}s.", secs).into() }),
                }
            }
            DataType::Timestamp(TimeUnit::Millisecond, _) => {
                let ms = array.as_any().downcast_ref::<arrow_array::TimestampMillisecondArray>().unwrap().value(index);
                match chrono::DateTime::<Utc>::from_timestamp_millis(ms) {
                    Some(datetime) => Ok(datetime),
                    None => Err(Error::InternalError { error: format!("Out of range datetime: {}ms.", ms).into() }),
                }
            }
            DataType::Timestamp(TimeUnit::Microsecond, _) => {
                let micro =
                    array.as_any().downcast_ref::<arrow_array::TimestampMicrosecondArray>().unwrap().value(index);
                match chrono::DateTime::<Utc>::from_timestamp_micros(micro) {
                    Some(datetime) => Ok(datetime),
                    None => Err(Error::InternalError { error: format!("Out of range datetime: {}us.", micro).into() }),
                }
            }
            DataType::Timestamp(TimeUnit::Nanosecond, _) => {
                let nano = array.as_any().downcast_ref::<arrow_array::TimestampNanosecondArray>().unwrap().value(index);
                Ok(chrono::DateTime::<Utc>::from_timestamp_nanos(nano))
            }
            DataType::Int64 => {
                let secs = array.as_any().downcast_ref::<arrow_array::Int64Array>().unwrap().value(index);
                match chrono::DateTime::<Utc>::from_timestamp(secs, 0) {
                    Some(datetime) => Ok(datetime),
                    None => Err(Error::InternalError { error: format!("Out of range datetime: {}s.", secs).into() }),
                }
            }
            DataType::Utf8 => {
                let str = array.as_any().downcast_ref::<arrow_array::StringArray>().unwrap().value(index);
                if str.len() == 19 {
                    // This may be a date such as '2024-09-05 05:04:47'. sqlite returns dates in this format.
                    match chrono::NaiveDateTime::parse_from_str(str, "%Y-%m-%d %H:%M:%S") {
                        Ok(datetime) => Ok(DateTime::from_naive_utc_and_offset(datetime, Utc)),
                        Err(e) => Err(Error::InternalError { error: e.into() }),
                    }
                } else {
                    match chrono::DateTime::parse_from_rfc3339(str) {
                        Ok(datetime) => Ok(datetime.with_timezone(&Utc)),
                        Err(e) => Err(Error::InternalError { error: e.into() }),
                    }
                }
            }
            _ => Err(invalid_type("Timestamp", array)),
        }
    }
}

/// A value stored as JSON text in a column.
///
/// Typically the result of an aggregation such as `json_agg` (PostgreSQL) or `json_group_array` (SQLite) producing
/// the children of a row in a single column.
#[derive(Debug, Clone, PartialEq)]
pub struct Json<T>(pub T);

impl<T> Json<T> {
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T: DeserializeOwned> Decode for Json<T> {
    fn try_decode(array: &dyn Array, index: usize) -> Result<Self> {
        // The aggregated children are JSON text, `json_group_array` never returns a blob.
        let text = String::try_decode(array, index)?;
        serde_json::from_str::<T>(&text)
            .map(Json)
            .map_err(|e| Error::InternalError { error: format!("Deserialization error: {}", e).into() })
    }
}
