use rusqlite::types::{ToSqlOutput, Value, ValueRef};
use select_bench_core::parameters::Parameter;

/// Binds a [Parameter] to a rusqlite statement.
///
/// `rusqlite::ToSql` cannot be implemented on `Parameter` directly, both being foreign to this crate
/// ([E0117](https://doc.rust-lang.org/error_codes/E0117.html)).
pub(crate) struct Adapter<'a>(pub &'a Parameter);

impl rusqlite::ToSql for Adapter<'_> {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(match self.0 {
            Parameter::Null => ToSqlOutput::Owned(Value::Null),
            Parameter::Int32(value) => ToSqlOutput::Owned(Value::Integer(i64::from(*value))),
            Parameter::Int64(value) => ToSqlOutput::Owned(Value::Integer(*value)),
            Parameter::Float64(value) => ToSqlOutput::Owned(Value::Real(*value)),
            Parameter::Text(value) => ToSqlOutput::Borrowed(ValueRef::Text(value.as_bytes())),
        })
    }
}
