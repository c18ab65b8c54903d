use crate::errors::driver_error;
use crate::value::Adapter;
use crate::SqliteOptionsRef;
use arrow_array::builder::ArrayBuilder;
use arrow_array::builder::BinaryBuilder;
use arrow_array::builder::Float64Builder;
use arrow_array::builder::Int64Builder;
use arrow_array::builder::NullBuilder;
use arrow_array::builder::StringBuilder;
use arrow_array::RecordBatch;
use arrow_schema::DataType;
use arrow_schema::Field;
use arrow_schema::Schema;
use arrow_schema::SchemaRef;
use select_bench_core::driver::DriverStatement;
use select_bench_core::driver::Result;
use select_bench_core::parameters::Parameters;
use select_bench_core::Error;
use std::sync::Arc;

pub(crate) struct SqliteStatement<'c> {
    pub(crate) inner: rusqlite::Statement<'c>,
    pub(crate) options: SqliteOptionsRef,
}

impl SqliteStatement<'_> {
    fn bind(&mut self, parameters: Option<Parameters>) -> Result<()> {
        let expected = self.inner.parameter_count();
        let actual = parameters.as_ref().map_or(0, |parameters| parameters.len());
        if expected != actual {
            return Err(Error::InvalidParameterCount { expected, actual }.into());
        }
        if let Some(parameters) = parameters {
            // The valid values for the index `in raw_bind_parameter` begin at `1`, and end at
            // [`Statement::parameter_count`], inclusive.
            for (index, value) in parameters.iter().enumerate() {
                self.inner.raw_bind_parameter(index + 1, Adapter(value)).map_err(driver_error)?;
            }
        }
        Ok(())
    }

    /// Returns the schema of the prepared statement as far as it can be known before running it.
    ///
    /// The type of a column follows the affinity rules of SQLite applied to its declared type. Columns without any
    /// declared type (expressions) or with a `NUMERIC` affinity are typed from the data they return.
    fn schema(&self) -> SchemaRef {
        let fields: Vec<Field> = self
            .inner
            .columns()
            .iter()
            .map(|column| Field::new(column.name(), data_type_from_decl_type(column.decl_type()), true))
            .collect::<Vec<Field>>();
        Arc::new(Schema::new(fields))
    }
}

fn data_type_from_decl_type(decl_type: Option<&str>) -> DataType {
    let decl_type = match decl_type {
        Some(decl_type) => decl_type.to_ascii_uppercase(),
        None => return DataType::Null,
    };
    if decl_type.contains("INT") {
        DataType::Int64
    } else if decl_type.contains("CHAR") || decl_type.contains("CLOB") || decl_type.contains("TEXT") {
        DataType::Utf8
    } else if decl_type.contains("BLOB") {
        DataType::Binary
    } else if decl_type.contains("REAL") || decl_type.contains("FLOA") || decl_type.contains("DOUB") {
        DataType::Float64
    } else {
        DataType::Null
    }
}

impl DriverStatement for SqliteStatement<'_> {
    fn execute(&mut self, parameters: Option<Parameters>) -> Result<u64> {
        self.bind(parameters)?;
        Ok(self.inner.raw_execute().map_err(driver_error)? as u64)
    }

    fn query<'s>(
        &'s mut self,
        parameters: Option<Parameters>,
    ) -> Result<Box<dyn Iterator<Item = Result<RecordBatch>> + 's>> {
        self.bind(parameters)?;
        let schema = self.schema();
        Ok(Box::new(SqliteRows { inner: self.inner.raw_query(), options: self.options.clone(), schema }))
    }
}

struct SqliteRows<'s> {
    inner: rusqlite::Rows<'s>,
    options: SqliteOptionsRef,
    schema: SchemaRef,
}

macro_rules! inner_append_value {
    ($BuilderType:ty, $DataType:expr, $value:expr, $columns:expr, $index:expr, $schema:expr, $value_ref:expr) => {
        match $columns[$index].as_any_mut().downcast_mut::<$BuilderType>() {
            Some(builder) => builder.append_value($value),
            None => {
                if let Some(null_builder) = $columns[$index].as_any_mut().downcast_mut::<NullBuilder>() {
                    // We have a NULL column, this means that the type was unknown until now. This will typically
                    // happen when the column is an expression.
                    let mut new_builder = <$BuilderType>::new();
                    // `append_nulls` is not available for all builders (a.k.a `GenericByteBuilder`).
                    for _ in 0..null_builder.len() {
                        new_builder.append_null();
                    }
                    new_builder.append_value($value);
                    $columns[$index] = Box::new(new_builder);
                    // We also need to alter the schema to reflect the new type
                    let fields: Vec<Arc<Field>> = $schema
                        .fields()
                        .iter()
                        .enumerate()
                        .map(|(i, field)| {
                            if i == $index {
                                Arc::new(Field::new(field.name(), $DataType, field.is_nullable()))
                            } else {
                                field.clone()
                            }
                        })
                        .collect();
                    *$schema = Arc::new(Schema::new(fields));
                } else {
                    return Err(Error::InvalidType {
                        expected: $schema.fields()[$index].data_type().to_string(),
                        actual: $value_ref.data_type().to_string(),
                    }
                    .into());
                }
            }
        }
    };
}

impl SqliteRows<'_> {
    /// Append the values of a row to the builders.
    ///
    /// Returns the estimated number of bytes of the values.
    fn append_value(
        schema: &mut SchemaRef,
        columns: &mut [Box<dyn ArrayBuilder>],
        row: &rusqlite::Row<'_>,
    ) -> Result<usize> {
        let mut bytes = 0;
        for index in 0..columns.len() {
            let value_ref = row.get_ref(index)?;
            match value_ref.data_type() {
                rusqlite::types::Type::Integer => {
                    let value = value_ref.as_i64()?;
                    // SQLite may return an integer for a value stored in a column with a REAL affinity.
                    if let Some(builder) = columns[index].as_any_mut().downcast_mut::<Float64Builder>() {
                        builder.append_value(value as f64);
                    } else {
                        inner_append_value!(Int64Builder, DataType::Int64, value, columns, index, schema, value_ref);
                    }
                    bytes += 8;
                }
                rusqlite::types::Type::Text => {
                    let value = value_ref.as_str()?;
                    bytes += value.len();
                    inner_append_value!(StringBuilder, DataType::Utf8, value, columns, index, schema, value_ref);
                }
                rusqlite::types::Type::Real => {
                    let value = value_ref.as_f64()?;
                    inner_append_value!(Float64Builder, DataType::Float64, value, columns, index, schema, value_ref);
                    bytes += 8;
                }
                rusqlite::types::Type::Blob => {
                    let value = value_ref.as_blob()?;
                    bytes += value.len();
                    inner_append_value!(BinaryBuilder, DataType::Binary, value, columns, index, schema, value_ref);
                }
                rusqlite::types::Type::Null => {
                    if let Some(null_builder) = columns[index].as_any_mut().downcast_mut::<NullBuilder>() {
                        null_builder.append_null();
                    } else if let Some(string_builder) = columns[index].as_any_mut().downcast_mut::<StringBuilder>() {
                        string_builder.append_null();
                    } else if let Some(float_builder) = columns[index].as_any_mut().downcast_mut::<Float64Builder>() {
                        float_builder.append_null();
                    } else if let Some(int_builder) = columns[index].as_any_mut().downcast_mut::<Int64Builder>() {
                        int_builder.append_null();
                    } else if let Some(binary_builder) = columns[index].as_any_mut().downcast_mut::<BinaryBuilder>() {
                        binary_builder.append_null();
                    } else {
                        return Err(
                            Error::UnsupportedDataType { data_type: schema.fields()[index].data_type().to_string() }
                                .into(),
                        );
                    }
                }
            }
        }
        Ok(bytes)
    }

    fn builders(&self) -> Result<Vec<Box<dyn ArrayBuilder>>> {
        self.schema
            .fields()
            .iter()
            .map(|field| match field.data_type() {
                DataType::Int64 => Ok(Box::new(Int64Builder::new()) as Box<dyn ArrayBuilder>),
                DataType::Utf8 => Ok(Box::new(StringBuilder::new()) as Box<dyn ArrayBuilder>),
                DataType::Float64 => Ok(Box::new(Float64Builder::new()) as Box<dyn ArrayBuilder>),
                DataType::Binary => Ok(Box::new(BinaryBuilder::new()) as Box<dyn ArrayBuilder>),
                DataType::Null => Ok(Box::new(NullBuilder::new()) as Box<dyn ArrayBuilder>),
                data_type => Err(Error::UnsupportedDataType { data_type: data_type.to_string() }.into()),
            })
            .collect()
    }
}

impl<'c> Iterator for SqliteRows<'c> {
    type Item = Result<arrow_array::RecordBatch>;

    fn next(&mut self) -> Option<Result<arrow_array::RecordBatch>> {
        let mut columns = match self.builders() {
            Ok(columns) => columns,
            Err(error) => return Some(Err(error)),
        };

        let rows = &mut self.inner;
        let mut row_num = 0;
        let mut batch_bytes = 0;
        loop {
            match rows.next() {
                Ok(Some(row)) => match Self::append_value(&mut self.schema, &mut columns, row) {
                    Ok(row_bytes) => {
                        row_num += 1;
                        batch_bytes += row_bytes;
                        if row_num >= self.options.max_batch_rows || batch_bytes >= self.options.max_batch_bytes {
                            break;
                        }
                    }
                    Err(error) => return Some(Err(error)),
                },
                Ok(None) => break,
                Err(error) => return Some(Err(driver_error(error).into())),
            }
        }
        match row_num {
            0 => None,
            _ => {
                let arrays: Vec<_> = columns.iter_mut().map(|builder| builder.finish()).collect();
                let batch = RecordBatch::try_new(self.schema.clone(), arrays);
                Some(batch.map_err(|e| e.into()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::data_type_from_decl_type;
    use crate::IN_MEMORY_URI;
    use arrow_schema::DataType;
    use select_bench_blocking::Connection;
    use select_bench_core::{params, Error};

    fn connection(options: &str) -> Connection {
        crate::register_driver();
        let mut conn = Connection::open(&format!("{}{}", IN_MEMORY_URI, options)).unwrap();
        conn.execute_batch(
            r#"
            CREATE TABLE test (id INTEGER PRIMARY KEY, name TEXT, score REAL, data BLOB, flag BOOLEAN);
            WITH RECURSIVE seq(n) AS (SELECT 1 UNION ALL SELECT n + 1 FROM seq WHERE n < 100)
                INSERT INTO test (id, name, score, data, flag) SELECT n, hex(zeroblob(50)), n, NULL, n % 2 FROM seq
            "#,
        )
        .unwrap();
        conn
    }

    #[test]
    fn test_data_type_from_decl_type() {
        assert_eq!(data_type_from_decl_type(Some("INTEGER")), DataType::Int64);
        assert_eq!(data_type_from_decl_type(Some("bigint")), DataType::Int64);
        assert_eq!(data_type_from_decl_type(Some("VARCHAR(255)")), DataType::Utf8);
        assert_eq!(data_type_from_decl_type(Some("TEXT")), DataType::Utf8);
        assert_eq!(data_type_from_decl_type(Some("BLOB")), DataType::Binary);
        assert_eq!(data_type_from_decl_type(Some("DOUBLE PRECISION")), DataType::Float64);
        assert_eq!(data_type_from_decl_type(Some("NUMERIC(10,2)")), DataType::Null);
        assert_eq!(data_type_from_decl_type(None), DataType::Null);
    }

    #[test]
    fn test_query() {
        let mut conn = connection("");
        let mut stmt = conn.prepare("SELECT id, name, score, data, flag FROM test WHERE id <= ? ORDER BY id").unwrap();
        let rows: Vec<_> = stmt.query_rows(params!(2)).unwrap().map(|row| row.unwrap()).collect();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].get::<_, i32>("id"), 2);
        assert_eq!(rows[1].get::<_, String>("name").len(), 100);
        assert_eq!(rows[1].get::<_, f64>("score"), 2.0);
        assert!(rows[1].is_null("data"));
        assert_eq!(rows[1].get::<_, i64>("flag"), 0);
        assert_eq!(rows[0].get::<_, i64>("flag"), 1);

        // The statement can be executed again with other parameters.
        assert_eq!(stmt.query_rows(params!(50)).unwrap().count(), 50);
        assert!(stmt.query_rows(None).is_err());
    }

    #[test]
    fn test_max_batch_rows() {
        let mut conn = connection("?max_batch_rows=30");
        let mut stmt = conn.prepare("SELECT id FROM test ORDER BY id").unwrap();
        let sizes: Vec<usize> = stmt.query(None).unwrap().map(|batch| batch.unwrap().num_rows()).collect();
        assert_eq!(sizes, vec![30, 30, 30, 10]);
    }

    #[test]
    fn test_max_batch_bytes() {
        // Each row is 8 bytes for the id and 100 bytes for the name.
        let mut conn = connection("?max_batch_bytes=1KiB");
        let mut stmt = conn.prepare("SELECT id, name FROM test ORDER BY id").unwrap();
        let sizes: Vec<usize> = stmt.query(None).unwrap().map(|batch| batch.unwrap().num_rows()).collect();
        assert_eq!(sizes.len(), 10);
        assert!(sizes.iter().all(|size| *size == 10));
    }

    #[test]
    fn test_expression_columns() {
        let mut conn = connection("");
        let mut stmt = conn
            .prepare(
                r#"SELECT CASE WHEN id = 1 THEN NULL ELSE id END AS "maybe_id",
                          json_group_array(id) AS "ids",
                          COUNT(*) AS "count"
                   FROM test WHERE id <= 3 GROUP BY id ORDER BY id"#,
            )
            .unwrap();
        let batches: Vec<_> = stmt.query(None).unwrap().map(|batch| batch.unwrap()).collect();
        assert_eq!(batches.len(), 1);
        let schema = batches[0].schema();
        assert_eq!(schema.field(0).data_type(), &DataType::Int64);
        assert_eq!(schema.field(1).data_type(), &DataType::Utf8);
        assert_eq!(schema.field(2).data_type(), &DataType::Int64);
        drop(stmt);

        let row = conn.query_row("SELECT NULL AS nothing", None).unwrap().unwrap();
        assert!(row.is_null(0));
        assert!(matches!(row.try_get::<_, i32>(0), Err(Error::UnexpectedNull { .. })));
    }

    #[test]
    fn test_type_mismatch() {
        let mut conn = connection("");
        conn.execute("INSERT INTO test (id, name) VALUES (?, ?)", params!(101, 42)).unwrap();
        let mut stmt = conn.prepare("SELECT CAST(name AS INTEGER) AS x FROM test WHERE id = 101").unwrap();
        assert!(stmt.query_row(None).is_ok());
        drop(stmt);

        // The values of an expression column must all be of the same storage class.
        let mut stmt = conn.prepare("SELECT CASE WHEN id = 1 THEN 'one' ELSE id END AS x FROM test ORDER BY id").unwrap();
        let mut rows = stmt.query(None).unwrap();
        assert!(matches!(rows.next(), Some(Err(_))));
    }
}
