//! SQLite access: descriptor parsing, query materialization, and
//! replace-whole-table writes.

use polars::prelude::*;
use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection};

use crate::error::{RegistryError, Result};

/// Open a connection from a descriptor string.
///
/// Accepted forms: `sqlite://<path>`, `sqlite:<path>`, `:memory:`, or a
/// bare filesystem path. Any other URL scheme is rejected rather than
/// handed to the driver.
pub fn open_connection(descriptor: &str) -> Result<Connection> {
    let trimmed = descriptor.trim();

    let target = if let Some(rest) = trimmed.strip_prefix("sqlite://") {
        rest
    } else if let Some(rest) = trimmed.strip_prefix("sqlite:") {
        rest
    } else if trimmed.contains("://") {
        return Err(RegistryError::UnsupportedDescriptor(trimmed.to_string()));
    } else {
        trimmed
    };

    if target.is_empty() || target == ":memory:" {
        return Ok(Connection::open_in_memory()?);
    }

    Ok(Connection::open(target)?)
}

/// Execute `sql` and materialize the result set as a frame. Column types
/// are inferred from the first non-null value in each column.
pub fn query_to_frame(connection: &Connection, sql: &str) -> Result<DataFrame> {
    let mut statement = connection.prepare(sql)?;
    let column_names: Vec<String> = statement
        .column_names()
        .iter()
        .map(|name| name.to_string())
        .collect();
    let column_count = column_names.len();

    let mut records: Vec<Vec<Value>> = Vec::new();
    let mut rows = statement.query([])?;
    while let Some(row) = rows.next()? {
        let mut record = Vec::with_capacity(column_count);
        for index in 0..column_count {
            record.push(row.get::<_, Value>(index)?);
        }
        records.push(record);
    }

    let mut columns = Vec::with_capacity(column_count);
    for (index, name) in column_names.iter().enumerate() {
        let values: Vec<&Value> = records.iter().map(|record| &record[index]).collect();
        columns.push(build_series(name, &values).into());
    }

    Ok(DataFrame::new(columns)?)
}

/// SQLite columns are dynamically typed, so the whole column decides the
/// series type: any text/blob makes it a string column, otherwise any real
/// widens integers to Float64, otherwise integers stay Int64.
fn build_series(name: &str, values: &[&Value]) -> Series {
    let mut has_integer = false;
    let mut has_real = false;
    let mut has_text = false;
    for value in values {
        match value {
            Value::Integer(_) => has_integer = true,
            Value::Real(_) => has_real = true,
            Value::Text(_) | Value::Blob(_) => has_text = true,
            Value::Null => {}
        }
    }

    if has_text {
        let typed: Vec<Option<String>> = values
            .iter()
            .map(|value| match value {
                Value::Text(v) => Some(v.clone()),
                Value::Blob(v) => Some(String::from_utf8_lossy(v).into_owned()),
                Value::Integer(v) => Some(v.to_string()),
                Value::Real(v) => Some(v.to_string()),
                Value::Null => None,
            })
            .collect();
        Series::new(name.into(), typed)
    } else if has_real {
        let typed: Vec<Option<f64>> = values
            .iter()
            .map(|value| match value {
                Value::Real(v) => Some(*v),
                Value::Integer(v) => Some(*v as f64),
                _ => None,
            })
            .collect();
        Series::new(name.into(), typed)
    } else if has_integer {
        let typed: Vec<Option<i64>> = values
            .iter()
            .map(|value| match value {
                Value::Integer(v) => Some(*v),
                _ => None,
            })
            .collect();
        Series::new(name.into(), typed)
    } else {
        Series::new(name.into(), vec![None::<&str>; values.len()])
    }
}

fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

fn sql_column_type(dtype: &DataType) -> &'static str {
    if dtype.is_integer() || dtype == &DataType::Boolean {
        "INTEGER"
    } else if dtype.is_float() {
        "REAL"
    } else {
        "TEXT"
    }
}

fn any_value_to_sql(value: AnyValue<'_>) -> Value {
    match value {
        AnyValue::Null => Value::Null,
        AnyValue::Boolean(v) => Value::Integer(v as i64),
        AnyValue::Int8(v) => Value::Integer(v as i64),
        AnyValue::Int16(v) => Value::Integer(v as i64),
        AnyValue::Int32(v) => Value::Integer(v as i64),
        AnyValue::Int64(v) => Value::Integer(v),
        AnyValue::UInt8(v) => Value::Integer(v as i64),
        AnyValue::UInt16(v) => Value::Integer(v as i64),
        AnyValue::UInt32(v) => Value::Integer(v as i64),
        AnyValue::UInt64(v) => Value::Integer(v as i64),
        AnyValue::Float32(v) => Value::Real(v as f64),
        AnyValue::Float64(v) => Value::Real(v),
        AnyValue::String(v) => Value::Text(v.to_string()),
        AnyValue::StringOwned(v) => Value::Text(v.to_string()),
        other => Value::Text(other.to_string()),
    }
}

/// Replace `table` in the target database with the frame's rows: drop any
/// existing table, recreate it from the frame schema, and insert every row
/// inside one transaction.
pub fn write_frame(connection: &mut Connection, table: &str, frame: &DataFrame) -> Result<()> {
    let quoted_table = quote_identifier(table);

    let column_defs: Vec<String> = frame
        .get_columns()
        .iter()
        .map(|column| {
            format!(
                "{} {}",
                quote_identifier(column.name().as_str()),
                sql_column_type(column.dtype())
            )
        })
        .collect();
    let column_list: Vec<String> = frame
        .get_columns()
        .iter()
        .map(|column| quote_identifier(column.name().as_str()))
        .collect();
    let placeholders: Vec<String> = (1..=frame.width()).map(|i| format!("?{i}")).collect();

    let transaction = connection.transaction()?;
    transaction.execute_batch(&format!("DROP TABLE IF EXISTS {quoted_table}"))?;
    transaction.execute_batch(&format!(
        "CREATE TABLE {quoted_table} ({})",
        column_defs.join(", ")
    ))?;

    {
        let insert_sql = format!(
            "INSERT INTO {quoted_table} ({}) VALUES ({})",
            column_list.join(", "),
            placeholders.join(", ")
        );
        let mut statement = transaction.prepare(&insert_sql)?;
        for row in 0..frame.height() {
            let mut params = Vec::with_capacity(frame.width());
            for column in frame.get_columns() {
                params.push(any_value_to_sql(column.get(row)?));
            }
            statement.execute(params_from_iter(params))?;
        }
    }

    transaction.commit()?;
    Ok(())
}
