use std::collections::BTreeMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::sync::Arc;

use arrow::array::{Array, ArrayRef, AsArray, Float64Array, Int64Array, StringArray};
use arrow::datatypes::{
    DataType, Field as ArrowField, Float32Type, Float64Type, Int32Type, Int64Type, Schema,
};
use arrow::error::ArrowError;
use arrow::record_batch::RecordBatch;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::{Map, Value as JsonValue};

use super::model::{CategoricalField, Cell, Dataset, Field, NumericField, Row};
use crate::error::LoadError;

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a transaction dataset from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – header row naming every column (the canonical source)
/// * `.json`    – `[{ "Age": 55, "Gender": "Male", ... }, ...]`
/// * `.parquet` – flat columns named like the CSV header
///
/// Columns beyond the required ones (e.g. `Customer ID`) are ignored.
pub fn load_file(path: &Path) -> Result<Dataset, LoadError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let dataset = match ext.as_str() {
        "csv" => read_csv(open(path)?),
        "json" => {
            let text = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
                path: path.to_path_buf(),
                source,
            })?;
            read_json(&text)
        }
        "parquet" | "pq" => load_parquet(path),
        other => Err(LoadError::UnsupportedFormat(other.to_string())),
    }?;

    log::info!(
        "Loaded {} rows from {} ({} enum columns indexed)",
        dataset.len(),
        path.display(),
        dataset.unique_values.len()
    );
    Ok(dataset)
}

fn open(path: &Path) -> Result<File, LoadError> {
    File::open(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Enum cells must carry text and numeric cells a finite value. An empty
/// cell would become its own grouping key, and a NaN would poison every mean
/// it reaches.
fn check_complete(row_no: usize, row: &Row) -> Result<(), LoadError> {
    if let Some(field) = CategoricalField::ALL
        .iter()
        .find(|f| row.category(**f).is_empty())
    {
        return Err(LoadError::Parse {
            row: row_no,
            message: format!("column '{field}': empty value"),
        });
    }
    if let Some(field) = NumericField::ALL
        .iter()
        .find(|f| !row.numeric(**f).is_finite())
    {
        return Err(LoadError::Parse {
            row: row_no,
            message: format!("column '{field}': non-finite value"),
        });
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// Read a comma-delimited source with a header row. Enum values are taken
/// verbatim (no trimming, case-sensitive).
pub fn read_csv<R: Read>(source: R) -> Result<Dataset, LoadError> {
    let mut reader = csv::Reader::from_reader(source);
    let headers = reader.headers()?.clone();

    if let Some(field) = Field::ALL
        .iter()
        .find(|f| !headers.iter().any(|h| h == f.header()))
    {
        return Err(LoadError::MissingColumn(field.header().to_string()));
    }

    let mut rows = Vec::new();
    for (row_no, result) in reader.records().enumerate() {
        let record = result?;
        let row: Row = record
            .deserialize(Some(&headers))
            .map_err(|e| csv_row_error(&headers, row_no, e))?;
        check_complete(row_no, &row)?;
        rows.push(row);
    }

    Ok(Dataset::from_rows(rows))
}

fn csv_row_error(headers: &csv::StringRecord, row: usize, err: csv::Error) -> LoadError {
    if let csv::ErrorKind::Deserialize { err: de, .. } = err.kind() {
        let column = de
            .field()
            .and_then(|i| headers.get(i as usize))
            .unwrap_or("?");
        return LoadError::Parse {
            row,
            message: format!("column '{column}': {}", de.kind()),
        };
    }
    LoadError::Csv(err)
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Records-oriented JSON (`df.to_json(orient='records')`), keys are the CSV
/// header names.
pub fn read_json(text: &str) -> Result<Dataset, LoadError> {
    let records: Vec<Map<String, JsonValue>> = serde_json::from_str(text)?;
    let mut rows = Vec::with_capacity(records.len());

    for (row_no, record) in records.into_iter().enumerate() {
        if let Some(field) = Field::ALL
            .iter()
            .find(|f| !record.contains_key(f.header()))
        {
            return Err(LoadError::MissingColumn(field.header().to_string()));
        }
        let row: Row =
            serde_json::from_value(JsonValue::Object(record)).map_err(|e| LoadError::Parse {
                row: row_no,
                message: e.to_string(),
            })?;
        check_complete(row_no, &row)?;
        rows.push(row);
    }

    Ok(Dataset::from_rows(rows))
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Works with files written by both Pandas (`df.to_parquet()`) and Polars:
/// integer columns may be Int32/Int64, decimals Float32/Float64 (or integer),
/// enums Utf8/LargeUtf8.
fn load_parquet(path: &Path) -> Result<Dataset, LoadError> {
    let builder = ParquetRecordBatchReaderBuilder::try_new(open(path)?)?;
    let reader = builder.build()?;

    let mut rows = Vec::new();
    for batch_result in reader {
        let batch = batch_result?;
        let first_row = rows.len();
        rows.extend(rows_from_batch(&batch, first_row)?);
    }

    Ok(Dataset::from_rows(rows))
}

/// Convert one Arrow record batch into rows. `first_row` offsets the row
/// numbers used in error messages.
pub fn rows_from_batch(batch: &RecordBatch, first_row: usize) -> Result<Vec<Row>, LoadError> {
    let schema = batch.schema();
    let mut columns: BTreeMap<Field, ArrayRef> = BTreeMap::new();
    for field in Field::ALL {
        let idx = schema
            .index_of(field.header())
            .map_err(|_| LoadError::MissingColumn(field.header().to_string()))?;
        columns.insert(field, batch.column(idx).clone());
    }

    (0..batch.num_rows())
        .map(|i| {
            let row_no = first_row + i;
            let row = Row::from_cells(|field| match columns.get(&field) {
                Some(col) => extract_cell(col, field, i),
                None => Err(format!("column '{field}' not mapped")),
            })
            .map_err(|message| LoadError::Parse {
                row: row_no,
                message,
            })?;
            check_complete(row_no, &row)?;
            Ok(row)
        })
        .collect()
}

fn extract_cell(col: &ArrayRef, field: Field, row: usize) -> Result<Cell, String> {
    if col.is_null(row) {
        return Err(format!("column '{field}': null value"));
    }
    let cell = match col.data_type() {
        DataType::Int32 => Cell::Integer(col.as_primitive::<Int32Type>().value(row) as i64),
        DataType::Int64 => Cell::Integer(col.as_primitive::<Int64Type>().value(row)),
        DataType::Float32 => Cell::Decimal(col.as_primitive::<Float32Type>().value(row) as f64),
        DataType::Float64 => Cell::Decimal(col.as_primitive::<Float64Type>().value(row)),
        DataType::Utf8 => Cell::Text(col.as_string::<i32>().value(row).to_string()),
        DataType::LargeUtf8 => Cell::Text(col.as_string::<i64>().value(row).to_string()),
        other => return Err(format!("column '{field}': unsupported type {other:?}")),
    };
    Ok(cell)
}

// ---------------------------------------------------------------------------
// Arrow export
// ---------------------------------------------------------------------------

/// Build a record batch with one column per required field, in header order.
/// Used for tabular previews and for writing sample files.
pub fn rows_to_batch(rows: &[&Row]) -> Result<RecordBatch, ArrowError> {
    let mut fields = Vec::with_capacity(Field::ALL.len());
    let mut columns: Vec<ArrayRef> = Vec::with_capacity(Field::ALL.len());

    for field in Field::ALL {
        let (data_type, array): (DataType, ArrayRef) = match field {
            Field::Numeric(NumericField::Age) => (
                DataType::Int64,
                Arc::new(Int64Array::from_iter_values(rows.iter().map(|r| r.age))),
            ),
            Field::Numeric(NumericField::PreviousPurchases) => (
                DataType::Int64,
                Arc::new(Int64Array::from_iter_values(
                    rows.iter().map(|r| r.previous_purchases),
                )),
            ),
            Field::Numeric(n) => (
                DataType::Float64,
                Arc::new(Float64Array::from_iter_values(rows.iter().map(|r| r.numeric(n)))),
            ),
            Field::Categorical(c) => (
                DataType::Utf8,
                Arc::new(StringArray::from_iter_values(rows.iter().map(|r| r.category(c)))),
            ),
        };
        fields.push(ArrowField::new(field.header(), data_type, false));
        columns.push(array);
    }

    RecordBatch::try_new(Arc::new(Schema::new(fields)), columns)
}
