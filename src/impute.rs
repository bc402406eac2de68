//! Missing-value reporting and imputation.
//!
//! The [`Imputer`] walks the columns of a [`Table`] in schema order,
//! reports the missing percentage of each, and fills the gaps. Numeric
//! columns are filled according to the configured [`ImputeStrategy`];
//! categorical columns are always filled with the literal string `"NaN"`,
//! regardless of strategy. That asymmetry is deliberate and long-standing
//! behavior, not something to normalize away.

use std::sync::Arc;

use arrow::{
    array::{
        Array, ArrayRef, Float32Array, Float64Array, Int16Array, Int32Array, Int64Array,
        Int8Array, LargeStringArray, RecordBatch, StringArray, UInt16Array, UInt32Array,
        UInt64Array, UInt8Array,
    },
    compute::cast,
    datatypes::DataType,
};
use serde::{Deserialize, Serialize};

use crate::{
    error::{Error, Result},
    table::{ColumnKind, Table},
};

/// Sentinel written into categorical columns in place of missing values.
pub const MISSING_LABEL: &str = "NaN";

/// Strategy for filling missing values in numeric columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImputeStrategy {
    /// Fill with zero.
    #[default]
    Zero,
    /// Fill with the column mean (truncated for integer columns).
    Mean,
}

/// Missingness observed for a single column.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnMissingness {
    /// Column name.
    pub name: String,
    /// Number of missing entries.
    pub missing_count: usize,
    /// Missing entries as a percentage of the row count.
    pub missing_pct: f64,
}

/// Per-column missingness over a whole table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MissingnessReport {
    /// Total row count.
    pub row_count: usize,
    /// Per-column missingness, in schema order.
    pub columns: Vec<ColumnMissingness>,
}

impl MissingnessReport {
    /// Returns true if any column has missing entries.
    pub fn has_missing(&self) -> bool {
        self.columns.iter().any(|c| c.missing_count > 0)
    }

    /// Returns the entry for a column, if present.
    pub fn column(&self, name: &str) -> Option<&ColumnMissingness> {
        self.columns.iter().find(|c| c.name == name)
    }
}

/// Fills missing values column by column.
///
/// # Example
///
/// ```
/// use tablimpa::{Imputer, ImputeStrategy, Table};
///
/// let table = Table::from_csv_str("x,y\n1,p\n2,\n,q\n").unwrap();
/// let imputer = Imputer::new().strategy(ImputeStrategy::Zero);
/// let clean = imputer.apply(&table).unwrap();
/// assert!(!imputer.report(&clean).unwrap().has_missing());
/// ```
#[derive(Debug, Clone, Default)]
pub struct Imputer {
    strategy: ImputeStrategy,
    verbose: bool,
}

impl Imputer {
    /// Creates an imputer with the default strategy (zero) and verbosity
    /// off.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the fill strategy for numeric columns.
    #[must_use]
    pub fn strategy(mut self, strategy: ImputeStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Enables or disables progress output.
    #[must_use]
    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Computes per-column missingness without touching the data.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EmptyTable`] for a zero-row table.
    pub fn report(&self, table: &Table) -> Result<MissingnessReport> {
        let rows = table.num_rows();
        if rows == 0 {
            return Err(Error::EmptyTable);
        }

        let batch = table.batch();
        let columns = batch
            .schema()
            .fields()
            .iter()
            .enumerate()
            .map(|(idx, field)| {
                let missing = batch.column(idx).null_count();
                ColumnMissingness {
                    name: field.name().clone(),
                    missing_count: missing,
                    missing_pct: percentage(missing, rows),
                }
            })
            .collect();

        Ok(MissingnessReport {
            row_count: rows,
            columns,
        })
    }

    /// Returns a new table with every missing entry filled.
    ///
    /// Columns with no missing entries are passed through untouched and
    /// produce no progress output. For the mutating counterpart see
    /// [`Table::impute_in_place`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::EmptyTable`] for a zero-row table, and
    /// [`Error::UnsupportedType`] when a column with missing entries has
    /// a type that cannot be filled.
    pub fn apply(&self, table: &Table) -> Result<Table> {
        let rows = table.num_rows();
        if rows == 0 {
            return Err(Error::EmptyTable);
        }

        if self.verbose {
            println!("\nMissing value check and imputation starts...");
        }

        let batch = table.batch();
        let schema = batch.schema();
        let mut arrays: Vec<ArrayRef> = Vec::with_capacity(batch.num_columns());

        for (idx, field) in schema.fields().iter().enumerate() {
            let col = batch.column(idx);
            let missing = col.null_count();

            if missing == 0 {
                arrays.push(Arc::clone(col));
                continue;
            }

            if self.verbose {
                println!(
                    "    {} missing percentage is {:.1}%",
                    field.name(),
                    percentage(missing, rows)
                );
            }

            let filled = match ColumnKind::of(field.data_type()) {
                ColumnKind::Categorical => fill_categorical(field.name(), col)?,
                ColumnKind::Numeric => self.fill_numeric(field.name(), col)?,
            };
            arrays.push(filled);
        }

        let batch = RecordBatch::try_new(schema, arrays)?;
        Ok(Table::new(batch))
    }

    fn fill_numeric(&self, name: &str, col: &ArrayRef) -> Result<ArrayRef> {
        let fill = match self.strategy {
            ImputeStrategy::Zero => 0.0,
            ImputeStrategy::Mean => column_mean(name, col)?,
        };

        macro_rules! fill_as {
            ($array:ty, $native:ty) => {{
                let arr = downcast::<$array>(name, col)?;
                Arc::new(<$array>::from_iter_values((0..arr.len()).map(|i| {
                    if arr.is_null(i) {
                        fill as $native
                    } else {
                        arr.value(i)
                    }
                }))) as ArrayRef
            }};
        }

        #[allow(
            clippy::cast_possible_truncation,
            clippy::cast_sign_loss,
            clippy::unnecessary_cast
        )]
        let filled: ArrayRef = match col.data_type() {
            DataType::Int8 => fill_as!(Int8Array, i8),
            DataType::Int16 => fill_as!(Int16Array, i16),
            DataType::Int32 => fill_as!(Int32Array, i32),
            DataType::Int64 => fill_as!(Int64Array, i64),
            DataType::UInt8 => fill_as!(UInt8Array, u8),
            DataType::UInt16 => fill_as!(UInt16Array, u16),
            DataType::UInt32 => fill_as!(UInt32Array, u32),
            DataType::UInt64 => fill_as!(UInt64Array, u64),
            DataType::Float32 => fill_as!(Float32Array, f32),
            DataType::Float64 => fill_as!(Float64Array, f64),
            // Float16 has no native literal path; fill widened, then
            // narrow back to the column's own type.
            DataType::Float16 => {
                let widened = cast(col.as_ref(), &DataType::Float64)?;
                let filled = self.fill_numeric(name, &widened)?;
                cast(filled.as_ref(), &DataType::Float16)?
            }
            other => return Err(Error::unsupported_type(name, other)),
        };
        Ok(filled)
    }
}

fn downcast<'a, T: 'static>(name: &str, col: &'a ArrayRef) -> Result<&'a T> {
    col.as_any()
        .downcast_ref::<T>()
        .ok_or_else(|| Error::unsupported_type(name, col.data_type()))
}

#[allow(clippy::cast_precision_loss)]
fn percentage(missing: usize, rows: usize) -> f64 {
    missing as f64 / rows as f64 * 100.0
}

/// Mean of the non-null values, computed in f64.
#[allow(clippy::cast_precision_loss)]
fn column_mean(name: &str, col: &ArrayRef) -> Result<f64> {
    let float_array = cast(col.as_ref(), &DataType::Float64)?;
    let values = float_array
        .as_any()
        .downcast_ref::<Float64Array>()
        .ok_or_else(|| Error::unsupported_type(name, col.data_type()))?;

    let mut sum = 0.0;
    let mut count = 0usize;
    for i in 0..values.len() {
        if !values.is_null(i) {
            sum += values.value(i);
            count += 1;
        }
    }

    if count == 0 {
        return Ok(0.0);
    }
    Ok(sum / count as f64)
}

fn fill_categorical(name: &str, col: &ArrayRef) -> Result<ArrayRef> {
    let filled: ArrayRef = match col.data_type() {
        DataType::Utf8 => {
            let arr = downcast::<StringArray>(name, col)?;
            let values: Vec<&str> = (0..arr.len())
                .map(|i| {
                    if arr.is_null(i) {
                        MISSING_LABEL
                    } else {
                        arr.value(i)
                    }
                })
                .collect();
            Arc::new(StringArray::from(values))
        }
        DataType::LargeUtf8 => {
            let arr = downcast::<LargeStringArray>(name, col)?;
            let values: Vec<&str> = (0..arr.len())
                .map(|i| {
                    if arr.is_null(i) {
                        MISSING_LABEL
                    } else {
                        arr.value(i)
                    }
                })
                .collect();
            Arc::new(LargeStringArray::from(values))
        }
        other => return Err(Error::unsupported_type(name, other)),
    };
    Ok(filled)
}

#[cfg(test)]
mod tests {
    use arrow::datatypes::{Field, Schema};

    use super::*;

    fn gappy_table() -> Table {
        let schema = Arc::new(Schema::new(vec![
            Field::new("x", DataType::Int64, true),
            Field::new("y", DataType::Utf8, true),
        ]));
        let batch = RecordBatch::try_new(
            schema,
            vec![
                Arc::new(Int64Array::from(vec![Some(1), Some(2), None])),
                Arc::new(StringArray::from(vec![Some("p"), None, Some("q")])),
            ],
        )
        .unwrap();
        Table::new(batch)
    }

    #[test]
    fn test_zero_strategy_scenario() {
        let table = gappy_table();
        let result = Imputer::new().apply(&table).unwrap();

        let x = result.column("x").unwrap();
        let x = x.as_any().downcast_ref::<Int64Array>().unwrap();
        assert_eq!(x.value(0), 1);
        assert_eq!(x.value(1), 2);
        assert_eq!(x.value(2), 0);

        let y = result.column("y").unwrap();
        let y = y.as_any().downcast_ref::<StringArray>().unwrap();
        assert_eq!(y.value(0), "p");
        assert_eq!(y.value(1), "NaN");
        assert_eq!(y.value(2), "q");
    }

    #[test]
    fn test_categorical_sentinel_ignores_strategy() {
        let table = gappy_table();
        let result = Imputer::new()
            .strategy(ImputeStrategy::Mean)
            .apply(&table)
            .unwrap();

        let y = result.column("y").unwrap();
        let y = y.as_any().downcast_ref::<StringArray>().unwrap();
        assert_eq!(y.value(1), "NaN");
    }

    #[test]
    fn test_mean_strategy_float() {
        let schema = Arc::new(Schema::new(vec![Field::new(
            "v",
            DataType::Float64,
            true,
        )]));
        let batch = RecordBatch::try_new(
            schema,
            vec![Arc::new(Float64Array::from(vec![
                Some(1.0),
                None,
                Some(3.0),
            ]))],
        )
        .unwrap();

        let result = Imputer::new()
            .strategy(ImputeStrategy::Mean)
            .apply(&Table::new(batch))
            .unwrap();
        let v = result.column("v").unwrap();
        let v = v.as_any().downcast_ref::<Float64Array>().unwrap();
        assert!((v.value(1) - 2.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_mean_strategy_truncates_for_integers() {
        let schema = Arc::new(Schema::new(vec![Field::new("v", DataType::Int64, true)]));
        let batch = RecordBatch::try_new(
            schema,
            vec![Arc::new(Int64Array::from(vec![Some(1), Some(2), None]))],
        )
        .unwrap();

        let result = Imputer::new()
            .strategy(ImputeStrategy::Mean)
            .apply(&Table::new(batch))
            .unwrap();
        let v = result.column("v").unwrap();
        let v = v.as_any().downcast_ref::<Int64Array>().unwrap();
        // mean of [1, 2] is 1.5, truncated into the column's own type
        assert_eq!(v.value(2), 1);
    }

    #[test]
    fn test_unsigned_column_filled_not_rejected() {
        let schema = Arc::new(Schema::new(vec![Field::new("u", DataType::UInt8, true)]));
        let batch = RecordBatch::try_new(
            schema,
            vec![Arc::new(UInt8Array::from(vec![Some(1), None, Some(3)]))],
        )
        .unwrap();
        let table = Table::new(batch);
        assert!(table.is_fully_numeric());

        let result = Imputer::new().apply(&table).unwrap();
        let u = result.column("u").unwrap();
        let u = u.as_any().downcast_ref::<UInt8Array>().unwrap();
        assert_eq!(u.value(1), 0);
        assert_eq!(u.null_count(), 0);
    }

    #[test]
    fn test_small_int_mean_fill() {
        let schema = Arc::new(Schema::new(vec![Field::new("v", DataType::Int16, true)]));
        let batch = RecordBatch::try_new(
            schema,
            vec![Arc::new(Int16Array::from(vec![Some(10), None, Some(20)]))],
        )
        .unwrap();

        let result = Imputer::new()
            .strategy(ImputeStrategy::Mean)
            .apply(&Table::new(batch))
            .unwrap();
        let v = result.column("v").unwrap();
        let v = v.as_any().downcast_ref::<Int16Array>().unwrap();
        assert_eq!(v.value(1), 15);
    }

    #[test]
    fn test_half_precision_column_filled() {
        let source: ArrayRef = Arc::new(Float64Array::from(vec![Some(1.0), None, Some(3.0)]));
        let halves = cast(source.as_ref(), &DataType::Float16).unwrap();
        let schema = Arc::new(Schema::new(vec![Field::new("h", DataType::Float16, true)]));
        let batch = RecordBatch::try_new(schema, vec![halves]).unwrap();
        let table = Table::new(batch);
        assert!(table.is_fully_numeric());

        let result = Imputer::new()
            .strategy(ImputeStrategy::Mean)
            .apply(&table)
            .unwrap();
        let h = result.column("h").unwrap();
        assert_eq!(h.data_type(), &DataType::Float16);
        assert_eq!(h.null_count(), 0);
        let widened = cast(h.as_ref(), &DataType::Float64).unwrap();
        let widened = widened.as_any().downcast_ref::<Float64Array>().unwrap();
        assert!((widened.value(1) - 2.0).abs() < 1e-2);
    }

    #[test]
    fn test_verbose_run_fills_gaps() {
        let table = gappy_table();
        let result = Imputer::new().verbose(true).apply(&table).unwrap();
        assert_eq!(result.batch().column(0).null_count(), 0);
        assert_eq!(result.batch().column(1).null_count(), 0);
    }

    #[test]
    fn test_idempotent_on_clean_table() {
        let table = gappy_table();
        let once = Imputer::new().apply(&table).unwrap();
        let twice = Imputer::new().apply(&once).unwrap();
        assert_eq!(once.batch(), twice.batch());
    }

    #[test]
    fn test_clean_columns_passed_through() {
        let schema = Arc::new(Schema::new(vec![Field::new("v", DataType::Int64, false)]));
        let batch =
            RecordBatch::try_new(schema, vec![Arc::new(Int64Array::from(vec![1, 2, 3]))]).unwrap();
        let table = Table::new(batch);

        let result = Imputer::new().apply(&table).unwrap();
        assert_eq!(result.batch(), table.batch());
    }

    #[test]
    fn test_empty_table_rejected() {
        let schema = Arc::new(Schema::new(vec![Field::new("v", DataType::Int64, true)]));
        let batch =
            RecordBatch::try_new(schema, vec![Arc::new(Int64Array::from(Vec::<i64>::new()))])
                .unwrap();

        let result = Imputer::new().apply(&Table::new(batch));
        assert!(matches!(result, Err(Error::EmptyTable)));
    }

    #[test]
    fn test_report_percentages() {
        let table = gappy_table();
        let report = Imputer::new().report(&table).unwrap();

        assert_eq!(report.row_count, 3);
        assert!(report.has_missing());
        let x = report.column("x").unwrap();
        assert_eq!(x.missing_count, 1);
        assert!((x.missing_pct - 100.0 / 3.0).abs() < 1e-9);
        assert!(report.column("nope").is_none());
    }

    #[test]
    fn test_report_clean_after_impute() {
        let table = gappy_table();
        let imputer = Imputer::new();
        let clean = imputer.apply(&table).unwrap();
        let report = imputer.report(&clean).unwrap();
        assert!(!report.has_missing());
    }

    #[test]
    fn test_unfillable_categorical_type() {
        use arrow::array::Date32Array;

        let schema = Arc::new(Schema::new(vec![Field::new("d", DataType::Date32, true)]));
        let batch =
            RecordBatch::try_new(schema, vec![Arc::new(Date32Array::from(vec![Some(1), None]))])
                .unwrap();

        let result = Imputer::new().apply(&Table::new(batch));
        assert!(matches!(result, Err(Error::UnsupportedType { .. })));
    }

    #[test]
    fn test_impute_in_place() {
        let mut table = gappy_table();
        table.impute_in_place(&Imputer::new()).unwrap();
        assert_eq!(table.batch().column(0).null_count(), 0);
        assert_eq!(table.batch().column(1).null_count(), 0);
    }

    #[test]
    fn test_strategy_serde_round_trip() {
        let json = serde_json::to_string(&ImputeStrategy::Mean).unwrap();
        assert_eq!(json, "\"mean\"");
        let back: ImputeStrategy = serde_json::from_str(&json).unwrap();
        assert_eq!(back, ImputeStrategy::Mean);
        assert_eq!(ImputeStrategy::default(), ImputeStrategy::Zero);
    }
}
