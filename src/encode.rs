//! Categorical-to-numeric encoding.
//!
//! The [`Encoder`] finds every categorical column of a [`Table`], fits a
//! [`LabelEncoder`] per column, and appends an `Int64` column named
//! `"num_" + original` holding the integer codes. The original columns
//! are never removed; the fitted encoders are returned alongside the
//! augmented table for inverse lookups.
//!
//! Codes are assigned over the lexicographically sorted distinct labels,
//! not in order of first appearance.

use std::{collections::BTreeMap, sync::Arc};

use arrow::{
    array::{Array, ArrayRef, Int64Array, StringArray},
    compute::cast,
    datatypes::DataType,
};
use serde::{Deserialize, Serialize};

use crate::{
    error::{Error, Result},
    impute::MISSING_LABEL,
    table::{ColumnKind, Table},
};

/// Prefix prepended to a categorical column's name to form its derived
/// numeric column.
pub const DERIVED_PREFIX: &str = "num_";

/// A bidirectional label-to-code table.
///
/// Fitting sorts the distinct observed labels lexicographically and
/// assigns codes `0..k-1` in that order, so code assignment is stable
/// across runs over the same label set.
///
/// # Example
///
/// ```
/// use tablimpa::LabelEncoder;
///
/// let le = LabelEncoder::fit(["b", "a", "b"]);
/// assert_eq!(le.transform("a"), Some(0));
/// assert_eq!(le.transform("b"), Some(1));
/// assert_eq!(le.inverse(0), Some("a"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelEncoder {
    classes: Vec<String>,
}

impl LabelEncoder {
    /// Fits an encoder on the given labels.
    pub fn fit<S: AsRef<str>>(labels: impl IntoIterator<Item = S>) -> Self {
        let classes: std::collections::BTreeSet<String> = labels
            .into_iter()
            .map(|l| l.as_ref().to_string())
            .collect();
        Self {
            classes: classes.into_iter().collect(),
        }
    }

    /// Returns the distinct labels in code order (lexicographic).
    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    /// Returns the number of distinct labels.
    pub fn len(&self) -> usize {
        self.classes.len()
    }

    /// Returns true if the encoder has no classes.
    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    /// Returns the code for a label, or `None` if it was never observed.
    #[allow(clippy::cast_possible_wrap)]
    pub fn transform(&self, label: &str) -> Option<i64> {
        self.classes
            .binary_search_by(|c| c.as_str().cmp(label))
            .ok()
            .map(|idx| idx as i64)
    }

    /// Returns the label for a code, or `None` if out of range.
    #[allow(clippy::cast_sign_loss)]
    pub fn inverse(&self, code: i64) -> Option<&str> {
        if code < 0 {
            return None;
        }
        self.classes.get(code as usize).map(String::as_str)
    }

    /// Encodes a sequence of labels.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownLabel`] for any label the encoder was not
    /// fitted on.
    pub fn encode<S: AsRef<str>>(
        &self,
        labels: impl IntoIterator<Item = S>,
        name: &str,
    ) -> Result<Vec<i64>> {
        labels
            .into_iter()
            .map(|l| {
                let l = l.as_ref();
                self.transform(l)
                    .ok_or_else(|| Error::unknown_label(l, name))
            })
            .collect()
    }
}

/// Everything produced by one encoding pass.
#[derive(Debug, Clone)]
pub struct Encoded {
    /// The input table with one derived `num_*` column appended per
    /// categorical column, after all original columns.
    pub table: Table,
    /// The augmented table restricted to its numeric columns.
    pub numeric_table: Table,
    /// Names of the numeric columns of the augmented table, in order.
    pub numeric_columns: Vec<String>,
    /// Fitted encoders, keyed by derived column name.
    pub encoders: BTreeMap<String, LabelEncoder>,
}

/// Converts categorical columns to integer-coded numeric columns.
///
/// # Example
///
/// ```
/// use tablimpa::{Encoder, Table};
///
/// let table = Table::from_csv_str("x,color\n1,red\n2,blue\n3,red\n").unwrap();
/// let encoded = Encoder::new().encode(&table).unwrap();
/// assert_eq!(encoded.numeric_columns, vec!["x", "num_color"]);
/// assert!(encoded.encoders.contains_key("num_color"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct Encoder {
    verbose: bool,
}

impl Encoder {
    /// Creates an encoder with verbosity off.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enables or disables progress output.
    #[must_use]
    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Runs one encoding pass over the table.
    ///
    /// Categorical columns are processed in schema (left-to-right)
    /// order. A table with no categorical columns comes back unchanged,
    /// with an empty encoder map.
    ///
    /// # Errors
    ///
    /// Returns an error if a categorical column cannot be rendered as
    /// strings for encoding.
    pub fn encode(&self, table: &Table) -> Result<Encoded> {
        let categorical: Vec<String> = table
            .column_kinds()
            .into_iter()
            .filter(|(_, kind)| !kind.is_numeric())
            .map(|(name, _)| name)
            .collect();

        if self.verbose {
            println!("\nAutomatic variable type conversion starts...");
        }

        let mut augmented = table.clone();
        let mut encoders = BTreeMap::new();

        for name in &categorical {
            let derived = format!("{DERIVED_PREFIX}{name}");
            if self.verbose {
                println!("    Convert {name} to numerical as {derived}");
            }

            let labels = column_labels(&augmented, name)?;
            let le = LabelEncoder::fit(labels.iter().map(String::as_str));
            let codes = le.encode(labels.iter().map(String::as_str), &derived)?;

            let array: ArrayRef = Arc::new(Int64Array::from(codes));
            augmented = augmented.with_column(&derived, array)?;

            // Retained copy stays stable even if the working encoder is
            // reused elsewhere.
            encoders.insert(derived, le.clone());
        }

        let numeric_columns: Vec<String> = augmented
            .column_kinds()
            .into_iter()
            .filter(|(_, kind)| kind.is_numeric())
            .map(|(name, _)| name)
            .collect();
        let numeric_table = augmented.select(&numeric_columns)?;

        Ok(Encoded {
            table: augmented,
            numeric_table,
            numeric_columns,
            encoders,
        })
    }
}

/// Renders a categorical column as owned strings, mapping nulls to the
/// same sentinel the imputer writes.
fn column_labels(table: &Table, name: &str) -> Result<Vec<String>> {
    let col = table.column(name)?;

    // Cast covers Utf8 as well as bool/date/etc. categoricals.
    let rendered = cast(col.as_ref(), &DataType::Utf8)
        .map_err(|_| Error::unsupported_type(name, col.data_type()))?;
    let strings = rendered
        .as_any()
        .downcast_ref::<StringArray>()
        .ok_or_else(|| Error::unsupported_type(name, col.data_type()))?;

    Ok((0..strings.len())
        .map(|i| {
            if strings.is_null(i) {
                MISSING_LABEL.to_string()
            } else {
                strings.value(i).to_string()
            }
        })
        .collect())
}
