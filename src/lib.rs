//! tablimpa - Tabular Pre-Processing in Pure Rust
//!
//! A small pre-processing library for labeled two-dimensional data held
//! as Arrow `RecordBatch`es: shape validation, numeric-completeness
//! checking, missing-value reporting and imputation, and categorical
//! label encoding with reversible lookups.
//!
//! # Design Principles
//!
//! 1. **Fail-fast** - every error reflects invalid caller input and
//!    propagates immediately; nothing is retried or partially applied
//! 2. **Pure Rust** - no Python, no FFI
//! 3. **Ecosystem aligned** - Arrow 53 throughout
//! 4. **Explicit tags over reflection** - input shape and column kind
//!    are classified once and dispatched on, never re-inspected
//!
//! # Quick Start
//!
//! ```
//! use tablimpa::{Encoder, Imputer, Table};
//!
//! let table = Table::from_csv_str("age,city\n31,lima\n,quito\n45,lima\n").unwrap();
//!
//! // Fill the gaps, then encode the categorical column
//! let table = Imputer::new().apply(&table).unwrap();
//! let encoded = Encoder::new().encode(&table).unwrap();
//!
//! assert_eq!(encoded.numeric_columns, vec!["age", "num_city"]);
//! assert!(encoded.numeric_table.is_fully_numeric());
//! ```

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
// Allow common test patterns
#![cfg_attr(
    test,
    allow(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::cast_lossless,
        clippy::cast_possible_truncation,
        clippy::cast_precision_loss,
        clippy::float_cmp,
        clippy::redundant_clone,
        clippy::similar_names
    )
)]
// Allow some pedantic lints for cleaner code
#![allow(clippy::doc_markdown)]
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::map_unwrap_or)]

pub mod encode;
pub mod error;
pub mod impute;
pub mod prep;
pub mod table;

// Re-exports for convenience
pub use encode::{Encoded, Encoder, LabelEncoder, DERIVED_PREFIX};
pub use error::{Error, Result};
pub use impute::{ColumnMissingness, ImputeStrategy, Imputer, MissingnessReport, MISSING_LABEL};
pub use prep::Preprocessor;
pub use table::{is_fully_numeric, ColumnKind, Table, TabularInput};
