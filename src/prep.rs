//! The pre-processing wrapper.
//!
//! [`Preprocessor`] carries a [`Table`] plus at most one sampling
//! parameter: an absolute row count `n` or a fraction `frac` in (0, 1].
//! Supplying both is a configuration conflict rejected at construction,
//! before any data is touched.

use arrow::array::{ArrayRef, RecordBatch, UInt64Array};
use rand::{seq::SliceRandom, SeedableRng};

use crate::{
    encode::{Encoded, Encoder},
    error::{Error, Result},
    impute::Imputer,
    table::Table,
};

/// Carries a table and its sampling configuration through a
/// pre-processing run.
///
/// # Example
///
/// ```
/// use tablimpa::{Preprocessor, Table};
///
/// let table = Table::from_csv_str("x,y\n1,p\n2,q\n3,r\n").unwrap();
/// let prep = Preprocessor::new(table, Some(2), None).unwrap();
/// assert_eq!(prep.sample_size(), Some(2));
/// ```
#[derive(Debug, Clone)]
pub struct Preprocessor {
    table: Table,
    n: Option<usize>,
    frac: Option<f64>,
    seed: Option<u64>,
}

impl Preprocessor {
    /// Creates a preprocessor over `table` with at most one of `n`
    /// (absolute sample size) or `frac` (sample fraction in (0, 1]).
    ///
    /// Supplying neither disables sampling.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] if both parameters are supplied,
    /// or if `frac` is outside (0, 1].
    pub fn new(table: Table, n: Option<usize>, frac: Option<f64>) -> Result<Self> {
        if n.is_some() && frac.is_some() {
            return Err(Error::invalid_config(
                "sample size n and sample fraction frac are mutually exclusive",
            ));
        }
        if let Some(f) = frac {
            if f <= 0.0 || f > 1.0 {
                return Err(Error::invalid_config(format!(
                    "sample fraction must be in (0, 1], got {f}"
                )));
            }
        }
        Ok(Self {
            table,
            n,
            frac,
            seed: None,
        })
    }

    /// Sets a seed for reproducible sampling.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Returns the absolute sample size, if configured.
    pub fn sample_size(&self) -> Option<usize> {
        self.n
    }

    /// Returns the sample fraction, if configured.
    pub fn sample_fraction(&self) -> Option<f64> {
        self.frac
    }

    /// Returns the held table.
    pub fn table(&self) -> &Table {
        &self.table
    }

    /// Returns true iff every column of the held table is numeric.
    pub fn is_fully_numeric(&self) -> bool {
        self.table.is_fully_numeric()
    }

    /// Imputes missing values on the held table, in place.
    ///
    /// # Errors
    ///
    /// Propagates [`Imputer::apply`] errors.
    pub fn impute(&mut self, imputer: &Imputer) -> Result<()> {
        self.table.impute_in_place(imputer)
    }

    /// Runs an encoding pass over the held table.
    ///
    /// # Errors
    ///
    /// Propagates [`Encoder::encode`] errors.
    pub fn encode(&self, encoder: &Encoder) -> Result<Encoded> {
        encoder.encode(&self.table)
    }

    /// Draws the configured sample from the held table.
    ///
    /// Row order is preserved. With no sampling parameter, or one that
    /// covers the whole table, a copy of the full table is returned.
    ///
    /// # Errors
    ///
    /// Returns an error if the Arrow take kernel fails.
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss
    )]
    pub fn sample(&self) -> Result<Table> {
        let num_rows = self.table.num_rows();
        let sample_size = match (self.n, self.frac) {
            (Some(c), _) => c.min(num_rows),
            (None, Some(f)) => ((num_rows as f64) * f).round() as usize,
            (None, None) => num_rows,
        };

        if sample_size >= num_rows {
            return Ok(self.table.clone());
        }

        let mut indices: Vec<usize> = (0..num_rows).collect();
        let mut rng = match self.seed {
            Some(seed) => rand::rngs::StdRng::seed_from_u64(seed),
            None => rand::rngs::StdRng::from_entropy(),
        };
        indices.shuffle(&mut rng);
        indices.truncate(sample_size);
        indices.sort_unstable();

        let batch = self.table.batch();
        let indices_array = UInt64Array::from_iter_values(indices.iter().map(|&i| i as u64));
        let columns: Vec<ArrayRef> = batch
            .columns()
            .iter()
            .map(|col| {
                arrow::compute::take(col.as_ref(), &indices_array, None).map_err(Error::Arrow)
            })
            .collect::<Result<Vec<_>>>()?;

        let batch = RecordBatch::try_new(batch.schema(), columns)?;
        Ok(Table::new(batch))
    }
}
