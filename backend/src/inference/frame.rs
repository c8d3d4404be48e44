use ndarray::Array2;
use serde_json::Value;

/// Canonical column order. Every feature row binds to exactly these
/// columns, and matrix projection re-selects them in this order.
pub const COLUMNS: [&str; 3] = ["lux", "temp", "humid"];

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ShapeError {
    #[error("feature row {row} is not a list")]
    NotARow { row: usize },
    #[error("feature row {row} has {found} values, expected {expected}")]
    Arity {
        row: usize,
        found: usize,
        expected: usize,
    },
    #[error("feature row {row} has a non-numeric value in column \"{column}\"")]
    NotNumeric { row: usize, column: &'static str },
}

/// One sensor observation, already bound to the canonical columns.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureRow {
    pub lux: f64,
    pub temp: f64,
    pub humid: f64,
}

impl FeatureRow {
    fn column(&self, name: &str) -> f64 {
        match name {
            "lux" => self.lux,
            "temp" => self.temp,
            "humid" => self.humid,
            other => unreachable!("unknown canonical column {other}"),
        }
    }
}

/// A batch of feature rows in caller order. Row i of every downstream
/// matrix and prediction vector corresponds to input row i.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FeatureFrame {
    rows: Vec<FeatureRow>,
}

impl FeatureFrame {
    /// Bind raw JSON rows to the canonical columns, position by position.
    ///
    /// Rejects rows that are not lists, rows whose arity is not exactly
    /// three, and non-numeric cells. Nothing is truncated or padded.
    pub fn from_rows(raw: &[Value]) -> Result<Self, ShapeError> {
        let mut rows = Vec::with_capacity(raw.len());
        for (i, value) in raw.iter().enumerate() {
            let cells = value.as_array().ok_or(ShapeError::NotARow { row: i })?;
            if cells.len() != COLUMNS.len() {
                return Err(ShapeError::Arity {
                    row: i,
                    found: cells.len(),
                    expected: COLUMNS.len(),
                });
            }
            let mut bound = [0.0f64; 3];
            for (j, cell) in cells.iter().enumerate() {
                bound[j] = cell.as_f64().ok_or(ShapeError::NotNumeric {
                    row: i,
                    column: COLUMNS[j],
                })?;
            }
            rows.push(FeatureRow {
                lux: bound[0],
                temp: bound[1],
                humid: bound[2],
            });
        }
        Ok(Self { rows })
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Project the frame onto a dense matrix, selecting the canonical
    /// columns by name so the emitted order is fixed regardless of how
    /// the rows were built.
    pub fn to_matrix(&self) -> Array2<f64> {
        Array2::from_shape_fn((self.rows.len(), COLUMNS.len()), |(i, j)| {
            self.rows[i].column(COLUMNS[j])
        })
    }
}

impl From<Vec<FeatureRow>> for FeatureFrame {
    fn from(rows: Vec<FeatureRow>) -> Self {
        Self { rows }
    }
}
