//! Input and output scaling fitted on the training partition only.
//!
//! Inputs are min-max scaled to `[0, 1]`, outputs are standardized to zero mean and unit
//! variance. Degenerate training columns (zero range, zero or undefined variance) are
//! rejected instead of propagating NaN values.
use crate::errors::{BenchError, Result};

use ndarray::{Array1, Array2, ArrayBase, Axis, Data, Ix2, Zip};
use ndarray_stats::QuantileExt;

/// Min-max scaling parameters computed from training inputs
#[derive(Clone, Debug, PartialEq)]
pub struct MinMaxScaler {
    /// Column minima
    pub min: Array1<f64>,
    /// Column maxima
    pub max: Array1<f64>,
}

/// Standardization parameters computed from training outputs
#[derive(Clone, Debug, PartialEq)]
pub struct StandardScaler {
    /// Column means
    pub mean: Array1<f64>,
    /// Column sample standard deviations (ddof = 1)
    pub std: Array1<f64>,
}

impl MinMaxScaler {
    /// Compute column ranges of `x`, `names` are used to report degenerate columns
    pub fn fit(x: &ArrayBase<impl Data<Elem = f64>, Ix2>, names: &[String]) -> Result<Self> {
        if x.nrows() == 0 {
            return Err(BenchError::InvalidData(
                "cannot compute min-max scaling on empty data".to_string(),
            ));
        }
        let mut min = Array1::zeros(x.ncols());
        let mut max = Array1::zeros(x.ncols());
        for (j, col) in x.columns().into_iter().enumerate() {
            let lo = *col
                .min()
                .map_err(|e| BenchError::InvalidData(format!("column {j}: {e}")))?;
            let hi = *col
                .max()
                .map_err(|e| BenchError::InvalidData(format!("column {j}: {e}")))?;
            if !(hi - lo).is_finite() || hi - lo == 0. {
                return Err(BenchError::DegenerateColumn {
                    column: column_name(names, j),
                    reason: format!("training range is [{lo}, {hi}]"),
                });
            }
            min[j] = lo;
            max[j] = hi;
        }
        Ok(MinMaxScaler { min, max })
    }

    /// Scale `x` to `(x - min) / (max - min)`
    pub fn transform(&self, x: &ArrayBase<impl Data<Elem = f64>, Ix2>) -> Array2<f64> {
        (x - &self.min) / &(&self.max - &self.min)
    }

    /// Undo scaling: `x * (max - min) + min`
    pub fn inverse_transform(&self, x: &ArrayBase<impl Data<Elem = f64>, Ix2>) -> Array2<f64> {
        x * &(&self.max - &self.min) + &self.min
    }
}

impl StandardScaler {
    /// Compute column means and standard deviations of `y`
    pub fn fit(y: &ArrayBase<impl Data<Elem = f64>, Ix2>, names: &[String]) -> Result<Self> {
        if y.nrows() < 2 {
            return Err(BenchError::InvalidData(format!(
                "standardization requires at least 2 rows, got {}",
                y.nrows()
            )));
        }
        let mean = y
            .mean_axis(Axis(0))
            .ok_or_else(|| BenchError::InvalidData("empty outputs".to_string()))?;
        let std = y.std_axis(Axis(0), 1.);
        for (j, s) in std.iter().enumerate() {
            if !s.is_finite() || *s == 0. {
                return Err(BenchError::DegenerateColumn {
                    column: column_name(names, j),
                    reason: format!("training standard deviation is {s}"),
                });
            }
        }
        Ok(StandardScaler { mean, std })
    }

    /// Scale `y` to `(y - mean) / std`
    pub fn transform(&self, y: &ArrayBase<impl Data<Elem = f64>, Ix2>) -> Array2<f64> {
        (y - &self.mean) / &self.std
    }

    /// Undo scaling: `y * std + mean`
    pub fn inverse_transform(&self, y: &ArrayBase<impl Data<Elem = f64>, Ix2>) -> Array2<f64> {
        let mut res = y.to_owned();
        Zip::from(res.columns_mut())
            .and(&self.mean)
            .and(&self.std)
            .for_each(|mut col, &m, &s| col.mapv_inplace(|v| v * s + m));
        res
    }
}

fn column_name(names: &[String], j: usize) -> String {
    names.get(j).cloned().unwrap_or_else(|| format!("#{j}"))
}

/// Min-max scale training and test inputs with training statistics
pub fn scale_inputs(
    x_train: &Array2<f64>,
    x_test: &Array2<f64>,
    names: &[String],
) -> Result<(Array2<f64>, Array2<f64>, MinMaxScaler)> {
    let scaler = MinMaxScaler::fit(x_train, names)?;
    Ok((scaler.transform(x_train), scaler.transform(x_test), scaler))
}

/// Standardize training outputs with their own statistics
pub fn scale_outputs(
    y_train: &Array2<f64>,
    names: &[String],
) -> Result<(Array2<f64>, StandardScaler)> {
    let scaler = StandardScaler::fit(y_train, names)?;
    Ok((scaler.transform(y_train), scaler))
}
