//! Prediction quality metrics.
use crate::errors::{BenchError, Result};

use ndarray::{Array1, ArrayBase, Axis, Data, Ix2};

/// Root mean squared error computed independently for each column of (n, ny) matrices.
/// Returns a (ny,) vector.
pub fn rmse(
    pred: &ArrayBase<impl Data<Elem = f64>, Ix2>,
    actual: &ArrayBase<impl Data<Elem = f64>, Ix2>,
) -> Result<Array1<f64>> {
    if pred.dim() != actual.dim() {
        return Err(BenchError::InvalidData(format!(
            "predictions shape {:?} differs from actual values shape {:?}",
            pred.dim(),
            actual.dim()
        )));
    }
    let mse = (pred - actual)
        .mapv(|v| v * v)
        .mean_axis(Axis(0))
        .ok_or_else(|| BenchError::InvalidData("cannot compute rmse without data".to_string()))?;
    Ok(mse.mapv(f64::sqrt))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::{Array2, array};

    #[test]
    fn test_rmse_hand_computed() {
        let actual = array![[1.], [2.], [3.]];
        let pred = array![[1.], [2.], [4.]];
        assert_abs_diff_eq!(
            rmse(&pred, &actual).unwrap(),
            array![(1. / 3f64).sqrt()],
            epsilon = 1e-12
        );
        assert_abs_diff_eq!(rmse(&pred, &actual).unwrap()[0], 0.577, epsilon = 1e-3);
    }

    #[test]
    fn test_rmse_per_column() {
        let actual = array![[1., 0.], [2., 0.], [3., 0.]];
        let pred = array![[1., 2.], [2., -2.], [4., 2.]];
        let res = rmse(&pred, &actual).unwrap();
        assert_abs_diff_eq!(res, array![(1. / 3f64).sqrt(), 2.], epsilon = 1e-12);
    }

    #[test]
    fn test_rmse_exact_is_zero() {
        let y = array![[0.3, -1.], [2.5, 4.], [7., 0.]];
        assert_eq!(rmse(&y, &y).unwrap(), array![0., 0.]);
        assert!(rmse(&y, &(&y * 3.)).unwrap().iter().all(|v| *v >= 0.));
    }

    #[test]
    fn test_rmse_errors() {
        let y = array![[0.3, -1.], [2.5, 4.]];
        assert!(rmse(&y, &array![[1.]]).is_err());
        let empty = Array2::<f64>::zeros((0, 2));
        assert!(rmse(&empty, &empty).is_err());
    }
}
