//! Loading of the experimental observations and train/test partitioning.
use crate::errors::{BenchError, Result};

use csv::ReaderBuilder;
use log::info;
use ndarray::{Array2, s};
use std::fs::File;
use std::path::Path;

/// Experimental observations: one row per trial, named input and output columns
#[derive(Clone, Debug, PartialEq)]
pub struct Observations {
    /// Decision variables (n, nx)
    pub x: Array2<f64>,
    /// Objectives (n, ny)
    pub y: Array2<f64>,
    /// Input column names `x_0, ..., x_{nx-1}`
    pub input_names: Vec<String>,
    /// Output column names `y_0, ..., y_{ny-1}`
    pub output_names: Vec<String>,
}

/// Row aligned train/test partition of [Observations]
#[derive(Clone, Debug)]
pub struct Split {
    /// Training inputs (leading rows)
    pub x_train: Array2<f64>,
    /// Test inputs (remaining rows)
    pub x_test: Array2<f64>,
    /// Training outputs
    pub y_train: Array2<f64>,
    /// Test outputs
    pub y_test: Array2<f64>,
}

/// Default column names with given prefix: `{prefix}_0, {prefix}_1, ...`
pub fn column_names(prefix: &str, n: usize) -> Vec<String> {
    (0..n).map(|i| format!("{prefix}_{i}")).collect()
}

/// Read a headerless comma separated file of floats with exactly `ncols` columns
pub fn read_csv_matrix<P: AsRef<Path>>(path: P, ncols: usize) -> Result<Array2<f64>> {
    let path = path.as_ref();
    let file = File::open(path)?;
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .delimiter(b',')
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(file);

    let mut values = Vec::new();
    let mut nrows = 0;
    for (i, record) in reader.records().enumerate() {
        let record = record?;
        if record.len() != ncols {
            return Err(BenchError::InvalidData(format!(
                "{}: row {} has {} columns, expected {}",
                path.display(),
                i,
                record.len(),
                ncols
            )));
        }
        for field in record.iter() {
            let v = field.parse::<f64>().map_err(|_| {
                BenchError::InvalidData(format!(
                    "{}: row {}: '{}' is not a number",
                    path.display(),
                    i,
                    field
                ))
            })?;
            values.push(v);
        }
        nrows += 1;
    }
    Array2::from_shape_vec((nrows, ncols), values)
        .map_err(|e| BenchError::InvalidData(format!("{}: {}", path.display(), e)))
}

impl Observations {
    /// Build observations from input and output matrices having the same number of rows
    pub fn new(x: Array2<f64>, y: Array2<f64>) -> Result<Self> {
        if x.nrows() != y.nrows() {
            return Err(BenchError::InvalidData(format!(
                "inputs have {} rows while outputs have {} rows",
                x.nrows(),
                y.nrows()
            )));
        }
        let input_names = column_names("x", x.ncols());
        let output_names = column_names("y", y.ncols());
        Ok(Observations {
            x,
            y,
            input_names,
            output_names,
        })
    }

    /// Read observations from two headerless csv files with the given (inputs, outputs) layout
    pub fn from_csv_files<P: AsRef<Path>>(
        x_path: P,
        y_path: P,
        n_inputs: usize,
        n_outputs: usize,
    ) -> Result<Self> {
        let x = read_csv_matrix(&x_path, n_inputs)?;
        let y = read_csv_matrix(&y_path, n_outputs)?;
        Self::new(x, y)
    }

    /// Number of experiments
    pub fn nrows(&self) -> usize {
        self.x.nrows()
    }

    /// Split rows in a training prefix of `n_training` rows and a test suffix
    pub fn split(&self, n_training: usize) -> Result<Split> {
        let n = self.nrows();
        if n_training == 0 || n_training >= n {
            return Err(BenchError::InvalidConfigError(format!(
                "training size should be in [1, {}[, got {}",
                n, n_training
            )));
        }
        let split = Split {
            x_train: self.x.slice(s![..n_training, ..]).to_owned(),
            x_test: self.x.slice(s![n_training.., ..]).to_owned(),
            y_train: self.y.slice(s![..n_training, ..]).to_owned(),
            y_test: self.y.slice(s![n_training.., ..]).to_owned(),
        };
        info!("Number of training data: {}", split.x_train.nrows());
        info!("Number of test data: {}", split.x_test.nrows());
        Ok(split)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{Array, Axis, array, concatenate};
    use std::io::Write;

    fn observations(n: usize) -> Observations {
        let x = Array::linspace(0., (3 * n - 1) as f64, 3 * n)
            .into_shape((n, 3))
            .unwrap();
        let y = Array::linspace(0., (2 * n - 1) as f64, 2 * n)
            .into_shape((n, 2))
            .unwrap();
        Observations::new(x, y).unwrap()
    }

    #[test]
    fn test_split_preserves_rows_and_order() {
        let obs = observations(10);
        for n_training in 1..10 {
            let split = obs.split(n_training).unwrap();
            assert_eq!(split.x_train.nrows(), n_training);
            assert_eq!(split.x_train.nrows() + split.x_test.nrows(), 10);
            assert_eq!(split.y_train.nrows() + split.y_test.nrows(), 10);
            let x = concatenate![Axis(0), split.x_train, split.x_test];
            let y = concatenate![Axis(0), split.y_train, split.y_test];
            assert_eq!(x, obs.x);
            assert_eq!(y, obs.y);
        }
    }

    #[test]
    fn test_split_out_of_range() {
        let obs = observations(5);
        assert!(obs.split(0).is_err());
        assert!(obs.split(5).is_err());
        assert!(obs.split(12).is_err());
    }

    #[test]
    fn test_mismatched_rows() {
        let x = array![[1., 2.], [3., 4.]];
        let y = array![[1.]];
        assert!(matches!(
            Observations::new(x, y),
            Err(BenchError::InvalidData(_))
        ));
    }

    #[test]
    fn test_column_names() {
        let obs = observations(3);
        assert_eq!(obs.input_names, vec!["x_0", "x_1", "x_2"]);
        assert_eq!(obs.output_names, vec!["y_0", "y_1"]);
    }

    #[test]
    fn test_read_csv_files() {
        let outdir = "target/tests/dataset";
        std::fs::create_dir_all(outdir).unwrap();
        let xpath = format!("{outdir}/X.csv");
        let ypath = format!("{outdir}/Y.csv");
        let mut f = File::create(&xpath).unwrap();
        writeln!(f, "0.1,0.2,0.3\n1.5, 2.5, 3.5\n-1,0,1e-2").unwrap();
        let mut f = File::create(&ypath).unwrap();
        writeln!(f, "1,2\n3,4\n5,6").unwrap();

        let obs = Observations::from_csv_files(&xpath, &ypath, 3, 2).unwrap();
        assert_eq!(obs.nrows(), 3);
        assert_eq!(obs.x, array![[0.1, 0.2, 0.3], [1.5, 2.5, 3.5], [-1., 0., 1e-2]]);
        assert_eq!(obs.y, array![[1., 2.], [3., 4.], [5., 6.]]);

        assert!(matches!(
            Observations::from_csv_files(&xpath, &ypath, 4, 2),
            Err(BenchError::InvalidData(_))
        ));
    }

    #[test]
    fn test_read_csv_ragged_row() {
        let outdir = "target/tests/dataset_ragged";
        std::fs::create_dir_all(outdir).unwrap();
        let path = format!("{outdir}/X.csv");
        let mut f = File::create(&path).unwrap();
        writeln!(f, "1,2\n3,4,5\n6,7").unwrap();
        match read_csv_matrix(&path, 2) {
            Err(BenchError::InvalidData(msg)) => {
                assert!(msg.contains("row 1 has 3 columns, expected 2"), "{msg}")
            }
            res => panic!("expected invalid data error, got {res:?}"),
        }
    }

    #[test]
    fn test_read_csv_bad_value() {
        let outdir = "target/tests/dataset_bad";
        std::fs::create_dir_all(outdir).unwrap();
        let path = format!("{outdir}/X.csv");
        let mut f = File::create(&path).unwrap();
        writeln!(f, "0.1,abc").unwrap();
        assert!(matches!(
            read_csv_matrix(&path, 2),
            Err(BenchError::InvalidData(_))
        ));
    }
}
