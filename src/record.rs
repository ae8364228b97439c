//! Trial result records and their aggregation over repeated trials.
use crate::errors::{BenchError, Result};

use log::info;
use ndarray::{Array1, Array2, Axis};
use ndarray_stats::{Quantile1dExt, QuantileExt, interpolate::Linear};
use noisy_float::types::n64;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// RMSE values computed with sampled posterior functions, one value per output
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SpectralRmse {
    /// RMSE on training data
    pub train: Vec<f64>,
    /// RMSE on test data
    pub test: Vec<f64>,
}

/// Metrics of one trial, every vector holds one value per output
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RunRecord {
    /// RMSE of mean predictions on training data
    pub rmse_train: Vec<f64>,
    /// RMSE of mean predictions on test data
    pub rmse_test: Vec<f64>,
    /// RMSE of sampled predictions, only when posterior sampling is enabled
    pub spectral: Option<SpectralRmse>,
    /// Final training objective of each output model
    pub objectives: Vec<f64>,
}

/// Column suffix of an output name: `y_0` gives `y0`
pub fn column_suffix(name: &str) -> String {
    name.replace('_', "")
}

impl RunRecord {
    fn check(&self, n_outputs: usize) -> Result<()> {
        let mut lens = vec![
            self.rmse_train.len(),
            self.rmse_test.len(),
            self.objectives.len(),
        ];
        if let Some(spectral) = &self.spectral {
            lens.push(spectral.train.len());
            lens.push(spectral.test.len());
        }
        if lens.iter().any(|l| *l != n_outputs) {
            return Err(BenchError::InvalidData(format!(
                "record metrics sizes {lens:?} do not match {n_outputs} outputs"
            )));
        }
        Ok(())
    }

    /// Metric column names for given output names
    pub fn columns(output_names: &[String], spectral: bool) -> Vec<String> {
        let mut groups = vec!["rmse_train", "rmse_test"];
        if spectral {
            groups.extend(["rmse_train_spectral", "rmse_test_spectral"]);
        }
        groups.push("objective");
        groups
            .iter()
            .flat_map(|g| {
                output_names
                    .iter()
                    .map(move |name| format!("{g}_{}", column_suffix(name)))
            })
            .collect()
    }

    /// Metric values in the order of [RunRecord::columns]
    pub fn values(&self) -> Vec<f64> {
        let mut values = Vec::new();
        values.extend(&self.rmse_train);
        values.extend(&self.rmse_test);
        if let Some(spectral) = &self.spectral {
            values.extend(&spectral.train);
            values.extend(&spectral.test);
        }
        values.extend(&self.objectives);
        values
    }
}

/// Box plot statistics of one metric column
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BoxStats {
    /// Metric column name
    pub column: String,
    /// Number of values
    pub count: usize,
    /// Mean value
    pub mean: f64,
    /// Minimum value
    pub min: f64,
    /// First quartile
    pub q1: f64,
    /// Median
    pub median: f64,
    /// Third quartile
    pub q3: f64,
    /// Maximum value
    pub max: f64,
}

impl BoxStats {
    /// Compute statistics of a non empty set of values
    pub fn new(column: impl Into<String>, values: &Array1<f64>) -> Result<Self> {
        let column = column.into();
        let min = *values
            .min()
            .map_err(|e| BenchError::InvalidData(format!("{column}: {e}")))?;
        let max = *values
            .max()
            .map_err(|e| BenchError::InvalidData(format!("{column}: {e}")))?;
        if values.iter().any(|v| v.is_nan()) {
            return Err(BenchError::InvalidData(format!("{column}: NaN value")));
        }
        let mut data = values.mapv(n64);
        let mut quantile = |q: f64| -> Result<f64> {
            data.quantile_mut(n64(q), &Linear)
                .map(|v| v.raw())
                .map_err(|e| BenchError::InvalidData(format!("{column}: {e}")))
        };
        let (q1, median, q3) = (quantile(0.25)?, quantile(0.5)?, quantile(0.75)?);
        Ok(BoxStats {
            count: values.len(),
            mean: values.mean().unwrap_or(f64::NAN),
            min,
            q1,
            median,
            q3,
            max,
            column,
        })
    }
}

/// Results of repeated trials, one record per trial
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ResultTable {
    output_names: Vec<String>,
    spectral: bool,
    records: Vec<RunRecord>,
}

impl ResultTable {
    /// Empty table for given outputs, `spectral` tells whether sampled metrics are expected
    pub fn new(output_names: &[String], spectral: bool) -> Self {
        ResultTable {
            output_names: output_names.to_vec(),
            spectral,
            records: Vec::new(),
        }
    }

    /// Append a trial record
    pub fn push(&mut self, record: RunRecord) -> Result<()> {
        record.check(self.output_names.len())?;
        if record.spectral.is_some() != self.spectral {
            return Err(BenchError::InvalidData(format!(
                "record spectral metrics presence ({}) differs from table ({})",
                record.spectral.is_some(),
                self.spectral
            )));
        }
        self.records.push(record);
        Ok(())
    }

    /// Trial records
    pub fn records(&self) -> &[RunRecord] {
        &self.records
    }

    /// Number of trials
    pub fn nrows(&self) -> usize {
        self.records.len()
    }

    /// Metric column names
    pub fn columns(&self) -> Vec<String> {
        RunRecord::columns(&self.output_names, self.spectral)
    }

    /// Metrics as a (n_trials, n_columns) matrix
    pub fn to_array(&self) -> Array2<f64> {
        let ncols = self.columns().len();
        let mut data = Array2::zeros((self.records.len(), ncols));
        for (mut row, record) in data.axis_iter_mut(Axis(0)).zip(&self.records) {
            row.assign(&Array1::from(record.values()));
        }
        data
    }

    /// Box plot statistics of every metric column
    pub fn summary(&self) -> Result<Vec<BoxStats>> {
        let data = self.to_array();
        self.columns()
            .into_iter()
            .zip(data.columns())
            .map(|(name, col)| BoxStats::new(name, &col.to_owned()))
            .collect()
    }

    /// Write one csv row per trial: trial index followed by metric columns
    pub fn to_csv<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let mut writer = csv::Writer::from_path(path.as_ref())?;
        let mut header = vec!["trial".to_string()];
        header.extend(self.columns());
        writer.write_record(&header)?;
        for (i, record) in self.records.iter().enumerate() {
            let mut row = vec![i.to_string()];
            row.extend(record.values().iter().map(|v| v.to_string()));
            writer.write_record(&row)?;
        }
        writer.flush()?;
        info!("Results saved in {}", path.as_ref().display());
        Ok(())
    }

    /// Write box plot statistics as csv, one row per metric column
    pub fn write_summary<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let mut writer = csv::Writer::from_path(path.as_ref())?;
        for stats in self.summary()? {
            writer.serialize(stats)?;
        }
        writer.flush()?;
        info!("Summary saved in {}", path.as_ref().display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    fn names() -> Vec<String> {
        vec!["y_0".to_string(), "y_1".to_string()]
    }

    fn record(k: f64, spectral: bool) -> RunRecord {
        RunRecord {
            rmse_train: vec![k, k + 1.],
            rmse_test: vec![k + 2., k + 3.],
            spectral: spectral.then(|| SpectralRmse {
                train: vec![k + 4., k + 5.],
                test: vec![k + 6., k + 7.],
            }),
            objectives: vec![-k, -k - 1.],
        }
    }

    #[test]
    fn test_columns() {
        assert_eq!(
            RunRecord::columns(&names(), true),
            vec![
                "rmse_train_y0",
                "rmse_train_y1",
                "rmse_test_y0",
                "rmse_test_y1",
                "rmse_train_spectral_y0",
                "rmse_train_spectral_y1",
                "rmse_test_spectral_y0",
                "rmse_test_spectral_y1",
                "objective_y0",
                "objective_y1",
            ]
        );
        let columns = RunRecord::columns(&names(), false);
        assert_eq!(columns.len(), 6);
        assert!(columns.iter().all(|c| !c.contains("spectral")));
    }

    #[test]
    fn test_values_follow_columns() {
        let r = record(0., true);
        assert_eq!(
            r.values(),
            vec![0., 1., 2., 3., 4., 5., 6., 7., -0., -1.]
        );
        assert_eq!(record(0., false).values(), vec![0., 1., 2., 3., -0., -1.]);
    }

    #[test]
    fn test_table_has_one_row_per_trial() {
        for k in [1, 3, 10] {
            for spectral in [true, false] {
                let mut table = ResultTable::new(&names(), spectral);
                for i in 0..k {
                    table.push(record(i as f64, spectral)).unwrap();
                }
                assert_eq!(table.nrows(), k);
                let data = table.to_array();
                assert_eq!(data.nrows(), k);
                assert_eq!(data.ncols(), table.columns().len());
            }
        }
    }

    #[test]
    fn test_push_rejects_inconsistent_records() {
        let mut table = ResultTable::new(&names(), false);
        assert!(table.push(record(0., true)).is_err());
        let mut short = record(0., false);
        short.rmse_test.pop();
        assert!(table.push(short).is_err());
        assert_eq!(table.nrows(), 0);
    }

    #[test]
    fn test_box_stats() {
        let stats = BoxStats::new("m", &array![4., 1., 3., 2., 5.]).unwrap();
        assert_eq!(stats.count, 5);
        assert_abs_diff_eq!(stats.mean, 3.);
        assert_abs_diff_eq!(stats.min, 1.);
        assert_abs_diff_eq!(stats.q1, 2.);
        assert_abs_diff_eq!(stats.median, 3.);
        assert_abs_diff_eq!(stats.q3, 4.);
        assert_abs_diff_eq!(stats.max, 5.);

        let stats = BoxStats::new("m", &array![1., 2., 3., 4.]).unwrap();
        assert_abs_diff_eq!(stats.q1, 1.75);
        assert_abs_diff_eq!(stats.median, 2.5);
        assert!(BoxStats::new("m", &Array1::zeros(0)).is_err());
        assert!(BoxStats::new("m", &array![f64::NAN]).is_err());
        assert!(BoxStats::new("m", &array![1., f64::NAN, 2.]).is_err());

        let stats = BoxStats::new("m", &array![7.]).unwrap();
        assert_abs_diff_eq!(stats.q1, 7.);
        assert_abs_diff_eq!(stats.q3, 7.);
    }

    #[test]
    fn test_csv_outputs() {
        let outdir = "target/tests/record";
        std::fs::create_dir_all(outdir).unwrap();
        let mut table = ResultTable::new(&names(), false);
        table.push(record(0., false)).unwrap();
        table.push(record(1., false)).unwrap();

        let path = format!("{outdir}/results.csv");
        table.to_csv(&path).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(
            lines[0],
            "trial,rmse_train_y0,rmse_train_y1,rmse_test_y0,rmse_test_y1,objective_y0,objective_y1"
        );
        assert!(lines[2].starts_with("1,1,2,3,4"));

        let path = format!("{outdir}/summary.csv");
        table.write_summary(&path).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines[0], "column,count,mean,min,q1,median,q3,max");
        assert_eq!(lines.len(), 7);
        assert!(lines[1].starts_with("rmse_train_y0,2,0.5,0"));
    }
}
