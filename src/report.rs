//! Benchmark artifacts: dated result tables, box plot statistics and parity data.
//!
//! Plots are not rendered here: box plot statistics are saved as csv and parity data
//! (actual vs predicted values) as numpy arrays to be plotted with external tools.
use crate::config::BenchConfig;
use crate::errors::{BenchError, Result};
use crate::experiment::{Predictions, TrialOutcome};
use crate::record::ResultTable;

use chrono::NaiveDate;
use log::info;
use ndarray::{Array2, Axis, stack};
use ndarray_npy::write_npy;
use std::path::{Path, PathBuf};

/// Sampling mode label used in artifact names
fn mode(config: &BenchConfig) -> &'static str {
    if config.spectral_sample {
        "sampling"
    } else {
        "no_sampling"
    }
}

/// Date prefixed, parameter named artifact file names
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ArtifactNames {
    /// Per trial results csv
    pub results: PathBuf,
    /// Box plot statistics csv
    pub summary: PathBuf,
    /// Prefix of parity numpy files
    pub parity_prefix: PathBuf,
}

impl ArtifactNames {
    /// Artifact names in `config.outdir` for a run started at `date`
    pub fn new(config: &BenchConfig, date: NaiveDate) -> Self {
        let date = date.format("%Y-%m-%d");
        let outdir = &config.outdir;
        let restarts = config.n_start;
        let mode = mode(config);
        ArtifactNames {
            results: outdir.join(format!(
                "{date}_train_gp_{restarts}_restarts_{mode}.csv"
            )),
            summary: outdir.join(format!(
                "{date}_train_gp_boxplot_{restarts}_restarts_{mode}.csv"
            )),
            parity_prefix: outdir.join(format!("{date}_train_gp_parity")),
        }
    }

    /// Artifact names for a run started today (local time)
    pub fn today(config: &BenchConfig) -> Self {
        Self::new(config, chrono::Local::now().date_naive())
    }
}

/// Stack actual and predicted values of one output as a (n, 2) matrix
fn parity(actual: &Array2<f64>, predicted: &Array2<f64>, j: usize) -> Result<Array2<f64>> {
    stack(Axis(1), &[actual.column(j), predicted.column(j)])
        .map_err(|e| BenchError::InvalidData(e.to_string()))
}

fn write_predictions(
    prefix: &Path,
    names: &[String],
    outcome: &TrialOutcome,
    predictions: &Predictions,
    label: &str,
) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for (j, name) in names.iter().enumerate() {
        for (part, actual, predicted) in [
            ("train", &outcome.y_train, &predictions.train),
            ("test", &outcome.y_test, &predictions.test),
        ] {
            let file = PathBuf::from(format!(
                "{}_{name}_{part}{label}.npy",
                prefix.display()
            ));
            write_npy(&file, &parity(actual, predicted, j)?)?;
            files.push(file);
        }
    }
    Ok(files)
}

/// Write parity data of a trial: one (n, 2) array `[actual, predicted]` per output and
/// partition, plus the same arrays for sampled predictions when available.
pub fn write_parity(
    prefix: &Path,
    names: &[String],
    outcome: &TrialOutcome,
) -> Result<Vec<PathBuf>> {
    if let Some(dir) = prefix.parent() {
        std::fs::create_dir_all(dir)?;
    }
    let mut files = write_predictions(prefix, names, outcome, &outcome.mean, "")?;
    if let Some(sampled) = &outcome.sampled {
        files.extend(write_predictions(
            prefix, names, outcome, sampled, "_sampled",
        )?);
    }
    for f in files.iter() {
        info!("Parity data saved in {}", f.display());
    }
    Ok(files)
}

/// Write results table and box plot statistics
pub fn write_results(table: &ResultTable, names: &ArtifactNames) -> Result<()> {
    if let Some(dir) = names.results.parent() {
        std::fs::create_dir_all(dir)?;
    }
    table.to_csv(&names.results)?;
    table.write_summary(&names.summary)?;
    for stats in table.summary()? {
        info!(
            "{}: median={:.3} [q1={:.3}, q3={:.3}] min={:.3} max={:.3}",
            stats.column, stats.median, stats.q1, stats.q3, stats.min, stats.max
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::Observations;
    use crate::experiment::run_trials;
    use crate::gp::GpFitter;
    use crate::record::RunRecord;
    use crate::sampling::TrajectorySampler;
    use ndarray::{Array1, Axis, array};
    use ndarray_npy::read_npy;
    use serial_test::serial;

    #[test]
    fn test_artifact_names() {
        let date = NaiveDate::from_ymd_opt(2020, 7, 10).unwrap();
        let config = BenchConfig::default().outdir("out");
        let names = ArtifactNames::new(&config, date);
        assert_eq!(
            names.results,
            PathBuf::from("out/2020-07-10_train_gp_100_restarts_sampling.csv")
        );
        assert_eq!(
            names.summary,
            PathBuf::from("out/2020-07-10_train_gp_boxplot_100_restarts_sampling.csv")
        );
        let config = config.spectral_sample(false).n_start(5);
        let names = ArtifactNames::new(&config, date);
        assert_eq!(
            names.results,
            PathBuf::from("out/2020-07-10_train_gp_5_restarts_no_sampling.csv")
        );
    }

    fn outcome(sampled: bool) -> TrialOutcome {
        let mean = Predictions {
            train: array![[1., 10.], [2., 20.]],
            test: array![[3., 30.]],
        };
        TrialOutcome {
            record: RunRecord {
                rmse_train: vec![0., 0.],
                rmse_test: vec![0., 0.],
                spectral: None,
                objectives: vec![0., 0.],
            },
            y_train: array![[1.5, 11.], [2.5, 21.]],
            y_test: array![[3.5, 31.]],
            sampled: sampled.then(|| mean.clone()),
            mean,
        }
    }

    #[test]
    #[serial]
    fn test_write_parity() {
        let prefix = PathBuf::from("target/tests/report/parity");
        let names = vec!["y_0".to_string(), "y_1".to_string()];
        let files = write_parity(&prefix, &names, &outcome(false)).unwrap();
        assert_eq!(files.len(), 4);
        let data: Array2<f64> =
            read_npy("target/tests/report/parity_y_1_train.npy").unwrap();
        assert_eq!(data, array![[11., 10.], [21., 20.]]);

        let files = write_parity(&prefix, &names, &outcome(true)).unwrap();
        assert_eq!(files.len(), 8);
        let data: Array2<f64> =
            read_npy("target/tests/report/parity_y_0_test_sampled.npy").unwrap();
        assert_eq!(data, array![[3.5, 3.]]);
    }

    fn write_dataset(dir: &str) -> (String, String) {
        std::fs::create_dir_all(dir).unwrap();
        let x = Array2::from_shape_fn((12, 2), |(i, j)| {
            if j == 0 {
                i as f64 / 11.
            } else {
                ((7 * i) % 12) as f64 / 11.
            }
        });
        let y0: Array1<f64> = x.map_axis(Axis(1), |r| (3. * r[0]).sin() + r[1]);
        let y1: Array1<f64> = x.map_axis(Axis(1), |r| r[0] * r[1] + r[0]);
        let rows = |a: &Array2<f64>| {
            a.rows()
                .into_iter()
                .map(|r| r.iter().map(|v| v.to_string()).collect::<Vec<_>>().join(","))
                .collect::<Vec<_>>()
                .join("\n")
        };
        let y = ndarray::stack(Axis(1), &[y0.view(), y1.view()]).unwrap();
        let (xpath, ypath) = (format!("{dir}/X.csv"), format!("{dir}/Y.csv"));
        std::fs::write(&xpath, rows(&x)).unwrap();
        std::fs::write(&ypath, rows(&y)).unwrap();
        (xpath, ypath)
    }

    #[test]
    #[serial]
    fn test_benchmark_pipeline() {
        let dir = "target/tests/pipeline";
        let (xpath, ypath) = write_dataset(dir);
        let config = BenchConfig::default()
            .data_files(&xpath, &ypath)
            .layout(2, 2)
            .n_training(8)
            .n_start(2)
            .max_eval(200)
            .n_spectral_points(10)
            .n_trials(2)
            .seed(42)
            .plot(true)
            .outdir(dir)
            .check()
            .unwrap();
        let names = ArtifactNames::new(&config, NaiveDate::from_ymd_opt(2024, 1, 2).unwrap());
        let output_names = vec!["y_0".to_string(), "y_1".to_string()];
        let mut parity_files = 0;
        let table = run_trials(
            &config,
            || Observations::from_csv_files(&xpath, &ypath, 2, 2),
            &GpFitter::default(),
            &TrajectorySampler::default().seed(config.get_seed()),
            |_, outcome| {
                parity_files += write_parity(&names.parity_prefix, &output_names, outcome)?.len();
                Ok(())
            },
        )
        .unwrap();
        assert_eq!(table.nrows(), 2);
        assert_eq!(table.columns().len(), 10);
        assert_eq!(parity_files, 16);
        assert!(table.to_array().iter().all(|v| v.is_finite()));
        for record in table.records() {
            assert!(record.rmse_train.iter().all(|v| *v >= 0. && *v < 1e-2));
        }

        write_results(&table, &names).unwrap();
        let results = std::fs::read_to_string(&names.results).unwrap();
        assert_eq!(results.lines().count(), 3);
        let summary = std::fs::read_to_string(&names.summary).unwrap();
        assert_eq!(summary.lines().count(), 11);
    }
}
