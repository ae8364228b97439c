//! This library benchmarks [Gaussian Process](https://en.wikipedia.org/wiki/Gaussian_process)
//! surrogate models on tabular laboratory data.
//!
//! A benchmark trial splits observations into a training prefix and a test suffix, scales
//! inputs to the unit hypercube (training min-max) and standardizes outputs, then fits one
//! GP per output and computes per output RMSE on both partitions. Optionally a posterior
//! function sample is drawn for each output model and evaluated the same way.
//! Trials are repeated and their metrics aggregated as box plot statistics.
//!
//! The GP backend relies on [egobox_gp] through the [SurrogateFitter] trait, posterior
//! sampling goes through the [SpectralSampler] trait so both can be replaced.
//!
//! ```no_run
//! use gpbench::{BenchConfig, GpFitter, Observations, TrajectorySampler, run_trials};
//!
//! let config = BenchConfig::default().n_trials(3).n_start(10).check()?;
//! let load = || Observations::from_csv_files("X.csv", "Y.csv", 6, 2);
//! let table = run_trials(
//!     &config,
//!     load,
//!     &GpFitter::default(),
//!     &TrajectorySampler::default(),
//!     |_, _| Ok(()),
//! )?;
//! assert_eq!(table.nrows(), 3);
//! # Ok::<(), gpbench::BenchError>(())
//! ```
#![warn(missing_docs)]
#![warn(rustdoc::broken_intra_doc_links)]
pub mod config;
pub mod dataset;
mod errors;
pub mod experiment;
pub mod gp;
pub mod metrics;
pub mod record;
pub mod report;
pub mod sampling;
pub mod scaling;
pub mod surrogate;

pub use config::BenchConfig;
pub use dataset::{Observations, Split, column_names};
pub use errors::*;
pub use experiment::{Predictions, TrialOutcome, fit_and_test, run_trials};
pub use gp::{GpFitter, GpSurrogate};
pub use metrics::rmse;
pub use record::{BoxStats, ResultTable, RunRecord, SpectralRmse};
pub use report::{ArtifactNames, write_parity, write_results};
pub use sampling::TrajectorySampler;
pub use surrogate::{
    FitOptions, FittedSurrogate, Hyperparameters, ModelGroup, SampledFunction, SpectralSampler,
    SurrogateFitter,
};

/// Environment variable controlling the log level of the benchmark binary
pub const GPBENCH_LOG: &str = "GPBENCH_LOG";
