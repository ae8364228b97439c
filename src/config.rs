//! Benchmark run configuration.
use crate::errors::{BenchError, Result};

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default number of rows used for training
pub const DEFAULT_N_TRAINING: usize = 30;
/// Default number of GP hyperparameters optimization restarts
pub const DEFAULT_N_START: usize = 100;
/// Default max number of likelihood evaluations per optimization
pub const DEFAULT_MAX_EVAL: usize = 10_000;
/// Default number of anchor points used to draw a posterior function sample
pub const DEFAULT_N_SPECTRAL_POINTS: usize = 1000;
/// Default number of repeated trials
pub const DEFAULT_N_TRIALS: usize = 10;

/// Surrogate benchmark configuration
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
#[serde(default)]
pub struct BenchConfig {
    /// Headerless csv file of decision variables (one row per experiment)
    pub(crate) x_file: PathBuf,
    /// Headerless csv file of objectives (row i matches row i of `x_file`)
    pub(crate) y_file: PathBuf,
    /// Expected number of input columns
    pub(crate) n_inputs: usize,
    /// Expected number of output columns
    pub(crate) n_outputs: usize,
    /// Number of leading rows used for training, remaining rows are used for testing
    pub(crate) n_training: usize,
    /// Number of restarts of GP hyperparameters optimization
    pub(crate) n_start: usize,
    /// Max number of likelihood evaluations during one optimization
    pub(crate) max_eval: usize,
    /// Number of points used to build the posterior function sample
    pub(crate) n_spectral_points: usize,
    /// Whether posterior function sampling is evaluated
    pub(crate) spectral_sample: bool,
    /// Whether parity data is written (single trial mode)
    pub(crate) plot: bool,
    /// Number of repeated trials
    pub(crate) n_trials: usize,
    /// Whether hyperparameters optimization restarts run in parallel
    pub(crate) parallel: bool,
    /// Random seed used by posterior sampling
    pub(crate) seed: Option<u64>,
    /// Directory where artifacts are written
    pub(crate) outdir: PathBuf,
}

impl Default for BenchConfig {
    fn default() -> Self {
        BenchConfig {
            x_file: PathBuf::from("data/matlab/experiment_1/X.csv"),
            y_file: PathBuf::from("data/matlab/experiment_1/Y.csv"),
            n_inputs: 6,
            n_outputs: 2,
            n_training: DEFAULT_N_TRAINING,
            n_start: DEFAULT_N_START,
            max_eval: DEFAULT_MAX_EVAL,
            n_spectral_points: DEFAULT_N_SPECTRAL_POINTS,
            spectral_sample: true,
            plot: false,
            n_trials: DEFAULT_N_TRIALS,
            parallel: true,
            seed: None,
            outdir: PathBuf::from("."),
        }
    }
}

impl BenchConfig {
    /// Load a configuration from a json file, missing fields get default values
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        let config = serde_json::from_reader(std::io::BufReader::new(file))?;
        Ok(config)
    }

    /// Sets the input and output csv files
    pub fn data_files(mut self, x_file: impl Into<PathBuf>, y_file: impl Into<PathBuf>) -> Self {
        self.x_file = x_file.into();
        self.y_file = y_file.into();
        self
    }

    /// Sets the expected (inputs, outputs) column layout
    pub fn layout(mut self, n_inputs: usize, n_outputs: usize) -> Self {
        self.n_inputs = n_inputs;
        self.n_outputs = n_outputs;
        self
    }

    /// Sets the number of leading rows used for training
    pub fn n_training(mut self, n_training: usize) -> Self {
        self.n_training = n_training;
        self
    }

    /// Sets the number of hyperparameters optimization restarts
    pub fn n_start(mut self, n_start: usize) -> Self {
        self.n_start = n_start;
        self
    }

    /// Sets the max number of likelihood evaluations per optimization
    pub fn max_eval(mut self, max_eval: usize) -> Self {
        self.max_eval = max_eval;
        self
    }

    /// Sets the number of points used to draw posterior function samples
    pub fn n_spectral_points(mut self, n_spectral_points: usize) -> Self {
        self.n_spectral_points = n_spectral_points;
        self
    }

    /// Activates or not posterior function sampling evaluation
    pub fn spectral_sample(mut self, spectral_sample: bool) -> Self {
        self.spectral_sample = spectral_sample;
        self
    }

    /// Activates or not parity data export
    pub fn plot(mut self, plot: bool) -> Self {
        self.plot = plot;
        self
    }

    /// Sets the number of repeated trials
    pub fn n_trials(mut self, n_trials: usize) -> Self {
        self.n_trials = n_trials;
        self
    }

    /// Activates or not parallel optimization restarts
    pub fn parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Sets a random seed for reproducible posterior sampling
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Sets the directory where artifacts are written
    pub fn outdir(mut self, outdir: impl Into<PathBuf>) -> Self {
        self.outdir = outdir.into();
        self
    }

    /// Input csv file
    pub fn x_file(&self) -> &Path {
        &self.x_file
    }

    /// Output csv file
    pub fn y_file(&self) -> &Path {
        &self.y_file
    }

    /// Expected (inputs, outputs) column layout
    pub fn get_layout(&self) -> (usize, usize) {
        (self.n_inputs, self.n_outputs)
    }

    /// Random seed of posterior sampling if any
    pub fn get_seed(&self) -> Option<u64> {
        self.seed
    }

    /// Whether parity data is written
    pub fn is_plot(&self) -> bool {
        self.plot
    }

    /// Number of repeated trials
    pub fn get_n_trials(&self) -> usize {
        self.n_trials
    }

    /// Artifacts directory
    pub fn get_outdir(&self) -> &Path {
        &self.outdir
    }

    /// Whether posterior function sampling is evaluated
    pub fn is_spectral_sample(&self) -> bool {
        self.spectral_sample
    }

    /// Check configuration consistency before running any trial
    pub fn check(self) -> Result<Self> {
        if self.n_inputs == 0 || self.n_outputs == 0 {
            return Err(BenchError::InvalidConfigError(format!(
                "data layout should have at least one input and one output, got ({}, {})",
                self.n_inputs, self.n_outputs
            )));
        }
        if self.n_training == 0 {
            return Err(BenchError::InvalidConfigError(
                "n_training should be positive".to_string(),
            ));
        }
        if self.n_start == 0 {
            return Err(BenchError::InvalidConfigError(
                "n_start should be positive".to_string(),
            ));
        }
        if self.n_trials == 0 {
            return Err(BenchError::InvalidConfigError(
                "n_trials should be positive".to_string(),
            ));
        }
        if self.spectral_sample && self.n_spectral_points == 0 {
            return Err(BenchError::InvalidConfigError(
                "n_spectral_points should be positive when spectral sampling is on".to_string(),
            ));
        }
        Ok(self)
    }
}
