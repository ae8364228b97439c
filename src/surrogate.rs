//! Surrogate model abstractions.
//!
//! GP training and posterior sampling are provided by a backend through
//! [SurrogateFitter] and [SpectralSampler]. The benchmark pipeline only relies on
//! these traits so it can be exercised without any real GP training.
use crate::errors::{BenchError, Result};

use log::info;
use ndarray::{Array1, Array2, ArrayView1, ArrayView2, Axis};

/// Options forwarded to the surrogate fitter
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FitOptions {
    /// Number of hyperparameters optimization restarts
    pub n_start: usize,
    /// Max number of likelihood evaluations during one optimization
    pub max_eval: usize,
    /// Whether optimization restarts may run in parallel
    pub parallel: bool,
}

/// Hyperparameters of a fitted GP
#[derive(Clone, Debug, PartialEq)]
pub struct Hyperparameters {
    /// Kernel length scales, one per input dimension
    pub lengthscales: Array1<f64>,
    /// Signal variance
    pub variance: f64,
    /// Noise variance in scaled output units
    pub noise: f64,
}

/// A deterministic function drawn from a surrogate posterior
pub trait SampledFunction: Send + Sync {
    /// Evaluate the sampled function at n points given as a (n, nx) matrix
    fn predict(&self, x: &ArrayView2<f64>) -> Result<Array1<f64>>;
}

/// A trait to draw a posterior function sample from a fitted surrogate
pub trait SpectralSampler: Send + Sync {
    /// Draw a function sample of `model` trained on (`xt`, `yt`) using `n_points` spectral points
    fn sample(
        &self,
        model: &dyn FittedSurrogate,
        xt: &ArrayView2<f64>,
        yt: &ArrayView1<f64>,
        n_points: usize,
    ) -> Result<Box<dyn SampledFunction>>;
}

/// A single output surrogate trained on scaled data
pub trait FittedSurrogate: Send + Sync {
    /// Predict mean values at n points given as a (n, nx) matrix
    fn predict(&self, x: &ArrayView2<f64>) -> Result<Array1<f64>>;

    /// Predict values at n points using the posterior function sample
    fn predict_sampled(&self, x: &ArrayView2<f64>) -> Result<Array1<f64>>;

    /// Draw and keep a posterior function sample used by [FittedSurrogate::predict_sampled]
    fn spectral_sample(
        &mut self,
        sampler: &dyn SpectralSampler,
        xt: &ArrayView2<f64>,
        yt: &ArrayView1<f64>,
        n_points: usize,
    ) -> Result<()>;

    /// Retrieve optimized hyperparameters
    fn hyperparameters(&self) -> Hyperparameters;

    /// Final value of the training objective (lower is better)
    fn objective(&self) -> f64;

    /// Retrieve the correlation parameters, one per input dimension, of an absolute
    /// exponential kernel `exp(-sum_k theta_k |dx_k| / std_k)` where `std_k` is the sample
    /// standard deviation of the k-th training input column.
    ///
    /// Samplers such as [crate::sampling::TrajectorySampler] rely on this convention to
    /// rebuild the kernel, a surrogate using another kernel family cannot be sampled by them.
    fn theta(&self) -> Array1<f64>;

    /// Draw `n_traj` joint posterior trajectories at n points given as a (n, nx) matrix.
    /// Returns a (n, n_traj) matrix, trajectories are in the model output units.
    fn sample_trajectories(&self, x: &ArrayView2<f64>, n_traj: usize) -> Result<Array2<f64>>;
}

/// A trait to fit a single output surrogate
pub trait SurrogateFitter: Send + Sync {
    /// Fit a surrogate on (n, nx) inputs `x` and (n,) outputs `y`
    fn fit(
        &self,
        x: &ArrayView2<f64>,
        y: &ArrayView1<f64>,
        options: &FitOptions,
    ) -> Result<Box<dyn FittedSurrogate>>;
}

/// Storage for a sampled function kept by a surrogate until it is replaced
#[derive(Default)]
pub struct SampleSlot(Option<Box<dyn SampledFunction>>);

impl SampleSlot {
    /// Replace the kept function sample
    pub fn set(&mut self, sample: Box<dyn SampledFunction>) {
        self.0 = Some(sample);
    }

    /// Evaluate the kept function sample
    pub fn predict(&self, x: &ArrayView2<f64>) -> Result<Array1<f64>> {
        match &self.0 {
            Some(f) => f.predict(x),
            None => Err(BenchError::NotSampled(
                "spectral_sample should be called before sampled predictions".to_string(),
            )),
        }
    }
}

/// A group of independent surrogates, one per output
pub struct ModelGroup {
    names: Vec<String>,
    models: Vec<Box<dyn FittedSurrogate>>,
}

impl ModelGroup {
    /// Fit one surrogate per column of `y` (n, ny), outputs are never coupled
    pub fn fit(
        fitter: &dyn SurrogateFitter,
        x: &ArrayView2<f64>,
        y: &ArrayView2<f64>,
        names: &[String],
        options: &FitOptions,
    ) -> Result<Self> {
        if names.len() != y.ncols() {
            return Err(BenchError::InvalidData(format!(
                "{} output names given for {} outputs",
                names.len(),
                y.ncols()
            )));
        }
        info!(
            "Fitting models (number of optimization restarts={})",
            options.n_start
        );
        let models = y
            .columns()
            .into_iter()
            .map(|yc| fitter.fit(x, &yc, options))
            .collect::<Result<Vec<_>>>()?;
        Ok(ModelGroup {
            names: names.to_vec(),
            models,
        })
    }

    /// Output names
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Iterate over (name, model) pairs
    pub fn iter(&self) -> impl Iterator<Item = (&String, &dyn FittedSurrogate)> {
        self.names
            .iter()
            .zip(self.models.iter().map(|m| m.as_ref()))
    }

    /// Predict all outputs at n points given as a (n, nx) matrix, returns a (n, ny) matrix
    pub fn predict(&self, x: &ArrayView2<f64>, use_spectral_sample: bool) -> Result<Array2<f64>> {
        let mut pred = Array2::zeros((x.nrows(), self.models.len()));
        for (mut col, model) in pred.axis_iter_mut(Axis(1)).zip(self.models.iter()) {
            let p = if use_spectral_sample {
                model.predict_sampled(x)?
            } else {
                model.predict(x)?
            };
            col.assign(&p);
        }
        Ok(pred)
    }

    /// Draw a posterior function sample for each output
    pub fn spectral_sample(
        &mut self,
        sampler: &dyn SpectralSampler,
        xt: &ArrayView2<f64>,
        yt: &ArrayView2<f64>,
        n_points: usize,
    ) -> Result<()> {
        info!("Spectral sampling with {n_points} spectral points.");
        for (model, yc) in self.models.iter_mut().zip(yt.columns()) {
            model.spectral_sample(sampler, xt, &yc, n_points)?;
        }
        Ok(())
    }

    /// Final training objective of each output model
    pub fn objectives(&self) -> Vec<f64> {
        self.models.iter().map(|m| m.objective()).collect()
    }
}
