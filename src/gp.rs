//! Surrogate backend based on [egobox_gp] Gaussian processes.
//!
//! Each output is modeled by a GP with a constant mean and an absolute exponential
//! correlation kernel with one length scale per input dimension (ARD).
//! Hyperparameters are optimized by maximizing the reduced likelihood using a multistart
//! COBYLA optimization whose restarts run in parallel with `rayon`.
use crate::errors::Result;
use crate::surrogate::{
    FitOptions, FittedSurrogate, Hyperparameters, SampleSlot, SpectralSampler, SurrogateFitter,
};

use egobox_gp::correlation_models::AbsoluteExponentialCorr;
use egobox_gp::mean_models::ConstantMean;
use egobox_gp::{GaussianProcess, GpError};
use linfa::prelude::{Dataset, Fit};
use log::{debug, info};
use ndarray::{Array1, Array2, ArrayBase, ArrayView1, ArrayView2, Axis, Data, Ix2};

/// GP with constant mean and exponential ARD kernel
pub type ExponentialGp = GaussianProcess<f64, ConstantMean, AbsoluteExponentialCorr>;

/// Default nugget added to the correlation matrix diagonal
pub const DEFAULT_NUGGET: f64 = 100. * f64::EPSILON;

/// Standard deviation of input columns as used by GP input normalization
/// (sample standard deviation, zero values replaced by one)
pub(crate) fn input_std(x: &ArrayBase<impl Data<Elem = f64>, Ix2>) -> Array1<f64> {
    let mut std = x.std_axis(Axis(0), 1.);
    std.mapv_inplace(|v| if v == 0. || !v.is_finite() { 1. } else { v });
    std
}

/// Fit an exponential GP on `x` and `y` within the current rayon thread pool
pub(crate) fn fit_exponential_gp(
    x: Array2<f64>,
    y: Array1<f64>,
    n_start: usize,
    max_eval: usize,
    nugget: f64,
) -> std::result::Result<ExponentialGp, GpError> {
    ExponentialGp::params(ConstantMean::default(), AbsoluteExponentialCorr::default())
        .n_start(n_start)
        .max_eval(max_eval)
        .nugget(nugget)
        .fit(&Dataset::new(x, y))
}

/// Fitter of [GpSurrogate] models
#[derive(Clone, Debug)]
pub struct GpFitter {
    nugget: f64,
}

impl Default for GpFitter {
    fn default() -> Self {
        GpFitter {
            nugget: DEFAULT_NUGGET,
        }
    }
}

impl GpFitter {
    /// Sets the nugget used to improve numerical stability
    pub fn nugget(mut self, nugget: f64) -> Self {
        self.nugget = nugget;
        self
    }
}

impl SurrogateFitter for GpFitter {
    fn fit(
        &self,
        x: &ArrayView2<f64>,
        y: &ArrayView1<f64>,
        options: &FitOptions,
    ) -> Result<Box<dyn FittedSurrogate>> {
        let (xt, yt) = (x.to_owned(), y.to_owned());
        let gp = if options.parallel {
            fit_exponential_gp(xt, yt, options.n_start, options.max_eval, self.nugget)?
        } else {
            let pool = rayon::ThreadPoolBuilder::new().num_threads(1).build()?;
            pool.install(|| {
                fit_exponential_gp(xt, yt, options.n_start, options.max_eval, self.nugget)
            })?
        };
        debug!("{gp}");
        let surrogate = GpSurrogate {
            xstd: input_std(x),
            nugget: self.nugget,
            gp,
            sample: SampleSlot::default(),
        };
        Ok(Box::new(surrogate))
    }
}

/// A fitted exponential GP with its optional posterior function sample
pub struct GpSurrogate {
    gp: ExponentialGp,
    /// training input standard deviations used to express theta as length scales
    xstd: Array1<f64>,
    nugget: f64,
    sample: SampleSlot,
}

impl FittedSurrogate for GpSurrogate {
    fn predict(&self, x: &ArrayView2<f64>) -> Result<Array1<f64>> {
        Ok(self.gp.predict(x)?)
    }

    fn predict_sampled(&self, x: &ArrayView2<f64>) -> Result<Array1<f64>> {
        self.sample.predict(x)
    }

    fn spectral_sample(
        &mut self,
        sampler: &dyn SpectralSampler,
        xt: &ArrayView2<f64>,
        yt: &ArrayView1<f64>,
        n_points: usize,
    ) -> Result<()> {
        let sample = sampler.sample(&*self, xt, yt, n_points)?;
        self.sample.set(sample);
        info!("Posterior sample drawn ({n_points} points)");
        Ok(())
    }

    fn hyperparameters(&self) -> Hyperparameters {
        // correlation is exp(-sum theta_k |dx_k| / std_k) in input units,
        // the nugget is added to the correlation matrix diagonal
        let variance = self.gp.variance();
        Hyperparameters {
            lengthscales: &self.xstd / self.gp.theta(),
            variance,
            noise: self.nugget * variance,
        }
    }

    fn objective(&self) -> f64 {
        -self.gp.likelihood()
    }

    fn theta(&self) -> Array1<f64> {
        self.gp.theta().to_owned()
    }

    fn sample_trajectories(&self, x: &ArrayView2<f64>, n_traj: usize) -> Result<Array2<f64>> {
        Ok(self.gp.sample(x, n_traj))
    }
}
