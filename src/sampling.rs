//! Posterior function sampling.
//!
//! [TrajectorySampler] draws a deterministic function from a fitted surrogate posterior:
//! one joint posterior trajectory is sampled at the training inputs plus `n_points`
//! anchor locations drawn by latin hypercube sampling over the unit hypercube, then this
//! trajectory is interpolated by a GP whose correlation parameters are fixed to the ones
//! of the surrogate. The resulting function can be evaluated anywhere at the cost of a
//! GP mean prediction.
//!
//! The interpolating GP uses an absolute exponential kernel, so the sampled surrogate is
//! expected to expose its correlation parameters in that convention through
//! [FittedSurrogate::theta].
use crate::errors::{BenchError, Result};
use crate::gp::{ExponentialGp, input_std};
use crate::surrogate::{FittedSurrogate, SampledFunction, SpectralSampler};

use egobox_doe::{Lhs, LhsKind, SamplingMethod};
use egobox_gp::ThetaTuning;
use egobox_gp::correlation_models::AbsoluteExponentialCorr;
use egobox_gp::mean_models::ConstantMean;
use linfa::prelude::{Dataset, Fit};
use log::debug;
use ndarray::{Array1, Array2, ArrayView1, ArrayView2, Axis, concatenate};
use ndarray_rand::rand::SeedableRng;
use rand_xoshiro::Xoshiro256Plus;

/// Default nugget used to interpolate sampled trajectories
pub const SAMPLE_NUGGET: f64 = 1e-8;

/// Draw posterior function samples by interpolating a joint posterior trajectory
#[derive(Clone, Debug)]
pub struct TrajectorySampler {
    seed: Option<u64>,
    nugget: f64,
}

impl Default for TrajectorySampler {
    fn default() -> Self {
        TrajectorySampler {
            seed: None,
            nugget: SAMPLE_NUGGET,
        }
    }
}

impl TrajectorySampler {
    /// Sets the seed of anchor locations sampling
    pub fn seed(mut self, seed: Option<u64>) -> Self {
        self.seed = seed;
        self
    }

    /// Sets the nugget used to interpolate sampled trajectories
    pub fn nugget(mut self, nugget: f64) -> Self {
        self.nugget = nugget;
        self
    }

    fn anchors(&self, nx: usize, n_points: usize) -> Array2<f64> {
        let xlimits = Array2::from_shape_fn((nx, 2), |(_, j)| j as f64);
        let rng = match self.seed {
            Some(seed) => Xoshiro256Plus::seed_from_u64(seed),
            None => Xoshiro256Plus::from_entropy(),
        };
        Lhs::new_with_rng(&xlimits, rng)
            .kind(LhsKind::Classic)
            .sample(n_points)
    }
}

/// A sampled trajectory interpolated by a fixed correlation GP
pub struct InterpolatedSample {
    gp: ExponentialGp,
}

impl SampledFunction for InterpolatedSample {
    fn predict(&self, x: &ArrayView2<f64>) -> Result<Array1<f64>> {
        Ok(self.gp.predict(x)?)
    }
}

impl SpectralSampler for TrajectorySampler {
    fn sample(
        &self,
        model: &dyn FittedSurrogate,
        xt: &ArrayView2<f64>,
        _yt: &ArrayView1<f64>,
        n_points: usize,
    ) -> Result<Box<dyn SampledFunction>> {
        if n_points == 0 {
            return Err(BenchError::InvalidConfigError(
                "at least one spectral point is required".to_string(),
            ));
        }
        let theta = model.theta();
        if theta.len() != xt.ncols() {
            return Err(BenchError::InvalidData(format!(
                "model has {} correlation parameters for {} input dimensions",
                theta.len(),
                xt.ncols()
            )));
        }
        let anchors = self.anchors(xt.ncols(), n_points);
        let xs = concatenate![Axis(0), *xt, anchors];
        let traj = model
            .sample_trajectories(&xs.view(), 1)?
            .remove_axis(Axis(1));

        // GP inputs are normalized by their standard deviations: keep the correlation
        // length in input units unchanged for the interpolating GP
        let theta = theta * &input_std(&xs) / &input_std(xt);
        debug!("Interpolate posterior trajectory with theta = {theta}");
        let gp = ExponentialGp::params(ConstantMean::default(), AbsoluteExponentialCorr::default())
            .theta_tuning(ThetaTuning::Fixed(theta))
            .nugget(self.nugget)
            .fit(&Dataset::new(xs, traj))?;
        Ok(Box::new(InterpolatedSample { gp }))
    }
}
