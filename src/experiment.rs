//! Benchmark trials: split, scale, fit, evaluate and aggregate.
use crate::config::BenchConfig;
use crate::dataset::Observations;
use crate::errors::Result;
use crate::metrics::rmse;
use crate::record::{ResultTable, RunRecord, SpectralRmse, column_suffix};
use crate::scaling::{scale_inputs, scale_outputs};
use crate::surrogate::{FitOptions, ModelGroup, SpectralSampler, SurrogateFitter};

use log::info;
use ndarray::{Array1, Array2};

/// Predictions in original output units
#[derive(Clone, Debug, PartialEq)]
pub struct Predictions {
    /// Predictions at training inputs (n_train, ny)
    pub train: Array2<f64>,
    /// Predictions at test inputs (n_test, ny)
    pub test: Array2<f64>,
}

/// Outcome of one trial
#[derive(Clone, Debug)]
pub struct TrialOutcome {
    /// Trial metrics
    pub record: RunRecord,
    /// Actual training outputs
    pub y_train: Array2<f64>,
    /// Actual test outputs
    pub y_test: Array2<f64>,
    /// Mean predictions
    pub mean: Predictions,
    /// Sampled predictions, only when posterior sampling is enabled
    pub sampled: Option<Predictions>,
}

fn log_rmse(label: &str, names: &[String], values: &Array1<f64>) {
    let msg = names
        .iter()
        .zip(values)
        .map(|(name, v)| format!("RMSE {label} {}={v:.2}", column_suffix(name)))
        .collect::<Vec<_>>()
        .join(", ");
    info!("{msg}");
}

/// Run one trial on given observations: train/test split, scaling, one surrogate per output,
/// evaluation of mean predictions and optionally of posterior function samples.
pub fn fit_and_test(
    observations: &Observations,
    config: &BenchConfig,
    fitter: &dyn SurrogateFitter,
    sampler: &dyn SpectralSampler,
) -> Result<TrialOutcome> {
    let split = observations.split(config.n_training)?;
    let names = &observations.output_names;

    let (x_train, x_test, _) =
        scale_inputs(&split.x_train, &split.x_test, &observations.input_names)?;
    let (y_train_scaled, y_scaler) = scale_outputs(&split.y_train, names)?;

    let options = FitOptions {
        n_start: config.n_start,
        max_eval: config.max_eval,
        parallel: config.parallel,
    };
    let mut models = ModelGroup::fit(
        fitter,
        &x_train.view(),
        &y_train_scaled.view(),
        names,
        &options,
    )?;
    for (name, model) in models.iter() {
        let hyp = model.hyperparameters();
        info!("Model {name} lengthscales: {}", hyp.lengthscales);
        info!("Model {name} variance: {}", hyp.variance);
        info!("Model {name} noise: {}", hyp.noise);
    }

    let predict = |models: &ModelGroup, use_spectral_sample: bool| -> Result<Predictions> {
        let train = models.predict(&x_train.view(), use_spectral_sample)?;
        let test = models.predict(&x_test.view(), use_spectral_sample)?;
        Ok(Predictions {
            train: y_scaler.inverse_transform(&train),
            test: y_scaler.inverse_transform(&test),
        })
    };

    let mean = predict(&models, false)?;
    let rmse_train = rmse(&mean.train, &split.y_train)?;
    log_rmse("train", names, &rmse_train);
    let rmse_test = rmse(&mean.test, &split.y_test)?;
    log_rmse("test", names, &rmse_test);

    let (sampled, spectral) = if config.spectral_sample {
        models.spectral_sample(
            sampler,
            &x_train.view(),
            &y_train_scaled.view(),
            config.n_spectral_points,
        )?;
        let sampled = predict(&models, true)?;
        let train = rmse(&sampled.train, &split.y_train)?;
        log_rmse("train spectral", names, &train);
        let test = rmse(&sampled.test, &split.y_test)?;
        log_rmse("test spectral", names, &test);
        let spectral = SpectralRmse {
            train: train.to_vec(),
            test: test.to_vec(),
        };
        (Some(sampled), Some(spectral))
    } else {
        (None, None)
    };

    let record = RunRecord {
        rmse_train: rmse_train.to_vec(),
        rmse_test: rmse_test.to_vec(),
        spectral,
        objectives: models.objectives(),
    };
    Ok(TrialOutcome {
        record,
        y_train: split.y_train,
        y_test: split.y_test,
        mean,
        sampled,
    })
}

/// Run `config.n_trials` independent trials, observations are reloaded for each trial.
/// The first failing trial aborts the whole batch.
///
/// `on_trial` is called with the trial index and its outcome once the trial is recorded.
pub fn run_trials<L, T>(
    config: &BenchConfig,
    load: L,
    fitter: &dyn SurrogateFitter,
    sampler: &dyn SpectralSampler,
    mut on_trial: T,
) -> Result<ResultTable>
where
    L: Fn() -> Result<Observations>,
    T: FnMut(usize, &TrialOutcome) -> Result<()>,
{
    let mut results: Option<ResultTable> = None;
    for i in 0..config.n_trials {
        info!("Trial {}/{}", i + 1, config.n_trials);
        let observations = load()?;
        let outcome = fit_and_test(&observations, config, fitter, sampler)?;
        let table = results.get_or_insert_with(|| {
            ResultTable::new(&observations.output_names, config.spectral_sample)
        });
        table.push(outcome.record.clone())?;
        on_trial(i, &outcome)?;
    }
    Ok(results.unwrap_or_else(|| ResultTable::new(&[], config.spectral_sample)))
}
