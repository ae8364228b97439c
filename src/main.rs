use clap::Parser;
use env_logger::{Builder, Env};
use gpbench::{
    ArtifactNames, BenchConfig, GPBENCH_LOG, GpFitter, Observations, TrajectorySampler,
    column_names, run_trials, write_parity, write_results,
};
use log::{info, warn};
use std::path::PathBuf;

/// Benchmark GP surrogates on laboratory data over repeated train/test trials
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Json configuration file, command line options override its values
    #[arg(long)]
    config: Option<PathBuf>,
    /// Headerless csv file of inputs
    #[arg(long)]
    x_file: Option<PathBuf>,
    /// Headerless csv file of outputs
    #[arg(long)]
    y_file: Option<PathBuf>,
    /// Number of leading rows used for training
    #[arg(long)]
    n_training: Option<usize>,
    /// Number of hyperparameters optimization restarts
    #[arg(long)]
    n_start: Option<usize>,
    /// Max number of likelihood evaluations per optimization
    #[arg(long)]
    max_eval: Option<usize>,
    /// Number of points used to draw posterior function samples
    #[arg(long)]
    n_spectral_points: Option<usize>,
    /// Skip posterior function sampling evaluation
    #[arg(long)]
    no_spectral_sample: bool,
    /// Write parity data (single trial only)
    #[arg(long)]
    plot: bool,
    /// Number of repeated trials
    #[arg(long)]
    n_trials: Option<usize>,
    /// Run optimization restarts sequentially
    #[arg(long)]
    no_parallel: bool,
    /// Random seed of posterior sampling
    #[arg(long)]
    seed: Option<u64>,
    /// Output directory
    #[arg(short, long)]
    outdir: Option<PathBuf>,
}

impl Args {
    fn config(&self) -> anyhow::Result<BenchConfig> {
        let mut config = match &self.config {
            Some(file) => BenchConfig::from_json_file(file)?,
            None => BenchConfig::default(),
        };
        if self.x_file.is_some() || self.y_file.is_some() {
            let x_file = self.x_file.clone().unwrap_or_else(|| config.x_file().to_path_buf());
            let y_file = self.y_file.clone().unwrap_or_else(|| config.y_file().to_path_buf());
            config = config.data_files(x_file, y_file);
        }
        if let Some(n) = self.n_training {
            config = config.n_training(n);
        }
        if let Some(n) = self.n_start {
            config = config.n_start(n);
        }
        if let Some(n) = self.max_eval {
            config = config.max_eval(n);
        }
        if let Some(n) = self.n_spectral_points {
            config = config.n_spectral_points(n);
        }
        if self.no_spectral_sample {
            config = config.spectral_sample(false);
        }
        if self.plot {
            config = config.plot(true);
        }
        if let Some(n) = self.n_trials {
            config = config.n_trials(n);
        }
        if self.no_parallel {
            config = config.parallel(false);
        }
        if let Some(seed) = self.seed {
            config = config.seed(seed);
        }
        if let Some(outdir) = &self.outdir {
            config = config.outdir(outdir);
        }
        Ok(config.check()?)
    }
}

fn main() -> anyhow::Result<()> {
    let env = Env::new().filter_or(GPBENCH_LOG, "info");
    let mut builder = Builder::from_env(env);
    let builder = builder.target(env_logger::Target::Stdout);
    builder.try_init().ok();

    let args = Args::parse();
    let config = args.config()?;
    info!("{}", serde_json::to_string(&config)?);

    let names = ArtifactNames::today(&config);
    let parity = config.is_plot() && config.get_n_trials() == 1;
    if config.is_plot() && !parity {
        warn!("Parity data is only written for a single trial run");
    }

    let (n_inputs, n_outputs) = config.get_layout();
    let load =
        || Observations::from_csv_files(config.x_file(), config.y_file(), n_inputs, n_outputs);
    let output_names = column_names("y", n_outputs);
    let fitter = GpFitter::default();
    let sampler = TrajectorySampler::default().seed(config.get_seed());
    let table = run_trials(&config, load, &fitter, &sampler, |_, outcome| {
        if parity {
            write_parity(&names.parity_prefix, &output_names, outcome)?;
        }
        Ok(())
    })?;
    write_results(&table, &names)?;
    Ok(())
}
