use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{Level, error, info};

use mnist_mlp::{TrainingConfig, load_config, mnist};

const DEFAULT_IMAGES: &str = "data/train-images-idx3-ubyte";
const DEFAULT_LABELS: &str = "data/train-labels-idx1-ubyte";

#[derive(Parser)]
#[command(name = "mnist-mlp")]
#[command(about = "Train a sigmoid MLP on MNIST with mini-batch SGD", long_about = None)]
struct Cli {
    /// JSON training configuration (defaults are used for missing fields)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Write a binary checkpoint here after training
    #[arg(long)]
    save: Option<PathBuf>,

    /// Log per-batch detail
    #[arg(short, long)]
    verbose: bool,

    /// MNIST image file (IDX3)
    #[arg(requires = "labels")]
    images: Option<PathBuf>,

    /// MNIST label file (IDX1)
    labels: Option<PathBuf>,
}

fn run(cli: Cli) -> mnist_mlp::Result<()> {
    let cfg = match &cli.config {
        Some(path) => load_config(path)?,
        None => {
            let cfg = TrainingConfig::default();
            cfg.validate()?;
            cfg
        }
    };
    let images = cli.images.unwrap_or_else(|| PathBuf::from(DEFAULT_IMAGES));
    let labels = cli.labels.unwrap_or_else(|| PathBuf::from(DEFAULT_LABELS));

    let mut rng = StdRng::seed_from_u64(cfg.seed);
    let mut data = mnist::load_mnist(
        &images,
        &labels,
        cfg.n_data,
        cfg.input_size,
        cfg.output_size,
    )?;

    let mut net = cfg.network_builder().build_with_rng(&mut rng)?;
    info!("\n{net}");

    let report = net.fit(&mut data, &cfg.fit_config(), &mut rng)?;
    if let Some(loss) = report.final_loss() {
        info!(loss, "training finished");
    }

    let eval = net.evaluate(&data)?;
    info!(
        mse = eval.mse,
        accuracy = eval.accuracy,
        samples = data.len(),
        "training set evaluation"
    );

    if let Some(path) = &cli.save {
        net.save(path)?;
    }
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    tracing_subscriber::fmt().with_max_level(level).init();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err}");
            ExitCode::FAILURE
        }
    }
}
