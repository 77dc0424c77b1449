//! Command-line front end: generate datasets, train, evaluate, and render.
//!
//! ```text
//! ferrite-mlp gen xor --out xor.mat
//! ferrite-mlp train --data xor.mat --arch "2 4 1" --epochs 20000 --save xor.json
//! ferrite-mlp eval --model xor.json --data xor.mat
//! ferrite-mlp gen image digit.png --out digit.mat
//! ferrite-mlp train --data digit.mat --arch "2 7 5 1" --save digit.json
//! ferrite-mlp upscale --model digit.json --width 512 --height 512 --out upscaled.png
//! ```

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tracing::info;
use tracing_subscriber::EnvFilter;

use ferrite_mlp::{
    data::{self, TrainingSet},
    grad::{DifferenceScheme, GradientMethod},
    loss::cost,
    network::{Architecture, Network, NetworkSpec},
    optim::Sgd,
    train::{train_loop, TrainConfig},
};

#[derive(Parser)]
#[command(name = "ferrite-mlp")]
#[command(about = "Train sigmoid multi-layer perceptrons with backpropagation", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log level used when RUST_LOG is not set
    #[arg(short, long, default_value = "info", global = true)]
    log_level: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a training set and write it as a matrix file
    Gen {
        #[command(subcommand)]
        dataset: Dataset,
    },
    /// Train a network on a matrix file
    Train(TrainArgs),
    /// Report the cost of a saved network on a matrix file
    Eval {
        #[arg(long)]
        model: PathBuf,
        #[arg(long)]
        data: PathBuf,
        /// Rounding threshold for printed bit patterns
        #[arg(long, default_value_t = 0.5)]
        threshold: f64,
    },
    /// Render a trained 2-input, 1-output network as a grayscale PNG
    Upscale {
        #[arg(long)]
        model: PathBuf,
        #[arg(long, default_value_t = 512)]
        width: u32,
        #[arg(long, default_value_t = 512)]
        height: u32,
        #[arg(long, default_value = "upscaled.png")]
        out: PathBuf,
    },
}

#[derive(Subcommand)]
enum Dataset {
    /// Four-row XOR table (2 inputs, 1 target)
    Xor {
        #[arg(long, default_value = "xor.mat")]
        out: PathBuf,
    },
    /// All sums of two BITS-bit numbers (2·BITS inputs, BITS+1 targets)
    Adder {
        #[arg(long, default_value_t = 3)]
        bits: usize,
        #[arg(long, default_value = "adder.mat")]
        out: PathBuf,
    },
    /// One row per pixel of a grayscale image (2 inputs, 1 target)
    Image {
        input: PathBuf,
        #[arg(long, default_value = "image.mat")]
        out: PathBuf,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Method {
    Backprop,
    FiniteDifference,
}

#[derive(clap::Args)]
struct TrainArgs {
    /// Matrix file with input columns followed by target columns
    #[arg(long)]
    data: PathBuf,
    /// JSON network spec (architecture, init range, training settings)
    #[arg(long, conflicts_with = "arch")]
    spec: Option<PathBuf>,
    /// Layer widths, e.g. "2 4 1"
    #[arg(long)]
    arch: Option<String>,
    #[arg(long)]
    epochs: Option<usize>,
    #[arg(long)]
    rate: Option<f64>,
    #[arg(long, value_enum)]
    method: Option<Method>,
    /// Perturbation size for finite differences
    #[arg(long, default_value_t = 1e-3)]
    eps: f64,
    #[arg(long)]
    seed: Option<u64>,
    #[arg(long)]
    report_every: Option<usize>,
    /// Stop once the cost reaches this value
    #[arg(long)]
    target_cost: Option<f64>,
    /// Where to write the trained network as JSON
    #[arg(long)]
    save: Option<PathBuf>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level)),
        )
        .init();

    match cli.command {
        Commands::Gen { dataset } => generate(dataset),
        Commands::Train(args) => train(args),
        Commands::Eval { model, data, threshold } => eval(&model, &data, threshold),
        Commands::Upscale { model, width, height, out } => upscale(&model, width, height, &out),
    }
}

fn generate(dataset: Dataset) -> Result<()> {
    let (set, out) = match dataset {
        Dataset::Xor { out } => (data::xor(), out),
        Dataset::Adder { bits, out } => {
            if !(1..=12).contains(&bits) {
                bail!("--bits must be between 1 and 12, got {bits}");
            }
            (data::adder(bits), out)
        }
        Dataset::Image { input, out } => {
            let set = data::image_field(&input)
                .with_context(|| format!("reading image {}", input.display()))?;
            (set, out)
        }
    };
    set.save(&out)
        .with_context(|| format!("writing {}", out.display()))?;
    println!(
        "Generated {} ({} rows, {} inputs, {} targets)",
        out.display(),
        set.len(),
        set.input_cols(),
        set.target_cols()
    );
    Ok(())
}

fn resolve_spec(args: &TrainArgs) -> Result<NetworkSpec> {
    let mut spec = match (&args.spec, &args.arch) {
        (Some(path), _) => NetworkSpec::load_json(&path.to_string_lossy())
            .with_context(|| format!("loading spec {}", path.display()))?,
        (None, Some(arch)) => {
            let arch: Architecture = arch.parse().context("parsing --arch")?;
            NetworkSpec::new("cli", arch)
        }
        (None, None) => bail!("either --spec or --arch is required"),
    };

    let training = &mut spec.training;
    if let Some(epochs) = args.epochs {
        training.epochs = epochs;
    }
    if let Some(rate) = args.rate {
        training.learning_rate = rate;
    }
    if let Some(method) = args.method {
        training.method = match method {
            Method::Backprop => GradientMethod::Backprop,
            Method::FiniteDifference => GradientMethod::FiniteDifference {
                eps: args.eps,
                scheme: DifferenceScheme::Forward,
            },
        };
    }
    if args.seed.is_some() {
        training.seed = args.seed;
    }
    if let Some(every) = args.report_every {
        training.report_every = every;
    }
    if args.target_cost.is_some() {
        training.cost_threshold = args.target_cost;
    }

    spec.validate()?;
    Ok(spec)
}

fn train(args: TrainArgs) -> Result<()> {
    let spec = resolve_spec(&args)?;
    let set = TrainingSet::load(&args.data, spec.architecture.input_width())
        .with_context(|| format!("loading {}", args.data.display()))?;
    if set.target_cols() != spec.architecture.output_width() {
        bail!(
            "{} has {} target columns but architecture {} outputs {}",
            args.data.display(),
            set.target_cols(),
            spec.architecture,
            spec.architecture.output_width()
        );
    }

    let mut rng = spec.rng();
    let mut net = spec.build(&mut rng);
    let mut grad = net.alloc_like();
    let optimizer = Sgd::new(spec.training.learning_rate);
    let config = TrainConfig::from_spec(&spec.training);

    let summary = train_loop(&mut net, &mut grad, set.inputs(), set.targets(), &optimizer, &config);
    println!(
        "{}: {} epochs, cost = {:.6} ({:?})",
        spec.name, summary.epochs_run, summary.final_cost, summary.stop
    );

    if let Some(path) = &args.save {
        net.save_json(&path.to_string_lossy())
            .with_context(|| format!("saving network to {}", path.display()))?;
    }
    Ok(())
}

fn load_network(path: &Path) -> Result<Network> {
    Network::load_json(&path.to_string_lossy())
        .with_context(|| format!("loading network {}", path.display()))
}

fn eval(model: &Path, data_path: &Path, threshold: f64) -> Result<()> {
    let mut net = load_network(model)?;
    let set = TrainingSet::load(data_path, net.input_width())
        .with_context(|| format!("loading {}", data_path.display()))?;
    if set.target_cols() != net.output_width() {
        bail!(
            "{} has {} target columns, network outputs {}",
            data_path.display(),
            set.target_cols(),
            net.output_width()
        );
    }

    let c = cost(&mut net, set.inputs(), set.targets());
    let mut correct = 0;
    for i in 0..set.len() {
        let input = set.inputs().row_slice(i);
        let expected = data::threshold(set.targets().row_slice(i), threshold);
        let got = data::threshold(net.predict(input), threshold);
        if got == expected {
            correct += 1;
            println!("  {input:?} -> {got:?}");
        } else {
            println!("! {input:?} -> {got:?} (expected {expected:?})");
        }
    }
    info!(rows = set.len(), correct, "evaluation finished");
    println!("cost = {c:.6}, {correct}/{} rows match at threshold {threshold}", set.len());
    Ok(())
}

fn upscale(model: &Path, width: u32, height: u32, out: &Path) -> Result<()> {
    let mut net = load_network(model)?;
    data::save_field_png(&mut net, width, height, out)
        .with_context(|| format!("rendering to {}", out.display()))?;
    println!("Generated {} from {}", out.display(), model.display());
    Ok(())
}
