//! mlcore command line interface
//!
//! Train, evaluate, and inspect models on labeled CSV datasets.

use clap::{Args, Parser, Subcommand, ValueEnum};
use env_logger::Env;
use log::{error, info};
use mlcore::persistence::ModelFile;
use mlcore::{
    load_csv, EvaluationPipeline, KMeansClusterer, MajorityClassifier, Model,
    NearestCentroidClassifier, Result,
};
use std::path::PathBuf;
use std::process;

#[derive(Parser)]
#[command(name = "mlcore")]
#[command(about = "A generic model contract and evaluation pipeline")]
#[command(version = env!("CARGO_PKG_VERSION"))]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Enable debug output
    #[arg(short, long, global = true)]
    debug: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Partition a dataset, train a model, and report test metrics
    Evaluate(EvaluateArgs),
    /// Train a nearest-centroid model and save it to a file
    Train(TrainArgs),
    /// Display a saved model's header information
    Info(InfoArgs),
}

#[derive(Args)]
struct EvaluateArgs {
    /// Labeled dataset in CSV format (features first, label last)
    #[arg(long)]
    data: PathBuf,

    /// Model family to evaluate
    #[arg(short, long, default_value = "centroid")]
    model: CliModel,

    /// Number of clusters (kmeans only)
    #[arg(short = 'k', long, default_value = "2")]
    clusters: usize,

    /// Percentage of the dataset used for training
    #[arg(long, default_value = "80")]
    train_pct: f64,

    /// Seed for the stratified partition shuffle
    #[arg(long, default_value = "0")]
    seed: u64,

    /// Scale inputs to the unit range before training and prediction
    #[arg(long)]
    scale: bool,
}

#[derive(Args)]
struct TrainArgs {
    /// Labeled dataset in CSV format
    #[arg(long)]
    data: PathBuf,

    /// Output model file
    #[arg(short, long)]
    output: PathBuf,

    /// Scale inputs to the unit range
    #[arg(long)]
    scale: bool,
}

#[derive(Args)]
struct InfoArgs {
    /// Model file to inspect
    #[arg(long)]
    model: PathBuf,
}

#[derive(ValueEnum, Clone, Debug)]
enum CliModel {
    /// Always predict the most frequent training label
    #[value(name = "majority")]
    Majority,
    /// Nearest-centroid classifier
    #[value(name = "centroid")]
    Centroid,
    /// K-means clusterer (labels are ignored during training)
    #[value(name = "kmeans")]
    KMeans,
}

fn main() {
    let cli = Cli::parse();

    let log_level = if cli.debug {
        "debug"
    } else if cli.verbose {
        "info"
    } else {
        "warn"
    };
    env_logger::Builder::from_env(Env::default().default_filter_or(log_level)).init();

    let result = match cli.command {
        Commands::Evaluate(args) => evaluate(args),
        Commands::Train(args) => train(args),
        Commands::Info(args) => info(args),
    };

    if let Err(e) = result {
        error!("{e}");
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn build_model(kind: &CliModel, clusters: usize, seed: u64) -> Box<dyn Model> {
    match kind {
        CliModel::Majority => Box::new(MajorityClassifier::new()),
        CliModel::Centroid => Box::new(NearestCentroidClassifier::new()),
        CliModel::KMeans => Box::new(KMeansClusterer::new(clusters).with_seed(seed)),
    }
}

fn evaluate(args: EvaluateArgs) -> Result<()> {
    let dataset = load_csv(&args.data)?;
    info!(
        "loaded {} samples, {} dimensions, {} classes",
        dataset.len(),
        dataset.dim(),
        dataset.class_labels().len()
    );

    let (training_set, test_set) = dataset.partition(args.train_pct, args.seed)?;

    let mut model = build_model(&args.model, args.clusters, args.seed);
    model.enable_scaling(args.scale);

    let mut pipeline = EvaluationPipeline::new(model);
    pipeline.train(&training_set)?;
    pipeline.test(&test_set)?;

    println!("=== Evaluation Results ===");
    println!("Model: {}", pipeline.model().name());
    println!("Training samples: {}", training_set.len());
    println!("Test samples: {}", test_set.len());
    println!(
        "Iterations to converge: {}",
        pipeline.model().num_training_iterations_to_converge()
    );
    println!("Accuracy: {:.4}", pipeline.test_accuracy());

    println!("Per-class metrics:");
    for &label in pipeline.class_labels() {
        println!(
            "  class {:>3}: precision {:.4}  recall {:.4}  f-measure {:.4}",
            label,
            pipeline.test_precision(label)?,
            pipeline.test_recall(label)?,
            pipeline.test_f_measure(label)?,
        );
    }

    println!("Confusion matrix (rows: true, columns: predicted):");
    for (label, row) in pipeline
        .class_labels()
        .iter()
        .zip(pipeline.confusion_matrix().counts())
    {
        let cells: Vec<String> = row.iter().map(|c| format!("{c:>6}")).collect();
        println!("  {:>3} | {}", label, cells.join(" "));
    }

    Ok(())
}

fn train(args: TrainArgs) -> Result<()> {
    let dataset = load_csv(&args.data)?;
    info!("loaded {} samples for training", dataset.len());

    let mut model = NearestCentroidClassifier::new();
    model.enable_scaling(args.scale);
    model.train(&dataset)?;
    model.save_model(&args.output)?;

    println!(
        "Trained on {} samples ({} classes), model saved to {}",
        dataset.len(),
        model.class_labels().len(),
        args.output.display()
    );
    Ok(())
}

fn info(args: InfoArgs) -> Result<()> {
    let file: ModelFile<serde_json::Value> = ModelFile::load_from_file(&args.model)?;
    let header = &file.header;

    println!("=== Model Summary ===");
    println!("Kind: {:?}", header.kind);
    println!("Trained: {}", header.trained);
    println!("Input dimensions: {}", header.num_input_dimensions);
    println!("Output dimensions: {}", header.num_output_dimensions);
    println!(
        "Iterations to converge: {}",
        header.num_training_iterations_to_converge
    );
    println!("Scaling enabled: {}", header.use_scaling);
    println!("Library version: {}", header.metadata.library_version);
    println!("Created: {}", header.metadata.created_at);
    Ok(())
}
