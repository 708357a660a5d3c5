use bunk_ai::config::AppConfig;
use bunk_ai::error::AppError;
use bunk_ai::prediction::{PredictionInput, PredictionService};
use bunk_ai::training::{train_to_path, TrainingConfig};
use clap::Args;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub(crate) struct TrainArgs {
    /// Number of synthetic samples to generate
    #[arg(long)]
    pub(crate) samples: Option<usize>,
    /// Gradient descent epochs
    #[arg(long)]
    pub(crate) epochs: Option<usize>,
    /// Seed for the synthetic data generator
    #[arg(long)]
    pub(crate) seed: Option<u64>,
    /// Where to write the model artifact (defaults to the configured MODEL_PATH)
    #[arg(long)]
    pub(crate) output: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub(crate) struct PredictArgs {
    /// Attendance percentage, 0-100
    #[arg(long)]
    pub(crate) attendance: f64,
    /// Exam proximity score, 0-1 (1.0 = no upcoming exam; lower = closer)
    #[arg(long)]
    pub(crate) exam_proximity: f64,
    /// Syllabus completion percentage, 0-100
    #[arg(long)]
    pub(crate) syllabus: f64,
    /// Past performance percentage, 0-100
    #[arg(long)]
    pub(crate) past_performance: f64,
    /// Model artifact to score with (falls back to the rule cascade if absent)
    #[arg(long)]
    pub(crate) model_path: Option<PathBuf>,
}

pub(crate) fn run_train(args: TrainArgs) -> Result<(), AppError> {
    let app_config = AppConfig::load()?;

    let mut config = TrainingConfig::default();
    if let Some(samples) = args.samples {
        config.samples = samples;
    }
    if let Some(epochs) = args.epochs {
        config.epochs = epochs;
    }
    if let Some(seed) = args.seed {
        config.seed = seed;
    }
    let output = args.output.unwrap_or(app_config.model.artifact_path);

    println!(
        "Training bunk classifier on {} synthetic samples ({} epochs)...",
        config.samples, config.epochs
    );
    let artifact = train_to_path(&config, &output)?;

    println!();
    println!("== Training metrics ==");
    println!("  train accuracy : {:.3}", artifact.metrics.train_accuracy);
    println!("  test accuracy  : {:.3}", artifact.metrics.test_accuracy);
    println!("  auc            : {:.3}", artifact.metrics.auc_score);
    println!(
        "  samples        : {} train / {} test",
        artifact.metrics.training_samples, artifact.metrics.test_samples
    );
    println!();
    println!("== Feature importance ==");
    for entry in artifact.feature_importance() {
        println!("  {:<34} {:.4}", entry.feature, entry.weight);
    }
    println!();
    println!("Artifact written to {}", output.display());

    Ok(())
}

pub(crate) fn run_predict(args: PredictArgs) -> Result<(), AppError> {
    let input = PredictionInput::new(
        args.attendance,
        args.exam_proximity,
        args.syllabus,
        args.past_performance,
    )?;

    let model_path = match args.model_path {
        Some(path) => path,
        None => AppConfig::load()?.model.artifact_path,
    };
    let service = PredictionService::initialize(&model_path);
    let result = service.predict(&input);

    println!("== Bunk prediction ({}) ==", service.mode().label());
    println!("  recommendation : {}", result.recommendation.label());
    println!("  risk level     : {}", result.risk_level.label());
    println!("  confidence     : {:.2}", result.confidence);
    if let Some(probability) = result.probability_safe {
        println!("  p(safe)        : {:.3}", probability);
    }
    println!("  explanation    : {}", result.explanation);

    Ok(())
}
