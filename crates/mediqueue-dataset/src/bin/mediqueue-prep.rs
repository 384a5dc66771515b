use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use mediqueue_dataset::{prepare, read_records, write_dataset, PrepareOptions};

#[derive(Parser)]
#[command(name = "mediqueue-prep")]
#[command(about = "Prepare specialty-classifier training data from a symptom CSV")]
struct Cli {
    /// CSV with disease and symptoms columns
    #[arg(short, long)]
    input: PathBuf,

    /// Output directory for train.jsonl, validation.jsonl and labels.json
    #[arg(short, long, default_value = "data")]
    output: PathBuf,

    /// Augmented variants per original row
    #[arg(long, default_value_t = 2)]
    augment_factor: usize,

    /// Share of each label held out for validation
    #[arg(long, default_value_t = 0.2)]
    validation_fraction: f64,

    /// Seed for augmentation and splitting
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Log filter when RUST_LOG is unset
    #[arg(long, env = "MEDIQUEUE_LOG", default_value = "info")]
    log: String,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    mediqueue_core::telemetry::init_tracing(&cli.log);

    let records = read_records(&cli.input)
        .with_context(|| format!("reading {}", cli.input.display()))?;

    let options = PrepareOptions {
        augment_factor: cli.augment_factor,
        validation_fraction: cli.validation_fraction,
        seed: cli.seed,
    };
    let dataset = prepare(&records, &options).context("preparing dataset")?;

    let files = write_dataset(&cli.output, &dataset)
        .with_context(|| format!("writing to {}", cli.output.display()))?;

    println!(
        "{} rows -> {} train / {} validation examples, {} labels",
        dataset.source_rows,
        dataset.split.train.len(),
        dataset.split.validation.len(),
        dataset.labels.len()
    );
    println!("  {}", files.train.display());
    println!("  {}", files.validation.display());
    println!("  {}", files.labels.display());
    Ok(())
}
