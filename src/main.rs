//! photospheres command line
//!
//! Builds one cluster tree per requested strategy over a directory of images or a CSV file of
//! feature vectors, and writes each tree as `<output>/<stem>.json`. In image mode the centroid
//! previews are written to `<output>/centroids/`.
//!
//! Exit code 1 on error.

use clap::{ArgGroup, Parser};
use photospheres::{
    attach_locations_csv, load_features_csv, load_image_dir, write_json, CentroidImageWriter,
    ClusterError, HierarchyBuilder, HierarchyParams, Item, Strategy,
};
use std::path::PathBuf;
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};

/// Recursively cluster an image collection into a zoomable cluster tree
#[derive(Parser, Debug)]
#[command(name = "photospheres")]
#[command(version)]
#[command(about = "Recursively cluster an image collection into a zoomable cluster tree")]
#[command(group(ArgGroup::new("input").required(true).args(["images", "features"])))]
struct Cli {
    /// Directory of .jpg/.jpeg/.png images; raw pixels of the resized images are the features
    #[arg(long, value_name = "DIR")]
    images: Option<PathBuf>,

    /// Headerless CSV of `id,f1,...,fD` feature vectors
    #[arg(long, value_name = "CSV")]
    features: Option<PathBuf>,

    /// Headerless CSV of `id,x,y` 2-D embedding locations used to annotate nodes
    #[arg(long, value_name = "CSV")]
    locations: Option<PathBuf>,

    /// Partitioning strategies to run, each producing its own tree
    #[arg(
        long,
        value_delimiter = ',',
        default_values_t = vec![Strategy::Centroid, Strategy::Exemplar]
    )]
    strategy: Vec<Strategy>,

    /// Number of groups per split for the centroid strategy
    #[arg(long, default_value_t = 7)]
    branching_factor: usize,

    /// Subsets smaller than this are expanded into terminal leaves
    #[arg(long, default_value_t = 10)]
    split_threshold: usize,

    /// Maximum number of nested splits along any path
    #[arg(long, default_value_t = 10)]
    max_depth: usize,

    /// Seed for partitioners that sample
    #[arg(long)]
    seed: Option<u64>,

    /// Width images are resized to before clustering
    #[arg(long, default_value_t = 64)]
    width: u32,

    /// Height images are resized to before clustering
    #[arg(long, default_value_t = 48)]
    height: u32,

    /// Output directory
    #[arg(long, default_value = "./output")]
    output: PathBuf,

    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        1 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };
    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    if let Err(err) = run(&cli) {
        error!("{err}");
        std::process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<(), ClusterError> {
    let items = load_items(cli)?;

    let mut builder = HierarchyParams::builder()
        .branching_factor(cli.branching_factor)
        .split_threshold(cli.split_threshold)
        .max_depth(cli.max_depth);
    if let Some(seed) = cli.seed {
        builder = builder.seed(seed);
    }
    let params = builder.build();

    let mut strategies: Vec<Strategy> = Vec::with_capacity(cli.strategy.len());
    for strategy in &cli.strategy {
        if !strategies.contains(strategy) {
            strategies.push(*strategy);
        }
    }
    for strategy in strategies {
        info!(%strategy, "building cluster tree");
        let mut hierarchy = HierarchyBuilder::new(&items, params.with_strategy(strategy));
        if cli.images.is_some() {
            hierarchy = hierarchy.with_synthesizer(CentroidImageWriter::new(
                cli.output.join("centroids"),
                strategy.preview_prefix(),
                cli.width,
                cli.height,
            ));
        }
        let tree = hierarchy.build()?;
        write_json(&tree, cli.output.join(format!("{}.json", strategy.output_stem())))?;
    }
    Ok(())
}

fn load_items(cli: &Cli) -> Result<Vec<Item<f32>>, ClusterError> {
    let mut items = match (&cli.images, &cli.features) {
        (Some(dir), _) => load_image_dir(dir, cli.width, cli.height)?,
        (None, Some(csv)) => load_features_csv(csv)?,
        (None, None) => {
            return Err(ClusterError::InvalidRecord(String::from(
                "either --images or --features is required",
            )))
        }
    };
    if let Some(locations) = &cli.locations {
        attach_locations_csv(locations, &mut items)?;
    }
    Ok(items)
}
