use anyhow::Context;
use clap::Parser;
use gbis::{config::Config, segment_image, Params, Segmentation};
use log::info;
use rand::{rngs::SmallRng, SeedableRng};
use std::{
    fs::File,
    io::{stdout, BufWriter},
    path::{Path, PathBuf},
};

const DEFAULT_CONFIG: &str = "gbis.toml";

#[derive(Debug, clap::Parser)]
struct Args {
    #[clap(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Clone, clap::Subcommand)]
enum Command {
    /// Segment an image and write a false-color rendering and/or the labels.
    Segment(SegmentArgs),
    /// Print component statistics of a segmentation.
    Stats {
        image: PathBuf,
        #[command(flatten)]
        tuning: Tuning,
    },
}

/// Overrides for the values read from the config file.
#[derive(Debug, Clone, clap::Args)]
struct Tuning {
    /// Standard deviation of the pre-smoothing Gaussian.
    #[clap(long)]
    sigma: Option<f32>,

    /// Threshold constant; larger values give larger components.
    #[clap(short, long)]
    k: Option<f32>,

    /// Minimum component size in pixels.
    #[clap(long)]
    min_size: Option<usize>,
}

impl Tuning {
    fn apply(&self, mut params: Params) -> Params {
        if let Some(sigma) = self.sigma {
            params.sigma = sigma;
        }
        if let Some(k) = self.k {
            params.k = k;
        }
        if let Some(min_size) = self.min_size {
            params.min_size = min_size;
        }
        params
    }
}

#[derive(Debug, Clone, clap::Parser)]
struct SegmentArgs {
    image: PathBuf,

    /// Where to write the false-color PNG.
    #[clap(short, long)]
    output: Option<PathBuf>,

    /// Where to write the labels as JSON. `-` writes to stdout.
    #[clap(short, long)]
    labels: Option<PathBuf>,

    /// Seed for the visualization colors.
    #[clap(long)]
    seed: Option<u64>,

    #[command(flatten)]
    tuning: Tuning,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();
    let config = load_config(args.config.as_deref())?;

    match &args.command {
        Command::Segment(segment_args) => segment(&config, segment_args),
        Command::Stats { image, tuning } => stats(&config, image, tuning),
    }
}

fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    let path = match path {
        Some(path) => path,
        None if Path::new(DEFAULT_CONFIG).exists() => Path::new(DEFAULT_CONFIG),
        None => return Ok(Config::default()),
    };
    let raw_config = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    toml::from_str(&raw_config).with_context(|| format!("invalid config {}", path.display()))
}

fn run(image_path: &Path, params: &Params) -> anyhow::Result<Segmentation> {
    let image = image::open(image_path)
        .with_context(|| format!("failed to open {}", image_path.display()))?
        .to_rgb8();
    info!(
        "loaded {} ({}x{})",
        image_path.display(),
        image.width(),
        image.height()
    );
    Ok(segment_image(&image, params)?)
}

fn segment(config: &Config, args: &SegmentArgs) -> anyhow::Result<()> {
    let params = args.tuning.apply(config.params());
    let segmentation = run(&args.image, &params)?;

    if let Some(path) = &args.output {
        let mut rng = match args.seed.or(config.seed) {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_entropy(),
        };
        gbis::colorize(
            &segmentation.labels,
            segmentation.num_components,
            &mut rng,
        )
        .save(path)
        .with_context(|| format!("failed to write {}", path.display()))?;
    }

    match args.labels.as_deref() {
        Some(path) if path == Path::new("-") => {
            serde_json::to_writer(stdout(), &segmentation)?;
            println!();
        }
        Some(path) => write_report(path, &segmentation)?,
        None => println!("{}", segmentation.num_components),
    }

    Ok(())
}

fn write_report(path: &Path, segmentation: &Segmentation) -> anyhow::Result<()> {
    let file =
        File::create(path).with_context(|| format!("failed to create {}", path.display()))?;
    serde_json::to_writer(BufWriter::new(file), segmentation)
        .with_context(|| format!("failed to write {}", path.display()))
}

fn stats(config: &Config, image: &Path, tuning: &Tuning) -> anyhow::Result<()> {
    let params = tuning.apply(config.params());
    let segmentation = run(image, &params)?;
    let sizes = segmentation.component_sizes();

    println!("components {}", segmentation.num_components);
    if let (Some(min), Some(max)) = (sizes.iter().min(), sizes.iter().max()) {
        println!("smallest {min} px");
        println!("largest {max} px");
    }

    Ok(())
}
