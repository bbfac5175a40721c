use clap::Parser;
use rayon::prelude::*;
use regmarks::*;
use std::path::{Path, PathBuf};
use std::time::Instant;

type CliResult<T> = std::result::Result<T, Box<dyn std::error::Error>>;

/// Find the four registration marks in still images and rectify them.
#[derive(Parser)]
#[command(version)]
struct Args {
    /// An image, or a directory of images.
    input: PathBuf,

    #[arg(long, default_value = "outputs")]
    out: PathBuf,

    /// JSON file with pipeline settings.
    #[arg(long)]
    config: Option<PathBuf>,

    /// heuristic or homography
    #[arg(long)]
    mode: Option<RectificationMode>,

    /// Luma threshold for marker ink.
    #[arg(long)]
    threshold: Option<u8>,

    /// Also write the debug overlay.
    #[arg(long)]
    annotate: bool,

    /// Also write the rectification plan as JSON.
    #[arg(long)]
    plan: bool,
}

fn process_file(pipeline: &Pipeline<ThresholdBlobDetector, PerspectiveWarp>, path: &Path, args: &Args, annotate: bool) -> Result<()> {
    let frame = image::open(path)?.to_rgb8();
    let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or("frame");

    let time = Instant::now();
    let report = pipeline.process(&frame);

    log::info!("[{:?}] blobs", report.times.blobs);
    log::info!("[{:?}] geometry", report.times.geometry);
    log::info!("[{:?}] warp", report.times.warp);
    log::info!("[{:?}] processed {:?}", time.elapsed(), path);

    if annotate {
        report.annotated(&frame).save(args.out.join(format!("{}.annotated.png", stem)))?;
    }

    let rectified = report.outcome?;
    rectified.image.save(args.out.join(format!("{}.rectified.png", stem)))?;

    if args.plan {
        let file = std::fs::File::create(args.out.join(format!("{}.plan.json", stem)))?;
        serde_json::to_writer_pretty(file, &rectified.rectification.plan)?;
    }

    Ok(())
}

fn main() -> CliResult<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => PipelineConfig::load(path)?,
        None => PipelineConfig::default(),
    };
    if let Some(mode) = args.mode {
        config.mode = mode;
    }
    if let Some(threshold) = args.threshold {
        config.blobs.threshold = threshold;
    }
    let annotate = config.annotate || args.annotate;

    std::fs::create_dir_all(&args.out)?;

    let paths = if args.input.is_dir() {
        let mut paths = std::fs::read_dir(&args.input)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|p| p.is_file())
            .collect::<Vec<_>>();
        paths.sort();
        paths
    } else {
        vec![args.input.clone()]
    };

    let pipeline = Pipeline::from_config(&config);

    let failures = paths
        .par_iter()
        .filter(|path| match process_file(&pipeline, path, &args, annotate) {
            Ok(()) => false,
            Err(e) => {
                log::warn!("{:?}: {}", path, e);
                true
            }
        })
        .count();

    log::info!("{} of {} images rectified", paths.len() - failures, paths.len());

    Ok(())
}
