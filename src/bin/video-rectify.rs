use clap::Parser;
use regmarks::*;
use std::path::PathBuf;
use std::time::Instant;
use v4l::io::traits::CaptureStream;
use v4l::video::Capture;

type CliResult<T> = std::result::Result<T, Box<dyn std::error::Error>>;

/// Rectify webcam frames using the four registration marks on the target.
#[derive(Parser)]
#[command(version)]
struct Args {
    /// V4L2 device index.
    #[arg(long, default_value = "0")]
    device: usize,

    #[arg(long, default_value = "outputs")]
    out: PathBuf,

    #[arg(long)]
    config: Option<PathBuf>,

    #[arg(long)]
    mode: Option<RectificationMode>,

    /// Write the latest rectified frame every N frames.
    #[arg(long, default_value = "30")]
    save_every: u64,

    /// Stop after this many frames.
    #[arg(long)]
    max_frames: Option<u64>,
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

    std::fs::create_dir_all(&args.out)?;
    let pipeline = Pipeline::from_config(&config);

    let mut dev = v4l::Device::new(args.device)?;
    let format = dev.format()?;
    log::info!("{}x{} {}", format.width, format.height, format.fourcc);

    for format in dev.enum_formats()? {
        log::debug!("  {} ({})", format.fourcc, format.description);
    }

    let mut stream = v4l::io::mmap::Stream::with_buffers(&mut dev, v4l::buffer::Type::VideoCapture, 4)?;

    let mut count = 0u64;
    loop {
        if args.max_frames.map_or(false, |max| count >= max) {
            break;
        }
        count += 1;

        let t = Instant::now();
        let (buffer, meta) = stream.next()?;
        let sequence = meta.sequence;

        let frame = match yuyv::to_rgb(buffer, format.width, format.height) {
            Some(frame) => frame,
            None => {
                log::warn!("frame {}: short buffer ({} bytes)", sequence, buffer.len());
                continue;
            }
        };

        let report = pipeline.process(&frame);
        log::debug!(
            "frame {}: blobs {:?}, geometry {:?}, warp {:?}, total {:?}",
            sequence,
            report.times.blobs,
            report.times.geometry,
            report.times.warp,
            t.elapsed(),
        );

        if count % args.save_every.max(1) != 0 {
            continue;
        }

        if config.annotate {
            report.annotated(&frame).save(args.out.join("latest.annotated.png"))?;
        }
        if let Ok(rectified) = &report.outcome {
            rectified.image.save(args.out.join("latest.rectified.png"))?;
        }
    }

    Ok(())
}
