//! parking-monitor - reports whether a parking space is vacant or full
//!
//! Frames are replayed from image files through a camera session. Verdicts
//! are handed to a display thread which prints the status line and, when
//! asked, writes the annotated frames to disk.

use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::thread;

use anyhow::{Context, Result, anyhow};
use clap::Parser;
use image::RgbImage;

use parking_occupancy::{
    CameraSession, FrameSource, ImageSequenceSource, MonitorConfig, OccupancyAnalyzer,
    SessionError, SourceError, StatusUpdate, drawing::draw_contours_debug,
};

#[derive(Parser, Debug)]
#[command(name = "parking-monitor", version, about)]
struct Args {
    /// TOML configuration file; `PARKING_CONFIG` is used when omitted.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Image files or directories of images to replay, in order.
    #[arg(long, num_args = 1.., required = true)]
    frames: Vec<PathBuf>,

    /// Directory for annotated frames.
    #[arg(long)]
    annotated_out: Option<PathBuf>,

    /// Directory for threshold masks with every contour outlined.
    #[arg(long)]
    mask_out: Option<PathBuf>,

    /// Stop after this many frames.
    #[arg(long)]
    max_frames: Option<u64>,

    /// Log filter used when RUST_LOG is unset.
    #[arg(long, default_value = "info")]
    log_level: String,
}

/// Passes frames through and writes each frame's contour debug view.
struct MaskDumpSource {
    inner: ImageSequenceSource,
    analyzer: OccupancyAnalyzer,
    dir: Option<PathBuf>,
    grabbed: u64,
}

impl FrameSource for MaskDumpSource {
    fn open(&mut self) -> Result<(), SourceError> {
        self.inner.open()
    }

    fn grab(&mut self) -> Result<Option<RgbImage>, SourceError> {
        let frame = self.inner.grab()?;
        if let (Some(dir), Some(frame)) = (&self.dir, &frame) {
            self.grabbed += 1;
            let mask = self.analyzer.mask(frame);
            let contours = self.analyzer.contours_in_mask(&mask);
            let path = numbered(dir, self.grabbed);
            if let Err(e) = draw_contours_debug(&mask, &contours).save(&path) {
                log::warn!("failed to write mask {}: {}", path.display(), e);
            }
        }
        Ok(frame)
    }

    fn release(&mut self) {
        self.inner.release();
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(args.log_level.as_str()),
    )
    .init();

    let cfg = MonitorConfig::load(args.config.as_deref()).context("loading configuration")?;
    log::info!(
        "camera {}: gray range {}..={}, slot rank {}, full above {}%",
        cfg.camera_index,
        cfg.analyzer.min_gray,
        cfg.analyzer.max_gray,
        cfg.analyzer.rules.slot_rank,
        cfg.analyzer.rules.min_percentage_covered
    );

    for dir in [&args.annotated_out, &args.mask_out].into_iter().flatten() {
        std::fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
    }

    let analyzer = OccupancyAnalyzer::new(cfg.analyzer);
    let frames = ImageSequenceSource::from_paths(&args.frames)?;
    log::info!("replaying {} frame(s)", frames.len());
    let source = MaskDumpSource {
        inner: frames,
        analyzer: analyzer.clone(),
        dir: args.mask_out.clone(),
        grabbed: 0,
    };

    let (tx, rx) = mpsc::channel();
    let annotated_out = args.annotated_out.clone();
    let display = thread::spawn(move || -> Result<()> {
        for update in rx {
            match update {
                StatusUpdate::Verdict {
                    frame_number,
                    report,
                    annotated,
                } => {
                    println!(
                        "[{frame_number:>5}] {} ({:.2}% covered)",
                        report.verdict, report.percentage_covered
                    );
                    if let Some(dir) = &annotated_out {
                        let path = numbered(dir, frame_number);
                        annotated
                            .save(&path)
                            .with_context(|| format!("writing {}", path.display()))?;
                    }
                }
                StatusUpdate::Cleared => println!(),
            }
        }
        Ok(())
    });

    let mut session = CameraSession::new(cfg.camera_index, source, analyzer, tx);
    let outcome = run(&mut session, args.max_frames);
    let stopped = session.stop();
    // Closes the channel so the display thread drains and exits.
    drop(session);

    let displayed = display
        .join()
        .map_err(|_| anyhow!("display thread panicked"))?;
    settle(displayed, outcome, stopped)
}

/// Picks the error to report once the session and the display are done.
///
/// A failing display drops its receiver, which the session only sees as a
/// disconnect, so the display's own error is reported first.
fn settle(
    displayed: Result<()>,
    outcome: Result<()>,
    stopped: Result<(), SessionError>,
) -> Result<()> {
    displayed.context("status display failed")?;
    outcome?;
    stopped?;
    Ok(())
}

fn run(session: &mut CameraSession<MaskDumpSource>, max_frames: Option<u64>) -> Result<()> {
    session.start()?;
    while max_frames.is_none_or(|max| session.frames_processed() < max) {
        if session.process_next()?.is_none() {
            break;
        }
    }
    log::info!("processed {} frame(s)", session.frames_processed());
    Ok(())
}

fn numbered(dir: &Path, frame_number: u64) -> PathBuf {
    dir.join(format!("frame_{frame_number:06}.png"))
}
