use image::RgbImage;
use std::time::Instant;

pub mod annotate;
pub mod blobs;
pub mod config;
pub mod corners;
pub mod error;
pub mod perspective;
pub mod selection;
pub mod warp;
pub mod yuyv;

pub use blobs::{BlobParams, BlobSource, CandidateBlob, ThresholdBlobDetector};
pub use config::PipelineConfig;
pub use corners::{
    order_and_rectify, order_markers, CornerOffsets, FrameGeometry, OrderedCorner, RectificationMode,
    RectificationPlan,
};
pub use error::{RectifyError, Result};
pub use selection::{select_best_four, MarkerSet, ScoredCombination};
pub use warp::{PerspectiveWarp, WarpPrimitive};

/// Image-plane point, `(x, y)` in pixels.
pub type Point = (f64, f64);

#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessingTimes {
    pub blobs: std::time::Duration,
    pub geometry: std::time::Duration,
    pub warp: std::time::Duration,
}

/// Chosen markers for one frame, in corner order, and the plan built from them.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rectification {
    pub selection: ScoredCombination,
    pub corners: [OrderedCorner; 4],
    pub plan: RectificationPlan,
}

/// Select, order and plan from one frame's candidates.
pub fn rectify(candidates: &[CandidateBlob], frame: FrameGeometry, mode: RectificationMode) -> Result<Rectification> {
    let selection = select_best_four(candidates).ok_or(RectifyError::InsufficientCandidates {
        found: candidates.len(),
    })?;
    let corners = order_markers(&selection.markers, frame)?;
    let plan = mode.plan(&corners, frame);

    Ok(Rectification { selection, corners, plan })
}

pub struct Rectified {
    pub rectification: Rectification,
    pub image: RgbImage,
}

pub struct FrameReport {
    pub times: ProcessingTimes,
    pub candidates: Vec<CandidateBlob>,
    pub outcome: Result<Rectified>,
}

impl FrameReport {
    pub fn annotated(&self, frame: &RgbImage) -> RgbImage {
        let corners = self.outcome.as_ref().ok().map(|r| &r.rectification.corners);
        annotate::annotate(frame, &self.candidates, corners)
    }
}

pub struct Pipeline<B, W> {
    pub blobs: B,
    pub warp: W,
    pub mode: RectificationMode,
}

impl Pipeline<ThresholdBlobDetector, PerspectiveWarp> {
    pub fn from_config(config: &PipelineConfig) -> Self {
        Pipeline {
            blobs: ThresholdBlobDetector::new(config.blobs),
            warp: PerspectiveWarp,
            mode: config.mode,
        }
    }
}

impl<B: BlobSource, W: WarpPrimitive> Pipeline<B, W> {
    /// Run one frame end to end. Failures are scoped to this frame and
    /// reported in `outcome`; nothing carries over to the next call.
    pub fn process(&self, frame: &RgbImage) -> FrameReport {
        let mut times = ProcessingTimes::default();

        let mut time = Instant::now();
        let candidates = self.blobs.find_blobs(frame);
        times.blobs = time.elapsed();
        time = Instant::now();

        let rectification = rectify(&candidates, FrameGeometry::of(frame), self.mode);
        times.geometry = time.elapsed();
        time = Instant::now();

        let outcome = rectification.and_then(|rectification| {
            let image = self.warp.warp(frame, &rectification.plan)?;
            Ok(Rectified { rectification, image })
        });
        times.warp = time.elapsed();

        match &outcome {
            Ok(r) => log::info!(
                "{} candidates, markers {:?} (score {:.3})",
                candidates.len(),
                r.rectification.corners.map(|c| c.marker.id),
                r.rectification.selection.score,
            ),
            Err(e) => log::warn!("skipping frame: {}", e),
        }

        FrameReport { times, candidates, outcome }
    }
}
