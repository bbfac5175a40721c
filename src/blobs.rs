use image::{GrayImage, Luma, RgbImage};
use imageproc::distance_transform::Norm;
use imageproc::region_labelling::{connected_components, Connectivity};
use serde::{Deserialize, Serialize};

use crate::Point;

/// A roughly circular region found in one frame. Ids are only unique within
/// the frame that produced them.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CandidateBlob {
    pub id: usize,
    pub center: Point,
    pub area: f64,
}

impl CandidateBlob {
    pub fn new(id: usize, center: Point, area: f64) -> Self {
        CandidateBlob { id, center, area }
    }

    pub fn x(&self) -> f64 {
        self.center.0
    }

    pub fn y(&self) -> f64 {
        self.center.1
    }

    /// Radius of the circle with the same area.
    pub fn radius(&self) -> f64 {
        (self.area / std::f64::consts::PI).sqrt()
    }
}

/// Anything that can turn a frame into circle candidates.
pub trait BlobSource {
    fn find_blobs(&self, frame: &RgbImage) -> Vec<CandidateBlob>;
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BlobParams {
    /// Pixels with luma at or below this value are marker ink.
    pub threshold: u8,
    /// Radius of the closing applied to the binary mask, 0 disables it.
    pub close_radius: u8,
    pub min_area: u32,
    pub max_area: u32,
    /// Allowed relative deviation of aspect ratio and fill ratio from a disc.
    pub circularity_tolerance: f64,
}

impl Default for BlobParams {
    fn default() -> Self {
        BlobParams {
            threshold: 80,
            close_radius: 1,
            min_area: 10,
            max_area: 20_000,
            circularity_tolerance: 0.25,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct ComponentStats {
    count: u32,
    sum_x: f64,
    sum_y: f64,
    min_x: u32,
    max_x: u32,
    min_y: u32,
    max_y: u32,
}

impl ComponentStats {
    fn empty() -> Self {
        ComponentStats {
            count: 0,
            sum_x: 0.0,
            sum_y: 0.0,
            min_x: u32::MAX,
            max_x: 0,
            min_y: u32::MAX,
            max_y: 0,
        }
    }

    fn add(&mut self, x: u32, y: u32) {
        self.count += 1;
        self.sum_x += x as f64;
        self.sum_y += y as f64;
        self.min_x = self.min_x.min(x);
        self.max_x = self.max_x.max(x);
        self.min_y = self.min_y.min(y);
        self.max_y = self.max_y.max(y);
    }

    fn center(&self) -> Point {
        (self.sum_x / self.count as f64, self.sum_y / self.count as f64)
    }

    fn is_circle(&self, tolerance: f64) -> bool {
        let w = (self.max_x - self.min_x + 1) as f64;
        let h = (self.max_y - self.min_y + 1) as f64;

        let aspect = w / h;
        let fill = self.count as f64 / (w * h);
        let disc_fill = std::f64::consts::FRAC_PI_4;

        (aspect - 1.0).abs() <= tolerance && (fill / disc_fill - 1.0).abs() <= tolerance
    }
}

/// Dark-blob detector: threshold, close, label, then keep the components
/// that look like filled discs.
#[derive(Debug, Clone, Copy, Default)]
pub struct ThresholdBlobDetector {
    pub params: BlobParams,
}

impl ThresholdBlobDetector {
    pub fn new(params: BlobParams) -> Self {
        ThresholdBlobDetector { params }
    }

    fn mask(&self, luma: &GrayImage) -> GrayImage {
        let mut mask = imageproc::contrast::threshold(luma, self.params.threshold);
        image::imageops::invert(&mut mask);

        if self.params.close_radius > 0 {
            imageproc::morphology::close(&mask, Norm::LInf, self.params.close_radius)
        } else {
            mask
        }
    }
}

impl BlobSource for ThresholdBlobDetector {
    fn find_blobs(&self, frame: &RgbImage) -> Vec<CandidateBlob> {
        let luma = image::imageops::grayscale(frame);
        let mask = self.mask(&luma);
        let labels = connected_components(&mask, Connectivity::Eight, Luma([0u8]));

        let mut components: Vec<ComponentStats> = vec![];
        for (x, y, label) in labels.enumerate_pixels() {
            let label = label[0] as usize;
            if label == 0 {
                continue;
            }
            if components.len() < label {
                components.resize(label, ComponentStats::empty());
            }
            components[label - 1].add(x, y);
        }

        let params = &self.params;
        let blobs = components
            .iter()
            .filter(|c| c.count >= params.min_area && c.count <= params.max_area)
            .filter(|c| c.is_circle(params.circularity_tolerance))
            .enumerate()
            .map(|(id, c)| CandidateBlob::new(id, c.center(), c.count as f64))
            .collect::<Vec<_>>();

        log::debug!("{} components, {} circular candidates", components.len(), blobs.len());

        blobs
    }
}
