use image::RgbImage;
use nalgebra::Vector3;
use rayon::prelude::*;

use crate::corners::RectificationPlan;
use crate::error::{RectifyError, Result};
use crate::perspective;

/// Resamples a frame so that each source corner of the plan lands on the
/// matching destination corner.
pub trait WarpPrimitive {
    fn warp(&self, frame: &RgbImage, plan: &RectificationPlan) -> Result<RgbImage>;
}

/// Nearest-neighbour perspective warp. The output has the frame's size and
/// pixels that map outside the source stay black.
#[derive(Debug, Clone, Copy, Default)]
pub struct PerspectiveWarp;

impl WarpPrimitive for PerspectiveWarp {
    fn warp(&self, frame: &RgbImage, plan: &RectificationPlan) -> Result<RgbImage> {
        // output pixel -> source pixel
        let c = perspective::calculate(&plan.dest_corners, &plan.source_corners)
            .ok_or(RectifyError::SingularHomography)?;

        let (width, height) = frame.dimensions();
        let mut output = RgbImage::new(width, height);

        output
            .par_chunks_mut(width as usize * 3)
            .enumerate()
            .for_each(|(y, row)| {
                for x in 0..width as usize {
                    let p = c * Vector3::new(x as f64, y as f64, 1.0);
                    if p[2] == 0.0 {
                        continue;
                    }

                    let px = (p[0] / p[2]).round();
                    let py = (p[1] / p[2]).round();

                    if 0.0 <= px && px < width as f64 && 0.0 <= py && py < height as f64 {
                        let pixel = frame.get_pixel(px as u32, py as u32);
                        row[x * 3..x * 3 + 3].copy_from_slice(&pixel.0);
                    }
                }
            });

        Ok(output)
    }
}
