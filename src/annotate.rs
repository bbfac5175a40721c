use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_hollow_circle_mut, draw_line_segment_mut};

use crate::blobs::CandidateBlob;
use crate::corners::{FrameGeometry, OrderedCorner};

pub const CANDIDATE: Rgb<u8> = Rgb([255, 0, 0]);
pub const MARKER: Rgb<u8> = Rgb([0, 255, 255]);
pub const DATUM: Rgb<u8> = Rgb([255, 255, 0]);
pub const RAY: Rgb<u8> = Rgb([245, 245, 220]);

fn ring(image: &mut RgbImage, center: (f64, f64), radius: i32, width: i32, color: Rgb<u8>) {
    let center = (center.0.round() as i32, center.1.round() as i32);
    for r in radius..radius + width {
        draw_hollow_circle_mut(image, center, r, color);
    }
}

/// Debug overlay: every candidate in red, the datum line in yellow and,
/// once ordered, the chosen markers in cyan with a ray from the datum.
pub fn annotate(frame: &RgbImage, candidates: &[CandidateBlob], corners: Option<&[OrderedCorner; 4]>) -> RgbImage {
    let mut image = frame.clone();
    let geometry = FrameGeometry::of(frame);
    let left = geometry.left_datum();
    let right = geometry.right_datum();

    for candidate in candidates {
        ring(&mut image, candidate.center, 10, 2, CANDIDATE);
    }

    draw_line_segment_mut(&mut image, (left.0 as f32, left.1 as f32), (right.0 as f32, right.1 as f32), DATUM);

    if let Some(corners) = corners {
        for corner in corners.iter() {
            let center = corner.marker.center;
            ring(&mut image, center, 40, 6, MARKER);
            draw_line_segment_mut(&mut image, (right.0 as f32, right.1 as f32), (center.0 as f32, center.1 as f32), RAY);
        }
    }

    image
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn draws_datum_and_candidates() {
        let frame = RgbImage::new(200, 100);
        let candidates = [CandidateBlob::new(0, (150.0, 20.0), 30.0)];

        let annotated = annotate(&frame, &candidates, None);

        assert_eq!(annotated.get_pixel(20, 50), &DATUM);
        assert_eq!(annotated.get_pixel(160, 20), &CANDIDATE);
        assert_eq!(annotated.get_pixel(150, 20), &Rgb([0, 0, 0]));
        // the source frame is left alone
        assert_eq!(frame.get_pixel(20, 50), &Rgb([0, 0, 0]));
    }

    #[test]
    fn draws_selected_markers() {
        let frame = RgbImage::new(400, 300);
        let corners = [(60.0, 60.0), (340.0, 60.0), (340.0, 240.0), (60.0, 240.0)]
            .map(|p| OrderedCorner { angle: 0.0, marker: CandidateBlob::new(0, p, 30.0) });

        let annotated = annotate(&frame, &[], Some(&corners));

        assert_eq!(annotated.get_pixel(100, 60), &MARKER);
        assert_eq!(annotated.get_pixel(60, 200), &MARKER);
    }
}
