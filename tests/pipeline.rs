use approx::assert_relative_eq;
use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_filled_circle_mut, draw_filled_rect_mut};
use imageproc::rect::Rect;
use regmarks::*;

const BLACK: Rgb<u8> = Rgb([0, 0, 0]);

fn target(width: u32, height: u32, marks: &[(i32, i32, i32)]) -> RgbImage {
    let mut frame = RgbImage::from_pixel(width, height, Rgb([255, 255, 255]));
    for &(x, y, r) in marks {
        draw_filled_circle_mut(&mut frame, (x, y), r, BLACK);
    }
    frame
}

#[test]
fn selects_and_orders_the_near_equal_markers() {
    let candidates = vec![
        CandidateBlob::new(0, (10.0, 10.0), 50.0),
        CandidateBlob::new(1, (90.0, 10.0), 48.0),
        CandidateBlob::new(2, (90.0, 90.0), 52.0),
        CandidateBlob::new(3, (10.0, 90.0), 49.0),
        CandidateBlob::new(4, (500.0, 500.0), 5.0),
    ];

    let r = rectify(&candidates, FrameGeometry::new(100.0, 100.0), RectificationMode::Heuristic).unwrap();

    assert!(r.selection.markers.iter().all(|m| m.id != 4));
    assert_relative_eq!(r.selection.score, 0.25);

    assert_eq!(r.corners.map(|c| c.marker.center), [(10.0, 10.0), (90.0, 10.0), (90.0, 90.0), (10.0, 90.0)]);

    let offsets = CornerOffsets::from_corners(&r.corners);
    assert_eq!(offsets.horz_start, 0.0);
    assert_eq!(offsets.vert_start, 0.0);

    assert_eq!(r.plan.source_corners, [(10.0, 10.0), (90.0, 10.0), (90.0, 90.0), (10.0, 90.0)]);
    assert_eq!(r.plan.dest_corners, [(0.0, 0.0), (100.0, 0.0), (100.0, 100.0), (0.0, 100.0)]);
}

#[test]
fn insufficient_and_degenerate_frames_are_errors() {
    let frame = FrameGeometry::new(100.0, 100.0);
    let three = vec![
        CandidateBlob::new(0, (10.0, 10.0), 50.0),
        CandidateBlob::new(1, (90.0, 10.0), 50.0),
        CandidateBlob::new(2, (90.0, 90.0), 50.0),
    ];
    assert!(matches!(
        rectify(&three, frame, RectificationMode::Heuristic),
        Err(RectifyError::InsufficientCandidates { found: 3 })
    ));

    let mut centred = three.clone();
    centred.push(CandidateBlob::new(3, (50.0, 50.0), 50.0));
    assert!(matches!(
        rectify(&centred, frame, RectificationMode::Homography),
        Err(RectifyError::DegenerateGeometry { id: 3 })
    ));
}

#[test]
fn rectifies_a_synthetic_target() {
    let mut frame = target(
        320,
        240,
        &[(40, 30, 8), (280, 30, 8), (280, 210, 8), (40, 210, 8), (100, 150, 4)],
    );
    draw_filled_rect_mut(&mut frame, Rect::at(200, 100).of_size(20, 20), BLACK);

    for mode in [RectificationMode::Heuristic, RectificationMode::Homography].iter() {
        let pipeline = Pipeline::from_config(&PipelineConfig {
            mode: *mode,
            ..PipelineConfig::default()
        });

        let report = pipeline.process(&frame);
        // the square is not circular enough to be a candidate
        assert_eq!(report.candidates.len(), 5);

        let rectified = report.outcome.unwrap();
        let centers = rectified.rectification.corners.map(|c| c.marker.center);
        let expected = [(40.0, 30.0), (280.0, 30.0), (280.0, 210.0), (40.0, 210.0)];
        for (c, e) in centers.iter().zip(expected.iter()) {
            assert_relative_eq!(c.0, e.0, epsilon = 1e-6);
            assert_relative_eq!(c.1, e.1, epsilon = 1e-6);
        }

        let image = rectified.image;
        assert_eq!(image.dimensions(), (320, 240));
        // marker centres land on the frame corners
        assert_eq!(image.get_pixel(0, 0), &BLACK);
        assert_eq!(image.get_pixel(319, 0), &BLACK);
        assert_eq!(image.get_pixel(0, 239), &BLACK);
        assert_eq!(image.get_pixel(160, 120), &Rgb([255, 255, 255]));
    }
}
