use serde::{Deserialize, Serialize};

use crate::blobs::CandidateBlob;
use crate::error::{RectifyError, Result};
use crate::selection::MarkerSet;
use crate::Point;

const MIN_SIDE: f64 = 1e-9;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FrameGeometry {
    pub width: f64,
    pub height: f64,
}

impl FrameGeometry {
    pub fn new(width: f64, height: f64) -> Self {
        FrameGeometry { width, height }
    }

    pub fn of(frame: &image::RgbImage) -> Self {
        FrameGeometry::new(frame.width() as f64, frame.height() as f64)
    }

    /// Left end of the datum line, on the left edge at mid-height.
    pub fn left_datum(&self) -> Point {
        (0.0, self.height / 2.0)
    }

    /// Right end of the datum line, at the centre of the frame.
    pub fn right_datum(&self) -> Point {
        (self.width / 2.0, self.height / 2.0)
    }
}

fn distance(a: Point, b: Point) -> f64 {
    ((a.0 - b.0).powi(2) + (a.1 - b.1).powi(2)).sqrt()
}

/// Angle in degrees at `right` between the rays towards `left` and `p`,
/// folded into 0..360 by which side of the datum `p` lies on.
///
/// `None` when the cosine rule would divide by zero.
pub fn datum_angle(left: Point, right: Point, p: Point) -> Option<f64> {
    let lr = distance(left, right);
    let rp = distance(right, p);
    let lp = distance(left, p);

    if !(lr.is_finite() && rp.is_finite() && lp.is_finite()) || lr < MIN_SIDE || rp < MIN_SIDE {
        return None;
    }

    let cos = ((lr * lr + rp * rp - lp * lp) / (2.0 * lr * rp)).clamp(-1.0, 1.0);
    let angle = cos.acos().to_degrees();

    Some(if p.1 < right.1 {
        angle
    } else if p.0 > right.0 {
        angle + 90.0
    } else {
        angle + 90.0 + 180.0
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct OrderedCorner {
    pub angle: f64,
    pub marker: CandidateBlob,
}

/// Sort the markers by datum angle. For a roughly axis-aligned target this
/// yields top-left, top-right, bottom-right, bottom-left.
pub fn order_markers(markers: &MarkerSet, frame: FrameGeometry) -> Result<[OrderedCorner; 4]> {
    let left = frame.left_datum();
    let right = frame.right_datum();

    let mut ordered = Vec::with_capacity(4);
    for marker in markers.iter() {
        let angle = datum_angle(left, right, marker.center)
            .ok_or(RectifyError::DegenerateGeometry { id: marker.id })?;
        log::debug!("marker {} at {:?}: {:.1} degrees", marker.id, marker.center, angle);

        ordered.push(OrderedCorner { angle, marker: *marker });
    }

    ordered.sort_by(|a, b| a.angle.total_cmp(&b.angle));

    Ok([ordered[0], ordered[1], ordered[2], ordered[3]])
}

/// How far the observed quadrilateral is from a frame-aligned rectangle,
/// assuming only a small skew.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CornerOffsets {
    pub horz_start: f64,
    pub vert_start: f64,
    pub horz_adjust: f64,
    pub vert_adjust: f64,
}

impl CornerOffsets {
    pub fn from_corners(corners: &[OrderedCorner; 4]) -> Self {
        let [tl, tr, br, bl] = corners.map(|c| c.marker.center);

        CornerOffsets {
            horz_start: tl.0 - bl.0,
            vert_start: tl.1 - tr.1,
            horz_adjust: (tr.0 - br.0) - (tl.0 - bl.0),
            vert_adjust: (tl.1 - tr.1) - (bl.1 - br.1),
        }
    }
}

/// Control points handed to the warp: `source_corners[i]` ends up at
/// `dest_corners[i]`, both ordered TL, TR, BR, BL.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RectificationPlan {
    pub source_corners: [Point; 4],
    pub dest_corners: [Point; 4],
}

impl RectificationPlan {
    /// Flat list of destination corners followed by source corners.
    pub fn control_points(&self) -> [Point; 8] {
        let d = self.dest_corners;
        let s = self.source_corners;
        [d[0], d[1], d[2], d[3], s[0], s[1], s[2], s[3]]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RectificationMode {
    /// Offset model derived from the marker spacing. Only approximate: it
    /// mixes horizontal and vertical skew, so one corner usually lands off.
    Heuristic,
    /// Map the marker centres straight onto the frame corners.
    Homography,
}

impl Default for RectificationMode {
    fn default() -> Self {
        RectificationMode::Heuristic
    }
}

impl std::str::FromStr for RectificationMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "heuristic" => Ok(RectificationMode::Heuristic),
            "homography" => Ok(RectificationMode::Homography),
            other => Err(format!("unknown rectification mode '{}'", other)),
        }
    }
}

impl RectificationMode {
    pub fn plan(&self, corners: &[OrderedCorner; 4], frame: FrameGeometry) -> RectificationPlan {
        match self {
            RectificationMode::Heuristic => heuristic_plan(corners, frame),
            RectificationMode::Homography => homography_plan(corners, frame),
        }
    }
}

pub fn heuristic_plan(corners: &[OrderedCorner; 4], frame: FrameGeometry) -> RectificationPlan {
    let o = CornerOffsets::from_corners(corners);
    log::debug!("corner offsets {:?}", o);

    let (w, h) = (frame.width, frame.height);
    let dest_corners = [
        (-o.horz_start, -o.vert_start),
        (w, o.vert_start),
        (w + o.horz_start + o.horz_adjust, h + o.vert_start - o.vert_adjust),
        (-o.horz_start, h + o.vert_start),
    ];

    let source_corners = corners.map(|c| (c.marker.x() - o.vert_start, c.marker.y()));

    RectificationPlan { source_corners, dest_corners }
}

pub fn homography_plan(corners: &[OrderedCorner; 4], frame: FrameGeometry) -> RectificationPlan {
    let (w, h) = (frame.width, frame.height);

    RectificationPlan {
        source_corners: corners.map(|c| c.marker.center),
        dest_corners: [(0.0, 0.0), (w, 0.0), (w, h), (0.0, h)],
    }
}

/// Order the markers and build the offset-model plan for a frame.
pub fn order_and_rectify(markers: &MarkerSet, frame_width: f64, frame_height: f64) -> Result<RectificationPlan> {
    let frame = FrameGeometry::new(frame_width, frame_height);
    let corners = order_markers(markers, frame)?;

    Ok(heuristic_plan(&corners, frame))
}
