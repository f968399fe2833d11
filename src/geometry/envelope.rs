//! Envelope geometry
//!
//! An envelope is the offset polygon around a skeleton segment: two
//! half-circle fans (one per endpoint) joined into a capsule. The number of
//! steps per half-circle is the roundness; roundness 0 or 1 gives a plain
//! quadrilateral.

use std::f64::consts::{FRAC_PI_2, PI};

use serde::{Deserialize, Serialize};

use super::polygon::Polygon;
use super::segment::Segment;

/// Offset polygon generated around a skeleton segment
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope {
    /// Source segment
    pub skeleton: Segment,
    /// Generated boundary
    pub poly: Polygon,
}

impl Envelope {
    /// Build the envelope of `skeleton` with full `width` (radius = width / 2)
    pub fn new(skeleton: Segment, width: f64, roundness: u32) -> Self {
        let poly = Self::generate_polygon(&skeleton, width, roundness);
        Self { skeleton, poly }
    }

    fn generate_polygon(skeleton: &Segment, width: f64, roundness: u32) -> Polygon {
        let Segment { p1, p2, .. } = *skeleton;

        let radius = width / 2.0;
        let alpha = (p1 - p2).angle();
        let alpha_cw = alpha + FRAC_PI_2;
        let alpha_ccw = alpha - FRAC_PI_2;

        let step = PI / f64::from(roundness.max(1));
        // Half a step of slack so float drift never drops the closing point
        let limit = alpha_cw + step / 2.0;

        let mut points = Vec::with_capacity(2 * (roundness.max(1) as usize + 1));
        let mut theta = alpha_ccw;
        while theta <= limit {
            points.push(p1.translate(theta, radius));
            theta += step;
        }
        let mut theta = alpha_ccw;
        while theta <= limit {
            points.push(p2.translate(PI + theta, radius));
            theta += step;
        }

        Polygon::new(points)
    }
}
