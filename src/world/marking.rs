//! Road markings
//!
//! A marking is a small rectangle centered on a lane and aligned with the
//! road direction. Stop and yield markings also expose the line cars should
//! halt at.

use serde::{Deserialize, Serialize};

use crate::geometry::{Envelope, Point, Polygon, Segment};
use crate::graph::OneWayConvention;
use crate::persistence::MarkingRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarkingKind {
    Crossing,
    Light,
    Parking,
    Start,
    Stop,
    Target,
    Yield,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(from = "MarkingRecord", into = "MarkingRecord")]
pub struct Marking {
    pub center: Point,
    pub direction: Point,
    pub width: f64,
    pub height: f64,
    pub kind: MarkingKind,
    support: Segment,
    poly: Polygon,
}

impl Marking {
    pub fn new(center: Point, direction: Point, width: f64, height: f64, kind: MarkingKind) -> Self {
        let angle = direction.angle();
        let support = Segment::new(
            center.translate(angle, height / 2.0),
            center.translate(angle, -height / 2.0),
        );
        let poly = Envelope::new(support, width, 0).poly;
        Self {
            center,
            direction,
            width,
            height,
            kind,
            support,
            poly,
        }
    }

    #[inline]
    pub fn support(&self) -> &Segment {
        &self.support
    }

    #[inline]
    pub fn poly(&self) -> &Polygon {
        &self.poly
    }

    /// Heading a car should have when parked on this marking
    pub fn heading(&self) -> f64 {
        -self.direction.angle() + std::f64::consts::FRAC_PI_2
    }

    /// Line across the lane where cars halt, for stop and yield markings.
    /// Which end of the rectangle that is depends on the driving side.
    pub fn border(&self, convention: OneWayConvention) -> Option<Segment> {
        if !matches!(self.kind, MarkingKind::Stop | MarkingKind::Yield) {
            return None;
        }
        let idx = match convention {
            OneWayConvention::FromP1 => 2,
            OneWayConvention::FromP2 => 0,
        };
        self.poly.segments().get(idx).copied()
    }
}
