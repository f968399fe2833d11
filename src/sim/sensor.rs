//! Ray-cast distance sensor
//!
//! A fan of rays in front of the car. Each ray reports the nearest thing it
//! touches as an offset in [0, 1] along the ray.

use serde::{Deserialize, Serialize};

use crate::geometry::{Intersection, Point, Polygon, Segment, get_intersection};
use crate::lerp;
use crate::settings::SensorSettings;

/// Nearest hit along a ray
pub type Reading = Intersection;

/// What a sensor reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SensorKind {
    /// Road borders, traffic and marking lines
    #[default]
    Obstacles,
    /// Marking lines only (stop and yield lines)
    Markings,
}

/// Geometry a sensor can see during one update
#[derive(Debug, Clone, Copy, Default)]
pub struct SensorTargets<'a> {
    pub borders: &'a [Segment],
    pub traffic: &'a [Polygon],
    pub markings: &'a [Segment],
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sensor {
    pub ray_count: usize,
    pub ray_length: f64,
    pub ray_spread: f64,
    #[serde(default)]
    pub ray_offset: f64,
    #[serde(default)]
    pub kind: SensorKind,
    #[serde(skip)]
    rays: Vec<Segment>,
    #[serde(skip)]
    readings: Vec<Option<Reading>>,
}

impl Sensor {
    pub fn new(ray_count: usize, ray_length: f64, ray_spread: f64, ray_offset: f64) -> Self {
        Self {
            ray_count,
            ray_length,
            ray_spread,
            ray_offset,
            kind: SensorKind::Obstacles,
            rays: Vec::new(),
            readings: Vec::new(),
        }
    }

    pub fn from_settings(settings: &SensorSettings) -> Self {
        Self::new(
            settings.ray_count,
            settings.ray_length,
            settings.ray_spread,
            settings.ray_offset,
        )
    }

    pub fn with_kind(mut self, kind: SensorKind) -> Self {
        self.kind = kind;
        self
    }

    /// Rays cast by the last update
    #[inline]
    pub fn rays(&self) -> &[Segment] {
        &self.rays
    }

    /// One entry per ray; `None` when the ray hit nothing
    #[inline]
    pub fn readings(&self) -> &[Option<Reading>] {
        &self.readings
    }

    /// Per-ray closeness: `1 - offset`, 0 when nothing is in range
    pub fn closeness(&self) -> Vec<f64> {
        self.readings
            .iter()
            .map(|r| r.map_or(0.0, |r| 1.0 - r.offset))
            .collect()
    }

    /// Recast the fan from `origin` with heading `angle`
    pub fn update(&mut self, origin: Point, angle: f64, targets: &SensorTargets<'_>) {
        self.cast_rays(origin, angle);
        let kind = self.kind;
        self.readings = self
            .rays
            .iter()
            .map(|ray| Self::reading(ray, kind, targets))
            .collect();
    }

    fn cast_rays(&mut self, origin: Point, angle: f64) {
        self.rays.clear();
        for i in 0..self.ray_count {
            let t = if self.ray_count == 1 {
                0.5
            } else {
                i as f64 / (self.ray_count - 1) as f64
            };
            let ray_angle =
                lerp(self.ray_spread / 2.0, -self.ray_spread / 2.0, t) + angle + self.ray_offset;
            let end = Point::new(
                origin.x - ray_angle.sin() * self.ray_length,
                origin.y - ray_angle.cos() * self.ray_length,
            );
            self.rays.push(Segment::new(origin, end));
        }
    }

    fn reading(ray: &Segment, kind: SensorKind, targets: &SensorTargets<'_>) -> Option<Reading> {
        let hit = |seg: &Segment| get_intersection(ray.p1, ray.p2, seg.p1, seg.p2);

        let markings = targets.markings.iter().filter_map(hit);
        let touches: Vec<Reading> = match kind {
            SensorKind::Markings => markings.collect(),
            SensorKind::Obstacles => targets
                .borders
                .iter()
                .chain(targets.traffic.iter().flat_map(Polygon::segments))
                .filter_map(hit)
                .chain(markings)
                .collect(),
        };

        touches
            .into_iter()
            .min_by(|a, b| a.offset.total_cmp(&b.offset))
    }
}

impl Default for Sensor {
    fn default() -> Self {
        Self::from_settings(&SensorSettings::default())
    }
}
