//! Tree placement
//!
//! Trees are scattered by rejection sampling: keep off roads and buildings,
//! keep apart from each other, but stay close enough to something that the
//! scenery hugs the city instead of filling empty fields.

use std::f64::consts::PI;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::consts::{TREE_CLOSENESS_FACTOR, TREE_MAX_TRIES};
use crate::geometry::polygon::bounds_of;
use crate::geometry::{Point, Polygon};
use crate::lerp;
use crate::persistence::TreeRecord;
use crate::settings::WorldSettings;

/// Vertices of a tree outline
const TREE_SIDES: usize = 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TreeKind {
    Pine,
    #[default]
    Broadleaf,
    Dead,
}

impl TreeKind {
    /// How far the outline may dip below the nominal radius (1 = circle)
    pub fn noise(&self) -> f64 {
        match self {
            TreeKind::Pine => 0.5,
            TreeKind::Broadleaf => 0.8,
            TreeKind::Dead => 1.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(from = "TreeRecord", into = "TreeRecord")]
pub struct Tree {
    pub center: Point,
    pub size: f64,
    pub kind: TreeKind,
    pub height: f64,
    base: Polygon,
}

impl Tree {
    pub fn new(center: Point, size: f64, kind: TreeKind, height: f64) -> Self {
        let mut tree = Self {
            center,
            size,
            kind,
            height,
            base: Polygon::new(Vec::new()),
        };
        tree.base = tree.level(center, size, kind.noise());
        tree
    }

    /// Ground footprint
    #[inline]
    pub fn base(&self) -> &Polygon {
        &self.base
    }

    /// Noisy outline of diameter `size` around `point`.
    ///
    /// The noise depends only on the tree's x coordinate and the size, so a
    /// tree redraws identically every frame.
    pub fn level(&self, point: Point, size: f64, noise: f64) -> Polygon {
        let rad = size / 2.0;
        let points = (0..TREE_SIDES)
            .map(|i| {
                let a = i as f64 * 2.0 * PI / TREE_SIDES as f64;
                let wobble = (((a + self.center.x) * size) % 17.0).cos().powi(2);
                point.translate(a, rad * lerp(noise, 1.0, wobble))
            })
            .collect();
        Polygon::new(points)
    }
}

/// Scatter trees inside the bounds of `anchors`, avoiding `illegal` polygons
pub(crate) fn generate<R: Rng + ?Sized>(
    anchors: &[Point],
    illegal: &[&Polygon],
    settings: &WorldSettings,
    rng: &mut R,
) -> Vec<Tree> {
    let Some((min, max)) = bounds_of(anchors.iter().copied()) else {
        return Vec::new();
    };
    let size = settings.tree_size;
    let max_count = settings.max_tree_count.unwrap_or_else(|| {
        let dx = max.x - min.x;
        let dy = max.y - min.y;
        (dx / (size * 2.0) + dy / (size * 2.0)).floor() as usize
    });
    let reach = settings
        .tree_closeness
        .unwrap_or(size * TREE_CLOSENESS_FACTOR);

    let mut trees: Vec<Tree> = Vec::new();
    let mut misses = 0;
    while trees.len() < max_count && misses < TREE_MAX_TRIES {
        let p = Point::new(
            lerp(min.x, max.x, rng.random::<f64>()),
            lerp(max.y, min.y, rng.random::<f64>()),
        );

        let clear_of_city = illegal
            .iter()
            .all(|poly| !poly.contains_point(p) && poly.distance_to_point(p) >= size / 2.0);
        let clear_of_trees = trees.iter().all(|t| t.center.distance(p) >= size);
        let near_city = illegal.iter().any(|poly| poly.distance_to_point(p) < reach);

        if clear_of_city && clear_of_trees && near_city {
            trees.push(Tree::new(p, size, settings.tree_kind, settings.tree_height));
            misses = 0;
        } else {
            misses += 1;
        }
    }
    log::debug!("placed {} of at most {} trees", trees.len(), max_count);
    trees
}
