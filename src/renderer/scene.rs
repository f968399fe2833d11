//! Per-frame scene generation
//!
//! Flattens the world and the cars into draw primitives. Buildings and trees
//! get a fake 3D lift toward the viewpoint and are ordered far to near so a
//! painter's-algorithm renderer can draw them in sequence.

use std::f64::consts::FRAC_PI_2;

use crate::geometry::{Envelope, Point, Polygon, Segment};
use crate::graph::OneWayConvention;
use crate::lerp;
use crate::sim::Car;
use crate::world::{Building, Marking, MarkingKind, Tree, TreeKind, World};

/// RGBA, 0-1 per channel
pub type Color = [f32; 4];

pub const ROAD: Color = [0.73, 0.73, 0.73, 1.0];
pub const WHITE: Color = [1.0, 1.0, 1.0, 1.0];
pub const BUILDING: Color = [0.85, 0.85, 0.85, 1.0];
pub const ROOF: Color = [0.83, 0.35, 0.3, 1.0];
pub const TRUNK: Color = [0.58, 0.38, 0.2, 1.0];
pub const DEAD_WOOD: Color = [0.5, 0.5, 0.5, 1.0];
pub const CAR: Color = [0.0, 0.0, 0.0, 1.0];
pub const DAMAGED: Color = [0.5, 0.5, 0.5, 1.0];
pub const RAY: Color = [1.0, 1.0, 0.0, 1.0];
pub const RAY_BLOCKED: Color = [0.0, 0.0, 0.0, 1.0];
pub const TARGET_RED: Color = [1.0, 0.0, 0.0, 1.0];
const LAMP_GREEN: Color = [0.0, 0.4, 0.0, 1.0];
const LAMP_YELLOW: Color = [0.4, 0.4, 0.0, 1.0];
const LAMP_RED: Color = [0.4, 0.0, 0.0, 1.0];
const LAMP_HOUSING: Color = [0.1, 0.1, 0.1, 1.0];

/// Canopy layers per tree, trunk included
const TREE_LEVELS: usize = 10;
/// Distance at which the fake 3D lift reaches half its height
const PERSPECTIVE_DISTANCE: f64 = 300.0;

#[derive(Debug, Clone, PartialEq)]
pub enum Primitive {
    Polygon {
        points: Vec<Point>,
        fill: Color,
    },
    Line {
        from: Point,
        to: Point,
        width: f64,
        color: Color,
        dashed: bool,
    },
    Dot {
        center: Point,
        size: f64,
        color: Color,
    },
    Label {
        at: Point,
        angle: f64,
        size: f64,
        text: &'static str,
        color: Color,
    },
}

/// A building or tree with its distance to the viewpoint
#[derive(Debug, Clone)]
pub struct Item {
    pub distance: f64,
    pub primitives: Vec<Primitive>,
}

#[derive(Debug, Clone)]
pub struct CarShape {
    pub hitbox: Vec<Point>,
    pub damaged: bool,
    /// Ray segments split at the reading, if any
    pub rays: Vec<Primitive>,
    pub readings: Vec<Option<Point>>,
}

/// Everything a renderer needs for one frame
#[derive(Debug, Clone)]
pub struct Scene<'a> {
    pub viewpoint: Point,
    pub envelopes: &'a [Envelope],
    pub road_borders: &'a [Segment],
    pub lane_guides: &'a [Segment],
    pub markings: Vec<Primitive>,
    /// Sorted far to near
    pub items: Vec<Item>,
    pub cars: Vec<CarShape>,
}

impl<'a> Scene<'a> {
    pub fn build(world: &'a World, cars: &[Car], viewpoint: Point) -> Self {
        let convention = world.graph.convention();
        let markings = world
            .markings
            .iter()
            .flat_map(|m| marking_primitives(m, convention))
            .collect();

        let mut items: Vec<Item> = world
            .buildings
            .iter()
            .map(|b| building_item(b, viewpoint))
            .chain(world.trees.iter().map(|t| tree_item(t, viewpoint)))
            .collect();
        items.sort_by(|a, b| b.distance.total_cmp(&a.distance));

        Self {
            viewpoint,
            envelopes: &world.envelopes,
            road_borders: &world.road_borders,
            lane_guides: &world.lane_guides,
            markings,
            items,
            cars: cars.iter().map(car_shape).collect(),
        }
    }
}

/// Lift `point` by `height`, leaning away from the viewpoint
pub fn fake_3d(point: Point, viewpoint: Point, height: f64) -> Point {
    let dir = (point - viewpoint).normalize();
    let dist = point.distance(viewpoint);
    let scaler = (dist / PERSPECTIVE_DISTANCE).atan() / FRAC_PI_2;
    point + dir * (height * scaler)
}

fn marking_primitives(marking: &Marking, convention: OneWayConvention) -> Vec<Primitive> {
    let center = marking.center;
    let perp = marking.direction.perpendicular();
    let across = Segment::new(
        center + perp * (marking.width / 2.0),
        center - perp * (marking.width / 2.0),
    );
    let text_angle = marking.direction.angle() - FRAC_PI_2;
    let border_line = |dashed: bool| {
        marking.border(convention).map(|b| Primitive::Line {
            from: b.p1,
            to: b.p2,
            width: 5.0,
            color: WHITE,
            dashed,
        })
    };
    let label = |text| Primitive::Label {
        at: center,
        angle: text_angle,
        size: marking.height * 0.3,
        text,
        color: WHITE,
    };

    match marking.kind {
        MarkingKind::Crossing => vec![Primitive::Line {
            from: across.p1,
            to: across.p2,
            width: marking.height,
            color: WHITE,
            dashed: true,
        }],
        MarkingKind::Light => {
            let lamp = |t, color| Primitive::Dot {
                center: across.p1.lerp(across.p2, t),
                size: marking.height * 0.6,
                color,
            };
            vec![
                Primitive::Line {
                    from: across.p1.lerp(across.p2, 0.2),
                    to: across.p1.lerp(across.p2, 0.8),
                    width: marking.height,
                    color: LAMP_HOUSING,
                    dashed: false,
                },
                lamp(0.2, LAMP_GREEN),
                lamp(0.5, LAMP_YELLOW),
                lamp(0.8, LAMP_RED),
            ]
        }
        MarkingKind::Parking => {
            let segs = marking.poly().segments();
            [segs.first(), segs.get(2)]
                .into_iter()
                .flatten()
                .map(|s| Primitive::Line {
                    from: s.p1,
                    to: s.p2,
                    width: 5.0,
                    color: WHITE,
                    dashed: false,
                })
                .collect()
        }
        MarkingKind::Start => vec![
            Primitive::Polygon {
                points: marking.poly().points().to_vec(),
                fill: [1.0, 1.0, 1.0, 0.2],
            },
            label("START"),
        ],
        MarkingKind::Stop => border_line(false).into_iter().chain([label("STOP")]).collect(),
        MarkingKind::Yield => border_line(true).into_iter().chain([label("YIELD")]).collect(),
        MarkingKind::Target => [(30.0, TARGET_RED), (20.0, WHITE), (10.0, TARGET_RED)]
            .into_iter()
            .map(|(size, color)| Primitive::Dot { center, size, color })
            .collect(),
    }
}

fn building_item(building: &Building, viewpoint: Point) -> Item {
    let base = &building.base;
    let ceiling: Vec<Point> = base
        .points()
        .iter()
        .map(|&p| fake_3d(p, viewpoint, building.height))
        .collect();

    // Back walls first
    let n = base.points().len();
    let mut sides: Vec<(f64, Primitive)> = (0..n)
        .map(|i| {
            let j = (i + 1) % n;
            let wall = Polygon::new(vec![base.points()[i], base.points()[j], ceiling[j], ceiling[i]]);
            (
                wall.distance_to_point(viewpoint),
                Primitive::Polygon {
                    points: wall.points().to_vec(),
                    fill: BUILDING,
                },
            )
        })
        .collect();
    sides.sort_by(|a, b| b.0.total_cmp(&a.0));

    let mut primitives = vec![Primitive::Polygon {
        points: base.points().to_vec(),
        fill: BUILDING,
    }];
    primitives.extend(sides.into_iter().map(|(_, p)| p));
    primitives.push(Primitive::Polygon {
        points: ceiling,
        fill: ROOF,
    });

    Item {
        distance: base.distance_to_point(viewpoint),
        primitives,
    }
}

/// Stacked canopy levels rising from the trunk toward the fake 3D top
fn tree_item(tree: &Tree, viewpoint: Point) -> Item {
    let top = fake_3d(tree.center, viewpoint, tree.height);
    let level_point = |level: usize| {
        let t = level as f64 / (TREE_LEVELS - 1) as f64;
        (t, tree.center.lerp(top, t))
    };
    let trunk = |point| Primitive::Dot {
        center: point,
        size: tree.size / 5.0,
        color: TRUNK,
    };

    let primitives = match tree.kind {
        TreeKind::Pine => (0..TREE_LEVELS)
            .map(|level| {
                let (t, point) = level_point(level);
                if level < 3 {
                    return trunk(point);
                }
                Primitive::Polygon {
                    points: tree.level(point, lerp(tree.size, 40.0, t), 0.5).points().to_vec(),
                    fill: [30.0 / 255.0, lerp(30.0, 120.0, t) as f32 / 255.0, 70.0 / 255.0, 1.0],
                }
            })
            .collect(),
        TreeKind::Broadleaf => (0..TREE_LEVELS)
            .map(|level| {
                let (t, point) = level_point(level);
                let shrink = match level {
                    0..=4 => return trunk(point),
                    5 => 0.6,
                    6 => 0.8,
                    7 => 0.9,
                    8 => 0.7,
                    _ => 0.5,
                };
                let size = lerp(tree.size, tree.size * shrink, t);
                Primitive::Polygon {
                    points: tree.level(point, size, 0.8).points().to_vec(),
                    fill: [30.0 / 255.0, lerp(100.0, 180.0, t) as f32 / 255.0, 40.0 / 255.0, 1.0],
                }
            })
            .collect(),
        TreeKind::Dead => vec![Primitive::Line {
            from: tree.center,
            to: top,
            width: 5.0,
            color: DEAD_WOOD,
            dashed: false,
        }],
    };

    Item {
        distance: tree.base().distance_to_point(viewpoint),
        primitives,
    }
}

fn car_shape(car: &Car) -> CarShape {
    let mut rays = Vec::new();
    let mut readings = Vec::new();
    for sensor in car.sensors() {
        for (ray, reading) in sensor.rays().iter().zip(sensor.readings()) {
            let end = reading.map_or(ray.p2, |r| r.point);
            rays.push(Primitive::Line {
                from: ray.p1,
                to: end,
                width: 2.0,
                color: RAY,
                dashed: false,
            });
            if reading.is_some() {
                rays.push(Primitive::Line {
                    from: end,
                    to: ray.p2,
                    width: 2.0,
                    color: RAY_BLOCKED,
                    dashed: false,
                });
            }
            readings.push(reading.map(|r| r.point));
        }
    }
    CarShape {
        hitbox: car.polygon().points().to_vec(),
        damaged: car.damaged(),
        rays,
        readings,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::Graph;
    use crate::settings::{CarSettings, WorldSettings};
    use crate::sim::{ControlType, Sensor, SensorTargets};

    fn world() -> World {
        let (a, b) = (Point::new(0.0, 0.0), Point::new(600.0, 0.0));
        World::new(Graph::new(vec![a, b], vec![Segment::new(a, b)]), WorldSettings::default())
    }

    #[test]
    fn test_fake_3d_leans_away() {
        let view = Point::new(0.0, 0.0);
        let lifted = fake_3d(Point::new(300.0, 0.0), view, 200.0);
        // atan(1) / (π/2) = 0.5
        assert!((lifted.x - 400.0).abs() < 1e-9);
        assert_eq!(lifted.y, 0.0);
        assert_eq!(fake_3d(view, view, 200.0), view);
    }

    #[test]
    fn test_items_sorted_far_to_near() {
        let world = world();
        let scene = Scene::build(&world, &[], Point::new(0.0, 0.0));
        assert_eq!(scene.items.len(), world.buildings.len() + world.trees.len());
        assert!(scene.items.windows(2).all(|w| w[0].distance >= w[1].distance));
        assert_eq!(scene.road_borders.len(), world.road_borders.len());
    }

    #[test]
    fn test_tree_kinds() {
        let view = Point::new(1000.0, 1000.0);
        let pine = tree_item(&Tree::new(Point::new(0.0, 0.0), 160.0, TreeKind::Pine, 200.0), view);
        assert_eq!(pine.primitives.len(), TREE_LEVELS);
        assert!(matches!(pine.primitives[2], Primitive::Dot { .. }));
        assert!(matches!(pine.primitives[3], Primitive::Polygon { .. }));

        let broadleaf = tree_item(&Tree::new(Point::new(0.0, 0.0), 160.0, TreeKind::Broadleaf, 200.0), view);
        assert!(matches!(broadleaf.primitives[4], Primitive::Dot { .. }));
        assert!(matches!(broadleaf.primitives[5], Primitive::Polygon { .. }));

        let dead = tree_item(&Tree::new(Point::new(0.0, 0.0), 160.0, TreeKind::Dead, 200.0), view);
        assert_eq!(dead.primitives.len(), 1);
    }

    #[test]
    fn test_marking_primitives() {
        let convention = Default::default();
        let mk = |kind| Marking::new(Point::new(0.0, 0.0), Point::new(0.0, 1.0), 50.0, 20.0, kind);
        assert_eq!(marking_primitives(&mk(MarkingKind::Stop), convention).len(), 2);
        assert_eq!(marking_primitives(&mk(MarkingKind::Light), convention).len(), 4);
        assert_eq!(marking_primitives(&mk(MarkingKind::Parking), convention).len(), 2);
        assert_eq!(marking_primitives(&mk(MarkingKind::Target), convention).len(), 3);
        assert!(matches!(
            marking_primitives(&mk(MarkingKind::Yield), convention)[0],
            Primitive::Line { dashed: true, .. }
        ));
    }

    #[test]
    fn test_car_rays_split_at_reading() {
        let mut car = Car::new(Point::new(0.0, 0.0), 0.0, &CarSettings::default(), ControlType::Keys);
        car.add_sensor(Sensor::new(1, 100.0, 0.0, 0.0));
        let wall = [Segment::new(Point::new(-50.0, -50.0), Point::new(50.0, -50.0))];
        car.update(&SensorTargets {
            borders: &wall,
            ..Default::default()
        });
        let shape = car_shape(&car);
        assert_eq!(shape.hitbox.len(), 4);
        assert_eq!(shape.rays.len(), 2);
        let hit = shape.readings[0].unwrap();
        assert!((hit.y + 50.0).abs() < 1e-9);
    }
}
