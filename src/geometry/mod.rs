//! Planar geometry primitives
//!
//! Everything the world generator and the sensors share:
//! - Exact segment intersection (determinant form)
//! - Projection and point/segment distances
//! - Polygons with parity point-in-polygon and boundary union
//! - Envelopes: rounded offset polygons around a skeleton segment

pub mod envelope;
pub mod point;
pub mod polygon;
pub mod segment;

pub use envelope::Envelope;
pub use point::{Point, nearest_point};
pub use polygon::{Polygon, multi_break, union};
pub use segment::{Intersection, Projection, Segment, get_intersection, nearest_segment};
