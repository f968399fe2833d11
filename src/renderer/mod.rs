//! Rendering handoff
//!
//! The core never draws. Each frame it builds a [`Scene`] and passes it to
//! whatever implements [`Renderer`]; nothing the renderer does feeds back.

pub mod scene;

pub use scene::{CarShape, Item, Primitive, Scene};

pub trait Renderer {
    fn render(&mut self, scene: &Scene<'_>);
}

/// Headless renderer that logs a frame summary
#[derive(Debug, Default)]
pub struct LogRenderer {
    pub frames: u64,
}

impl Renderer for LogRenderer {
    fn render(&mut self, scene: &Scene<'_>) {
        self.frames += 1;
        log::debug!(
            "frame {}: {} borders, {} items, {} cars ({} damaged)",
            self.frames,
            scene.road_borders.len(),
            scene.items.len(),
            scene.cars.len(),
            scene.cars.iter().filter(|c| c.damaged).count()
        );
    }
}
