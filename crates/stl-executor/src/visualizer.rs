//! Visualization hooks invoked around each transition (§4.H, §5: "the
//! visualizer owns a drawing surface whose lifetime equals the
//! executor's"). The core never draws anything itself.

use stl_ast::Name;

pub trait Visualizer {
    fn on_start(&mut self, transition: &Name);
    fn on_pass(&mut self, transition: &Name);
    fn on_fail(&mut self, transition: &Name);
}

/// Used when no `-g path` live drawing was requested.
#[derive(Default)]
pub struct NoopVisualizer;

impl Visualizer for NoopVisualizer {
    fn on_start(&mut self, _transition: &Name) {}
    fn on_pass(&mut self, _transition: &Name) {}
    fn on_fail(&mut self, _transition: &Name) {}
}
