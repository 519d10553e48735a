//! Scene-node capabilities of a renderable skeleton, one trait per concern.

use crate::Bounds;

pub trait Positioned {
    fn position(&self) -> [f32; 2];
    fn set_position(&mut self, x: f32, y: f32);
    fn scale(&self) -> [f32; 2];
    fn set_scale(&mut self, x: f32, y: f32);
}

pub trait Depth {
    fn depth(&self) -> f32;
    fn set_depth(&mut self, depth: f32);
}

pub trait Visibility {
    fn is_visible(&self) -> bool;
    fn set_visible(&mut self, visible: bool);
}

pub trait Tinted {
    fn tint(&self) -> [f32; 4];
    fn set_tint(&mut self, tint: [f32; 4]);
}

pub trait Sized2d: Positioned {
    fn bounds(&self) -> Option<Bounds>;
    fn set_bounds(&mut self, bounds: Bounds);

    /// Bounds extent scaled by the node scale; zero until bounds are set.
    fn size(&self) -> [f32; 2] {
        let Some(bounds) = self.bounds() else {
            return [0.0, 0.0];
        };
        let [sx, sy] = self.scale();
        [bounds.width * sx.abs(), bounds.height * sy.abs()]
    }
}
