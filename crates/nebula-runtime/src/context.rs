//! Per-frame simulation inputs

use nebula_core::{Rect, Vec2, Viewport};

/// Everything a system may read during one frame.
///
/// Written only by the engine facade between frames; systems receive it by
/// shared reference and never hold on to it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameContext {
    pub viewport: Viewport,
    /// Pointer position in viewport coordinates
    pub pointer: Vec2,
    /// On-screen rectangle of the sink surface, in viewport coordinates
    pub sink_placement: Rect,
    pub reduced_motion: bool,
}

impl FrameContext {
    pub fn new(viewport: Viewport, sink_placement: Rect, reduced_motion: bool) -> Self {
        Self {
            viewport,
            pointer: viewport.center(),
            sink_placement,
            reduced_motion,
        }
    }

    /// Map the pointer into a surface placed at `placement` whose logical
    /// frame is `logical_width` x `logical_height`
    pub fn pointer_in(&self, placement: Rect, logical_width: f32, logical_height: f32) -> Vec2 {
        let sx = if placement.width > 0.0 {
            logical_width / placement.width
        } else {
            1.0
        };
        let sy = if placement.height > 0.0 {
            logical_height / placement.height
        } else {
            1.0
        };
        Vec2::new(
            (self.pointer.x - placement.x) * sx,
            (self.pointer.y - placement.y) * sy,
        )
    }
}
