//! Frame system trait

use crate::context::FrameContext;
use nebula_render::Surface;

/// A particle system ticked by the frame loop
///
/// The loop runs `update` for every active system once per frame, then asks
/// each one whether it still wants frames. A system stops itself by
/// reporting `is_active() == false`; nothing cancels it from outside.
pub trait FrameSystem {
    /// Advance one frame and draw onto `surface`
    fn update(&mut self, ctx: &FrameContext, surface: &mut Surface);

    /// Whether this system wants another frame
    fn is_active(&self) -> bool;

    /// Live particle count
    fn particle_count(&self) -> usize;

    /// Human-readable name for this system
    fn name(&self) -> &str;
}
