//! The drawing-surface abstraction

use nebula_core::{Color, Rect, Vec2};
use std::cell::RefCell;
use std::rc::Rc;

/// How a shape's color combines with what is already on the surface
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BlendMode {
    /// Standard alpha blending
    #[default]
    SourceOver,
    /// `1 - (1 - dst)(1 - src)`: overlaps brighten, never darken
    Screen,
    /// Additive (src_alpha + One)
    Lighter,
}

/// A 2D drawing surface addressed in logical units.
///
/// `configure` sets the device-pixel backing buffer and the uniform scale
/// applied to every subsequent call, so callers never see device pixels.
pub trait Canvas {
    fn configure(&mut self, backing_width: u32, backing_height: u32, scale: f32);

    /// Reset `rect` to fully transparent
    fn clear(&mut self, rect: Rect);

    fn fill_rect(&mut self, rect: Rect, color: Color);

    fn fill_circle(&mut self, center: Vec2, radius: f32, color: Color, blend: BlendMode);
}

/// Shared handle so a host can keep reading a canvas after handing it to the
/// engine. Everything runs on one thread, so `RefCell` borrows never overlap.
impl<C: Canvas> Canvas for Rc<RefCell<C>> {
    fn configure(&mut self, backing_width: u32, backing_height: u32, scale: f32) {
        self.borrow_mut().configure(backing_width, backing_height, scale)
    }

    fn clear(&mut self, rect: Rect) {
        self.borrow_mut().clear(rect)
    }

    fn fill_rect(&mut self, rect: Rect, color: Color) {
        self.borrow_mut().fill_rect(rect, color)
    }

    fn fill_circle(&mut self, center: Vec2, radius: f32, color: Color, blend: BlendMode) {
        self.borrow_mut().fill_circle(center, radius, color, blend)
    }
}
