//! A canvas that records draw calls instead of rasterizing them

use crate::canvas::{BlendMode, Canvas};
use nebula_core::{Color, Rect, Vec2};

/// One recorded draw call, in logical units
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Configure {
        backing_width: u32,
        backing_height: u32,
        scale: f32,
    },
    Clear(Rect),
    FillRect(Rect, Color),
    FillCircle {
        center: Vec2,
        radius: f32,
        color: Color,
        blend: BlendMode,
    },
}

/// Records every call since the last clear of the whole log.
///
/// `clear` calls are recorded too, so a consumer can split the log into
/// frames by looking for them.
#[derive(Debug, Default)]
pub struct RecordingCanvas {
    commands: Vec<DrawCommand>,
    backing: (u32, u32),
    scale: f32,
    configure_count: usize,
}

impl RecordingCanvas {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    /// Drop the recorded log, keeping the surface configuration
    pub fn take_commands(&mut self) -> Vec<DrawCommand> {
        std::mem::take(&mut self.commands)
    }

    /// Circles drawn since the log was last taken
    pub fn circles(&self) -> impl Iterator<Item = (Vec2, f32, Color, BlendMode)> + '_ {
        self.commands.iter().filter_map(|c| match *c {
            DrawCommand::FillCircle {
                center,
                radius,
                color,
                blend,
            } => Some((center, radius, color, blend)),
            _ => None,
        })
    }

    /// Circles drawn after the most recent clear or fill_rect, i.e. the
    /// content of the last rendered frame
    pub fn last_frame_circles(&self) -> usize {
        self.commands
            .iter()
            .rev()
            .take_while(|c| matches!(c, DrawCommand::FillCircle { .. }))
            .count()
    }

    pub fn clear_count(&self) -> usize {
        self.commands
            .iter()
            .filter(|c| matches!(c, DrawCommand::Clear(_)))
            .count()
    }

    pub fn backing_size(&self) -> (u32, u32) {
        self.backing
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    /// Number of times the surface manager has (re)configured this canvas
    pub fn configure_count(&self) -> usize {
        self.configure_count
    }
}

impl Canvas for RecordingCanvas {
    fn configure(&mut self, backing_width: u32, backing_height: u32, scale: f32) {
        self.backing = (backing_width, backing_height);
        self.scale = scale;
        self.configure_count += 1;
        self.commands.push(DrawCommand::Configure {
            backing_width,
            backing_height,
            scale,
        });
    }

    fn clear(&mut self, rect: Rect) {
        self.commands.push(DrawCommand::Clear(rect));
    }

    fn fill_rect(&mut self, rect: Rect, color: Color) {
        self.commands.push(DrawCommand::FillRect(rect, color));
    }

    fn fill_circle(&mut self, center: Vec2, radius: f32, color: Color, blend: BlendMode) {
        self.commands.push(DrawCommand::FillCircle {
            center,
            radius,
            color,
            blend,
        });
    }
}
