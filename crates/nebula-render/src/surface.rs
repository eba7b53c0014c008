//! Surface manager: logical-to-device pixel mapping per drawing surface

use crate::canvas::Canvas;
use nebula_core::{NebulaError, Rect, Result, Viewport};
use std::fmt;

/// Logical edge length of the sink surface, independent of the viewport
pub const SINK_LOGICAL_SIZE: f32 = 400.0;

/// The three drawing surfaces the engine owns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SurfaceKind {
    /// Full viewport, behind everything
    Ambient,
    /// Fixed 400x400 logical square
    Sink,
    /// Full viewport, on top
    Burst,
}

impl SurfaceKind {
    pub const ALL: [SurfaceKind; 3] = [SurfaceKind::Ambient, SurfaceKind::Sink, SurfaceKind::Burst];

    pub fn name(&self) -> &'static str {
        match self {
            SurfaceKind::Ambient => "ambient",
            SurfaceKind::Sink => "sink",
            SurfaceKind::Burst => "burst",
        }
    }
}

impl fmt::Display for SurfaceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Logical size plus device pixel ratio for one surface
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceMapping {
    pub logical_width: f32,
    pub logical_height: f32,
    pub ratio: f32,
}

impl SurfaceMapping {
    pub fn for_kind(kind: SurfaceKind, viewport: &Viewport) -> Self {
        let (logical_width, logical_height) = match kind {
            SurfaceKind::Sink => (SINK_LOGICAL_SIZE, SINK_LOGICAL_SIZE),
            SurfaceKind::Ambient | SurfaceKind::Burst => (viewport.width, viewport.height),
        };
        Self {
            logical_width,
            logical_height,
            ratio: viewport.device_pixel_ratio,
        }
    }

    /// Device-pixel size of the backing buffer (truncated, like a canvas
    /// width assignment)
    pub fn backing_size(&self) -> (u32, u32) {
        (
            (self.logical_width * self.ratio).max(0.0) as u32,
            (self.logical_height * self.ratio).max(0.0) as u32,
        )
    }

    pub fn logical_bounds(&self) -> Rect {
        Rect::from_size(self.logical_width, self.logical_height)
    }
}

/// A bound canvas together with its current mapping
pub struct Surface {
    kind: SurfaceKind,
    canvas: Box<dyn Canvas>,
    mapping: SurfaceMapping,
}

impl Surface {
    fn new(kind: SurfaceKind, canvas: Box<dyn Canvas>, viewport: &Viewport) -> Self {
        let mut surface = Self {
            kind,
            canvas,
            mapping: SurfaceMapping::for_kind(kind, viewport),
        };
        surface.apply_mapping();
        surface
    }

    /// Recompute the mapping for a (possibly) new viewport and push it to
    /// the canvas
    pub fn reconfigure(&mut self, viewport: &Viewport) {
        self.mapping = SurfaceMapping::for_kind(self.kind, viewport);
        self.apply_mapping();
    }

    fn apply_mapping(&mut self) {
        let (w, h) = self.mapping.backing_size();
        self.canvas.configure(w, h, self.mapping.ratio);
    }

    /// Logical drawing area
    pub fn bounds(&self) -> Rect {
        self.mapping.logical_bounds()
    }

    /// Clear the whole logical area
    pub fn clear_all(&mut self) {
        let bounds = self.bounds();
        self.canvas.clear(bounds);
    }

    pub fn canvas_mut(&mut self) -> &mut dyn Canvas {
        self.canvas.as_mut()
    }
}

/// Canvases offered by the host at initialization. `None` means the host
/// could not acquire a drawing context for that surface.
#[derive(Default)]
pub struct SurfaceSet {
    pub ambient: Option<Box<dyn Canvas>>,
    pub sink: Option<Box<dyn Canvas>>,
    pub burst: Option<Box<dyn Canvas>>,
}

impl SurfaceSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, kind: SurfaceKind, canvas: impl Canvas + 'static) -> Self {
        let slot = match kind {
            SurfaceKind::Ambient => &mut self.ambient,
            SurfaceKind::Sink => &mut self.sink,
            SurfaceKind::Burst => &mut self.burst,
        };
        *slot = Some(Box::new(canvas));
        self
    }

    pub fn take(&mut self, kind: SurfaceKind) -> Option<Box<dyn Canvas>> {
        match kind {
            SurfaceKind::Ambient => self.ambient.take(),
            SurfaceKind::Sink => self.sink.take(),
            SurfaceKind::Burst => self.burst.take(),
        }
    }
}

/// Owns every bound surface and keeps its mapping current
pub struct SurfaceManager {
    viewport: Viewport,
    ambient: Option<Surface>,
    sink: Option<Surface>,
    burst: Option<Surface>,
    sink_placement: Rect,
    placement_pinned: bool,
}

impl SurfaceManager {
    pub fn new(viewport: Viewport) -> Self {
        Self {
            viewport,
            ambient: None,
            sink: None,
            burst: None,
            sink_placement: default_sink_placement(&viewport),
            placement_pinned: false,
        }
    }

    /// Bind a canvas to `kind`. Fails when the host had no canvas to offer;
    /// the other surfaces are unaffected.
    pub fn bind(&mut self, kind: SurfaceKind, canvas: Option<Box<dyn Canvas>>) -> Result<()> {
        let canvas = canvas.ok_or_else(|| NebulaError::SurfaceUnavailable(kind.to_string()))?;
        *self.slot_mut(kind) = Some(Surface::new(kind, canvas, &self.viewport));
        Ok(())
    }

    pub fn is_bound(&self, kind: SurfaceKind) -> bool {
        match kind {
            SurfaceKind::Ambient => self.ambient.is_some(),
            SurfaceKind::Sink => self.sink.is_some(),
            SurfaceKind::Burst => self.burst.is_some(),
        }
    }

    pub fn get_mut(&mut self, kind: SurfaceKind) -> Option<&mut Surface> {
        self.slot_mut(kind).as_mut()
    }

    pub fn get(&self, kind: SurfaceKind) -> Option<&Surface> {
        match kind {
            SurfaceKind::Ambient => self.ambient.as_ref(),
            SurfaceKind::Sink => self.sink.as_ref(),
            SurfaceKind::Burst => self.burst.as_ref(),
        }
    }

    fn slot_mut(&mut self, kind: SurfaceKind) -> &mut Option<Surface> {
        match kind {
            SurfaceKind::Ambient => &mut self.ambient,
            SurfaceKind::Sink => &mut self.sink,
            SurfaceKind::Burst => &mut self.burst,
        }
    }

    /// Recompute every surface for a new viewport. The sink keeps its
    /// 400x400 logical size; only its pixel ratio can change.
    pub fn resize(&mut self, viewport: Viewport) {
        self.viewport = viewport;
        if !self.placement_pinned {
            self.sink_placement = default_sink_placement(&viewport);
        }
        for kind in SurfaceKind::ALL {
            self.reconfigure(kind);
        }
    }

    /// Re-apply the current mapping to one surface
    pub fn reconfigure(&mut self, kind: SurfaceKind) {
        let viewport = self.viewport;
        if let Some(surface) = self.get_mut(kind) {
            surface.reconfigure(&viewport);
        }
    }

    /// Where the sink surface sits on screen, in viewport coordinates
    pub fn sink_placement(&self) -> Rect {
        self.sink_placement
    }

    /// Pin the sink surface to a host-chosen rectangle. Resizes no longer
    /// recenter it.
    pub fn set_sink_placement(&mut self, placement: Rect) {
        self.sink_placement = placement;
        self.placement_pinned = true;
    }
}

fn default_sink_placement(viewport: &Viewport) -> Rect {
    Rect::centered(viewport.center(), SINK_LOGICAL_SIZE, SINK_LOGICAL_SIZE)
}
