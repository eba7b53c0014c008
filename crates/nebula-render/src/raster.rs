//! Software rasterizer canvas for headless render-to-image

use crate::canvas::{BlendMode, Canvas};
use image::imageops::{self, FilterType};
use image::{Rgba, RgbaImage};
use nebula_core::{Color, NebulaError, Rect, Result, Vec2};
use std::path::Path;

/// Rasterizes draw calls into an RGBA8 image (straight alpha)
pub struct RasterCanvas {
    image: RgbaImage,
    scale: f32,
}

impl Default for RasterCanvas {
    fn default() -> Self {
        Self::new()
    }
}

impl RasterCanvas {
    /// An empty canvas; the surface manager sizes it on bind
    pub fn new() -> Self {
        Self {
            image: RgbaImage::new(0, 0),
            scale: 1.0,
        }
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    /// Logical rect -> clamped device pixel span [x0, x1) x [y0, y1)
    fn device_span(&self, rect: Rect) -> (u32, u32, u32, u32) {
        let (w, h) = self.image.dimensions();
        let clamp_x = |v: f32| (v.floor().max(0.0) as u32).min(w);
        let clamp_y = |v: f32| (v.floor().max(0.0) as u32).min(h);
        (
            clamp_x(rect.x * self.scale),
            clamp_y(rect.y * self.scale),
            clamp_x(((rect.x + rect.width) * self.scale).ceil()),
            clamp_y(((rect.y + rect.height) * self.scale).ceil()),
        )
    }
}

impl Canvas for RasterCanvas {
    fn configure(&mut self, backing_width: u32, backing_height: u32, scale: f32) {
        self.image = RgbaImage::new(backing_width, backing_height);
        self.scale = scale;
    }

    fn clear(&mut self, rect: Rect) {
        let (x0, y0, x1, y1) = self.device_span(rect);
        for y in y0..y1 {
            for x in x0..x1 {
                self.image.put_pixel(x, y, Rgba([0, 0, 0, 0]));
            }
        }
    }

    fn fill_rect(&mut self, rect: Rect, color: Color) {
        let (x0, y0, x1, y1) = self.device_span(rect);
        for y in y0..y1 {
            for x in x0..x1 {
                blend_pixel(self.image.get_pixel_mut(x, y), color, 1.0, BlendMode::SourceOver);
            }
        }
    }

    fn fill_circle(&mut self, center: Vec2, radius: f32, color: Color, blend: BlendMode) {
        if radius <= 0.0 || color.a <= 0.0 {
            return;
        }
        let c = center * self.scale;
        let r = radius * self.scale;
        let extent = 2.0 * radius + 2.0;
        let bbox = Rect::new(center.x - radius - 1.0, center.y - radius - 1.0, extent, extent);
        let (x0, y0, x1, y1) = self.device_span(bbox);
        for y in y0..y1 {
            for x in x0..x1 {
                let p = Vec2::new(x as f32 + 0.5, y as f32 + 0.5);
                // Half-pixel ramp on the edge
                let coverage = (r + 0.5 - p.distance_squared(c).sqrt()).clamp(0.0, 1.0);
                if coverage > 0.0 {
                    blend_pixel(self.image.get_pixel_mut(x, y), color, coverage, blend);
                }
            }
        }
    }
}

fn blend_pixel(px: &mut Rgba<u8>, color: Color, coverage: f32, blend: BlendMode) {
    let sa = (color.a * coverage).clamp(0.0, 1.0);
    if sa <= 0.0 {
        return;
    }
    let src = [color.r, color.g, color.b];
    let da = px[3] as f32 / 255.0;
    let dst = [
        px[0] as f32 / 255.0,
        px[1] as f32 / 255.0,
        px[2] as f32 / 255.0,
    ];

    // Premultiplied result per channel, then un-premultiply
    let (out_a, premul): (f32, [f32; 3]) = match blend {
        BlendMode::Lighter => {
            let a = (sa + da).min(1.0);
            (a, std::array::from_fn(|i| src[i] * sa + dst[i] * da))
        }
        BlendMode::SourceOver | BlendMode::Screen => {
            let a = sa + da * (1.0 - sa);
            let mixed: [f32; 3] = std::array::from_fn(|i| {
                let b = if blend == BlendMode::Screen {
                    dst[i] + src[i] - dst[i] * src[i]
                } else {
                    src[i]
                };
                sa * (1.0 - da) * src[i] + sa * da * b + (1.0 - sa) * da * dst[i]
            });
            (a, mixed)
        }
    };

    if out_a <= 0.0 {
        *px = Rgba([0, 0, 0, 0]);
        return;
    }
    let to_u8 = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
    *px = Rgba([
        to_u8(premul[0] / out_a),
        to_u8(premul[1] / out_a),
        to_u8(premul[2] / out_a),
        to_u8(out_a),
    ]);
}

/// Stack layers bottom-to-top onto a `width` x `height` image. Each layer is
/// placed at a device-pixel rect and resampled if its size differs.
/// Encode `image` to `path`; the format follows the file extension
pub fn save_image(image: &RgbaImage, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    image
        .save(path)
        .map_err(|e| NebulaError::Image(format!("{}: {e}", path.display())))
}

pub fn composite_layers(width: u32, height: u32, layers: &[(&RgbaImage, Rect)]) -> RgbaImage {
    let mut out = RgbaImage::new(width, height);
    for (layer, placement) in layers {
        let target_w = placement.width.round().max(0.0) as u32;
        let target_h = placement.height.round().max(0.0) as u32;
        if target_w == 0 || target_h == 0 {
            continue;
        }
        let x = placement.x.round() as i64;
        let y = placement.y.round() as i64;
        if layer.dimensions() == (target_w, target_h) {
            imageops::overlay(&mut out, *layer, x, y);
        } else {
            let resized = imageops::resize(*layer, target_w, target_h, FilterType::Triangle);
            imageops::overlay(&mut out, &resized, x, y);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn canvas(w: u32, h: u32, scale: f32) -> RasterCanvas {
        let mut c = RasterCanvas::new();
        c.configure(w, h, scale);
        c
    }

    #[test]
    fn fill_rect_covers_scaled_area() {
        let mut c = canvas(20, 20, 2.0);
        c.fill_rect(Rect::from_size(5.0, 5.0), Color::from_hex(0x050505));
        assert_eq!(c.image().get_pixel(9, 9)[3], 255);
        assert_eq!(c.image().get_pixel(10, 10)[3], 0);
    }

    #[test]
    fn clear_resets_to_transparent() {
        let mut c = canvas(8, 8, 1.0);
        c.fill_rect(Rect::from_size(8.0, 8.0), Color::WHITE);
        c.clear(Rect::from_size(8.0, 8.0));
        assert!(c.image().pixels().all(|p| p[3] == 0));
    }

    #[test]
    fn circle_center_is_filled() {
        let mut c = canvas(32, 32, 1.0);
        c.fill_circle(Vec2::new(16.0, 16.0), 4.0, Color::WHITE, BlendMode::SourceOver);
        assert_eq!(*c.image().get_pixel(16, 16), Rgba([255, 255, 255, 255]));
        assert_eq!(c.image().get_pixel(0, 0)[3], 0);
    }

    #[test]
    fn zero_radius_draws_nothing() {
        let mut c = canvas(8, 8, 1.0);
        c.fill_circle(Vec2::new(4.0, 4.0), 0.0, Color::WHITE, BlendMode::Lighter);
        assert!(c.image().pixels().all(|p| p[3] == 0));
    }

    #[test]
    fn lighter_brightens_overlap() {
        let mut c = canvas(16, 16, 1.0);
        let dim = Color::new(0.3, 0.3, 0.3, 1.0);
        c.fill_circle(Vec2::new(8.0, 8.0), 4.0, dim, BlendMode::Lighter);
        let once = c.image().get_pixel(8, 8)[0];
        c.fill_circle(Vec2::new(8.0, 8.0), 4.0, dim, BlendMode::Lighter);
        let twice = c.image().get_pixel(8, 8)[0];
        assert!(twice > once);
    }

    #[test]
    fn screen_never_darkens() {
        let mut c = canvas(16, 16, 1.0);
        c.fill_circle(Vec2::new(8.0, 8.0), 4.0, Color::new(0.8, 0.8, 0.8, 1.0), BlendMode::Screen);
        let before = c.image().get_pixel(8, 8)[0];
        c.fill_circle(Vec2::new(8.0, 8.0), 4.0, Color::new(0.1, 0.1, 0.1, 1.0), BlendMode::Screen);
        assert!(c.image().get_pixel(8, 8)[0] >= before);
    }

    #[test]
    fn composite_places_and_resamples() {
        let mut bottom = RgbaImage::new(10, 10);
        for p in bottom.pixels_mut() {
            *p = Rgba([5, 5, 5, 255]);
        }
        let mut top = RgbaImage::new(2, 2);
        for p in top.pixels_mut() {
            *p = Rgba([255, 0, 0, 255]);
        }
        let out = composite_layers(
            10,
            10,
            &[
                (&bottom, Rect::from_size(10.0, 10.0)),
                (&top, Rect::new(4.0, 4.0, 4.0, 4.0)),
            ],
        );
        assert_eq!(*out.get_pixel(0, 0), Rgba([5, 5, 5, 255]));
        assert_eq!(out.get_pixel(5, 5)[0], 255);
    }

    #[test]
    fn save_into_missing_directory_is_image_error() {
        let image = RgbaImage::new(2, 2);
        let err = save_image(&image, "/definitely/not/here/out.png").unwrap_err();
        assert!(matches!(err, NebulaError::Image(_)));
    }
}
