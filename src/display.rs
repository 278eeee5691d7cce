//! Display surface: the single visible canvas.
//!
//! Two states, EMPTY and SHOWING. The shown frame and the dismiss affordance
//! exist exactly together: both live in one `Option`, so clearing one clears
//! both. The GPU texture is rebuilt lazily at draw time from the stored RGBA
//! buffer, which keeps the state machine itself plain data.

use image::{imageops, DynamicImage, RgbImage};
use macroquad::prelude::*;

pub const CANVAS_WIDTH: u32 = 700;
pub const CANVAS_HEIGHT: u32 = 500;

// dismiss affordance, offset from the canvas's top-right corner
const CLOSE_OFFSET_X: f32 = 20.0;
const CLOSE_OFFSET_Y: f32 = 20.0;
const CLOSE_HIT_RADIUS: f32 = 14.0;
const CLOSE_ARM: f32 = 7.0;

struct ShownFrame {
    /// CANVAS_WIDTH x CANVAS_HEIGHT RGBA pixels
    rgba: Vec<u8>,
}

#[derive(Default)]
pub struct DisplaySurface {
    shown: Option<ShownFrame>,
    texture: Option<Texture2D>,
}

impl DisplaySurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// EMPTY -> SHOWING, or SHOWING -> SHOWING replacing the previous frame
    /// and its affordance in one step.
    pub fn show(&mut self, frame: &RgbImage) {
        let resized = imageops::resize(
            frame,
            CANVAS_WIDTH,
            CANVAS_HEIGHT,
            imageops::FilterType::Triangle,
        );
        let rgba = DynamicImage::ImageRgb8(resized).into_rgba8().into_raw();

        // drop the old image reference before installing the new one
        self.texture = None;
        self.shown = Some(ShownFrame { rgba });
    }

    /// SHOWING -> EMPTY; no effect in EMPTY.
    pub fn clear(&mut self) {
        self.shown = None;
        self.texture = None;
    }

    pub fn is_showing(&self) -> bool {
        self.shown.is_some()
    }

    fn close_center(origin: (f32, f32)) -> (f32, f32) {
        (
            origin.0 + CANVAS_WIDTH as f32 - CLOSE_OFFSET_X,
            origin.1 + CLOSE_OFFSET_Y,
        )
    }

    /// True when `(x, y)` lands on the dismiss affordance. Only meaningful
    /// in SHOWING; in EMPTY there is no affordance to hit.
    pub fn dismiss_hit(&self, x: f32, y: f32, origin: (f32, f32)) -> bool {
        if !self.is_showing() {
            return false;
        }
        let (cx, cy) = Self::close_center(origin);
        let (dx, dy) = (x - cx, y - cy);
        dx * dx + dy * dy <= CLOSE_HIT_RADIUS * CLOSE_HIT_RADIUS
    }

    pub fn draw(&mut self, origin: (f32, f32)) {
        let (w, h) = (CANVAS_WIDTH as f32, CANVAS_HEIGHT as f32);
        draw_rectangle(origin.0, origin.1, w, h, WHITE);

        let Some(shown) = &self.shown else {
            return;
        };

        if self.texture.is_none() {
            let texture =
                Texture2D::from_rgba8(CANVAS_WIDTH as u16, CANVAS_HEIGHT as u16, &shown.rgba);
            texture.set_filter(FilterMode::Linear);
            self.texture = Some(texture);
        }

        if let Some(texture) = &self.texture {
            draw_texture_ex(
                texture,
                origin.0,
                origin.1,
                WHITE,
                DrawTextureParams {
                    dest_size: Some(vec2(w, h)),
                    ..Default::default()
                },
            );
        }

        // dismiss affordance
        let (cx, cy) = Self::close_center(origin);
        draw_circle_lines(cx, cy, CLOSE_HIT_RADIUS, 2.0, RED);
        draw_line(cx - CLOSE_ARM, cy - CLOSE_ARM, cx + CLOSE_ARM, cy + CLOSE_ARM, 3.0, RED);
        draw_line(cx - CLOSE_ARM, cy + CLOSE_ARM, cx + CLOSE_ARM, cy - CLOSE_ARM, 3.0, RED);
    }
}
