//! Training-results chart viewer.
//!
//! Loads the fixed chart image and presents it as a modal view over the
//! whole window; any key press closes it.

use anyhow::{Context, Result};
use image::imageops::FilterType;
use macroquad::prelude::*;

pub const GRAPH_WIDTH: u32 = 800;
pub const GRAPH_HEIGHT: u32 = 600;

pub struct GraphViewer {
    rgba: Vec<u8>,
    texture: Option<Texture2D>,
}

impl GraphViewer {
    pub fn open(path: &str) -> Result<Self> {
        let img = image::open(path)
            .with_context(|| format!("failed to load results chart {:?}", path))?;
        let rgba = img
            .resize_exact(GRAPH_WIDTH, GRAPH_HEIGHT, FilterType::Triangle)
            .into_rgba8()
            .into_raw();
        Ok(Self {
            rgba,
            texture: None,
        })
    }

    pub fn draw(&mut self) {
        // dim everything behind the modal
        draw_rectangle(
            0.0,
            0.0,
            screen_width(),
            screen_height(),
            Color::new(0.0, 0.0, 0.0, 0.6),
        );

        if self.texture.is_none() {
            let texture =
                Texture2D::from_rgba8(GRAPH_WIDTH as u16, GRAPH_HEIGHT as u16, &self.rgba);
            texture.set_filter(FilterMode::Linear);
            self.texture = Some(texture);
        }

        let (w, h) = (GRAPH_WIDTH as f32, GRAPH_HEIGHT as f32);
        let x = (screen_width() - w) / 2.0;
        let y = (screen_height() - h) / 2.0;
        if let Some(texture) = &self.texture {
            draw_texture_ex(
                texture,
                x,
                y,
                WHITE,
                DrawTextureParams {
                    dest_size: Some(vec2(w, h)),
                    ..Default::default()
                },
            );
        }

        draw_text(
            "Training results - press any key to close",
            x,
            (y - 10.0).max(20.0),
            24.0,
            WHITE,
        );
    }
}
