//! Frame annotator: runs whichever detectors are loaded over one frame,
//! draws boxes and labels in place, and reports the per-category counts.

use ab_glyph::{FontVec, PxScale};
use anyhow::Result;
use image::{DynamicImage, Rgb, RgbImage};
use imageproc::drawing::{draw_hollow_rect_mut, draw_text_mut};
use imageproc::rect::Rect;

use crate::models::{ModelKind, YOLOv8};
use crate::Bbox;

const BOX_THICKNESS: i32 = 2;
const LABEL_SCALE: f32 = 24.0;

/// Label font search order: bundled asset first, then common system fonts.
const FONT_CANDIDATES: &[&str] = &[
    "assets/fonts/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
];

/// Detections of the last annotated frame, per category.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameCounts {
    pub persons: usize,
    pub weapons: usize,
}

pub struct Annotator {
    font: Option<FontVec>,
}

impl Annotator {
    pub fn new() -> Self {
        for path in FONT_CANDIDATES {
            if let Ok(bytes) = std::fs::read(path) {
                if let Ok(font) = FontVec::try_from_vec(bytes) {
                    log::info!("label font: {}", path);
                    return Self { font: Some(font) };
                }
            }
        }
        log::warn!("no label font found, boxes will be drawn without labels");
        Self { font: None }
    }

    #[cfg(test)]
    fn bare() -> Self {
        Self { font: None }
    }

    /// Run each loaded detector over `frame` and draw its detections in
    /// place. The two models never share detections; the weapon pass draws
    /// last and wins visually where boxes overlap. Only crowd detections
    /// labeled "person" (case-insensitive) count as persons; every weapon
    /// detection counts as a weapon.
    pub fn annotate(
        &self,
        frame: &mut RgbImage,
        crowd: Option<&mut YOLOv8>,
        weapon: Option<&mut YOLOv8>,
    ) -> Result<FrameCounts> {
        let mut counts = FrameCounts::default();
        if crowd.is_none() && weapon.is_none() {
            return Ok(counts);
        }

        let source = DynamicImage::ImageRgb8(frame.clone());

        if let Some(model) = crowd {
            let boxes = model.run(&source)?;
            counts.persons = count_persons(&boxes, model.names());
            self.draw_detections(frame, &boxes, model.names(), ModelKind::Crowd.box_color());
        }

        if let Some(model) = weapon {
            let boxes = model.run(&source)?;
            counts.weapons = boxes.len();
            self.draw_detections(frame, &boxes, model.names(), ModelKind::Weapon.box_color());
        }

        Ok(counts)
    }

    fn draw_detections(
        &self,
        frame: &mut RgbImage,
        boxes: &[Bbox],
        names: &[String],
        color: Rgb<u8>,
    ) {
        for b in boxes {
            for inset in 0..BOX_THICKNESS {
                let w = b.width() as i32 - 2 * inset;
                let h = b.height() as i32 - 2 * inset;
                if w <= 0 || h <= 0 {
                    continue;
                }
                let rect =
                    Rect::at(b.xmin() as i32 + inset, b.ymin() as i32 + inset).of_size(w as u32, h as u32);
                draw_hollow_rect_mut(frame, rect, color);
            }

            if let Some(font) = &self.font {
                let label = names.get(b.id()).map(String::as_str).unwrap_or("unknown");
                let y = (b.ymin() - LABEL_SCALE - 2.0).max(0.0) as i32;
                draw_text_mut(
                    frame,
                    color,
                    b.xmin() as i32,
                    y,
                    PxScale::from(LABEL_SCALE),
                    font,
                    label,
                );
            }
        }
    }
}

/// Count detections whose class name is "person", case-insensitively.
/// Other crowd-model classes are drawn but not counted.
pub fn count_persons(boxes: &[Bbox], names: &[String]) -> usize {
    boxes
        .iter()
        .filter(|b| {
            names
                .get(b.id())
                .map(|name| name.eq_ignore_ascii_case("person"))
                .unwrap_or(false)
        })
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(xs: &[&str]) -> Vec<String> {
        xs.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_annotate_without_models_is_identity() {
        let annotator = Annotator::bare();
        let mut frame = RgbImage::from_pixel(64, 64, Rgb([7, 7, 7]));
        let untouched = frame.clone();

        let counts = annotator.annotate(&mut frame, None, None).unwrap();

        assert_eq!(counts, FrameCounts::default());
        assert_eq!(frame, untouched);
    }

    #[test]
    fn test_count_persons_case_insensitive() {
        let names = names(&["Person", "helmet"]);
        let boxes = vec![
            Bbox::new(0.0, 0.0, 10.0, 10.0, 0, 0.9),
            Bbox::new(20.0, 0.0, 10.0, 10.0, 0, 0.8),
            Bbox::new(40.0, 0.0, 10.0, 10.0, 1, 0.7),
        ];
        assert_eq!(count_persons(&boxes, &names), 2);
    }

    #[test]
    fn test_count_persons_ignores_unknown_ids() {
        let names = names(&["person"]);
        let boxes = vec![Bbox::new(0.0, 0.0, 10.0, 10.0, 9, 0.9)];
        assert_eq!(count_persons(&boxes, &names), 0);
    }

    #[test]
    fn test_draw_detections_marks_box_edge() {
        let annotator = Annotator::bare();
        let mut frame = RgbImage::from_pixel(100, 100, Rgb([0, 0, 0]));
        let boxes = vec![Bbox::new(10.0, 10.0, 30.0, 30.0, 0, 0.9)];
        let color = Rgb([0, 0, 255]);

        annotator.draw_detections(&mut frame, &boxes, &names(&["person"]), color);

        assert_eq!(*frame.get_pixel(10, 10), color);
        assert_eq!(*frame.get_pixel(25, 10), color);
        // interior untouched
        assert_eq!(*frame.get_pixel(25, 25), Rgb([0, 0, 0]));
    }

    #[test]
    fn test_draw_detections_skips_degenerate_boxes() {
        let annotator = Annotator::bare();
        let mut frame = RgbImage::from_pixel(32, 32, Rgb([0, 0, 0]));
        let boxes = vec![Bbox::new(5.0, 5.0, 0.0, 0.0, 0, 0.9)];

        annotator.draw_detections(&mut frame, &boxes, &names(&["person"]), Rgb([255, 0, 0]));

        assert!(frame.pixels().all(|p| *p == Rgb([0, 0, 0])));
    }
}
