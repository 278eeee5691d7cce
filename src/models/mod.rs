//! Detection models.
//!
//! One architecture (YOLOv8, ONNX export) serves both detector slots; the
//! two slots differ only in weights and in how their detections are counted
//! and colored.

use image::Rgb;

use crate::ort_backend::OrtEP;

pub mod yolov8;

pub use yolov8::YOLOv8;

/// The two detector slots the application manages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelKind {
    Crowd,
    Weapon,
}

impl ModelKind {
    pub fn display_name(&self) -> &'static str {
        match self {
            ModelKind::Crowd => "Crowd",
            ModelKind::Weapon => "Weapon",
        }
    }

    /// Box/label color on the annotated frame. Crowd detections are blue,
    /// weapon detections red; the weapon pass draws last where they overlap.
    pub fn box_color(&self) -> Rgb<u8> {
        match self {
            ModelKind::Crowd => Rgb([0, 0, 255]),
            ModelKind::Weapon => Rgb([255, 0, 0]),
        }
    }
}

/// Parameters shared by both detector slots.
#[derive(Debug, Clone, Copy)]
pub struct DetectorConfig {
    pub ep: OrtEP,
    /// Square model input size
    pub imgsz: u32,
    pub conf_threshold: f32,
    pub iou_threshold: f32,
    pub profile: bool,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            ep: OrtEP::Cpu,
            imgsz: 640,
            conf_threshold: 0.25,
            iou_threshold: 0.45,
            profile: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_colors_differ() {
        assert_ne!(ModelKind::Crowd.box_color(), ModelKind::Weapon.box_color());
    }

    #[test]
    fn test_config_default() {
        let config = DetectorConfig::default();
        assert_eq!(config.imgsz, 640);
        assert_eq!(config.ep, OrtEP::Cpu);
    }
}
