// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license
pub mod annotate; // frame annotator (boxes + labels + counts)
pub mod app; // GUI controller
pub mod config; // CLI arguments
pub mod display; // canvas state machine
pub mod graph; // training-results chart viewer
pub mod input; // image / video source drivers
pub mod models; // detection model (YOLOv8)
pub mod settings; // persisted viewer settings
pub mod status; // shared status line

pub mod ort_backend;

pub use crate::config::Args;
pub use crate::models::{ModelKind, YOLOv8};
pub use crate::ort_backend::{OrtBackend, OrtConfig, OrtEP};

/// A detection bounding box in original-image pixel coordinates.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Bbox {
    xmin: f32,
    ymin: f32,
    width: f32,
    height: f32,
    id: usize,
    confidence: f32,
}

impl Bbox {
    pub fn new(xmin: f32, ymin: f32, width: f32, height: f32, id: usize, confidence: f32) -> Self {
        Self {
            xmin,
            ymin,
            width,
            height,
            id,
            confidence,
        }
    }

    pub fn xmin(&self) -> f32 {
        self.xmin
    }

    pub fn ymin(&self) -> f32 {
        self.ymin
    }

    pub fn width(&self) -> f32 {
        self.width
    }

    pub fn height(&self) -> f32 {
        self.height
    }

    pub fn xmax(&self) -> f32 {
        self.xmin + self.width
    }

    pub fn ymax(&self) -> f32 {
        self.ymin + self.height
    }

    pub fn id(&self) -> usize {
        self.id
    }

    pub fn confidence(&self) -> f32 {
        self.confidence
    }

    pub fn area(&self) -> f32 {
        self.width * self.height
    }

    pub fn intersection_area(&self, another: &Bbox) -> f32 {
        let l = self.xmin.max(another.xmin);
        let r = (self.xmin + self.width).min(another.xmin + another.width);
        let t = self.ymin.max(another.ymin);
        let b = (self.ymin + self.height).min(another.ymin + another.height);
        (r - l + 1.).max(0.) * (b - t + 1.).max(0.)
    }

    pub fn union(&self, another: &Bbox) -> f32 {
        self.area() + another.area() - self.intersection_area(another)
    }

    pub fn iou(&self, another: &Bbox) -> f32 {
        self.intersection_area(another) / self.union(another)
    }
}

/// Greedy NMS: keep the highest-confidence box among mutual overlaps above
/// `iou_threshold`.
pub fn non_max_suppression(xs: &mut Vec<Bbox>, iou_threshold: f32) {
    xs.sort_by(|b1, b2| b2.confidence().partial_cmp(&b1.confidence()).unwrap());

    let mut current_index = 0;
    for index in 0..xs.len() {
        let mut drop = false;
        for prev_index in 0..current_index {
            let iou = xs[prev_index].iou(&xs[index]);
            if iou > iou_threshold {
                drop = true;
                break;
            }
        }
        if !drop {
            xs.swap(current_index, index);
            current_index += 1;
        }
    }
    xs.truncate(current_index);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bbox_iou() {
        let a = Bbox::new(0.0, 0.0, 100.0, 100.0, 0, 0.9);
        let b = Bbox::new(0.0, 0.0, 100.0, 100.0, 0, 0.8);
        assert!(a.iou(&b) > 0.99);

        let c = Bbox::new(500.0, 500.0, 10.0, 10.0, 0, 0.8);
        assert!(a.iou(&c) < 1e-3);
    }

    #[test]
    fn test_nms_keeps_best_of_overlapping_pair() {
        let mut boxes = vec![
            Bbox::new(10.0, 10.0, 100.0, 100.0, 0, 0.6),
            Bbox::new(12.0, 11.0, 100.0, 100.0, 0, 0.9),
            Bbox::new(400.0, 400.0, 50.0, 50.0, 1, 0.5),
        ];
        non_max_suppression(&mut boxes, 0.45);

        assert_eq!(boxes.len(), 2);
        assert_eq!(boxes[0].confidence(), 0.9);
        assert_eq!(boxes[1].id(), 1);
    }

    #[test]
    fn test_nms_sorts_by_confidence() {
        let mut boxes = vec![
            Bbox::new(0.0, 0.0, 10.0, 10.0, 2, 0.3),
            Bbox::new(300.0, 0.0, 10.0, 10.0, 1, 0.8),
            Bbox::new(0.0, 300.0, 10.0, 10.0, 0, 0.5),
        ];
        non_max_suppression(&mut boxes, 0.45);

        assert_eq!(boxes.len(), 3);
        assert!(boxes[0].confidence() >= boxes[1].confidence());
        assert!(boxes[1].confidence() >= boxes[2].confidence());
    }
}
