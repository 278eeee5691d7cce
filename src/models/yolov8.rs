// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

use anyhow::{bail, Result};
use image::{DynamicImage, GenericImageView};
use ndarray::{s, Array, Axis, IxDyn};

use super::DetectorConfig;
use crate::{non_max_suppression, Bbox, OrtBackend, OrtConfig};

/// YOLOv8 detection model: preprocess -> forward -> postprocess.
pub struct YOLOv8 {
    engine: OrtBackend,
    nc: u32,
    height: u32,
    width: u32,
    conf: f32,
    iou: f32,
    names: Vec<String>,
    profile: bool,
}

impl YOLOv8 {
    pub fn new(model_path: &str, config: &DetectorConfig) -> Result<Self> {
        let engine = OrtBackend::build(OrtConfig {
            model_path: model_path.to_string(),
            ep: config.ep,
            image_size: (config.imgsz, config.imgsz),
        })?;

        // class names come from the export metadata; a detector without them
        // cannot be labeled or counted
        let names = match engine.names() {
            Some(names) => names,
            None => bail!("model {:?} carries no class-name metadata", model_path),
        };
        let nc = names.len() as u32;
        let (height, width) = (engine.height(), engine.width());

        Ok(Self {
            engine,
            nc,
            height,
            width,
            conf: config.conf_threshold,
            iou: config.iou_threshold,
            names,
            profile: config.profile,
        })
    }

    fn scale_wh(w0: f32, h0: f32, w1: f32, h1: f32) -> (f32, f32, f32) {
        let r = (w1 / w0).min(h1 / h0);
        (r, (w0 * r).round(), (h0 * r).round())
    }

    /// Letterbox resize + NCHW f32 normalize.
    pub fn preprocess(&self, x: &DynamicImage) -> Array<f32, IxDyn> {
        let mut ys =
            Array::ones((1, 3, self.height as usize, self.width as usize)).into_dyn();
        ys.fill(144.0 / 255.0);

        let (w0, h0) = x.dimensions();
        let (_, w_new, h_new) = Self::scale_wh(
            w0 as f32,
            h0 as f32,
            self.width as f32,
            self.height as f32,
        );
        let img = x.resize_exact(
            w_new as u32,
            h_new as u32,
            image::imageops::FilterType::Triangle,
        );

        for (px, py, rgb) in img.pixels() {
            let px = px as usize;
            let py = py as usize;
            let [r, g, b, _] = rgb.0;
            ys[[0, 0, py, px]] = (r as f32) / 255.0;
            ys[[0, 1, py, px]] = (g as f32) / 255.0;
            ys[[0, 2, py, px]] = (b as f32) / 255.0;
        }

        ys
    }

    /// Full inference over one frame, boxes in original-image coordinates.
    pub fn run(&mut self, x: &DynamicImage) -> Result<Vec<Bbox>> {
        let t_pre = std::time::Instant::now();
        let xs = self.preprocess(x);
        if self.profile {
            log::info!("[preprocess]: {:?}", t_pre.elapsed());
        }

        let ys = self.engine.run(xs, self.profile)?;

        let t_post = std::time::Instant::now();
        let (w0, h0) = x.dimensions();
        let boxes = decode_predictions(
            &ys[0],
            self.nc as usize,
            self.conf,
            self.iou,
            (w0, h0),
            (self.width, self.height),
        );
        if self.profile {
            log::info!("[postprocess]: {:?}", t_post.elapsed());
        }

        Ok(boxes)
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn name_of(&self, id: usize) -> &str {
        self.names.get(id).map(String::as_str).unwrap_or("unknown")
    }

    pub fn conf(&self) -> f32 {
        self.conf
    }

    pub fn set_conf(&mut self, val: f32) {
        self.conf = val;
    }

    pub fn iou(&self) -> f32 {
        self.iou
    }

    pub fn set_iou(&mut self, val: f32) {
        self.iou = val;
    }

    pub fn nc(&self) -> u32 {
        self.nc
    }
}

/// Decode a raw YOLOv8 detect head `(1, 4 + nc, anchors)` into NMS-filtered
/// boxes in original-image coordinates.
pub fn decode_predictions(
    preds: &Array<f32, IxDyn>,
    nc: usize,
    conf_threshold: f32,
    iou_threshold: f32,
    original_size: (u32, u32),
    model_size: (u32, u32),
) -> Vec<Bbox> {
    const CXYWH_OFFSET: usize = 4;

    let width_original = original_size.0 as f32;
    let height_original = original_size.1 as f32;
    let ratio = (model_size.0 as f32 / width_original)
        .min(model_size.1 as f32 / height_original);

    let mut boxes: Vec<Bbox> = Vec::new();
    for anchor in preds.axis_iter(Axis(0)) {
        for pred in anchor.axis_iter(Axis(1)) {
            let bbox = pred.slice(s![0..CXYWH_OFFSET]);
            let clss = pred.slice(s![CXYWH_OFFSET..CXYWH_OFFSET + nc]);

            let (id, &confidence) = clss
                .into_iter()
                .enumerate()
                .reduce(|max, x| if x.1 > max.1 { x } else { max })
                .unwrap();
            if confidence < conf_threshold {
                continue;
            }

            let cx = bbox[0] / ratio;
            let cy = bbox[1] / ratio;
            let w = bbox[2] / ratio;
            let h = bbox[3] / ratio;
            let x = cx - w / 2.;
            let y = cy - h / 2.;
            boxes.push(Bbox::new(
                x.max(0.0f32).min(width_original),
                y.max(0.0f32).min(height_original),
                w,
                h,
                id,
                confidence,
            ));
        }
    }

    non_max_suppression(&mut boxes, iou_threshold);
    boxes
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array3;

    // (1, 4 + nc, anchors) tensor from per-anchor rows of [cx, cy, w, h, scores...]
    fn preds_from_rows(nc: usize, rows: &[Vec<f32>]) -> Array<f32, IxDyn> {
        let mut preds = Array3::<f32>::zeros((1, 4 + nc, rows.len()));
        for (a, row) in rows.iter().enumerate() {
            for (c, v) in row.iter().enumerate() {
                preds[[0, c, a]] = *v;
            }
        }
        preds.into_dyn()
    }

    #[test]
    fn test_decode_maps_cxcywh_to_xyxy() {
        let preds = preds_from_rows(2, &[vec![320.0, 320.0, 64.0, 64.0, 0.9, 0.05]]);
        let boxes = decode_predictions(&preds, 2, 0.25, 0.45, (640, 640), (640, 640));

        assert_eq!(boxes.len(), 1);
        let b = &boxes[0];
        assert_eq!(b.id(), 0);
        assert!((b.xmin() - 288.0).abs() < 1e-3);
        assert!((b.ymin() - 288.0).abs() < 1e-3);
        assert!((b.xmax() - 352.0).abs() < 1e-3);
        assert!((b.ymax() - 352.0).abs() < 1e-3);
    }

    #[test]
    fn test_decode_rescales_to_original_size() {
        // 1280x640 original letterboxed into 640x640: ratio = 0.5
        let preds = preds_from_rows(1, &[vec![160.0, 160.0, 64.0, 64.0, 0.8]]);
        let boxes = decode_predictions(&preds, 1, 0.25, 0.45, (1280, 640), (640, 640));

        assert_eq!(boxes.len(), 1);
        assert!((boxes[0].xmin() - 256.0).abs() < 1e-3);
        assert!((boxes[0].width() - 128.0).abs() < 1e-3);
    }

    #[test]
    fn test_decode_filters_below_confidence() {
        let preds = preds_from_rows(
            2,
            &[
                vec![320.0, 320.0, 64.0, 64.0, 0.9, 0.05],
                vec![100.0, 100.0, 32.0, 32.0, 0.1, 0.05],
            ],
        );
        let boxes = decode_predictions(&preds, 2, 0.25, 0.45, (640, 640), (640, 640));
        assert_eq!(boxes.len(), 1);
    }

    #[test]
    fn test_decode_clamps_to_image() {
        let preds = preds_from_rows(1, &[vec![4.0, 4.0, 64.0, 64.0, 0.9]]);
        let boxes = decode_predictions(&preds, 1, 0.25, 0.45, (640, 640), (640, 640));

        assert_eq!(boxes.len(), 1);
        assert_eq!(boxes[0].xmin(), 0.0);
        assert_eq!(boxes[0].ymin(), 0.0);
    }

    #[test]
    fn test_decode_picks_argmax_class() {
        let preds = preds_from_rows(3, &[vec![320.0, 320.0, 64.0, 64.0, 0.1, 0.7, 0.3]]);
        let boxes = decode_predictions(&preds, 3, 0.25, 0.45, (640, 640), (640, 640));

        assert_eq!(boxes.len(), 1);
        assert_eq!(boxes[0].id(), 1);
        assert!((boxes[0].confidence() - 0.7).abs() < 1e-6);
    }
}
