// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

use anyhow::{Context, Result};
use ndarray::{Array, IxDyn};
use ort::{
    CPUExecutionProvider, CUDAExecutionProvider, ExecutionProviderDispatch,
    GraphOptimizationLevel, Session,
};
use regex::Regex;

/// Execution provider selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrtEP {
    Cpu,
    Cuda(i32),
}

/// Backend build parameters.
#[derive(Debug, Clone)]
pub struct OrtConfig {
    pub model_path: String,
    pub ep: OrtEP,
    /// (height, width) the model expects
    pub image_size: (u32, u32),
}

/// ONNX Runtime session wrapper: build, forward pass, metadata access.
pub struct OrtBackend {
    session: Session,
    ep: OrtEP,
    height: u32,
    width: u32,
}

impl OrtBackend {
    pub fn build(config: OrtConfig) -> Result<Self> {
        let eps: Vec<ExecutionProviderDispatch> = match config.ep {
            OrtEP::Cuda(id) => vec![CUDAExecutionProvider::default().with_device_id(id).build()],
            OrtEP::Cpu => vec![CPUExecutionProvider::default().build()],
        };

        let session = Session::builder()?
            .with_execution_providers(eps)?
            .with_optimization_level(GraphOptimizationLevel::Level3)?
            .commit_from_file(&config.model_path)
            .with_context(|| format!("failed to load model from {:?}", config.model_path))?;

        Ok(Self {
            session,
            ep: config.ep,
            height: config.image_size.0,
            width: config.image_size.1,
        })
    }

    /// Forward pass: NCHW f32 input tensor -> owned f32 output tensors in
    /// graph order.
    pub fn run(&mut self, xs: Array<f32, IxDyn>, profile: bool) -> Result<Vec<Array<f32, IxDyn>>> {
        let t_run = std::time::Instant::now();
        let ys = self.session.run(ort::inputs![xs.view()]?)?;
        if profile {
            log::info!("[ORT inference]: {:?}", t_run.elapsed());
        }

        let mut ys_ = Vec::new();
        for (_, y) in ys.iter() {
            let y = y.try_extract_tensor::<f32>()?.view().into_owned();
            ys_.push(y);
        }
        Ok(ys_)
    }

    fn fetch_from_metadata(&self, key: &str) -> Option<String> {
        let meta = self.session.metadata().ok()?;
        meta.custom(key).ok()?
    }

    /// Class-id -> class-name table from Ultralytics model metadata
    /// (the `names` custom key: `{0: 'person', 1: 'knife', ...}`).
    pub fn names(&self) -> Option<Vec<String>> {
        let raw = self.fetch_from_metadata("names")?;
        let names = parse_names_field(&raw);
        if names.is_empty() {
            None
        } else {
            Some(names)
        }
    }

    pub fn nc(&self) -> Option<u32> {
        self.names().map(|names| names.len() as u32)
    }

    pub fn ep(&self) -> &OrtEP {
        &self.ep
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn width(&self) -> u32 {
        self.width
    }
}

/// Parse the Ultralytics `names` metadata dict into an ordered name list.
pub fn parse_names_field(raw: &str) -> Vec<String> {
    let re = Regex::new(r#"(['"])([-()\w '"]+)(['"])"#).unwrap();
    let mut names = Vec::new();
    for (_, [_, name, _]) in re.captures_iter(raw).map(|c| c.extract()) {
        names.push(name.to_string());
    }
    names
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_names_field() {
        let raw = "{0: 'person', 1: 'bicycle', 2: 'traffic light'}";
        let names = parse_names_field(raw);
        assert_eq!(names, vec!["person", "bicycle", "traffic light"]);
    }

    #[test]
    fn test_parse_names_field_double_quoted() {
        let raw = r#"{0: "knife", 1: "pistol"}"#;
        let names = parse_names_field(raw);
        assert_eq!(names, vec!["knife", "pistol"]);
    }

    #[test]
    fn test_parse_names_field_empty() {
        assert!(parse_names_field("{}").is_empty());
    }
}
