use clap::Parser;

/// Crowd & weapon detection viewer.
#[derive(Parser, Debug, Clone)]
#[command(author, version, about = "Crowd & weapon detection viewer", long_about = None)]
pub struct Args {
    /// Crowd model weights (ONNX)
    #[arg(long, default_value = "models/crowd.onnx")]
    pub crowd_model: String,

    /// Weapon model weights (ONNX)
    #[arg(long, default_value = "models/weapon.onnx")]
    pub weapon_model: String,

    /// Training-results chart shown by "View Graph"
    #[arg(long, default_value = "models/results.png")]
    pub results_chart: String,

    /// Viewer settings file (JSON)
    #[arg(long, default_value = "vigil.json")]
    pub settings: String,

    /// Run inference on the CUDA execution provider
    #[arg(long)]
    pub cuda: bool,

    /// CUDA device id
    #[arg(long, default_value_t = 0)]
    pub device_id: i32,

    /// Model input size (square)
    #[arg(long, default_value_t = 640)]
    pub imgsz: u32,

    /// Print per-stage inference timings
    #[arg(long)]
    pub profile: bool,
}
