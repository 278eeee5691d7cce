use std::path::Path;

use anyhow::{Context, Result};
use image::RgbImage;

/// Extensions offered by the image file dialog.
pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "png", "jpeg"];

/// Read one image file into an RGB frame.
pub fn read_image(path: &Path) -> Result<RgbImage> {
    let img = image::open(path).with_context(|| format!("failed to read image {:?}", path))?;
    Ok(img.into_rgb8())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    #[test]
    fn test_read_image_missing_file() {
        assert!(read_image(Path::new("definitely/not/here.png")).is_err());
    }

    #[test]
    fn test_read_image_roundtrip() {
        let path = std::env::temp_dir().join("vigil_read_image_roundtrip.png");
        let img = RgbImage::from_pixel(8, 6, Rgb([10, 20, 30]));
        img.save(&path).unwrap();

        let back = read_image(&path).unwrap();
        assert_eq!(back.dimensions(), (8, 6));
        assert_eq!(*back.get_pixel(3, 3), Rgb([10, 20, 30]));

        let _ = std::fs::remove_file(&path);
    }
}
