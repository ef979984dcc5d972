//! Decoding, display-size fitting, and encoding of the edited image.

use std::path::{Path, PathBuf};

use image::{ColorType, DynamicImage, GenericImageView, ImageReader, RgbaImage, imageops};

use crate::error::CanvasError;

/// A decoded image plus what is needed to write it back in its own shape.
#[derive(Debug, Clone)]
pub struct SourceImage {
    pub pixels: DynamicImage,
    pub path: Option<PathBuf>,
}

impl SourceImage {
    pub fn from_image(pixels: DynamicImage) -> Self {
        Self { pixels, path: None }
    }

    /// Native pixel dimensions (width, height).
    pub fn dimensions(&self) -> (u32, u32) {
        self.pixels.dimensions()
    }

    pub fn color(&self) -> ColorType {
        self.pixels.color()
    }
}

/// Decodes the image at `path`, sniffing the format from its contents.
pub fn read_image(path: &Path) -> Result<SourceImage, CanvasError> {
    let pixels = ImageReader::open(path)?.with_guessed_format()?.decode()?;
    log::info!(
        "decoded {} ({}x{}, {:?})",
        path.display(),
        pixels.width(),
        pixels.height(),
        pixels.color()
    );
    Ok(SourceImage {
        pixels,
        path: Some(path.to_path_buf()),
    })
}

/// Size that puts the longer edge at `resolution`, truncating the shorter one.
pub fn fitted_size(width: u32, height: u32, resolution: u32) -> (u32, u32) {
    let longest = width.max(height);
    if longest == 0 || resolution == 0 {
        return (width, height);
    }
    let scale = resolution as f64 / longest as f64;
    (
        ((width as f64 * scale) as u32).max(1),
        ((height as f64 * scale) as u32).max(1),
    )
}

/// Builds the RGBA working image, resized when a display resolution is set.
pub fn working_image(source: &SourceImage, resolution: Option<u32>) -> RgbaImage {
    let rgba = source.pixels.to_rgba8();
    let Some(resolution) = resolution else {
        return rgba;
    };

    let (w, h) = rgba.dimensions();
    let (fw, fh) = fitted_size(w, h, resolution);
    if (fw, fh) == (w, h) {
        rgba
    } else {
        imageops::resize(&rgba, fw, fh, imageops::FilterType::Triangle)
    }
}

/// Scales `working` back to `native` size and converts it to `color`'s layout.
pub fn export_image(working: &RgbaImage, native: (u32, u32), color: ColorType) -> DynamicImage {
    let restored = if working.dimensions() == native {
        working.clone()
    } else {
        imageops::resize(working, native.0, native.1, imageops::FilterType::Triangle)
    };

    let rgba = DynamicImage::ImageRgba8(restored);
    match (color.has_color(), color.has_alpha()) {
        (true, true) => rgba,
        (true, false) => DynamicImage::ImageRgb8(rgba.to_rgb8()),
        (false, true) => DynamicImage::ImageLumaA8(rgba.to_luma_alpha8()),
        (false, false) => DynamicImage::ImageLuma8(rgba.to_luma8()),
    }
}

/// Encodes `image` to `path`, format chosen by extension. Returns the file size.
pub fn write_image(path: &Path, image: &DynamicImage) -> Result<u64, CanvasError> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)?;
    }

    let needs_opaque = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| matches!(e.to_ascii_lowercase().as_str(), "jpg" | "jpeg"));

    if needs_opaque && image.color().has_alpha() {
        DynamicImage::ImageRgb8(image.to_rgb8()).save(path)?;
    } else {
        image.save(path)?;
    }

    let size = std::fs::metadata(path)?.len();
    log::info!("wrote {} ({} bytes)", path.display(), size);
    Ok(size)
}

/// Lower-case extensions offered by the open and save dialogs and picked up
/// by directory scans.
pub const IMAGE_EXTENSIONS: [&str; 8] = ["png", "jpg", "jpeg", "bmp", "gif", "tif", "tiff", "webp"];

/// True for file names the viewer offers to open.
pub fn is_image_file(path: &Path) -> bool {
    let Some(ext) = path.extension().and_then(|e| e.to_str()) else {
        return false;
    };
    IMAGE_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    #[test]
    fn fitted_size_scales_longer_edge() {
        assert_eq!(fitted_size(1440, 900, 720), (720, 450));
        assert_eq!(fitted_size(300, 600, 720), (360, 720));
        assert_eq!(fitted_size(0, 0, 720), (0, 0));
    }

    #[test]
    fn working_image_keeps_native_size_without_resolution() {
        let source = SourceImage::from_image(DynamicImage::ImageRgb8(RgbImage::new(30, 20)));
        assert_eq!(working_image(&source, None).dimensions(), (30, 20));
        assert_eq!(working_image(&source, Some(60)).dimensions(), (60, 40));
    }

    #[test]
    fn export_restores_size_and_layout() {
        let working = RgbaImage::new(60, 40);
        let out = export_image(&working, (30, 20), ColorType::Rgb8);
        assert_eq!(out.dimensions(), (30, 20));
        assert_eq!(out.color(), ColorType::Rgb8);

        let gray = export_image(&working, (60, 40), ColorType::L8);
        assert_eq!(gray.color(), ColorType::L8);
    }

    #[test]
    fn image_extensions() {
        assert!(is_image_file(Path::new("a/b.PNG")));
        assert!(is_image_file(Path::new("shot.jpeg")));
        assert!(!is_image_file(Path::new("notes.txt")));
        assert!(!is_image_file(Path::new("README")));
        assert!(is_image_file(Path::new("anim.gif")));
        assert!(is_image_file(Path::new("photo.WebP")));
        for ext in IMAGE_EXTENSIONS {
            assert!(is_image_file(&Path::new("x").with_extension(ext)), "{ext}");
            assert!(is_image_file(&Path::new("x").with_extension(ext.to_uppercase())), "{ext}");
        }
    }

    #[test]
    fn write_then_read_keeps_pixels() {
        let dir = std::env::temp_dir().join(format!("inset_lens_io_{}", std::process::id()));
        let path = dir.join("roundtrip.png");
        let mut img = RgbImage::new(4, 4);
        img.put_pixel(1, 2, Rgb([10, 20, 30]));

        let written = write_image(&path, &DynamicImage::ImageRgb8(img)).unwrap();
        assert!(written > 0);

        let back = read_image(&path).unwrap();
        assert_eq!(back.dimensions(), (4, 4));
        assert_eq!(back.pixels.to_rgb8().get_pixel(1, 2), &Rgb([10, 20, 30]));
        std::fs::remove_dir_all(&dir).ok();
    }
}
