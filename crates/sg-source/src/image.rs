use std::path::Path;

use anyhow::{Context, Result};
use image::DynamicImage;
use sg_core::bitmap::{Bitmap, PixelLayout};
use sg_core::error::CoreError;

/// Convertit une image décodée en [`Bitmap`], sans copie pour les formats 8 bits.
///
/// 16-bit images are narrowed to straight RGBA. Float images are rejected.
///
/// # Errors
/// `UnsupportedPixelFormat` for float or unknown color types.
///
/// # Example
/// ```
/// use image::{DynamicImage, GrayImage};
/// use sg_core::bitmap::PixelLayout;
/// use sg_source::image::bitmap_from_dynamic;
///
/// let img = DynamicImage::ImageLuma8(GrayImage::from_pixel(2, 4, image::Luma([90])));
/// let bmp = bitmap_from_dynamic(img).unwrap();
/// assert_eq!(bmp.layout(), PixelLayout::Luma8);
/// assert_eq!(bmp.rgba_at(1, 3), [90, 90, 90, 255]);
/// ```
pub fn bitmap_from_dynamic(img: DynamicImage) -> Result<Bitmap, CoreError> {
    let (width, height) = (img.width(), img.height());
    let (layout, data) = match img {
        DynamicImage::ImageLuma8(buf) => (PixelLayout::Luma8, buf.into_raw()),
        DynamicImage::ImageLumaA8(buf) => (PixelLayout::LumaA8, buf.into_raw()),
        DynamicImage::ImageRgb8(buf) => (PixelLayout::Rgb8, buf.into_raw()),
        DynamicImage::ImageRgba8(buf) => (PixelLayout::Rgba8, buf.into_raw()),
        DynamicImage::ImageLuma16(_)
        | DynamicImage::ImageLumaA16(_)
        | DynamicImage::ImageRgb16(_)
        | DynamicImage::ImageRgba16(_) => (PixelLayout::Rgba8, img.to_rgba8().into_raw()),
        other => {
            return Err(CoreError::UnsupportedPixelFormat {
                format: format!("{:?}", other.color()),
            });
        }
    };
    Bitmap::new(width, height, layout, data)
}

/// Charge une image fixe depuis le disque.
///
/// # Errors
/// Returns an error if the file cannot be decoded or uses an unsupported
/// pixel format.
///
/// # Example
/// ```no_run
/// use sg_source::image::load_bitmap;
/// use std::path::Path;
/// let bmp = load_bitmap(Path::new("photo.png")).unwrap();
/// ```
pub fn load_bitmap(path: &Path) -> Result<Bitmap> {
    // Contenu d'abord, l'extension seulement si le sniffing échoue.
    let img = image::ImageReader::open(path)
        .and_then(image::ImageReader::with_guessed_format)
        .with_context(|| format!("Impossible d'ouvrir {}", path.display()))?
        .decode()
        .with_context(|| format!("Impossible de charger {}", path.display()))?;
    let bitmap = bitmap_from_dynamic(img)
        .with_context(|| format!("Format de pixel non supporté : {}", path.display()))?;
    log::info!(
        "Image chargée : {} ({}×{}, {:?})",
        path.display(),
        bitmap.width(),
        bitmap.height(),
        bitmap.layout()
    );
    Ok(bitmap)
}
