//! Adaptateurs de décodage : images fixes via `image`, animations via `gif`.

pub mod gif;
pub mod image;

use std::path::Path;

use anyhow::{Context, Result};
use sg_anim::compositor::Container;
use sg_core::bitmap::Bitmap;

pub use crate::gif::{load_container, read_container};
pub use crate::image::{bitmap_from_dynamic, load_bitmap};

/// Entrée décodée, fixe ou animée.
#[derive(Debug)]
pub enum Input {
    /// A single still image.
    Still(Bitmap),
    /// A GIF, possibly with a single frame.
    Animated(Container),
}

impl Input {
    /// Sniff the file contents and decode it with the matching adapter.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read, its format is not
    /// recognized, or decoding fails.
    ///
    /// # Example
    /// ```no_run
    /// use sg_source::Input;
    /// use std::path::Path;
    /// match Input::detect(Path::new("anim.gif")).unwrap() {
    ///     Input::Still(bmp) => println!("{}×{}", bmp.width(), bmp.height()),
    ///     Input::Animated(c) => println!("{} frames", c.frames.len()),
    /// }
    /// ```
    pub fn detect(path: &Path) -> Result<Self> {
        let format = ::image::ImageReader::open(path)
            .and_then(::image::ImageReader::with_guessed_format)
            .with_context(|| format!("Impossible de lire {}", path.display()))?
            .format()
            .with_context(|| format!("Format inconnu : {}", path.display()))?;
        log::debug!("{} détecté comme {format:?}", path.display());

        if format == ::image::ImageFormat::Gif {
            load_container(path).map(Input::Animated)
        } else {
            load_bitmap(path).map(Input::Still)
        }
    }
}

#[cfg(test)]
mod tests {
    use ::gif::DisposalMethod;
    use ::image::{Rgb, RgbImage};

    use super::*;

    #[test]
    fn png_is_still() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("still.png");
        RgbImage::from_pixel(2, 4, Rgb([0, 0, 255])).save(&path).unwrap();
        assert!(matches!(Input::detect(&path).unwrap(), Input::Still(_)));
    }

    #[test]
    fn gif_is_animated() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("anim.gif");
        let data = crate::gif::tests::encode(
            2,
            4,
            &[
                (0, 0, 2, 4, [255, 0, 0, 255], 10, DisposalMethod::Keep),
                (0, 0, 2, 4, [0, 0, 255, 255], 10, DisposalMethod::Keep),
            ],
        );
        std::fs::write(&path, data).unwrap();
        let Input::Animated(container) = Input::detect(&path).unwrap() else {
            panic!("expected an animation");
        };
        assert_eq!(container.frames.len(), 2);
    }

    #[test]
    fn gif_without_extension_is_animated() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("anim");
        let data = crate::gif::tests::encode(
            2,
            4,
            &[(0, 0, 2, 4, [0, 255, 0, 255], 7, DisposalMethod::Keep)],
        );
        std::fs::write(&path, data).unwrap();
        let Input::Animated(container) = Input::detect(&path).unwrap() else {
            panic!("expected an animation");
        };
        assert_eq!(container.delays, vec![std::time::Duration::from_millis(70)]);
    }

    #[test]
    fn unknown_format_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        std::fs::write(&path, "hello").unwrap();
        assert!(Input::detect(&path).is_err());
    }
}
