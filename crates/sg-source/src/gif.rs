//! Décodage GIF vers un [`Container`] prêt à composer.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use gif::{ColorOutput, DecodeOptions, DisposalMethod};
use sg_anim::compositor::{Container, Disposal, check_canvas_size};
use sg_core::bitmap::{Bitmap, PixelLayout};

/// GIF delays are in hundredths of a second.
const DELAY_UNIT: Duration = Duration::from_millis(10);

fn disposal(method: DisposalMethod) -> Disposal {
    match method {
        DisposalMethod::Any => Disposal::Unspecified,
        DisposalMethod::Keep => Disposal::Keep,
        DisposalMethod::Background => Disposal::Background,
        DisposalMethod::Previous => Disposal::Previous,
    }
}

/// Décode toutes les frames d'un GIF.
///
/// Each frame keeps its own size and sits at `(left, top)` on the logical
/// screen; transparent palette entries come out with alpha 0.
///
/// # Errors
/// Returns an error if the stream is not a valid GIF, or if its logical
/// screen is too large to composite.
pub fn read_container<R: Read>(reader: R) -> Result<Container> {
    let mut options = DecodeOptions::new();
    options.set_color_output(ColorOutput::RGBA);
    let mut decoder = options.read_info(reader).context("En-tête GIF invalide")?;

    let mut container = Container {
        width: u32::from(decoder.width()),
        height: u32::from(decoder.height()),
        ..Container::default()
    };
    check_canvas_size(container.width, container.height)?;

    while let Some(frame) = decoder
        .read_next_frame()
        .with_context(|| format!("Frame GIF {} illisible", container.frames.len()))?
    {
        let bitmap = Bitmap::new(
            u32::from(frame.width),
            u32::from(frame.height),
            PixelLayout::Rgba8,
            frame.buffer.to_vec(),
        )?
        .with_origin(u32::from(frame.left), u32::from(frame.top));
        container.frames.push(bitmap);
        container.delays.push(DELAY_UNIT * u32::from(frame.delay));
        container.disposals.push(disposal(frame.dispose));
    }

    log::debug!(
        "GIF {}×{} : {} frames",
        container.width,
        container.height,
        container.frames.len()
    );
    Ok(container)
}

/// Ouvre et décode un fichier GIF.
///
/// # Errors
/// Returns an error if the file cannot be opened or decoded.
///
/// # Example
/// ```no_run
/// use sg_source::gif::load_container;
/// use std::path::Path;
/// let container = load_container(Path::new("anim.gif")).unwrap();
/// println!("{} frames", container.frames.len());
/// ```
pub fn load_container(path: &Path) -> Result<Container> {
    let file = File::open(path).with_context(|| format!("Impossible d'ouvrir {}", path.display()))?;
    let container = read_container(BufReader::new(file))
        .with_context(|| format!("GIF invalide : {}", path.display()))?;
    log::info!(
        "GIF chargé : {} ({} frames)",
        path.display(),
        container.frames.len()
    );
    Ok(container)
}

#[cfg(test)]
pub(crate) mod tests {
    use std::io::Cursor;

    use sg_core::error::CoreError;

    use super::*;

    /// Encode `frames` as `(left, top, width, height, rgba, delay)` into a GIF.
    pub(crate) fn encode(
        width: u16,
        height: u16,
        frames: &[(u16, u16, u16, u16, [u8; 4], u16, DisposalMethod)],
    ) -> Vec<u8> {
        let mut out = Vec::new();
        {
            let mut encoder = gif::Encoder::new(&mut out, width, height, &[]).unwrap();
            for &(left, top, w, h, px, delay, dispose) in frames {
                let mut pixels: Vec<u8> = px.repeat(usize::from(w) * usize::from(h));
                let mut frame = gif::Frame::from_rgba_speed(w, h, &mut pixels, 10);
                frame.left = left;
                frame.top = top;
                frame.delay = delay;
                frame.dispose = dispose;
                encoder.write_frame(&frame).unwrap();
            }
        }
        out
    }

    #[test]
    fn decodes_frames_delays_and_offsets() {
        let data = encode(
            4,
            8,
            &[
                (0, 0, 4, 8, [255, 0, 0, 255], 5, DisposalMethod::Keep),
                (2, 4, 2, 4, [0, 0, 255, 255], 12, DisposalMethod::Background),
            ],
        );
        let container = read_container(Cursor::new(data)).unwrap();

        assert_eq!((container.width, container.height), (4, 8));
        assert_eq!(container.frames.len(), 2);
        assert_eq!(
            container.delays,
            vec![Duration::from_millis(50), Duration::from_millis(120)]
        );
        assert_eq!(
            container.disposals,
            vec![Disposal::Keep, Disposal::Background]
        );

        let patch = &container.frames[1];
        assert_eq!(patch.origin(), (2, 4));
        assert_eq!((patch.width(), patch.height()), (2, 4));
        assert_eq!(patch.rgba_at(3, 7), [0, 0, 255, 255]);
        assert_eq!(container.frames[0].rgba_at(0, 0), [255, 0, 0, 255]);
    }

    #[test]
    fn transparent_pixels_have_zero_alpha() {
        let data = encode(2, 4, &[(0, 0, 2, 4, [0, 0, 0, 0], 0, DisposalMethod::Any)]);
        let container = read_container(Cursor::new(data)).unwrap();
        assert_eq!(container.frames[0].rgba_at(1, 1)[3], 0);
        assert_eq!(container.disposals, vec![Disposal::Unspecified]);
    }

    #[test]
    fn oversized_logical_screen_is_rejected() {
        let data = encode(65535, 65535, &[(0, 0, 1, 1, [9, 9, 9, 255], 1, DisposalMethod::Keep)]);
        let err = read_container(Cursor::new(data)).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<CoreError>(),
            Some(CoreError::InvalidDimensions { width: 65535, height: 65535 })
        ));
    }

    #[test]
    fn garbage_is_rejected() {
        assert!(read_container(Cursor::new(b"not a gif".to_vec())).is_err());
    }

    #[test]
    fn load_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("anim.gif");
        let data = encode(2, 4, &[(0, 0, 2, 4, [0, 255, 0, 255], 3, DisposalMethod::Keep)]);
        std::fs::write(&path, data).unwrap();
        let container = load_container(&path).unwrap();
        assert_eq!(container.frames.len(), 1);
        assert_eq!(container.delays[0], Duration::from_millis(30));
    }
}
