use crate::color::Color;
use crate::error::CoreError;

/// Convertit les octets d'un pixel en RGBA non prémultiplié.
pub type PixelReader = fn(&[u8]) -> [u8; 4];

/// Closed set of pixel storage kinds a [`Bitmap`] can hold.
///
/// The reader for a layout is picked once per image, so the per-pixel path is
/// a plain slice read with no format dispatch.
///
/// # Example
/// ```
/// use sg_core::bitmap::PixelLayout;
/// let read = PixelLayout::LumaA8.reader();
/// assert_eq!(read(&[7, 255]), [7, 7, 7, 255]);
/// assert_eq!(PixelLayout::Rgb8.bytes_per_pixel(), 3);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PixelLayout {
    /// RGBA, straight (non-premultiplied) alpha.
    Rgba8,
    /// RGBA with color channels premultiplied by alpha.
    PremultipliedRgba8,
    /// RGB, implicitly opaque.
    Rgb8,
    /// Grayscale, implicitly opaque.
    Luma8,
    /// Grayscale + alpha.
    LumaA8,
}

impl PixelLayout {
    /// Bytes per pixel.
    #[must_use]
    pub const fn bytes_per_pixel(self) -> usize {
        match self {
            PixelLayout::Rgba8 | PixelLayout::PremultipliedRgba8 => 4,
            PixelLayout::Rgb8 => 3,
            PixelLayout::LumaA8 => 2,
            PixelLayout::Luma8 => 1,
        }
    }

    /// Straight-alpha RGBA reader for this layout.
    #[must_use]
    pub fn reader(self) -> PixelReader {
        match self {
            PixelLayout::Rgba8 => read_rgba,
            PixelLayout::PremultipliedRgba8 => read_premultiplied,
            PixelLayout::Rgb8 => read_rgb,
            PixelLayout::Luma8 => read_luma,
            PixelLayout::LumaA8 => read_luma_alpha,
        }
    }
}

fn read_rgba(px: &[u8]) -> [u8; 4] {
    [px[0], px[1], px[2], px[3]]
}

fn read_premultiplied(px: &[u8]) -> [u8; 4] {
    let a = px[3];
    match a {
        0 => [0, 0, 0, 0],
        255 => [px[0], px[1], px[2], 255],
        _ => {
            let a32 = u32::from(a);
            let unmul = |c: u8| ((u32::from(c) * 255 + a32 / 2) / a32).min(255) as u8;
            [unmul(px[0]), unmul(px[1]), unmul(px[2]), a]
        }
    }
}

fn read_rgb(px: &[u8]) -> [u8; 4] {
    [px[0], px[1], px[2], 255]
}

fn read_luma(px: &[u8]) -> [u8; 4] {
    [px[0], px[0], px[0], 255]
}

fn read_luma_alpha(px: &[u8]) -> [u8; 4] {
    [px[0], px[0], px[0], px[1]]
}

/// Image décodée, positionnée dans un canvas logique.
///
/// Pixels are stored row-major relative to `origin`; accessors take absolute
/// coordinates, so a GIF sub-frame at `(left, top)` is addressed in canvas
/// space.
///
/// # Example
/// ```
/// use sg_core::bitmap::{Bitmap, PixelLayout};
/// use sg_core::color::Color;
///
/// let bmp = Bitmap::new(1, 1, PixelLayout::Rgb8, vec![1, 2, 3])
///     .unwrap()
///     .with_origin(5, 7);
/// let read = bmp.reader();
/// assert_eq!(bmp.color_at(read, 5, 7), Color::rgb(1, 2, 3));
/// assert_eq!(bmp.color_at(read, 0, 0), Color::Transparent);
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Bitmap {
    data: Vec<u8>,
    width: u32,
    height: u32,
    origin: (u32, u32),
    layout: PixelLayout,
}

impl Bitmap {
    /// Wrap a pixel buffer, checking its length against the geometry.
    ///
    /// # Errors
    /// `InvalidDimensions` if `width * height` overflows, `BufferSize` if
    /// `data` is not exactly `width * height * bytes_per_pixel` long.
    pub fn new(
        width: u32,
        height: u32,
        layout: PixelLayout,
        data: Vec<u8>,
    ) -> Result<Self, CoreError> {
        let expected = (width as usize)
            .checked_mul(height as usize)
            .and_then(|n| n.checked_mul(layout.bytes_per_pixel()))
            .ok_or(CoreError::InvalidDimensions { width, height })?;
        if data.len() != expected {
            return Err(CoreError::BufferSize {
                expected,
                actual: data.len(),
            });
        }
        Ok(Self {
            data,
            width,
            height,
            origin: (0, 0),
            layout,
        })
    }

    /// Crée un bitmap RGBA entièrement transparent.
    ///
    /// # Example
    /// ```
    /// use sg_core::bitmap::Bitmap;
    /// let bmp = Bitmap::blank(4, 2);
    /// assert_eq!(bmp.data().len(), 4 * 2 * 4);
    /// ```
    #[must_use]
    pub fn blank(width: u32, height: u32) -> Self {
        Self {
            data: vec![0u8; width as usize * height as usize * 4],
            width,
            height,
            origin: (0, 0),
            layout: PixelLayout::Rgba8,
        }
    }

    /// Build a straight-alpha RGBA bitmap by evaluating `f(x, y)` per pixel.
    ///
    /// # Example
    /// ```
    /// use sg_core::bitmap::Bitmap;
    /// let bmp = Bitmap::from_fn(2, 1, |x, _| [x as u8, 0, 0, 255]);
    /// assert_eq!(bmp.rgba_at(1, 0), [1, 0, 0, 255]);
    /// ```
    #[must_use]
    pub fn from_fn(width: u32, height: u32, mut f: impl FnMut(u32, u32) -> [u8; 4]) -> Self {
        let mut data = Vec::with_capacity(width as usize * height as usize * 4);
        for y in 0..height {
            for x in 0..width {
                data.extend_from_slice(&f(x, y));
            }
        }
        Self {
            data,
            width,
            height,
            origin: (0, 0),
            layout: PixelLayout::Rgba8,
        }
    }

    /// Place the bitmap at `(x, y)` in its parent canvas.
    #[must_use]
    pub fn with_origin(mut self, x: u32, y: u32) -> Self {
        self.origin = (x, y);
        self
    }

    /// Width in pixels.
    #[must_use]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    #[must_use]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Top-left corner in canvas space.
    #[must_use]
    pub fn origin(&self) -> (u32, u32) {
        self.origin
    }

    /// Storage layout.
    #[must_use]
    pub fn layout(&self) -> PixelLayout {
        self.layout
    }

    /// Raw pixel bytes.
    #[must_use]
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Mutable raw pixel bytes.
    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// Reader for this bitmap's layout. Fetch once, reuse per pixel.
    #[must_use]
    pub fn reader(&self) -> PixelReader {
        self.layout.reader()
    }

    /// Byte offset of absolute pixel `(x, y)`, or `None` outside the bounds.
    #[inline(always)]
    fn offset(&self, x: u32, y: u32) -> Option<usize> {
        let lx = x.checked_sub(self.origin.0)?;
        let ly = y.checked_sub(self.origin.1)?;
        if lx >= self.width || ly >= self.height {
            return None;
        }
        Some((ly as usize * self.width as usize + lx as usize) * self.layout.bytes_per_pixel())
    }

    /// Straight RGBA at absolute `(x, y)` through a prefetched reader.
    /// Outside the bounds reads as fully transparent.
    #[inline(always)]
    #[must_use]
    pub fn rgba_with(&self, read: PixelReader, x: u32, y: u32) -> [u8; 4] {
        match self.offset(x, y) {
            Some(i) => read(&self.data[i..i + self.layout.bytes_per_pixel()]),
            None => [0, 0, 0, 0],
        }
    }

    /// Straight RGBA at absolute `(x, y)`.
    #[must_use]
    pub fn rgba_at(&self, x: u32, y: u32) -> [u8; 4] {
        self.rgba_with(self.reader(), x, y)
    }

    /// Quantizer color at absolute `(x, y)` through a prefetched reader.
    #[inline(always)]
    #[must_use]
    pub fn color_at(&self, read: PixelReader, x: u32, y: u32) -> Color {
        Color::from_rgba(self.rgba_with(read, x, y))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_short_buffer() {
        let err = Bitmap::new(2, 2, PixelLayout::Rgba8, vec![0; 15]);
        assert_eq!(
            err,
            Err(CoreError::BufferSize {
                expected: 16,
                actual: 15
            })
        );
    }

    #[test]
    fn premultiplied_is_unpremultiplied() {
        let read = PixelLayout::PremultipliedRgba8.reader();
        assert_eq!(read(&[64, 32, 0, 128]), [128, 64, 0, 128]);
        assert_eq!(read(&[0, 0, 0, 0]), [0, 0, 0, 0]);
        assert_eq!(read(&[10, 20, 30, 255]), [10, 20, 30, 255]);
    }

    #[test]
    fn origin_offsets_addressing() {
        let bmp = Bitmap::from_fn(2, 2, |x, y| [x as u8, y as u8, 9, 255]).with_origin(3, 1);
        assert_eq!(bmp.rgba_at(4, 2), [1, 1, 9, 255]);
        assert_eq!(bmp.rgba_at(2, 1), [0, 0, 0, 0]);
        assert_eq!(bmp.rgba_at(5, 1), [0, 0, 0, 0]);
    }

    #[test]
    fn luma_reads_as_gray() {
        let bmp = Bitmap::new(1, 1, PixelLayout::Luma8, vec![77]).unwrap();
        assert_eq!(bmp.color_at(bmp.reader(), 0, 0), Color::rgb(77, 77, 77));
    }
}
