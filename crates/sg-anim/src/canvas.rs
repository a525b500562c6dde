use sg_core::bitmap::Bitmap;

/// Canvas RGBA (alpha non prémultiplié) sur lequel les frames sont composées.
///
/// # Example
/// ```
/// use sg_anim::canvas::Canvas;
/// use sg_core::bitmap::Bitmap;
///
/// let mut canvas = Canvas::new(4, 4);
/// let dot = Bitmap::from_fn(1, 1, |_, _| [9, 9, 9, 255]).with_origin(2, 3);
/// canvas.draw_src(&dot);
/// assert_eq!(canvas.bitmap().rgba_at(2, 3), [9, 9, 9, 255]);
/// assert_eq!(canvas.bitmap().rgba_at(0, 0), [0, 0, 0, 0]);
/// ```
#[derive(Clone, Debug)]
pub struct Canvas {
    bitmap: Bitmap,
}

impl Canvas {
    /// Fully transparent canvas.
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            bitmap: Bitmap::blank(width, height),
        }
    }

    /// Canvas contents, ready to render.
    #[must_use]
    pub fn bitmap(&self) -> &Bitmap {
        &self.bitmap
    }

    /// Width in pixels.
    #[must_use]
    pub fn width(&self) -> u32 {
        self.bitmap.width()
    }

    /// Height in pixels.
    #[must_use]
    pub fn height(&self) -> u32 {
        self.bitmap.height()
    }

    /// Copy another canvas of the same size into this one.
    ///
    /// Sizes differ only if the caller mixed canvases; the overlap is copied.
    pub fn copy_from(&mut self, other: &Canvas) {
        let src = other.bitmap.data();
        let dst = self.bitmap.data_mut();
        let n = src.len().min(dst.len());
        dst[..n].copy_from_slice(&src[..n]);
    }

    /// Replace the pixels under `frame` with the frame's own (Porter-Duff `Src`).
    pub fn draw_src(&mut self, frame: &Bitmap) {
        self.blend(frame, |src, _| src);
    }

    /// Composite `frame` over the current contents (Porter-Duff `Over`).
    pub fn draw_over(&mut self, frame: &Bitmap) {
        self.blend(frame, over);
    }

    /// Applique `op(src, dst)` sur l'intersection du frame et du canvas.
    fn blend(&mut self, frame: &Bitmap, op: impl Fn([u8; 4], [u8; 4]) -> [u8; 4]) {
        let (ox, oy) = frame.origin();
        let x_end = ox.saturating_add(frame.width()).min(self.width());
        let y_end = oy.saturating_add(frame.height()).min(self.height());
        if ox >= x_end || oy >= y_end {
            return;
        }

        let read = frame.reader();
        let stride = self.width() as usize * 4;
        let data = self.bitmap.data_mut();
        for y in oy..y_end {
            let row = y as usize * stride;
            for x in ox..x_end {
                let i = row + x as usize * 4;
                let dst = [data[i], data[i + 1], data[i + 2], data[i + 3]];
                let out = op(frame.rgba_with(read, x, y), dst);
                data[i..i + 4].copy_from_slice(&out);
            }
        }
    }
}

/// Straight-alpha `src over dst`, rounded to the nearest byte.
fn over(src: [u8; 4], dst: [u8; 4]) -> [u8; 4] {
    let sa = u32::from(src[3]);
    if sa == 255 {
        return src;
    }
    if sa == 0 {
        return dst;
    }

    // Alphas below are scaled by 255.
    let dw = u32::from(dst[3]) * (255 - sa);
    let out_a = sa * 255 + dw;
    if out_a == 0 {
        return [0, 0, 0, 0];
    }
    let channel =
        |k: usize| ((u32::from(src[k]) * sa * 255 + u32::from(dst[k]) * dw + out_a / 2) / out_a) as u8;
    [channel(0), channel(1), channel(2), ((out_a + 127) / 255) as u8]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn over_fast_paths() {
        assert_eq!(over([1, 2, 3, 255], [9, 9, 9, 255]), [1, 2, 3, 255]);
        assert_eq!(over([1, 2, 3, 0], [9, 9, 9, 200]), [9, 9, 9, 200]);
        assert_eq!(over([1, 2, 3, 0], [0, 0, 0, 0]), [0, 0, 0, 0]);
    }

    #[test]
    fn half_red_over_blue() {
        assert_eq!(over([255, 0, 0, 128], [0, 0, 255, 255]), [128, 0, 127, 255]);
    }

    #[test]
    fn partial_over_transparent_keeps_color() {
        assert_eq!(over([200, 100, 50, 128], [0, 0, 0, 0]), [200, 100, 50, 128]);
    }

    #[test]
    fn draw_over_skips_transparent_pixels() {
        let mut canvas = Canvas::new(2, 1);
        canvas.draw_src(&Bitmap::from_fn(2, 1, |_, _| [10, 20, 30, 255]));
        canvas.draw_over(&Bitmap::from_fn(2, 1, |x, _| {
            if x == 0 { [0, 0, 0, 0] } else { [99, 99, 99, 255] }
        }));
        assert_eq!(canvas.bitmap().rgba_at(0, 0), [10, 20, 30, 255]);
        assert_eq!(canvas.bitmap().rgba_at(1, 0), [99, 99, 99, 255]);
    }

    #[test]
    fn draw_src_overwrites_with_transparency() {
        let mut canvas = Canvas::new(1, 1);
        canvas.draw_src(&Bitmap::from_fn(1, 1, |_, _| [10, 20, 30, 255]));
        canvas.draw_src(&Bitmap::blank(1, 1));
        assert_eq!(canvas.bitmap().rgba_at(0, 0), [0, 0, 0, 0]);
    }

    #[test]
    fn frames_are_clipped() {
        let mut canvas = Canvas::new(3, 3);
        let frame = Bitmap::from_fn(4, 4, |_, _| [1, 1, 1, 255]).with_origin(2, 2);
        canvas.draw_over(&frame);
        assert_eq!(canvas.bitmap().rgba_at(2, 2), [1, 1, 1, 255]);
        assert_eq!(canvas.bitmap().rgba_at(1, 2), [0, 0, 0, 0]);

        let outside = Bitmap::from_fn(1, 1, |_, _| [1, 1, 1, 255]).with_origin(7, 0);
        canvas.draw_over(&outside);
    }

    #[test]
    fn copy_from_same_size() {
        let mut a = Canvas::new(2, 2);
        a.draw_src(&Bitmap::from_fn(2, 2, |_, _| [5, 5, 5, 255]));
        let mut b = Canvas::new(2, 2);
        b.copy_from(&a);
        assert_eq!(b.bitmap().data(), a.bitmap().data());
    }
}
