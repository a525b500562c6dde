use std::time::Duration;

use sg_blocks::render::render_with;
use sg_core::bitmap::Bitmap;
use sg_core::config::RenderConfig;
use sg_core::error::CoreError;

use crate::canvas::Canvas;

/// Largest logical screen accepted, in pixels (4096×4096).
///
/// Two RGBA canvases of this size are live while compositing.
pub const MAX_CANVAS_PIXELS: u64 = 1 << 24;

/// Reject logical screens whose canvases would not fit [`MAX_CANVAS_PIXELS`].
///
/// # Errors
/// `InvalidDimensions` when `width × height` is over the limit.
///
/// # Example
/// ```
/// use sg_anim::compositor::check_canvas_size;
/// assert!(check_canvas_size(640, 480).is_ok());
/// assert!(check_canvas_size(65535, 65535).is_err());
/// ```
pub fn check_canvas_size(width: u32, height: u32) -> Result<(), CoreError> {
    if u64::from(width) * u64::from(height) > MAX_CANVAS_PIXELS {
        return Err(CoreError::InvalidDimensions { width, height });
    }
    Ok(())
}

/// Méthode de disposition d'une frame GIF.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Disposal {
    /// No instruction; behaves like `Keep`.
    #[default]
    Unspecified,
    /// Leave the frame in place.
    Keep,
    /// Restore the frame's area to the background.
    Background,
    /// Restore the frame's area to the previous canvas.
    Previous,
}

/// Animation décodée, avant composition.
///
/// `frames`, `delays` and `disposals` are parallel vectors.
#[derive(Clone, Debug, Default)]
pub struct Container {
    /// Frame bitmaps, each placed at its own origin.
    pub frames: Vec<Bitmap>,
    /// Display time of each frame.
    pub delays: Vec<Duration>,
    /// Disposal method of each frame.
    pub disposals: Vec<Disposal>,
    /// Logical screen width.
    pub width: u32,
    /// Logical screen height.
    pub height: u32,
}

/// One rendered frame of an [`Animation`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Frame {
    text: String,
    delay: Duration,
    lines: usize,
}

impl Frame {
    fn new(text: String, delay: Duration) -> Self {
        let lines = text.matches('\n').count();
        Self { text, delay, lines }
    }

    /// Rendered text.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// How long the frame stays on screen.
    #[must_use]
    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Number of `\n` in the text.
    #[must_use]
    pub fn lines(&self) -> usize {
        self.lines
    }
}

/// Animation entièrement rendue, immuable après construction.
#[derive(Clone, Debug)]
pub struct Animation {
    frames: Vec<Frame>,
    width: u32,
    height: u32,
}

impl Animation {
    /// Composite every frame of `container` on a persistent canvas and render it.
    ///
    /// Frame 0 replaces the clear canvas under its bounds; each later frame is
    /// drawn over the previous composite.
    ///
    /// # Errors
    /// `NoFrames` for an empty container, `MismatchedAnimation` when the frame,
    /// delay and disposal counts differ, `InvalidDimensions` when the logical
    /// screen is larger than [`MAX_CANVAS_PIXELS`].
    ///
    /// # Example
    /// ```
    /// use std::time::Duration;
    /// use sg_anim::compositor::{Animation, Container, Disposal};
    /// use sg_core::bitmap::Bitmap;
    /// use sg_core::config::RenderConfig;
    ///
    /// let container = Container {
    ///     frames: vec![Bitmap::from_fn(2, 4, |_, _| [255, 0, 0, 255])],
    ///     delays: vec![Duration::from_millis(100)],
    ///     disposals: vec![Disposal::Keep],
    ///     width: 2,
    ///     height: 4,
    /// };
    /// let anim = Animation::composite(&container, &RenderConfig::default()).unwrap();
    /// assert_eq!(anim.frame_text(0).unwrap(), "\x1b[48;5;196m \x1b[m");
    /// ```
    pub fn composite(container: &Container, config: &RenderConfig) -> Result<Self, CoreError> {
        let n = container.frames.len();
        if n == 0 {
            return Err(CoreError::NoFrames);
        }
        if container.delays.len() != n || container.disposals.len() != n {
            return Err(CoreError::MismatchedAnimation {
                frames: n,
                delays: container.delays.len(),
                disposals: container.disposals.len(),
            });
        }

        let (w, h) = (container.width, container.height);
        check_canvas_size(w, h)?;
        log::debug!("Composition de {n} frames sur {w}×{h}");

        let mut prev = Canvas::new(w, h);
        let mut base = Canvas::new(w, h);
        let mut frames = Vec::with_capacity(n);

        for (i, bitmap) in container.frames.iter().enumerate() {
            if i == 0 {
                base.draw_src(bitmap);
            } else {
                base.copy_from(&prev);
                base.draw_over(bitmap);
            }
            match container.disposals[i] {
                Disposal::Background | Disposal::Previous => log::debug!(
                    "Frame {i}: disposal {:?} non géré, traité comme Keep",
                    container.disposals[i]
                ),
                Disposal::Unspecified | Disposal::Keep => {}
            }

            frames.push(Frame::new(render_with(base.bitmap(), config), container.delays[i]));
            std::mem::swap(&mut prev, &mut base);
        }

        Ok(Self {
            frames,
            width: w,
            height: h,
        })
    }

    /// Number of frames, always at least one.
    #[must_use]
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// Never true for a constructed animation.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Logical canvas size in pixels.
    #[must_use]
    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// All frames in display order.
    #[must_use]
    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    /// Frame `n`.
    ///
    /// # Errors
    /// `FrameOutOfRange` when `n >= len()`.
    pub fn frame(&self, n: usize) -> Result<&Frame, CoreError> {
        self.frames.get(n).ok_or(CoreError::FrameOutOfRange {
            index: n,
            len: self.frames.len(),
        })
    }

    /// Rendered text of frame `n`.
    ///
    /// # Errors
    /// `FrameOutOfRange` when `n >= len()`.
    pub fn frame_text(&self, n: usize) -> Result<&str, CoreError> {
        self.frame(n).map(Frame::text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RED: [u8; 4] = [255, 0, 0, 255];
    const BLUE: [u8; 4] = [0, 0, 255, 255];

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    fn solid(w: u32, h: u32, px: [u8; 4]) -> Bitmap {
        Bitmap::from_fn(w, h, |_, _| px)
    }

    fn container(frames: Vec<Bitmap>, width: u32, height: u32) -> Container {
        let n = frames.len();
        Container {
            frames,
            delays: vec![ms(100); n],
            disposals: vec![Disposal::Unspecified; n],
            width,
            height,
        }
    }

    #[test]
    fn empty_container_is_rejected() {
        let err = Animation::composite(&Container::default(), &RenderConfig::default());
        assert_eq!(err.unwrap_err(), CoreError::NoFrames);
    }

    #[test]
    fn mismatched_counts_are_rejected() {
        let mut c = container(vec![solid(2, 4, RED), solid(2, 4, BLUE)], 2, 4);
        c.delays.pop();
        let err = Animation::composite(&c, &RenderConfig::default()).unwrap_err();
        assert_eq!(
            err,
            CoreError::MismatchedAnimation {
                frames: 2,
                delays: 1,
                disposals: 2
            }
        );

        let mut c = container(vec![solid(2, 4, RED)], 2, 4);
        c.disposals.push(Disposal::Keep);
        assert!(Animation::composite(&c, &RenderConfig::default()).is_err());
    }

    #[test]
    fn oversized_screen_is_rejected() {
        let c = container(vec![solid(1, 1, RED)], 65535, 65535);
        assert_eq!(
            Animation::composite(&c, &RenderConfig::default()).unwrap_err(),
            CoreError::InvalidDimensions {
                width: 65535,
                height: 65535
            }
        );

        assert!(check_canvas_size(4096, 4096).is_ok());
        assert!(check_canvas_size(4097, 4096).is_err());
    }

    #[test]
    fn frame_access() {
        let mut c = container(vec![solid(2, 4, RED), solid(2, 4, BLUE)], 2, 4);
        c.delays = vec![ms(30), ms(70)];
        let anim = Animation::composite(&c, &RenderConfig::default()).unwrap();

        assert_eq!(anim.len(), 2);
        assert!(!anim.is_empty());
        assert_eq!(anim.size(), (2, 4));
        assert_eq!(anim.frame_text(0).unwrap(), "\x1b[48;5;196m \x1b[m");
        assert_eq!(anim.frame_text(1).unwrap(), "\x1b[48;5;21m \x1b[m");
        assert_eq!(anim.frame(1).unwrap().delay(), ms(70));
        assert_eq!(
            anim.frame_text(2),
            Err(CoreError::FrameOutOfRange { index: 2, len: 2 })
        );
    }

    #[test]
    fn partial_frames_composite_over_previous() {
        let first = solid(4, 4, RED);
        let patch = solid(2, 4, BLUE).with_origin(2, 0);
        let anim = Animation::composite(&container(vec![first, patch], 4, 4), &RenderConfig::default())
            .unwrap();
        assert_eq!(anim.frame_text(0).unwrap(), "\x1b[48;5;196m  \x1b[m");
        assert_eq!(anim.frame_text(1).unwrap(), "\x1b[48;5;196m \x1b[48;5;21m \x1b[m");
    }

    #[test]
    fn transparent_pixels_keep_previous_content() {
        let first = solid(2, 4, RED);
        let hole = Bitmap::blank(2, 4);
        let anim =
            Animation::composite(&container(vec![first, hole], 2, 4), &RenderConfig::default()).unwrap();
        assert_eq!(anim.frame_text(1).unwrap(), anim.frame_text(0).unwrap());
    }

    #[test]
    fn first_frame_smaller_than_canvas() {
        let first = solid(2, 4, BLUE).with_origin(2, 0);
        let anim = Animation::composite(&container(vec![first], 4, 4), &RenderConfig::default()).unwrap();
        assert_eq!(anim.frame_text(0).unwrap(), " \x1b[48;5;21m \x1b[m");
    }

    #[test]
    fn disposal_modes_fall_back_to_keep() {
        let mut c = container(vec![solid(2, 4, RED), Bitmap::blank(2, 4)], 2, 4);
        c.disposals = vec![Disposal::Background, Disposal::Previous];
        let anim = Animation::composite(&c, &RenderConfig::default()).unwrap();
        assert_eq!(anim.frame_text(1).unwrap(), "\x1b[48;5;196m \x1b[m");
    }

    #[test]
    fn line_counts() {
        let anim =
            Animation::composite(&container(vec![solid(2, 12, RED)], 2, 12), &RenderConfig::default())
                .unwrap();
        assert_eq!(anim.frame(0).unwrap().lines(), 2);
    }
}
