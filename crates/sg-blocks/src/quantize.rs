use sg_core::bitmap::{Bitmap, PixelReader};
use sg_core::color::{Channel, Color, average_in};
use sg_core::config::BlendSpace;

use crate::glyphs::glyph;

/// Un échantillon d'un bloc 2×4, avec sa position d'origine.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Sample {
    /// Sampled color.
    pub color: Color,
    /// Position in the block, 0..8 (`x = index % 2`, `y = index / 2`).
    pub index: u8,
}

/// Result of quantizing one block: two colors and an occupancy mask.
///
/// # Example
/// ```
/// use sg_blocks::quantize::Cell;
/// assert_eq!(Cell::EMPTY.glyph(), ' ');
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Cell {
    /// Color of the samples whose bit is set in `mask`.
    pub fg: Color,
    /// Color of the remaining samples.
    pub bg: Color,
    /// Bit i set ⇒ sample i is foreground.
    pub mask: u8,
}

impl Cell {
    /// Fully transparent cell; renders as a bare space.
    pub const EMPTY: Cell = Cell {
        fg: Color::Transparent,
        bg: Color::Transparent,
        mask: 0,
    };

    /// Glyph for this cell's mask.
    #[inline(always)]
    #[must_use]
    pub const fn glyph(&self) -> char {
        glyph(self.mask)
    }

    /// `true` when the glyph is a space, so the foreground is never visible.
    #[inline(always)]
    #[must_use]
    pub const fn is_blank(&self) -> bool {
        self.mask == 0
    }
}

/// Collecte les 8 échantillons du bloc dont le coin haut-gauche est `(x0, y0)`.
///
/// Coordinates are absolute (canvas space), as for [`Bitmap::color_at`].
#[inline(always)]
#[must_use]
pub fn sample_block(bitmap: &Bitmap, read: PixelReader, x0: u32, y0: u32) -> [Sample; 8] {
    std::array::from_fn(|i| {
        let i = i as u32;
        Sample {
            color: bitmap.color_at(read, x0 + i % 2, y0 + i / 2),
            index: i as u8,
        }
    })
}

/// Canal de plus grande étendue, ou `None` si le bloc est uniforme.
///
/// Transparent samples take part with their nominal zero channels. Ties go to
/// red, then green, then blue.
///
/// # Example
/// ```
/// use sg_blocks::quantize::{widest_channel, Sample};
/// use sg_core::color::{Channel, Color};
///
/// let block = std::array::from_fn(|i| Sample {
///     color: Color::rgb(0, (i * 30) as u8, 0),
///     index: i as u8,
/// });
/// assert_eq!(widest_channel(&block), Some(Channel::Green));
/// ```
#[must_use]
pub fn widest_channel(samples: &[Sample; 8]) -> Option<Channel> {
    let mut lo = [u8::MAX; 3];
    let mut hi = [u8::MIN; 3];
    for s in samples {
        for (k, v) in s.color.channels().into_iter().enumerate() {
            lo[k] = lo[k].min(v);
            hi[k] = hi[k].max(v);
        }
    }
    let range = [hi[0] - lo[0], hi[1] - lo[1], hi[2] - lo[2]];
    if range == [0, 0, 0] {
        return None;
    }

    let mut best = Channel::Red;
    for ch in Channel::ALL {
        if range[ch.index()] > range[best.index()] {
            best = ch;
        }
    }
    Some(best)
}

/// Quantifie un bloc en deux couleurs et un masque d'occupation.
///
/// The samples are sorted (stably) on the widest channel; the lower four form
/// the background and the upper four the foreground. A uniform block becomes a
/// flat background with the space glyph.
///
/// # Example
/// ```
/// use sg_blocks::quantize::{quantize, Sample};
/// use sg_core::color::Color;
/// use sg_core::config::BlendSpace;
///
/// // Top half white, bottom half black.
/// let block = std::array::from_fn(|i| Sample {
///     color: if i < 4 { Color::rgb(255, 255, 255) } else { Color::rgb(0, 0, 0) },
///     index: i as u8,
/// });
/// let cell = quantize(block, BlendSpace::Linear);
/// assert_eq!(cell.mask, 0x0F);
/// assert_eq!(cell.fg, Color::rgb(255, 255, 255));
/// assert_eq!(cell.bg, Color::rgb(0, 0, 0));
/// assert_eq!(cell.glyph(), '▀');
/// ```
#[must_use]
pub fn quantize(mut samples: [Sample; 8], blend: BlendSpace) -> Cell {
    let Some(channel) = widest_channel(&samples) else {
        return flat(&samples);
    };

    let k = channel.index();
    samples.sort_by_key(|s| s.color.channels()[k]);

    let (lower, upper) = samples.split_at(4);
    let bg: [Color; 4] = std::array::from_fn(|i| lower[i].color);
    let fg: [Color; 4] = std::array::from_fn(|i| upper[i].color);
    let mask = upper.iter().fold(0u8, |m, s| m | (1 << s.index));

    Cell {
        fg: average_in(&fg, blend),
        bg: average_in(&bg, blend),
        mask,
    }
}

/// Uniform block: its single opaque color becomes the background.
fn flat(samples: &[Sample; 8]) -> Cell {
    match samples.iter().find_map(|s| s.color.opaque()) {
        Some(rgb) => Cell {
            fg: Color::Transparent,
            bg: Color::Opaque(rgb),
            mask: 0,
        },
        None => Cell::EMPTY,
    }
}
