//! Table de glyphes Octants (Unicode 16.0), indexée par masque d'occupation.
//!
//! Bits du masque (échantillon i = colonne i % 2, ligne i / 2) :
//! +---+---+
//! | 0 | 1 |
//! +---+---+
//! | 2 | 3 |
//! +---+---+
//! | 4 | 5 |
//! +---+---+
//! | 6 | 7 |
//! +---+---+
//!
//! Masks that already have a character elsewhere in Unicode (quadrants,
//! eighth bars, ...) are listed explicitly. Every other mask lives in the
//! Block Octant range U+1CD00..=U+1CDE5, which enumerates the remaining 230
//! masks in increasing order.

/// One explicit `(mask, glyph)` pair.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GlyphEntry {
    /// Occupancy mask.
    pub mask: u8,
    /// Glyph drawn for that mask.
    pub glyph: char,
}

const fn entry(mask: u8, glyph: char) -> GlyphEntry {
    GlyphEntry { mask, glyph }
}

/// Masks with a pre-existing block character, sorted ascending by mask.
pub const GLYPH_TABLE: [GlyphEntry; 26] = [
    entry(0x00, ' '),
    entry(0x01, '\u{1CEA8}'),
    entry(0x02, '\u{1CEAB}'),
    entry(0x03, '\u{1FB82}'), // upper one quarter
    entry(0x05, '\u{2598}'),  // TL
    entry(0x0A, '\u{259D}'),  // TR
    entry(0x0F, '\u{2580}'),  // top half
    entry(0x14, '\u{1FBE6}'),
    entry(0x28, '\u{1FBE7}'),
    entry(0x3F, '\u{1FB85}'), // upper three quarters
    entry(0x40, '\u{1CEA3}'),
    entry(0x50, '\u{2596}'), // BL
    entry(0x55, '\u{258C}'), // left half
    entry(0x5A, '\u{259E}'), // TR + BL
    entry(0x5F, '\u{259B}'), // TL + TR + BL
    entry(0x80, '\u{1CEA0}'),
    entry(0xA0, '\u{2597}'), // BR
    entry(0xA5, '\u{259A}'), // TL + BR
    entry(0xAA, '\u{2590}'), // right half
    entry(0xAF, '\u{259C}'), // TL + TR + BR
    entry(0xC0, '\u{2582}'), // lower one quarter
    entry(0xF0, '\u{2584}'), // bottom half
    entry(0xF5, '\u{2599}'), // TL + BL + BR
    entry(0xFA, '\u{259F}'), // TR + BL + BR
    entry(0xFC, '\u{2586}'), // lower three quarters
    entry(0xFF, '\u{2588}'), // full block
];

/// First code point of the Block Octant range.
const OCTANT_BASE: u32 = 0x1CD00;

/// Recherche dichotomique dans [`GLYPH_TABLE`].
///
/// A miss at insertion index `i` resolves to `U+1CD00 + (mask - i)`: the
/// number of table entries below `mask` is exactly how many masks the octant
/// range skips before it. Total over all 256 masks.
///
/// # Example
/// ```
/// use sg_blocks::glyphs::lookup_glyph;
/// assert_eq!(lookup_glyph(0xF0), '▄');
/// assert_eq!(lookup_glyph(0x04), '\u{1CD00}');
/// assert_eq!(lookup_glyph(0xFE), '\u{1CDE5}');
/// ```
#[must_use]
pub const fn lookup_glyph(mask: u8) -> char {
    let mut first = 0;
    let mut last = GLYPH_TABLE.len();
    while first < last {
        let mid = (first + last) / 2;
        let entry = GLYPH_TABLE[mid].mask;
        if entry == mask {
            return GLYPH_TABLE[mid].glyph;
        }
        if mask > entry {
            first = mid + 1;
        } else {
            last = mid;
        }
    }
    match char::from_u32(OCTANT_BASE + (mask as u32 - first as u32)) {
        Some(c) => c,
        None => ' ',
    }
}

/// Génère la LUT dense lors de la compilation.
const fn generate_glyph_lut() -> [char; 256] {
    let mut lut = [' '; 256];
    let mut i = 0;
    while i < 256 {
        lut[i] = lookup_glyph(i as u8);
        i += 1;
    }
    lut
}

/// Dense mask → glyph table, computed at compile time.
pub const GLYPH_LUT: [char; 256] = generate_glyph_lut();

/// Glyph for `mask`, O(1).
#[must_use]
#[inline(always)]
pub const fn glyph(mask: u8) -> char {
    GLYPH_LUT[mask as usize]
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn table_is_strictly_sorted() {
        assert!(GLYPH_TABLE.windows(2).all(|w| w[0].mask < w[1].mask));
    }

    #[test]
    fn every_mask_has_a_distinct_glyph() {
        let glyphs: HashSet<char> = (0..=255u8).map(glyph).collect();
        assert_eq!(glyphs.len(), 256);
    }

    #[test]
    fn table_hits_are_exact() {
        for e in GLYPH_TABLE {
            assert_eq!(lookup_glyph(e.mask), e.glyph, "mask {:#04x}", e.mask);
        }
    }

    #[test]
    fn misses_fill_the_octant_range() {
        let mut misses: Vec<u32> = (0..=255u8)
            .filter(|m| GLYPH_TABLE.iter().all(|e| e.mask != *m))
            .map(|m| glyph(m) as u32)
            .collect();
        misses.sort_unstable();
        let want: Vec<u32> = (0x1CD00..=0x1CDE5).collect();
        assert_eq!(misses, want);
    }

    #[test]
    fn quadrant_shapes() {
        assert_eq!(glyph(0x0F), '▀');
        assert_eq!(glyph(0x55), '▌');
        assert_eq!(glyph(0xAA), '▐');
        assert_eq!(glyph(0x00), ' ');
        assert_eq!(glyph(0xFF), '█');
    }

    #[test]
    fn lut_matches_search() {
        for m in 0..=255u8 {
            assert_eq!(glyph(m), lookup_glyph(m));
        }
    }
}
