//! Encodage SGR (Select Graphic Rendition) des paires de couleurs.
//!
//! Background parameters always precede foreground parameters, and both share
//! a single `ESC[...m` sequence.

use std::sync::LazyLock;

use crate::color::{Color, Rgb, compact_code};
use crate::config::Palette;

/// Full attribute reset.
pub const RESET: &str = "\x1b[m";

/// Chaînes décimales "0".."255", construites une seule fois.
static DECIMAL: LazyLock<[String; 256]> = LazyLock::new(|| std::array::from_fn(|i| i.to_string()));

#[inline(always)]
fn decimal(v: u8) -> &'static str {
    &DECIMAL[v as usize]
}

/// Which side of a cell a color applies to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Layer {
    /// Glyph color (`38`).
    Foreground,
    /// Cell color (`48`).
    Background,
}

impl Layer {
    const fn prefix(self) -> &'static str {
        match self {
            Layer::Foreground => "38",
            Layer::Background => "48",
        }
    }

    const fn default_code(self) -> &'static str {
        match self {
            Layer::Foreground => "39",
            Layer::Background => "49",
        }
    }
}

/// Accumulates parameters into one SGR sequence appended to `out`.
///
/// Nothing is written until the first parameter is pushed.
///
/// # Example
/// ```
/// use sg_core::color::Rgb;
/// use sg_core::config::Palette;
/// use sg_core::sgr::{Layer, Sgr};
///
/// let mut out = String::new();
/// let mut sgr = Sgr::new(&mut out);
/// sgr.color(Layer::Background, Rgb::WHITE, Palette::Auto);
/// sgr.reset_layer(Layer::Foreground);
/// assert!(sgr.finish());
/// assert_eq!(out, "\x1b[48;5;231;39m");
/// ```
pub struct Sgr<'a> {
    out: &'a mut String,
    open: bool,
}

impl<'a> Sgr<'a> {
    /// Start a sequence on `out`.
    pub fn new(out: &'a mut String) -> Self {
        Self { out, open: false }
    }

    fn separator(&mut self) {
        if self.open {
            self.out.push(';');
        } else {
            self.out.push_str("\x1b[");
            self.open = true;
        }
    }

    /// Push `rgb` for `layer`: `5;N` when the palette allows it, else `2;R;G;B`.
    pub fn color(&mut self, layer: Layer, rgb: Rgb, palette: Palette) {
        self.separator();
        self.out.push_str(layer.prefix());
        match (palette, compact_code(rgb)) {
            (Palette::Auto, Some(code)) => {
                self.out.push_str(";5;");
                self.out.push_str(decimal(code));
            }
            _ => {
                self.out.push_str(";2;");
                self.out.push_str(decimal(rgb.r));
                self.out.push(';');
                self.out.push_str(decimal(rgb.g));
                self.out.push(';');
                self.out.push_str(decimal(rgb.b));
            }
        }
    }

    /// Push the terminal-default code for `layer` (`39` / `49`).
    pub fn reset_layer(&mut self, layer: Layer) {
        self.separator();
        self.out.push_str(layer.default_code());
    }

    /// Terminate the sequence. Returns whether anything was written.
    pub fn finish(self) -> bool {
        if self.open {
            self.out.push('m');
        }
        self.open
    }
}

/// Séquence de style pour une paire (fg, bg) avec la palette par défaut.
///
/// # Example
/// ```
/// use sg_core::color::Color;
/// use sg_core::sgr::encode_style;
///
/// assert_eq!(encode_style(Color::Transparent, Color::Transparent), "");
/// assert_eq!(encode_style(Color::Transparent, Color::rgb(255, 0, 0)), "\x1b[48;5;196m");
/// assert_eq!(
///     encode_style(Color::rgb(0, 0, 0), Color::rgb(255, 255, 255)),
///     "\x1b[48;5;231;38;5;16m"
/// );
/// ```
#[must_use]
pub fn encode_style(fg: Color, bg: Color) -> String {
    encode_style_with(fg, bg, Palette::Auto)
}

/// [`encode_style`] with an explicit palette policy.
///
/// # Example
/// ```
/// use sg_core::color::Color;
/// use sg_core::config::Palette;
/// use sg_core::sgr::encode_style_with;
///
/// let s = encode_style_with(Color::rgb(255, 0, 0), Color::Transparent, Palette::TrueColor);
/// assert_eq!(s, "\x1b[38;2;255;0;0m");
/// ```
#[must_use]
pub fn encode_style_with(fg: Color, bg: Color, palette: Palette) -> String {
    let mut out = String::new();
    let mut sgr = Sgr::new(&mut out);
    if let Color::Opaque(rgb) = bg {
        sgr.color(Layer::Background, rgb, palette);
    }
    if let Color::Opaque(rgb) = fg {
        sgr.color(Layer::Foreground, rgb, palette);
    }
    sgr.finish();
    out
}
