use std::sync::LazyLock;

use crate::config::BlendSpace;

/// Couleur sRGB, 8 bits par canal.
///
/// # Example
/// ```
/// use sg_core::color::Rgb;
/// let c = Rgb::new(255, 165, 0);
/// assert_eq!(c.g, 165);
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Rgb {
    /// Red.
    pub r: u8,
    /// Green.
    pub g: u8,
    /// Blue.
    pub b: u8,
}

/// A color as the quantizer sees it: either fully transparent or opaque sRGB.
///
/// `Transparent` carries no channel values; it is not black.
///
/// # Example
/// ```
/// use sg_core::color::{Color, Rgb};
/// assert_eq!(Color::default(), Color::Opaque(Rgb::BLACK));
/// assert_ne!(Color::Transparent, Color::Opaque(Rgb::BLACK));
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Color {
    /// No color at all; the terminal default shows through.
    Transparent,
    /// Opaque sRGB color.
    Opaque(Rgb),
}

/// One of the three color channels.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Channel {
    /// Red.
    Red,
    /// Green.
    Green,
    /// Blue.
    Blue,
}

impl Channel {
    /// Channels in tie-breaking precedence order.
    pub const ALL: [Channel; 3] = [Channel::Red, Channel::Green, Channel::Blue];

    /// Index into an `[r, g, b]` triple.
    #[inline(always)]
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Channel::Red => 0,
            Channel::Green => 1,
            Channel::Blue => 2,
        }
    }
}

impl Rgb {
    /// Pure black.
    pub const BLACK: Rgb = Rgb::new(0, 0, 0);
    /// Pure white.
    pub const WHITE: Rgb = Rgb::new(255, 255, 255);

    /// Build a color from its channels.
    #[must_use]
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Channels as an `[r, g, b]` array.
    #[inline(always)]
    #[must_use]
    pub const fn channels(self) -> [u8; 3] {
        [self.r, self.g, self.b]
    }

    /// Convertit sRGB → CIE L*a*b* (illuminant D65, via XYZ).
    ///
    /// # Example
    /// ```
    /// use sg_core::color::Rgb;
    /// let (l, a, b) = Rgb::WHITE.to_lab();
    /// assert!((l - 100.0).abs() < 0.01);
    /// assert!(a.abs() < 0.01 && b.abs() < 0.01);
    /// ```
    #[must_use]
    pub fn to_lab(self) -> (f64, f64, f64) {
        let r = to_linear(self.r);
        let g = to_linear(self.g);
        let b = to_linear(self.b);

        let x = 0.412_456_4 * r + 0.357_576_1 * g + 0.180_437_5 * b;
        let y = 0.212_672_9 * r + 0.715_152_2 * g + 0.072_175_0 * b;
        let z = 0.019_333_9 * r + 0.119_192_0 * g + 0.950_304_1 * b;

        let fx = lab_f(x / WHITE_X);
        let fy = lab_f(y / WHITE_Y);
        let fz = lab_f(z / WHITE_Z);

        (116.0 * fy - 16.0, 500.0 * (fx - fy), 200.0 * (fy - fz))
    }

    /// Convertit CIE L*a*b* → sRGB, en saturant les valeurs hors gamut.
    ///
    /// # Example
    /// ```
    /// use sg_core::color::Rgb;
    /// assert_eq!(Rgb::from_lab(0.0, 0.0, 0.0), Rgb::BLACK);
    /// ```
    #[must_use]
    pub fn from_lab(l: f64, a: f64, b: f64) -> Self {
        let fy = (l + 16.0) / 116.0;
        let fx = fy + a / 500.0;
        let fz = fy - b / 200.0;

        let x = WHITE_X * lab_f_inv(fx);
        let y = WHITE_Y * lab_f_inv(fy);
        let z = WHITE_Z * lab_f_inv(fz);

        let r = 3.240_454_2 * x - 1.537_138_5 * y - 0.498_531_4 * z;
        let g = -0.969_266_0 * x + 1.876_010_8 * y + 0.041_556_0 * z;
        let b = 0.055_643_4 * x - 0.204_025_9 * y + 1.057_225_2 * z;

        Rgb::new(from_linear(r), from_linear(g), from_linear(b))
    }
}

impl Color {
    /// Shorthand for an opaque color.
    #[must_use]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Color::Opaque(Rgb::new(r, g, b))
    }

    /// `true` for [`Color::Transparent`].
    #[inline(always)]
    #[must_use]
    pub const fn is_transparent(self) -> bool {
        matches!(self, Color::Transparent)
    }

    /// The opaque channels, if any.
    #[inline(always)]
    #[must_use]
    pub const fn opaque(self) -> Option<Rgb> {
        match self {
            Color::Transparent => None,
            Color::Opaque(rgb) => Some(rgb),
        }
    }

    /// Nominal channels used for range computation: transparent reads as zero.
    #[inline(always)]
    #[must_use]
    pub const fn channels(self) -> [u8; 3] {
        match self {
            Color::Transparent => [0, 0, 0],
            Color::Opaque(rgb) => rgb.channels(),
        }
    }

    /// Interprète un pixel RGBA non prémultiplié.
    ///
    /// Alpha 0 is transparent, alpha 255 is taken as-is, anything in between
    /// is flattened over black.
    ///
    /// # Example
    /// ```
    /// use sg_core::color::Color;
    /// assert_eq!(Color::from_rgba([9, 9, 9, 0]), Color::Transparent);
    /// assert_eq!(Color::from_rgba([200, 100, 0, 255]), Color::rgb(200, 100, 0));
    /// assert_eq!(Color::from_rgba([255, 255, 255, 51]), Color::rgb(51, 51, 51));
    /// ```
    #[inline(always)]
    #[must_use]
    pub fn from_rgba([r, g, b, a]: [u8; 4]) -> Self {
        match a {
            0 => Color::Transparent,
            255 => Color::rgb(r, g, b),
            _ => {
                let flatten = |c: u8| ((u32::from(c) * u32::from(a) + 127) / 255) as u8;
                Color::rgb(flatten(r), flatten(g), flatten(b))
            }
        }
    }
}

impl Default for Color {
    fn default() -> Self {
        Color::Opaque(Rgb::BLACK)
    }
}

impl From<Rgb> for Color {
    fn from(rgb: Rgb) -> Self {
        Color::Opaque(rgb)
    }
}

const WHITE_X: f64 = 0.950_47;
const WHITE_Y: f64 = 1.0;
const WHITE_Z: f64 = 1.088_83;
const LAB_DELTA: f64 = 6.0 / 29.0;

fn lab_f(t: f64) -> f64 {
    if t > LAB_DELTA * LAB_DELTA * LAB_DELTA {
        t.cbrt()
    } else {
        t / (3.0 * LAB_DELTA * LAB_DELTA) + 4.0 / 29.0
    }
}

fn lab_f_inv(t: f64) -> f64 {
    if t > LAB_DELTA {
        t * t * t
    } else {
        3.0 * LAB_DELTA * LAB_DELTA * (t - 4.0 / 29.0)
    }
}

/// sRGB EOTF over [0, 1].
fn srgb_decode(v: f64) -> f64 {
    if v <= 0.040_45 {
        v / 12.92
    } else {
        ((v + 0.055) / 1.055).powf(2.4)
    }
}

/// sRGB OETF over [0, 1].
fn srgb_encode(v: f64) -> f64 {
    if v <= 0.003_130_8 {
        v * 12.92
    } else {
        1.055 * v.powf(1.0 / 2.4) - 0.055
    }
}

/// Table byte → lumière linéaire, construite une seule fois.
static TO_LINEAR: LazyLock<[f64; 256]> =
    LazyLock::new(|| std::array::from_fn(|i| srgb_decode(i as f64 / 255.0)));

/// Convertit un canal sRGB en lumière linéaire [0.0, 1.0].
///
/// # Example
/// ```
/// use sg_core::color::to_linear;
/// assert_eq!(to_linear(0), 0.0);
/// assert!((to_linear(255) - 1.0).abs() < 1e-12);
/// ```
#[inline(always)]
#[must_use]
pub fn to_linear(c: u8) -> f64 {
    TO_LINEAR[c as usize]
}

/// Convertit une valeur linéaire en canal sRGB, saturée à [0, 255].
///
/// # Example
/// ```
/// use sg_core::color::{from_linear, to_linear};
/// assert_eq!(from_linear(to_linear(42)), 42);
/// assert_eq!(from_linear(7.5), 255);
/// assert_eq!(from_linear(-1.0), 0);
/// ```
#[inline]
#[must_use]
pub fn from_linear(v: f64) -> u8 {
    (srgb_encode(v.clamp(0.0, 1.0)) * 255.0).round().clamp(0.0, 255.0) as u8
}

/// Moyenne en lumière linéaire.
///
/// - empty input: opaque black;
/// - a single input: returned unchanged;
/// - transparent inputs are skipped, and if nothing opaque remains the
///   result is [`Color::Transparent`].
///
/// # Example
/// ```
/// use sg_core::color::{average, Color};
/// assert_eq!(average(&[]), Color::rgb(0, 0, 0));
/// assert_eq!(average(&[Color::rgb(1, 2, 3)]), Color::rgb(1, 2, 3));
/// assert_eq!(average(&[Color::rgb(0, 0, 0), Color::rgb(255, 255, 255)]), Color::rgb(188, 188, 188));
/// ```
#[must_use]
pub fn average(colors: &[Color]) -> Color {
    average_in(colors, BlendSpace::Linear)
}

/// [`average`] with an explicit blend space.
#[must_use]
pub fn average_in(colors: &[Color], space: BlendSpace) -> Color {
    match colors {
        [] => Color::default(),
        [single] => *single,
        _ => blend(colors.iter().filter_map(|c| c.opaque()), space)
            .map_or(Color::Transparent, Color::Opaque),
    }
}

/// Mean of opaque colors, or `None` when the iterator is empty.
fn blend(mut colors: impl Iterator<Item = Rgb>, space: BlendSpace) -> Option<Rgb> {
    let first = colors.next()?;
    let mut sum = project(first, space);
    let mut n = 1u32;
    for c in colors {
        let [x, y, z] = project(c, space);
        sum[0] += x;
        sum[1] += y;
        sum[2] += z;
        n += 1;
    }
    if n == 1 {
        return Some(first);
    }

    let n = f64::from(n);
    let [x, y, z] = sum.map(|s| s / n);
    Some(match space {
        BlendSpace::Linear => Rgb::new(from_linear(x), from_linear(y), from_linear(z)),
        BlendSpace::Lab => Rgb::from_lab(x, y, z),
    })
}

fn project(c: Rgb, space: BlendSpace) -> [f64; 3] {
    match space {
        BlendSpace::Linear => c.channels().map(to_linear),
        BlendSpace::Lab => {
            let (l, a, b) = c.to_lab();
            [l, a, b]
        }
    }
}

/// Niveaux des axes du cube 6×6×6 des terminaux 256 couleurs.
pub const CUBE_LEVELS: [u8; 6] = [0x00, 0x5f, 0x87, 0xaf, 0xd7, 0xff];

fn cube_level(v: u8) -> Option<u8> {
    CUBE_LEVELS.iter().position(|&l| l == v).map(|i| i as u8)
}

/// Index de palette 256 couleurs si `c` tombe exactement sur le cube 6×6×6.
///
/// `None` means the color needs a 24-bit encoding.
///
/// # Example
/// ```
/// use sg_core::color::{compact_code, Rgb};
/// assert_eq!(compact_code(Rgb::new(0xff, 0, 0)), Some(196));
/// assert_eq!(compact_code(Rgb::WHITE), Some(231));
/// assert_eq!(compact_code(Rgb::new(255, 165, 0)), None);
/// ```
#[must_use]
pub fn compact_code(c: Rgb) -> Option<u8> {
    let r = cube_level(c.r)?;
    let g = cube_level(c.g)?;
    let b = cube_level(c.b)?;
    Some(16 + 36 * r + 6 * g + b)
}
