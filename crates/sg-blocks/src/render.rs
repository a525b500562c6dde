use rayon::prelude::*;
use sg_core::bitmap::{Bitmap, PixelReader};
use sg_core::color::{Color, Rgb};
use sg_core::config::{Palette, RenderConfig};
use sg_core::sgr::{Layer, RESET, Sgr};

use crate::quantize::{Cell, quantize, sample_block};

/// Couleurs actives du terminal sur la ligne en cours.
///
/// Lets the renderer skip sequences that would not change anything.
#[derive(Default)]
struct Pen {
    fg: Option<Rgb>,
    bg: Option<Rgb>,
    /// At least one sequence was written on this row.
    styled: bool,
}

impl Pen {
    /// Write the smallest SGR sequence that brings the terminal to `cell`'s colors.
    fn apply(&mut self, cell: &Cell, palette: Palette, out: &mut String) {
        let mut sgr = Sgr::new(out);
        self.bg = Self::update(&mut sgr, Layer::Background, self.bg, cell.bg, palette);
        if !cell.is_blank() {
            self.fg = Self::update(&mut sgr, Layer::Foreground, self.fg, cell.fg, palette);
        }
        if sgr.finish() {
            self.styled = true;
        }
    }

    fn update(
        sgr: &mut Sgr<'_>,
        layer: Layer,
        current: Option<Rgb>,
        want: Color,
        palette: Palette,
    ) -> Option<Rgb> {
        match want.opaque() {
            Some(rgb) if current == Some(rgb) => current,
            Some(rgb) => {
                sgr.color(layer, rgb, palette);
                Some(rgb)
            }
            None if current.is_some() => {
                sgr.reset_layer(layer);
                None
            }
            None => None,
        }
    }
}

/// Dimensions de la grille de sortie, en cellules : (colonnes, lignes).
///
/// Partial blocks on the right and bottom edges are dropped.
///
/// # Example
/// ```
/// use sg_blocks::render::grid_size;
/// use sg_core::bitmap::Bitmap;
/// assert_eq!(grid_size(&Bitmap::blank(15, 9)), (7, 2));
/// ```
#[must_use]
pub fn grid_size(bitmap: &Bitmap) -> (u32, u32) {
    (bitmap.width() / 2, bitmap.height() / 4)
}

/// Rend une image avec la configuration par défaut.
///
/// # Example
/// ```
/// use sg_blocks::render::render;
/// use sg_core::bitmap::Bitmap;
///
/// assert_eq!(render(&Bitmap::blank(1, 2)), "");
/// assert_eq!(render(&Bitmap::blank(2, 4)), " ");
///
/// let red = Bitmap::from_fn(2, 4, |_, _| [255, 0, 0, 255]);
/// assert_eq!(render(&red), "\x1b[48;5;196m \x1b[m");
/// ```
#[must_use]
pub fn render(bitmap: &Bitmap) -> String {
    render_with(bitmap, &RenderConfig::default())
}

/// Rend une image en texte semigraphique.
///
/// Rows are separated by `\n` with no trailing newline. A row that wrote any
/// color ends with a reset. `config.parallel` only changes how rows are
/// scheduled, never the output.
#[must_use]
pub fn render_with(bitmap: &Bitmap, config: &RenderConfig) -> String {
    let (cols, rows) = grid_size(bitmap);
    if cols == 0 || rows == 0 {
        return String::new();
    }
    let read = bitmap.reader();
    log::trace!("Rendu {cols}×{rows} cellules ({:?})", config.blend);

    if config.parallel {
        let lines: Vec<String> = (0..rows)
            .into_par_iter()
            .map(|row| {
                let mut line = String::with_capacity(cols as usize * 16);
                render_row(bitmap, read, row, cols, config, &mut line);
                line
            })
            .collect();
        return lines.join("\n");
    }

    let mut out = String::with_capacity(cols as usize * rows as usize * 16);
    for row in 0..rows {
        if row > 0 {
            out.push('\n');
        }
        render_row(bitmap, read, row, cols, config, &mut out);
    }
    out
}

fn render_row(
    bitmap: &Bitmap,
    read: PixelReader,
    row: u32,
    cols: u32,
    config: &RenderConfig,
    out: &mut String,
) {
    let (ox, oy) = bitmap.origin();
    let mut pen = Pen::default();
    for col in 0..cols {
        let samples = sample_block(bitmap, read, ox + col * 2, oy + row * 4);
        let cell = quantize(samples, config.blend);
        pen.apply(&cell, config.palette, out);
        out.push(cell.glyph());
    }
    if pen.styled {
        out.push_str(RESET);
    }
}
