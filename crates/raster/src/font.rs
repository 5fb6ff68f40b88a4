//! A 3×5 bitmap font for tick labels and axis titles.
//!
//! Covers digits, `-`, `.`, space and the Latin letters (lowercase renders
//! as uppercase). Anything else draws as a filled box.

use glam::DVec2;

/// Glyph width in cells.
pub const GLYPH_WIDTH: usize = 3;
/// Glyph height in cells.
pub const GLYPH_HEIGHT: usize = 5;
/// Horizontal advance per character, in cells.
pub const ADVANCE: usize = GLYPH_WIDTH + 1;

/// Rows top to bottom; bit 2 is the left column.
pub type Glyph = [u8; GLYPH_HEIGHT];

const BOX: Glyph = [0b111; GLYPH_HEIGHT];

const DIGITS: [Glyph; 10] = [
    [0b111, 0b101, 0b101, 0b101, 0b111],
    [0b010, 0b110, 0b010, 0b010, 0b111],
    [0b111, 0b001, 0b111, 0b100, 0b111],
    [0b111, 0b001, 0b111, 0b001, 0b111],
    [0b101, 0b101, 0b111, 0b001, 0b001],
    [0b111, 0b100, 0b111, 0b001, 0b111],
    [0b111, 0b100, 0b111, 0b101, 0b111],
    [0b111, 0b001, 0b001, 0b010, 0b010],
    [0b111, 0b101, 0b111, 0b101, 0b111],
    [0b111, 0b101, 0b111, 0b001, 0b111],
];

const LETTERS: [Glyph; 26] = [
    [0b010, 0b101, 0b111, 0b101, 0b101], // A
    [0b110, 0b101, 0b110, 0b101, 0b110],
    [0b011, 0b100, 0b100, 0b100, 0b011],
    [0b110, 0b101, 0b101, 0b101, 0b110],
    [0b111, 0b100, 0b110, 0b100, 0b111],
    [0b111, 0b100, 0b110, 0b100, 0b100],
    [0b011, 0b100, 0b101, 0b101, 0b011],
    [0b101, 0b101, 0b111, 0b101, 0b101],
    [0b111, 0b010, 0b010, 0b010, 0b111],
    [0b001, 0b001, 0b001, 0b101, 0b010],
    [0b101, 0b101, 0b110, 0b101, 0b101],
    [0b100, 0b100, 0b100, 0b100, 0b111],
    [0b101, 0b111, 0b111, 0b101, 0b101], // M
    [0b110, 0b101, 0b101, 0b101, 0b101],
    [0b010, 0b101, 0b101, 0b101, 0b010],
    [0b110, 0b101, 0b110, 0b100, 0b100],
    [0b010, 0b101, 0b101, 0b110, 0b011],
    [0b110, 0b101, 0b110, 0b101, 0b101],
    [0b011, 0b100, 0b010, 0b001, 0b110],
    [0b111, 0b010, 0b010, 0b010, 0b010],
    [0b101, 0b101, 0b101, 0b101, 0b111],
    [0b101, 0b101, 0b101, 0b101, 0b010],
    [0b101, 0b101, 0b111, 0b111, 0b101],
    [0b101, 0b101, 0b010, 0b101, 0b101],
    [0b101, 0b101, 0b010, 0b010, 0b010],
    [0b111, 0b001, 0b010, 0b100, 0b111], // Z
];

/// The bitmap for `c`.
pub fn glyph(c: char) -> Glyph {
    match c {
        '0'..='9' => DIGITS[c as usize - '0' as usize],
        'A'..='Z' => LETTERS[c as usize - 'A' as usize],
        'a'..='z' => LETTERS[c as usize - 'a' as usize],
        '-' => [0, 0, 0b111, 0, 0],
        '.' => [0, 0, 0, 0, 0b010],
        ' ' => [0; GLYPH_HEIGHT],
        _ => BOX,
    }
}

/// Cell size in pixels for a font of `size` pixels.
pub fn cell_size(size: f64) -> f64 {
    (size / GLYPH_HEIGHT as f64).round().max(1.0)
}

/// Centers of the lit cells of `text`, laid out left to right with rows
/// growing along +y and the whole block centered on the origin.
pub fn layout(text: &str, cell: f64) -> Vec<DVec2> {
    let count = text.chars().count();
    if count == 0 {
        return Vec::new();
    }
    let columns = count * ADVANCE - 1;
    let origin = -DVec2::new(columns as f64, GLYPH_HEIGHT as f64) * cell / 2.0;

    let mut cells = Vec::new();
    for (index, c) in text.chars().enumerate() {
        for (row, bits) in glyph(c).iter().enumerate() {
            for col in 0..GLYPH_WIDTH {
                if bits & (0b100 >> col) != 0 {
                    let x = (index * ADVANCE + col) as f64 + 0.5;
                    let y = row as f64 + 0.5;
                    cells.push(origin + DVec2::new(x, y) * cell);
                }
            }
        }
    }
    cells
}
