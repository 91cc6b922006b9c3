//! Score-overlay font with a built-in bitmap fallback
//!
//! The composer tries to load a glyph-atlas PNG at construction time; any
//! failure silently falls back to the built-in 5×7 bitmap glyphs, mirroring
//! how decorative assets must never abort environment construction.

use crate::render::frame::{Frame, Rgb};
use image::RgbaImage;
use std::path::Path;

/// Glyph cell size of the built-in bitmap font
pub const GLYPH_WIDTH: usize = 5;
pub const GLYPH_HEIGHT: usize = 7;

/// 5×7 glyphs for the characters the score overlay needs. Each byte is one
/// row, low 5 bits used, most significant of the 5 on the left.
fn builtin_glyph(c: char) -> Option<[u8; GLYPH_HEIGHT]> {
    let rows = match c.to_ascii_uppercase() {
        '0' => [0x0E, 0x11, 0x13, 0x15, 0x19, 0x11, 0x0E],
        '1' => [0x04, 0x0C, 0x04, 0x04, 0x04, 0x04, 0x0E],
        '2' => [0x0E, 0x11, 0x01, 0x06, 0x08, 0x10, 0x1F],
        '3' => [0x0E, 0x11, 0x01, 0x06, 0x01, 0x11, 0x0E],
        '4' => [0x02, 0x06, 0x0A, 0x12, 0x1F, 0x02, 0x02],
        '5' => [0x1F, 0x10, 0x1E, 0x01, 0x01, 0x11, 0x0E],
        '6' => [0x06, 0x08, 0x10, 0x1E, 0x11, 0x11, 0x0E],
        '7' => [0x1F, 0x01, 0x02, 0x04, 0x08, 0x08, 0x08],
        '8' => [0x0E, 0x11, 0x11, 0x0E, 0x11, 0x11, 0x0E],
        '9' => [0x0E, 0x11, 0x11, 0x0F, 0x01, 0x02, 0x0C],
        'S' => [0x0F, 0x10, 0x10, 0x0E, 0x01, 0x01, 0x1E],
        'C' => [0x0E, 0x11, 0x10, 0x10, 0x10, 0x11, 0x0E],
        'O' => [0x0E, 0x11, 0x11, 0x11, 0x11, 0x11, 0x0E],
        'R' => [0x1E, 0x11, 0x11, 0x1E, 0x14, 0x12, 0x11],
        'E' => [0x1F, 0x10, 0x10, 0x1E, 0x10, 0x10, 0x1F],
        'L' => [0x10, 0x10, 0x10, 0x10, 0x10, 0x10, 0x1F],
        'V' => [0x11, 0x11, 0x11, 0x11, 0x11, 0x0A, 0x04],
        ':' => [0x00, 0x04, 0x04, 0x00, 0x04, 0x04, 0x00],
        ' ' => [0x00; GLYPH_HEIGHT],
        _ => return None,
    };
    Some(rows)
}

/// Font used for the in-frame score overlay
pub struct ScoreFont {
    atlas: Option<GlyphAtlas>,
    /// Integer upscaling factor applied to each glyph
    pub scale: usize,
}

struct GlyphAtlas {
    image: RgbaImage,
    glyph_w: u32,
    glyph_h: u32,
}

impl ScoreFont {
    /// Built-in bitmap font, no external resources
    pub fn builtin() -> Self {
        Self {
            atlas: None,
            scale: 4,
        }
    }

    /// Try to load a glyph-atlas PNG (16 columns × 6 rows of fixed-size
    /// cells, ASCII 32..127). Any failure falls back to the built-in font.
    pub fn load_or_builtin(path: &Path) -> Self {
        match image::open(path) {
            Ok(img) => {
                let img = img.to_rgba8();
                let glyph_w = img.width() / 16;
                let glyph_h = img.height() / 6;
                if glyph_w == 0 || glyph_h == 0 {
                    return Self::builtin();
                }
                Self {
                    atlas: Some(GlyphAtlas {
                        image: img,
                        glyph_w,
                        glyph_h,
                    }),
                    scale: 1,
                }
            }
            Err(_) => Self::builtin(),
        }
    }

    /// Whether the decorative atlas loaded (false means fallback in use)
    pub fn has_atlas(&self) -> bool {
        self.atlas.is_some()
    }

    /// Rasterize `text` into the frame with its top-left corner at (x, y)
    pub fn draw(&self, frame: &mut Frame, text: &str, x: i32, y: i32, color: Rgb) {
        match &self.atlas {
            Some(atlas) => self.draw_atlas(atlas, frame, text, x, y),
            None => self.draw_builtin(frame, text, x, y, color),
        }
    }

    /// Advance width of one character, including spacing
    pub fn char_advance(&self) -> i32 {
        match &self.atlas {
            Some(atlas) => atlas.glyph_w as i32,
            None => ((GLYPH_WIDTH + 1) * self.scale) as i32,
        }
    }

    fn draw_builtin(&self, frame: &mut Frame, text: &str, x: i32, y: i32, color: Rgb) {
        let mut cursor = x;
        for c in text.chars() {
            if let Some(rows) = builtin_glyph(c) {
                for (row, bits) in rows.iter().enumerate() {
                    for col in 0..GLYPH_WIDTH {
                        if bits & (1 << (GLYPH_WIDTH - 1 - col)) != 0 {
                            frame.fill_rect(
                                cursor + (col * self.scale) as i32,
                                y + (row * self.scale) as i32,
                                self.scale as i32,
                                self.scale as i32,
                                color,
                            );
                        }
                    }
                }
            }
            cursor += self.char_advance();
        }
    }

    fn draw_atlas(&self, atlas: &GlyphAtlas, frame: &mut Frame, text: &str, x: i32, y: i32) {
        let mut cursor = x;
        for c in text.chars() {
            let code = c as u32;
            if (32..128).contains(&code) {
                let cell = code - 32;
                let src_x = (cell % 16) * atlas.glyph_w;
                let src_y = (cell / 16) * atlas.glyph_h;
                frame.blit_rgba_region(
                    &atlas.image,
                    src_x,
                    src_y,
                    atlas.glyph_w,
                    atlas.glyph_h,
                    cursor,
                    y,
                );
            }
            cursor += self.char_advance();
        }
    }
}
