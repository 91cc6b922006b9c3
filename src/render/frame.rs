//! Pure frame composition
//!
//! `FrameComposer::compose` rasterizes the current game state into an RGB
//! pixel buffer without touching the state, so the same frame can feed a
//! machine observer (array consumers, recordings) or a display sink.

use crate::game::{GameConfig, GameState, Lane};
use crate::render::font::ScoreFont;
use crate::render::sprites::CarSprites;
use image::RgbaImage;

pub type Rgb = [u8; 3];

pub const GRASS: Rgb = [60, 220, 0];
pub const ROAD: Rgb = [50, 50, 50];
pub const YELLOW_LINE: Rgb = [255, 240, 60];
pub const WHITE: Rgb = [255, 255, 255];

/// RGB pixel buffer, row-major (height, width, 3)
pub struct Frame {
    width: usize,
    height: usize,
    pixels: Vec<u8>,
}

impl Frame {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            pixels: vec![0; width * height * 3],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Raw bytes, row-major (height, width, channel)
    pub fn as_bytes(&self) -> &[u8] {
        &self.pixels
    }

    pub fn pixel(&self, x: usize, y: usize) -> Rgb {
        let idx = (y * self.width + x) * 3;
        [self.pixels[idx], self.pixels[idx + 1], self.pixels[idx + 2]]
    }

    /// Fill an axis-aligned rectangle, clipped to the frame
    pub fn fill_rect(&mut self, x: i32, y: i32, w: i32, h: i32, color: Rgb) {
        let x0 = x.max(0) as usize;
        let y0 = y.max(0) as usize;
        let x1 = (x + w).clamp(0, self.width as i32) as usize;
        let y1 = (y + h).clamp(0, self.height as i32) as usize;

        for py in y0..y1 {
            for px in x0..x1 {
                let idx = (py * self.width + px) * 3;
                self.pixels[idx..idx + 3].copy_from_slice(&color);
            }
        }
    }

    /// Alpha-blit an RGBA sprite with its top-left corner at (x, y)
    pub fn blit_rgba(&mut self, sprite: &RgbaImage, x: i32, y: i32) {
        self.blit_rgba_region(sprite, 0, 0, sprite.width(), sprite.height(), x, y);
    }

    /// Alpha-blit a sub-region of an RGBA image, clipped to the frame
    pub fn blit_rgba_region(
        &mut self,
        src: &RgbaImage,
        src_x: u32,
        src_y: u32,
        src_w: u32,
        src_h: u32,
        x: i32,
        y: i32,
    ) {
        for sy in 0..src_h {
            for sx in 0..src_w {
                let px = x + sx as i32;
                let py = y + sy as i32;
                if px < 0 || py < 0 || px >= self.width as i32 || py >= self.height as i32 {
                    continue;
                }
                let p = src.get_pixel(src_x + sx, src_y + sy);
                if p.0[3] < 128 {
                    continue;
                }
                let idx = (py as usize * self.width + px as usize) * 3;
                self.pixels[idx..idx + 3].copy_from_slice(&p.0[..3]);
            }
        }
    }
}

/// Composes frames from game state; holds the render-only resources so the
/// simulation state stays a plain data record
pub struct FrameComposer {
    config: GameConfig,
    sprites: CarSprites,
    font: ScoreFont,
}

impl FrameComposer {
    pub fn new(config: GameConfig, sprites: CarSprites, font: ScoreFont) -> Self {
        Self {
            config,
            sprites,
            font,
        }
    }

    fn lane_x(&self, lane: Lane) -> f32 {
        match lane {
            Lane::Left => self.config.left_lane(),
            Lane::Right => self.config.right_lane(),
        }
    }

    /// Rasterize the current state; pure with respect to `state`
    pub fn compose(&self, state: &GameState) -> Frame {
        let width = self.config.screen_width as usize;
        let height = self.config.screen_height as usize;
        let mut frame = Frame::new(width, height);

        let w = self.config.screen_width;
        let h = self.config.screen_height;
        let road_w = self.config.road_width();
        let mark_w = self.config.roadmark_width();

        // Grass background
        frame.fill_rect(0, 0, width as i32, height as i32, GRASS);

        // Road surface
        frame.fill_rect(
            (w / 2.0 - road_w / 2.0) as i32,
            0,
            road_w as i32,
            height as i32,
            ROAD,
        );

        // Solid white edge lines
        frame.fill_rect(
            (w / 2.0 - road_w / 2.0 + mark_w * 2.0) as i32,
            0,
            mark_w as i32,
            height as i32,
            WHITE,
        );
        frame.fill_rect(
            (w / 2.0 + road_w / 2.0 - mark_w * 3.0) as i32,
            0,
            mark_w as i32,
            height as i32,
            WHITE,
        );

        // Scrolling yellow center dashes
        let segment = self.config.dash_segment();
        let dash_h = h / 20.0;
        let mut y = -segment;
        while y < h {
            frame.fill_rect(
                (w / 2.0 - mark_w / 2.0) as i32,
                (y + state.line_offset) as i32,
                mark_w as i32,
                dash_h as i32,
                YELLOW_LINE,
            );
            y += segment;
        }

        // Cars, drawn from their bounding rectangles
        let player_rect = state.player.rect(self.lane_x(state.player.lane));
        frame.blit_rgba(
            &self.sprites.player,
            player_rect.left() as i32,
            player_rect.top() as i32,
        );
        let opponent_rect = state.opponent.rect(self.lane_x(state.opponent.lane));
        frame.blit_rgba(
            &self.sprites.opponent,
            opponent_rect.left() as i32,
            opponent_rect.top() as i32,
        );

        // Score overlay
        self.font
            .draw(&mut frame, &format!("SCORE: {}", state.score), 10, 10, WHITE);

        frame
    }
}
