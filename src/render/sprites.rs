//! Car sprite loading
//!
//! Sprites are a construction-time requirement of the pixel renderer: a
//! missing car image is fatal and propagates to the caller, unlike the score
//! font which degrades to a built-in fallback.

use crate::game::GameConfig;
use anyhow::{Context, Result};
use image::imageops::{self, FilterType};
use image::{Rgba, RgbaImage};
use std::path::Path;

pub const PLAYER_SPRITE: &str = "car.png";
pub const OPPONENT_SPRITE: &str = "other_car.png";

/// The two car bitmaps, pre-scaled to the configured rectangle sizes
pub struct CarSprites {
    pub player: RgbaImage,
    pub opponent: RgbaImage,
}

impl CarSprites {
    /// Load both sprites from `dir`, scaling each to the size the collision
    /// rectangles use so rendering and physics stay consistent
    pub fn load(dir: &Path, config: &GameConfig) -> Result<Self> {
        let player = load_scaled(&dir.join(PLAYER_SPRITE), config.player_size)?;
        let opponent = load_scaled(&dir.join(OPPONENT_SPRITE), config.opponent_size)?;
        Ok(Self { player, opponent })
    }

    /// Procedurally drawn stand-in sprites (solid car silhouettes); used by
    /// tests and anywhere a frame is needed without asset files
    pub fn flat(config: &GameConfig) -> Self {
        Self {
            player: flat_car(config.player_size, [30, 90, 220]),
            opponent: flat_car(config.opponent_size, [220, 40, 40]),
        }
    }
}

fn load_scaled(path: &Path, size: (f32, f32)) -> Result<RgbaImage> {
    let img = image::open(path)
        .with_context(|| format!("Failed to load car sprite from {:?}", path))?;
    Ok(imageops::resize(
        &img.to_rgba8(),
        size.0 as u32,
        size.1 as u32,
        FilterType::Nearest,
    ))
}

fn flat_car(size: (f32, f32), body: [u8; 3]) -> RgbaImage {
    let (w, h) = (size.0 as u32, size.1 as u32);
    let mut img = RgbaImage::from_pixel(w, h, Rgba([0, 0, 0, 0]));

    // Body with a narrower nose and tail so the silhouette reads as a car
    for y in 0..h {
        let inset = if y < h / 8 || y >= h - h / 8 { w / 6 } else { 0 };
        for x in inset..w.saturating_sub(inset) {
            img.put_pixel(x, y, Rgba([body[0], body[1], body[2], 255]));
        }
    }

    // Windshield band
    for y in h / 4..h / 4 + h / 10 {
        for x in w / 5..w - w / 5 {
            img.put_pixel(x, y, Rgba([180, 220, 255, 255]));
        }
    }

    img
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::GameConfig;

    #[test]
    fn test_missing_sprites_are_fatal() {
        let config = GameConfig::default();
        let result = CarSprites::load(Path::new("/nonexistent"), &config);
        assert!(result.is_err());
    }

    #[test]
    fn test_flat_sprites_match_configured_size() {
        let config = GameConfig::default();
        let sprites = CarSprites::flat(&config);
        assert_eq!(sprites.player.width(), config.player_size.0 as u32);
        assert_eq!(sprites.player.height(), config.player_size.1 as u32);
        assert_eq!(sprites.opponent.width(), config.opponent_size.0 as u32);
        assert_eq!(sprites.opponent.height(), config.opponent_size.1 as u32);
    }

    #[test]
    fn test_flat_sprites_have_opaque_body() {
        let config = GameConfig::default();
        let sprites = CarSprites::flat(&config);
        let center = sprites.player.get_pixel(
            sprites.player.width() / 2,
            sprites.player.height() / 2,
        );
        assert_eq!(center.0[3], 255);
    }
}
