//! 图像处理模块

pub mod bitmap;
pub mod color;
pub mod compression;
pub mod palette;
pub mod palette_data;

pub use bitmap::{DecodedImage, IndexedImage};
pub use compression::BitStreamReader;
pub use palette::{Color, EmbeddedPalette, Palette, PaletteBytes, PaletteSource, resolve_palette};

/// 标准屏幕宽度 (像素)
pub const SCREEN_WIDTH: u32 = 256;

/// SCREEN 7 屏幕宽度 (像素)
pub const SCREEN_WIDTH_7: u32 = 512;

/// MSX1 屏幕高度 (192 行)
pub const SCREEN_HEIGHT_MSX1: u32 = 192;

/// MSX2 屏幕高度 (212 行)
pub const SCREEN_HEIGHT_MSX2: u32 = 212;

/// 根据结束地址计算屏幕高度
///
/// 只有 192 与 212 两种结果。
pub fn screen_height(end_address: u16, row_bytes: u32) -> u32 {
    let end_line = end_address as u32 / row_bytes;
    if end_line <= SCREEN_HEIGHT_MSX1 {
        SCREEN_HEIGHT_MSX1
    } else {
        SCREEN_HEIGHT_MSX2
    }
}
