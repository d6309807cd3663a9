//! 颜色空间转换 (SCREEN 8 直接色、SCREEN 10/12 的 YJK/YAE)

use super::palette::{Color, Palette};
use super::palette_data::{COLOR_2BITS, COLOR_3BITS, COLOR_5BITS};

/// YJK 每组像素数
pub const YJK_GROUP: usize = 4;

#[inline]
fn clamp5(value: i32) -> usize {
    value.clamp(0, 31) as usize
}

/// SCREEN 8 直接色: `GGGRRRBB`
pub fn screen8_color(byte: u8) -> Color {
    Color::new(
        COLOR_3BITS[((byte >> 2) & 0b111) as usize],
        COLOR_3BITS[((byte >> 5) & 0b111) as usize],
        COLOR_2BITS[(byte & 0b11) as usize],
    )
}

/// 6 位补码 → 有符号数
#[inline]
fn signed6(value: u8) -> i32 {
    let value = value as i32;
    if value > 31 { value - 64 } else { value }
}

/// 从 4 个连续字节中取出共享的色度 (j, k)
///
/// k 由前两个字节的低 3 位组成，j 由后两个字节的低 3 位组成。
pub fn chroma(group: &[u8; YJK_GROUP]) -> (i32, i32) {
    let k = (group[0] & 7) | ((group[1] & 7) << 3);
    let j = (group[2] & 7) | ((group[3] & 7) << 3);
    (signed6(j), signed6(k))
}

/// 单个像素的亮度 Y + 色度 (j, k) → RGB
pub fn yjk_to_color(y: i32, j: i32, k: i32) -> Color {
    let r = clamp5(y + j);
    let g = clamp5(y + k);
    let b = clamp5(5 * y / 4 - j / 2 - k / 4);
    Color::new(COLOR_5BITS[r], COLOR_5BITS[g], COLOR_5BITS[b])
}

/// 解码一组 4 像素
///
/// `palette` 为 `Some` 时启用 YAE: 亮度最低位为 1 的像素直接取调色板颜色。
pub fn decode_yjk_group(group: &[u8; YJK_GROUP], palette: Option<&Palette>) -> [Color; YJK_GROUP] {
    let (j, k) = chroma(group);
    (*group).map(|byte| {
        let y = (byte >> 3) as i32;
        match palette {
            Some(palette) if y & 1 == 1 => palette.get((y >> 1) as usize),
            _ => yjk_to_color(y, j, k),
        }
    })
}
