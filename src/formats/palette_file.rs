//! 外部调色板文件
//!
//! 支持三种布局:
//! - 正好 32 字节的调色板数据
//! - BSAVE 文件头 + 32 字节
//! - 包含调色板区域 (0x7680 - 0x769F) 的完整 SCREEN 5 BSAVE 文件

use crate::error::{DecodeError, Result};
use crate::formats::screen::{PALETTE_OFFSET_5, SCREEN_HEADER_LEN, ScreenHeader};
use crate::formats::MAGIC_BINARY;
use crate::image::PaletteBytes;
use crate::image::palette_data::PALETTE_BYTES;

fn to_palette(bytes: &[u8]) -> Result<PaletteBytes> {
    bytes
        .try_into()
        .map_err(|_| DecodeError::InvalidPalette(format!("需要 {} 字节", PALETTE_BYTES)))
}

/// 结束地址覆盖到调色板末尾即视为带调色板的 SCREEN 5 文件
fn includes_screen5_palette(header: &ScreenHeader<'_>) -> bool {
    header.end_address as usize >= PALETTE_OFFSET_5 as usize + PALETTE_BYTES - 1
}

fn extract_screen5_palette(header: &ScreenHeader<'_>) -> Result<PaletteBytes> {
    let start = PALETTE_OFFSET_5
        .checked_sub(header.begin_address)
        .ok_or_else(|| {
            DecodeError::InvalidPalette(format!(
                "调色板地址 0x{:04X} 在起始地址 0x{:04X} 之前",
                PALETTE_OFFSET_5, header.begin_address
            ))
        })? as usize;

    let bytes = header.pixels.get(start..start + PALETTE_BYTES).ok_or_else(|| {
        DecodeError::InvalidPalette(format!(
            "文件过短: 需要 {} 字节, 实际 {} 字节",
            SCREEN_HEADER_LEN + start + PALETTE_BYTES,
            SCREEN_HEADER_LEN + header.pixels.len()
        ))
    })?;
    to_palette(bytes)
}

/// 从调色板文件内容中取出 32 字节的调色板数据
pub fn load_palette_file(data: &[u8]) -> Result<PaletteBytes> {
    if data.is_empty() {
        return Err(DecodeError::InvalidPalette("调色板文件为空".to_string()));
    }

    if data.len() == PALETTE_BYTES {
        return to_palette(data);
    }

    if data[0] != MAGIC_BINARY {
        return Err(DecodeError::InvalidPalette(format!(
            "无法识别的调色板文件: {} 字节 (应为 32 字节或 BSAVE 文件)",
            data.len()
        )));
    }

    let header = ScreenHeader::parse(data).map_err(|_| {
        DecodeError::InvalidPalette(format!(
            "BSAVE 调色板文件过短: {} 字节, 至少需要 {} 字节",
            data.len(),
            SCREEN_HEADER_LEN
        ))
    })?;

    if header.pixels.len() == PALETTE_BYTES {
        return to_palette(header.pixels);
    }

    if includes_screen5_palette(&header) {
        return extract_screen5_palette(&header);
    }

    Err(DecodeError::InvalidPalette(format!(
        "BSAVE 文件头之后应为 32 字节或 SCREEN 5 数据, 实际 {} 字节",
        header.pixels.len()
    )))
}
