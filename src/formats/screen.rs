//! BSAVE 屏幕转储格式 (SCREEN 5/7/8/10/12)
//!
//! 文件头 7 字节: `FE` + 起始地址 + 结束地址 + 2 字节保留，均为小端。
//! 之后是从起始地址开始的显存内容。

use crate::error::{DecodeError, Result};
use crate::formats::DecodeConfig;
use crate::image::color::{YJK_GROUP, decode_yjk_group, screen8_color};
use crate::image::{
    DecodedImage, EmbeddedPalette, IndexedImage, SCREEN_WIDTH, SCREEN_WIDTH_7, resolve_palette,
    screen_height,
};
use byteorder::{LittleEndian, ReadBytesExt};
use image::RgbImage;
use std::io::Cursor;

/// BSAVE 文件头长度
pub const SCREEN_HEADER_LEN: usize = 7;

/// SCREEN 5 调色板在显存中的地址
pub const PALETTE_OFFSET_5: u16 = 0x7680;

/// SCREEN 7/10 调色板在显存中的地址
pub const PALETTE_OFFSET: u16 = 0xFA80;

/// BSAVE 文件头
#[derive(Debug, Clone, Copy)]
pub struct ScreenHeader<'a> {
    /// 起始地址
    pub begin_address: u16,
    /// 结束地址
    pub end_address: u16,
    /// 文件头之后的数据
    pub pixels: &'a [u8],
}

impl<'a> ScreenHeader<'a> {
    /// 解析文件头，魔数在识别阶段已检查，这里不再校验
    pub fn parse(data: &'a [u8]) -> Result<Self> {
        if data.len() < SCREEN_HEADER_LEN {
            return Err(DecodeError::truncated("BSAVE 文件头", SCREEN_HEADER_LEN, data.len()));
        }

        let mut reader = Cursor::new(&data[1..SCREEN_HEADER_LEN]);
        let begin_address = reader.read_u16::<LittleEndian>()?;
        let end_address = reader.read_u16::<LittleEndian>()?;

        Ok(Self {
            begin_address,
            end_address,
            pixels: &data[SCREEN_HEADER_LEN..],
        })
    }

    /// 指定地址处的内嵌调色板 (使用未截断的结束地址)
    pub fn embedded_palette(&self, offset: u16) -> EmbeddedPalette<'a> {
        EmbeddedPalette {
            offset,
            begin_address: self.begin_address,
            end_address: self.end_address,
            pixels: self.pixels,
        }
    }

    /// 需要解码的地址范围，结束地址截断到 `height × row_bytes`
    pub fn address_range(&self, height: u32, row_bytes: u32) -> std::ops::Range<u32> {
        let end = (self.end_address as u32).min(height * row_bytes);
        self.begin_address as u32..end
    }

    /// 取地址对应的字节，超出实际数据时返回 `None`
    #[inline]
    fn byte_at(&self, address: u32) -> Option<u8> {
        let index = address.checked_sub(self.begin_address as u32)? as usize;
        self.pixels.get(index).copied()
    }
}

/// 屏幕模式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScreenMode {
    /// 256×212, 16 色
    Screen5,
    /// 512×212, 16 色
    Screen7,
    /// 256×212, 256 色
    Screen8,
    /// YJK + 调色板 (YAE)
    Screen10,
    /// YJK
    Screen12,
}

impl ScreenMode {
    /// 图像宽度 (像素)
    pub fn width(&self) -> u32 {
        match self {
            ScreenMode::Screen7 => SCREEN_WIDTH_7,
            _ => SCREEN_WIDTH,
        }
    }

    /// 内嵌调色板地址
    pub fn palette_offset(&self) -> Option<u16> {
        match self {
            ScreenMode::Screen5 => Some(PALETTE_OFFSET_5),
            ScreenMode::Screen7 | ScreenMode::Screen10 => Some(PALETTE_OFFSET),
            ScreenMode::Screen8 | ScreenMode::Screen12 => None,
        }
    }

    /// 解码 BSAVE 文件 (含 7 字节文件头)
    pub fn decode(self, data: &[u8], config: &DecodeConfig) -> Result<DecodedImage> {
        let header = ScreenHeader::parse(data)?;
        let decoded = match self {
            ScreenMode::Screen5 | ScreenMode::Screen7 => self.decode_nibbles(&header, config),
            ScreenMode::Screen8 => self.decode_direct(&header),
            ScreenMode::Screen10 | ScreenMode::Screen12 => self.decode_yjk(&header, config),
        };
        Ok(decoded.finalize(config.double_image_size))
    }

    /// 每字节两个 4 位调色板索引，高 4 位在左
    fn decode_nibbles(self, header: &ScreenHeader<'_>, config: &DecodeConfig) -> DecodedImage {
        let width = self.width();
        let row_bytes = width / 2;
        let height = screen_height(header.end_address, row_bytes);

        let embedded = self.palette_offset().map(|offset| header.embedded_palette(offset));
        let palette = resolve_palette(embedded.as_ref(), config.external_palette.as_ref());

        let mut img = IndexedImage::new(width, height, palette);
        for address in header.address_range(height, row_bytes) {
            let Some(byte) = header.byte_at(address) else {
                break;
            };
            let x = (address % row_bytes) * 2;
            let y = address / row_bytes;
            img.set_index(x, y, byte >> 4);
            img.set_index(x + 1, y, byte & 0x0F);
        }

        DecodedImage::Indexed(img)
    }

    /// 每字节一个像素: `GGGRRRBB`
    fn decode_direct(self, header: &ScreenHeader<'_>) -> DecodedImage {
        let width = self.width();
        let height = screen_height(header.end_address, width);

        let mut img = RgbImage::new(width, height);
        for address in header.address_range(height, width) {
            let Some(byte) = header.byte_at(address) else {
                break;
            };
            img.put_pixel(address % width, address / width, screen8_color(byte).to_rgb());
        }

        DecodedImage::Rgb(img)
    }

    /// YJK/YAE: 每 4 字节一组，按数据起始位置逐行排列
    fn decode_yjk(self, header: &ScreenHeader<'_>, config: &DecodeConfig) -> DecodedImage {
        let width = self.width();
        let height = screen_height(header.end_address, width);

        let palette = self.palette_offset().map(|offset| {
            let embedded = header.embedded_palette(offset);
            resolve_palette(Some(&embedded), config.external_palette.as_ref())
        });

        let mut img = RgbImage::new(width, height);
        let groups = header.pixels.chunks_exact(YJK_GROUP);
        let positions = (0..height).flat_map(|y| (0..width).step_by(YJK_GROUP).map(move |x| (x, y)));

        for ((x, y), group) in positions.zip(groups) {
            let group = [group[0], group[1], group[2], group[3]];
            let colors = decode_yjk_group(&group, palette.as_ref());
            for (i, color) in colors.into_iter().enumerate() {
                img.put_pixel(x + i as u32, y, color.to_rgb());
            }
        }

        DecodedImage::Rgb(img)
    }
}
