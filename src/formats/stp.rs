//! Dynamic Publisher 图章 (STP)
//!
//! 文件头为小端的宽度、高度，之后每字节 4 个像素 (每像素 2 位，高位在前)。
//! 原始画面是 512×212，横向分辨率是纵向的两倍，所以每行要复制一次。

use crate::error::{DecodeError, Result};
use crate::formats::DecodeConfig;
use crate::image::{DecodedImage, IndexedImage, Palette};
use byteorder::{LittleEndian, ReadBytesExt};
use std::io::Cursor;

/// STP 文件头长度
pub const STP_HEADER_LEN: usize = 4;

/// 每字节像素数
const PIXELS_PER_BYTE: usize = 4;

/// 第 n 个像素的调色板索引
///
/// 只检查 2 位样本的低位，且 0 对应白色 (索引 1)。这与 Dynamic Publisher
/// 生成的文件一致，其他 4 位模式没有这种反转。
#[inline]
fn stamp_index(pixels: &[u8], n: usize) -> u8 {
    let shift = 6 - 2 * (n % PIXELS_PER_BYTE);
    let bit = (pixels[n / PIXELS_PER_BYTE] >> shift) & 0x01;
    1 - bit
}

/// 解码 STP 文件
pub fn decode_stp(data: &[u8], config: &DecodeConfig) -> Result<DecodedImage> {
    if data.len() < STP_HEADER_LEN {
        return Err(DecodeError::truncated("STP 文件头", STP_HEADER_LEN, data.len()));
    }

    let mut reader = Cursor::new(data);
    let width = reader.read_u16::<LittleEndian>()? as u32;
    let height = reader.read_u16::<LittleEndian>()? as u32;
    let pixels = &data[STP_HEADER_LEN..];

    if width == 0 || height == 0 {
        return Err(DecodeError::InvalidDimensions(format!(
            "STP 宽度={} 高度={}",
            width, height
        )));
    }

    let expected = (width as usize * height as usize).div_ceil(PIXELS_PER_BYTE);
    if pixels.len() < expected {
        return Err(DecodeError::truncated("STP 像素数据", expected, pixels.len()));
    }

    let mut img = IndexedImage::new(width, height, Palette::monochrome());
    for y in 0..height {
        for x in 0..width {
            let n = (y * width + x) as usize;
            img.set_index(x, y, stamp_index(pixels, n));
        }
    }

    Ok(DecodedImage::Indexed(img)
        .double_rows()
        .finalize(config.double_image_size))
}
