//! CMP 压缩图像
//!
//! 文件头 3 字节: 每行字节数、行数、直接存储的行数。之后是位流数据。
//! 前 K 行按原样存储，其余各行与上一行逐字节异或。
//! 解出的数据按 SCREEN 5 方式解释 (每字节 2 像素)。

use crate::error::{DecodeError, Result};
use crate::formats::DecodeConfig;
use crate::image::{BitStreamReader, DecodedImage, IndexedImage, SCREEN_WIDTH, resolve_palette};

/// CMP 文件头长度
pub const CMP_HEADER_LEN: usize = 3;

/// CMP 文件头
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CmpHeader {
    /// 每行字节数 (1 字节 = 2 像素)
    pub row_bytes: usize,
    /// 行数
    pub height: usize,
    /// 直接存储的行数
    pub verbatim_rows: usize,
}

impl CmpHeader {
    /// 解析并校验 3 字节文件头
    pub fn parse(data: &[u8]) -> Result<Self> {
        let &[row_bytes, height, verbatim_rows, ..] = data else {
            return Err(DecodeError::truncated("CMP 文件头", CMP_HEADER_LEN, data.len()));
        };

        if row_bytes == 0 || height == 0 {
            return Err(DecodeError::InvalidDimensions(format!(
                "CMP 宽度={} 高度={}",
                row_bytes, height
            )));
        }
        if verbatim_rows > height {
            return Err(DecodeError::InvalidDimensions(format!(
                "CMP 直接存储行数 {} 超过高度 {}",
                verbatim_rows, height
            )));
        }

        Ok(Self {
            row_bytes: row_bytes as usize,
            height: height as usize,
            verbatim_rows: verbatim_rows as usize,
        })
    }

    /// 输出图像宽度 (像素)，不超过屏幕宽度
    pub fn pixel_width(&self) -> u32 {
        (self.row_bytes as u32 * 2).min(SCREEN_WIDTH)
    }
}

/// 解压 CMP 数据，返回 `row_bytes × height` 的原始字节
pub fn decompress_cmp(data: &[u8]) -> Result<(CmpHeader, Vec<u8>)> {
    let header = CmpHeader::parse(data)?;
    let mut reader = BitStreamReader::new(data, CMP_HEADER_LEN)?;

    let width = header.row_bytes;
    let mut output = vec![0u8; width * header.height];

    // 第一阶段: 直接写入
    let verbatim_len = header.verbatim_rows * width;
    for byte in &mut output[..verbatim_len] {
        *byte = reader.read_byte()?;
    }

    // 第二阶段: 与上一行异或
    for i in verbatim_len..output.len() {
        let byte = reader.read_byte()?;
        output[i] = match i.checked_sub(width) {
            Some(above) => byte ^ output[above],
            None => byte,
        };
    }

    Ok((header, output))
}

/// 解码 CMP 文件
///
/// CMP 不带调色板，只使用外部调色板或默认调色板。
pub fn decode_cmp(data: &[u8], config: &DecodeConfig) -> Result<DecodedImage> {
    let (header, output) = decompress_cmp(data)?;

    let width = header.pixel_width();
    let palette = resolve_palette(None, config.external_palette.as_ref());
    let mut img = IndexedImage::new(width, header.height as u32, palette);

    for (y, row) in output.chunks_exact(header.row_bytes).enumerate() {
        let y = y as u32;
        for (x, &byte) in row.iter().enumerate() {
            let x = x as u32 * 2;
            if x >= width {
                break;
            }
            img.set_index(x, y, byte >> 4);
            if x + 1 < width {
                img.set_index(x + 1, y, byte & 0x0F);
            }
        }
    }

    Ok(DecodedImage::Indexed(img).finalize(config.double_image_size))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image::Palette;

    #[test]
    fn test_header_errors() {
        for data in [&[][..], &[0x01, 0x02][..]] {
            let err = decode_cmp(data, &DecodeConfig::new()).unwrap_err();
            assert!(matches!(err, DecodeError::TruncatedInput { .. }), "{:?}", err);
        }

        // 宽度为 0、高度为 0、直接存储行数超过高度
        for data in [[0x00, 0x10, 0x05], [0x10, 0x00, 0x05], [0x10, 0x10, 0xFF]] {
            let err = decode_cmp(&data, &DecodeConfig::new()).unwrap_err();
            assert!(matches!(err, DecodeError::InvalidDimensions(_)), "{:?}", err);
        }
    }

    #[test]
    fn test_header_without_stream() {
        let err = decode_cmp(&[0x02, 0x01, 0x01], &DecodeConfig::new()).unwrap_err();
        assert!(matches!(err, DecodeError::TruncatedInput { .. }));
    }

    #[test]
    fn test_phase1_only_with_zero_table() {
        // 查找表全 0: 后面的字节不会被读取
        let data = [0x02, 0x02, 0x02, 0x00, 0x11, 0x22, 0x33, 0x44];
        let (_, output) = decompress_cmp(&data).unwrap();
        assert_eq!(output, vec![0; 4]);

        let DecodedImage::Indexed(img) = decode_cmp(&data, &DecodeConfig::new()).unwrap() else {
            panic!("应为调色板图像");
        };
        assert_eq!((img.width(), img.height()), (4, 2));
        assert_eq!(img.palette, Palette::msx_default());
    }

    #[test]
    fn test_phase1_reads_stream() {
        // 表[0] = 0b1100_0000: 前两个字节来自数据流
        let data = [0x02, 0x01, 0x01, 0x80, 0xC0, 0x12, 0x34];
        let DecodedImage::Indexed(img) = decode_cmp(&data, &DecodeConfig::new()).unwrap() else {
            panic!("应为调色板图像");
        };
        let row: Vec<u8> = (0..4).map(|x| img.index_at(x, 0)).collect();
        assert_eq!(row, vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_phase2_xor_previous_row() {
        // 第 0 行直接读取 [0x12, 0x34]；第 1 行读到 [0x00, 0x0F]，异或后为 [0x12, 0x3B]
        let data = [0x02, 0x02, 0x01, 0x80, 0xD0, 0x12, 0x34, 0x0F];
        let (_, output) = decompress_cmp(&data).unwrap();
        assert_eq!(output, vec![0x12, 0x34, 0x12, 0x3B]);
    }

    #[test]
    fn test_phase2_from_first_row() {
        // K = 0: 第 0 行没有上一行，按原样存储
        let data = [0x01, 0x02, 0x00, 0x80, 0xC0, 0x55, 0x0F];
        let (_, output) = decompress_cmp(&data).unwrap();
        assert_eq!(output, vec![0x55, 0x5A]);
    }

    #[test]
    fn test_missing_stream_byte() {
        let data = [0x02, 0x01, 0x01, 0x80, 0xC0, 0x12];
        let err = decode_cmp(&data, &DecodeConfig::new()).unwrap_err();
        assert!(matches!(err, DecodeError::UnrecoverableStreamEnd { .. }));
    }

    #[test]
    fn test_width_clamped_to_screen() {
        let data = [0xFF, 0x01, 0x01, 0x00];
        let DecodedImage::Indexed(img) = decode_cmp(&data, &DecodeConfig::new()).unwrap() else {
            panic!("应为调色板图像");
        };
        assert_eq!(img.width(), 256);
    }

    #[test]
    fn test_external_palette_and_double() {
        let data = [0x01, 0x01, 0x01, 0x00];
        let config = DecodeConfig::new()
            .with_palette(Some([0x77; 32]))
            .with_double_size(true);
        let image = decode_cmp(&data, &config).unwrap();
        assert_eq!((image.width(), image.height()), (4, 2));
        assert!(image.palette().unwrap().colors().iter().all(|c| c.r == 255));
    }
}
