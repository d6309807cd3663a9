//! 调色板定义和解析
//!
//! MSX2 的调色板寄存器每色占 2 字节 (小端):
//! `0RRR0BBB 00000GGG`，三个 3 位分量经 [`COLOR_3BITS`] 量化为 8 位。

use image::Rgb;

pub use crate::image::palette_data::{COLOR_3BITS, DEFAULT_PALETTE_BYTES, PALETTE_BYTES};

/// 调色板原始字节
pub type PaletteBytes = [u8; PALETTE_BYTES];

/// RGB 颜色结构
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Color {
    /// 红
    pub r: u8,
    /// 绿
    pub g: u8,
    /// 蓝
    pub b: u8,
}

impl Color {
    /// 创建颜色
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// 创建黑色
    pub const fn black() -> Self {
        Self { r: 0, g: 0, b: 0 }
    }

    /// 创建白色
    pub const fn white() -> Self {
        Self {
            r: 255,
            g: 255,
            b: 255,
        }
    }

    /// 转换为 image 库的像素类型
    pub fn to_rgb(self) -> Rgb<u8> {
        Rgb([self.r, self.g, self.b])
    }
}

/// 调色板
///
/// MSX 调色板固定 16 色；STP 的单色调色板只有 2 色。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Palette {
    colors: Vec<Color>,
}

impl Palette {
    /// 从 32 字节的 VDP 调色板数据解码 16 色调色板
    pub fn from_msx_bytes(bytes: &PaletteBytes) -> Self {
        let colors = bytes
            .chunks_exact(2)
            .map(|pair| {
                let raw = u16::from_le_bytes([pair[0], pair[1]]);
                Color::new(
                    COLOR_3BITS[((raw >> 4) & 0b111) as usize],
                    COLOR_3BITS[((raw >> 8) & 0b111) as usize],
                    COLOR_3BITS[(raw & 0b111) as usize],
                )
            })
            .collect();
        Self { colors }
    }

    /// MSX2 默认调色板
    pub fn msx_default() -> Self {
        Self::from_msx_bytes(&DEFAULT_PALETTE_BYTES)
    }

    /// 黑白双色调色板 (索引 0 = 黑, 1 = 白)
    pub fn monochrome() -> Self {
        Self {
            colors: vec![Color::black(), Color::white()],
        }
    }

    /// 颜色数量
    pub fn len(&self) -> usize {
        self.colors.len()
    }

    /// 是否没有颜色
    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    /// 获取指定索引的颜色，越界时返回黑色
    #[inline]
    pub fn get(&self, index: usize) -> Color {
        self.colors.get(index).copied().unwrap_or_default()
    }

    /// 全部颜色
    pub fn colors(&self) -> &[Color] {
        &self.colors
    }

    /// 展开为 PNG PLTE 块需要的 RGB 字节序列
    pub fn to_rgb_bytes(&self) -> Vec<u8> {
        self.colors.iter().flat_map(|c| [c.r, c.g, c.b]).collect()
    }
}

/// 图像数据内嵌的调色板位置
#[derive(Debug, Clone, Copy)]
pub struct EmbeddedPalette<'a> {
    /// 调色板在显存中的地址
    pub offset: u16,
    /// 数据起始地址
    pub begin_address: u16,
    /// 数据结束地址 (不含)
    pub end_address: u16,
    /// 从起始地址开始的原始数据
    pub pixels: &'a [u8],
}

impl<'a> EmbeddedPalette<'a> {
    /// 调色板地址落在 `[begin, end)` 内且数据足够时返回 32 字节的调色板
    pub fn bytes(&self) -> Option<&'a PaletteBytes> {
        if self.offset < self.begin_address || self.offset >= self.end_address {
            return None;
        }
        let start = (self.offset - self.begin_address) as usize;
        self.pixels.get(start..start + PALETTE_BYTES)?.try_into().ok()
    }
}

/// 调色板来源，按优先级排列
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaletteSource<'a> {
    /// 图像数据内嵌
    Embedded(&'a PaletteBytes),
    /// 外部调色板文件
    External(&'a PaletteBytes),
    /// 内置默认调色板
    Default,
}

impl<'a> PaletteSource<'a> {
    /// 取第一个可用的来源: 内嵌 → 外部 → 默认
    pub fn select(
        embedded: Option<&EmbeddedPalette<'a>>,
        external: Option<&'a PaletteBytes>,
    ) -> Self {
        if let Some(bytes) = embedded.and_then(EmbeddedPalette::bytes) {
            return PaletteSource::Embedded(bytes);
        }
        if let Some(bytes) = external {
            return PaletteSource::External(bytes);
        }
        PaletteSource::Default
    }

    /// 解码为调色板
    pub fn palette(self) -> Palette {
        match self {
            PaletteSource::Embedded(bytes) | PaletteSource::External(bytes) => {
                Palette::from_msx_bytes(bytes)
            }
            PaletteSource::Default => Palette::msx_default(),
        }
    }
}

/// 解析调色板: 内嵌调色板优先，其次外部调色板，最后默认调色板
pub fn resolve_palette(
    embedded: Option<&EmbeddedPalette<'_>>,
    external: Option<&PaletteBytes>,
) -> Palette {
    PaletteSource::select(embedded, external).palette()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn palette_bytes(fill: u8) -> PaletteBytes {
        [fill; PALETTE_BYTES]
    }

    #[test]
    fn test_default_palette() {
        let palette = Palette::msx_default();
        assert_eq!(palette.len(), 16);
        // 0: 透明 (黑)
        assert_eq!(palette.get(0), Color::black());
        // 1: 0x00 0x00 → 黑
        assert_eq!(palette.get(1), Color::black());
        // 2: 0x11 0x06 → R=1, G=6, B=1
        assert_eq!(palette.get(2), Color::new(0x24, 0xdb, 0x24));
        // 15: 0x77 0x07 → 白
        assert_eq!(palette.get(15), Color::white());
    }

    #[test]
    fn test_component_layout() {
        let mut bytes = palette_bytes(0);
        bytes[0] = 0x70; // R = 7
        bytes[3] = 0x07; // 颜色 1: G = 7
        bytes[4] = 0x07; // 颜色 2: B = 7
        let palette = Palette::from_msx_bytes(&bytes);
        assert_eq!(palette.get(0), Color::new(255, 0, 0));
        assert_eq!(palette.get(1), Color::new(0, 255, 0));
        assert_eq!(palette.get(2), Color::new(0, 0, 255));
    }

    #[test]
    fn test_decode_is_deterministic() {
        let bytes: PaletteBytes = std::array::from_fn(|i| (i * 7) as u8);
        assert_eq!(Palette::from_msx_bytes(&bytes), Palette::from_msx_bytes(&bytes));
    }

    #[test]
    fn test_external_overrides_default() {
        let external = palette_bytes(0x77);
        let palette = resolve_palette(None, Some(&external));
        assert!(palette.colors().iter().all(|&c| c == Color::white()));
        assert_eq!(resolve_palette(None, None), Palette::msx_default());
    }

    #[test]
    fn test_embedded_has_priority() {
        let mut pixels = vec![0u8; 64];
        pixels[16..48].copy_from_slice(&palette_bytes(0x07));
        let embedded = EmbeddedPalette {
            offset: 0x1010,
            begin_address: 0x1000,
            end_address: 0x1040,
            pixels: &pixels,
        };
        let external = palette_bytes(0x77);

        let source = PaletteSource::select(Some(&embedded), Some(&external));
        assert!(matches!(source, PaletteSource::Embedded(_)));
        let palette = source.palette();
        assert_eq!(palette.get(3), Color::new(0, 255, 255));
    }

    #[test]
    fn test_embedded_out_of_range() {
        let pixels = vec![0x77u8; 64];
        let external = palette_bytes(0x00);

        // 调色板地址在结束地址之后
        let embedded = EmbeddedPalette {
            offset: 0x7680,
            begin_address: 0,
            end_address: 0x6A00,
            pixels: &pixels,
        };
        assert_eq!(
            PaletteSource::select(Some(&embedded), Some(&external)),
            PaletteSource::External(&external)
        );

        // 地址在范围内但数据不足
        let embedded = EmbeddedPalette {
            offset: 0x0030,
            begin_address: 0,
            end_address: 0x0100,
            pixels: &pixels,
        };
        assert_eq!(
            PaletteSource::select(Some(&embedded), None),
            PaletteSource::Default
        );
    }

    #[test]
    fn test_monochrome() {
        let palette = Palette::monochrome();
        assert_eq!(palette.len(), 2);
        assert_eq!(palette.to_rgb_bytes(), vec![0, 0, 0, 255, 255, 255]);
    }

    #[test]
    fn test_color_to_rgb() {
        assert_eq!(Color::new(255, 0, 0).to_rgb(), Rgb([255, 0, 0]));
        assert_eq!(Color::default(), Color::black());
    }
}
