//! 解码后的图像结构与后处理 (行复制、2 倍放大、PNG 导出)

use crate::error::Result;
use crate::image::palette::{Color, Palette};
use image::codecs::png::PngEncoder;
use image::{ExtendedColorType, GrayImage, ImageBuffer, ImageEncoder, Luma, Pixel, RgbImage};
use std::io::Write;

/// 调色板索引图像，每个像素存放一个调色板索引
#[derive(Debug, Clone, PartialEq)]
pub struct IndexedImage {
    /// 调色板索引
    pub indices: GrayImage,
    /// 调色板
    pub palette: Palette,
}

impl IndexedImage {
    /// 创建全部为索引 0 的图像
    pub fn new(width: u32, height: u32, palette: Palette) -> Self {
        Self {
            indices: GrayImage::new(width, height),
            palette,
        }
    }

    /// 宽度
    pub fn width(&self) -> u32 {
        self.indices.width()
    }

    /// 高度
    pub fn height(&self) -> u32 {
        self.indices.height()
    }

    /// 设置像素的调色板索引
    #[inline]
    pub fn set_index(&mut self, x: u32, y: u32, index: u8) {
        self.indices.put_pixel(x, y, Luma([index]));
    }

    /// 像素的调色板索引
    #[inline]
    pub fn index_at(&self, x: u32, y: u32) -> u8 {
        self.indices.get_pixel(x, y).0[0]
    }

    /// 像素的颜色
    pub fn color_at(&self, x: u32, y: u32) -> Color {
        self.palette.get(self.index_at(x, y) as usize)
    }
}

/// 解码结果图像
#[derive(Debug, Clone, PartialEq)]
pub enum DecodedImage {
    /// 调色板模式 (SCREEN 5/7、CMP、STP)
    Indexed(IndexedImage),
    /// 直接色模式 (SCREEN 8/10/12)
    Rgb(RgbImage),
}

fn duplicate_rows<P: Pixel>(
    image: &ImageBuffer<P, Vec<P::Subpixel>>,
) -> ImageBuffer<P, Vec<P::Subpixel>> {
    ImageBuffer::from_fn(image.width(), image.height() * 2, |x, y| {
        *image.get_pixel(x, y / 2)
    })
}

fn magnify<P: Pixel>(image: &ImageBuffer<P, Vec<P::Subpixel>>) -> ImageBuffer<P, Vec<P::Subpixel>> {
    ImageBuffer::from_fn(image.width() * 2, image.height() * 2, |x, y| {
        *image.get_pixel(x / 2, y / 2)
    })
}

impl DecodedImage {
    /// 宽度
    pub fn width(&self) -> u32 {
        match self {
            DecodedImage::Indexed(img) => img.width(),
            DecodedImage::Rgb(img) => img.width(),
        }
    }

    /// 高度
    pub fn height(&self) -> u32 {
        match self {
            DecodedImage::Indexed(img) => img.height(),
            DecodedImage::Rgb(img) => img.height(),
        }
    }

    /// 调色板，直接色图像没有
    pub fn palette(&self) -> Option<&Palette> {
        match self {
            DecodedImage::Indexed(img) => Some(&img.palette),
            DecodedImage::Rgb(_) => None,
        }
    }

    /// 每行复制为相邻两行，用于修正非正方形像素的宽高比
    pub fn double_rows(self) -> Self {
        match self {
            DecodedImage::Indexed(img) => DecodedImage::Indexed(IndexedImage {
                indices: duplicate_rows(&img.indices),
                palette: img.palette,
            }),
            DecodedImage::Rgb(img) => DecodedImage::Rgb(duplicate_rows(&img)),
        }
    }

    /// 每个像素放大为 2×2
    pub fn double_size(self) -> Self {
        match self {
            DecodedImage::Indexed(img) => DecodedImage::Indexed(IndexedImage {
                indices: magnify(&img.indices),
                palette: img.palette,
            }),
            DecodedImage::Rgb(img) => DecodedImage::Rgb(magnify(&img)),
        }
    }

    /// 按配置决定是否放大
    pub fn finalize(self, double: bool) -> Self {
        if double { self.double_size() } else { self }
    }

    /// 编码为 PNG
    ///
    /// 调色板图像写成带 PLTE 的索引 PNG，直接色图像写成 8 位 RGB。
    pub fn write_png<W: Write>(&self, writer: W) -> Result<()> {
        match self {
            DecodedImage::Indexed(img) => {
                let mut encoder = png::Encoder::new(writer, img.width(), img.height());
                encoder.set_color(png::ColorType::Indexed);
                encoder.set_depth(png::BitDepth::Eight);
                encoder.set_palette(img.palette.to_rgb_bytes());
                let mut png_writer = encoder.write_header()?;
                png_writer.write_image_data(img.indices.as_raw())?;
                png_writer.finish()?;
            }
            DecodedImage::Rgb(img) => {
                PngEncoder::new(writer).write_image(
                    img.as_raw(),
                    img.width(),
                    img.height(),
                    ExtendedColorType::Rgb8,
                )?;
            }
        }
        Ok(())
    }
}
