//! MSX Converter - MSX 图像文件转换库
//!
//! 把 MSX 的屏幕转储 (BSAVE) 和压缩图像解码为普通的像素图像。
//! 支持的格式：
//! - SCREEN 5 / 7 (.sc5/.ge5/.sr5, .sc7/.sr7) - 16 色调色板
//! - SCREEN 8 (.sc8/.pic/.sr8) - 256 色直接色
//! - SCREEN 10 / 12 (.s10/.sca, .s12/.scc/.srs) - YJK / YAE
//! - CMP 压缩图像 (.cmp)
//! - Dynamic Publisher 图章 (.stp)
//!
//! 解码核心是纯函数：不做 IO，也不输出日志。文件读写在 [`converter`] 中完成。

#![warn(missing_docs)]

pub mod converter;
pub mod error;
pub mod formats;
pub mod image;

pub use error::{DecodeError, Result};
pub use formats::{DecodeConfig, DecoderResult, Detected, FormatId, decode, detect_format};
pub use crate::image::{DecodedImage, IndexedImage, Palette};
