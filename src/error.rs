//! 错误类型定义

use crate::formats::FormatId;
use thiserror::Error;

/// 解码/转换错误类型
#[derive(Error, Debug)]
pub enum DecodeError {
    /// 文件读写失败
    #[error("IO 错误: {0}")]
    Io(#[from] std::io::Error),

    /// RGB 图像编码失败
    #[error("图片编码错误: {0}")]
    ImageEncode(#[from] image::ImageError),

    /// 调色板 PNG 编码失败
    #[error("PNG 编码错误: {0}")]
    PngEncode(#[from] png::EncodingError),

    /// 数据长度不足
    #[error("数据过短 ({context}): 需要 {needed} 字节, 实际 {got} 字节")]
    TruncatedInput {
        /// 出错的解析步骤
        context: &'static str,
        /// 需要的字节数
        needed: usize,
        /// 实际字节数
        got: usize,
    },

    /// 宽度、高度或行数无效
    #[error("无效的尺寸: {0}")]
    InvalidDimensions(String),

    /// 位流需要读取字节时数据已用完
    #[error("位流意外结束 (offset={offset})")]
    UnrecoverableStreamEnd {
        /// 位流读取位置
        offset: usize,
    },

    /// 无法识别格式
    #[error("无法识别的文件格式: {0}")]
    UnknownFormat(String),

    /// 已识别但不支持解码
    #[error("不支持解码的格式: {0}")]
    UnsupportedFormat(FormatId),

    /// 调色板文件布局无法识别
    #[error("无效的调色板文件: {0}")]
    InvalidPalette(String),

    /// 输入或输出路径校验失败
    #[error("无效的输入: {0}")]
    InvalidInput(String),
}

impl DecodeError {
    /// 构造 [`DecodeError::TruncatedInput`]
    pub(crate) fn truncated(context: &'static str, needed: usize, got: usize) -> Self {
        DecodeError::TruncatedInput {
            context,
            needed,
            got,
        }
    }
}

/// 解码结果类型
pub type Result<T> = std::result::Result<T, DecodeError>;
