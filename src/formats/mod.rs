//! 文件格式识别与解码分发

pub mod cmp;
pub mod palette_file;
pub mod screen;
pub mod stp;

use crate::error::{DecodeError, Result};
use crate::image::{DecodedImage, PaletteBytes};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

pub use screen::{SCREEN_HEADER_LEN, ScreenHeader, ScreenMode};

/// MSX BASIC (词法化) 文件
pub const MAGIC_BAS: u8 = 0xFF;
/// WBASS2 源文件
pub const MAGIC_WB2: u8 = 0xFD;
/// BSAVE 二进制 (内存转储) 文件
pub const MAGIC_BINARY: u8 = 0xFE;

/// 常见 SCREEN 5 BSAVE 文件头: 0x0000 - 0x769F，包含调色板
pub const SCREEN5_SIGNATURE: [u8; SCREEN_HEADER_LEN] = [0xFE, 0x00, 0x00, 0x9F, 0x76, 0x00, 0x00];

/// 支持的格式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormatId {
    /// SCREEN 5 (256×212, 16 色)
    Sc5,
    /// SCREEN 7 (512×212, 16 色)
    Sc7,
    /// SCREEN 8 (256×212, 256 色直接色)
    Sc8,
    /// SCREEN 10 (YJK + 调色板, YAE)
    S10,
    /// SCREEN 12 (YJK)
    S12,
    /// Dynamic Publisher 图章
    Stp,
    /// 压缩的 SCREEN 5 图像
    Cmp,
    /// MSX BASIC
    Bas,
    /// WBASS2
    Wb2,
}

impl FormatId {
    /// 全部格式
    pub const ALL: [FormatId; 9] = [
        FormatId::Bas,
        FormatId::Wb2,
        FormatId::Sc5,
        FormatId::Sc7,
        FormatId::Sc8,
        FormatId::S10,
        FormatId::S12,
        FormatId::Stp,
        FormatId::Cmp,
    ];

    /// 格式标签，与命令行 `-t` 参数一致
    pub fn tag(&self) -> &'static str {
        match self {
            FormatId::Sc5 => "SC5",
            FormatId::Sc7 => "SC7",
            FormatId::Sc8 => "SC8",
            FormatId::S10 => "S10",
            FormatId::S12 => "S12",
            FormatId::Stp => "STP",
            FormatId::Cmp => "CMP",
            FormatId::Bas => "BAS",
            FormatId::Wb2 => "WB2",
        }
    }

    /// 获取格式名称
    pub fn name(&self) -> &'static str {
        match self {
            FormatId::Sc5 => "SCREEN 5",
            FormatId::Sc7 => "SCREEN 7",
            FormatId::Sc8 => "SCREEN 8",
            FormatId::S10 => "SCREEN 10 (YAE)",
            FormatId::S12 => "SCREEN 12 (YJK)",
            FormatId::Stp => "Dynamic Publisher Stamp",
            FormatId::Cmp => "Compressed SCREEN 5",
            FormatId::Bas => "MSX BASIC",
            FormatId::Wb2 => "WBASS2",
        }
    }

    /// 从标签识别格式 (不区分大小写)
    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|format| format.tag().eq_ignore_ascii_case(tag))
    }

    /// BSAVE 文件按扩展名识别 (不区分大小写，不含 '.')
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_uppercase().as_str() {
            "GE5" | "SC5" | "SR5" => Some(FormatId::Sc5),
            "SC7" | "SR7" => Some(FormatId::Sc7),
            "SC8" | "PIC" | "SR8" => Some(FormatId::Sc8),
            "S10" | "SCA" => Some(FormatId::S10),
            "S12" | "SCC" | "SRS" => Some(FormatId::S12),
            "CMP" => Some(FormatId::Cmp),
            _ => None,
        }
    }

    /// 是否输出文本 (未指定输出文件时写到标准输出)
    pub fn is_text(&self) -> bool {
        matches!(self, FormatId::Bas | FormatId::Wb2)
    }
}

impl fmt::Display for FormatId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for FormatId {
    type Err = DecodeError;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_tag(s).ok_or_else(|| DecodeError::UnknownFormat(s.to_string()))
    }
}

/// 格式识别结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Detected {
    /// 已支持的格式
    Known(FormatId),
    /// 原样返回的扩展名或类型提示，不对应任何已支持格式
    Other(String),
    /// 无法识别
    Unknown,
}

impl Detected {
    fn from_tag(tag: &str) -> Self {
        FormatId::from_tag(tag)
            .map(Detected::Known)
            .unwrap_or_else(|| Detected::Other(tag.to_string()))
    }
}

impl fmt::Display for Detected {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Detected::Known(format) => write!(f, "{}", format),
            Detected::Other(tag) => f.write_str(tag),
            Detected::Unknown => f.write_str("unknown"),
        }
    }
}

/// 取文件扩展名 (大写、不含 '.')
///
/// 取文件名最后一个 '.' 之后的部分，所以 `.sc8` 的扩展名是 `SC8`。
fn file_extension(file_name: &str) -> Option<String> {
    let name = Path::new(file_name).file_name()?.to_str()?;
    let (_, ext) = name.rsplit_once('.')?;
    (!ext.is_empty()).then(|| ext.to_ascii_uppercase())
}

/// BSAVE 文件的识别顺序: 扩展名 → 已知文件头
fn detect_binary(data: &[u8], file_name: &str) -> Detected {
    if data.len() < SCREEN_HEADER_LEN {
        return Detected::Unknown;
    }

    let by_extension = || file_extension(file_name).and_then(|ext| FormatId::from_extension(&ext));
    let by_signature = || data.starts_with(&SCREEN5_SIGNATURE).then_some(FormatId::Sc5);

    by_extension()
        .or_else(by_signature)
        .map(Detected::Known)
        .unwrap_or(Detected::Unknown)
}

/// 识别文件格式
///
/// `hint` 非空时直接返回，不做任何检测。
pub fn detect_format(data: &[u8], file_name: &str, hint: &str) -> Detected {
    if !hint.is_empty() {
        return Detected::from_tag(hint);
    }

    let Some(&magic) = data.first() else {
        return Detected::Unknown;
    };

    match magic {
        MAGIC_BAS => Detected::Known(FormatId::Bas),
        MAGIC_WB2 => Detected::Known(FormatId::Wb2),
        MAGIC_BINARY => detect_binary(data, file_name),
        _ => file_extension(file_name)
            .map(|ext| Detected::from_tag(&ext))
            .unwrap_or(Detected::Unknown),
    }
}

/// 解码配置
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DecodeConfig {
    /// 输出放大 2 倍
    pub double_image_size: bool,
    /// 外部调色板 (32 字节)
    pub external_palette: Option<PaletteBytes>,
}

impl DecodeConfig {
    /// 默认配置: 不放大，无外部调色板
    pub fn new() -> Self {
        Self::default()
    }

    /// 设置是否放大 2 倍
    pub fn with_double_size(mut self, double: bool) -> Self {
        self.double_image_size = double;
        self
    }

    /// 设置外部调色板
    pub fn with_palette(mut self, palette: Option<PaletteBytes>) -> Self {
        self.external_palette = palette;
        self
    }
}

/// 解码结果
#[derive(Debug, Clone, PartialEq)]
pub enum DecoderResult {
    /// 文本 (BASIC 列表等)
    Text(String),
    /// 图像
    Image(DecodedImage),
}

impl DecoderResult {
    /// 图像结果，文本时为 `None`
    pub fn image(&self) -> Option<&DecodedImage> {
        match self {
            DecoderResult::Image(image) => Some(image),
            DecoderResult::Text(_) => None,
        }
    }
}

/// 按格式解码
pub fn decode(format: FormatId, data: &[u8], config: &DecodeConfig) -> Result<DecoderResult> {
    let image = match format {
        FormatId::Sc5 => ScreenMode::Screen5.decode(data, config)?,
        FormatId::Sc7 => ScreenMode::Screen7.decode(data, config)?,
        FormatId::Sc8 => ScreenMode::Screen8.decode(data, config)?,
        FormatId::S10 => ScreenMode::Screen10.decode(data, config)?,
        FormatId::S12 => ScreenMode::Screen12.decode(data, config)?,
        FormatId::Stp => stp::decode_stp(data, config)?,
        FormatId::Cmp => cmp::decode_cmp(data, config)?,
        FormatId::Bas | FormatId::Wb2 => return Err(DecodeError::UnsupportedFormat(format)),
    };
    Ok(DecoderResult::Image(image))
}
