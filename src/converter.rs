//! 文件转换流程: 校验 → 读取 → 识别 → 解码 → 写出

use crate::error::{DecodeError, Result};
use crate::formats::palette_file::load_palette_file;
use crate::formats::{self, DecodeConfig, DecoderResult, Detected, FormatId};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// 输入文件大小上限 (MSX 的 64 KB 地址空间)
pub const MAX_FILE_SIZE: u64 = 64 * 1024;

/// 转换选项
#[derive(Debug, Clone, Default)]
pub struct ConvertOptions {
    /// 输入文件；第二个文件 (可选) 为调色板
    pub input_files: Vec<PathBuf>,
    /// 输出文件，为空时图像写到 `<输入文件名>.png`，文本写到标准输出
    pub output_file: Option<PathBuf>,
    /// 格式提示 (`-t`)
    pub type_hint: String,
    /// 输出放大 2 倍
    pub double_size: bool,
}

/// 转换结果的去向
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Written {
    /// 写入文件
    File(PathBuf),
    /// 写到标准输出
    Stdout,
}

/// 检查输入文件: 存在、是普通文件、非空且不超过 64 KB
pub fn validate_input_file(path: &Path) -> Result<()> {
    let metadata = fs::metadata(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            DecodeError::InvalidInput(format!("输入文件不存在: {}", path.display()))
        } else {
            DecodeError::Io(e)
        }
    })?;

    if metadata.is_dir() {
        return Err(DecodeError::InvalidInput(format!(
            "输入路径是目录: {}",
            path.display()
        )));
    }
    if metadata.len() > MAX_FILE_SIZE {
        return Err(DecodeError::InvalidInput(format!(
            "输入文件过大: {} 字节 (上限 {} 字节)",
            metadata.len(),
            MAX_FILE_SIZE
        )));
    }
    if metadata.len() == 0 {
        return Err(DecodeError::InvalidInput(format!(
            "输入文件为空: {}",
            path.display()
        )));
    }

    Ok(())
}

/// 检查输出目录存在且可写
pub fn validate_output_path(path: Option<&Path>) -> Result<()> {
    let Some(dir) = path.and_then(Path::parent) else {
        return Ok(());
    };
    if dir.as_os_str().is_empty() {
        return Ok(());
    }

    let metadata = fs::metadata(dir).map_err(|_| {
        DecodeError::InvalidInput(format!("输出目录不存在: {}", dir.display()))
    })?;
    if !metadata.is_dir() {
        return Err(DecodeError::InvalidInput(format!(
            "输出路径的上级不是目录: {}",
            dir.display()
        )));
    }
    if metadata.permissions().readonly() {
        return Err(DecodeError::InvalidInput(format!(
            "输出目录不可写: {}",
            dir.display()
        )));
    }

    Ok(())
}

/// 把输入文件的扩展名替换为 `extension`
pub fn output_file_name(input: &Path, extension: &str) -> PathBuf {
    input.with_extension(extension)
}

/// 识别并解码内存中的数据
pub fn convert_bytes(
    data: &[u8],
    file_name: &str,
    type_hint: &str,
    config: &DecodeConfig,
) -> Result<(FormatId, DecoderResult)> {
    let detected = formats::detect_format(data, file_name, type_hint);
    tracing::debug!("格式识别结果: {}", detected);

    let format = match detected {
        Detected::Known(format) => format,
        Detected::Other(tag) => return Err(DecodeError::UnknownFormat(tag)),
        Detected::Unknown => {
            return Err(DecodeError::UnknownFormat(format!(
                "{} (请使用 -t 指定文件类型, 例如 -t SC5)",
                file_name
            )));
        }
    };

    tracing::debug!("识别为格式: {} ({})", format, format.name());
    let result = formats::decode(format, data, config)?;
    Ok((format, result))
}

/// 写出解码结果: 文本原样写出，图像编码为 PNG
pub fn write_result<W: Write>(result: &DecoderResult, mut writer: W) -> Result<()> {
    match result {
        DecoderResult::Text(text) => writer.write_all(text.as_bytes())?,
        DecoderResult::Image(image) => image.write_png(&mut writer)?,
    }
    writer.flush()?;
    Ok(())
}

/// 执行一次转换
pub fn convert(opts: &ConvertOptions) -> Result<Written> {
    let Some(input) = opts.input_files.first() else {
        return Err(DecodeError::InvalidInput("没有输入文件".to_string()));
    };

    for file in &opts.input_files {
        validate_input_file(file)?;
    }
    validate_output_path(opts.output_file.as_deref())?;

    tracing::debug!("读取输入文件: {:?}", input);
    let data = fs::read(input)?;

    let palette = match opts.input_files.get(1) {
        Some(path) => {
            tracing::debug!("读取调色板文件: {:?}", path);
            Some(load_palette_file(&fs::read(path)?)?)
        }
        None => None,
    };

    let config = DecodeConfig::new()
        .with_double_size(opts.double_size)
        .with_palette(palette);

    let file_name = input.to_string_lossy();
    let (format, result) = convert_bytes(&data, &file_name, &opts.type_hint, &config)?;

    if let Some(image) = result.image() {
        tracing::info!(
            "{}: {} 解码为 {}x{} 图像",
            file_name,
            format.name(),
            image.width(),
            image.height()
        );
    }

    let path = match &opts.output_file {
        Some(path) => path.clone(),
        None if format.is_text() => {
            write_result(&result, std::io::stdout().lock())?;
            return Ok(Written::Stdout);
        }
        None => output_file_name(input, "png"),
    };

    write_result(&result, BufWriter::new(File::create(&path)?))?;
    tracing::info!("已写出: {}", path.display());
    Ok(Written::File(path))
}
