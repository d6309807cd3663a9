//! MSX Converter 命令行
//!
//! 用法: msx_converter [选项] 输入文件[,调色板文件] [输出文件]

use anyhow::{Context, Result};
use msx_converter::FormatId;
use msx_converter::converter::{self, ConvertOptions, Written};
use std::path::{Path, PathBuf};
use tracing::Level;
use tracing_appender::rolling;

/// 应用程序名称
pub const APP_NAME: &str = "msx_converter";

/// 应用程序版本（从 Cargo.toml 读取）
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// 命令行参数
#[derive(Debug, Default, PartialEq)]
struct CliArgs {
    type_hint: String,
    double_size: bool,
    verbose: bool,
    log_dir: Option<PathBuf>,
    input_files: Vec<PathBuf>,
    output_file: Option<PathBuf>,
    show_help: bool,
    show_version: bool,
}

fn parse_args<I: IntoIterator<Item = String>>(args: I) -> std::result::Result<CliArgs, String> {
    let mut cli = CliArgs::default();
    let mut positional = Vec::new();
    let mut args = args.into_iter();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "-t" | "--type" => {
                cli.type_hint = args.next().ok_or("-t 需要一个文件类型")?;
            }
            "-d" | "--double" => cli.double_size = true,
            "-v" | "--verbose" => cli.verbose = true,
            "--log-dir" => {
                cli.log_dir = Some(args.next().ok_or("--log-dir 需要一个目录")?.into());
            }
            "-h" | "--help" => cli.show_help = true,
            "-V" | "--version" => cli.show_version = true,
            _ if arg.starts_with('-') => return Err(format!("未知选项: {}", arg)),
            _ => positional.push(arg),
        }
    }

    let mut positional = positional.into_iter();
    if let Some(inputs) = positional.next() {
        cli.input_files = inputs
            .split(',')
            .filter(|s| !s.is_empty())
            .map(PathBuf::from)
            .collect();
    }
    cli.output_file = positional.next().map(PathBuf::from);

    if !cli.type_hint.is_empty() && FormatId::from_tag(&cli.type_hint).is_none() {
        return Err(format!("不支持的文件类型: {}", cli.type_hint));
    }

    Ok(cli)
}

fn print_usage() {
    let formats: Vec<&str> = FormatId::ALL.iter().map(FormatId::tag).collect();
    eprintln!("用法: {} [选项] 输入文件[,调色板文件] [输出文件]", APP_NAME);
    eprintln!();
    eprintln!("选项:");
    eprintln!("  -t, --type <类型>   指定文件类型 ({})", formats.join(", "));
    eprintln!("  -d, --double        输出图像放大 2 倍");
    eprintln!("  -v, --verbose       输出调试日志");
    eprintln!("      --log-dir <目录> 同时把日志写入该目录 (按天滚动)");
    eprintln!("  -h, --help          显示帮助信息");
    eprintln!("  -V, --version       显示版本");
}

/// 初始化日志 - 输出到标准错误，可选同时输出到文件
fn init_logging(verbose: bool, log_dir: Option<&Path>) {
    use tracing_subscriber::{EnvFilter, Registry, layer::SubscriberExt, util::SubscriberInitExt};

    let log_level = if verbose { Level::DEBUG } else { Level::INFO };
    let filter = EnvFilter::builder()
        .with_default_directive(log_level.into())
        .from_env_lossy();

    let console_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_level(true)
        .with_target(verbose);

    let file_layer = log_dir.map(|dir| {
        tracing_subscriber::fmt::layer()
            .with_writer(rolling::daily(dir, "msx-converter.log"))
            .with_ansi(false)
            .with_target(true)
    });

    Registry::default()
        .with(filter)
        .with(console_layer)
        .with(file_layer)
        .init();
}

fn main() -> Result<()> {
    let cli = match parse_args(std::env::args().skip(1)) {
        Ok(cli) => cli,
        Err(message) => {
            print_usage();
            eprintln!();
            eprintln!("错误: {}", message);
            std::process::exit(1);
        }
    };

    if cli.show_version {
        println!("{} {}", APP_NAME, APP_VERSION);
        return Ok(());
    }
    if cli.show_help || cli.input_files.is_empty() {
        print_usage();
        std::process::exit(if cli.show_help { 0 } else { 1 });
    }

    init_logging(cli.verbose, cli.log_dir.as_deref());
    tracing::debug!("{} {} 启动", APP_NAME, APP_VERSION);

    let opts = ConvertOptions {
        input_files: cli.input_files,
        output_file: cli.output_file,
        type_hint: cli.type_hint,
        double_size: cli.double_size,
    };

    let written = converter::convert(&opts)
        .with_context(|| format!("转换 {} 失败", opts.input_files[0].display()))?;

    if let Written::File(path) = written {
        tracing::debug!("输出文件: {}", path.display());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_app_info() {
        assert_eq!(APP_NAME, "msx_converter");
    }

    #[test]
    fn test_parse_full_command_line() {
        let cli = parse_args(args(&["-t", "SC5", "--double", "title.sc5,title.pal", "out.png"])).unwrap();
        assert_eq!(cli.type_hint, "SC5");
        assert!(cli.double_size);
        assert_eq!(
            cli.input_files,
            vec![PathBuf::from("title.sc5"), PathBuf::from("title.pal")]
        );
        assert_eq!(cli.output_file, Some(PathBuf::from("out.png")));
    }

    #[test]
    fn test_parse_rejects_unknown_type() {
        assert!(parse_args(args(&["-t", "GIF", "a.gif"])).is_err());
        assert!(parse_args(args(&["-t"])).is_err());
        assert!(parse_args(args(&["--bogus", "a.sc5"])).is_err());
    }

    #[test]
    fn test_parse_minimal() {
        let cli = parse_args(args(&["a.sc8"])).unwrap();
        assert_eq!(cli.input_files, vec![PathBuf::from("a.sc8")]);
        assert!(cli.output_file.is_none());
        assert!(!cli.verbose);
        assert!(parse_args(args(&[])).unwrap().input_files.is_empty());
    }
}
