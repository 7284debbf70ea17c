use clap::{Parser, ValueEnum};
use std::fmt;
use std::path::PathBuf;

use crate::codec::OutputFormat;
use crate::size_spec::{resolve_size_spec, TargetSize};

/// コマンドライン引数の解析のためのデータ構造
#[derive(Parser, Debug)]
#[command(author, version, about = "画像を目標ファイルサイズまたは縮小率で一括リサイズするユーティリティ", long_about = None)]
pub struct Cli {
    /// 入力ファイルまたはディレクトリのパス
    #[arg(
        short,
        long,
        default_value = ".",
        help = "リサイズする画像ファイル、または画像を含むディレクトリのパスを指定します。"
    )]
    pub input: PathBuf,

    /// 出力ファイルまたはディレクトリのパス
    #[arg(
        short,
        long,
        default_value = ".",
        help = "出力先のファイルまたはディレクトリのパスを指定します。"
    )]
    pub output: PathBuf,

    /// 出力サイズ（50% のような縮小率、または 100k / 2m / 1g のような目標ファイルサイズ）
    #[arg(short, long, default_value = "80%", value_parser = size_validator, help = "出力サイズを指定します。1%から100%の縮小率、またはk/m/g付きの目標ファイルサイズ（例: 100k）です。デフォルトは80%です。")]
    pub size: TargetSize,

    /// 出力画像の形式
    #[arg(
        short,
        long,
        default_value = "jpeg",
        value_parser = format_validator,
        help = "出力画像の形式を指定します（jpeg, png, bmp, tiff など）。デフォルトはjpegです。"
    )]
    pub format: String,

    /// JPEG出力の品質（1-100、高いほど高品質）
    #[arg(short, long, default_value = "75", value_parser = quality_validator, help = "JPEG出力の品質を指定します。1から100の範囲で指定してください。デフォルトは75です。")]
    pub quality: u8,

    /// エンコーダーの種類（image=imageクレート, mozjpeg=JPEGのみmozjpegで高圧縮）
    #[arg(short = 'e', long, value_enum, default_value_t = EncoderType::Image, help = "エンコーダーの種類を指定します。Image（デフォルト）はimageクレート、MozjpegはJPEG出力にmozjpegを使用します。")]
    pub encoder: EncoderType,

    /// ログレベル（error=エラーのみ, warn=警告, info=情報, debug=デバッグ, trace=詳細デバッグ）
    #[arg(short, long, value_enum, default_value_t = LogLevel::Info, help = "ログレベルを指定します。error=エラーのみ, warn=警告, info=情報, debug=デバッグ, trace=詳細デバッグ（デフォルトはinfo）")]
    pub log_level: LogLevel,

    /// ログファイルの出力先
    #[arg(long, help = "ログをファイルにも書き出す場合、そのパスを指定します。")]
    pub log_file: Option<PathBuf>,

    /// プログレスバーを表示しない
    #[arg(long, default_value_t = false, help = "ディレクトリ処理中のプログレスバーを表示しません。")]
    pub no_progress: bool,
}

/// ログレベルの列挙型
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// エンコーダーの種類の列挙型
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum EncoderType {
    /// imageクレートのエンコーダー
    Image,
    /// mozjpegエンコーダー（JPEG出力のみ、高圧縮率）
    Mozjpeg,
}

impl fmt::Display for EncoderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EncoderType::Image => write!(f, "image"),
            EncoderType::Mozjpeg => write!(f, "mozjpeg"),
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogLevel::Error => write!(f, "error"),
            LogLevel::Warn => write!(f, "warn"),
            LogLevel::Info => write!(f, "info"),
            LogLevel::Debug => write!(f, "debug"),
            LogLevel::Trace => write!(f, "trace"),
        }
    }
}

/// 解析済みの実行時設定
///
/// 起動時に一度だけ作られ、各処理へ参照で渡されます。
#[derive(Debug, Clone)]
pub struct ResizeConfig {
    pub input: PathBuf,
    pub output: PathBuf,
    pub target: TargetSize,
    pub format: OutputFormat,
    pub encoder: EncoderType,
    pub show_progress: bool,
}

impl Cli {
    /// 引数から実行時設定を組み立てる
    pub fn to_config(&self) -> Result<ResizeConfig, crate::error::ArgumentError> {
        Ok(ResizeConfig {
            input: self.input.clone(),
            output: self.output.clone(),
            target: self.size,
            format: OutputFormat::from_name(&self.format, self.quality)?,
            encoder: self.encoder,
            show_progress: !self.no_progress,
        })
    }
}

/// サイズ指定のバリデーション
fn size_validator(s: &str) -> Result<TargetSize, String> {
    resolve_size_spec(s).map_err(|e| e.to_string())
}

/// 出力形式のバリデーション（品質に依存しないため名前のみ確認）
fn format_validator(s: &str) -> Result<String, String> {
    OutputFormat::from_name(s, 75)
        .map(|format| format.to_string())
        .map_err(|e| e.to_string())
}

/// 品質パラメータのバリデーション（1-100の範囲内であることを確認）
fn quality_validator(s: &str) -> Result<u8, String> {
    s.parse::<u8>()
        .map_err(|_| format!("`{}` は有効な数値ではありません", s))
        .and_then(|quality| {
            if (1..=100).contains(&quality) {
                Ok(quality)
            } else {
                Err("品質は1から100の間である必要があります".to_string())
            }
        })
}
