use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use image::imageops::FilterType;
use image::GenericImageView;
use log::{debug, error, info};

use crate::codec::{ImageCodec, OutputFormat};
use crate::size_spec::TargetSize;

/// ファイルサイズと縦横の長さの関係を近似する経験的な指数
pub const SIZE_EXPONENT: f64 = 0.59;

/// リサイズに使用するリサンプリングフィルタ
pub const RESAMPLE_FILTER: FilterType = FilterType::Lanczos3;

/// スキップした理由
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// 出力ファイルが既に存在する
    OutputExists,
    /// 入力ファイルが既に目標サイズ未満
    BelowTarget,
}

/// 1ファイル分の変換結果
#[derive(Debug, Clone, PartialEq)]
pub enum Conversion {
    Converted {
        input: PathBuf,
        output: PathBuf,
        input_size: u64,
        output_size: u64,
        width: u32,
        height: u32,
    },
    Skipped(SkipReason),
    Failed(String),
}

/// 縮小率から新しい縦横の長さを計算する（切り捨て、最小1px）
pub fn percent_dimensions(width: u32, height: u32, fraction: f64) -> (u32, u32) {
    (scale_dimension(width, fraction), scale_dimension(height, fraction))
}

/// 目標バイト数と入力バイト数から縮小率を推定する
///
/// 一回限りの見積もりであり、出力が目標サイズに収まる保証はありません。
pub fn scale_factor(target_bytes: u64, input_bytes: u64) -> f64 {
    (target_bytes as f64 / input_bytes as f64).powf(SIZE_EXPONENT)
}

/// 目標バイト数に合わせた新しい縦横の長さを計算する
pub fn scaled_dimensions(width: u32, height: u32, target_bytes: u64, input_bytes: u64) -> (u32, u32) {
    percent_dimensions(width, height, scale_factor(target_bytes, input_bytes))
}

fn scale_dimension(length: u32, factor: f64) -> u32 {
    ((length as f64 * factor).floor() as u32).max(1)
}

/// 出力先がディレクトリなら入力ファイル名を付け足す
pub fn resolve_output_path(input_path: &Path, output_path: &Path) -> PathBuf {
    if output_path.is_dir() {
        if let Some(file_name) = input_path.file_name() {
            return output_path.join(file_name);
        }
    }
    output_path.to_path_buf()
}

/// 1つの画像ファイルをリサイズして保存する
///
/// 出力済みのファイルは上書きしません。失敗はログに記録して
/// [`Conversion::Failed`] として返し、呼び出し元には伝播しません。
pub fn convert_file(
    input_path: &Path,
    output_path: &Path,
    target: TargetSize,
    format: &OutputFormat,
    codec: &dyn ImageCodec,
) -> Conversion {
    let output_file = resolve_output_path(input_path, output_path);

    if output_file.exists() {
        info!("{} は既に存在するためスキップします", output_file.display());
        return Conversion::Skipped(SkipReason::OutputExists);
    }

    match try_convert(input_path, &output_file, target, format, codec) {
        Ok(conversion) => conversion,
        Err(e) => {
            error!("{} の変換に失敗しました: {:#}", input_path.display(), e);
            Conversion::Failed(format!("{:#}", e))
        }
    }
}

fn try_convert(
    input_path: &Path,
    output_file: &Path,
    target: TargetSize,
    format: &OutputFormat,
    codec: &dyn ImageCodec,
) -> Result<Conversion> {
    // 出力ディレクトリが存在しない場合は作成
    if let Some(parent) = output_file.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent).with_context(|| {
                format!(
                    "出力ディレクトリの作成に失敗しました: {}",
                    parent.display()
                )
            })?;
        }
    }

    // 元のファイルサイズを取得
    let input_size = fs::metadata(input_path)
        .with_context(|| {
            format!(
                "ファイルのメタデータを取得できません: {}",
                input_path.display()
            )
        })?
        .len();

    if let TargetSize::Bytes(target_bytes) = target {
        if input_size < target_bytes {
            info!(
                "{} ({}) -> {} (目標サイズ未満のためスキップ)",
                input_path.display(),
                input_size,
                output_file.display()
            );
            return Ok(Conversion::Skipped(SkipReason::BelowTarget));
        }
    }

    let buffer = fs::read(input_path)
        .with_context(|| format!("ファイルの読み込みに失敗しました: {}", input_path.display()))?;
    let img = codec
        .decode(&buffer)
        .with_context(|| format!("画像をデコードできません: {}", input_path.display()))?;

    let (width, height) = img.dimensions();
    let (new_width, new_height) = match target {
        TargetSize::Percent(fraction) => percent_dimensions(width, height, fraction),
        TargetSize::Bytes(target_bytes) => {
            scaled_dimensions(width, height, target_bytes, input_size)
        }
    };
    debug!(
        "{}: {}x{} -> {}x{} ({})",
        input_path.display(),
        width,
        height,
        new_width,
        new_height,
        codec.name()
    );

    let resized = codec.resize(&img, new_width, new_height, RESAMPLE_FILTER);
    let encoded = codec.encode(&resized, format)?;

    fs::write(output_file, &encoded).with_context(|| {
        format!(
            "出力ファイルを書き込めませんでした: {}",
            output_file.display()
        )
    })?;

    // 保存後のファイルサイズを取得
    let output_size = fs::metadata(output_file)
        .with_context(|| {
            format!(
                "出力ファイルのメタデータを取得できません: {}",
                output_file.display()
            )
        })?
        .len();

    info!(
        "{} ({}) -> {} ({})",
        input_path.display(),
        input_size,
        output_file.display(),
        output_size
    );

    Ok(Conversion::Converted {
        input: input_path.to_path_buf(),
        output: output_file.to_path_buf(),
        input_size,
        output_size,
        width: new_width,
        height: new_height,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn half_percent_floors_each_dimension() {
        assert_eq!(percent_dimensions(200, 100, 0.5), (100, 50));
        assert_eq!(percent_dimensions(201, 101, 0.5), (100, 50));
        assert_eq!(percent_dimensions(640, 480, 1.0), (640, 480));
    }

    #[test]
    fn tiny_results_are_clamped_to_one_pixel() {
        assert_eq!(percent_dimensions(50, 10, 0.01), (1, 1));
    }

    #[test]
    fn scale_factor_follows_power_law() {
        let factor = scale_factor(102_400, 204_800);
        assert!((factor - 0.5f64.powf(0.59)).abs() < 1e-12);
        assert!((factor - 0.6643).abs() < 1e-3);
    }

    #[test]
    fn scaled_dimensions_apply_factor_to_both_sides() {
        let factor = scale_factor(102_400, 204_800);
        let expected = (
            (1000.0 * factor).floor() as u32,
            (800.0 * factor).floor() as u32,
        );
        assert_eq!(scaled_dimensions(1000, 800, 102_400, 204_800), expected);
        assert_eq!(expected, (664, 531));
    }

    #[test]
    fn output_directory_receives_input_file_name() {
        let dir = tempfile::tempdir().unwrap();
        let resolved = resolve_output_path(Path::new("photos/cat.png"), dir.path());
        assert_eq!(resolved, dir.path().join("cat.png"));

        let explicit = dir.path().join("renamed.jpg");
        assert_eq!(
            resolve_output_path(Path::new("photos/cat.png"), &explicit),
            explicit
        );
    }
}
