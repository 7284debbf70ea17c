use std::path::{Path, PathBuf};

use indicatif::{ProgressBar, ProgressStyle};
use log::{info, warn};
use walkdir::WalkDir;

use crate::cli::ResizeConfig;
use crate::codec::ImageCodec;
use crate::converter::{convert_file, Conversion};
use crate::logger;
use crate::util::formatter::format_bytes;

/// 処理対象とする拡張子（小文字）
pub const IMAGE_EXTENSIONS: [&str; 3] = ["jpg", "jpeg", "png"];

/// ディレクトリ処理の統計情報
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ResizeStats {
    pub converted_files: usize,
    pub skipped_files: usize,
    pub error_files: usize,
    pub original_size: u64,
    pub resized_size: u64,
}

impl ResizeStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// 変換結果を集計に加える
    pub fn record(&mut self, conversion: &Conversion) {
        match conversion {
            Conversion::Converted {
                input_size,
                output_size,
                ..
            } => {
                self.converted_files += 1;
                self.original_size += input_size;
                self.resized_size += output_size;
            }
            Conversion::Skipped(_) => self.skipped_files += 1,
            Conversion::Failed(_) => self.error_files += 1,
        }
    }

    pub fn total_files(&self) -> usize {
        self.converted_files + self.skipped_files + self.error_files
    }

    /// 変換後のサイズ / 元のサイズ
    pub fn get_size_ratio(&self) -> f64 {
        if self.original_size == 0 {
            return 0.0;
        }
        self.resized_size as f64 / self.original_size as f64
    }

    pub fn get_summary(&self) -> String {
        format!(
            "処理サマリー: {}ファイル変換, {}スキップ, {}エラー, 容量: {} → {} ({:.1}%)",
            self.converted_files,
            self.skipped_files,
            self.error_files,
            format_bytes(self.original_size),
            format_bytes(self.resized_size),
            self.get_size_ratio() * 100.0
        )
    }
}

/// 拡張子が処理対象の画像形式か（大文字小文字は区別しない）
pub fn is_image_file(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext.to_string_lossy().to_lowercase())
        .is_some_and(|ext| IMAGE_EXTENSIONS.contains(&ext.as_str()))
}

/// ディレクトリ以下の画像ファイルを再帰的にリストアップする
pub fn collect_image_files(input_dir: &Path) -> Vec<PathBuf> {
    let mut files = Vec::new();
    // ディレクトリへのシンボリックリンクは辿らない
    for entry in WalkDir::new(input_dir).follow_links(false) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!("読み込めないエントリをスキップします: {}", e);
                continue;
            }
        };

        // ファイルを指すシンボリックリンクは通常のファイルとして扱う
        let is_file = entry.file_type().is_file()
            || (entry.path_is_symlink() && entry.path().is_file());
        if is_file && is_image_file(entry.path()) {
            files.push(entry.into_path());
        }
    }
    files
}

/// 入力ディレクトリからの相対パスを出力ディレクトリに付け替える
pub fn output_path_for(input_file: &Path, input_dir: &Path, output_dir: &Path) -> PathBuf {
    match input_file.strip_prefix(input_dir) {
        Ok(relative) => output_dir.join(relative),
        // WalkDirは入力ディレクトリを接頭辞に持つパスしか返さない
        Err(_) => output_dir.join(input_file.file_name().unwrap_or(input_file.as_os_str())),
    }
}

/// ディレクトリ内の画像を順にリサイズし、ディレクトリ構造を維持して出力する
pub fn walk_dir(
    input_dir: &Path,
    output_dir: &Path,
    config: &ResizeConfig,
    codec: &dyn ImageCodec,
) -> ResizeStats {
    info!("画像ファイルをスキャンしています...");
    let files = collect_image_files(input_dir);
    let mut stats = ResizeStats::new();

    if files.is_empty() {
        warn!(
            "{} に対象の画像ファイルが見つかりませんでした",
            input_dir.display()
        );
        return stats;
    }
    info!("合計 {} 個の画像ファイルを検出しました", files.len());

    let progress_bar = if config.show_progress {
        new_progress_bar(files.len() as u64)
    } else {
        ProgressBar::hidden()
    };
    logger::attach_progress_bar(progress_bar.clone());

    for file_path in &files {
        let output_file = output_path_for(file_path, input_dir, output_dir);
        let conversion = convert_file(
            file_path,
            &output_file,
            config.target,
            &config.format,
            codec,
        );
        stats.record(&conversion);
        progress_bar.inc(1);
    }

    progress_bar.finish_and_clear();
    logger::detach_progress_bar();

    info!("{}", stats.get_summary());
    stats
}

fn new_progress_bar(len: u64) -> ProgressBar {
    let progress_bar = ProgressBar::new(len);
    match ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg}")
    {
        Ok(style) => progress_bar.set_style(style.progress_chars("█▓▒░ ")),
        Err(e) => warn!("プログレスバーの書式が不正です: {}", e),
    }
    progress_bar
}
