use anyhow::Result;
use chrono::Local;
use colored::*;
use fern::colors::{Color, ColoredLevelConfig};
use indicatif::ProgressBar;
use log::LevelFilter;
use regex::Regex;
use std::path::Path;
use std::sync::Mutex;

use crate::cli::LogLevel;

// 表示中のプログレスバー（ログ出力時に一時的に退避させる）
static ACTIVE_PROGRESS: Mutex<Option<ProgressBar>> = Mutex::new(None);

/// ログ出力時に退避させるプログレスバーを登録する
pub fn attach_progress_bar(progress_bar: ProgressBar) {
    if let Ok(mut active) = ACTIVE_PROGRESS.lock() {
        *active = Some(progress_bar);
    }
}

/// 登録済みのプログレスバーを解除する
pub fn detach_progress_bar() {
    if let Ok(mut active) = ACTIVE_PROGRESS.lock() {
        *active = None;
    }
}

// プログレスバーを崩さないように1行出力する
fn print_line(line: &str) {
    match ACTIVE_PROGRESS.lock() {
        Ok(active) => match active.as_ref() {
            Some(progress_bar) => progress_bar.suspend(|| println!("{}", line)),
            None => println!("{}", line),
        },
        Err(_) => println!("{}", line),
    }
}

pub fn level_filter(log_level: LogLevel) -> LevelFilter {
    match log_level {
        LogLevel::Error => LevelFilter::Error,
        LogLevel::Warn => LevelFilter::Warn,
        LogLevel::Info => LevelFilter::Info,
        LogLevel::Debug => LevelFilter::Debug,
        LogLevel::Trace => LevelFilter::Trace,
    }
}

/// ロガーを初期化する
///
/// 端末には色付きで出力し、`log_file` が指定されていれば
/// 同じ内容をプレーンテキストで追記します。
pub fn init_logger(log_level: LogLevel, log_file: Option<&Path>) -> Result<()> {
    // カラー設定
    let colors = ColoredLevelConfig::new()
        .error(Color::Red)
        .warn(Color::Yellow)
        .info(Color::Green)
        .debug(Color::Cyan)
        .trace(Color::BrightBlack);

    // ファイルパスの汎用正規表現（多様なパス形式と拡張子に対応）
    let path_pattern = Regex::new(
        r#"((^|[\s\(\["'])([A-Za-z]:)?[/\\]?([^<>:"\|?*\s\r\n]|[^\x00-\x7F])*[/\\]([^<>:"\|?*\s\r\n])*\.[a-zA-Z0-9]+)"#,
    )?;

    // 画素サイズとバイト数・割合
    let number_pattern =
        Regex::new(r"(\d+x\d+)|(\b\d+(\.\d+)?(\s?(KB|MB|GB|bytes)\b|%)?)")?;

    let console = fern::Dispatch::new()
        .format(move |out, message, record| {
            // 時間を青色で表示
            let timestamp = Local::now()
                .format("[%Y-%m-%d %H:%M:%S]")
                .to_string()
                .blue()
                .bold();

            // モジュール名を黄色で表示
            let module = record.target();
            let target_parts: Vec<&str> = module.split("::").collect();
            let target = if target_parts.len() > 1 {
                format!(
                    "[{}::{}]",
                    target_parts[0].yellow(),
                    target_parts[1..].join("::").yellow().bold()
                )
            } else {
                format!("[{}]", module.yellow())
            };

            let level = colors.color(record.level());

            // パスを緑色に、数値を紫色に
            let mut colored_message = message.to_string();
            colored_message = path_pattern
                .replace_all(&colored_message, |caps: &regex::Captures| {
                    caps[0].green().to_string()
                })
                .to_string();
            colored_message = number_pattern
                .replace_all(&colored_message, |caps: &regex::Captures| {
                    caps[0].purple().bold().to_string()
                })
                .to_string();

            out.finish(format_args!(
                "{} {} [{}] {}",
                timestamp, target, level, colored_message
            ))
        })
        .chain(fern::Output::call(|record| {
            print_line(&record.args().to_string())
        }));

    let mut dispatch = fern::Dispatch::new()
        .level(level_filter(log_level))
        .chain(console);

    if let Some(path) = log_file {
        let file = fern::Dispatch::new()
            .format(|out, message, record| {
                out.finish(format_args!(
                    "{} [{}] [{}] {}",
                    Local::now().format("[%Y-%m-%d %H:%M:%S]"),
                    record.target(),
                    record.level(),
                    message
                ))
            })
            .chain(fern::log_file(path)?);
        dispatch = dispatch.chain(file);
    }

    dispatch.apply()?;

    Ok(())
}
