use std::time::Instant;

use anyhow::Result;
use clap::error::ErrorKind;
use clap::{CommandFactory, Parser};
use log::info;

use image_resizer::{build_codec, convert_file, logger, walk_dir, Cli, ResizeConfig};

fn main() -> Result<()> {
    // コマンドライン引数の解析
    let cli = Cli::parse();

    // 入力パスの検証
    if !cli.input.is_file() && !cli.input.is_dir() {
        Cli::command()
            .error(
                ErrorKind::ValueValidation,
                format!("{} は存在しません", cli.input.display()),
            )
            .exit();
    }

    let config = match cli.to_config() {
        Ok(config) => config,
        Err(e) => Cli::command().error(ErrorKind::ValueValidation, e).exit(),
    };

    // ログ設定
    logger::init_logger(cli.log_level, cli.log_file.as_deref())?;

    display_resize_config(&cli, &config);

    let codec = build_codec(config.encoder);
    let start_time = Instant::now();

    if config.input.is_file() {
        convert_file(
            &config.input,
            &config.output,
            config.target,
            &config.format,
            codec.as_ref(),
        );
    } else {
        walk_dir(&config.input, &config.output, &config, codec.as_ref());
    }

    info!(
        "処理が完了しました。所要時間: {:.2}秒",
        start_time.elapsed().as_secs_f64()
    );

    Ok(())
}

fn display_resize_config(cli: &Cli, config: &ResizeConfig) {
    info!("==================================================");
    info!("画像リサイズユーティリティ v{}", env!("CARGO_PKG_VERSION"));
    info!("==================================================");
    info!("実行時設定:");
    info!(" - 入力: {}", config.input.display());
    info!(" - 出力: {}", config.output.display());
    if config.target.is_percent() {
        info!(" - 目標サイズ: 縮小率 {}", config.target.value());
    } else {
        info!(" - 目標サイズ: {} バイト", config.target.value());
    }
    info!(" - 出力形式: {} (品質: {})", config.format, config.format.quality());
    info!(" - エンコーダー: {}", config.encoder);
    info!(" - ログレベル: {}", cli.log_level);
    info!("--------------------------------------------------");
}
