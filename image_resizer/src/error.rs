//! コマンドライン引数の検証エラー
//!
//! サイズ指定や出力形式が不正な場合に返されるエラー型です。
//! ファイル単位の処理エラーは `anyhow` で扱い、ここには含めません。

use thiserror::Error;

/// 不正な引数（InvalidArgument）の分類
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ArgumentError {
    /// サイズ指定が空
    #[error("サイズ指定が空です")]
    EmptySize,

    /// パーセンテージが1から100の範囲外、または数値でない
    #[error("不正なパーセンテージです: `{0}` (1%から100%の範囲で指定してください)")]
    InvalidPercentage(String),

    /// 単位がk/m/gのいずれでもない
    #[error("不正なサイズ形式です: `{0}` (末尾にk, m, gのいずれかを付けてください)")]
    InvalidUnit(String),

    /// 単位の前が非負整数でない
    #[error("サイズの数値部分が不正です: `{0}`")]
    InvalidNumber(String),

    /// 目標サイズが0バイト
    #[error("目標サイズは0より大きい必要があります: `{0}`")]
    ZeroSize(String),

    /// バイト数への変換で桁あふれ
    #[error("サイズが大きすぎます: `{0}`")]
    SizeOverflow(String),

    /// 画像形式名を解釈できない
    #[error("未対応の出力形式です: `{0}`")]
    UnknownFormat(String),
}
