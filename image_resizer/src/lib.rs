//! 画像一括リサイズユーティリティのライブラリクレート
//!
//! 目標ファイルサイズ（例: 100k）または縮小率（例: 50%）に合わせて画像を縮小し、
//! ディレクトリ構造を維持しながら出力します。既に出力済みのファイルはスキップします。
pub mod cli;
pub mod codec;
pub mod converter;
pub mod error;
pub mod logger;
pub mod size_spec;
pub mod util;
pub mod walker;

pub use cli::{Cli, ResizeConfig};
pub use codec::{build_codec, ImageCodec, ImageCrateCodec, OutputFormat};
pub use converter::{convert_file, Conversion, SkipReason};
pub use size_spec::{resolve_size_spec, TargetSize};
pub use walker::{walk_dir, ResizeStats};
