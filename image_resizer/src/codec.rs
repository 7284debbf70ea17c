//! 画像のデコード・リサイズ・エンコードを担う層
//!
//! 実際の処理は `image` クレート（オプションで mozjpeg）に委譲し、
//! 変換処理からは [`ImageCodec`] トレイトを通してのみ利用します。

use std::fmt;
use std::io::Cursor;

use anyhow::{Context, Result};
use image::imageops::FilterType;
use image::{DynamicImage, ImageFormat, ImageOutputFormat};

use crate::cli::EncoderType;
use crate::error::ArgumentError;

/// 画像ライブラリへの委譲口
pub trait ImageCodec {
    /// ログ表示用の名前
    fn name(&self) -> &'static str;

    fn decode(&self, bytes: &[u8]) -> Result<DynamicImage>;

    fn resize(&self, image: &DynamicImage, width: u32, height: u32, filter: FilterType)
        -> DynamicImage;

    /// 指定形式でメモリ上にエンコードする
    fn encode(&self, image: &DynamicImage, format: &OutputFormat) -> Result<Vec<u8>>;
}

/// 出力形式とJPEG品質
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputFormat {
    name: String,
    format: ImageFormat,
    quality: u8,
}

impl OutputFormat {
    /// "jpeg" や "png" などの形式名から出力形式を決定する（大文字小文字は区別しない）
    pub fn from_name(name: &str, quality: u8) -> Result<Self, ArgumentError> {
        let name = name.trim().to_lowercase();
        let format = ImageFormat::from_extension(&name)
            .ok_or_else(|| ArgumentError::UnknownFormat(name.clone()))?;
        Ok(Self {
            name,
            format,
            quality,
        })
    }

    pub fn format(&self) -> ImageFormat {
        self.format
    }

    pub fn quality(&self) -> u8 {
        self.quality
    }

    pub fn is_jpeg(&self) -> bool {
        self.format == ImageFormat::Jpeg
    }

    fn output_format(&self) -> ImageOutputFormat {
        if self.is_jpeg() {
            ImageOutputFormat::Jpeg(self.quality)
        } else {
            self.format.into()
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// imageクレートのみを使用する実装
#[derive(Debug, Default, Clone, Copy)]
pub struct ImageCrateCodec;

impl ImageCodec for ImageCrateCodec {
    fn name(&self) -> &'static str {
        "image"
    }

    fn decode(&self, bytes: &[u8]) -> Result<DynamicImage> {
        image::load_from_memory(bytes).context("画像データの解析に失敗しました")
    }

    fn resize(
        &self,
        image: &DynamicImage,
        width: u32,
        height: u32,
        filter: FilterType,
    ) -> DynamicImage {
        image.resize_exact(width, height, filter)
    }

    fn encode(&self, image: &DynamicImage, format: &OutputFormat) -> Result<Vec<u8>> {
        let mut buffer = Cursor::new(Vec::new());
        image
            .write_to(&mut buffer, format.output_format())
            .with_context(|| format!("{} 形式でのエンコードに失敗しました", format))?;
        Ok(buffer.into_inner())
    }
}

/// JPEG出力のみmozjpegでエンコードする実装
///
/// デコードとリサイズ、JPEG以外の出力はimageクレートに任せます。
#[cfg(feature = "mozjpeg-encoder")]
#[derive(Debug, Default, Clone, Copy)]
pub struct MozjpegCodec {
    fallback: ImageCrateCodec,
}

#[cfg(feature = "mozjpeg-encoder")]
impl ImageCodec for MozjpegCodec {
    fn name(&self) -> &'static str {
        "mozjpeg"
    }

    fn decode(&self, bytes: &[u8]) -> Result<DynamicImage> {
        self.fallback.decode(bytes)
    }

    fn resize(
        &self,
        image: &DynamicImage,
        width: u32,
        height: u32,
        filter: FilterType,
    ) -> DynamicImage {
        self.fallback.resize(image, width, height, filter)
    }

    fn encode(&self, image: &DynamicImage, format: &OutputFormat) -> Result<Vec<u8>> {
        use mozjpeg::{ColorSpace, Compress};

        if !format.is_jpeg() {
            return self.fallback.encode(image, format);
        }

        // RGBに変換
        let rgb_img = image.to_rgb8();
        let width = rgb_img.width() as usize;
        let height = rgb_img.height() as usize;
        let pixels = rgb_img.into_raw();

        let mut comp = Compress::new(ColorSpace::JCS_RGB);
        comp.set_size(width, height);
        comp.set_quality(format.quality() as f32);
        comp.set_optimize_coding(true);

        let mut comp_started = comp
            .start_compress(Vec::new())
            .context("mozjpegの圧縮開始に失敗しました")?;
        comp_started
            .write_scanlines(&pixels)
            .context("画像データの書き込みに失敗しました")?;
        comp_started
            .finish()
            .context("mozjpegの圧縮完了に失敗しました")
    }
}

/// エンコーダーの種類に応じた実装を返す
pub fn build_codec(encoder: EncoderType) -> Box<dyn ImageCodec> {
    match encoder {
        EncoderType::Image => Box::new(ImageCrateCodec),
        #[cfg(feature = "mozjpeg-encoder")]
        EncoderType::Mozjpeg => Box::new(MozjpegCodec::default()),
        #[cfg(not(feature = "mozjpeg-encoder"))]
        EncoderType::Mozjpeg => {
            log::warn!("mozjpegエンコーダーが利用できません。標準のimageエンコーダーを使用します。");
            Box::new(ImageCrateCodec)
        }
    }
}
