#![allow(dead_code)]

use std::path::Path;

use image::{DynamicImage, Rgb, RgbImage};

/// 圧縮しにくい疑似乱数ノイズ画像
pub fn noisy_image(width: u32, height: u32) -> RgbImage {
    let mut state: u32 = 0x1234_5678;
    RgbImage::from_fn(width, height, |_, _| {
        state = state.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
        let [_, r, g, b] = state.to_le_bytes();
        Rgb([r, g, b])
    })
}

/// 単色の小さな画像
pub fn flat_image(width: u32, height: u32) -> RgbImage {
    RgbImage::from_pixel(width, height, Rgb([200, 120, 40]))
}

/// 拡張子から形式を推定して保存する（親ディレクトリも作成）
pub fn write_image(path: &Path, image: &RgbImage) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    image.save(path).unwrap();
}

pub fn file_size(path: &Path) -> u64 {
    std::fs::metadata(path).unwrap().len()
}

/// 拡張子ではなく中身から形式を判定して読み込む
pub fn open_guessed(path: &Path) -> DynamicImage {
    image::load_from_memory(&std::fs::read(path).unwrap()).unwrap()
}
