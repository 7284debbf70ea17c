use std::fmt;
use std::str::FromStr;

use crate::error::ArgumentError;

const KIB: u64 = 1024;
const MIB: u64 = KIB * 1024;
const GIB: u64 = MIB * 1024;

/// リサイズの目標
///
/// `Percent` は元の縦横の長さに掛ける比率 (0, 1]、
/// `Bytes` は目標とするファイルサイズ（バイト）を表します。
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TargetSize {
    Percent(f64),
    Bytes(u64),
}

impl TargetSize {
    /// 比率またはバイト数を数値として返す
    pub fn value(&self) -> f64 {
        match self {
            TargetSize::Percent(fraction) => *fraction,
            TargetSize::Bytes(bytes) => *bytes as f64,
        }
    }

    pub fn is_percent(&self) -> bool {
        matches!(self, TargetSize::Percent(_))
    }
}

impl FromStr for TargetSize {
    type Err = ArgumentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        resolve_size_spec(s)
    }
}

impl fmt::Display for TargetSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TargetSize::Percent(fraction) => write!(f, "{}%", (fraction * 100.0).round() as u64),
            TargetSize::Bytes(bytes) => write!(f, "{} bytes", bytes),
        }
    }
}

/// "50%" や "100k" のようなサイズ指定を解釈する
///
/// 末尾が `%` なら1から100の整数を比率に変換し、
/// それ以外は末尾の単位 (k/m/g) を1024の累乗として掛け合わせます。
pub fn resolve_size_spec(spec: &str) -> Result<TargetSize, ArgumentError> {
    let spec = spec.trim().to_lowercase();
    if spec.is_empty() {
        return Err(ArgumentError::EmptySize);
    }

    if let Some(number) = spec.strip_suffix('%') {
        let percent: u32 = number
            .parse()
            .map_err(|_| ArgumentError::InvalidPercentage(spec.clone()))?;
        if !(1..=100).contains(&percent) {
            return Err(ArgumentError::InvalidPercentage(spec));
        }
        return Ok(TargetSize::Percent(percent as f64 / 100.0));
    }

    // 末尾の1文字を単位として扱う
    let mut chars = spec.chars();
    let unit = match chars.next_back() {
        Some('k') => KIB,
        Some('m') => MIB,
        Some('g') => GIB,
        _ => return Err(ArgumentError::InvalidUnit(spec)),
    };

    let number: u64 = chars
        .as_str()
        .parse()
        .map_err(|_| ArgumentError::InvalidNumber(spec.clone()))?;
    let bytes = number
        .checked_mul(unit)
        .ok_or_else(|| ArgumentError::SizeOverflow(spec.clone()))?;
    if bytes == 0 {
        return Err(ArgumentError::ZeroSize(spec));
    }

    Ok(TargetSize::Bytes(bytes))
}
