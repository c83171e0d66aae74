//! イメージバージョン（`vMAJOR.MINOR`）
//!
//! バージョンの順序は major → minor の辞書式順序です。
//! 成分ごとの「両方とも以上」比較ではない点に注意してください。

use crate::error::VersionError;
use std::fmt;
use std::str::FromStr;

/// 2 成分のイメージバージョン
///
/// フィールド順（major, minor）がそのまま `Ord` の辞書式順序になります。
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct ImageVersion {
    pub major: u32,
    pub minor: u32,
}

impl ImageVersion {
    /// 既存バージョンが存在しない場合の基準値 `v0.0`
    pub const ZERO: ImageVersion = ImageVersion { major: 0, minor: 0 };

    pub const fn new(major: u32, minor: u32) -> Self {
        Self { major, minor }
    }
}

impl fmt::Display for ImageVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}.{}", self.major, self.minor)
    }
}

impl FromStr for ImageVersion {
    type Err = VersionError;

    /// `v1.3` または `1.3` を受け付ける
    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let body = input.strip_prefix('v').unwrap_or(input);

        let (major, minor) = body
            .split_once('.')
            .ok_or_else(|| VersionError::new(input, "expected MAJOR.MINOR"))?;

        if minor.contains('.') {
            return Err(VersionError::new(input, "expected exactly two components"));
        }

        Ok(Self {
            major: parse_component(input, major)?,
            minor: parse_component(input, minor)?,
        })
    }
}

fn parse_component(input: &str, component: &str) -> Result<u32, VersionError> {
    // u32::from_str は先頭の '+' を許容するため、数字のみであることを先に確認する
    if component.is_empty() || !component.bytes().all(|b| b.is_ascii_digit()) {
        return Err(VersionError::new(input, "components must be non-negative integers"));
    }
    component
        .parse()
        .map_err(|_| VersionError::new(input, "component out of range"))
}

/// `candidate` が `latest` より厳密に新しいか判定
///
/// major が大きい、または major が等しく minor が大きい場合のみ有効。
/// 既存バージョンがない場合の基準は `v0.0` なので、`v0.0` 自体は常に拒否されます。
pub fn is_valid_upgrade(candidate: ImageVersion, latest: ImageVersion) -> bool {
    candidate.major > latest.major
        || (candidate.major == latest.major && candidate.minor > latest.minor)
}
