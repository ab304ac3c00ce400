//! Outlier Detection Types
//!
//! 外れ値検知用の型定義

use serde::{Deserialize, Serialize};

/// サンプル各要素に付与されるラベル
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Label {
    /// 正常値
    Inlier,
    /// 外れ値
    Outlier,
}

impl Label {
    /// 外れ値かどうか
    pub fn is_outlier(self) -> bool {
        matches!(self, Label::Outlier)
    }
}

/// 汚染率（サンプル中の外れ値の想定割合）
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Contamination {
    /// スコアしきい値による自動推定
    Auto,
    /// 固定割合。スコア上位 floor(rate * n) 要素を外れ値にする
    Fixed(f64),
}

/// 検知戦略の選択
///
/// デプロイ時に設定で固定される。リクエスト単位では切り替えない。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Strategy {
    /// Isolation Forest（分離木アンサンブル）
    IsolationForest,
    /// Local Outlier Factor（局所密度比）
    LocalOutlierFactor,
}

impl Default for Strategy {
    fn default() -> Self {
        Strategy::IsolationForest
    }
}

impl std::fmt::Display for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Strategy::IsolationForest => write!(f, "isolation-forest"),
            Strategy::LocalOutlierFactor => write!(f, "local-outlier-factor"),
        }
    }
}

/// 固定汚染率で外れ値にする要素数
pub(crate) fn fixed_outlier_count(rate: f64, n: usize) -> usize {
    ((rate.clamp(0.0, 1.0)) * n as f64).floor() as usize
}
