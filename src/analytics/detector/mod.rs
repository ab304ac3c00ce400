//! Outlier Detection Module
//!
//! 交換可能な 2 つの外れ値検知戦略

mod isolation_forest;
mod lof;
mod types;

pub use isolation_forest::IsolationForest;
pub use lof::LocalOutlierFactor;
pub use types::{Contamination, Label, Strategy};

use crate::error::DetectError;

/// 外れ値検知戦略の共通契約
///
/// 入力と同じ順序で要素ごとに 1 つのラベルを返す。実装はサンプルに
/// 毎回フィットし、呼び出し間で状態を持たない。
pub trait OutlierDetector: Send + Sync {
    /// サンプル全体にフィットして各要素をラベル付けする
    fn detect(&self, sample: &[f64]) -> Result<Vec<Label>, DetectError>;
}

/// 設定済み戦略から検知器インスタンスを組み立てるファクトリ
///
/// 戦略はデプロイ時に固定。汚染率だけが操作ごとに異なる。
#[derive(Debug, Clone)]
pub struct DetectorFactory {
    strategy: Strategy,
    n_estimators: usize,
    n_neighbors: usize,
    seed: u64,
}

impl DetectorFactory {
    /// 指定戦略のファクトリを作成
    pub fn new(strategy: Strategy) -> Self {
        Self {
            strategy,
            n_estimators: isolation_forest::DEFAULT_N_ESTIMATORS,
            n_neighbors: lof::DEFAULT_N_NEIGHBORS,
            seed: 42,
        }
    }

    /// 木の本数を設定（Isolation Forest のみ）
    pub fn with_n_estimators(mut self, n_estimators: usize) -> Self {
        self.n_estimators = n_estimators;
        self
    }

    /// 近傍数を設定（Local Outlier Factor のみ）
    pub fn with_n_neighbors(mut self, n_neighbors: usize) -> Self {
        self.n_neighbors = n_neighbors;
        self
    }

    /// 乱数シードを設定
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// 設定された戦略
    pub fn strategy(&self) -> Strategy {
        self.strategy
    }

    /// 指定した汚染率の検知器を組み立てる
    pub fn detector(&self, contamination: Contamination) -> Box<dyn OutlierDetector> {
        match self.strategy {
            Strategy::IsolationForest => Box::new(
                IsolationForest::new(contamination)
                    .with_n_estimators(self.n_estimators)
                    .with_seed(self.seed),
            ),
            Strategy::LocalOutlierFactor => Box::new(
                LocalOutlierFactor::new(contamination).with_n_neighbors(self.n_neighbors),
            ),
        }
    }
}

/// スコア列をラベル列に変換
///
/// 自動汚染率はしきい値超過、固定汚染率はスコア上位 floor(rate * n) 要素を
/// 外れ値にする。同点は先頭側を優先する。
pub(crate) fn labels_from_scores(
    scores: &[f64],
    contamination: Contamination,
    auto_threshold: f64,
) -> Vec<Label> {
    match contamination {
        Contamination::Auto => scores
            .iter()
            .map(|&s| {
                if s > auto_threshold {
                    Label::Outlier
                } else {
                    Label::Inlier
                }
            })
            .collect(),
        Contamination::Fixed(rate) => {
            let count = types::fixed_outlier_count(rate, scores.len());
            let mut order: Vec<usize> = (0..scores.len()).collect();
            order.sort_by(|&a, &b| scores[b].total_cmp(&scores[a]).then(a.cmp(&b)));

            let mut labels = vec![Label::Inlier; scores.len()];
            for &i in order.iter().take(count) {
                labels[i] = Label::Outlier;
            }
            labels
        }
    }
}
