//! Isolation Forest
//!
//! 分離木アンサンブルによる外れ値検知（Liu, Ting, Zhou 2008）。
//! ランダムな分割で孤立しやすい点ほど平均パス長が短く、スコアが高くなる。

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::labels_from_scores;
use super::types::{Contamination, Label};
use super::OutlierDetector;
use crate::error::DetectError;

/// デフォルトの木の本数
pub const DEFAULT_N_ESTIMATORS: usize = 100;
/// 1 本の木に使うサブサンプル数の上限
const MAX_SUBSAMPLE: usize = 256;
/// 自動汚染率でのスコアしきい値（スコア > 0.5 を外れ値とする）
const AUTO_SCORE_THRESHOLD: f64 = 0.5;
/// オイラー・マスケローニ定数（調和数の近似用）
const EULER_GAMMA: f64 = 0.577_215_664_901_532_9;

/// Isolation Forest 検知器
///
/// 1 リクエスト分のサンプルに対して毎回フィットする。状態は持たない。
#[derive(Debug, Clone)]
pub struct IsolationForest {
    n_estimators: usize,
    seed: u64,
    contamination: Contamination,
}

/// 分離木のノード
enum Node {
    Leaf {
        size: usize,
    },
    Split {
        value: f64,
        left: Box<Node>,
        right: Box<Node>,
    },
}

impl IsolationForest {
    /// 指定した汚染率の検知器を作成
    pub fn new(contamination: Contamination) -> Self {
        Self {
            n_estimators: DEFAULT_N_ESTIMATORS,
            seed: 42,
            contamination,
        }
    }

    /// 木の本数を設定
    pub fn with_n_estimators(mut self, n_estimators: usize) -> Self {
        self.n_estimators = n_estimators.max(1);
        self
    }

    /// 乱数シードを設定
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// 各要素の異常スコアを計算（0.0-1.0、高いほど異常）
    pub fn score_samples(&self, sample: &[f64]) -> Vec<f64> {
        let n = sample.len();
        let subsample = n.min(MAX_SUBSAMPLE);
        let normalizer = average_path_length(subsample);
        if normalizer <= 0.0 {
            // 2 点未満では分離のしようがない
            return vec![0.5; n];
        }

        let max_depth = (subsample as f64).log2().ceil() as usize;
        let mut rng = StdRng::seed_from_u64(self.seed);
        let mut path_sums = vec![0.0; n];

        for _ in 0..self.n_estimators {
            let indices = rand::seq::index::sample(&mut rng, n, subsample);
            let subset: Vec<f64> = indices.iter().map(|i| sample[i]).collect();
            let tree = build_tree(&subset, 0, max_depth, &mut rng);

            for (i, &value) in sample.iter().enumerate() {
                path_sums[i] += path_length(&tree, value, 0.0);
            }
        }

        path_sums
            .iter()
            .map(|sum| {
                let mean_path = sum / self.n_estimators as f64;
                2.0_f64.powf(-mean_path / normalizer)
            })
            .collect()
    }
}

impl OutlierDetector for IsolationForest {
    fn detect(&self, sample: &[f64]) -> Result<Vec<Label>, DetectError> {
        if sample.is_empty() {
            return Err(DetectError::InsufficientData {
                required: 1,
                actual: 0,
            });
        }
        if sample.iter().any(|v| !v.is_finite()) {
            return Err(DetectError::NonFinite);
        }

        let scores = self.score_samples(sample);
        Ok(labels_from_scores(
            &scores,
            self.contamination,
            AUTO_SCORE_THRESHOLD,
        ))
    }
}

/// 部分サンプルから分離木を構築
fn build_tree(data: &[f64], depth: usize, max_depth: usize, rng: &mut StdRng) -> Node {
    let size = data.len();
    if size <= 1 || depth >= max_depth {
        return Node::Leaf { size };
    }

    let min = data.iter().copied().fold(f64::INFINITY, f64::min);
    let max = data.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if min == max {
        return Node::Leaf { size };
    }

    let split = rng.gen_range(min..max);
    let (left, right): (Vec<f64>, Vec<f64>) = data.iter().copied().partition(|&v| v < split);

    Node::Split {
        value: split,
        left: Box::new(build_tree(&left, depth + 1, max_depth, rng)),
        right: Box::new(build_tree(&right, depth + 1, max_depth, rng)),
    }
}

/// 1 本の木の中でのパス長
fn path_length(node: &Node, value: f64, depth: f64) -> f64 {
    match node {
        Node::Leaf { size } => depth + average_path_length(*size),
        Node::Split {
            value: split,
            left,
            right,
        } => {
            if value < *split {
                path_length(left, value, depth + 1.0)
            } else {
                path_length(right, value, depth + 1.0)
            }
        }
    }
}

/// サイズ n の BST での平均探索失敗パス長 c(n)
fn average_path_length(n: usize) -> f64 {
    match n {
        0 | 1 => 0.0,
        2 => 1.0,
        _ => {
            let n = n as f64;
            2.0 * ((n - 1.0).ln() + EULER_GAMMA) - 2.0 * (n - 1.0) / n
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_one_label_per_element() {
        let sample = vec![1.0, 2.0, 3.0, 4.0, 5.0];
        let forest = IsolationForest::new(Contamination::Auto);
        let labels = forest.detect(&sample).unwrap();
        assert_eq!(labels.len(), sample.len());
    }

    #[test]
    fn test_detects_extreme_value() {
        let sample = vec![1.0, 2.0, 3.0, 100.0];
        let forest = IsolationForest::new(Contamination::Auto);
        let labels = forest.detect(&sample).unwrap();

        assert!(labels[3].is_outlier());
        assert!(!labels[0].is_outlier());
        assert!(!labels[1].is_outlier());
        assert!(!labels[2].is_outlier());
    }

    #[test]
    fn test_fixed_contamination_flags_floor_half() {
        let sample = vec![1.0, 2.0, 3.0];
        let forest = IsolationForest::new(Contamination::Fixed(0.5));
        let labels = forest.detect(&sample).unwrap();

        let outliers = labels.iter().filter(|l| l.is_outlier()).count();
        assert_eq!(outliers, 1);
        // 中央の値が最も分離しにくい
        assert!(!labels[1].is_outlier());
    }

    #[test]
    fn test_deterministic_with_same_seed() {
        let sample = vec![5.0, 6.0, 7.0, 8.0, 50.0];
        let forest = IsolationForest::new(Contamination::Auto).with_seed(7);
        let first = forest.score_samples(&sample);
        let second = forest.score_samples(&sample);
        assert_eq!(first, second);
    }

    #[test]
    fn test_rejects_empty_sample() {
        let forest = IsolationForest::new(Contamination::Auto);
        assert!(forest.detect(&[]).is_err());
    }

    #[test]
    fn test_rejects_non_finite() {
        let forest = IsolationForest::new(Contamination::Auto);
        let err = forest.detect(&[1.0, f64::NAN, 3.0]).unwrap_err();
        assert!(matches!(err, DetectError::NonFinite));
    }

    #[test]
    fn test_single_point_is_inlier() {
        let forest = IsolationForest::new(Contamination::Auto);
        let labels = forest.detect(&[42.0]).unwrap();
        assert_eq!(labels, vec![Label::Inlier]);
    }

    #[test]
    fn test_scores_bounded() {
        let sample = vec![1.0, 1.1, 0.9, 1.0, 1.2, 10.0];
        let forest = IsolationForest::new(Contamination::Auto);
        for score in forest.score_samples(&sample) {
            assert!((0.0..=1.0).contains(&score), "score {score} out of range");
        }
    }
}
