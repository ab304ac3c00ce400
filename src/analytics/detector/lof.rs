//! Local Outlier Factor
//!
//! k 近傍の局所到達可能密度の比による外れ値検知（Breunig et al. 2000）。
//! 周囲より局所密度が低い点ほど因子が 1 を超えて大きくなる。

use super::labels_from_scores;
use super::types::{Contamination, Label};
use super::OutlierDetector;
use crate::error::DetectError;

/// デフォルトの近傍数
pub const DEFAULT_N_NEIGHBORS: usize = 20;
/// 自動汚染率での因子しきい値（LOF > 1.5 を外れ値とする）
const AUTO_FACTOR_THRESHOLD: f64 = 1.5;
/// 重複値による密度の発散を防ぐ下限
const MIN_REACH_SUM: f64 = 1e-10;

/// Local Outlier Factor 検知器
///
/// 近傍数はサンプルサイズに合わせて n-1 まで切り詰める。2 点未満の
/// サンプルにはフィットできない。
#[derive(Debug, Clone)]
pub struct LocalOutlierFactor {
    n_neighbors: usize,
    contamination: Contamination,
}

impl LocalOutlierFactor {
    /// 指定した汚染率の検知器を作成
    pub fn new(contamination: Contamination) -> Self {
        Self {
            n_neighbors: DEFAULT_N_NEIGHBORS,
            contamination,
        }
    }

    /// 近傍数を設定
    pub fn with_n_neighbors(mut self, n_neighbors: usize) -> Self {
        self.n_neighbors = n_neighbors.max(1);
        self
    }

    /// 各要素の局所外れ値因子を計算（1 付近が正常、大きいほど異常）
    pub fn local_outlier_factors(&self, sample: &[f64]) -> Vec<f64> {
        let n = sample.len();
        if n < 2 {
            return vec![1.0; n];
        }
        let k = self.n_neighbors.min(n - 1).max(1);

        // 各点の k 近傍と k 距離
        let mut neighbors: Vec<Vec<usize>> = Vec::with_capacity(n);
        let mut k_distance = vec![0.0; n];
        for i in 0..n {
            let mut dists: Vec<(f64, usize)> = (0..n)
                .filter(|&j| j != i)
                .map(|j| ((sample[i] - sample[j]).abs(), j))
                .collect();
            dists.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));
            dists.truncate(k);
            k_distance[i] = dists.last().map(|&(d, _)| d).unwrap_or(0.0);
            neighbors.push(dists.into_iter().map(|(_, j)| j).collect());
        }

        // 局所到達可能密度
        let mut lrd = vec![0.0; n];
        for i in 0..n {
            let reach_sum: f64 = neighbors[i]
                .iter()
                .map(|&j| k_distance[j].max((sample[i] - sample[j]).abs()))
                .sum();
            lrd[i] = k as f64 / reach_sum.max(MIN_REACH_SUM);
        }

        // 近傍密度との比
        (0..n)
            .map(|i| {
                let neighbor_lrd: f64 =
                    neighbors[i].iter().map(|&j| lrd[j]).sum::<f64>() / k as f64;
                neighbor_lrd / lrd[i]
            })
            .collect()
    }
}

impl OutlierDetector for LocalOutlierFactor {
    fn detect(&self, sample: &[f64]) -> Result<Vec<Label>, DetectError> {
        if sample.len() < 2 {
            return Err(DetectError::InsufficientData {
                required: 2,
                actual: sample.len(),
            });
        }
        if sample.iter().any(|v| !v.is_finite()) {
            return Err(DetectError::NonFinite);
        }

        let factors = self.local_outlier_factors(sample);
        Ok(labels_from_scores(
            &factors,
            self.contamination,
            AUTO_FACTOR_THRESHOLD,
        ))
    }
}
