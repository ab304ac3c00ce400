//! Outlier Scoring Pipeline
//!
//! 検証・パース・検知・整形を 1 リクエスト分つなぐパイプライン。
//! エントリポイント（HTTP / クラウド関数）からは同じ操作が呼ばれる。

use super::detector::{Contamination, DetectorFactory};
use super::sample::{Sample, MIN_PREDICT_SAMPLE};
use super::stats;
use crate::error::{Error, Result};

/// 候補値チェックの結果
#[derive(Debug, Clone, PartialEq)]
pub struct CheckOutcome {
    /// 候補値が外れ値としてラベル付けされたか
    pub is_anomaly: bool,
    /// サンプルの算術平均（小数第 2 位丸め）
    pub mean: f64,
    /// サンプルの中央値
    pub median: f64,
}

/// 外れ値スコアリングパイプライン
///
/// 検知戦略はデプロイ時に固定。リクエスト間で共有される状態はなく、
/// モデルは操作ごとに毎回フィットされる。
#[derive(Debug, Clone)]
pub struct ScoringPipeline {
    factory: DetectorFactory,
    fixed_contamination: f64,
}

impl ScoringPipeline {
    /// 設定済みファクトリからパイプラインを作成
    pub fn new(factory: DetectorFactory, fixed_contamination: f64) -> Self {
        Self {
            factory,
            fixed_contamination,
        }
    }

    /// サンプル中の外れ値を列挙する
    ///
    /// 最低 3 値を要求し、自動汚染率で検知する。外れ値は入力順のまま
    /// 文字列化して返す。
    pub fn predict(&self, tokens: &[String]) -> Result<Vec<String>> {
        let sample = Sample::parse(tokens, MIN_PREDICT_SAMPLE)?;
        let detector = self.factory.detector(Contamination::Auto);
        let labels = detector.detect(sample.values())?;

        Ok(sample
            .values()
            .iter()
            .zip(&labels)
            .filter(|(_, label)| label.is_outlier())
            .map(|(&value, _)| format_value(value))
            .collect())
    }

    /// 候補値が外れ値かどうかを返す（自動汚染率）
    ///
    /// 候補値はサンプルの完全一致メンバーでなければならない。不在なら
    /// モデルをフィットせずに検証エラーを返す。
    pub fn check(&self, tokens: &[String], candidate: f64) -> Result<bool> {
        let sample = Sample::parse(tokens, 0)?;
        if !sample.contains(candidate) {
            return Err(Error::ValueNotPresent(candidate));
        }

        let detector = self.factory.detector(Contamination::Auto);
        let labels = detector.detect(sample.values())?;
        Ok(is_candidate_outlier(sample.values(), &labels, candidate))
    }

    /// 候補値チェックに要約統計量を添えて返す（固定汚染率）
    ///
    /// バッチ・クラウド関数の変種が使う。平均・中央値はラベル付けとは
    /// 独立にパース済みサンプルから計算される。
    pub fn check_with_stats(&self, tokens: &[String], candidate: f64) -> Result<CheckOutcome> {
        let sample = Sample::parse(tokens, 0)?;
        if !sample.contains(candidate) {
            return Err(Error::ValueNotPresent(candidate));
        }

        let detector = self
            .factory
            .detector(Contamination::Fixed(self.fixed_contamination));
        let labels = detector.detect(sample.values())?;

        Ok(CheckOutcome {
            is_anomaly: is_candidate_outlier(sample.values(), &labels, candidate),
            mean: stats::round2(stats::mean(sample.values())),
            median: stats::median(sample.values()),
        })
    }
}

/// 候補値と同値の要素が 1 つでも外れ値なら真
///
/// 値の同値で判定するため、重複値はラベルを共有する。
fn is_candidate_outlier(
    values: &[f64],
    labels: &[super::detector::Label],
    candidate: f64,
) -> bool {
    values
        .iter()
        .zip(labels)
        .any(|(&value, label)| label.is_outlier() && value == candidate)
}

/// 外れ値 1 件の応答用整形
///
/// f64 の Display は最短の 10 進表現を使うため、整数値は小数点なし
/// （100.0 → "100"）、非整数値はそのまま（2.5 → "2.5"）になる。
pub fn format_value(value: f64) -> String {
    value.to_string()
}
