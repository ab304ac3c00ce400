//! Summary Statistics
//!
//! サンプルの要約統計量

/// 算術平均
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// 中央値
///
/// 偶数長のサンプルでは中央 2 要素の平均を返す。
pub fn median(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }

    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));

    let n = sorted.len();
    if n % 2 == 1 {
        sorted[n / 2]
    } else {
        (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0
    }
}

/// 小数第 2 位への丸め
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
