//! Batch Processing
//!
//! dataSet 内の各作業単位を独立に処理する。1 件の失敗は件単位の
//! エラーとして折り込み、残りの件の処理を続ける。

use super::types::{BatchItem, BatchItemResult};
use crate::analytics::{CheckOutcome, ScoringPipeline};
use crate::error::{Error, Result};

/// バッチ予測: 入力順のまま件ごとの結果を返す
pub fn process_predict_batch(
    pipeline: &ScoringPipeline,
    items: &[BatchItem],
) -> Vec<BatchItemResult> {
    items
        .iter()
        .map(|item| process_predict_item(pipeline, item))
        .collect()
}

/// バッチチェック: 入力順のまま件ごとの結果を返す
pub fn process_check_batch(
    pipeline: &ScoringPipeline,
    items: &[BatchItem],
) -> Vec<BatchItemResult> {
    items
        .iter()
        .map(|item| process_check_item(pipeline, item))
        .collect()
}

/// 1 件の予測を処理
pub fn process_predict_item(pipeline: &ScoringPipeline, item: &BatchItem) -> BatchItemResult {
    let dp_code = item.dp_code.clone().unwrap_or_default();
    match predict_item(pipeline, item) {
        Ok(anomaly_data) => BatchItemResult::Predict {
            dp_code,
            anomaly_data,
        },
        Err(err) => BatchItemResult::Error {
            dp_code,
            error: err.response_message(),
        },
    }
}

/// 1 件の候補値チェックを処理
pub fn process_check_item(pipeline: &ScoringPipeline, item: &BatchItem) -> BatchItemResult {
    let dp_code = item.dp_code.clone().unwrap_or_default();
    match check_item(pipeline, item) {
        Ok(outcome) => BatchItemResult::Check {
            dp_code,
            is_anomaly: outcome.is_anomaly,
            mean: outcome.mean,
            median: outcome.median,
        },
        Err(err) => BatchItemResult::Error {
            dp_code,
            error: err.response_message(),
        },
    }
}

fn predict_item(pipeline: &ScoringPipeline, item: &BatchItem) -> Result<Vec<String>> {
    let (Some(data), Some(_current)) = (&item.data, &item.current_value) else {
        return Err(Error::ItemFieldsMissing);
    };
    pipeline.predict(data)
}

fn check_item(pipeline: &ScoringPipeline, item: &BatchItem) -> Result<CheckOutcome> {
    let (Some(data), Some(current)) = (&item.data, &item.current_value) else {
        return Err(Error::ItemFieldsMissing);
    };
    let candidate = current.as_f64()?;
    pipeline.check_with_stats(data, candidate)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::{DetectorFactory, Strategy};
    use crate::api::types::NumericValue;

    fn pipeline() -> ScoringPipeline {
        ScoringPipeline::new(DetectorFactory::new(Strategy::IsolationForest), 0.5)
    }

    fn item(data: &[&str], current: Option<f64>, dp_code: Option<&str>) -> BatchItem {
        BatchItem {
            data: Some(data.iter().map(|s| s.to_string()).collect()),
            current_value: current.map(NumericValue::Number),
            dp_code: dp_code.map(|s| s.to_string()),
        }
    }

    #[test]
    fn test_check_batch_preserves_order_and_dp_codes() {
        let items = vec![
            item(&["1", "2", "3"], Some(2.0), Some("A")),
            item(&["1", "2", "3", "100"], Some(100.0), Some("B")),
        ];
        let results = process_check_batch(&pipeline(), &items);

        assert_eq!(results.len(), 2);
        match &results[0] {
            BatchItemResult::Check {
                dp_code,
                is_anomaly,
                ..
            } => {
                assert_eq!(dp_code.as_str(), "A");
                assert!(!*is_anomaly);
            }
            other => panic!("unexpected result: {other:?}"),
        }
        match &results[1] {
            BatchItemResult::Check {
                dp_code,
                is_anomaly,
                ..
            } => {
                assert_eq!(dp_code.as_str(), "B");
                assert!(*is_anomaly);
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_malformed_item_does_not_abort_batch() {
        let broken = BatchItem {
            data: None,
            current_value: Some(NumericValue::Number(1.0)),
            dp_code: Some("BAD".to_string()),
        };
        let items = vec![
            item(&["1", "2", "3"], Some(2.0), Some("OK")),
            broken,
            item(&["1", "2", "3"], Some(3.0), None),
        ];
        let results = process_check_batch(&pipeline(), &items);

        assert_eq!(results.len(), 3);
        assert!(matches!(results[0], BatchItemResult::Check { .. }));
        match &results[1] {
            BatchItemResult::Error { dp_code, error } => {
                assert_eq!(dp_code.as_str(), "BAD");
                assert_eq!(
                    error.as_str(),
                    "Invalid data item. Missing data or currentValue field."
                );
            }
            other => panic!("unexpected result: {other:?}"),
        }
        assert!(matches!(results[2], BatchItemResult::Check { .. }));
    }

    #[test]
    fn test_missing_dp_code_defaults_to_empty() {
        let items = vec![item(&["1", "2", "3"], Some(2.0), None)];
        let results = process_check_batch(&pipeline(), &items);
        match &results[0] {
            BatchItemResult::Check { dp_code, .. } => assert_eq!(dp_code.as_str(), ""),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_candidate_not_present_is_item_error() {
        let items = vec![item(&["1", "2", "3"], Some(9.0), Some("A"))];
        let results = process_check_batch(&pipeline(), &items);
        match &results[0] {
            BatchItemResult::Error { dp_code, error } => {
                assert_eq!(dp_code.as_str(), "A");
                assert_eq!(error.as_str(), "Value 9 is not present in the given data.");
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_parse_failure_gets_generic_prefix() {
        let broken = BatchItem {
            data: Some(vec!["1".to_string(), "x".to_string(), "3".to_string()]),
            current_value: Some(NumericValue::Number(1.0)),
            dp_code: None,
        };
        let results = process_check_batch(&pipeline(), &[broken]);
        match &results[0] {
            BatchItemResult::Error { error, .. } => {
                assert!(error.starts_with("An error occurred. "));
                assert!(error.contains("x"));
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_predict_batch_requires_both_fields() {
        let missing_current = BatchItem {
            data: Some(vec!["1".to_string(), "2".to_string(), "3".to_string()]),
            current_value: None,
            dp_code: None,
        };
        let results = process_predict_batch(&pipeline(), &[missing_current]);
        assert!(matches!(results[0], BatchItemResult::Error { .. }));
    }

    #[test]
    fn test_predict_batch_flags_extreme_value() {
        let items = vec![item(&["1", "2", "3", "100"], Some(1.0), Some("P"))];
        let results = process_predict_batch(&pipeline(), &items);
        match &results[0] {
            BatchItemResult::Predict {
                dp_code,
                anomaly_data,
            } => {
                assert_eq!(dp_code.as_str(), "P");
                assert!(anomaly_data.contains(&"100".to_string()));
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }
}
