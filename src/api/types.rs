//! Request / Response Types
//!
//! JSON エンドポイントの入出力型定義

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// 数値または数値文字列を受け付けるフィールド
///
/// 元のペイロードは `currentValue` を 2 または "2" のどちらでも送ってくる。
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum NumericValue {
    Number(f64),
    Text(String),
}

impl NumericValue {
    /// f64 へ変換。文字列は前後のクォートと空白を除いてパースする
    pub fn as_f64(&self) -> Result<f64> {
        match self {
            NumericValue::Number(value) => Ok(*value),
            NumericValue::Text(text) => {
                let stripped = text.trim_matches('"').trim();
                stripped
                    .parse::<f64>()
                    .map_err(|_| Error::InvalidNumber(stripped.to_string()))
            }
        }
    }
}

/// 予測リクエスト
#[derive(Debug, Deserialize)]
pub struct PredictRequest {
    pub data: Option<Vec<String>>,
}

/// 予測レスポンス
#[derive(Debug, Serialize)]
pub struct PredictResponse {
    #[serde(rename = "anomalyData")]
    pub anomaly_data: Vec<String>,
}

/// 候補値チェックリクエスト
#[derive(Debug, Deserialize)]
pub struct CheckRequest {
    pub data: Option<Vec<String>>,
    #[serde(rename = "currentValue")]
    pub current_value: Option<NumericValue>,
}

/// 候補値チェックレスポンス
#[derive(Debug, Serialize)]
pub struct CheckResponse {
    #[serde(rename = "isAnomaly")]
    pub is_anomaly: bool,
}

/// バッチリクエスト
#[derive(Debug, Deserialize)]
pub struct BatchRequest {
    #[serde(rename = "dataSet")]
    pub data_set: Option<Vec<BatchItem>>,
}

/// バッチ内の 1 作業単位
#[derive(Debug, Clone, Deserialize)]
pub struct BatchItem {
    pub data: Option<Vec<String>>,
    #[serde(rename = "currentValue")]
    pub current_value: Option<NumericValue>,
    /// そのまま応答へ返される不透明なラベル
    #[serde(rename = "dpCode")]
    pub dp_code: Option<String>,
}

/// バッチ内 1 件分の結果
///
/// 1 件の失敗は兄弟要素に影響しない。エラーは件単位で折り込まれ、
/// エンベロープは常に成功で返る。
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum BatchItemResult {
    /// 予測結果
    Predict {
        #[serde(rename = "dpCode")]
        dp_code: String,
        #[serde(rename = "anomalyData")]
        anomaly_data: Vec<String>,
    },
    /// チェック結果（要約統計量付き）
    Check {
        #[serde(rename = "dpCode")]
        dp_code: String,
        #[serde(rename = "isAnomaly")]
        is_anomaly: bool,
        mean: f64,
        median: f64,
    },
    /// 件単位のエラー
    Error {
        #[serde(rename = "dpCode")]
        dp_code: String,
        error: String,
    },
}

/// エラーレスポンス
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}
