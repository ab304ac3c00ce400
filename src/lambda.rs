//! Cloud Function Entry Point
//!
//! イベントオブジェクトを受け取り {statusCode, body} エンベロープを返す
//! ハンドラ。バッチチェックと同じ契約を持つ。

use serde::Serialize;
use serde_json::{json, Value};
use tracing::info;

use crate::analytics::ScoringPipeline;
use crate::api::{self, BatchItem};
use crate::error::Error;

/// クラウド関数のレスポンスエンベロープ
#[derive(Debug, Serialize)]
pub struct LambdaResponse {
    #[serde(rename = "statusCode")]
    pub status_code: u16,
    pub body: Value,
}

/// バッチチェックイベントを処理
///
/// `dataSet` が無い・リストでないイベントは 400。あれば件ごとの結果リストを
/// 200 で返す。件単位の失敗はリスト内のエラーオブジェクトに折り込まれる。
pub fn handle_event(pipeline: &ScoringPipeline, event: &Value) -> LambdaResponse {
    let Some(data_set) = event.get("dataSet") else {
        return missing_data_set();
    };

    let items: Vec<BatchItem> = match serde_json::from_value(data_set.clone()) {
        Ok(items) => items,
        Err(_) => return missing_data_set(),
    };

    info!("Processing cloud function event: {} items", items.len());

    let results = api::process_check_batch(pipeline, &items);
    match serde_json::to_value(&results) {
        Ok(body) => LambdaResponse {
            status_code: 200,
            body,
        },
        Err(err) => LambdaResponse {
            status_code: 500,
            body: json!({ "error": Error::from(err).response_message() }),
        },
    }
}

fn missing_data_set() -> LambdaResponse {
    LambdaResponse {
        status_code: 400,
        body: json!({ "error": Error::MissingField("dataSet").response_message() }),
    }
}
