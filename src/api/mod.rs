//! API Module
//!
//! JSON エンドポイントの入出力型とバッチ処理

pub mod batch;
pub mod types;

pub use batch::{process_check_batch, process_check_item, process_predict_batch};
pub use types::{
    BatchItem, BatchItemResult, BatchRequest, CheckRequest, CheckResponse, ErrorResponse,
    NumericValue, PredictRequest, PredictResponse,
};
