//! Analytics Module
//!
//! サンプル解析・外れ値スコアリング

pub mod detector;
pub mod pipeline;
pub mod sample;
pub mod stats;

pub use detector::{Contamination, DetectorFactory, Label, OutlierDetector, Strategy};
pub use pipeline::{CheckOutcome, ScoringPipeline};
pub use sample::{Sample, MIN_PREDICT_SAMPLE};
