//! Cloud function harness
//!
//! 標準入力からイベントオブジェクトを 1 つ読み、レスポンスエンベロープを
//! 標準出力へ書く。ホスト型ランタイムの外でハンドラを実行するための器。

use std::io::Read;

use anomaly_rs::config::AnomalyConfig;
use anomaly_rs::lambda;
use anomaly_rs::logging::{self, LogConfig};

fn main() -> anyhow::Result<()> {
    let config = AnomalyConfig::load()?;
    let log_level = config
        .server
        .log_level
        .clone()
        .unwrap_or_else(|| "info".to_string());
    let _guard = logging::init(&LogConfig::with_level(&log_level))?;

    let mut input = String::new();
    std::io::stdin().read_to_string(&mut input)?;
    let event: serde_json::Value = serde_json::from_str(&input)?;

    let pipeline = config.detector.pipeline();
    let response = lambda::handle_event(&pipeline, &event);
    println!("{}", serde_json::to_string(&response)?);

    Ok(())
}
