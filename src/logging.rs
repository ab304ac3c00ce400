use anyhow::Result;
use std::fs;
use std::path::PathBuf;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::{non_blocking, rolling};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// ログ設定
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// ログレベル (trace, debug, info, warn, error)
    pub level: String,
    /// コンソール出力有効
    pub console_enabled: bool,
    /// ファイル出力有効
    pub file_enabled: bool,
    /// ログディレクトリ
    pub log_dir: PathBuf,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            console_enabled: true,
            file_enabled: false,
            log_dir: PathBuf::from("logs"),
        }
    }
}

impl LogConfig {
    /// 指定レベルのコンソールのみの設定
    pub fn with_level(level: &str) -> Self {
        Self {
            level: level.to_string(),
            ..Self::default()
        }
    }
}

/// ロギングを初期化
///
/// `RUST_LOG` があれば優先し、なければ設定のレベルを使う。ファイル出力が
/// 有効な場合は日次ローテーションの non-blocking ライターを使い、その
/// ガードを返す。ガードは main の生存期間中保持すること。
pub fn init(config: &LogConfig) -> Result<Option<WorkerGuard>> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    let console_layer = config
        .console_enabled
        .then(|| fmt::layer().with_target(true));

    if config.file_enabled {
        fs::create_dir_all(&config.log_dir)?;
        let file_appender = rolling::daily(&config.log_dir, "anomaly-rs.log");
        let (writer, guard) = non_blocking(file_appender);
        let file_layer = fmt::layer().with_ansi(false).with_writer(writer);

        tracing_subscriber::registry()
            .with(filter)
            .with(console_layer)
            .with(file_layer)
            .try_init()
            .ok();
        Ok(Some(guard))
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(console_layer)
            .try_init()
            .ok();
        Ok(None)
    }
}
