use serde::{Deserialize, Serialize};

use crate::analytics::{DetectorFactory, ScoringPipeline, Strategy};
use crate::error::{Error, Result};

/// チェック変種が使う固定汚染率のデフォルト
const DEFAULT_CONTAMINATION: f64 = 0.5;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AnomalyConfig {
    pub server: ServerConfig,
    pub detector: DetectorConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    pub bind_addr: Option<String>,
    pub log_level: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DetectorConfig {
    /// 検知戦略（デプロイ時固定）
    pub strategy: Strategy,
    /// チェック変種の固定汚染率
    pub contamination: Option<f64>,
}

impl Default for AnomalyConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                bind_addr: Some("127.0.0.1:8080".to_string()),
                log_level: Some("info".to_string()),
            },
            detector: DetectorConfig::default(),
        }
    }
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            strategy: Strategy::IsolationForest,
            contamination: Some(DEFAULT_CONTAMINATION),
        }
    }
}

impl DetectorConfig {
    /// 設定から検知器ファクトリを組み立て
    pub fn factory(&self) -> DetectorFactory {
        DetectorFactory::new(self.strategy)
    }

    /// チェック変種の固定汚染率
    pub fn fixed_contamination(&self) -> f64 {
        self.contamination.unwrap_or(DEFAULT_CONTAMINATION)
    }

    /// 設定からスコアリングパイプラインを組み立て
    pub fn pipeline(&self) -> ScoringPipeline {
        ScoringPipeline::new(self.factory(), self.fixed_contamination())
    }
}

impl AnomalyConfig {
    /// 設定ファイルから読み込み、環境変数で上書き
    pub fn load() -> Result<Self> {
        let mut settings = config::Config::builder();

        // デフォルト値を設定
        let default_config = AnomalyConfig::default();
        settings = settings
            .add_source(config::Config::try_from(&default_config).map_err(config_error)?);

        // 設定ファイルを読み込み（複数の場所を試行）
        let config_paths = [
            "anomaly-config.toml",
            "config.toml",
            "config/anomaly.toml",
        ];

        for path in &config_paths {
            if std::path::Path::new(path).exists() {
                println!("📁 設定ファイルを読み込み: {}", path);
                settings = settings.add_source(config::File::with_name(path));
                break;
            }
        }

        // 環境変数で上書き (ANOMALY_で始まる変数)
        settings = settings.add_source(
            config::Environment::with_prefix("ANOMALY")
                .separator("_")
                .try_parsing(true),
        );

        let mut final_config: AnomalyConfig = settings
            .build()
            .map_err(config_error)?
            .try_deserialize()
            .map_err(config_error)?;

        // サーバー設定の環境変数上書き
        if let Ok(bind_addr) = std::env::var("BIND_ADDR") {
            final_config.server.bind_addr = Some(bind_addr);
        }

        Ok(final_config)
    }

    /// サンプル設定ファイルを生成
    pub fn generate_sample_config() -> Result<()> {
        let sample_config = AnomalyConfig::default();
        let toml_content =
            toml::to_string_pretty(&sample_config).map_err(|e| Error::Config(e.to_string()))?;

        let sample_content = format!(
            r#"# anomaly-rs Configuration File
#
# このファイルは anomaly-config.toml として保存してください
# 環境変数での上書きも可能です (例: BIND_ADDR=0.0.0.0:8080)

{}

# 設定説明:
#
# [server]
# bind_addr = HTTP サーバーのバインドアドレス
# log_level = ログレベル (trace, debug, info, warn, error)
#
# [detector]
# strategy = "isolation-forest" または "local-outlier-factor"
# contamination = チェック変種が使う固定汚染率 (0.0-1.0)
"#,
            toml_content
        );

        std::fs::write("anomaly-config.toml.example", sample_content)?;
        println!("📝 サンプル設定ファイルを生成しました: anomaly-config.toml.example");

        Ok(())
    }
}

fn config_error(err: config::ConfigError) -> Error {
    Error::Config(err.to_string())
}
