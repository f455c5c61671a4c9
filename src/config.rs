use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub whisper: WhisperConfig,
    pub audio: AudioConfig,
    pub paths: PathsConfig,
    pub limits: LimitsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WhisperConfig {
    pub model_path: String,
    pub language: String,
    pub threads: usize,
    pub enable_gpu: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AudioConfig {
    pub sample_rate: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    pub temp_dir: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LimitsConfig {
    pub max_body_size_mb: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            // ローカル専用サーバーのため loopback に固定ポートで待ち受ける
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 7848,
            },
            whisper: WhisperConfig {
                model_path: "models/ggml-base.bin".to_string(),
                language: "en".to_string(),
                threads: 4,
                enable_gpu: false,
            },
            audio: AudioConfig {
                sample_rate: 16000,
            },
            paths: PathsConfig {
                temp_dir: "temp".to_string(),
            },
            limits: LimitsConfig {
                max_body_size_mb: 50,
            },
        }
    }
}

impl Config {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    /// 設定ファイルを読み込む。存在しなければデフォルト設定で作成する
    pub fn load_or_create_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        if path.as_ref().exists() {
            match Self::load_from_file(&path) {
                Ok(config) => Ok(config),
                Err(e) => {
                    eprintln!("設定ファイルの読み込みに失敗しました: {}. デフォルト設定を使用します。", e);
                    let config = Self::default();
                    config.save_to_file(&path)?;
                    Ok(config)
                }
            }
        } else {
            let config = Self::default();
            config.save_to_file(&path)?;
            println!("デフォルト設定ファイルを作成しました: {}", path.as_ref().display());
            Ok(config)
        }
    }

    pub fn validate(&self) -> Result<()> {
        // ポート番号の検証
        if self.server.port == 0 {
            return Err(anyhow::anyhow!("無効なポート番号: {}", self.server.port));
        }

        // Whisperスレッド数の検証
        if self.whisper.threads == 0 {
            return Err(anyhow::anyhow!("Whisperスレッド数は1以上である必要があります"));
        }

        // サンプリングレートの検証（whisper.cpp は 16kHz 前提）
        if self.audio.sample_rate == 0 {
            return Err(anyhow::anyhow!("無効なサンプリングレート: {}", self.audio.sample_rate));
        }

        // ボディサイズ制限の検証
        if self.limits.max_body_size_mb == 0 {
            return Err(anyhow::anyhow!("最大ボディサイズは1MB以上である必要があります"));
        }

        // 一時ディレクトリの存在確認と作成
        if !Path::new(&self.paths.temp_dir).exists() {
            fs::create_dir_all(&self.paths.temp_dir)
                .map_err(|e| anyhow::anyhow!("一時ディレクトリの作成に失敗: {} - {}", self.paths.temp_dir, e))?;
        }

        Ok(())
    }

    pub fn server_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    pub fn max_body_size_bytes(&self) -> usize {
        self.limits.max_body_size_mb * 1024 * 1024
    }
}
