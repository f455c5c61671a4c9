use crate::config::Config;
use anyhow::Result;
use std::path::Path;
use std::sync::Arc;
use whisper_rs::{FullParams, SamplingStrategy, WhisperContext, WhisperContextParameters};

/// Whisperエンジンのラッパー（スレッドセーフ）
/// - whisper-rs の `WhisperContext` を `Arc` で共有
/// - モデルはプロセス起動時に一度だけロードする
/// - 各推論は独立した `state` を生成して実行する
pub struct WhisperEngine {
    context: Arc<WhisperContext>,
    language: Option<String>,
    threads: i32,
}

impl WhisperEngine {
    /// モデルファイルからWhisperEngineを作成
    /// - モデルファイルの存在確認 → WhisperContext 初期化
    /// - GPU有効時に初期化へ失敗した場合はCPUでフォールバック
    pub fn new(model_path: &str, config: &Config) -> Result<Self> {
        if !Path::new(model_path).exists() {
            return Err(anyhow::anyhow!(
                "Whisperモデルファイルが見つかりません: {}\n\
                 以下のコマンドでモデルをダウンロードしてください:\n\
                 wget https://huggingface.co/ggerganov/whisper.cpp/resolve/main/ggml-base.bin -P models/",
                model_path
            ));
        }

        let mut ctx_params = WhisperContextParameters::default();
        ctx_params.use_gpu = config.whisper.enable_gpu;

        let context = match WhisperContext::new_with_params(model_path, ctx_params) {
            Ok(ctx) => ctx,
            Err(e) => {
                if config.whisper.enable_gpu {
                    eprintln!("GPU初期化に失敗しました。CPUで再試行します: {}", e);
                    let mut cpu_params = WhisperContextParameters::default();
                    cpu_params.use_gpu = false;
                    WhisperContext::new_with_params(model_path, cpu_params)
                        .map_err(|e| anyhow::anyhow!("Whisperコンテキストの初期化に失敗: {}", e))?
                } else {
                    return Err(anyhow::anyhow!(
                        "Whisperコンテキストの初期化に失敗: {}",
                        e
                    ));
                }
            }
        };

        // "auto" または空文字の場合は言語を指定しない（whisper側で自動検出）
        let language = match config.whisper.language.trim() {
            "" => None,
            lang if lang.eq_ignore_ascii_case("auto") => None,
            lang => Some(lang.to_string()),
        };

        println!(
            "Whisperモデルを読み込みました: {} (GPU: {})",
            model_path,
            if config.whisper.enable_gpu { "enabled" } else { "disabled" }
        );

        Ok(Self {
            context: Arc::new(context),
            language,
            threads: config.whisper.threads as i32,
        })
    }

    /// 文字起こしを実行してテキストを返す
    /// - 入力は16kHzモノラルのf32サンプル列
    /// - 認識結果が無い場合は空文字を返す
    pub fn transcribe(&self, audio_data: &[f32]) -> Result<String> {
        if audio_data.is_empty() {
            return Err(anyhow::anyhow!("音声データが空です"));
        }

        // 各リクエストごとに新しい状態を作成する
        let mut state = self
            .context
            .create_state()
            .map_err(|e| anyhow::anyhow!("Whisper状態の作成に失敗: {}", e))?;

        let params = self.make_params();

        state
            .full(params, audio_data)
            .map_err(|e| anyhow::anyhow!("文字起こしに失敗: {}", e))?;

        let segment_count = state
            .full_n_segments()
            .map_err(|e| anyhow::anyhow!("セグメント数の取得に失敗: {}", e))?;

        let mut text_parts = Vec::new();

        for i in 0..segment_count {
            let segment_text = state
                .full_get_segment_text(i)
                .map_err(|e| anyhow::anyhow!("セグメント{}のテキスト取得に失敗: {}", i, e))?;
            text_parts.push(segment_text.trim().to_string());
        }

        Ok(text_parts.join(" ").trim().to_string())
    }

    /// Whisperパラメータを作成
    /// - Greedy デコード（best_of=1）
    /// - 進捗ログ等はサーバーコンソールを汚さないよう無効化
    fn make_params(&self) -> FullParams<'_, 'static> {
        let mut params = FullParams::new(SamplingStrategy::Greedy { best_of: 1 });

        if let Some(language) = self.language.as_deref() {
            params.set_language(Some(language));
        }

        params.set_n_threads(self.threads);
        params.set_print_progress(false);
        params.set_print_realtime(false);
        params.set_print_timestamps(false);
        params.set_translate(false);

        params
    }
}

impl Clone for WhisperEngine {
    fn clone(&self) -> Self {
        Self {
            context: Arc::clone(&self.context),
            language: self.language.clone(),
            threads: self.threads,
        }
    }
}
