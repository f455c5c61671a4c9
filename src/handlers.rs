use crate::audio::AudioProcessor;
use crate::config::Config;
use crate::models::{ErrorResponse, HealthResponse, TranscribeResponse};
use crate::whisper::WhisperEngine;
use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::Json,
};
use std::sync::{Arc, Mutex};
use std::time::Instant;

// =============================================================================
// Application State
// - ハンドラ間で共有する情報（設定、Whisperエンジン）
// - エンジンのロードに失敗した場合は main が起動を中止するため、
//   稼働中のサーバーでは常に Some になっている
// =============================================================================

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub engine: Arc<Mutex<Option<WhisperEngine>>>,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        Self {
            config: Arc::new(config),
            engine: Arc::new(Mutex::new(None)),
        }
    }

    pub fn with_engine(self, engine: WhisperEngine) -> Self {
        *self.engine.lock().unwrap() = Some(engine);
        self
    }
}

// =============================================================================
// Error Handling
// - リクエスト処理中のあらゆる失敗は 500 + {"error": ...} で返す
// =============================================================================

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug)]
pub struct ApiError {
    pub message: String,
}

impl ApiError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        ApiError::new(err.to_string())
    }
}

impl axum::response::IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let response = ErrorResponse {
            error: self.message,
        };

        (StatusCode::INTERNAL_SERVER_ERROR, Json(response)).into_response()
    }
}

// =============================================================================
// Request Handlers
// =============================================================================

/// ヘルスチェックエンドポイント
/// - モデルのロードはサーバー起動前に完了しているため常に ready を返す
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse::ready())
}

/// 文字起こしエンドポイント
/// - リクエストボディは音声ファイルのバイト列そのもの
/// - バイト列 → 一時ファイル → デコード → Whisper推論 → JSON
pub async fn transcribe(
    State(state): State<AppState>,
    body: Bytes,
) -> ApiResult<Json<TranscribeResponse>> {
    let start_time = Instant::now();

    if body.is_empty() {
        return Err(ApiError::new("音声データが空です"));
    }

    let max_size = state.config.max_body_size_bytes();
    if body.len() > max_size {
        return Err(ApiError::new(format!(
            "リクエストボディが制限を超えています: {} > {} bytes",
            body.len(),
            max_size
        )));
    }

    // デコードとWhisper推論はCPU集約的なのでブロッキングスレッドで実行
    let config = Arc::clone(&state.config);
    let engine = Arc::clone(&state.engine);

    let text = tokio::task::spawn_blocking(move || -> anyhow::Result<String> {
        let processor = AudioProcessor::new(&config)?;

        // 一時ファイルは decode_bytes の中で作成され、成功・失敗を問わず削除される
        let decoded = processor.decode_bytes(&body)?;

        let engine_guard = engine.lock().unwrap();
        let engine = engine_guard
            .as_ref()
            .ok_or_else(|| anyhow::anyhow!("Whisperエンジンが初期化されていません"))?;

        let text = engine.transcribe(&decoded.samples)?;

        log::info!(
            "文字起こし完了: 音声 {}ms, 処理 {}ms",
            decoded.duration_ms,
            start_time.elapsed().as_millis()
        );

        Ok(text)
    })
    .await
    .map_err(|e| ApiError::new(format!("処理スレッドエラー: {}", e)))??;

    Ok(Json(TranscribeResponse { text }))
}

/// 未定義パス用のフォールバックハンドラ
pub async fn not_found() -> (StatusCode, Json<ErrorResponse>) {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorResponse {
            error: "not found".to_string(),
        }),
    )
}
