use serde::{Deserialize, Serialize};

// =============================================================================
// API Request/Response Models
// - レスポンス形式は固定: /health は {"status": ...}、/transcribe は {"text": ...}
// - エラーは常に {"error": ...}
// =============================================================================

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
}

impl HealthResponse {
    pub fn ready() -> Self {
        Self {
            status: "ready".to_string(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TranscribeResponse {
    pub text: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}
