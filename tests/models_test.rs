use serde_json::{json, Value};
use WhisperTranscribeServer::models::*;

#[cfg(test)]
mod models_tests {
    use super::*;

    /// /health レスポンスのJSON形式テスト
    #[test]
    fn test_health_response_json_shape() {
        let response = HealthResponse::ready();
        let value = serde_json::to_value(&response).unwrap();

        // フィールドは status のみで値は "ready" 固定
        assert_eq!(value, json!({"status": "ready"}));
    }

    /// /transcribe レスポンスのJSON形式テスト
    #[test]
    fn test_transcribe_response_json_shape() {
        let response = TranscribeResponse {
            text: "こんにちは".to_string(),
        };
        let value = serde_json::to_value(&response).unwrap();

        assert_eq!(value, json!({"text": "こんにちは"}));
    }

    /// 空の文字起こし結果も有効なレスポンスになること
    #[test]
    fn test_transcribe_response_empty_text() {
        let response = TranscribeResponse {
            text: String::new(),
        };
        let value = serde_json::to_value(&response).unwrap();

        assert_eq!(value, json!({"text": ""}));
    }

    /// エラーレスポンスのJSON形式テスト
    #[test]
    fn test_error_response_json_shape() {
        let response = ErrorResponse {
            error: "not found".to_string(),
        };
        let value = serde_json::to_value(&response).unwrap();

        assert_eq!(value, json!({"error": "not found"}));
    }

    /// デシリアライズのテスト（クライアント側の利用を想定）
    #[test]
    fn test_response_deserialization() {
        let health: HealthResponse = serde_json::from_str(r#"{"status":"ready"}"#).unwrap();
        assert_eq!(health.status, "ready");

        let transcribe: TranscribeResponse =
            serde_json::from_str(r#"{"text":"hello world"}"#).unwrap();
        assert_eq!(transcribe.text, "hello world");

        let error: ErrorResponse = serde_json::from_str(r#"{"error":"boom"}"#).unwrap();
        assert_eq!(error.error, "boom");

        // 余計なフィールドが混ざらないこと
        let value: Value = serde_json::to_value(&transcribe).unwrap();
        assert_eq!(value.as_object().unwrap().len(), 1);
    }
}
