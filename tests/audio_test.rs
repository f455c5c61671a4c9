use std::fs;
use tempfile::TempDir;
use WhisperTranscribeServer::{audio::AudioProcessor, config::Config};

#[cfg(test)]
mod audio_tests {
    use super::*;

    /// テスト用のWAVファイルデータを生成（44バイトヘッダー + 16-bit PCM）
    fn create_test_wav_data(sample_rate: u32, duration_seconds: f32) -> Vec<u8> {
        let samples_per_channel = (sample_rate as f32 * duration_seconds) as usize;
        let data_size = samples_per_channel * 2; // 16-bit = 2 bytes per sample
        let file_size = 36 + data_size;

        let mut wav_data = Vec::new();

        // WAVヘッダー
        wav_data.extend_from_slice(b"RIFF");
        wav_data.extend_from_slice(&(file_size as u32).to_le_bytes());
        wav_data.extend_from_slice(b"WAVE");
        wav_data.extend_from_slice(b"fmt ");
        wav_data.extend_from_slice(&16u32.to_le_bytes()); // fmt chunk size
        wav_data.extend_from_slice(&1u16.to_le_bytes());  // PCM format
        wav_data.extend_from_slice(&1u16.to_le_bytes());  // mono
        wav_data.extend_from_slice(&sample_rate.to_le_bytes());
        wav_data.extend_from_slice(&(sample_rate * 2).to_le_bytes()); // byte rate
        wav_data.extend_from_slice(&2u16.to_le_bytes());  // block align
        wav_data.extend_from_slice(&16u16.to_le_bytes()); // bits per sample
        wav_data.extend_from_slice(b"data");
        wav_data.extend_from_slice(&(data_size as u32).to_le_bytes());

        // サイン波データ（440Hz A4音）
        for i in 0..samples_per_channel {
            let t = i as f32 / sample_rate as f32;
            let sample = (2.0 * std::f32::consts::PI * 440.0 * t).sin() * 16383.0;
            wav_data.extend_from_slice(&(sample as i16).to_le_bytes());
        }

        wav_data
    }

    /// テスト用設定を作成
    fn create_test_config(temp_dir: &TempDir) -> Config {
        let mut config = Config::default();
        config.paths.temp_dir = temp_dir.path().to_string_lossy().to_string();
        config.audio.sample_rate = 16000;
        config
    }

    /// AudioProcessorの初期化テスト
    #[test]
    fn test_audio_processor_new() {
        let temp_dir = TempDir::new().unwrap();
        let config = create_test_config(&temp_dir);

        let result = AudioProcessor::new(&config);
        assert!(result.is_ok());
    }

    /// 一時ディレクトリが存在しない場合も作成されること
    #[test]
    fn test_audio_processor_creates_temp_dir() {
        let temp_dir = TempDir::new().unwrap();
        let mut config = Config::default();
        config.paths.temp_dir = temp_dir
            .path()
            .join("nested")
            .to_string_lossy()
            .to_string();

        AudioProcessor::new(&config).unwrap();
        assert!(std::path::Path::new(&config.paths.temp_dir).exists());
    }

    /// 16kHz WAVのデコードテスト
    #[test]
    fn test_decode_bytes_16khz_wav() {
        let temp_dir = TempDir::new().unwrap();
        let config = create_test_config(&temp_dir);
        let processor = AudioProcessor::new(&config).unwrap();

        let wav_data = create_test_wav_data(16000, 0.5);
        let decoded = processor.decode_bytes(&wav_data).unwrap();

        assert_eq!(decoded.sample_rate, 16000);
        // 0.5秒 @ 16kHz ≒ 8000サンプル
        assert!((decoded.samples.len() as i64 - 8000).abs() < 100);
        assert!((decoded.duration_ms as i64 - 500).abs() < 20);

        // 振幅がf32の範囲に正しくマップされていること
        let max_abs = decoded
            .samples
            .iter()
            .map(|s| s.abs())
            .fold(0.0f32, f32::max);
        assert!(max_abs > 0.1 && max_abs <= 1.0);
    }

    /// 44.1kHz WAVがターゲットレートへリサンプリングされること
    #[test]
    fn test_decode_bytes_resamples_44khz_wav() {
        let temp_dir = TempDir::new().unwrap();
        let config = create_test_config(&temp_dir);
        let processor = AudioProcessor::new(&config).unwrap();

        let wav_data = create_test_wav_data(44100, 1.0);
        let decoded = processor.decode_bytes(&wav_data).unwrap();

        assert_eq!(decoded.sample_rate, 16000);
        // 1秒の音声なので約16000サンプルになるはず（リサンプラの遅延分の誤差は許容）
        assert!((decoded.samples.len() as i64 - 16000).abs() < 1600);
        assert!((decoded.duration_ms as i64 - 1000).abs() < 100);
    }

    /// 空のバイト列はエラーになること
    #[test]
    fn test_decode_bytes_empty() {
        let temp_dir = TempDir::new().unwrap();
        let config = create_test_config(&temp_dir);
        let processor = AudioProcessor::new(&config).unwrap();

        let result = processor.decode_bytes(&[]);
        assert!(result.is_err());
    }

    /// 音声でないバイト列はエラーになること（クラッシュしない）
    #[test]
    fn test_decode_bytes_garbage() {
        let temp_dir = TempDir::new().unwrap();
        let config = create_test_config(&temp_dir);
        let processor = AudioProcessor::new(&config).unwrap();

        let result = processor.decode_bytes(b"this is definitely not audio data");
        assert!(result.is_err());
    }

    /// 一時ファイルが成功時に削除されること
    #[test]
    fn test_temp_file_removed_on_success() {
        let temp_dir = TempDir::new().unwrap();
        let config = create_test_config(&temp_dir);
        let processor = AudioProcessor::new(&config).unwrap();

        let wav_data = create_test_wav_data(16000, 0.2);
        processor.decode_bytes(&wav_data).unwrap();

        let remaining = fs::read_dir(temp_dir.path()).unwrap().count();
        assert_eq!(remaining, 0);
    }

    /// 一時ファイルが失敗時にも削除されること
    #[test]
    fn test_temp_file_removed_on_failure() {
        let temp_dir = TempDir::new().unwrap();
        let config = create_test_config(&temp_dir);
        let processor = AudioProcessor::new(&config).unwrap();

        let result = processor.decode_bytes(b"broken audio bytes");
        assert!(result.is_err());

        let remaining = fs::read_dir(temp_dir.path()).unwrap().count();
        assert_eq!(remaining, 0);
    }

    /// 存在しないファイルのデコードはエラーになること
    #[test]
    fn test_decode_file_missing() {
        let temp_dir = TempDir::new().unwrap();
        let config = create_test_config(&temp_dir);
        let processor = AudioProcessor::new(&config).unwrap();

        let result = processor.decode_file(temp_dir.path().join("missing.wav"));
        assert!(result.is_err());
    }
}
