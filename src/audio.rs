use crate::config::Config;
use anyhow::Result;
use rubato::{
    Resampler, SincFixedIn, SincInterpolationParameters, SincInterpolationType, WindowFunction,
};
use std::fs::File;
use std::io::Write;
use std::path::Path;
use symphonia::core::audio::{AudioBufferRef, Signal};
use symphonia::core::codecs::{DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use tempfile::NamedTempFile;

/// デコード済みの音声データ（モノラル、ターゲットサンプリングレート）
#[derive(Debug)]
pub struct DecodedAudio {
    pub samples: Vec<f32>,
    pub sample_rate: u32,
    pub duration_ms: u64,
}

/// リクエストボディの音声バイト列をWhisper用のf32サンプル列へ変換する
/// - バイト列 → 一時ファイル → デコード → モノラル化 → リサンプリング
/// - 一時ファイルはリクエスト処理の終了時に必ず削除される（Drop）
pub struct AudioProcessor {
    config: Config,
}

impl AudioProcessor {
    pub fn new(config: &Config) -> Result<Self> {
        // 一時ディレクトリがなければ作成しておく
        if !Path::new(&config.paths.temp_dir).exists() {
            std::fs::create_dir_all(&config.paths.temp_dir)?;
        }

        Ok(Self {
            config: config.clone(),
        })
    }

    /// リクエストボディのバイト列を一時ファイル経由でデコード
    pub fn decode_bytes(&self, audio_bytes: &[u8]) -> Result<DecodedAudio> {
        if audio_bytes.is_empty() {
            return Err(anyhow::anyhow!("音声データが空です"));
        }

        let mut temp_file =
            NamedTempFile::with_suffix_in(".wav", &self.config.paths.temp_dir)?;
        temp_file.write_all(audio_bytes)?;
        temp_file.flush()?;

        // temp_file はこの関数を抜けるときに drop され、ファイルも削除される
        self.decode_file(temp_file.path())
    }

    /// 音声ファイルをデコードしてターゲットレートのモノラルf32サンプルを返す
    pub fn decode_file<P: AsRef<Path>>(&self, file_path: P) -> Result<DecodedAudio> {
        let path = file_path.as_ref();
        if !path.exists() {
            return Err(anyhow::anyhow!(
                "音声ファイルが見つかりません: {}",
                path.display()
            ));
        }

        let file = File::open(path)?;
        let mss = MediaSourceStream::new(Box::new(file), Default::default());

        let mut hint = Hint::new();
        if let Some(extension) = path.extension().and_then(|ext| ext.to_str()) {
            hint.with_extension(extension);
        }

        let meta_opts: MetadataOptions = Default::default();
        let fmt_opts: FormatOptions = Default::default();

        let probed = symphonia::default::get_probe()
            .format(&hint, mss, &fmt_opts, &meta_opts)
            .map_err(|e| anyhow::anyhow!("音声フォーマットを認識できません: {}", e))?;
        let mut format = probed.format;

        let (track_id, codec_params) = {
            let track = format
                .tracks()
                .iter()
                .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
                .ok_or_else(|| anyhow::anyhow!("音声トラックが見つかりません"))?;

            (track.id, track.codec_params.clone())
        };

        let dec_opts: DecoderOptions = Default::default();
        let mut decoder = symphonia::default::get_codecs().make(&codec_params, &dec_opts)?;

        let mut samples = Vec::new();

        loop {
            let packet = match format.next_packet() {
                Ok(packet) => packet,
                Err(symphonia::core::errors::Error::ResetRequired) => break,
                Err(symphonia::core::errors::Error::IoError(ref err))
                    if err.kind() == std::io::ErrorKind::UnexpectedEof =>
                {
                    break;
                }
                Err(err) => return Err(anyhow::anyhow!("パケット読み込みエラー: {}", err)),
            };

            if packet.track_id() != track_id {
                continue;
            }

            match decoder.decode(&packet) {
                Ok(audio_buf) => {
                    mix_into_mono(&audio_buf, &mut samples)?;
                }
                Err(symphonia::core::errors::Error::IoError(ref err))
                    if err.kind() == std::io::ErrorKind::UnexpectedEof =>
                {
                    break;
                }
                Err(err) => return Err(anyhow::anyhow!("デコードエラー: {}", err)),
            }
        }

        if samples.is_empty() {
            return Err(anyhow::anyhow!("音声データが空です"));
        }

        let source_rate = decoder
            .codec_params()
            .sample_rate
            .or(codec_params.sample_rate)
            .ok_or_else(|| anyhow::anyhow!("サンプリングレートが取得できません"))?
            as f64;

        let target_rate = self.config.audio.sample_rate as f64;
        let samples = if (source_rate - target_rate).abs() > 1.0 {
            resample_mono(samples, source_rate, target_rate)?
        } else {
            samples
        };

        let duration_ms =
            (samples.len() as f64 / self.config.audio.sample_rate as f64 * 1000.0) as u64;

        Ok(DecodedAudio {
            samples,
            sample_rate: self.config.audio.sample_rate,
            duration_ms,
        })
    }
}

/// デコードバッファをモノラルf32へ変換して追加
fn mix_into_mono(audio_buf: &AudioBufferRef, samples: &mut Vec<f32>) -> Result<()> {
    match audio_buf {
        AudioBufferRef::F32(buf) => {
            let ch = buf.spec().channels.count();
            let frames = buf.frames();
            for i in 0..frames {
                let mut sum = 0.0f32;
                for c in 0..ch {
                    sum += buf.chan(c)[i];
                }
                samples.push(sum / ch as f32);
            }
        }
        AudioBufferRef::S32(buf) => {
            let ch = buf.spec().channels.count();
            let frames = buf.frames();
            for i in 0..frames {
                let mut sum = 0.0f32;
                for c in 0..ch {
                    sum += buf.chan(c)[i] as f32 / i32::MAX as f32;
                }
                samples.push(sum / ch as f32);
            }
        }
        AudioBufferRef::S16(buf) => {
            let ch = buf.spec().channels.count();
            let frames = buf.frames();
            for i in 0..frames {
                let mut sum = 0.0f32;
                for c in 0..ch {
                    sum += buf.chan(c)[i] as f32 / i16::MAX as f32;
                }
                samples.push(sum / ch as f32);
            }
        }
        _ => return Err(anyhow::anyhow!("サポートされていない音声フォーマットです")),
    }
    Ok(())
}

/// モノラルサンプル列をターゲットレートへリサンプリング
fn resample_mono(samples: Vec<f32>, input_rate: f64, output_rate: f64) -> Result<Vec<f32>> {
    if (input_rate - output_rate).abs() < 1.0 {
        return Ok(samples);
    }

    let params = SincInterpolationParameters {
        sinc_len: 256,
        f_cutoff: 0.95,
        interpolation: SincInterpolationType::Linear,
        oversampling_factor: 256,
        window: WindowFunction::BlackmanHarris2,
    };

    let mut resampler = SincFixedIn::<f32>::new(
        output_rate / input_rate,
        2.0,
        params,
        samples.len(),
        1, // モノラル
    )?;

    let input_channels = vec![samples];
    let output_channels = resampler.process(&input_channels, None)?;

    Ok(output_channels[0].clone())
}
