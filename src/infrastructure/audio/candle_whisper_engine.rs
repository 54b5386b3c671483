use std::fmt::Display;
use std::sync::Arc;

use async_trait::async_trait;
use candle_core::{DType, Device, IndexOp, Tensor};
use candle_nn::VarBuilder;
use candle_transformers::models::whisper::{self as m, Config};
use hf_hub::api::sync::Api;
use hf_hub::{Repo, RepoType};
use tokenizers::Tokenizer;
use tokio::sync::Mutex;

use crate::application::ports::{
    DecodeOptions, DecodeTask, SpeechModel, SpeechModelLoader, TranscriptionError,
};
use crate::domain::AudioChunk;

pub const DEFAULT_LOCAL_MODEL: &str = "openai/whisper-large-v3";

const MEL_FILTERS_REPO: &str = "FL33TW00D-HF/whisper-base";
const SOT_PREV_TOKEN: &str = "<|startofprev|>";
const MAX_PROMPT_TOKENS: usize = 223;
const MAX_DECODE_TOKENS: usize = 224;

const LANGUAGES: &[&str] = &[
    "en", "zh", "de", "es", "ru", "ko", "fr", "ja", "pt", "tr", "pl", "ca", "nl", "ar", "sv",
    "it", "id", "hi", "fi", "vi", "he", "uk", "el", "ms", "cs", "ro", "da", "hu", "ta", "no",
    "th", "ur", "hr", "bg", "lt", "la", "mi", "ml", "cy", "sk", "te", "fa", "lv", "bn", "sr",
    "az", "sl", "kn", "et", "mk", "br", "eu", "is", "hy", "ne", "mn", "bs", "kk", "sq", "sw",
    "gl", "mr", "pa", "si", "km", "sn", "yo", "so", "af", "oc", "ka", "be", "tg", "sd", "gu",
    "am", "yi", "lo", "uz", "fo", "ht", "ps", "tk", "nn", "mt", "sa", "lb", "my", "bo", "tl",
    "mg", "as", "tt", "haw", "ln", "ha", "ba", "jw", "su", "yue",
];

/// Whisper running in-process on Candle.
pub struct CandleWhisperEngine {
    inner: Arc<WhisperInner>,
}

struct WhisperInner {
    model: Mutex<m::model::Whisper>,
    tokenizer: Tokenizer,
    config: Config,
    device: Device,
    mel_filters: Vec<f32>,
    language_tokens: Vec<(&'static str, u32)>,
}

impl CandleWhisperEngine {
    pub fn new(model_id: &str) -> Result<Self, TranscriptionError> {
        let device = Device::Cpu;

        tracing::info!(
            device = ?device,
            model = model_id,
            "Initializing Candle Whisper transcription engine"
        );

        let api = Api::new().map_err(|e| TranscriptionError::ModelLoadFailed(e.to_string()))?;
        let repo = api.repo(Repo::new(model_id.to_string(), RepoType::Model));

        let config_path = repo
            .get("config.json")
            .map_err(|e| TranscriptionError::ModelLoadFailed(format!("config.json: {}", e)))?;
        let tokenizer_path = repo
            .get("tokenizer.json")
            .map_err(|e| TranscriptionError::ModelLoadFailed(format!("tokenizer.json: {}", e)))?;
        let weights_path = repo.get("model.safetensors").map_err(|e| {
            TranscriptionError::ModelLoadFailed(format!("model.safetensors: {}", e))
        })?;

        let config_contents = std::fs::read_to_string(&config_path)
            .map_err(|e| TranscriptionError::ModelLoadFailed(format!("read config: {}", e)))?;
        let config: Config = serde_json::from_str(&config_contents)
            .map_err(|e| TranscriptionError::ModelLoadFailed(format!("parse config: {}", e)))?;

        let tokenizer = Tokenizer::from_file(&tokenizer_path)
            .map_err(|e| TranscriptionError::ModelLoadFailed(format!("tokenizer: {}", e)))?;

        // large-v3 uses 128 mel bins, earlier checkpoints 80
        let mel_file = match config.num_mel_bins {
            128 => "melfilters128.bytes",
            _ => "melfilters.bytes",
        };
        let mel_repo = api.repo(Repo::new(MEL_FILTERS_REPO.to_string(), RepoType::Model));
        let mel_bytes_path = mel_repo
            .get(mel_file)
            .map_err(|e| TranscriptionError::ModelLoadFailed(format!("{}: {}", mel_file, e)))?;
        let mel_bytes = std::fs::read(&mel_bytes_path)
            .map_err(|e| TranscriptionError::ModelLoadFailed(format!("mel filters: {}", e)))?;
        let mel_filters = read_mel_filters(&mel_bytes, &config)?;

        let language_tokens: Vec<(&'static str, u32)> = LANGUAGES
            .iter()
            .filter_map(|code| {
                tokenizer
                    .token_to_id(&format!("<|{}|>", code))
                    .map(|id| (*code, id))
            })
            .collect();

        // SAFETY: safetensors files are memory-mapped read-only
        let vb = unsafe {
            VarBuilder::from_mmaped_safetensors(&[weights_path], Self::select_dtype(&device), &device)
                .map_err(|e| TranscriptionError::ModelLoadFailed(format!("weights: {}", e)))?
        };

        let model = m::model::Whisper::load(&vb, config.clone())
            .map_err(|e| TranscriptionError::ModelLoadFailed(format!("model: {}", e)))?;

        tracing::info!(
            languages = language_tokens.len(),
            mel_bins = config.num_mel_bins,
            "Candle Whisper engine loaded successfully"
        );

        Ok(Self {
            inner: Arc::new(WhisperInner {
                model: Mutex::new(model),
                tokenizer,
                config,
                device,
                mel_filters,
                language_tokens,
            }),
        })
    }

    pub fn select_dtype(device: &Device) -> DType {
        if device.is_cpu() {
            DType::F32
        } else {
            DType::F16
        }
    }
}

#[async_trait]
impl SpeechModel for CandleWhisperEngine {
    async fn transcribe(
        &self,
        chunk: &AudioChunk,
        options: &DecodeOptions,
    ) -> Result<String, TranscriptionError> {
        if chunk.sample_rate as usize != m::SAMPLE_RATE {
            return Err(TranscriptionError::TranscriptionFailed(format!(
                "expected {} Hz audio, got {} Hz",
                m::SAMPLE_RATE,
                chunk.sample_rate
            )));
        }

        let inner = Arc::clone(&self.inner);
        let samples = chunk.samples.clone();
        let options = options.clone();

        tokio::task::spawn_blocking(move || inner.transcribe_pcm(&samples, &options))
            .await
            .map_err(|e| TranscriptionError::TranscriptionFailed(format!("worker: {}", e)))?
    }
}

impl WhisperInner {
    fn transcribe_pcm(
        &self,
        pcm: &[f32],
        options: &DecodeOptions,
    ) -> Result<String, TranscriptionError> {
        let mut model = self.model.blocking_lock();
        let mut text = String::new();

        for window in pcm.chunks(m::N_SAMPLES) {
            let mel = self.mel_tensor(window)?;
            let result = self.decode_window(&mut model, &mel, options);
            model.reset_kv_cache();
            text.push_str(&result?);
        }

        Ok(text)
    }

    fn mel_tensor(&self, window: &[f32]) -> Result<Tensor, TranscriptionError> {
        let mut samples = window.to_vec();
        if samples.len() < m::N_SAMPLES {
            samples.resize(m::N_SAMPLES, 0.0);
        }

        let mel_data = m::audio::pcm_to_mel(&self.config, &samples, &self.mel_filters);
        let n_mel = self.config.num_mel_bins;
        let n_frames = mel_data.len() / n_mel;

        let mel = Tensor::from_vec(mel_data, (1, n_mel, n_frames), &self.device)
            .map_err(failed("mel tensor"))?;
        let mel = mel
            .narrow(2, 0, n_frames.min(m::N_FRAMES))
            .map_err(failed("mel narrow"))?;

        if Self::is_half(&self.device) {
            mel.to_dtype(DType::F16).map_err(failed("mel dtype"))
        } else {
            Ok(mel)
        }
    }

    fn is_half(device: &Device) -> bool {
        CandleWhisperEngine::select_dtype(device) == DType::F16
    }

    fn decode_window(
        &self,
        model: &mut m::model::Whisper,
        mel: &Tensor,
        options: &DecodeOptions,
    ) -> Result<String, TranscriptionError> {
        let sot_token = self.token_id(m::SOT_TOKEN)?;
        let eot_token = self.token_id(m::EOT_TOKEN)?;
        let no_timestamps_token = self.token_id(m::NO_TIMESTAMPS_TOKEN)?;
        let task_token = match options.task {
            DecodeTask::Transcribe => self.token_id(m::TRANSCRIBE_TOKEN)?,
            DecodeTask::Translate => self.token_id(m::TRANSLATE_TOKEN)?,
        };

        let audio_features = model
            .encoder
            .forward(mel, true)
            .map_err(failed("encoder"))?;

        let language_token = match &options.language {
            Some(code) => self.token_id(&format!("<|{}|>", code))?,
            None => self.detect_language(model, &audio_features, sot_token)?,
        };

        let mut tokens = self.prompt_tokens(&options.initial_prompt)?;
        tokens.extend([sot_token, language_token, task_token, no_timestamps_token]);
        let prefix_len = tokens.len();

        for i in 0..MAX_DECODE_TOKENS {
            if tokens.len() >= self.config.max_target_positions {
                break;
            }

            let token_tensor = Tensor::new(tokens.as_slice(), &self.device)
                .and_then(|t| t.unsqueeze(0))
                .map_err(failed("tokens"))?;

            let decoder_output = model
                .decoder
                .forward(&token_tensor, &audio_features, i == 0)
                .map_err(failed("decoder"))?;

            let (_, seq_len, _) = decoder_output.dims3().map_err(failed("decoder dims"))?;
            let last = decoder_output
                .i((..1, seq_len - 1..))
                .map_err(failed("decoder slice"))?;

            let next_token = model
                .decoder
                .final_linear(&last)
                .and_then(|logits| logits.i(0))
                .and_then(|logits| logits.i(0))
                .and_then(|logits| logits.argmax(0))
                .and_then(|token| token.to_scalar::<u32>())
                .map_err(failed("logits"))?;

            if next_token == eot_token {
                break;
            }

            tokens.push(next_token);
        }

        self.tokenizer
            .decode(&tokens[prefix_len..], true)
            .map_err(failed("detokenize"))
    }

    fn detect_language(
        &self,
        model: &mut m::model::Whisper,
        audio_features: &Tensor,
        sot_token: u32,
    ) -> Result<u32, TranscriptionError> {
        if self.language_tokens.is_empty() {
            return Err(TranscriptionError::TranscriptionFailed(
                "tokenizer has no language tokens".to_string(),
            ));
        }

        let ids: Vec<u32> = self.language_tokens.iter().map(|(_, id)| *id).collect();
        let best = Tensor::new(&[[sot_token]], &self.device)
            .and_then(|tokens| model.decoder.forward(&tokens, audio_features, true))
            .and_then(|ys| model.decoder.final_linear(&ys.i(..1)?))
            .and_then(|logits| logits.i(0)?.i(0))
            .and_then(|logits| {
                let ids = Tensor::new(ids.as_slice(), &self.device)?;
                logits.index_select(&ids, 0)
            })
            .and_then(|logits| logits.argmax(0))
            .and_then(|best| best.to_scalar::<u32>())
            .map_err(failed("language detection"))? as usize;

        let (code, id) = self.language_tokens[best];
        tracing::debug!(language = code, "Detected chunk language");
        Ok(id)
    }

    fn prompt_tokens(&self, prompt: &str) -> Result<Vec<u32>, TranscriptionError> {
        let prompt = prompt.trim();
        if prompt.is_empty() {
            return Ok(Vec::new());
        }

        let encoding = self
            .tokenizer
            .encode(format!(" {}", prompt), false)
            .map_err(failed("prompt encode"))?;
        let ids = encoding.get_ids();
        let start = ids.len().saturating_sub(MAX_PROMPT_TOKENS);

        let mut tokens = Vec::with_capacity(ids.len() - start + 1);
        tokens.push(self.token_id(SOT_PREV_TOKEN)?);
        tokens.extend_from_slice(&ids[start..]);
        Ok(tokens)
    }

    fn token_id(&self, token: &str) -> Result<u32, TranscriptionError> {
        self.tokenizer.token_to_id(token).ok_or_else(|| {
            TranscriptionError::TranscriptionFailed(format!("token not found: {}", token))
        })
    }
}

fn failed<E: Display>(context: &'static str) -> impl Fn(E) -> TranscriptionError {
    move |e| TranscriptionError::TranscriptionFailed(format!("{}: {}", context, e))
}

fn read_mel_filters(bytes: &[u8], config: &Config) -> Result<Vec<f32>, TranscriptionError> {
    let expected_len = config.num_mel_bins * (m::N_FFT / 2 + 1);
    if bytes.len() < expected_len * 4 {
        return Err(TranscriptionError::ModelLoadFailed(format!(
            "mel filters file too small: {} bytes, expected at least {}",
            bytes.len(),
            expected_len * 4
        )));
    }

    let filters: Vec<f32> = bytes
        .chunks_exact(4)
        .take(expected_len)
        .map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
        .collect();

    Ok(filters)
}

/// Loads [`CandleWhisperEngine`] off the async runtime.
pub struct CandleWhisperLoader {
    model_id: String,
}

impl CandleWhisperLoader {
    pub fn new(model_id: impl Into<String>) -> Self {
        Self {
            model_id: model_id.into(),
        }
    }
}

#[async_trait]
impl SpeechModelLoader for CandleWhisperLoader {
    async fn load(&self) -> Result<Arc<dyn SpeechModel>, TranscriptionError> {
        let model_id = self.model_id.clone();
        let engine = tokio::task::spawn_blocking(move || CandleWhisperEngine::new(&model_id))
            .await
            .map_err(|e| TranscriptionError::ModelLoadFailed(format!("loader task: {}", e)))??;
        Ok(Arc::new(engine))
    }
}
