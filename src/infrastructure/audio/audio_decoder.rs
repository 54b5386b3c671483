use std::io::Cursor;

use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{CODEC_TYPE_NULL, DecoderOptions};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

use crate::application::ports::{AudioDecoder, AudioDecoderError};
use crate::domain::{AudioFormat, DecodedAudio};

pub const TARGET_SAMPLE_RATE: u32 = 16_000;

/// Decodes uploads with symphonia into 16 kHz mono PCM.
#[derive(Debug, Default, Clone, Copy)]
pub struct SymphoniaAudioDecoder;

impl AudioDecoder for SymphoniaAudioDecoder {
    fn decode(&self, data: &[u8], format: AudioFormat) -> Result<DecodedAudio, AudioDecoderError> {
        decode_audio_to_pcm(data, format)
    }
}

pub fn decode_audio_to_pcm(
    data: &[u8],
    format: AudioFormat,
) -> Result<DecodedAudio, AudioDecoderError> {
    let cursor = Cursor::new(data.to_vec());
    let mss = MediaSourceStream::new(Box::new(cursor), Default::default());

    let mut hint = Hint::new();
    if let Some(extension) = format.extension() {
        hint.with_extension(extension);
    }

    let probed = symphonia::default::get_probe()
        .format(
            &hint,
            mss,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        )
        .map_err(|e| match e {
            SymphoniaError::Unsupported(what) => {
                AudioDecoderError::UnsupportedFormat(what.to_string())
            }
            other => AudioDecoderError::DecodingFailed(format!("probe: {}", other)),
        })?;

    let mut reader = probed.format;

    let track = reader
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .ok_or_else(|| AudioDecoderError::DecodingFailed("no audio track found".to_string()))?;

    let track_id = track.id;
    let codec_params = track.codec_params.clone();
    let source_rate = codec_params
        .sample_rate
        .ok_or_else(|| AudioDecoderError::DecodingFailed("unknown sample rate".to_string()))?;

    let mut decoder = symphonia::default::get_codecs()
        .make(&codec_params, &DecoderOptions::default())
        .map_err(|e| AudioDecoderError::UnsupportedFormat(format!("codec: {}", e)))?;

    let mut all_samples: Vec<f32> = Vec::new();

    loop {
        let packet = match reader.next_packet() {
            Ok(p) => p,
            Err(SymphoniaError::IoError(ref e))
                if e.kind() == std::io::ErrorKind::UnexpectedEof =>
            {
                break;
            }
            Err(e) => {
                return Err(AudioDecoderError::DecodingFailed(format!("packet: {}", e)));
            }
        };

        if packet.track_id() != track_id {
            continue;
        }

        let decoded = match decoder.decode(&packet) {
            Ok(d) => d,
            Err(SymphoniaError::DecodeError(e)) => {
                tracing::warn!(error = %e, "Skipping corrupt audio frame");
                continue;
            }
            Err(e) => {
                return Err(AudioDecoderError::DecodingFailed(format!("decode: {}", e)));
            }
        };

        let spec = *decoded.spec();
        let num_frames = decoded.frames();
        if num_frames == 0 {
            continue;
        }
        let channels = spec.channels.count().max(1);

        let mut sample_buf = SampleBuffer::<f32>::new(num_frames as u64, spec);
        sample_buf.copy_interleaved_ref(decoded);
        let samples = sample_buf.samples();

        if channels > 1 {
            for frame in samples.chunks(channels) {
                let mono: f32 = frame.iter().sum::<f32>() / channels as f32;
                all_samples.push(mono);
            }
        } else {
            all_samples.extend_from_slice(samples);
        }
    }

    if all_samples.is_empty() {
        tracing::debug!("Audio stream contained no samples");
        return Ok(DecodedAudio::empty(TARGET_SAMPLE_RATE));
    }

    if source_rate != TARGET_SAMPLE_RATE {
        all_samples = resample(&all_samples, source_rate, TARGET_SAMPLE_RATE)?;
    }

    let audio = DecodedAudio::new(all_samples, TARGET_SAMPLE_RATE);

    tracing::debug!(
        samples = audio.samples.len(),
        source_rate,
        duration_secs = audio.duration().as_secs_f32(),
        "Audio decoded to 16kHz mono PCM"
    );

    Ok(audio)
}

fn resample(samples: &[f32], from_rate: u32, to_rate: u32) -> Result<Vec<f32>, AudioDecoderError> {
    use rubato::{
        Resampler, SincFixedIn, SincInterpolationParameters, SincInterpolationType, WindowFunction,
    };

    let params = SincInterpolationParameters {
        sinc_len: 256,
        f_cutoff: 0.95,
        interpolation: SincInterpolationType::Linear,
        oversampling_factor: 256,
        window: WindowFunction::BlackmanHarris2,
    };

    let ratio = to_rate as f64 / from_rate as f64;
    let chunk_size = 1024;

    let mut resampler = SincFixedIn::<f32>::new(ratio, 2.0, params, chunk_size, 1)
        .map_err(|e| AudioDecoderError::DecodingFailed(format!("resampler init: {}", e)))?;

    let delay = resampler.output_delay();
    let expected_len = (samples.len() as f64 * ratio).round() as usize;
    let mut output = Vec::with_capacity(delay + expected_len + chunk_size);
    let mut chunks = samples.chunks(chunk_size);

    // Keep feeding silence after the input ends until the delayed tail is out.
    while output.len() < delay + expected_len {
        let mut input = chunks.next().map(<[f32]>::to_vec).unwrap_or_default();
        input.resize(chunk_size, 0.0);

        let result = resampler
            .process(&[input], None)
            .map_err(|e| AudioDecoderError::DecodingFailed(format!("resample: {}", e)))?;

        match result.first() {
            Some(channel) if !channel.is_empty() => output.extend_from_slice(channel),
            _ => break,
        }
    }

    // The first `delay` frames are filter warm-up, not signal.
    output.drain(..delay.min(output.len()));
    output.resize(expected_len, 0.0);

    Ok(output)
}
