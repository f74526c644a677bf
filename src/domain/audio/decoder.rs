use std::io::Cursor;

use crate::domain::speech::{AudioEncoding, AudioPayload};

use super::{AudioBuffer, DecodeError};

/// Decode a synthesis payload according to its declared encoding
pub fn decode(payload: &AudioPayload) -> Result<AudioBuffer, DecodeError> {
    if payload.raw_bytes.is_empty() {
        return Err(DecodeError::Empty);
    }

    let buffer = match payload.encoding {
        AudioEncoding::Pcm16Le => decode_pcm16(&payload.raw_bytes, payload.sample_rate)?,
        AudioEncoding::Wav => decode_wav(&payload.raw_bytes, payload.sample_rate)?,
    };

    tracing::debug!(
        encoding = ?payload.encoding,
        sample_rate = buffer.sample_rate,
        channels = buffer.channels,
        samples = buffer.samples.len(),
        duration_ms = buffer.duration().as_millis(),
        "Audio payload decoded"
    );

    Ok(buffer)
}

fn decode_pcm16(bytes: &[u8], sample_rate: u32) -> Result<AudioBuffer, DecodeError> {
    if sample_rate == 0 {
        return Err(DecodeError::ZeroSampleRate);
    }
    if bytes.len() % 2 != 0 {
        return Err(DecodeError::OddByteCount(bytes.len()));
    }

    let samples = bytes
        .chunks_exact(2)
        .map(|pair| i16::from_le_bytes([pair[0], pair[1]]))
        .collect();

    Ok(AudioBuffer {
        sample_rate,
        channels: 1,
        samples,
    })
}

fn decode_wav(bytes: &[u8], declared_rate: u32) -> Result<AudioBuffer, DecodeError> {
    let reader =
        hound::WavReader::new(Cursor::new(bytes)).map_err(|e| DecodeError::Wav(e.to_string()))?;
    let spec = reader.spec();

    if spec.sample_rate == 0 {
        return Err(DecodeError::ZeroSampleRate);
    }
    if declared_rate != 0 && declared_rate != spec.sample_rate {
        tracing::warn!(
            declared_rate = declared_rate,
            header_rate = spec.sample_rate,
            "Declared sample rate differs from WAV header, using header"
        );
    }

    let samples = match (spec.sample_format, spec.bits_per_sample) {
        (hound::SampleFormat::Int, bits) if bits <= 16 => reader
            .into_samples::<i16>()
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| DecodeError::Wav(e.to_string()))?,
        (hound::SampleFormat::Int, bits) => {
            let shift = u32::from(bits) - 16;
            reader
                .into_samples::<i32>()
                .map(|s| s.map(|v| (v >> shift) as i16))
                .collect::<Result<Vec<_>, _>>()
                .map_err(|e| DecodeError::Wav(e.to_string()))?
        }
        (hound::SampleFormat::Float, _) => reader
            .into_samples::<f32>()
            .map(|s| s.map(|v| (v.clamp(-1.0, 1.0) * f32::from(i16::MAX)) as i16))
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| DecodeError::Wav(e.to_string()))?,
    };

    if samples.is_empty() {
        return Err(DecodeError::Empty);
    }

    Ok(AudioBuffer {
        sample_rate: spec.sample_rate,
        channels: spec.channels,
        samples,
    })
}
