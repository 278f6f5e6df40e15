//! Streaming VAG writer façade
//!
//! Appended PCM is de-interleaved into per-channel FIFOs; `finalize`
//! splits each channel into 28-sample blocks, runs the predictor
//! search per block, lays the frames out contiguously (`VAGp`) or as
//! alternating per-channel chunks (`VAGi`), stamps the loop/end flags
//! on terminal frames, and patches the header's per-channel byte
//! length in place.

use crate::adpcm::{encode_frame, ChannelState, FLAG_END, FLAG_REPEAT, FRAME_SIZE, SAMPLES_PER_FRAME};
use crate::error::{Error, Result};
use crate::format::{VagHeader, CHUNK_ALIGNMENT, VERSION};
use std::io::{Seek, Write};
use tracing::debug;

/// Encoder configuration accepted by [`VagWriter::with_config`]
#[derive(Debug, Clone)]
pub struct VagWriterConfig {
    /// Emit the interleaved `VAGi` layout instead of `VAGp`
    pub interleaved: bool,
    /// Tag every chunk's last frame with both end and repeat bits, the
    /// trick a streaming player uses to chain chunks in SPU memory
    pub streaming_loop_flags: bool,
    /// Sample rate in Hz
    pub sample_rate: u32,
    /// Number of channels
    pub channels: u16,
    /// Interleave chunk size in bytes; must be a positive multiple of
    /// 2048 when interleaved, ignored otherwise
    pub chunk_size: u32,
}

impl VagWriterConfig {
    /// Mono non-interleaved stream with no loop flags
    pub fn mono(sample_rate: u32) -> Self {
        VagWriterConfig {
            interleaved: false,
            streaming_loop_flags: false,
            sample_rate,
            channels: 1,
            chunk_size: 0,
        }
    }

    fn validate(&self) -> Result<()> {
        if self.channels == 0 {
            return Err(Error::config("channel count must be at least 1"));
        }
        if self.sample_rate == 0 {
            return Err(Error::config("sample rate must be positive"));
        }
        if self.interleaved {
            if self.chunk_size == 0 || self.chunk_size % CHUNK_ALIGNMENT != 0 {
                return Err(Error::config(format!(
                    "interleave chunk size {} is not a positive multiple of {}",
                    self.chunk_size, CHUNK_ALIGNMENT
                )));
            }
        } else {
            if self.channels != 1 {
                return Err(Error::config(
                    "non-interleaved streams carry exactly one channel",
                ));
            }
            if self.streaming_loop_flags {
                return Err(Error::config(
                    "streaming loop flags require an interleaved stream",
                ));
            }
        }
        Ok(())
    }
}

/// Streaming encoder producing a VAG stream
///
/// The header is written at construction with a zeroed length field;
/// [`VagWriter::finalize`] must be called exactly once to emit the
/// payload and patch the length. The writer owns its stream;
/// [`VagWriter::into_inner`] hands it back.
pub struct VagWriter<W: Write + Seek> {
    output: W,
    config: VagWriterConfig,
    pending: Vec<Vec<i16>>,
    states: Vec<ChannelState>,
    finalized: bool,
}

impl<W: Write + Seek> VagWriter<W> {
    /// Mono non-interleaved writer, the common `VAGp` case
    pub fn new(sample_rate: u32, output: W) -> Result<Self> {
        Self::with_config(VagWriterConfig::mono(sample_rate), output)
    }

    /// Construct a writer with the full configuration, writing the
    /// header immediately and leaving the stream at the payload start.
    pub fn with_config(config: VagWriterConfig, mut output: W) -> Result<Self> {
        config.validate()?;
        let header = VagHeader {
            interleaved: config.interleaved,
            version: VERSION,
            chunk_size: config.chunk_size,
            data_length: 0,
            sample_rate: config.sample_rate,
            channels: config.channels,
        };
        header.write(&mut output)?;

        let channels = config.channels as usize;
        Ok(VagWriter {
            output,
            pending: vec![Vec::new(); channels],
            states: vec![ChannelState::new(); channels],
            finalized: false,
            config,
        })
    }

    /// Append interleaved PCM; the slice length must be a multiple of
    /// the channel count.
    pub fn append_i16(&mut self, samples: &[i16]) -> Result<()> {
        if self.finalized {
            return Err(Error::invalid_state("writer already finalized"));
        }
        let channels = self.config.channels as usize;
        if samples.len() % channels != 0 {
            return Err(Error::invalid_input(format!(
                "sample count {} is not a multiple of {} channels",
                samples.len(),
                channels
            )));
        }
        for group in samples.chunks_exact(channels) {
            for (fifo, &sample) in self.pending.iter_mut().zip(group.iter()) {
                fifo.push(sample);
            }
        }
        Ok(())
    }

    /// Encode all pending samples, stamp terminal-frame flags, patch
    /// the header length, and flush. The writer is inert afterwards.
    pub fn finalize(&mut self) -> Result<()> {
        if self.finalized {
            return Err(Error::invalid_state("writer already finalized"));
        }
        self.finalized = true;

        let data_length = if self.config.interleaved {
            self.write_interleaved()?
        } else {
            self.write_contiguous()?
        };
        VagHeader::patch_data_length(&mut self.output, data_length)?;
        self.output.flush()?;
        debug!(
            data_length,
            channels = self.config.channels,
            "finalized VAG stream"
        );
        Ok(())
    }

    /// Consume the writer, returning the underlying stream
    pub fn into_inner(self) -> W {
        self.output
    }

    fn write_contiguous(&mut self) -> Result<u32> {
        let samples = &self.pending[0];
        let frames = samples.len().div_ceil(SAMPLES_PER_FRAME);
        let mut block = [0i16; SAMPLES_PER_FRAME];
        for index in 0..frames {
            let start = index * SAMPLES_PER_FRAME;
            let take = (samples.len() - start).min(SAMPLES_PER_FRAME);
            block[..take].copy_from_slice(&samples[start..start + take]);
            block[take..].fill(0);
            let flags = if index + 1 == frames { FLAG_END } else { 0 };
            let frame = encode_frame(&block, flags, &mut self.states[0]);
            self.output.write_all(&frame)?;
        }
        Ok((frames * FRAME_SIZE) as u32)
    }

    fn write_interleaved(&mut self) -> Result<u32> {
        let channels = self.config.channels as usize;
        let frames_per_chunk = self.config.chunk_size as usize / FRAME_SIZE;
        let samples_per_chunk = frames_per_chunk * SAMPLES_PER_FRAME;
        // all channels are expected to run equally long
        let chunks = self.pending[0].len().div_ceil(samples_per_chunk);

        let mut block = [0i16; SAMPLES_PER_FRAME];
        for chunk in 0..chunks {
            for ch in 0..channels {
                let samples = &self.pending[ch];
                for index in 0..frames_per_chunk {
                    let start = chunk * samples_per_chunk + index * SAMPLES_PER_FRAME;
                    let take = samples.len().saturating_sub(start).min(SAMPLES_PER_FRAME);
                    block[..take].copy_from_slice(&samples[start..start + take]);
                    block[take..].fill(0);

                    let mut flags = 0u8;
                    if index + 1 == frames_per_chunk {
                        if self.config.streaming_loop_flags {
                            flags |= FLAG_END | FLAG_REPEAT;
                        }
                        if chunk + 1 == chunks {
                            flags |= FLAG_END;
                        }
                    }
                    let frame = encode_frame(&block, flags, &mut self.states[ch]);
                    self.output.write_all(&frame)?;
                }
            }
        }
        Ok(chunks as u32 * self.config.chunk_size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn interleaved_config(channels: u16, chunk_size: u32) -> VagWriterConfig {
        VagWriterConfig {
            interleaved: true,
            streaming_loop_flags: false,
            sample_rate: 44100,
            channels,
            chunk_size,
        }
    }

    #[test]
    fn test_rejects_zero_channels() {
        let mut config = VagWriterConfig::mono(8000);
        config.channels = 0;
        let result = VagWriter::with_config(config, Cursor::new(Vec::new()));
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_rejects_zero_sample_rate() {
        let result = VagWriter::new(0, Cursor::new(Vec::new()));
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_rejects_unaligned_chunk_size() {
        for chunk_size in [0, 16, 1000, 2047, 3072] {
            let result =
                VagWriter::with_config(interleaved_config(2, chunk_size), Cursor::new(Vec::new()));
            assert!(matches!(result, Err(Error::Config(_))), "chunk {}", chunk_size);
        }
    }

    #[test]
    fn test_rejects_multichannel_without_interleave() {
        let mut config = VagWriterConfig::mono(8000);
        config.channels = 2;
        let result = VagWriter::with_config(config, Cursor::new(Vec::new()));
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_rejects_loop_flags_without_interleave() {
        let mut config = VagWriterConfig::mono(8000);
        config.streaming_loop_flags = true;
        let result = VagWriter::with_config(config, Cursor::new(Vec::new()));
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_rejects_misaligned_append() {
        let mut writer =
            VagWriter::with_config(interleaved_config(2, 2048), Cursor::new(Vec::new())).unwrap();
        assert!(matches!(
            writer.append_i16(&[0i16; 3]),
            Err(Error::InvalidInput(_))
        ));
        assert!(writer.append_i16(&[0i16; 4]).is_ok());
    }

    #[test]
    fn test_finalize_twice_is_an_error() {
        let mut writer = VagWriter::new(8000, Cursor::new(Vec::new())).unwrap();
        writer.append_i16(&[0i16; 28]).unwrap();
        writer.finalize().unwrap();
        assert!(matches!(writer.finalize(), Err(Error::InvalidState(_))));
        assert!(matches!(
            writer.append_i16(&[0i16; 1]),
            Err(Error::InvalidState(_))
        ));
    }

    #[test]
    fn test_header_written_at_construction() {
        let writer = VagWriter::new(8000, Cursor::new(Vec::new())).unwrap();
        let bytes = writer.into_inner().into_inner();
        assert_eq!(bytes.len(), 2048);
        assert_eq!(&bytes[0..4], b"VAGp");
        // length field still zeroed before finalize
        assert_eq!(&bytes[12..16], &[0, 0, 0, 0]);
    }
}
