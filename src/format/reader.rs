//! Streaming VAG reader façade
//!
//! Pulls PCM out of a VAG stream one chunk at a time: every refill
//! reads one chunk per channel into a contiguous byte buffer, decodes
//! it frame by frame into an interleaved scratch buffer, and the read
//! calls drain that scratch through a cursor. Non-interleaved streams
//! use an internal 2048-byte granularity for the buffered reads; that
//! never appears on the wire.

use crate::adpcm::{decode_frame, ChannelState, FLAG_END, FLAG_REPEAT, FRAME_SIZE, SAMPLES_PER_FRAME};
use crate::error::Result;
use crate::format::{VagHeader, HEADER_ALIGNMENT};
use std::io::{self, Read, Seek, SeekFrom};
use tracing::debug;

/// Streaming decoder for VAG input
///
/// The reader owns its stream; [`VagReader::into_inner`] hands it back
/// for callers that want to keep it open past the reader's lifetime.
pub struct VagReader<R: Read + Seek> {
    input: R,
    header: VagHeader,
    payload_start: u64,
    /// chunk granularity actually used for reads
    read_chunk_size: u32,
    states: Vec<ChannelState>,
    chunk_buf: Vec<u8>,
    /// one decoded chunk across all channels, interleaved
    scratch: Vec<i16>,
    scratch_len: usize,
    cursor: usize,
    /// unread payload bytes per channel
    bytes_left: u64,
    end_of_stream: bool,
}

impl<R: Read + Seek> VagReader<R> {
    /// Parse the header and position the stream at the payload start.
    /// Fails with [`crate::Error::BadMagic`] on non-VAG input.
    pub fn new(mut input: R) -> Result<Self> {
        let (header, payload_start) = VagHeader::read(&mut input)?;
        debug!(
            interleaved = header.interleaved,
            sample_rate = header.sample_rate,
            channels = header.channels,
            data_length = header.data_length,
            "parsed VAG header"
        );

        let read_chunk_size = if header.interleaved {
            header.chunk_size
        } else {
            HEADER_ALIGNMENT as u32
        };
        let channels = header.channels as usize;
        let frames_per_chunk = read_chunk_size as usize / FRAME_SIZE;
        let scratch_capacity = frames_per_chunk * SAMPLES_PER_FRAME * channels;

        Ok(VagReader {
            bytes_left: u64::from(header.data_length),
            payload_start,
            read_chunk_size,
            states: vec![ChannelState::new(); channels],
            chunk_buf: vec![0u8; read_chunk_size as usize],
            scratch: vec![0i16; scratch_capacity],
            scratch_len: 0,
            cursor: 0,
            end_of_stream: false,
            header,
            input,
        })
    }

    /// Sample rate in Hz
    pub fn sample_rate(&self) -> u32 {
        self.header.sample_rate
    }

    /// Number of channels
    pub fn channels(&self) -> u16 {
        self.header.channels
    }

    /// Total decoded samples per channel
    pub fn total_samples(&self) -> u32 {
        self.header.total_samples()
    }

    /// Stream duration in seconds
    pub fn duration_seconds(&self) -> f64 {
        self.header.duration_seconds()
    }

    /// Whether the stream uses the interleaved `VAGi` layout
    pub fn interleaved(&self) -> bool {
        self.header.interleaved
    }

    /// Interleave chunk size in bytes; 0 for non-interleaved streams
    pub fn chunk_size(&self) -> u32 {
        if self.header.interleaved {
            self.header.chunk_size
        } else {
            0
        }
    }

    /// Read-only access to the parsed header
    pub fn header(&self) -> &VagHeader {
        &self.header
    }

    /// Fill `out` with decoded samples in interleaved channel order.
    /// Returns the number of samples written; 0 means end of stream.
    pub fn read_i16(&mut self, out: &mut [i16]) -> Result<usize> {
        let mut written = 0;
        while written < out.len() {
            if self.cursor >= self.scratch_len {
                if self.end_of_stream {
                    break;
                }
                self.refill()?;
                if self.scratch_len == 0 {
                    break;
                }
            }
            let take = (out.len() - written).min(self.scratch_len - self.cursor);
            out[written..written + take]
                .copy_from_slice(&self.scratch[self.cursor..self.cursor + take]);
            self.cursor += take;
            written += take;
        }
        Ok(written)
    }

    /// Like [`VagReader::read_i16`], with samples scaled to [-1, 1)
    pub fn read_f32(&mut self, out: &mut [f32]) -> Result<usize> {
        let mut pcm = vec![0i16; out.len()];
        let count = self.read_i16(&mut pcm)?;
        for (dst, &sample) in out.iter_mut().zip(&pcm[..count]) {
            *dst = f32::from(sample) / 32768.0;
        }
        Ok(count)
    }

    /// Like [`VagReader::read_i16`], writing little-endian 16-bit PCM
    /// into `out`. Returns the number of SAMPLES written (not bytes).
    pub fn read_bytes(&mut self, out: &mut [u8]) -> Result<usize> {
        let mut pcm = vec![0i16; out.len() / 2];
        let count = self.read_i16(&mut pcm)?;
        for (chunk, &sample) in out.chunks_exact_mut(2).zip(&pcm[..count]) {
            chunk.copy_from_slice(&sample.to_le_bytes());
        }
        Ok(count)
    }

    /// Rewind to the payload start and zero all predictor state, so
    /// the next read replays the stream from the beginning.
    pub fn reset(&mut self) -> Result<()> {
        self.input.seek(SeekFrom::Start(self.payload_start))?;
        for state in &mut self.states {
            state.reset();
        }
        self.cursor = 0;
        self.scratch_len = 0;
        self.bytes_left = u64::from(self.header.data_length);
        self.end_of_stream = false;
        Ok(())
    }

    /// Consume the reader, returning the underlying stream
    pub fn into_inner(self) -> R {
        self.input
    }

    /// Decode the next chunk of every channel into the scratch buffer.
    fn refill(&mut self) -> Result<()> {
        self.cursor = 0;
        self.scratch_len = 0;
        if self.bytes_left == 0 {
            self.end_of_stream = true;
            return Ok(());
        }
        self.scratch.fill(0);

        let channels = self.header.channels as usize;
        let want = u64::from(self.read_chunk_size).min(self.bytes_left) as usize;
        let mut ended = false;
        let mut chunk_samples = 0usize;

        for ch in 0..channels {
            let got = read_up_to(&mut self.input, &mut self.chunk_buf[..want])?;
            if got < want {
                ended = true;
            }
            let mut produced = 0usize;
            for frame_bytes in self.chunk_buf[..got].chunks_exact(FRAME_SIZE) {
                let mut frame = [0u8; FRAME_SIZE];
                frame.copy_from_slice(frame_bytes);
                let mut pcm = [0i16; SAMPLES_PER_FRAME];
                let flags = decode_frame(&frame, &mut self.states[ch], &mut pcm);
                for (i, &sample) in pcm.iter().enumerate() {
                    self.scratch[(produced + i) * channels + ch] = sample;
                }
                produced += SAMPLES_PER_FRAME;
                if flags & (FLAG_END | FLAG_REPEAT) == FLAG_END {
                    // low two bits exactly 01: terminal frame
                    ended = true;
                    break;
                }
            }
            chunk_samples = chunk_samples.max(produced);
        }

        self.bytes_left -= want as u64;
        self.scratch_len = chunk_samples * channels;
        if ended {
            self.end_of_stream = true;
        }
        Ok(())
    }
}

/// Read as many bytes as the stream can supply, short only at EOF.
fn read_up_to<R: Read>(reader: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut total = 0;
    while total < buf.len() {
        match reader.read(&mut buf[total..]) {
            Ok(0) => break,
            Ok(n) => total += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(total)
}
