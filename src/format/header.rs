//! VAG stream header parsing and emission
//!
//! The header is 48 bytes of mixed-endian fields (a Sony wire quirk:
//! version, data length and sample rate are big-endian while the
//! interleave size and channel count are little-endian), zero-padded
//! forward to the 2048-byte payload boundary. The per-channel data
//! length is written as zero at creation time and patched in place
//! once the payload size is known.

use crate::adpcm::{FRAME_SIZE, SAMPLES_PER_FRAME};
use crate::error::{Error, Result};
use crate::format::{HEADER_ALIGNMENT, VAGI_MAGIC, VAGP_MAGIC};
use std::io::{Read, Seek, SeekFrom, Write};

/// Byte offset of the big-endian per-channel data length field
pub(crate) const DATA_LENGTH_OFFSET: u64 = 12;
const RESERVED_BYTES: usize = 10;
const NAME_BYTES: usize = 16;

/// Parsed VAG stream header
#[derive(Debug, Clone)]
pub struct VagHeader {
    /// Layout selected by the magic: `VAGi` when true, `VAGp` otherwise
    pub interleaved: bool,
    /// Format version; the writer emits 0x20, the reader accepts any
    pub version: u32,
    /// Interleave chunk size in bytes; zero on the wire for `VAGp`
    pub chunk_size: u32,
    /// Payload bytes per channel
    pub data_length: u32,
    /// Sample rate in Hz
    pub sample_rate: u32,
    /// Channel count
    pub channels: u16,
}

impl VagHeader {
    /// Read and parse a header, leaving the stream positioned at the
    /// payload start. Returns the header and that payload position.
    pub fn read<R: Read + Seek>(reader: &mut R) -> Result<(Self, u64)> {
        let mut magic = [0u8; 4];
        reader.read_exact(&mut magic)?;
        let interleaved = if &magic == VAGP_MAGIC {
            false
        } else if &magic == VAGI_MAGIC {
            true
        } else {
            return Err(Error::BadMagic { found: magic });
        };

        let version = read_u32_be(reader)?;
        let chunk_size = read_u32_le(reader)?;
        let data_length = read_u32_be(reader)?;
        let sample_rate = read_u32_be(reader)?;

        let mut reserved = [0u8; RESERVED_BYTES];
        reader.read_exact(&mut reserved)?;
        let mut raw = [0u8; 2];
        reader.read_exact(&mut raw)?;
        // classic mono files leave the channel field zeroed
        let channels = u16::from_le_bytes(raw).max(1);
        let mut name = [0u8; NAME_BYTES];
        reader.read_exact(&mut name)?;

        if interleaved && (chunk_size == 0 || chunk_size as usize % FRAME_SIZE != 0) {
            return Err(Error::format(format!(
                "interleaved stream with unusable chunk size {}",
                chunk_size
            )));
        }

        let position = reader.stream_position()?;
        let payload_start = align_forward(position, HEADER_ALIGNMENT);
        reader.seek(SeekFrom::Start(payload_start))?;

        let header = VagHeader {
            interleaved,
            version,
            chunk_size,
            data_length,
            sample_rate,
            channels,
        };
        Ok((header, payload_start))
    }

    /// Write the header fields plus zero padding up to the payload
    /// boundary. Returns the payload start position.
    pub fn write<W: Write + Seek>(&self, writer: &mut W) -> Result<u64> {
        writer.write_all(if self.interleaved { VAGI_MAGIC } else { VAGP_MAGIC })?;
        writer.write_all(&self.version.to_be_bytes())?;
        let wire_chunk = if self.interleaved { self.chunk_size } else { 0 };
        writer.write_all(&wire_chunk.to_le_bytes())?;
        writer.write_all(&self.data_length.to_be_bytes())?;
        writer.write_all(&self.sample_rate.to_be_bytes())?;
        writer.write_all(&[0u8; RESERVED_BYTES])?;
        writer.write_all(&self.channels.to_le_bytes())?;
        writer.write_all(&[0u8; NAME_BYTES])?;

        let position = writer.stream_position()?;
        let payload_start = align_forward(position, HEADER_ALIGNMENT);
        let padding = vec![0u8; (payload_start - position) as usize];
        writer.write_all(&padding)?;
        Ok(payload_start)
    }

    /// Patch the big-endian per-channel data length in an already
    /// written header, restoring the stream position afterwards.
    pub fn patch_data_length<W: Write + Seek>(writer: &mut W, data_length: u32) -> Result<()> {
        let end = writer.stream_position()?;
        writer.seek(SeekFrom::Start(DATA_LENGTH_OFFSET))?;
        writer.write_all(&data_length.to_be_bytes())?;
        writer.seek(SeekFrom::Start(end))?;
        Ok(())
    }

    /// Total decoded samples per channel
    pub fn total_samples(&self) -> u32 {
        self.data_length / FRAME_SIZE as u32 * SAMPLES_PER_FRAME as u32
    }

    /// Stream duration in seconds
    pub fn duration_seconds(&self) -> f64 {
        f64::from(self.total_samples()) / f64::from(self.sample_rate)
    }
}

fn read_u32_be<R: Read>(reader: &mut R) -> Result<u32> {
    let mut bytes = [0u8; 4];
    reader.read_exact(&mut bytes)?;
    Ok(u32::from_be_bytes(bytes))
}

fn read_u32_le<R: Read>(reader: &mut R) -> Result<u32> {
    let mut bytes = [0u8; 4];
    reader.read_exact(&mut bytes)?;
    Ok(u32::from_le_bytes(bytes))
}

pub(crate) fn align_forward(position: u64, alignment: u64) -> u64 {
    (position + alignment - 1) / alignment * alignment
}
