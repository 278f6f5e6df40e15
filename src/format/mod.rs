//! VAG container format support
//!
//! This module implements parsing and writing of the VAG stream layout:
//! a mixed-endian header padded to a 2048-byte boundary, followed by
//! raw 16-byte ADPCM frames. `VAGp` streams hold a single contiguous
//! channel; `VAGi` streams alternate per-channel chunks of a fixed
//! byte size.

pub mod header;
pub mod reader;
pub mod writer;

pub use header::VagHeader;
pub use reader::VagReader;
pub use writer::{VagWriter, VagWriterConfig};

/// Magic for non-interleaved single-channel streams
pub const VAGP_MAGIC: &[u8; 4] = b"VAGp";
/// Magic for interleaved multi-channel streams
pub const VAGI_MAGIC: &[u8; 4] = b"VAGi";

/// Payload starts at the next multiple of this after the header
pub const HEADER_ALIGNMENT: u64 = 2048;
/// Interleave chunk sizes must be a multiple of this
pub const CHUNK_ALIGNMENT: u32 = 2048;
/// Header version emitted by the writer; the reader accepts any
pub const VERSION: u32 = 0x0000_0020;
