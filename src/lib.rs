//! vagaudio - PSX VAG audio encoding and decoding
//!
//! VAG is the ADPCM sample format consumed by the Sony PlayStation SPU.
//! A stream is a 2048-byte-aligned header followed by 16-byte ADPCM
//! frames, each decoding to 28 signed 16-bit PCM samples. Two container
//! layouts exist: `VAGp` (a single contiguous mono channel) and `VAGi`
//! (multi-channel, with per-channel chunks of a fixed size alternating).
//!
//! # Architecture
//!
//! The crate is organized into two modules:
//!
//! - `adpcm`: the frame codec — decoding 16-byte frames against
//!   per-channel predictor state, and the encode-side predictor search
//!   that picks a (filter, shift) pair per 28-sample block
//! - `format`: container handling — the mixed-endian header codec and
//!   the streaming [`VagReader`]/[`VagWriter`] façades
//!
//! Reading and writing are synchronous pull/push interfaces over any
//! `Read + Seek` / `Write + Seek` stream.

pub mod adpcm;
pub mod error;
pub mod format;

pub use error::{Error, Result};
pub use format::{VagHeader, VagReader, VagWriter, VagWriterConfig};
