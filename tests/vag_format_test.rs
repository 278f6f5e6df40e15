//! Integration tests for the VAG container layout
//!
//! These tests pin down the wire format: header field placement,
//! payload sizing, terminal-frame flag stamping, and the failure
//! behavior on malformed input.

use std::io::Cursor;

use vagaudio::{Error, VagReader, VagWriter, VagWriterConfig};

const PAYLOAD_START: usize = 2048;

fn encode_mono(samples: &[i16], sample_rate: u32) -> Vec<u8> {
    let mut writer = VagWriter::new(sample_rate, Cursor::new(Vec::new())).unwrap();
    writer.append_i16(samples).unwrap();
    writer.finalize().unwrap();
    writer.into_inner().into_inner()
}

fn encode_interleaved(
    samples: &[i16],
    sample_rate: u32,
    channels: u16,
    chunk_size: u32,
    loop_flags: bool,
) -> Vec<u8> {
    let config = VagWriterConfig {
        interleaved: true,
        streaming_loop_flags: loop_flags,
        sample_rate,
        channels,
        chunk_size,
    };
    let mut writer = VagWriter::with_config(config, Cursor::new(Vec::new())).unwrap();
    writer.append_i16(samples).unwrap();
    writer.finalize().unwrap();
    writer.into_inner().into_inner()
}

/// 28 samples of mono silence encode to a single all-zero frame with
/// only the end flag set
#[test]
fn test_mono_silence_single_frame() {
    let bytes = encode_mono(&[0i16; 28], 8000);

    assert_eq!(&bytes[0..4], b"VAGp");
    assert_eq!(bytes.len(), PAYLOAD_START + 16);
    // big-endian per-channel data length, patched after the payload
    assert_eq!(&bytes[12..16], &[0x00, 0x00, 0x00, 0x10]);

    let frame = &bytes[PAYLOAD_START..];
    assert_eq!(frame[0], 0x00);
    assert_eq!(frame[1], 0x01);
    assert!(frame[2..16].iter().all(|&b| b == 0));

    let mut reader = VagReader::new(Cursor::new(bytes)).unwrap();
    assert_eq!(reader.sample_rate(), 8000);
    assert_eq!(reader.channels(), 1);
    assert_eq!(reader.total_samples(), 28);
    assert!(!reader.interleaved());
    assert_eq!(reader.chunk_size(), 0);

    let mut out = [1i16; 64];
    assert_eq!(reader.read_i16(&mut out).unwrap(), 28);
    assert!(out[..28].iter().all(|&s| s == 0));
    assert_eq!(reader.read_i16(&mut out).unwrap(), 0);
}

/// 30 samples spill into a second, padded frame; only that terminal
/// frame carries the end flag
#[test]
fn test_mono_silence_padded_to_two_frames() {
    let bytes = encode_mono(&[0i16; 30], 8000);

    assert_eq!(bytes.len(), PAYLOAD_START + 32);
    assert_eq!(&bytes[12..16], &[0x00, 0x00, 0x00, 0x20]);

    let payload = &bytes[PAYLOAD_START..];
    assert_eq!(payload[1], 0x00);
    assert_eq!(payload[17], 0x01);

    let mut reader = VagReader::new(Cursor::new(bytes)).unwrap();
    let mut out = [1i16; 128];
    assert_eq!(reader.read_i16(&mut out).unwrap(), 56);
    assert!(out[..56].iter().all(|&s| s == 0));
}

/// Stereo interleaved encode lays out one 2048-byte chunk per channel
/// and the decoded output approximates the input in L,R order
#[test]
fn test_stereo_interleaved_ramp() {
    let mut pcm = Vec::with_capacity(256);
    for i in 0..128i32 {
        pcm.push((i * 50) as i16);
        pcm.push((i * 50 + 25) as i16);
    }
    let bytes = encode_interleaved(&pcm, 22050, 2, 2048, false);

    assert_eq!(&bytes[0..4], b"VAGi");
    // one chunk of 2048 bytes per channel
    assert_eq!(bytes.len(), PAYLOAD_START + 4096);
    assert_eq!(&bytes[12..16], &[0x00, 0x00, 0x08, 0x00]);

    let mut reader = VagReader::new(Cursor::new(bytes)).unwrap();
    assert!(reader.interleaved());
    assert_eq!(reader.chunk_size(), 2048);
    assert_eq!(reader.channels(), 2);
    assert_eq!(reader.total_samples(), 3584);

    let mut out = vec![0i16; 8192];
    let count = reader.read_i16(&mut out).unwrap();
    assert_eq!(count, 7168);
    for i in 0..128usize {
        let left = i32::from(out[2 * i]);
        let right = i32::from(out[2 * i + 1]);
        let want_left = i as i32 * 50;
        let want_right = i as i32 * 50 + 25;
        assert!(
            (left - want_left).abs() <= 64,
            "left sample {} off: {} vs {}",
            i,
            left,
            want_left
        );
        assert!(
            (right - want_right).abs() <= 64,
            "right sample {} off: {} vs {}",
            i,
            right,
            want_right
        );
    }
}

/// With streaming loop flags, every chunk's last frame carries both
/// end and repeat bits, including the stream's final chunk
#[test]
fn test_streaming_loop_flags_single_chunk() {
    let bytes = encode_interleaved(&[0i16; 300], 44100, 1, 2048, true);

    assert_eq!(bytes.len(), PAYLOAD_START + 2048);
    assert_eq!(&bytes[12..16], &[0x00, 0x00, 0x08, 0x00]);

    let payload = &bytes[PAYLOAD_START..];
    for frame in 0..127 {
        assert_eq!(payload[frame * 16 + 1], 0x00, "frame {}", frame);
    }
    assert_eq!(payload[127 * 16 + 1], 0x03);
}

/// Across multiple chunks, loop mode stamps every chunk boundary;
/// without it only the stream's final frame is flagged
#[test]
fn test_chunk_boundary_flags_multi_chunk() {
    // 4000 samples > one chunk's 3584, so two chunks
    let looped = encode_interleaved(&[0i16; 4000], 44100, 1, 2048, true);
    assert_eq!(looped.len(), PAYLOAD_START + 4096);
    let payload = &looped[PAYLOAD_START..];
    assert_eq!(payload[127 * 16 + 1], 0x03);
    assert_eq!(payload[2048 + 127 * 16 + 1], 0x03);

    let plain = encode_interleaved(&[0i16; 4000], 44100, 1, 2048, false);
    let payload = &plain[PAYLOAD_START..];
    assert_eq!(payload[127 * 16 + 1], 0x00);
    assert_eq!(payload[2048 + 127 * 16 + 1], 0x01);
}

/// A loop-flagged stream never carries the bare end flag, so decode
/// runs to the header's data length
#[test]
fn test_loop_flagged_stream_decodes_fully() {
    let bytes = encode_interleaved(&[0i16; 300], 44100, 1, 2048, true);
    let mut reader = VagReader::new(Cursor::new(bytes)).unwrap();
    let mut out = vec![1i16; 4096];
    assert_eq!(reader.read_i16(&mut out).unwrap(), 3584);
    assert_eq!(reader.read_i16(&mut out).unwrap(), 0);
}

/// Unknown magic fails construction
#[test]
fn test_bad_magic_rejected() {
    let mut data = vec![0u8; 4096];
    data[0..4].copy_from_slice(b"FOOB");
    let result = VagReader::new(Cursor::new(data));
    assert!(matches!(result, Err(Error::BadMagic { found }) if &found == b"FOOB"));
}

/// A payload too short for a single frame reads as end of stream, not
/// as an error
#[test]
fn test_truncated_frame_reads_as_end_of_stream() {
    let mut data = Vec::new();
    data.extend_from_slice(b"VAGp");
    data.extend_from_slice(&0x20u32.to_be_bytes());
    data.extend_from_slice(&0u32.to_le_bytes());
    data.extend_from_slice(&0x200u32.to_be_bytes());
    data.extend_from_slice(&8000u32.to_be_bytes());
    data.resize(PAYLOAD_START, 0);
    data.extend_from_slice(&[0xAA; 10]);

    let mut reader = VagReader::new(Cursor::new(data)).unwrap();
    let mut out = [0i16; 64];
    assert_eq!(reader.read_i16(&mut out).unwrap(), 0);
    assert_eq!(reader.read_i16(&mut out).unwrap(), 0);
}

/// Non-interleaved payload length is ceil(N / 28) frames of 16 bytes
#[test]
fn test_contiguous_payload_length() {
    let bytes = encode_mono(&[100i16; 100], 8000);
    // 100 samples -> 4 frames -> 64 bytes
    assert_eq!(bytes.len(), PAYLOAD_START + 64);
    assert_eq!(&bytes[12..16], &[0x00, 0x00, 0x00, 0x40]);
}
