//! wav2vag - convert WAV audio to PSX VAG

use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;

use anyhow::bail;
use clap::Parser;
use vagaudio::{VagWriter, VagWriterConfig};

#[derive(Parser)]
#[command(name = "wav2vag")]
#[command(about = "Convert WAV audio to PSX VAG", long_about = None)]
#[command(version)]
struct Cli {
    /// Input WAV file (16-bit integer PCM)
    input: PathBuf,

    /// Print stream information
    #[arg(short, long)]
    verbose: bool,

    /// Write an interleaved VAGi stream
    #[arg(short, long)]
    interleaved: bool,

    /// Tag every chunk's last frame with the streaming loop flags
    #[arg(short = 'l', long)]
    loop_flags: bool,

    /// Interleave chunk size in bytes (multiple of 2048)
    #[arg(short = 'c', long, default_value_t = 2048)]
    chunk_size: u32,

    /// Output path (defaults to the input path with a .vag extension)
    #[arg(short, long)]
    output: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt().with_env_filter(level).init();

    let mut wav = hound::WavReader::open(&cli.input)?;
    let spec = wav.spec();
    if spec.sample_format != hound::SampleFormat::Int || spec.bits_per_sample != 16 {
        bail!(
            "only 16-bit integer PCM input is supported, got {}-bit {:?}",
            spec.bits_per_sample,
            spec.sample_format
        );
    }
    let samples: Vec<i16> = wav.samples::<i16>().collect::<Result<_, _>>()?;

    if cli.verbose {
        println!("Sample rate:   {} Hz", spec.sample_rate);
        println!("Channels:      {}", spec.channels);
        println!(
            "Total samples: {} per channel",
            samples.len() / spec.channels as usize
        );
    }

    let config = VagWriterConfig {
        interleaved: cli.interleaved,
        streaming_loop_flags: cli.loop_flags,
        sample_rate: spec.sample_rate,
        channels: spec.channels,
        chunk_size: if cli.interleaved { cli.chunk_size } else { 0 },
    };
    let output = cli
        .output
        .unwrap_or_else(|| cli.input.with_extension("vag"));
    let file = File::create(&output)?;
    let mut writer = VagWriter::with_config(config, BufWriter::new(file))?;
    writer.append_i16(&samples)?;
    writer.finalize()?;

    if cli.verbose {
        println!("Wrote {}", output.display());
    }
    Ok(())
}
