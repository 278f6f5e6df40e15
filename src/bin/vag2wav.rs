//! vag2wav - convert PSX VAG audio to WAV

use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;

use clap::Parser;
use vagaudio::VagReader;

#[derive(Parser)]
#[command(name = "vag2wav")]
#[command(about = "Convert PSX VAG audio to WAV", long_about = None)]
#[command(version)]
struct Cli {
    /// Input VAG file
    input: PathBuf,

    /// Print stream information
    #[arg(short, long)]
    verbose: bool,

    /// Output path (defaults to the input path with a .wav extension)
    #[arg(short, long)]
    output: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt().with_env_filter(level).init();

    let file = File::open(&cli.input)?;
    let mut reader = VagReader::new(BufReader::new(file))?;

    if cli.verbose {
        println!("Sample rate:   {} Hz", reader.sample_rate());
        println!("Channels:      {}", reader.channels());
        println!("Total samples: {} per channel", reader.total_samples());
        println!("Duration:      {:.3} s", reader.duration_seconds());
        println!("Interleaved:   {}", reader.interleaved());
        println!("Chunk size:    {} bytes", reader.chunk_size());
    }

    let output = cli
        .output
        .unwrap_or_else(|| cli.input.with_extension("wav"));
    let spec = hound::WavSpec {
        channels: reader.channels(),
        sample_rate: reader.sample_rate(),
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut wav = hound::WavWriter::create(&output, spec)?;

    let mut buffer = vec![0i16; 4096 * reader.channels() as usize];
    loop {
        let count = reader.read_i16(&mut buffer)?;
        if count == 0 {
            break;
        }
        for &sample in &buffer[..count] {
            wav.write_sample(sample)?;
        }
    }
    wav.finalize()?;

    if cli.verbose {
        println!("Wrote {}", output.display());
    }
    Ok(())
}
