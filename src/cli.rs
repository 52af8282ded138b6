//! Command line front end: compress a bitmap into a compressed image file, and back.

use std::path::PathBuf;
use std::process;

use anyhow::Context;
use clap::{Parser, Subcommand, ValueHint};

use crate::{
    compress, container::CompressedImage, decompress, image_io::Grayscale,
    options::CompressionOptions,
};

const DEFAULT_LOSS_LEVEL: u32 = 8;

/// Wavelet and LZW grayscale image compressor.
#[derive(Parser, Debug)]
#[command(name = "wavelzw", version, arg_required_else_help = true)]
struct Cli {
    #[command(subcommand)]
    command: Cmd,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// Compress an image into a compressed image file.
    Compress(CompressArgs),
    /// Decompress a compressed image file into a grayscale BMP.
    Decompress(DecompressArgs),
}

#[derive(clap::Args, Debug)]
struct CompressArgs {
    /// 0 is lossless, higher levels trade quality for size. Levels above 64 behave like 64.
    #[arg(short = 'l', long, default_value_t = DEFAULT_LOSS_LEVEL)]
    loss_level: u32,

    /// Print sizes and the compression ratio.
    #[arg(short = 's', long)]
    stats: bool,

    /// Image to compress.
    #[arg(value_hint = ValueHint::FilePath)]
    input: PathBuf,

    /// Compressed file to write.
    #[arg(value_hint = ValueHint::FilePath)]
    output: PathBuf,
}

#[derive(clap::Args, Debug)]
struct DecompressArgs {
    /// Compressed file to read.
    #[arg(value_hint = ValueHint::FilePath)]
    input: PathBuf,

    /// BMP file to write.
    #[arg(value_hint = ValueHint::FilePath)]
    output: PathBuf,
}

/// Sizes reported by `compress --stats`.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Stats {
    original: usize,
    payload: usize,
    header: usize,
}

impl Stats {
    fn ratio(&self) -> f64 {
        if self.original == 0 {
            return 0.0;
        }
        (self.payload + self.header) as f64 / self.original as f64
    }

    fn print(&self) {
        println!("original size:   {} bytes", self.original);
        println!("compressed size: {} bytes", self.payload);
        println!("header size:     {} bytes", self.header);
        println!("ratio:           {:.4}", self.ratio());
    }
}

fn cmd_compress(args: &CompressArgs) -> anyhow::Result<()> {
    let image = Grayscale::open(&args.input)
        .with_context(|| format!("cannot read image {}", args.input.display()))?;

    let options = CompressionOptions::from_loss_level(args.loss_level);
    log::info!("compressing with {options:?}");
    let compressed = compress(&image.pixels, image.width, image.height, options)?;

    compressed
        .save(&args.output)
        .with_context(|| format!("cannot write {}", args.output.display()))?;

    if args.stats {
        Stats {
            original: image.pixels.len(),
            payload: compressed.payload.len(),
            header: compressed.file_size() - compressed.payload.len(),
        }
        .print();
    }

    Ok(())
}

fn cmd_decompress(args: &DecompressArgs) -> anyhow::Result<()> {
    let compressed = CompressedImage::load(&args.input)
        .with_context(|| format!("cannot read {}", args.input.display()))?;

    let image = Grayscale {
        width: compressed.width,
        height: compressed.height,
        pixels: decompress(&compressed)?,
    };

    image
        .save_bmp(&args.output)
        .with_context(|| format!("cannot write image {}", args.output.display()))?;

    Ok(())
}

/// Parses the command line, runs the command and exits.
pub fn run() -> ! {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
        .format_timestamp(None)
        .format_target(false)
        .init();

    let cli = Cli::parse();
    let result = match &cli.command {
        Cmd::Compress(args) => cmd_compress(args),
        Cmd::Decompress(args) => cmd_decompress(args),
    };

    match result {
        Ok(()) => process::exit(0),
        Err(error) => {
            eprintln!("error: {error:#}");
            process::exit(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn compress_defaults() {
        let cli = Cli::try_parse_from(["wavelzw", "compress", "in.bmp", "out.wlz"]).unwrap();
        let Cmd::Compress(args) = cli.command else {
            panic!("expected compress");
        };

        assert_eq!(args.loss_level, DEFAULT_LOSS_LEVEL);
        assert!(!args.stats);
        assert_eq!(args.input, PathBuf::from("in.bmp"));
        assert_eq!(args.output, PathBuf::from("out.wlz"));
    }

    #[test]
    fn compress_flags() {
        let cli =
            Cli::try_parse_from(["wavelzw", "compress", "-l", "0", "--stats", "a", "b"]).unwrap();
        let Cmd::Compress(args) = cli.command else {
            panic!("expected compress");
        };

        assert_eq!(args.loss_level, 0);
        assert!(args.stats);
    }

    #[test]
    fn missing_paths_are_rejected() {
        assert!(Cli::try_parse_from(["wavelzw", "decompress", "only-input"]).is_err());
    }

    #[test]
    fn ratio() {
        let stats = Stats {
            original: 1000,
            payload: 457,
            header: 43,
        };
        assert_eq!(stats.ratio(), 0.5);

        let empty = Stats {
            original: 0,
            payload: 2,
            header: 43,
        };
        assert_eq!(empty.ratio(), 0.0);
    }
}
