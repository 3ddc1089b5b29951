//! Extracts a document thumbnail to PNG, for both container versions.

use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use easel::{sai2, Document, Thumbnail};

/// Extract the embedded thumbnail as a PNG.
#[derive(Parser)]
#[command(version, about)]
struct Args {
    /// Input document (v1 volume or v2 canvas file).
    input: PathBuf,
    /// Destination PNG.
    output: PathBuf,
}

fn extract(input: &PathBuf) -> Result<Thumbnail, Box<dyn std::error::Error>> {
    // v2 files are flat and start with a fixed identifier; everything else
    // goes through the paged reader.
    let data = fs::read(input)?;
    if data.len() >= 16 && data[..16] == sai2::CANVAS_IDENTIFIER {
        return Ok(sai2::extract_thumbnail(&data)?);
    }
    Ok(Document::open(input)?.thumbnail()?)
}

fn run(args: &Args) -> Result<(), Box<dyn std::error::Error>> {
    let thumbnail = extract(&args.input)?;
    easel::write_png(
        &args.output,
        &thumbnail.pixels,
        thumbnail.width,
        thumbnail.height,
    )?;
    println!(
        "{}: {}x{}",
        args.output.display(),
        thumbnail.width,
        thumbnail.height
    );
    Ok(())
}

fn main() -> ExitCode {
    easel::init_tracing();
    let args = Args::parse();
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}
