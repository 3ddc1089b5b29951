//! Decrypts a v1 volume into a plain page image.

use std::fs::File;
use std::io::{self, BufWriter};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use easel::{PageStore, VolumeReader};

/// Decrypt a user-saved document into its plaintext page image.
#[derive(Parser)]
#[command(version, about)]
struct Args {
    /// Encrypted input document.
    input: PathBuf,
    /// Destination for the decrypted image.
    output: PathBuf,
}

fn run(args: &Args) -> Result<(), Box<dyn std::error::Error>> {
    let store = PageStore::open(&args.input)?;
    let mut reader = VolumeReader::new(store);
    let mut output = BufWriter::new(File::create(&args.output)?);
    let written = io::copy(&mut reader, &mut output)?;
    println!("{}: wrote {} bytes", args.output.display(), written);
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
