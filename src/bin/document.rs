//! Prints a summary of each document: canvas, thumbnail, layer tables.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use serde::Serialize;

use easel::Document;

/// Summarize canvas and layer metadata of v1 documents.
#[derive(Parser)]
#[command(version, about)]
struct Args {
    /// Input documents.
    #[arg(required = true)]
    inputs: Vec<PathBuf>,
    /// Emit a JSON summary instead of text.
    #[arg(long)]
    json: bool,
}

#[derive(Serialize)]
struct LayerSummary {
    name: String,
    size: usize,
    timestamp: i64,
}

#[derive(Serialize)]
struct DocumentSummary {
    path: String,
    alignment: u32,
    width: u32,
    height: u32,
    thumbnail: Option<(u32, u32)>,
    layers: Vec<LayerSummary>,
    sublayers: Vec<LayerSummary>,
}

fn summarize(path: &PathBuf) -> Result<DocumentSummary, Box<dyn std::error::Error>> {
    let document = Document::open(path)?;
    let canvas = document.canvas_info()?;
    let thumbnail = document
        .thumbnail()
        .ok()
        .map(|thumb| (thumb.width, thumb.height));

    let mut layers = Vec::new();
    document.iterate_layer_files(|layer| {
        layers.push(LayerSummary {
            name: layer.name().into_owned(),
            size: layer.size(),
            timestamp: layer.timestamp_unix(),
        });
        true
    })?;

    let mut sublayers = Vec::new();
    // Not every document carries a sublayer table.
    if document.vfs().exists("subtbl") {
        document.iterate_sublayer_files(|sublayer| {
            sublayers.push(LayerSummary {
                name: sublayer.name().into_owned(),
                size: sublayer.size(),
                timestamp: sublayer.timestamp_unix(),
            });
            true
        })?;
    }

    Ok(DocumentSummary {
        path: path.display().to_string(),
        alignment: canvas.alignment,
        width: canvas.width,
        height: canvas.height,
        thumbnail,
        layers,
        sublayers,
    })
}

fn print_text(summary: &DocumentSummary) {
    println!("{}", summary.path);
    println!("  canvas: {}x{}", summary.width, summary.height);
    match summary.thumbnail {
        Some((width, height)) => println!("  thumbnail: {width}x{height}"),
        None => println!("  thumbnail: none"),
    }
    println!("  layers: {}", summary.layers.len());
    for layer in &summary.layers {
        println!(
            "    {} ({} bytes, ts {})",
            layer.name, layer.size, layer.timestamp
        );
    }
    if !summary.sublayers.is_empty() {
        println!("  sublayers: {}", summary.sublayers.len());
        for sublayer in &summary.sublayers {
            println!(
                "    {} ({} bytes, ts {})",
                sublayer.name, sublayer.size, sublayer.timestamp
            );
        }
    }
}

fn main() -> ExitCode {
    easel::init_tracing();
    let args = Args::parse();

    let mut status = ExitCode::SUCCESS;
    let mut summaries = Vec::new();
    for input in &args.inputs {
        match summarize(input) {
            Ok(summary) => summaries.push(summary),
            Err(err) => {
                eprintln!("error: {}: {err}", input.display());
                status = ExitCode::FAILURE;
            }
        }
    }

    if args.json {
        match serde_json::to_string_pretty(&summaries) {
            Ok(json) => println!("{json}"),
            Err(err) => {
                eprintln!("error: {err}");
                status = ExitCode::FAILURE;
            }
        }
    } else {
        for summary in &summaries {
            print_text(summary);
        }
    }
    status
}
