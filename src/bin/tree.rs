//! Lists the directory tree of v1 documents.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use serde::Serialize;

use easel::{FileEntry, VfsVisitor, VirtualFileSystem};

/// Print the virtual file system tree of v1 documents.
#[derive(Parser)]
#[command(version, about)]
struct Args {
    /// Input documents.
    #[arg(required = true)]
    inputs: Vec<PathBuf>,
    /// Emit the tree as JSON instead of text.
    #[arg(long)]
    json: bool,
}

#[derive(Serialize)]
struct Node {
    name: String,
    #[serde(rename = "type")]
    kind: &'static str,
    size: usize,
    timestamp: i64,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    children: Vec<Node>,
}

impl Node {
    fn from_entry(entry: &FileEntry, kind: &'static str) -> Self {
        Node {
            name: entry.name().into_owned(),
            kind,
            size: entry.size(),
            timestamp: entry.timestamp_unix(),
            children: Vec::new(),
        }
    }
}

/// Collects the tree into nested nodes; the root level is the stack bottom.
struct TreeCollector {
    stack: Vec<Vec<Node>>,
}

impl TreeCollector {
    fn new() -> Self {
        TreeCollector {
            stack: vec![Vec::new()],
        }
    }

    fn finish(mut self) -> Vec<Node> {
        self.stack.pop().unwrap_or_default()
    }
}

impl VfsVisitor for TreeCollector {
    fn folder_begin(&mut self, entry: &mut FileEntry) -> bool {
        self.stack.push(Vec::new());
        self.stack
            .iter_mut()
            .rev()
            .nth(1)
            .expect("parent level")
            .push(Node::from_entry(entry, "folder"));
        true
    }

    fn folder_end(&mut self, _entry: &mut FileEntry) -> bool {
        let children = self.stack.pop().expect("folder level");
        let parent = self.stack.last_mut().expect("parent level");
        if let Some(folder) = parent.last_mut() {
            folder.children = children;
        }
        true
    }

    fn file(&mut self, entry: &mut FileEntry) -> bool {
        self.stack
            .last_mut()
            .expect("current level")
            .push(Node::from_entry(entry, "file"));
        true
    }
}

fn print_nodes(nodes: &[Node], depth: usize) {
    for node in nodes {
        let indent = "  ".repeat(depth);
        match node.kind {
            "folder" => {
                println!("{indent}{}/", node.name);
                print_nodes(&node.children, depth + 1);
            }
            _ => println!(
                "{indent}{} ({} bytes, ts {})",
                node.name, node.size, node.timestamp
            ),
        }
    }
}

fn run(input: &PathBuf, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let vfs = VirtualFileSystem::open(input)?;
    let mut collector = TreeCollector::new();
    vfs.iterate(&mut collector)?;
    let nodes = collector.finish();

    if json {
        println!("{}", serde_json::to_string_pretty(&nodes)?);
    } else {
        println!("{}", input.display());
        print_nodes(&nodes, 1);
    }
    Ok(())
}

fn main() -> ExitCode {
    easel::init_tracing();
    let args = Args::parse();

    let mut status = ExitCode::SUCCESS;
    for input in &args.inputs {
        if let Err(err) = run(input, args.json) {
            eprintln!("error: {}: {err}", input.display());
            status = ExitCode::FAILURE;
        }
    }
    status
}
