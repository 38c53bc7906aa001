//! Prints a summary of a `.drawio` file.
//!
//! ```text
//! cargo run --example inspect -- diagram.drawio [--raw]
//! ```
//!
//! With `--raw` the document is re-encoded with an unpacked, indented page
//! body and printed. Set `RUST_LOG=trace` to see the pipeline.

use std::process;

use drawio::{Document, EncodeOptions};
use log::{error, info};

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut args = std::env::args().skip(1);
    let Some(path) = args.next() else {
        eprintln!("usage: inspect <file.drawio> [--raw]");
        process::exit(2);
    };
    let raw = args.any(|a| a == "--raw");

    let data = match std::fs::read(&path) {
        Ok(data) => data,
        Err(err) => {
            error!(path = path.as_str(), err:err; "Read failed");
            process::exit(1);
        }
    };
    info!(path = path.as_str(), len = data.len(); "Reading");

    let doc = match Document::load(&data) {
        Ok(doc) => doc,
        Err(err) => {
            error!(stage = err.stage().name(), err:err; "Decode failed");
            process::exit(1);
        }
    };

    let file = doc.file();
    println!("=== File ===");
    println!("Host:     {}", file.host);
    println!("Agent:    {}", file.agent);
    println!("Version:  {}", file.version);
    println!("Modified: {}", file.modified);
    println!("Etag:     {}", file.etag);

    let model = doc.model();
    println!("\n=== Page {:?} ({}) ===", file.page.name, file.page.id);
    println!("Size:      {} x {}", doc.width(), doc.height());
    println!("Grid size: {}", model.grid_size);
    println!("Cells:     {}", model.cells.len());
    println!("Vertices:  {}", model.vertices().count());
    println!("Edges:     {}", model.edges().count());

    println!("\n=== Cells ===");
    for cell in &model.cells {
        let role = match (cell.is_vertex(), cell.is_edge()) {
            (true, _) => "vertex",
            (_, true) => "edge",
            _ => "-",
        };
        print!("{:<24} {:<6} parent={}", cell.id, role, cell.parent.as_deref().unwrap_or("-"));
        if let (Some(source), Some(target)) = (&cell.source, &cell.target) {
            print!(" {source} -> {target}");
        }
        if let Some(g) = &cell.geometry {
            print!(" [{}, {}, {}x{}]", g.x, g.y, g.width, g.height);
        }
        if !cell.style.is_empty() {
            print!(" style={}", cell.style);
        }
        println!();
    }

    if raw {
        match doc.encode(&EncodeOptions::raw().with_indent("  ")) {
            Ok(bytes) => println!("\n{}", String::from_utf8_lossy(&bytes)),
            Err(err) => {
                error!(err:err; "Encode failed");
                process::exit(1);
            }
        }
    }
}
