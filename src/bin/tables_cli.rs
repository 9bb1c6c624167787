//! CLI tool for express_tables - lays out a table into an in-memory document
//! and prints the resulting scene as JSON
//!
//! Usage:
//!   tables_cli <spec.json>                      # Scene JSON to stdout
//!   tables_cli <spec.json> -o scene.json        # Scene JSON to file
//!   tables_cli <spec.json> --canvas 600x800     # Page size (default 1080x1080)
//!
//! Set `RUST_LOG=express_tables=debug` to trace measurement and wrapping.

#![allow(clippy::exit)]
#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::indexing_slicing)]

use std::env;
use std::fs;
use std::io::{self, Write};

use express_tables::host::{DocumentQuery, MemoryDocument};
use express_tables::types::{Size, TableSpec};
use express_tables::TableSession;
use serde::Serialize;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Output<T: Serialize, S: Serialize> {
    table: T,
    scene: S,
}

fn parse_canvas(value: &str) -> Option<Size> {
    let (w, h) = value.split_once('x')?;
    Some(Size {
        width: w.trim().parse().ok()?,
        height: h.trim().parse().ok()?,
    })
}

fn fail(message: String) -> ! {
    eprintln!("{message}");
    std::process::exit(1);
}

fn main() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        fail("Usage: tables_cli <spec.json> [-o scene.json] [--canvas WxH]".to_string());
    }

    let input_path = &args[1];
    let mut output_path = None;
    let mut canvas = None;
    let mut rest = args[2..].iter();
    while let Some(flag) = rest.next() {
        match (flag.as_str(), rest.next()) {
            ("-o", Some(path)) => output_path = Some(path.clone()),
            ("--canvas", Some(value)) => match parse_canvas(value) {
                Some(size) => canvas = Some(size),
                None => fail(format!("Invalid canvas size: {value}")),
            },
            (other, _) => fail(format!("Unexpected argument: {other}")),
        }
    }

    let json = match fs::read_to_string(input_path) {
        Ok(j) => j,
        Err(e) => fail(format!("Error reading {input_path}: {e}")),
    };
    let spec: TableSpec = match serde_json::from_str(&json) {
        Ok(s) => s,
        Err(e) => fail(format!("Error parsing table spec: {e}")),
    };

    let doc = canvas.map_or_else(MemoryDocument::new, MemoryDocument::with_canvas);
    let mut session = match TableSession::with_defaults(doc) {
        Ok(s) => s,
        Err(e) => fail(format!("Error creating session: {e}")),
    };
    let table = match session.create_table(&spec) {
        Ok(t) => t,
        Err(e) => fail(format!("Error creating table: {e}")),
    };

    let doc = session.host();
    let artboard = doc.insertion_parent().unwrap();
    let output = Output {
        table: &table,
        scene: doc.scene(&artboard),
    };
    let json = match serde_json::to_string_pretty(&output) {
        Ok(j) => j,
        Err(e) => fail(format!("Error serializing JSON: {e}")),
    };

    match output_path {
        Some(path) => {
            if let Err(e) = fs::write(&path, &json) {
                fail(format!("Error writing {path}: {e}"));
            }
            eprintln!("Written: {path}");
        }
        None => {
            io::stdout().write_all(json.as_bytes()).unwrap();
            println!();
        }
    }
}
