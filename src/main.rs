use eframe::egui;
use glaze::app::GlazeApp;
use glaze::feed::{self, DocumentFeed};
use std::path::PathBuf;
use std::sync::mpsc;

const DEFAULT_DOCUMENT: &str = "canvas.json";

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    match args.first().map(String::as_str) {
        Some("export") => export(&args[1..]),
        Some("--help" | "-h") => {
            print_usage();
            Ok(())
        }
        _ => view(args.first().map(PathBuf::from)),
    }
}

fn print_usage() {
    println!("usage: glaze [document.json]");
    println!("       glaze export <document.json> [--name <Component>] [--out <file.rs>]");
}

/// Renders a standalone program for `document` and writes it next to the
/// document (or to the given output path).
fn export(args: &[String]) -> Result<(), Box<dyn std::error::Error>> {
    let mut document_path: Option<PathBuf> = None;
    let mut name: Option<String> = None;
    let mut out_path: Option<PathBuf> = None;

    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--name" => name = iter.next().cloned(),
            "--out" => out_path = iter.next().map(PathBuf::from),
            other => document_path = Some(PathBuf::from(other)),
        }
    }

    let Some(document_path) = document_path else {
        print_usage();
        return Err("export needs a document path".into());
    };
    let document = feed::read_document(&document_path)?;

    let name = name.unwrap_or_else(|| {
        document_path
            .file_stem()
            .and_then(|stem| stem.to_str())
            .unwrap_or("canvas")
            .to_string()
    });
    let out_path = out_path
        .unwrap_or_else(|| document_path.with_file_name(format!("{name}_export.rs")));

    let source = glaze::emit_source(&document, &name);
    std::fs::write(&out_path, source)?;
    println!("exported {} to {}", document_path.display(), out_path.display());
    Ok(())
}

fn view(path: Option<PathBuf>) -> Result<(), Box<dyn std::error::Error>> {
    let document_path = path.unwrap_or_else(|| PathBuf::from(DEFAULT_DOCUMENT));
    let (tx, rx) = mpsc::channel();

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .thread_name("glaze-runtime")
        .build()?;
    let _enter = runtime.enter();

    let feed = DocumentFeed::new(document_path.clone(), tx);
    feed.start();

    let app = GlazeApp::new(rx, document_path);

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1024.0, 768.0])
            .with_min_inner_size([800.0, 560.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Glaze",
        native_options,
        Box::new(move |_creation_context| Ok(Box::new(app))),
    )?;

    Ok(())
}
