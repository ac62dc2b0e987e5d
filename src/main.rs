#![warn(clippy::all, rust_2018_idioms)]
#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")] // hide console window on Windows in release

#[cfg(not(target_arch = "wasm32"))]
use pixel_gene::{EditorConfig, PaintApp};

// When compiling natively:
#[cfg(not(target_arch = "wasm32"))]
fn main() -> eframe::Result {
    env_logger::init(); // Log to stderr (if you run with `RUST_LOG=debug`).

    // An optional JSON config path overrides the config saved by the last session.
    let config = match std::env::args().nth(1) {
        Some(path) => match EditorConfig::load(&path) {
            Ok(config) => Some(config),
            Err(err) => {
                log::error!("Ignoring config {path}: {err}");
                None
            }
        },
        None => None,
    };

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1000.0, 720.0])
            .with_min_inner_size([400.0, 300.0]),
        ..Default::default()
    };
    eframe::run_native(
        "pixel-gene",
        native_options,
        Box::new(|cc| Ok(Box::new(PaintApp::new(cc, config)))),
    )
}

#[cfg(target_arch = "wasm32")]
fn main() {}
