mod app;
mod config;
mod data;
mod error;
mod render;
mod state;
mod ui;

use app::ClimCoordsApp;
use config::AppConfig;
use eframe::egui;
use eframe::egui_wgpu;

fn main() -> eframe::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt::init();

    let config = AppConfig::load();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("climcoords")
            .with_inner_size([1280.0, 900.0])
            .with_min_inner_size([800.0, 600.0])
            .with_drag_and_drop(true),
        wgpu_options: egui_wgpu::WgpuConfiguration {
            present_mode: eframe::wgpu::PresentMode::AutoVsync,
            ..Default::default()
        },
        ..Default::default()
    };

    eframe::run_native(
        "climcoords",
        options,
        Box::new(|cc| Ok(Box::new(ClimCoordsApp::new(cc, config)))),
    )
}
