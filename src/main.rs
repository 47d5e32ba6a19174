mod app;
mod cli;
mod dialogs;

use std::process::ExitCode;

use app::PixelFEApp;
use eframe::egui;
use pixelfe::{CanvasController, EditorSettings, logger};

fn main() -> ExitCode {
    // -- CLI / headless mode ---------------------------------------------
    if cli::CliArgs::is_cli_mode() {
        use clap::Parser;
        let args = cli::CliArgs::parse();
        logger::init_stderr(args.verbose);
        return cli::run(args);
    }

    // -- GUI mode -----------------------------------------------------
    let settings = EditorSettings::load();

    // Initialize session log (overwrites previous session log)
    logger::init(settings.debug_logging);

    let controller = match CanvasController::with_settings(&settings) {
        Ok(controller) => controller,
        Err(e) => {
            tracing::error!("cannot create start-up canvas: {}", e);
            eprintln!("error: cannot create start-up canvas: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([800.0, 600.0])
            .with_title("PixelFE"),
        ..Default::default()
    };

    let result = eframe::run_native(
        "PixelFE",
        options,
        Box::new(move |cc| Box::new(PixelFEApp::new(cc, controller, settings))),
    );
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("event loop failed: {}", e);
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}
