mod app;
mod cache;
mod controller;
mod filename;
mod index;
mod launch;
mod renderer;
mod resolver;

use std::process::ExitCode;

use clap::Parser;

use crate::index::ParameterIndex;
use crate::launch::{resolve_directory, LaunchArgs};

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args = LaunchArgs::parse();
    let directory = match resolve_directory(&args.directory) {
        Ok(directory) => directory,
        Err(err) => {
            eprintln!("{err}");
            return ExitCode::FAILURE;
        }
    };

    let index = match ParameterIndex::build(&directory) {
        Ok(index) => index,
        Err(err) => {
            eprintln!("{err}");
            return ExitCode::FAILURE;
        }
    };

    let native_options = eframe::NativeOptions {
        viewport: eframe::egui::ViewportBuilder::default()
            .with_title(app::window_title(&directory))
            .with_inner_size([1100.0, 720.0])
            .with_resizable(true),
        ..Default::default()
    };

    let result = eframe::run_native(
        app::APP_TITLE,
        native_options,
        Box::new(move |_cc| Ok(Box::new(app::NdPlotApp::new(index)))),
    );
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("Viewer failed: {err}");
            eprintln!("Viewer failed: {err}");
            ExitCode::FAILURE
        }
    }
}
