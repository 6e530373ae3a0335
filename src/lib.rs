pub mod commands;
pub mod core;
pub mod jotter;
pub mod providers;
pub mod security;

use jotter::{
    extraction::ExtractionAdapter,
    orchestrator::{JotterConfig, JotterEngine},
    recognition::RecognitionAdapter,
};
use providers::{gemini::GeminiClient, handwriting::HandwritingClient};
use tauri::Manager;

fn log_level_from_env() -> tauri_plugin_log::log::LevelFilter {
    match std::env::var("SMART_JOTTER_LOG")
        .unwrap_or_else(|_| "info".to_string())
        .to_ascii_lowercase()
        .as_str()
    {
        "trace" => tauri_plugin_log::log::LevelFilter::Trace,
        "debug" => tauri_plugin_log::log::LevelFilter::Debug,
        "warn" => tauri_plugin_log::log::LevelFilter::Warn,
        "error" => tauri_plugin_log::log::LevelFilter::Error,
        _ => tauri_plugin_log::log::LevelFilter::Info,
    }
}

#[derive(Clone)]
pub struct AppState {
    pub engine: JotterEngine,
}

#[cfg_attr(mobile, tauri::mobile_entry_point)]
pub fn run() {
    let log_builder = tauri_plugin_log::Builder::default().level(log_level_from_env());

    tauri::Builder::default()
        .plugin(log_builder.build())
        .setup(|app| {
            let handwriting = HandwritingClient::new()
                .map_err(|err| std::io::Error::other(err.to_string()))?;
            let gemini = GeminiClient::new("gemini-2.0-flash")
                .map_err(|err| std::io::Error::other(err.to_string()))?;
            let engine = JotterEngine::new(
                JotterConfig::default(),
                RecognitionAdapter::new(handwriting),
                ExtractionAdapter::new(gemini),
            );
            app.manage(AppState { engine });
            Ok(())
        })
        .invoke_handler(tauri::generate_handler![
            commands::settings::set_provider_key,
            commands::settings::provider_status,
            commands::capture::open_jotter,
            commands::capture::get_session,
            commands::capture::close_jotter,
            commands::capture::set_input_mode,
            commands::capture::update_text,
            commands::capture::update_drawing,
            commands::capture::undo_last_stroke,
            commands::capture::clear_drawing,
            commands::capture::submit_input,
            commands::review::begin_edit,
            commands::review::save_edit,
            commands::review::cancel_edit,
            commands::review::edit_input,
            commands::review::start_over,
            commands::review::create_booking,
            commands::review::create_estimate,
        ])
        .run(tauri::generate_context!())
        .expect("error while running tauri application");
}
