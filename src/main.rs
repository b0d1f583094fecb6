use clipboard_history_lib::shared::settings::AppSettings;

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let settings_path = match AppSettings::get_settings_path() {
        Ok(path) => Some(path),
        Err(e) => {
            log::warn!("Settings will not be saved: {}", e);
            None
        }
    };

    let settings = match &settings_path {
        Some(path) => AppSettings::load_from(path).await.unwrap_or_else(|e| {
            log::error!("Failed to load settings: {}", e);
            AppSettings::default()
        }),
        None => AppSettings::default(),
    };

    if let Err(e) = clipboard_history_lib::run(settings, settings_path).await {
        log::error!("Clipboard history service failed: {}", e);
        std::process::exit(1);
    }
}
