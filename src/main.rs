use std::path::PathBuf;

use eframe::egui;
use region_stats::app::RegionStatsApp;
use region_stats::config::DashboardConfig;
use region_stats::state::AppState;

fn main() -> anyhow::Result<()> {
    env_logger::init();

    // Optional argument: a data directory or a JSON config file.
    let arg = std::env::args_os().nth(1).map(PathBuf::from);
    let config = DashboardConfig::resolve(arg.as_deref())?;
    log::info!("Reading statistics from {}", config.data_dir.display());

    let state = AppState::new(config);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 860.0])
            .with_min_inner_size([700.0, 450.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Region Stats – Population & Wages",
        options,
        Box::new(move |_cc| Ok(Box::new(RegionStatsApp::new(state)))),
    )
    .map_err(|e| anyhow::anyhow!("failed to start the dashboard window: {e}"))
}
