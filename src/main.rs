mod app;
mod color;
mod state;
mod ui;

use anyhow::{Context, Result};
use app::CreDashboardApp;
use cre_dashboard::config::DashboardConfig;
use eframe::egui;
use state::AppState;

fn main() -> Result<()> {
    env_logger::init();

    let config = DashboardConfig::from_env();

    // No data, no dashboard: loader errors end the process here.
    let table = cre_dashboard::load_file(&config.data_path, &config.index_column)
        .with_context(|| format!("loading {}", config.data_path.display()))
        .inspect_err(|e| log::error!("{e:#}"))?;
    let registry = config.load_registry(&table)?;
    log::info!(
        "{} variables registered, pipeline options {:?}, display scales {:?}",
        registry.len(),
        config.pipeline,
        config.scales
    );

    let state = AppState::new(config, table, registry);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 800.0])
            .with_min_inner_size([800.0, 500.0]),
        ..Default::default()
    };

    eframe::run_native(
        "CRE Forecast",
        options,
        Box::new(|_cc| Ok(Box::new(CreDashboardApp::new(state)))),
    )
    .map_err(|e| anyhow::anyhow!("{e}"))
}
