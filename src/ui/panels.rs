use eframe::egui::{self, Color32, RichText, ScrollArea, Slider, Ui};

use cre_dashboard::data::filter::DifferencingOrder;
use cre_dashboard::forecast::{PanelStatus, SignificanceLevel, MAX_OBS_TO_PREDICT, MAX_OBS_TO_TEST};

use crate::state::AppState;

// ---------------------------------------------------------------------------
// Left side panel – filter and forecast controls
// ---------------------------------------------------------------------------

/// Render the left control panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            year_controls(ui, state);
            ui.separator();
            variable_controls(ui, state);
            ui.separator();
            differencing_controls(ui, state);
            ui.separator();
            forecast_controls(ui, state);
        });
}

fn year_controls(ui: &mut Ui, state: &mut AppState) {
    ui.strong("Filter by year");
    let (min, max) = state.year_bounds();
    let (mut start, mut end) = state.year_range;

    let mut changed = false;
    changed |= ui.add(Slider::new(&mut start, min..=max).text("from")).changed();
    changed |= ui.add(Slider::new(&mut end, min..=max).text("to")).changed();
    if changed {
        state.set_year_range(start, end);
    }
}

fn variable_controls(ui: &mut Ui, state: &mut AppState) {
    let n_selected = state.selected.len();
    let n_total = state.registry.len();
    ui.strong(format!("Plot time series  ({n_selected}/{n_total})"));

    ui.horizontal(|ui: &mut Ui| {
        if ui.small_button("All").clicked() {
            state.select_all();
        }
        if ui.small_button("None").clicked() {
            state.select_none();
        }
    });

    let variables = state.registry.variables().to_vec();
    for var in &variables {
        let mut checked = state.selected.contains(&var.key);
        let text = RichText::new(&var.label).color(state.colors.color_for(&var.key));
        if ui.checkbox(&mut checked, text).changed() {
            state.toggle_variable(&var.key);
        }
    }
}

fn differencing_controls(ui: &mut Ui, state: &mut AppState) {
    ui.strong("Series transformations");
    let mut order = state.order;
    ui.horizontal(|ui: &mut Ui| {
        for o in DifferencingOrder::ALL {
            ui.radio_value(&mut order, o, o.label());
        }
    });
    if order != state.order {
        state.set_order(order);
    }
}

fn forecast_controls(ui: &mut Ui, state: &mut AppState) {
    ui.strong("VAR/VECM parameters");

    let form = &mut state.forecast_form;
    ui.label("Number of obs to test");
    ui.add(Slider::new(&mut form.num_obs_to_test, 0..=MAX_OBS_TO_TEST));
    ui.label("Number of obs to predict");
    ui.add(Slider::new(&mut form.num_obs_to_predict, 0..=MAX_OBS_TO_PREDICT));

    ui.label("Ignore COVID");
    ui.horizontal(|ui: &mut Ui| {
        ui.radio_value(&mut form.ignore_covid, true, "Yes");
        ui.radio_value(&mut form.ignore_covid, false, "No");
    });

    ui.label("Significance level of tests");
    ui.horizontal(|ui: &mut Ui| {
        for level in SignificanceLevel::ALL {
            ui.radio_value(&mut form.significance, level, level.to_string());
        }
    });

    if ui.button("Run VAR & VECM").clicked() {
        state.submit_forecast();
    }

    match &state.forecast {
        Some(Ok(status)) => {
            ui.label(format!("Run #{} – model: {}", status.submissions, status.model));
            ui.monospace(status.config.to_echo());
        }
        Some(Err(e)) => {
            ui.label(RichText::new(e.to_string()).color(Color32::RED));
        }
        None => {}
    }
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar with the summary tiles.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        ui.label(format!(
            "{} periods × {} variables loaded",
            state.table.len(),
            state.table.width()
        ));

        ui.separator();

        match state.visible_rows() {
            Some(n) => ui.label(RichText::new(format!("{n} rows shown")).strong()),
            None => ui.label(RichText::new("unable to render").color(Color32::RED)),
        };

        for years in 1..=3 {
            ui.separator();
            ui.label(format!(
                "CRE {years} year growth rate: {}",
                PanelStatus::NotYetAvailable
            ));
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialog
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open CRE time series")
        .add_filter(
            "Supported files",
            &["xlsx", "xlsm", "xls", "ods", "csv", "json", "parquet", "pq"],
        )
        .add_filter("Spreadsheet", &["xlsx", "xlsm", "xls", "ods"])
        .add_filter("CSV", &["csv"])
        .add_filter("JSON", &["json"])
        .add_filter("Parquet", &["parquet", "pq"])
        .pick_file();

    let Some(path) = file else {
        return;
    };

    let loaded = cre_dashboard::load_file(&path, &state.config.index_column)
        .map_err(anyhow::Error::from)
        .and_then(|table| {
            let registry = state.config.load_registry(&table)?;
            Ok((table, registry))
        });

    match loaded {
        Ok((table, registry)) => {
            log::info!(
                "Loaded {} periods with columns {:?}",
                table.len(),
                table.column_names()
            );
            state.set_dataset(table, registry);
        }
        Err(e) => {
            log::error!("Failed to load file: {e:#}");
            state.status_message = Some(format!("Error: {e:#}"));
        }
    }
}
