use chrono::{Datelike, NaiveDate};
use eframe::egui::{RichText, Ui};
use egui_plot::{GridMark, Legend, Line, Plot, PlotPoints};

use cre_dashboard::data::period::quarter_of;
use cre_dashboard::forecast::PanelStatus;
use cre_dashboard::TimeSeriesTable;

use crate::color::SeriesColors;
use crate::state::{AppState, ViewState};

// ---------------------------------------------------------------------------
// Time axis helpers
// ---------------------------------------------------------------------------

fn days_in_year(year: i32) -> f64 {
    if NaiveDate::from_ymd_opt(year, 2, 29).is_some() {
        366.0
    } else {
        365.0
    }
}

/// Position of a period on the x axis, in fractional years.
pub fn period_to_x(period: NaiveDate) -> f64 {
    period.year() as f64 + period.ordinal0() as f64 / days_in_year(period.year())
}

/// `YYYY-Qn` label for an x position.
pub fn x_to_quarter_label(x: f64) -> String {
    let year = x.floor() as i32;
    let days = days_in_year(year);
    let ordinal0 = ((x - x.floor()) * days).round().clamp(0.0, days - 1.0) as u32;
    match NaiveDate::from_yo_opt(year, ordinal0 + 1) {
        Some(d) => format!("{year}-Q{}", quarter_of(d)),
        None => format!("{x:.2}"),
    }
}

/// Split a column into runs of present values, one line each, so missing
/// periods show as gaps.
fn segments(periods: &[NaiveDate], values: &[Option<f64>]) -> Vec<Vec<[f64; 2]>> {
    let mut out = Vec::new();
    let mut current = Vec::new();
    for (p, v) in periods.iter().zip(values) {
        match v {
            Some(y) => current.push([period_to_x(*p), *y]),
            None if !current.is_empty() => out.push(std::mem::take(&mut current)),
            None => {}
        }
    }
    if !current.is_empty() {
        out.push(current);
    }
    out
}

// ---------------------------------------------------------------------------
// Charts (central panel)
// ---------------------------------------------------------------------------

/// Filtered, rescaled series for the current controls.
pub fn time_series_plot(ui: &mut Ui, state: &AppState) {
    let display = match &state.view {
        ViewState::Ready { display, .. } => display,
        ViewState::Unavailable(msg) => {
            centered_message(ui, msg);
            return;
        }
    };

    if display.width() == 0 {
        centered_message(ui, "Select at least one variable to plot.");
        return;
    }
    if display.is_empty() {
        centered_message(ui, "No periods in the selected year range.");
        return;
    }

    series_plot(ui, "time_series", display, state, &format!("Value ({})", state.order));
}

/// Every column of the loaded table, in levels, over its full span.
pub fn full_history_plot(ui: &mut Ui, state: &AppState) {
    if state.table.is_empty() {
        centered_message(ui, "The loaded table has no periods.");
        return;
    }
    series_plot(ui, "full_history", &state.table, state, "Level");
}

fn series_plot(ui: &mut Ui, id: &str, table: &TimeSeriesTable, state: &AppState, y_label: &str) {
    let colors: &SeriesColors = &state.colors;

    Plot::new(id)
        .legend(Legend::default())
        .x_axis_label("Quarter")
        .y_axis_label(y_label)
        .x_axis_formatter(|mark: GridMark, _range| x_to_quarter_label(mark.value))
        .label_formatter(|name, value| {
            if name.is_empty() {
                x_to_quarter_label(value.x)
            } else {
                format!("{name}\n{}: {:.4}", x_to_quarter_label(value.x), value.y)
            }
        })
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_scroll(true)
        .allow_zoom(true)
        .show(ui, |plot_ui| {
            for col in table.columns() {
                let name = state.registry.label(&col.name);
                let color = colors.color_for(&col.name);

                for points in segments(table.periods(), &col.values) {
                    let line = Line::new(PlotPoints::from(points))
                        .name(name)
                        .color(color)
                        .width(1.5);
                    plot_ui.line(line);
                }
            }
        });
}

/// Placeholder for a chart whose computation does not exist yet.
pub fn unavailable_panel(ui: &mut Ui, title: &str, status: &PanelStatus) {
    ui.centered_and_justified(|ui: &mut Ui| {
        ui.label(RichText::new(format!("{title}: {status}")).heading().weak());
    });
}

fn centered_message(ui: &mut Ui, msg: &str) {
    ui.centered_and_justified(|ui: &mut Ui| {
        ui.heading(msg);
    });
}
