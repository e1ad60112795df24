use eframe::egui::{Align, Layout, Ui};
use egui_extras::{Column, TableBuilder};

use crate::state::{AppState, ViewState};

/// Derived table in data units, one row per period.
pub fn data_table(ui: &mut Ui, state: &AppState) {
    let derived = match &state.view {
        ViewState::Ready { derived, .. } => derived,
        ViewState::Unavailable(msg) => {
            ui.heading(msg);
            return;
        }
    };

    if derived.is_empty() {
        ui.label("No rows.");
        return;
    }

    TableBuilder::new(ui)
        .striped(true)
        .resizable(true)
        .cell_layout(Layout::right_to_left(Align::Center))
        .column(Column::auto().at_least(80.0))
        .columns(Column::auto().at_least(90.0), derived.width())
        .header(22.0, |mut header| {
            header.col(|ui| {
                ui.strong("Period");
            });
            for col in derived.columns() {
                header.col(|ui| {
                    ui.strong(state.registry.label(&col.name));
                });
            }
        })
        .body(|body| {
            body.rows(18.0, derived.len(), |mut row| {
                let i = row.index();
                row.col(|ui| {
                    ui.monospace(derived.periods()[i].to_string());
                });
                for col in derived.columns() {
                    row.col(|ui| match col.values[i] {
                        Some(v) => {
                            ui.monospace(format!("{v:.4}"));
                        }
                        None => {
                            ui.weak("–");
                        }
                    });
                }
            });
        });
}
