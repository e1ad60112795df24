use eframe::egui;

use cre_dashboard::forecast::PanelStatus;

use crate::state::{AppState, Tab};
use crate::ui::{panels, plot, table};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct CreDashboardApp {
    pub state: AppState,
}

impl CreDashboardApp {
    pub fn new(state: AppState) -> Self {
        Self { state }
    }
}

impl eframe::App for CreDashboardApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: menu bar + summary ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: controls ----
        egui::SidePanel::left("control_panel")
            .default_width(260.0)
            .resizable(true)
            .show(ctx, |ui| {
                ui.heading("CRE Dashboard");
                ui.label("Forecast Overview");
                ui.separator();
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Central panel: charts ----
        egui::CentralPanel::default().show(ctx, |ui| {
            ui.horizontal(|ui| {
                for tab in Tab::ALL {
                    ui.selectable_value(&mut self.state.tab, tab, tab.title());
                }
            });
            ui.separator();

            match self.state.tab {
                Tab::TimeSeries => plot::time_series_plot(ui, &self.state),
                Tab::FullHistory => plot::full_history_plot(ui, &self.state),
                Tab::Table => table::data_table(ui, &self.state),
                Tab::Aggregate => {
                    plot::unavailable_panel(ui, "Aggregate", &PanelStatus::NotYetAvailable)
                }
                Tab::Pie => plot::unavailable_panel(ui, "Pie", &PanelStatus::NotYetAvailable),
            }
        });
    }
}
