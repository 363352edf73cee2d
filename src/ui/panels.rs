use std::fmt::Display;

use campaign_dashboard::data::aggregate::{self, format_mean, format_percent};
use campaign_dashboard::{CategoricalField, Record};
use eframe::egui::{self, Color32, RichText, Ui};
use egui_extras::{Column, TableBuilder};

use crate::state::AppState;

// ---------------------------------------------------------------------------
// Left side panel – filter widgets
// ---------------------------------------------------------------------------

/// Render the left filter panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Filters");
    ui.separator();

    if state.dataset.is_none() {
        ui.label("No dataset loaded.");
        return;
    }

    for field in CategoricalField::ALL {
        filter_combo(ui, state, field);
        ui.add_space(6.0);
    }

    ui.separator();
    let constrained = !state.selection.is_unconstrained();
    if ui
        .add_enabled(constrained, egui::Button::new("Reset filters"))
        .clicked()
    {
        state.reset_filters();
    }
}

fn filter_label(field: CategoricalField) -> &'static str {
    match field {
        CategoricalField::Job => "Job",
        CategoricalField::Education => "Education",
        CategoricalField::Month => "Contact month",
    }
}

/// One selector: "All" followed by the sorted vocabulary of the field.
fn filter_combo(ui: &mut Ui, state: &mut AppState, field: CategoricalField) {
    let mut current = state.selection.get(field).map(str::to_owned);
    let selected_text = current.clone().unwrap_or_else(|| "All".to_owned());

    ui.strong(filter_label(field));
    egui::ComboBox::from_id_salt(field.column())
        .selected_text(selected_text)
        .width(ui.available_width())
        .show_ui(ui, |ui: &mut Ui| {
            ui.selectable_value(&mut current, None, RichText::new("All").italics());
            for value in state.choices.values(field) {
                ui.selectable_value(&mut current, Some(value.clone()), value.as_str());
            }
        });

    state.set_filter(field, current);
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        if let (Some(ds), Some(result)) = (&state.dataset, &state.result) {
            ui.label(format!(
                "{} contacts loaded, {} match the filters",
                ds.len(),
                result.headline.records
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
        .set_title("Open campaign data")
        .add_filter("Supported files", &["csv", "txt", "json", "parquet", "pq"])
        .add_filter("Delimited text", &["csv", "txt"])
        .add_filter("JSON", &["json"])
        .add_filter("Parquet", &["parquet", "pq"])
        .pick_file();

    if let Some(path) = file {
        state.open(&path);
    }
}

// ---------------------------------------------------------------------------
// KPI strips and data preview
// ---------------------------------------------------------------------------

fn kpi_card(ui: &mut Ui, label: &str, value: String) {
    egui::Frame::group(ui.style()).show(ui, |ui: &mut Ui| {
        ui.set_min_width(ui.available_width());
        ui.label(RichText::new(label).small());
        ui.label(RichText::new(value).size(22.0).strong());
    });
}

/// Global KPIs, the raw-data preview and the filtered KPIs.
pub fn kpi_section(ui: &mut Ui, state: &AppState) {
    let (Some(dataset), Some(global), Some(result)) =
        (&state.dataset, &state.global, &state.result)
    else {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("Open a campaign dataset to begin  (File → Open…)");
        });
        return;
    };

    ui.heading("Bank Marketing Campaign");
    ui.label(RichText::new(dataset.source()).weak());
    ui.add_space(4.0);

    ui.columns(4, |cols| {
        kpi_card(&mut cols[0], "Clients", global.records.to_string());
        kpi_card(&mut cols[1], "Average age", format_mean(global.avg_age, 1));
        kpi_card(
            &mut cols[2],
            "Average contact duration",
            with_unit(format_mean(global.avg_duration, 0), global.avg_duration, " s"),
        );
        kpi_card(&mut cols[3], "Subscription rate", format_percent(global.success_rate));
    });

    egui::CollapsingHeader::new(format!(
        "First {} rows of the data",
        state.config.preview_rows
    ))
    .default_open(false)
    .show(ui, |ui: &mut Ui| {
        preview_table(ui, aggregate::preview(dataset, state.config.preview_rows));
    });

    ui.add_space(8.0);
    ui.strong("Filtered view");
    let headline = &result.headline;
    ui.columns(4, |cols| {
        kpi_card(&mut cols[0], "Success rate", format_percent(headline.success_rate));
        kpi_card(
            &mut cols[1],
            "Average duration",
            with_unit(format_mean(headline.avg_duration, 0), headline.avg_duration, " s"),
        );
        kpi_card(
            &mut cols[2],
            "Employment var. rate",
            format_mean(headline.avg_emp_var_rate, 2),
        );
        kpi_card(
            &mut cols[3],
            "Consumer confidence",
            format_mean(headline.avg_cons_conf_idx, 1),
        );
    });
    ui.add_space(8.0);
}

fn with_unit(text: String, value: Option<f64>, unit: &str) -> String {
    if value.is_some() {
        text + unit
    } else {
        text
    }
}

const PREVIEW_COLUMNS: [&str; 21] = [
    "age",
    "job",
    "marital",
    "education",
    "default",
    "housing",
    "loan",
    "contact",
    "month",
    "day_of_week",
    "duration",
    "campaign",
    "pdays",
    "previous",
    "poutcome",
    "emp.var.rate",
    "cons.price.idx",
    "cons.conf.idx",
    "euribor3m",
    "nr.employed",
    "y",
];

fn cell<T: Display>(value: Option<T>) -> String {
    value.map_or_else(|| "NaN".to_owned(), |v| v.to_string())
}

fn preview_cells(r: &Record) -> [String; 21] {
    [
        cell(r.age),
        r.job.clone(),
        r.marital.clone(),
        r.education.clone(),
        r.default.clone(),
        r.housing.clone(),
        r.loan.clone(),
        r.contact.clone(),
        r.month.clone(),
        r.day_of_week.clone(),
        cell(r.duration),
        cell(r.campaign),
        cell(r.pdays),
        cell(r.previous),
        r.poutcome.clone(),
        cell(r.emp_var_rate),
        cell(r.cons_price_idx),
        cell(r.cons_conf_idx),
        cell(r.euribor3m),
        cell(r.nr_employed),
        r.y.to_string(),
    ]
}

fn preview_table(ui: &mut Ui, records: &[Record]) {
    egui::ScrollArea::horizontal().show(ui, |ui: &mut Ui| {
        TableBuilder::new(ui)
            .striped(true)
            .columns(Column::auto().at_least(40.0), PREVIEW_COLUMNS.len())
            .header(20.0, |mut header| {
                for name in PREVIEW_COLUMNS {
                    header.col(|ui: &mut Ui| {
                        ui.strong(name);
                    });
                }
            })
            .body(|mut body| {
                for record in records {
                    body.row(18.0, |mut row| {
                        for value in preview_cells(record) {
                            row.col(|ui: &mut Ui| {
                                ui.label(value);
                            });
                        }
                    });
                }
            });
    });
}
