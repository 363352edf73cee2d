use std::f32::consts::{FRAC_PI_2, TAU};

use campaign_dashboard::data::aggregate::{
    AgeBin, DurationBox, EconomicPoint, EducationCount, JobSuccess, MonthOutcome,
};
use campaign_dashboard::Outcome;
use eframe::egui::{self, RichText, Ui};
use egui_plot::{
    Bar, BarChart, BoxElem, BoxPlot, BoxSpread, GridMark, Legend, Plot, PlotPoints, Points,
};

use crate::color::{outcome_color, ColorMap};
use crate::state::AppState;

const CHART_HEIGHT: f32 = 280.0;

// ---------------------------------------------------------------------------
// Chart grid (central panel)
// ---------------------------------------------------------------------------

/// Render every chart for the current aggregate result.
pub fn charts(ui: &mut Ui, state: &AppState) {
    let Some(result) = &state.result else {
        return;
    };

    if result.headline.records == 0 {
        ui.label(RichText::new("No contacts match the current filters.").italics());
        return;
    }

    section(ui, "Age distribution by subscription status");
    age_histogram(ui, &result.age_histogram);

    section(ui, "Contact duration vs subscription decision");
    duration_box_plot(ui, &result.duration_by_outcome);

    section(ui, "Campaign success rate per job");
    job_success_chart(ui, &result.job_success, &state.job_colors);

    section(ui, "Education of contacted clients");
    education_donut(ui, &result.education_counts, &state.education_colors);

    section(ui, "Subscription rate per month");
    month_outcome_chart(ui, &result.month_outcomes);

    section(ui, "Employment variation rate vs Euribor 3M");
    economic_scatter(ui, &result.economic_points);
}

fn section(ui: &mut Ui, title: &str) {
    ui.add_space(10.0);
    ui.heading(title);
}

/// Tick labels for a categorical axis laid out at integer positions.
fn category_formatter(
    labels: Vec<String>,
) -> impl Fn(GridMark, &std::ops::RangeInclusive<f64>) -> String {
    move |mark, _range| {
        let idx = mark.value.round();
        if (mark.value - idx).abs() > 1e-6 || idx < 0.0 {
            return String::new();
        }
        labels.get(idx as usize).cloned().unwrap_or_default()
    }
}

// ---------------------------------------------------------------------------
// Individual charts
// ---------------------------------------------------------------------------

/// Stacked histogram: the `Yes` bars sit on top of the `No` bars.
fn age_histogram(ui: &mut Ui, bins: &[AgeBin]) {
    let bars_for = |outcome: Outcome| -> Vec<Bar> {
        bins.iter()
            .map(|b| {
                Bar::new((b.lower + b.upper) / 2.0, b.count(outcome) as f64)
                    .width(b.upper - b.lower)
                    .name(format!("{:.0}–{:.0}", b.lower, b.upper))
            })
            .collect()
    };

    let no_chart = BarChart::new(bars_for(Outcome::No))
        .name(Outcome::No.as_str())
        .color(outcome_color(Outcome::No));
    let yes_chart = BarChart::new(bars_for(Outcome::Yes))
        .name(Outcome::Yes.as_str())
        .color(outcome_color(Outcome::Yes))
        .stack_on(&[&no_chart]);

    Plot::new("age_histogram")
        .legend(Legend::default())
        .height(CHART_HEIGHT)
        .x_axis_label("Age")
        .y_axis_label("Clients")
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(no_chart);
            plot_ui.bar_chart(yes_chart);
        });
}

fn duration_box_plot(ui: &mut Ui, boxes: &[DurationBox]) {
    let labels: Vec<String> = boxes.iter().map(|b| b.outcome.to_string()).collect();

    Plot::new("duration_box_plot")
        .legend(Legend::default())
        .height(CHART_HEIGHT)
        .y_axis_label("Duration (s)")
        .x_axis_formatter(category_formatter(labels))
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            for (i, b) in boxes.iter().enumerate() {
                let s = &b.summary;
                let x = i as f64;
                let color = outcome_color(b.outcome);
                let elem = BoxElem::new(
                    x,
                    BoxSpread::new(s.lower_whisker, s.q1, s.median, s.q3, s.upper_whisker),
                )
                .name(b.outcome.as_str())
                .box_width(0.5)
                .whisker_width(0.3)
                .fill(color.gamma_multiply(0.4))
                .stroke(egui::Stroke::new(1.5, color));
                plot_ui.box_plot(BoxPlot::new(vec![elem]).name(b.outcome.as_str()));

                // Extremes beyond the whiskers.
                let outliers: Vec<[f64; 2]> = [s.min, s.max]
                    .into_iter()
                    .filter(|v| *v < s.lower_whisker || *v > s.upper_whisker)
                    .map(|v| [x, v])
                    .collect();
                if !outliers.is_empty() {
                    plot_ui.points(Points::new(PlotPoints::from(outliers)).radius(3.0).color(color));
                }
            }
        });
}

fn job_success_chart(ui: &mut Ui, rows: &[JobSuccess], colors: &ColorMap) {
    let labels: Vec<String> = rows.iter().map(|r| r.job.clone()).collect();
    let bars: Vec<Bar> = rows
        .iter()
        .enumerate()
        .map(|(i, r)| {
            Bar::new(i as f64, r.success_rate)
                .width(0.7)
                .name(&r.job)
                .fill(colors.color_for(&r.job))
        })
        .collect();

    let chart = BarChart::new(bars)
        .name("Success rate (%)")
        .element_formatter(Box::new(|bar, _chart| {
            format!("{}\n{:.2}%", bar.name, bar.value)
        }));

    Plot::new("job_success")
        .height(CHART_HEIGHT)
        .y_axis_label("Subscribed (%)")
        .x_axis_formatter(category_formatter(labels))
        .include_y(0.0)
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(chart);
        });
}

/// Share of each education level as a donut, with a legend to the right.
fn education_donut(ui: &mut Ui, rows: &[EducationCount], colors: &ColorMap) {
    let radius = CHART_HEIGHT / 2.0 - 10.0;

    ui.horizontal(|ui: &mut Ui| {
        let (rect, _response) =
            ui.allocate_exact_size(egui::vec2(radius * 2.0, radius * 2.0), egui::Sense::hover());
        let center = rect.center();
        let painter = ui.painter();

        let mut start_angle = -FRAC_PI_2;
        for row in rows {
            let sweep = (row.share / 100.0) as f32 * TAU;
            if sweep < 0.001 {
                continue;
            }
            let color = colors.color_for(&row.education);

            // Thin triangle fan; each triangle is convex even when the slice is not.
            let steps = ((sweep / (TAU / 128.0)).ceil() as usize).max(1);
            for j in 0..steps {
                let a0 = start_angle + sweep * j as f32 / steps as f32;
                let a1 = start_angle + sweep * (j + 1) as f32 / steps as f32;
                painter.add(egui::Shape::convex_polygon(
                    vec![
                        center,
                        center + egui::vec2(a0.cos(), a0.sin()) * radius,
                        center + egui::vec2(a1.cos(), a1.sin()) * radius,
                    ],
                    color,
                    egui::Stroke::NONE,
                ));
            }
            start_angle += sweep;
        }

        painter.circle_filled(center, radius * 0.45, ui.visuals().extreme_bg_color);

        ui.vertical(|ui: &mut Ui| {
            for row in rows {
                ui.horizontal(|ui: &mut Ui| {
                    ui.label(RichText::new("■").color(colors.color_for(&row.education)));
                    ui.label(format!(
                        "{}  {} ({:.1}%)",
                        row.education, row.count, row.share
                    ));
                });
            }
        });
    });
}

/// Grouped bars: for each month, the `Yes` and `No` share side by side.
fn month_outcome_chart(ui: &mut Ui, rows: &[MonthOutcome]) {
    let labels: Vec<String> = rows.iter().map(|r| r.month.clone()).collect();
    let chart_for = |outcome: Outcome, offset: f64| {
        let bars = rows
            .iter()
            .enumerate()
            .map(|(i, r)| {
                Bar::new(i as f64 + offset, r.rate(outcome))
                    .width(0.38)
                    .name(&r.month)
            })
            .collect();
        BarChart::new(bars)
            .name(outcome.as_str())
            .color(outcome_color(outcome))
    };
    let yes_chart = chart_for(Outcome::Yes, -0.2);
    let no_chart = chart_for(Outcome::No, 0.2);

    Plot::new("month_outcomes")
        .legend(Legend::default())
        .height(CHART_HEIGHT)
        .y_axis_label("Rate (%)")
        .x_axis_formatter(category_formatter(labels))
        .include_y(0.0)
        .include_y(100.0)
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(yes_chart);
            plot_ui.bar_chart(no_chart);
        });
}

fn economic_scatter(ui: &mut Ui, points: &[EconomicPoint]) {
    let series_for = |outcome: Outcome| -> Points {
        let coords: Vec<[f64; 2]> = points
            .iter()
            .filter(|p| p.outcome == outcome)
            .map(|p| [p.emp_var_rate, p.euribor3m])
            .collect();
        Points::new(PlotPoints::from(coords))
            .name(outcome.as_str())
            .color(outcome_color(outcome))
            .radius(2.5)
    };

    Plot::new("economic_scatter")
        .legend(Legend::default())
        .height(CHART_HEIGHT)
        .x_axis_label("emp.var.rate")
        .y_axis_label("euribor3m")
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            for outcome in Outcome::ALL {
                plot_ui.points(series_for(outcome));
            }
        });
}
