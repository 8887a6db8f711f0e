// src/ui/plot.rs
use eframe::egui;
use egui_plot::{Bar, BarChart, BoxElem, BoxPlot, BoxSpread, Legend, Plot, PlotPoint, Points};

use crate::analysis::plot::{BarSeries, BoxGroup, ScatterPoint};
use crate::analysis::PlotData;
use crate::state::plot_state::ActivePlot;
use crate::state::{Action, AppState};

const PLOT_HEIGHT: f32 = 420.0;

pub fn show_plot_window(ctx: &egui::Context, state: &AppState, actions: &mut Vec<Action>) {
    let Some(plot) = &state.plot.active else {
        return;
    };

    let mut open = true;
    egui::Window::new(plot.series.title.as_str())
        .id(egui::Id::new("plot_window"))
        .open(&mut open)
        .default_width(640.0)
        .resizable(true)
        .show(ctx, |ui| {
            show_plot(ui, plot);
        });

    if !open {
        actions.push(Action::ClosePlot);
    }
}

fn show_plot(ui: &mut egui::Ui, plot: &ActivePlot) {
    match &plot.data {
        PlotData::Scatter { x_label, y_label, points } => scatter(ui, x_label, y_label, points),
        PlotData::Box { category_label, value_label, groups } => {
            ui.label(format!("{} grouped by {}", value_label, category_label));
            grouped_box(ui, value_label, groups);
        }
        PlotData::Bar { category_label, series_label, categories, series } => {
            ui.label(format!("{} counts per {}", series_label, category_label));
            grouped_bar(ui, categories, series);
        }
        PlotData::Invalid { reason } => {
            ui.colored_label(egui::Color32::RED, reason);
        }
    }
}

fn scatter(ui: &mut egui::Ui, x_label: &str, y_label: &str, points: &[ScatterPoint]) {
    let hover: Vec<ScatterPoint> = points.to_vec();
    let x_name = x_label.to_string();
    let y_name = y_label.to_string();

    Plot::new("scatter_plot")
        .height(PLOT_HEIGHT)
        .x_axis_label(x_label)
        .y_axis_label(y_label)
        .label_formatter(move |_name, value| {
            match nearest(&hover, value) {
                Some(point) => format!("{}\n{}: {:.3}\n{}: {:.3}", point.label, x_name, point.x, y_name, point.y),
                None => String::new(),
            }
        })
        .show(ui, |plot_ui| {
            let coords: Vec<[f64; 2]> = points.iter().map(|p| [p.x, p.y]).collect();
            plot_ui.points(
                Points::new(coords)
                    .radius(3.0)
                    .color(egui::Color32::from_rgb(100, 150, 255)),
            );
        });
}

fn nearest<'a>(points: &'a [ScatterPoint], at: &PlotPoint) -> Option<&'a ScatterPoint> {
    points.iter().min_by(|a, b| {
        let da = (a.x - at.x).powi(2) + (a.y - at.y).powi(2);
        let db = (b.x - at.x).powi(2) + (b.y - at.y).powi(2);
        da.total_cmp(&db)
    })
}

fn grouped_box(ui: &mut egui::Ui, value_label: &str, groups: &[BoxGroup]) {
    Plot::new("box_plot")
        .height(PLOT_HEIGHT)
        .legend(Legend::default())
        .y_axis_label(value_label)
        .show_x(false)
        .show(ui, |plot_ui| {
            for (i, group) in groups.iter().enumerate() {
                let stats = &group.stats;
                let spread = BoxSpread::new(stats.min, stats.lower_quartile, stats.median, stats.upper_quartile, stats.max);
                let elem = BoxElem::new(i as f64, spread)
                    .name(format!("{} (n={})", group.category, group.count))
                    .box_width(0.6);
                plot_ui.box_plot(BoxPlot::new(vec![elem]).name(&group.category));
            }
        });
}

fn grouped_bar(ui: &mut egui::Ui, categories: &[String], series: &[BarSeries]) {
    let width = 0.8 / series.len().max(1) as f64;

    Plot::new("bar_plot")
        .height(PLOT_HEIGHT)
        .legend(Legend::default())
        .y_axis_label("Count")
        .include_y(0.0)
        .show(ui, |plot_ui| {
            for (s, entry) in series.iter().enumerate() {
                let bars: Vec<Bar> = categories.iter()
                    .zip(&entry.counts)
                    .enumerate()
                    .map(|(c, (category, count))| {
                        let x = c as f64 - 0.4 + width * (s as f64 + 0.5);
                        Bar::new(x, *count as f64)
                            .width(width)
                            .name(format!("{} / {}", category, entry.name))
                    })
                    .collect();
                plot_ui.bar_chart(BarChart::new(bars).name(&entry.name));
            }
        });

    ui.horizontal_wrapped(|ui| {
        for (c, category) in categories.iter().enumerate() {
            ui.small(format!("{}: {}", c, category));
        }
    });
}
