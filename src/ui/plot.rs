use std::ops::RangeInclusive;

use chrono::{Datelike, NaiveDate};
use eframe::egui::{Color32, Ui};
use egui_plot::{uniform_grid_spacer, Bar, BarChart, GridMark, Line, Plot, PlotPoints, Points};

use crate::data::aggregate::GroupAggregate;

const CHART_HEIGHT: f32 = 320.0;

// ---------------------------------------------------------------------------
// Sales by date (line chart)
// ---------------------------------------------------------------------------

/// Dates are plotted as day numbers so the x axis stays linear in time.
fn date_to_x(date: NaiveDate) -> f64 {
    date.num_days_from_ce() as f64
}

fn x_to_label(x: f64) -> String {
    if x.fract() != 0.0 {
        return String::new();
    }
    NaiveDate::from_num_days_from_ce_opt(x as i32)
        .map(|d| d.format("%d/%m/%Y").to_string())
        .unwrap_or_default()
}

pub fn sales_by_date_chart(ui: &mut Ui, agg: &GroupAggregate<NaiveDate>, color: Color32) {
    ui.strong("Vendas por data");

    let points: Vec<[f64; 2]> = agg
        .entries()
        .iter()
        .map(|e| [date_to_x(e.key), e.value])
        .collect();

    Plot::new("sales_by_date")
        .height(CHART_HEIGHT)
        .show_grid([true, false])
        .x_axis_label("Data")
        .y_axis_label("Preço total")
        .x_axis_formatter(|mark: GridMark, _range: &RangeInclusive<f64>| x_to_label(mark.value))
        .label_formatter(|_name, point| {
            format!("{}\nR$ {:.2}", x_to_label(point.x.round()), point.y)
        })
        .allow_drag(false)
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            plot_ui.line(
                Line::new(PlotPoints::from(points.clone()))
                    .name("Preço total")
                    .color(color)
                    .width(2.0),
            );
            plot_ui.points(Points::new(PlotPoints::from(points)).color(color).radius(3.0));
        });
}

// ---------------------------------------------------------------------------
// Per-product horizontal bars
// ---------------------------------------------------------------------------

/// One horizontal bar per product, smallest at the bottom, labelled with
/// the product title on the y axis.
pub fn product_bar_chart(
    ui: &mut Ui,
    id: &str,
    title: &str,
    value_label: &str,
    agg: &GroupAggregate<String>,
    color: Color32,
) {
    ui.strong(title);
    if agg.is_empty() {
        ui.label("Sem dados");
        return;
    }

    let labels: Vec<String> = agg.entries().iter().map(|e| e.key.clone()).collect();
    let bars: Vec<Bar> = agg
        .entries()
        .iter()
        .enumerate()
        .map(|(i, e)| Bar::new(i as f64, e.value).name(&e.key))
        .collect();

    let chart = BarChart::new(bars)
        .horizontal()
        .width(0.7)
        .color(color)
        .name(value_label);

    Plot::new(id)
        .height(CHART_HEIGHT)
        .include_x(0.0)
        .include_x(agg.max_value().unwrap_or(0.0) * 1.05)
        .include_y(-0.5)
        .include_y(agg.len() as f64 - 0.5)
        .show_grid([false, true])
        .x_axis_label(value_label)
        .y_grid_spacer(uniform_grid_spacer(|_| [1.0, 5.0, 10.0]))
        .y_axis_formatter(move |mark: GridMark, _range: &RangeInclusive<f64>| {
            if mark.value.fract() != 0.0 || mark.value < 0.0 {
                return String::new();
            }
            labels.get(mark.value as usize).cloned().unwrap_or_default()
        })
        .allow_drag(false)
        .allow_scroll(false)
        .show(ui, |plot_ui| plot_ui.bar_chart(chart));
}
