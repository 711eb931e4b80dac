//! Chart export to PNG (plotters bitmap backend).

use color_eyre::eyre::eyre;
use color_eyre::Result;
use std::path::Path;

use crate::config::ChartConfig;
use crate::statistics::{BoxPlotSummary, CorrelationMatrix, Histogram};

/// Size and fill color shared by every exported chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChartStyle {
    pub width: u32,
    pub height: u32,
    pub color: (u8, u8, u8),
}

impl Default for ChartStyle {
    fn default() -> Self {
        Self {
            width: 800,
            height: 600,
            color: (0x1f, 0x77, 0xb4),
        }
    }
}

impl ChartStyle {
    pub fn from_config(config: &ChartConfig) -> Result<Self> {
        Ok(Self {
            width: config.width,
            height: config.height,
            color: config.rgb()?,
        })
    }
}

/// Labeled bars: frequency tables, acceptance rates, null counts.
#[derive(Debug, Clone, PartialEq)]
pub struct BarChartData {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub labels: Vec<String>,
    pub values: Vec<f64>,
}

/// Map an axis position back to the category label drawn there.
fn category_label(labels: &[String], v: f64) -> String {
    let idx = v.round();
    if idx < 0.0 || (v - idx).abs() > 0.25 {
        return String::new();
    }
    labels.get(idx as usize).cloned().unwrap_or_default()
}

/// Upper bound for a value axis starting at zero.
fn padded_max(max: f64) -> f64 {
    if max.is_finite() && max > 0.0 {
        max * 1.1
    } else {
        1.0
    }
}

/// Write a vertical bar chart to PNG.
pub fn write_bar_chart_png(path: &Path, data: &BarChartData, style: &ChartStyle) -> Result<()> {
    use plotters::prelude::*;

    if data.labels.is_empty() || data.values.is_empty() {
        return Err(eyre!("No data to export"));
    }

    let root = BitMapBackend::new(path, (style.width, style.height)).into_drawing_area();
    root.fill(&WHITE)?;

    let n = data.labels.len().min(data.values.len());
    let x_min = -0.5;
    let x_max = n as f64 - 0.5;
    let y_max = padded_max(data.values.iter().copied().fold(0.0, f64::max));

    let mut chart = ChartBuilder::on(&root)
        .caption(data.title.as_str(), ("sans-serif", 20))
        .margin(30)
        .x_label_area_size(60)
        .y_label_area_size(60)
        .build_cartesian_2d(x_min..x_max, 0.0..y_max)?;

    let labels = data.labels.clone();
    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(n)
        .x_desc(data.x_label.as_str())
        .y_desc(data.y_label.as_str())
        .x_label_formatter(&move |v: &f64| category_label(&labels, *v))
        .draw()?;

    let (r, g, b) = style.color;
    let fill = RGBColor(r, g, b);
    chart.draw_series(data.values.iter().take(n).enumerate().map(|(i, &y)| {
        let x = i as f64;
        Rectangle::new([(x - 0.4, 0.0), (x + 0.4, y)], fill.filled())
    }))?;

    root.present()?;
    Ok(())
}

/// Write histogram bins to PNG.
pub fn write_histogram_png(path: &Path, hist: &Histogram, style: &ChartStyle) -> Result<()> {
    use plotters::prelude::*;

    if hist.edges.len() < 2 || hist.total() == 0 {
        return Err(eyre!("No data to export"));
    }

    let root = BitMapBackend::new(path, (style.width, style.height)).into_drawing_area();
    root.fill(&WHITE)?;

    let x_min = hist.edges[0];
    let x_max = hist.edges[hist.edges.len() - 1];
    let y_max = padded_max(hist.counts.iter().copied().max().unwrap_or(0) as f64);

    let mut chart = ChartBuilder::on(&root)
        .caption(format!("Distribution of {}", hist.column), ("sans-serif", 20))
        .margin(30)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(x_min..x_max, 0.0..y_max)?;

    chart
        .configure_mesh()
        .x_desc(hist.column.as_str())
        .y_desc("count")
        .draw()?;

    let (r, g, b) = style.color;
    let fill = RGBColor(r, g, b);
    chart.draw_series(
        hist.edges
            .windows(2)
            .zip(&hist.counts)
            .map(|(edge, &count)| {
                Rectangle::new([(edge[0], 0.0), (edge[1], count as f64)], fill.filled())
            }),
    )?;
    chart.draw_series(
        hist.edges
            .windows(2)
            .zip(&hist.counts)
            .map(|(edge, &count)| {
                Rectangle::new([(edge[0], 0.0), (edge[1], count as f64)], WHITE.stroke_width(1))
            }),
    )?;

    root.present()?;
    Ok(())
}

/// Write a box plot (one box per category) to PNG.
pub fn write_box_plot_png(path: &Path, data: &BoxPlotSummary, style: &ChartStyle) -> Result<()> {
    use plotters::prelude::*;

    if data.groups.is_empty() {
        return Err(eyre!("No data to export"));
    }

    let root = BitMapBackend::new(path, (style.width, style.height)).into_drawing_area();
    root.fill(&WHITE)?;

    let y_min = data.groups.iter().map(|s| s.min).fold(f64::INFINITY, f64::min);
    let y_max = data
        .groups
        .iter()
        .map(|s| s.max)
        .fold(f64::NEG_INFINITY, f64::max);
    let pad = ((y_max - y_min) * 0.05).max(0.5);
    let x_min = -0.5;
    let x_max = data.groups.len() as f64 - 0.5;

    let mut chart = ChartBuilder::on(&root)
        .caption(
            format!("{} by {}", data.numeric_column, data.category_column),
            ("sans-serif", 20),
        )
        .margin(30)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(x_min..x_max, (y_min - pad)..(y_max + pad))?;

    let labels: Vec<String> = data.groups.iter().map(|g| g.category.clone()).collect();
    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(labels.len())
        .x_desc(data.category_column.as_str())
        .y_desc(data.numeric_column.as_str())
        .x_label_formatter(&move |v: &f64| category_label(&labels, *v))
        .draw()?;

    let (r, g, b) = style.color;
    let color = RGBColor(r, g, b);
    let box_half = 0.3;
    let cap_half = 0.15;

    for (idx, stat) in data.groups.iter().enumerate() {
        let x = idx as f64;
        chart.draw_series(std::iter::once(Rectangle::new(
            [(x - box_half, stat.q1), (x + box_half, stat.q3)],
            color.mix(0.3).filled(),
        )))?;
        chart.draw_series(std::iter::once(Rectangle::new(
            [(x - box_half, stat.q1), (x + box_half, stat.q3)],
            color.stroke_width(1),
        )))?;
        chart.draw_series(std::iter::once(PathElement::new(
            vec![(x - box_half, stat.median), (x + box_half, stat.median)],
            BLACK.stroke_width(2),
        )))?;
        chart.draw_series(std::iter::once(PathElement::new(
            vec![(x, stat.lower_whisker), (x, stat.q1)],
            color,
        )))?;
        chart.draw_series(std::iter::once(PathElement::new(
            vec![(x, stat.q3), (x, stat.upper_whisker)],
            color,
        )))?;
        chart.draw_series(std::iter::once(PathElement::new(
            vec![(x - cap_half, stat.lower_whisker), (x + cap_half, stat.lower_whisker)],
            color,
        )))?;
        chart.draw_series(std::iter::once(PathElement::new(
            vec![(x - cap_half, stat.upper_whisker), (x + cap_half, stat.upper_whisker)],
            color,
        )))?;
        // Outliers only exist beyond the whiskers; mark the extremes.
        if stat.outliers > 0 {
            let extremes = [stat.min, stat.max]
                .into_iter()
                .filter(|v| *v < stat.lower_whisker || *v > stat.upper_whisker);
            chart.draw_series(extremes.map(|v| Circle::new((x, v), 3, RED.filled())))?;
        }
    }

    root.present()?;
    Ok(())
}

/// Blue for -1, white for 0, red for +1; gray for undefined.
fn correlation_color(r: f64) -> (u8, u8, u8) {
    if r.is_nan() {
        return (200, 200, 200);
    }
    let t = r.clamp(-1.0, 1.0);
    let fade = (255.0 * (1.0 - t.abs())) as u8;
    if t >= 0.0 {
        (255, fade, fade)
    } else {
        (fade, fade, 255)
    }
}

/// Write a correlation matrix heatmap to PNG.
pub fn write_heatmap_png(path: &Path, matrix: &CorrelationMatrix, style: &ChartStyle) -> Result<()> {
    use plotters::prelude::*;

    let n = matrix.columns.len();
    if n == 0 || matrix.correlations.len() != n {
        return Err(eyre!("No data to export"));
    }

    let root = BitMapBackend::new(path, (style.width, style.height)).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(
            format!("Correlation matrix ({})", matrix.method),
            ("sans-serif", 20),
        )
        .margin(30)
        .x_label_area_size(60)
        .y_label_area_size(80)
        .build_cartesian_2d(-0.5..(n as f64 - 0.5), -0.5..(n as f64 - 0.5))?;

    // First column at the top
    let x_labels = matrix.columns.clone();
    let y_labels: Vec<String> = matrix.columns.iter().rev().cloned().collect();
    chart
        .configure_mesh()
        .disable_mesh()
        .x_labels(n)
        .y_labels(n)
        .x_label_formatter(&move |v: &f64| category_label(&x_labels, *v))
        .y_label_formatter(&move |v: &f64| category_label(&y_labels, *v))
        .draw()?;

    for (i, row) in matrix.correlations.iter().enumerate() {
        for (j, &r) in row.iter().enumerate() {
            let (red, green, blue) = correlation_color(r);
            let (x, y) = (j as f64, (n - 1 - i) as f64);
            chart.draw_series(std::iter::once(Rectangle::new(
                [(x - 0.5, y - 0.5), (x + 0.5, y + 0.5)],
                RGBColor(red, green, blue).filled(),
            )))?;
        }
    }

    root.present()?;
    Ok(())
}
