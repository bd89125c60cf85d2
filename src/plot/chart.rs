use crate::config::PlotConfig;
use crate::error::{Result, StitchError};
use crate::plot::time_series::{value_range, TimeSeries};
use chrono::{DateTime, Duration, NaiveDateTime, TimeZone, Utc};
use plotters::prelude::*;
use plotters::style::FontTransform;
use std::path::Path;

/// Renders voltage, temperature and pressure as three stacked panels sharing the time axis.
pub fn render_chart(series: &TimeSeries, config: &PlotConfig, output: &Path) -> Result<()> {
    let (start, end) = series.time_range().ok_or_else(|| StitchError::Plot {
        message: "the time series is empty".to_string(),
    })?;
    let (x_start, x_end) = padded_time_range(start, end);

    let root = SVGBackend::new(output, (config.width, config.height)).into_drawing_area();
    root.fill(&WHITE).map_err(plot_error)?;
    let body = root
        .titled(&config.title, ("sans-serif", 24))
        .map_err(plot_error)?;
    let panels = body.split_evenly((3, 1));

    let channels = [
        (&series.voltage[..], "Voltage (V)", BLUE),
        (&series.temperature[..], "Temperature (C)", RED),
        (&series.pressure[..], "Pressure (Pa)", GREEN),
    ];
    let time_formatter = |t: &DateTime<Utc>| t.format(&config.time_axis_format).to_string();

    for (index, (panel, (values, label, color))) in panels.iter().zip(channels.iter()).enumerate() {
        // Only the bottom panel carries time labels; the panels touch
        let is_bottom = index == channels.len() - 1;
        let (y_min, y_max) = padded_value_range(values, label)?;

        let mut chart = ChartBuilder::on(panel)
            .margin_left(10)
            .margin_right(20)
            .margin_top(0)
            .margin_bottom(if is_bottom { 10 } else { 0 })
            .x_label_area_size(if is_bottom { 90 } else { 0 })
            .y_label_area_size(80)
            .build_cartesian_2d(x_start..x_end, y_min..y_max)
            .map_err(plot_error)?;

        let mut mesh = chart.configure_mesh();
        mesh.x_labels(8)
            .y_labels(5)
            .x_label_formatter(&time_formatter)
            .y_desc(*label)
            .label_style(("sans-serif", 14));
        if is_bottom {
            mesh.x_label_style(
                ("sans-serif", 14)
                    .into_font()
                    .transform(FontTransform::Rotate90),
            )
            .x_desc("Time");
        }
        mesh.draw().map_err(plot_error)?;

        chart
            .draw_series(LineSeries::new(
                series
                    .time
                    .iter()
                    .zip(values.iter())
                    .filter(|(_, v)| v.is_finite())
                    .map(|(t, v)| (Utc.from_utc_datetime(t), *v)),
                color.stroke_width(2),
            ))
            .map_err(plot_error)?;
    }

    root.present().map_err(plot_error)?;
    Ok(())
}

fn padded_time_range(start: NaiveDateTime, end: NaiveDateTime) -> (DateTime<Utc>, DateTime<Utc>) {
    let margin = std::cmp::max((end - start) / 20, Duration::seconds(30));
    (
        Utc.from_utc_datetime(&(start - margin)),
        Utc.from_utc_datetime(&(end + margin)),
    )
}

/// Axis bounds with 10% headroom. A flat series gets a band around its value.
///
/// Fails when the bounds or their span are not finite, which plotters
/// cannot lay out.
fn padded_value_range(values: &[f64], label: &str) -> Result<(f64, f64)> {
    let (min, max) = match value_range(values) {
        None => return Ok((0.0, 1.0)),
        Some(range) => range,
    };

    let pad = if min == max {
        (min.abs() / 10.0).max(1.0)
    } else {
        (max - min) / 10.0
    };
    let (low, high) = (min - pad, max + pad);

    if !pad.is_finite() || !low.is_finite() || !high.is_finite() || !(high - low).is_finite() {
        return Err(StitchError::Plot {
            message: format!(
                "{} values span {} to {}, too wide to draw on one axis",
                label, min, max
            ),
        });
    }

    Ok((low, high))
}

fn plot_error<E: std::fmt::Display>(error: E) -> StitchError {
    StitchError::Plot {
        message: error.to_string(),
    }
}
