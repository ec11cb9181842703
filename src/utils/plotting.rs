// src/utils/plotting.rs

use std::error::Error;
use std::ops::Range;

use chrono::NaiveDate;
use image::codecs::png::PngEncoder;
use image::{ColorType, ImageEncoder};
use plotters::coord::Shift;
use plotters::prelude::*;

use crate::error::ForecastError;
use crate::models::DailyForecast;

/// Pixel size of the rendered chart.
pub const CHART_SIZE: (u32, u32) = (1400, 1000);

const GOLDENROD: RGBColor = RGBColor(218, 165, 32);
const FOREST_GREEN: RGBColor = RGBColor(34, 139, 34);
const FONT: &str = "sans-serif";

struct Panel {
    title: String,
    y_desc: &'static str,
    x_desc: Option<&'static str>,
    legend: &'static str,
    color: RGBColor,
    points: Vec<(NaiveDate, f64)>,
}

/// Renders the gold and exchange-rate forecasts as a two-panel PNG.
///
/// The bitmap lives only for the duration of the call; it is flushed and
/// dropped before PNG encoding starts, on success or failure.
pub fn render_forecast_chart(forecast: &[DailyForecast]) -> Result<Vec<u8>, ForecastError> {
    let (first, last) = match (forecast.first(), forecast.last()) {
        (Some(first), Some(last)) => (first.date, last.date),
        _ => return Err(ForecastError::Prediction("no data points to plot".to_string())),
    };
    let span = format!("from {} to {}", first.format("%Y-%m-%d"), last.format("%Y-%m-%d"));

    let panels = [
        Panel {
            title: format!("Predicted 24K Gold Rate (INR per 10 grams) {}", span),
            y_desc: "Price (INR)",
            x_desc: None,
            legend: "Predicted 24K Gold Price",
            color: GOLDENROD,
            points: forecast.iter().map(|f| (f.date, f.gold_rate)).collect(),
        },
        Panel {
            title: format!("Predicted USD/INR Rate {}", span),
            y_desc: "INR per USD",
            x_desc: Some("Date"),
            legend: "Predicted USD/INR Rate",
            color: FOREST_GREEN,
            points: forecast.iter().map(|f| (f.date, f.inr_usd_rate)).collect(),
        },
    ];

    let (width, height) = CHART_SIZE;
    let mut buffer = vec![0u8; (width * height * 3) as usize];
    draw_chart(&mut buffer, date_axis(first, last), &panels)
        .map_err(|e| ForecastError::Prediction(format!("chart rendering failed: {}", e)))?;

    let mut png = Vec::new();
    PngEncoder::new(&mut png)
        .write_image(&buffer, width, height, ColorType::Rgb8)
        .map_err(|e| ForecastError::Prediction(format!("PNG encoding failed: {}", e)))?;
    Ok(png)
}

fn draw_chart(
    buffer: &mut [u8],
    dates: Range<NaiveDate>,
    panels: &[Panel],
) -> Result<(), Box<dyn Error>> {
    let root_area = BitMapBackend::with_buffer(buffer, CHART_SIZE).into_drawing_area();
    root_area.fill(&BLACK)?;

    let areas = root_area.split_evenly((panels.len(), 1));
    for (area, panel) in areas.iter().zip(panels) {
        draw_panel(area, dates.clone(), panel)?;
    }

    root_area.present()?;
    Ok(())
}

fn draw_panel(
    area: &DrawingArea<BitMapBackend<'_>, Shift>,
    dates: Range<NaiveDate>,
    panel: &Panel,
) -> Result<(), Box<dyn Error>> {
    let values: Vec<f64> = panel.points.iter().map(|(_, v)| *v).collect();

    let mut chart = ChartBuilder::on(area)
        .caption(&panel.title, (FONT, 24).into_font().color(&WHITE))
        .margin(15)
        .x_label_area_size(if panel.x_desc.is_some() { 55 } else { 35 })
        .y_label_area_size(90)
        .build_cartesian_2d(dates, value_axis(&values))?;

    let date_label = |d: &NaiveDate| d.format("%Y-%m-%d").to_string();
    let mut mesh = chart.configure_mesh();
    mesh.bold_line_style(WHITE.mix(0.25))
        .light_line_style(TRANSPARENT)
        .axis_style(WHITE.mix(0.8))
        .label_style((FONT, 15).into_font().color(&WHITE))
        .axis_desc_style((FONT, 18).into_font().color(&WHITE))
        .x_labels(8)
        .x_label_formatter(&date_label)
        .y_desc(panel.y_desc);
    if let Some(x_desc) = panel.x_desc {
        mesh.x_desc(x_desc);
    }
    mesh.draw()?;

    let color = panel.color;
    chart
        .draw_series(LineSeries::new(
            panel.points.iter().copied(),
            color.stroke_width(2),
        ))?
        .label(panel.legend)
        .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(2)));

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperLeft)
        .background_style(BLACK.mix(0.8))
        .border_style(WHITE.mix(0.5))
        .label_font((FONT, 15).into_font().color(&WHITE))
        .draw()?;
    Ok(())
}

/// Date axis covering `first..=last`; a single day is widened to one day.
fn date_axis(first: NaiveDate, last: NaiveDate) -> Range<NaiveDate> {
    if first < last {
        first..last
    } else {
        first..first.succ_opt().unwrap_or(first)
    }
}

/// Value axis with a small margin; a flat series gets a unit band.
fn value_axis(values: &[f64]) -> Range<f64> {
    let max_value = values.iter().cloned().fold(f64::MIN, f64::max);
    let min_value = values.iter().cloned().fold(f64::MAX, f64::min);

    if (max_value - min_value).abs() < f64::EPSILON {
        (min_value - 1.0)..(max_value + 1.0)
    } else {
        let pad = (max_value - min_value) * 0.05;
        (min_value - pad)..(max_value + pad)
    }
}
