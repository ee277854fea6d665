use anyhow::{Error, anyhow, ensure};
use charming::{
    Chart, ImageFormat, ImageRenderer,
    component::{Axis, Title},
    element::{AxisLabel, AxisType, LineStyle, SplitLine, Symbol as Marker, TextStyle},
    series::Line,
};
use ta::Next;
use ta::indicators::ExponentialMovingAverage;

use crate::{Series, format_price};

/// Turns a price series into an image. Rendering is CPU-bound; callers off
/// the async runtime should use `spawn_blocking`.
pub trait ChartRenderer: Send + Sync {
    fn render(&self, title: &str, series: &Series) -> Result<Vec<u8>, Error>;
}

/// Dark line chart with EMA12/EMA26 overlays, rendered to PNG by charming.
#[derive(Debug, Clone, Copy)]
pub struct LineChartRenderer {
    pub width: u32,
    pub height: u32,
}

impl Default for LineChartRenderer {
    fn default() -> Self {
        Self {
            width: 1200,
            height: 600,
        }
    }
}

pub fn ema(closes: &[f64], period: usize) -> Result<Vec<f64>, Error> {
    let mut ema = ExponentialMovingAverage::new(period)
        .map_err(|e| anyhow!("invalid EMA period {period}: {e:?}"))?;
    Ok(closes.iter().map(|&x| ema.next(x)).collect())
}

fn label_format(series: &Series) -> &'static str {
    match (series.points.first(), series.points.last()) {
        (Some(first), Some(last)) if (last.time - first.time).num_hours() <= 48 => "%m-%d %H:%M",
        _ => "%Y-%m-%d",
    }
}

impl ChartRenderer for LineChartRenderer {
    fn render(&self, title: &str, series: &Series) -> Result<Vec<u8>, Error> {
        ensure!(!series.is_empty(), "series is empty");

        let prices = series.prices();
        let dates = series.labels(label_format(series));
        let ema12 = ema(&prices, 12)?;
        let ema26 = ema(&prices, 26)?;

        let last_price = prices.last().copied().unwrap_or_default();
        let label_interval = (prices.len() / 8).max(1) as u32;

        let chart = Chart::new()
            .background_color("#0b0c17")
            .title(
                Title::new()
                    .text(format!("{title} | {}", format_price(last_price)))
                    .left("center")
                    .top("2%")
                    .text_style(TextStyle::new().color("#ffffff").font_size(14)),
            )
            .x_axis(
                Axis::new()
                    .type_(AxisType::Category)
                    .data(dates)
                    .axis_label(
                        AxisLabel::new()
                            .rotate(45)
                            .interval(label_interval)
                            .color("#a0a0a0"),
                    )
                    .split_line(SplitLine::new().line_style(LineStyle::new().color("#2d2f45"))),
            )
            .y_axis(
                Axis::new()
                    .type_(AxisType::Value)
                    .scale(true)
                    .axis_label(AxisLabel::new().color("#a0a0a0"))
                    .split_line(SplitLine::new().line_style(LineStyle::new().color("#2d2f45"))),
            )
            .series(
                Line::new()
                    .name("Price")
                    .data(prices)
                    .symbol(Marker::None)
                    .line_style(LineStyle::new().width(2).color("#00d084")),
            )
            .series(
                Line::new()
                    .name("EMA12")
                    .data(ema12)
                    .symbol(Marker::None)
                    .line_style(LineStyle::new().width(1).color("#0064FF")),
            )
            .series(
                Line::new()
                    .name("EMA26")
                    .data(ema26)
                    .symbol(Marker::None)
                    .line_style(LineStyle::new().width(1).color("#FF6400")),
            );

        let mut renderer = ImageRenderer::new(self.width, self.height);
        let png_bytes = renderer.render_format(ImageFormat::Png, &chart)?;
        Ok(png_bytes)
    }
}
