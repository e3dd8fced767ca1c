//! Radar profile of the average sensor values of a smell

use super::{palette, render_png, PlotError};
use crate::{
    aggregate::AggregateRow,
    channel::{Channel, CHANNELS},
    config::Config,
};
use plotters::{
    prelude::*,
    style::text_anchor::{HPos, Pos, VPos},
};
use std::f64::consts::PI;
use strum::IntoEnumIterator;

/// Directory of the radar charts in the output bundle
pub const RADAR_DIR: &str = "radarPlot";

/// Replaces every character other than letters, digits, `_`, `-` and `.` with `_`
pub fn slug(label: &str) -> String {
    label
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || matches!(c, '_' | '-' | '.') {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// Bundle path of the radar chart of a smell label
pub fn radar_path(label: &str) -> String {
    format!("{}/radar_chart_{}.png", RADAR_DIR, slug(label))
}

// Cartesian coordinates of radius `r` on the spoke of the `k`th channel,
// the first spoke at 12 o'clock and the others clockwise
fn spoke(r: f64, k: usize) -> (f64, f64) {
    let theta = 2. * PI * k as f64 / CHANNELS as f64;
    (r * theta.sin(), r * theta.cos())
}

/// Draws the radar chart of one row of the aggregate table and returns the PNG image
///
/// The radial axis goes from 0 to the radial maximum of the configuration,
/// values outside are clamped and missing values are drawn at the center.
pub fn radar_chart(row: &AggregateRow, config: &Config) -> Result<Vec<u8>, PlotError> {
    let r_max = config.radial_max;
    if !(r_max.is_finite() && r_max > 0.) {
        return Err(PlotError::RadialMax(r_max));
    }
    let values: Vec<f64> = Channel::iter()
        .map(|c| match row.value(c) {
            Some(x) => x.clamp(0., r_max),
            None => {
                log::warn!("{:?}: no {} value, drawn at the center", row.label, c);
                0.
            }
        })
        .collect();
    render_png("radar", config.radar_size, |root| {
        let extent = 1.15 * r_max;
        let mut chart = ChartBuilder::on(root)
            .caption(&row.name, ("sans-serif", 22))
            .margin(10)
            .build_cartesian_2d(-extent..extent, -extent..extent)?;

        let grid = BLACK.mix(0.2);
        let rings = (1..=4).map(|q| r_max * q as f64 / 4.);
        for r in rings.clone() {
            chart.draw_series(LineSeries::new(
                (0..=90).map(|i| {
                    let theta = 2. * PI * i as f64 / 90.;
                    (r * theta.sin(), r * theta.cos())
                }),
                &grid,
            ))?;
        }
        chart.draw_series(rings.map(|r| {
            Text::new(
                format!("{:.0}", r),
                spoke(r, 0),
                ("sans-serif", 11).into_font().color(&BLACK.mix(0.6)),
            )
        }))?;
        chart.draw_series(
            (0..CHANNELS).map(|k| PathElement::new(vec![(0., 0.), spoke(r_max, k)], &grid)),
        )?;
        chart.draw_series(Channel::iter().map(|c| {
            Text::new(
                c.header(),
                spoke(1.08 * r_max, c.index()),
                ("sans-serif", 15)
                    .into_font()
                    .color(&BLACK)
                    .pos(Pos::new(HPos::Center, VPos::Center)),
            )
        }))?;

        let rgb = palette(0);
        let profile: Vec<(f64, f64)> = values
            .iter()
            .enumerate()
            .map(|(k, &r)| spoke(r, k))
            .collect();
        chart.draw_series(std::iter::once(Polygon::new(
            profile.clone(),
            rgb.mix(0.25).filled(),
        )))?;
        chart.draw_series(LineSeries::new(
            profile.iter().chain(profile.first()).copied(),
            rgb.stroke_width(2),
        ))?;
        chart.draw_series(profile.iter().map(|&p| Circle::new(p, 4, rgb.filled())))?;
        Ok(())
    })
}
