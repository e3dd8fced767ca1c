//! 2D scatter of the principal component projection

use super::{palette, render_png, PlotError};
use crate::{analysis::pca::Projection, config::Config};
use plotters::prelude::*;

/// Bundle path of the PCA scatter plot
pub const PCA_SCATTER: &str = "pcaPlot/pca_scatter_2d.png";

// Axis range of the values `x`, padded by 15% on both ends
fn padded_range(x: impl Iterator<Item = f64>) -> std::ops::Range<f64> {
    let (min, max) = x.fold((f64::INFINITY, f64::NEG_INFINITY), |(a, b), x| {
        (a.min(x), b.max(x))
    });
    if !min.is_finite() || !max.is_finite() {
        return -1f64..1f64;
    }
    let pad = if max > min { 0.15 * (max - min) } else { 1. };
    min - pad..max + pad
}

/// Draws the projected smells on the first 2 principal components and returns the PNG image
///
/// Each smell is annotated with its display name,
/// and each axis with the explained variance of the component.
pub fn pca_scatter(projection: &Projection, config: &Config) -> Result<Vec<u8>, PlotError> {
    let percent = projection.explained_variance_percent();
    let axis = |j: usize| {
        format!(
            "PC{} ({:.2}%)",
            j + 1,
            percent.get(j).copied().unwrap_or_default()
        )
    };
    let x_range = padded_range(projection.points().map(|(_, _, (x, _))| x));
    let y_range = padded_range(projection.points().map(|(_, _, (_, y))| y));
    render_png("PCA scatter", config.pca_size, |root| {
        let mut chart = ChartBuilder::on(root)
            .caption("PCA of smell sensor profiles", ("sans-serif", 22))
            .set_label_area_size(LabelAreaPosition::Left, 60)
            .set_label_area_size(LabelAreaPosition::Bottom, 50)
            .margin(15)
            .build_cartesian_2d(x_range.clone(), y_range.clone())?;
        chart
            .configure_mesh()
            .x_desc(axis(0))
            .y_desc(axis(1))
            .draw()?;

        let axes = BLACK.mix(0.3);
        chart.draw_series(LineSeries::new(
            vec![(x_range.start, 0.), (x_range.end, 0.)],
            &axes,
        ))?;
        chart.draw_series(LineSeries::new(
            vec![(0., y_range.start), (0., y_range.end)],
            &axes,
        ))?;

        chart.draw_series(projection.points().enumerate().map(|(i, (_, name, xy))| {
            let rgb = palette(i);
            EmptyElement::at(xy)
                + Circle::new((0, 0), 6, rgb.filled())
                + Text::new(name.to_string(), (8, -14), ("sans-serif", 14).into_font())
        }))?;
        Ok(())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::{AggregateRow, Aggregates};

    #[test]
    fn axis_padding() {
        assert_eq!(padded_range([0., 10.].into_iter()), -1.5..11.5);
        assert_eq!(padded_range([2.].into_iter()), 1.0..3.0);
        assert_eq!(padded_range(std::iter::empty()), -1.0..1.0);
    }

    #[test]
    fn scatter_png() -> Result<(), Box<dyn std::error::Error>> {
        let aggregates: Aggregates = (0..4)
            .map(|k| AggregateRow {
                label: format!("Smell{k}"),
                name: format!("กลิ่น {k}"),
                values: std::array::from_fn(|c| Some((100 * k + 7 * c * c) as f64)),
            })
            .collect::<Vec<_>>()
            .into();
        let projection = Projection::new(&aggregates)?;
        let config = Config::default().pca_size((320, 240));
        let png = pca_scatter(&projection, &config)?;
        assert!(png.starts_with(b"\x89PNG"));
        Ok(())
    }
}
