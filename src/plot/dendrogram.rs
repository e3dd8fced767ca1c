//! Dendrogram of the hierarchical clustering

use super::{palette, render_png, PlotError};
use crate::{analysis::hca::Linkage, config::Config};
use plotters::{prelude::*, style::FontTransform};

/// Bundle path of the dendrogram
pub const DENDROGRAM: &str = "hcaPlot/hca_dendrogram.png";

/// Dendrogram link: the `⊓` shape joining 2 merged clusters
#[derive(Debug, Clone, PartialEq)]
pub struct Link {
    pub path: [(f64, f64); 4],
    /// subtree color index, `None` above the color threshold
    pub color: Option<usize>,
}

/// Dendrogram geometry
///
/// The leaves are 10 units apart, the first one at 5, and the links go up to the merge distance.
/// Each subtree which root is below the color threshold gets its own color.
#[derive(Debug, Clone, PartialEq)]
pub struct DendrogramLayout {
    /// samples from left to right
    pub leaves: Vec<usize>,
    /// one link per merge, in linkage order
    pub links: Vec<Link>,
}
impl DendrogramLayout {
    pub fn new(linkage: &Linkage, threshold: f64) -> Self {
        let n = linkage.n_leaves();
        let leaves = linkage.leaves();
        let mut xy = vec![(0f64, 0f64); n + linkage.merges().len()];
        for (k, &leaf) in leaves.iter().enumerate() {
            xy[leaf] = (10. * k as f64 + 5., 0.);
        }
        let mut links: Vec<Link> = linkage
            .merges()
            .iter()
            .enumerate()
            .map(|(i, merge)| {
                let (a, b) = (xy[merge.clusters.0], xy[merge.clusters.1]);
                xy[n + i] = (0.5 * (a.0 + b.0), merge.distance);
                Link {
                    path: [a, (a.0, merge.distance), (b.0, merge.distance), b],
                    color: None,
                }
            })
            .collect();
        // colors are given to the subtrees from left to right
        let mut next_color = 0;
        let mut stack = vec![(linkage.root(), None)];
        while let Some((id, inherited)) = stack.pop() {
            let Some(merge) = linkage.merge(id) else {
                continue;
            };
            let color = inherited.or_else(|| {
                (merge.distance < threshold).then(|| {
                    next_color += 1;
                    next_color - 1
                })
            });
            links[id - n].color = color;
            stack.push((merge.clusters.1, color));
            stack.push((merge.clusters.0, color));
        }
        Self { leaves, links }
    }
}

fn link_color(color: Option<usize>) -> RGBColor {
    match color {
        Some(c) => palette(1 + c % 9),
        None => palette(0),
    }
}

/// Draws the dendrogram of the linkage and returns the PNG image
///
/// `names` are the leaf labels in sample order.
/// The color threshold is the configured fraction of the largest merge distance.
pub fn dendrogram(linkage: &Linkage, names: &[&str], config: &Config) -> Result<Vec<u8>, PlotError> {
    let max_distance = linkage.max_distance();
    let threshold = config.color_threshold_ratio * max_distance;
    let layout = DendrogramLayout::new(linkage, threshold);
    let width = 10. * linkage.n_leaves() as f64;
    let height = if max_distance > 0. {
        1.05 * max_distance
    } else {
        1.
    };
    render_png("dendrogram", config.dendrogram_size, |root| {
        let mut chart = ChartBuilder::on(root)
            .caption("Hierarchical clustering (Ward)", ("sans-serif", 22))
            .set_label_area_size(LabelAreaPosition::Left, 60)
            .set_label_area_size(LabelAreaPosition::Bottom, 160)
            .margin(15)
            .build_cartesian_2d(0f64..width, 0f64..height)?;
        chart
            .configure_mesh()
            .disable_x_mesh()
            .disable_x_axis()
            .y_desc("Distance")
            .draw()?;

        chart.draw_series(layout.links.iter().map(|link| {
            PathElement::new(link.path.to_vec(), link_color(link.color).stroke_width(2))
        }))?;
        if threshold > 0. {
            chart.draw_series(LineSeries::new(
                vec![(0., threshold), (width, threshold)],
                &BLACK.mix(0.3),
            ))?;
        }

        let style = ("sans-serif", 14)
            .into_font()
            .transform(FontTransform::Rotate90)
            .color(&BLACK);
        for (k, &leaf) in layout.leaves.iter().enumerate() {
            let (x, y) = chart.backend_coord(&(10. * k as f64 + 5., 0.));
            root.draw(&Text::new(
                names.get(leaf).copied().unwrap_or_default().to_string(),
                (x, y + 8),
                style.clone(),
            ))?;
        }
        Ok(())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::DMatrix;
    use std::error::Error;

    fn linkage() -> Result<Linkage, Box<dyn Error>> {
        Ok(Linkage::ward(&DMatrix::from_row_slice(
            4,
            1,
            &[0., 1., 5., 6.],
        ))?)
    }

    #[test]
    fn link_geometry() -> Result<(), Box<dyn Error>> {
        let linkage = linkage()?;
        let layout = DendrogramLayout::new(&linkage, 0.7 * linkage.max_distance());
        assert_eq!(layout.leaves, vec![0, 1, 2, 3]);
        assert_eq!(layout.links[0].path, [(5., 0.), (5., 1.), (15., 1.), (15., 0.)]);
        assert_eq!(layout.links[1].path, [(25., 0.), (25., 1.), (35., 1.), (35., 0.)]);
        let root = &layout.links[2];
        assert_eq!(root.path[0], (10., 1.));
        assert_eq!(root.path[3], (30., 1.));
        Ok(())
    }

    #[test]
    fn subtree_colors() -> Result<(), Box<dyn Error>> {
        let linkage = linkage()?;
        let colors: Vec<_> = DendrogramLayout::new(&linkage, 0.7 * linkage.max_distance())
            .links
            .into_iter()
            .map(|link| link.color)
            .collect();
        assert_eq!(colors, vec![Some(0), Some(1), None]);
        let colors: Vec<_> = DendrogramLayout::new(&linkage, 100.)
            .links
            .into_iter()
            .map(|link| link.color)
            .collect();
        assert_eq!(colors, vec![Some(0); 3]);
        Ok(())
    }

    #[test]
    fn dendrogram_png() -> Result<(), Box<dyn Error>> {
        let linkage = linkage()?;
        let config = Config::default().dendrogram_size((400, 300));
        let png = dendrogram(&linkage, &["Air Zero", "Smell1", "Smell2", "กาแฟ"], &config)?;
        assert!(png.starts_with(b"\x89PNG"));
        Ok(())
    }
}
