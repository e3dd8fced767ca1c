//! Chart rendering
//!
//! Each chart is drawn on its own in-memory RGB surface and encoded to PNG
//! before the next chart is started.

use plotters::{coord::Shift, prelude::*};
use std::{error::Error, io::Cursor};

pub mod dendrogram;
pub mod radar;
pub mod scatter;

#[derive(thiserror::Error, Debug)]
pub enum PlotError {
    #[error("failed to draw the {0} chart: {1}")]
    Drawing(&'static str, String),
    #[error("failed to encode the {0} chart into PNG")]
    Encode(&'static str, #[source] image::ImageError),
    #[error("the {0} chart image is {1}x{2} pixels")]
    Size(&'static str, u32, u32),
    #[error("the radar chart radial maximum must be a positive number, found {0}")]
    RadialMax(f64),
}

/// Chart drawing area
pub type Canvas<'a> = DrawingArea<BitMapBackend<'a>, Shift>;

/// Renders a chart into a white `size` RGB image and returns the PNG bytes
pub fn render_png<F>(chart: &'static str, size: (u32, u32), draw: F) -> Result<Vec<u8>, PlotError>
where
    F: FnOnce(&Canvas) -> Result<(), Box<dyn Error>>,
{
    let (width, height) = size;
    if width == 0 || height == 0 {
        return Err(PlotError::Size(chart, width, height));
    }
    let drawing = |e: Box<dyn Error>| PlotError::Drawing(chart, e.to_string());
    let mut buffer = vec![0u8; width as usize * height as usize * 3];
    {
        let root = BitMapBackend::with_buffer(&mut buffer, size).into_drawing_area();
        root.fill(&WHITE).map_err(|e| drawing(e.into()))?;
        draw(&root).map_err(drawing)?;
        root.present().map_err(|e| drawing(e.into()))?;
    }
    let image = image::RgbImage::from_raw(width, height, buffer)
        .ok_or(PlotError::Size(chart, width, height))?;
    let mut png = Cursor::new(Vec::new());
    image
        .write_to(&mut png, image::ImageFormat::Png)
        .map_err(|e| PlotError::Encode(chart, e))?;
    log::debug!("{} chart: {} PNG bytes", chart, png.get_ref().len());
    Ok(png.into_inner())
}

/// Returns the `i`th color of the categorical palette
pub fn palette(i: usize) -> RGBColor {
    let color = colorous::TABLEAU10[i % colorous::TABLEAU10.len()];
    RGBColor(color.r, color.g, color.b)
}
