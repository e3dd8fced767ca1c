//! Analysis settings

/// Rendering settings of the charts
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// radial axis upper bound of the radar charts: the sensor full scale
    pub radial_max: f64,
    /// dendrogram color threshold as a fraction of the largest merge distance
    pub color_threshold_ratio: f64,
    /// radar chart size in pixels
    pub radar_size: (u32, u32),
    /// PCA scatter plot size in pixels
    pub pca_size: (u32, u32),
    /// dendrogram size in pixels
    pub dendrogram_size: (u32, u32),
}
impl Default for Config {
    fn default() -> Self {
        Self {
            radial_max: 1024.,
            color_threshold_ratio: 0.7,
            radar_size: (600, 600),
            pca_size: (800, 600),
            dendrogram_size: (1000, 600),
        }
    }
}
impl Config {
    pub fn radial_max(self, radial_max: f64) -> Self {
        Self { radial_max, ..self }
    }
    pub fn color_threshold_ratio(self, color_threshold_ratio: f64) -> Self {
        Self {
            color_threshold_ratio,
            ..self
        }
    }
    pub fn radar_size(self, radar_size: (u32, u32)) -> Self {
        Self { radar_size, ..self }
    }
    pub fn pca_size(self, pca_size: (u32, u32)) -> Self {
        Self { pca_size, ..self }
    }
    pub fn dendrogram_size(self, dendrogram_size: (u32, u32)) -> Self {
        Self {
            dendrogram_size,
            ..self
        }
    }
}
