//! Multivariate analysis of the per-smell averages
//!
//! Both the principal component analysis and the hierarchical clustering work on the
//! standardized channel matrix of the aggregate table: one row per smell label,
//! one column per channel.

use crate::{aggregate::Aggregates, channel::CHANNELS};
use nalgebra::DMatrix;

pub mod hca;
pub mod pca;

#[derive(thiserror::Error, Debug)]
pub enum AnalysisError {
    #[error("the aggregate table is empty")]
    Empty,
    #[error("the eigendecomposition of the covariance matrix is not finite")]
    NonFinite,
}

/// Returns the channel matrix of the aggregate table
///
/// Missing channel means are replaced by the mean of the channel over the other labels,
/// or by 0 if no label has a value for the channel.
pub fn channel_matrix(aggregates: &Aggregates) -> DMatrix<f64> {
    let n = aggregates.len();
    let column_means: Vec<f64> = (0..CHANNELS)
        .map(|j| {
            let (sum, count) = aggregates
                .iter()
                .filter_map(|row| row.values[j])
                .fold((0f64, 0usize), |(s, c), x| (s + x, c + 1));
            if count > 0 {
                sum / count as f64
            } else {
                0f64
            }
        })
        .collect();
    DMatrix::from_fn(n, CHANNELS, |i, j| {
        let row = &aggregates.rows()[i];
        row.values[j].unwrap_or_else(|| {
            log::warn!(
                "{:?}: missing s{} mean replaced by {:.2}",
                row.label,
                j + 1,
                column_means[j]
            );
            column_means[j]
        })
    })
}

/// Centers each column to zero mean and scales it to unit variance
///
/// The variance is the population variance. A constant column is only centered.
pub fn standardize(x: &DMatrix<f64>) -> DMatrix<f64> {
    let n = x.nrows() as f64;
    let mut z = x.clone();
    for mut column in z.column_iter_mut() {
        let mean = column.sum() / n;
        let std = (column.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / n).sqrt();
        let scale = if std <= 10. * f64::EPSILON * mean.abs().max(1.) {
            1.
        } else {
            std
        };
        column.apply(|x| *x = (*x - mean) / scale);
    }
    z
}
