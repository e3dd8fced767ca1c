//! Principal component analysis

use super::{channel_matrix, standardize, AnalysisError};
use crate::{
    aggregate::Aggregates,
    channel::Channel,
    dataset::LABEL,
    names::NAME,
    table::{fmt_value, round_to, write_table},
};
use nalgebra::{DMatrix, SymmetricEigen};
use strum::IntoEnumIterator;

/// Number of principal components of the projection
pub const N_COMPONENTS: usize = 2;

/// Principal components of a sample matrix
#[derive(Debug, Clone)]
pub struct Pca {
    explained_variance_ratio: Vec<f64>,
    // one row per variable, one column per component
    components: DMatrix<f64>,
    // one row per sample, one column per component
    scores: DMatrix<f64>,
}
impl Pca {
    /// Computes the first `n_components` principal components of `x` (one sample per row)
    /// and projects the samples onto them
    ///
    /// The number of components is capped to the number of samples.
    /// The components are the eigenvectors of the covariance matrix in decreasing order
    /// of the eigenvalues, their signs are left as returned by the eigendecomposition.
    pub fn fit(x: &DMatrix<f64>, n_components: usize) -> Result<Self, AnalysisError> {
        let (n, p) = x.shape();
        if n == 0 {
            return Err(AnalysisError::Empty);
        }
        let k = n_components.min(n).min(p);
        let means: Vec<f64> = x.column_iter().map(|c| c.mean()).collect();
        let centered = DMatrix::from_fn(n, p, |i, j| x[(i, j)] - means[j]);
        let covariance = centered.transpose() * &centered / (n.max(2) - 1) as f64;
        let eigen = SymmetricEigen::new(covariance);
        if eigen
            .eigenvalues
            .iter()
            .chain(eigen.eigenvectors.iter())
            .any(|x| !x.is_finite())
        {
            return Err(AnalysisError::NonFinite);
        }
        let mut order: Vec<usize> = (0..p).collect();
        order.sort_by(|&a, &b| eigen.eigenvalues[b].total_cmp(&eigen.eigenvalues[a]));
        // round-off may leave tiny negative eigenvalues
        let variances: Vec<f64> = order.iter().map(|&i| eigen.eigenvalues[i].max(0.)).collect();
        let total: f64 = variances.iter().sum();
        let explained_variance_ratio = variances
            .iter()
            .take(k)
            .map(|v| if total > 0. { v / total } else { 0. })
            .collect();
        let components = DMatrix::from_fn(p, k, |i, j| eigen.eigenvectors[(i, order[j])]);
        let scores = &centered * &components;
        Ok(Self {
            explained_variance_ratio,
            components,
            scores,
        })
    }
    /// Number of computed components
    pub fn n_components(&self) -> usize {
        self.components.ncols()
    }
    /// Fraction of the total variance explained by each component
    pub fn explained_variance_ratio(&self) -> &[f64] {
        &self.explained_variance_ratio
    }
    /// Component loadings: one row per variable, one column per component
    pub fn components(&self) -> &DMatrix<f64> {
        &self.components
    }
    /// Sample projections: one row per sample, one column per component
    pub fn scores(&self) -> &DMatrix<f64> {
        &self.scores
    }
    /// Returns the projection of the `i`th sample on the `j`th component, 0 for a missing component
    pub fn score(&self, i: usize, j: usize) -> f64 {
        if j < self.n_components() {
            self.scores[(i, j)]
        } else {
            0f64
        }
    }
}

/// 2D principal component projection of the per-smell averages
#[derive(Debug, Clone)]
pub struct Projection {
    // label and display name of each sample
    samples: Vec<(String, String)>,
    pca: Pca,
}
impl Projection {
    /// Standardizes the aggregate channel matrix and projects it on its first 2 principal components
    pub fn new(aggregates: &Aggregates) -> Result<Self, AnalysisError> {
        if aggregates.is_empty() {
            return Err(AnalysisError::Empty);
        }
        let x = standardize(&channel_matrix(aggregates));
        let pca = Pca::fit(&x, N_COMPONENTS)?;
        log::info!(
            "PCA explained variance: {:?}%",
            pca.explained_variance_ratio()
                .iter()
                .map(|r| round_to(100. * r, 2))
                .collect::<Vec<_>>()
        );
        Ok(Self {
            samples: aggregates
                .iter()
                .map(|row| (row.label.clone(), row.name.clone()))
                .collect(),
            pca,
        })
    }
    pub fn pca(&self) -> &Pca {
        &self.pca
    }
    /// Number of projected samples
    pub fn len(&self) -> usize {
        self.samples.len()
    }
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
    /// Iterator over the label, display name and (PC1, PC2) coordinates of each sample
    pub fn points(&self) -> impl Iterator<Item = (&str, &str, (f64, f64))> {
        self.samples.iter().enumerate().map(|(i, (label, name))| {
            (
                label.as_str(),
                name.as_str(),
                (self.pca.score(i, 0), self.pca.score(i, 1)),
            )
        })
    }
    /// Explained variance of each component in percent, rounded to 2 decimals
    pub fn explained_variance_percent(&self) -> Vec<f64> {
        self.pca
            .explained_variance_ratio()
            .iter()
            .map(|r| round_to(100. * r, 2))
            .collect()
    }
    /// Writes the projections with the columns `Smell,Name,PC1,PC2`
    pub fn results_csv(&self) -> Result<String, csv::Error> {
        write_table(|wtr| {
            wtr.write_record([LABEL, NAME, "PC1", "PC2"])?;
            for (label, name, (pc1, pc2)) in self.points() {
                wtr.write_record([
                    label.to_string(),
                    name.to_string(),
                    fmt_value(Some(round_to(pc1, 3))),
                    fmt_value(Some(round_to(pc2, 3))),
                ])?;
            }
            Ok(())
        })
    }
    /// Writes the explained variance with the columns `Component,Explained Variance (%)`
    pub fn variance_csv(&self) -> Result<String, csv::Error> {
        write_table(|wtr| {
            wtr.write_record(["Component", "Explained Variance (%)"])?;
            for (j, percent) in self.explained_variance_percent().into_iter().enumerate() {
                wtr.write_record([format!("PC{}", j + 1), fmt_value(Some(percent))])?;
            }
            Ok(())
        })
    }
    /// Writes the loadings with one row per channel: `Sensor,PC1,PC2`
    pub fn components_csv(&self) -> Result<String, csv::Error> {
        let k = self.pca.n_components();
        write_table(|wtr| {
            let mut headers = vec!["Sensor".to_string()];
            headers.extend((1..=k).map(|j| format!("PC{j}")));
            wtr.write_record(&headers)?;
            for channel in Channel::iter() {
                let mut record = vec![channel.header().to_string()];
                record.extend(
                    self.pca
                        .components()
                        .row(channel.index())
                        .iter()
                        .map(|w| fmt_value(Some(round_to(*w, 3)))),
                );
                wtr.write_record(&record)?;
            }
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{aggregate::AggregateRow, channel::CHANNELS};
    use std::error::Error;

    fn aggregates(rows: &[(&str, [f64; CHANNELS])]) -> Aggregates {
        rows.iter()
            .map(|(label, values)| AggregateRow {
                label: label.to_string(),
                name: format!("{label} name"),
                values: values.map(Some),
            })
            .collect::<Vec<_>>()
            .into()
    }

    #[test]
    fn loadings_shape() -> Result<(), Box<dyn Error>> {
        let agg = aggregates(&[
            ("Air Zero", [10., 20., 30., 40., 50., 60., 70., 80.]),
            ("Smell1", [100., 150., 300., 40., 500., 60., 700., 80.]),
            ("Smell2", [300., 20., 10., 400., 50., 600., 70., 800.]),
        ]);
        let projection = Projection::new(&agg)?;
        let pca = projection.pca();
        assert_eq!(pca.components().shape(), (CHANNELS, 2));
        assert_eq!(pca.scores().shape(), (3, 2));
        let ratio: f64 = pca.explained_variance_ratio().iter().sum();
        assert!(ratio > 0. && ratio <= 1. + 1e-12);
        assert!(pca.explained_variance_ratio()[0] >= pca.explained_variance_ratio()[1]);
        for column in pca.components().column_iter() {
            assert!((column.norm() - 1.).abs() < 1e-9);
        }
        let results = projection.results_csv()?;
        let lines: Vec<_> = results.lines().collect();
        assert_eq!(lines[0], "Smell,Name,PC1,PC2");
        assert_eq!(lines.len(), 4);
        assert!(lines[1].starts_with("Air Zero,Air Zero name,"));
        assert_eq!(projection.components_csv()?.lines().count(), 1 + CHANNELS);
        Ok(())
    }

    #[test]
    fn single_label() -> Result<(), Box<dyn Error>> {
        let agg = aggregates(&[("Smell1", [1., 2., 3., 4., 5., 6., 7., 8.])]);
        let projection = Projection::new(&agg)?;
        assert_eq!(projection.pca().n_components(), 1);
        assert_eq!(projection.pca().components().shape(), (CHANNELS, 1));
        assert_eq!(
            projection.results_csv()?,
            "Smell,Name,PC1,PC2\nSmell1,Smell1 name,0.0,0.0\n"
        );
        assert_eq!(
            projection.variance_csv()?,
            "Component,Explained Variance (%)\nPC1,0.0\n"
        );
        assert!(projection.components_csv()?.starts_with("Sensor,PC1\ns1,"));
        Ok(())
    }

    #[test]
    fn collinear_profiles() -> Result<(), Box<dyn Error>> {
        let base = [1., 2., 3., 4., 5., 6., 7., 8.];
        let agg = aggregates(&[
            ("a", base.map(|x| x * 10.)),
            ("b", base.map(|x| x * 20.)),
            ("c", base.map(|x| x * 30.)),
        ]);
        let projection = Projection::new(&agg)?;
        assert_eq!(projection.explained_variance_percent()[0], 100.);
        let pc1: Vec<f64> = projection.points().map(|(_, _, (x, _))| x).collect();
        assert!((pc1[0] + pc1[2]).abs() < 1e-9);
        assert!(pc1[1].abs() < 1e-9);
        // all channels weigh the same on the first component
        let w = projection.pca().components().column(0);
        assert!(w.iter().all(|x| (x.abs() - 8f64.sqrt().recip()).abs() < 1e-9));
        assert!(projection
            .variance_csv()?
            .starts_with("Component,Explained Variance (%)\nPC1,100.0\n"));
        Ok(())
    }

    #[test]
    fn empty_table() {
        assert!(matches!(
            Projection::new(&Aggregates::default()),
            Err(AnalysisError::Empty)
        ));
    }
}
