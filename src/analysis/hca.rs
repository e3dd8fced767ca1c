//! Agglomerative hierarchical clustering

use super::{channel_matrix, standardize};
use crate::{
    aggregate::Aggregates,
    table::{fmt_value, write_table},
};
use nalgebra::DMatrix;

#[derive(thiserror::Error, Debug)]
pub enum HcaError {
    #[error("hierarchical clustering requires at least 2 smell labels, found {labels}")]
    Degenerate { labels: usize },
}
type Result<T> = std::result::Result<T, HcaError>;

/// Linkage matrix row: the merge of 2 clusters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Merge {
    /// ids of the merged clusters, smaller id first
    pub clusters: (usize, usize),
    /// Ward distance between the merged clusters
    pub distance: f64,
    /// number of samples in the new cluster
    pub size: usize,
}

/// Linkage matrix
///
/// Samples are the clusters `0` to `n-1` and the `i`th merge creates the cluster `n+i`.
#[derive(Debug, Clone, PartialEq)]
pub struct Linkage {
    n_leaves: usize,
    merges: Vec<Merge>,
}
impl Linkage {
    /// Ward's minimum variance clustering of the rows of `x`
    ///
    /// The distances between clusters are updated with the Lance-Williams recurrence,
    /// starting from the Euclidean distances between the rows.
    /// Ties go to the pair of clusters found first.
    pub fn ward(x: &DMatrix<f64>) -> Result<Self> {
        let n = x.nrows();
        if n < 2 {
            return Err(HcaError::Degenerate { labels: n });
        }
        let mut d = DMatrix::from_fn(n, n, |i, j| (x.row(i) - x.row(j)).norm());
        // (cluster id, size) of the clusters still to be merged, indexed by their first sample
        let mut active: Vec<Option<(usize, usize)>> = (0..n).map(|i| Some((i, 1))).collect();
        let mut merges = Vec::with_capacity(n - 1);
        for step in 0..n - 1 {
            let mut closest: Option<(usize, usize, f64)> = None;
            for i in 0..n {
                if active[i].is_none() {
                    continue;
                }
                for j in i + 1..n {
                    if active[j].is_none() {
                        continue;
                    }
                    if closest.map_or(true, |(_, _, dmin)| d[(i, j)] < dmin) {
                        closest = Some((i, j, d[(i, j)]));
                    }
                }
            }
            let Some((i, j, dij)) = closest else {
                break;
            };
            let (Some((id_i, n_i)), Some((id_j, n_j))) = (active[i], active[j]) else {
                break;
            };
            for k in 0..n {
                let Some((_, n_k)) = active[k] else {
                    continue;
                };
                if k == i || k == j {
                    continue;
                }
                let (n_i, n_j, n_k) = (n_i as f64, n_j as f64, n_k as f64);
                let d2 = ((n_k + n_i) * d[(k, i)].powi(2) + (n_k + n_j) * d[(k, j)].powi(2)
                    - n_k * dij.powi(2))
                    / (n_i + n_j + n_k);
                let dk = d2.max(0.).sqrt();
                d[(k, i)] = dk;
                d[(i, k)] = dk;
            }
            merges.push(Merge {
                clusters: (id_i.min(id_j), id_i.max(id_j)),
                distance: dij,
                size: n_i + n_j,
            });
            active[i] = Some((n + step, n_i + n_j));
            active[j] = None;
        }
        Ok(Self {
            n_leaves: n,
            merges,
        })
    }
    /// Number of clustered samples
    pub fn n_leaves(&self) -> usize {
        self.n_leaves
    }
    pub fn merges(&self) -> &[Merge] {
        &self.merges
    }
    /// Returns the merge that created the cluster `id`, `None` for a sample
    pub fn merge(&self, id: usize) -> Option<&Merge> {
        id.checked_sub(self.n_leaves)
            .and_then(|i| self.merges.get(i))
    }
    /// Largest merge distance
    pub fn max_distance(&self) -> f64 {
        self.merges
            .iter()
            .map(|m| m.distance)
            .fold(0f64, f64::max)
    }
    /// Id of the cluster of all the samples
    pub fn root(&self) -> usize {
        self.n_leaves + self.merges.len() - 1
    }
    /// Returns the samples in the order they appear as the tree leaves, left to right
    pub fn leaves(&self) -> Vec<usize> {
        let mut leaves = Vec::with_capacity(self.n_leaves);
        let mut stack = vec![self.root()];
        while let Some(id) = stack.pop() {
            match self.merge(id) {
                Some(merge) => {
                    stack.push(merge.clusters.1);
                    stack.push(merge.clusters.0);
                }
                None => leaves.push(id),
            }
        }
        leaves
    }
    /// Writes the linkage matrix with the columns `Cluster1,Cluster2,Distance,Sample_Count`
    pub fn to_csv(&self) -> std::result::Result<String, csv::Error> {
        write_table(|wtr| {
            wtr.write_record(["Cluster1", "Cluster2", "Distance", "Sample_Count"])?;
            for merge in &self.merges {
                wtr.write_record([
                    fmt_value(Some(merge.clusters.0 as f64)),
                    fmt_value(Some(merge.clusters.1 as f64)),
                    fmt_value(Some(merge.distance)),
                    fmt_value(Some(merge.size as f64)),
                ])?;
            }
            Ok(())
        })
    }
}

/// Ward clustering of the standardized per-smell averages
pub fn cluster(aggregates: &Aggregates) -> Result<Linkage> {
    if aggregates.len() < 2 {
        return Err(HcaError::Degenerate {
            labels: aggregates.len(),
        });
    }
    let linkage = Linkage::ward(&standardize(&channel_matrix(aggregates)))?;
    log::info!(
        "HCA: {} merges, max. distance {:.3}",
        linkage.merges().len(),
        linkage.max_distance()
    );
    Ok(linkage)
}
