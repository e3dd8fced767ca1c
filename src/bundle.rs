//! Output bundle
//!
//! The pipeline output is a set of artifacts keyed by their relative path:
//! CSV tables as text and charts as PNG images.

use crate::Error;
use std::{
    collections::BTreeMap,
    fmt, fs,
    path::{Path, PathBuf},
};

pub const SORTED_LABELED_DATA: &str = "sorted_labeled_data.csv";
pub const DATASET: &str = "dataset.csv";
pub const AVERAGE_SENSOR_VALUES: &str = "average_smell_sensor_values.csv";
pub const PCA_RESULTS: &str = "pca_results.csv";
pub const PCA_VARIANCE: &str = "pca_variance.csv";
pub const PCA_COMPONENTS: &str = "pca_components.csv";
pub const HCA_LINKAGE_MATRIX: &str = "hca_linkage_matrix.csv";

#[derive(thiserror::Error, Debug)]
pub enum BundleError {
    #[error("failed to write {1:?}")]
    Io(#[source] std::io::Error, PathBuf),
}

/// Bundle entry
#[derive(Debug, Clone, PartialEq)]
pub enum Artifact {
    /// UTF-8 text
    Text(String),
    /// binary content
    Binary(Vec<u8>),
}
impl Artifact {
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Artifact::Text(text) => text.as_bytes(),
            Artifact::Binary(bytes) => bytes,
        }
    }
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Artifact::Text(text) => Some(text),
            Artifact::Binary(_) => None,
        }
    }
}

/// Pipeline stages that may fail without aborting the pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
pub enum Stage {
    #[strum(serialize = "hierarchical clustering")]
    Hca,
}

/// A stage that failed and which artifacts are missing from the bundle
#[derive(Debug)]
pub struct StageFailure {
    pub stage: Stage,
    pub error: Error,
}
impl fmt::Display for StageFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} failed: {}", self.stage, self.error)?;
        let mut source = std::error::Error::source(&self.error);
        while let Some(e) = source {
            write!(f, ": {}", e)?;
            source = e.source();
        }
        Ok(())
    }
}

/// Artifacts ordered by path and the failed stages
#[derive(Debug, Default)]
pub struct Bundle {
    artifacts: BTreeMap<String, Artifact>,
    failures: Vec<StageFailure>,
}
impl Bundle {
    /// Adds an artifact, replacing and returning any artifact with the same path
    pub fn insert<S: Into<String>>(&mut self, path: S, artifact: Artifact) -> Option<Artifact> {
        let path = path.into();
        log::debug!("{} ({} bytes)", path, artifact.as_bytes().len());
        let previous = self.artifacts.insert(path.clone(), artifact);
        if previous.is_some() {
            log::warn!("{} overwritten", path);
        }
        previous
    }
    pub fn insert_text<S: Into<String>>(&mut self, path: S, text: String) -> Option<Artifact> {
        self.insert(path, Artifact::Text(text))
    }
    pub fn insert_binary<S: Into<String>>(&mut self, path: S, bytes: Vec<u8>) -> Option<Artifact> {
        self.insert(path, Artifact::Binary(bytes))
    }
    pub(crate) fn push_failure(&mut self, stage: Stage, error: Error) {
        let failure = StageFailure { stage, error };
        log::warn!("{}", failure);
        self.failures.push(failure);
    }
    pub fn get(&self, path: &str) -> Option<&Artifact> {
        self.artifacts.get(path)
    }
    /// Returns the text of a text artifact
    pub fn text(&self, path: &str) -> Option<&str> {
        self.get(path).and_then(|a| a.as_text())
    }
    pub fn contains(&self, path: &str) -> bool {
        self.artifacts.contains_key(path)
    }
    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.artifacts.keys().map(|k| k.as_str())
    }
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Artifact)> {
        self.artifacts.iter().map(|(k, v)| (k.as_str(), v))
    }
    pub fn len(&self) -> usize {
        self.artifacts.len()
    }
    pub fn is_empty(&self) -> bool {
        self.artifacts.is_empty()
    }
    /// Stages that failed
    pub fn failures(&self) -> &[StageFailure] {
        &self.failures
    }
    /// Writes all the artifacts below `dir`, creating the sub-directories as needed
    pub fn write_to<P: AsRef<Path>>(&self, dir: P) -> Result<Vec<PathBuf>, BundleError> {
        let dir = dir.as_ref();
        let mut written = Vec::with_capacity(self.len());
        for (path, artifact) in self.iter() {
            let file = dir.join(path);
            if let Some(parent) = file.parent() {
                fs::create_dir_all(parent).map_err(|e| BundleError::Io(e, parent.to_path_buf()))?;
            }
            fs::write(&file, artifact.as_bytes()).map_err(|e| BundleError::Io(e, file.clone()))?;
            written.push(file);
        }
        log::info!("{} files written in {:?}", written.len(), dir);
        Ok(written)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::hca::HcaError;

    #[test]
    fn ordered_paths() {
        let mut bundle = Bundle::default();
        bundle.insert_text(PCA_RESULTS, "b".into());
        bundle.insert_binary("radarPlot/radar_chart_x.png", vec![1, 2]);
        bundle.insert_text(DATASET, "a".into());
        assert_eq!(
            bundle.paths().collect::<Vec<_>>(),
            vec![DATASET, PCA_RESULTS, "radarPlot/radar_chart_x.png"]
        );
        assert_eq!(bundle.text(DATASET), Some("a"));
        assert_eq!(bundle.text("radarPlot/radar_chart_x.png"), None);
    }

    #[test]
    fn overwrite() {
        let mut bundle = Bundle::default();
        assert!(bundle.insert_text(DATASET, "a".into()).is_none());
        assert_eq!(
            bundle.insert_text(DATASET, "b".into()),
            Some(Artifact::Text("a".into()))
        );
        assert_eq!(bundle.len(), 1);
    }

    #[test]
    fn failure_message() {
        let mut bundle = Bundle::default();
        bundle.push_failure(Stage::Hca, HcaError::Degenerate { labels: 1 }.into());
        let message = bundle.failures()[0].to_string();
        assert!(message.starts_with("hierarchical clustering failed"));
        assert!(message.contains("at least 2 smell labels, found 1"));
    }

    #[test]
    fn write_to_dir() -> Result<(), Box<dyn std::error::Error>> {
        let dir = std::env::temp_dir().join(format!("smell-model-bundle-{}", std::process::id()));
        let mut bundle = Bundle::default();
        bundle.insert_text(DATASET, "s1,Smell\n".into());
        bundle.insert_binary("hcaPlot/hca_dendrogram.png", vec![0x89, b'P']);
        let written = bundle.write_to(&dir)?;
        assert_eq!(written.len(), 2);
        assert_eq!(fs::read_to_string(dir.join(DATASET))?, "s1,Smell\n");
        assert_eq!(fs::read(dir.join("hcaPlot").join("hca_dendrogram.png"))?, vec![0x89, b'P']);
        fs::remove_dir_all(&dir)?;
        Ok(())
    }
}
