use crate::{
    analysis::{hca::HcaError, AnalysisError},
    bundle::BundleError,
    dataset::DatasetError,
    names::NameMapError,
    plot::PlotError,
};

/// A required column is absent from an input table
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum SchemaError {
    #[error("{table} table is missing the required column {column:?}")]
    MissingColumn { table: &'static str, column: String },
}
impl SchemaError {
    /// Checks that the headers include all the columns
    pub(crate) fn require(
        table: &'static str,
        headers: &csv::StringRecord,
        columns: &[&str],
    ) -> Result<(), Self> {
        match columns.iter().find(|&&c| !headers.iter().any(|h| h == c)) {
            Some(column) => Err(SchemaError::MissingColumn {
                table,
                column: column.to_string(),
            }),
            None => Ok(()),
        }
    }
}

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("error in the labeled dataset")]
    Dataset(#[from] DatasetError),
    #[error("error in the smell name table")]
    NameMap(#[from] NameMapError),
    #[error("error in the PCA analysis")]
    Analysis(#[from] AnalysisError),
    #[error("error in the hierarchical clustering")]
    Hca(#[from] HcaError),
    #[error("error while rendering a chart")]
    Plot(#[from] PlotError),
    #[error("error while writing the outputs")]
    Bundle(#[from] BundleError),
    #[error("failed to write a CSV table")]
    Csv(#[from] csv::Error),
}
impl Error {
    /// Returns the [SchemaError] at the origin of the error, if any
    pub fn schema(&self) -> Option<&SchemaError> {
        match self {
            Error::Dataset(DatasetError::Schema(e)) => Some(e),
            Error::NameMap(NameMapError::Schema(e)) => Some(e),
            _ => None,
        }
    }
}
