//! Labeled dataset processing
//!
//! The stages run in sequence, each one reading the output of the previous ones:
//! label sorting, per-smell averaging, radar charts, principal component analysis
//! and hierarchical clustering.

use crate::{
    aggregate::Aggregates,
    analysis::{
        hca::{self, HcaError},
        pca::Projection,
    },
    bundle::{self, Bundle, Stage},
    config::Config,
    dataset::LabeledData,
    names::NameMap,
    plot::{dendrogram, radar, scatter},
    sorter::sort_by_label,
    Error,
};
use std::{collections::HashMap, io::Read, time::Instant};

type Result<T> = std::result::Result<T, Error>;

/// Processes a labeled dataset into the output bundle
///
/// Any error aborts the processing except for the clustering of less than 2 smell labels:
/// the clustering artifacts are then missing and the failure is listed in the bundle.
pub fn process_smell_label(data: &LabeledData, names: &NameMap, config: &Config) -> Result<Bundle> {
    let now = Instant::now();
    let mut bundle = Bundle::default();

    let sorted = sort_by_label(data)?;
    bundle.insert_text(bundle::SORTED_LABELED_DATA, sorted.to_csv()?);
    bundle.insert_text(bundle::DATASET, sorted.to_dataset_csv()?);

    let aggregates = Aggregates::from_labeled(&sorted, names);
    bundle.insert_text(bundle::AVERAGE_SENSOR_VALUES, aggregates.to_csv()?);

    radar_charts(&aggregates, config, &mut bundle)?;
    projection(&aggregates, config, &mut bundle)?;
    match clustering(&aggregates, config, &mut bundle) {
        Err(Error::Hca(e @ HcaError::Degenerate { .. })) => bundle.push_failure(Stage::Hca, e.into()),
        result => result?,
    }

    log::info!(
        "{} artifacts in {}ms",
        bundle.len(),
        now.elapsed().as_millis()
    );
    Ok(bundle)
}

/// Reads the labeled dataset and the smell names from CSV readers and processes them
pub fn process_smell_label_from<R1: Read, R2: Read>(
    labels: R1,
    names: R2,
    config: &Config,
) -> Result<Bundle> {
    let data = LabeledData::from_reader(labels)?;
    let names = NameMap::from_reader(names)?;
    process_smell_label(&data, &names, config)
}

fn radar_charts(aggregates: &Aggregates, config: &Config, bundle: &mut Bundle) -> Result<()> {
    let mut slugs: HashMap<String, &str> = HashMap::new();
    for row in aggregates.iter() {
        let path = radar::radar_path(&row.label);
        if let Some(other) = slugs.insert(path.clone(), &row.label) {
            log::warn!(
                "{:?} and {:?} share the radar chart file name {}",
                other,
                row.label,
                path
            );
        }
        bundle.insert_binary(path, radar::radar_chart(row, config)?);
    }
    log::info!("{} radar charts", aggregates.len());
    Ok(())
}

fn projection(aggregates: &Aggregates, config: &Config, bundle: &mut Bundle) -> Result<()> {
    let projection = Projection::new(aggregates)?;
    bundle.insert_text(bundle::PCA_RESULTS, projection.results_csv()?);
    bundle.insert_text(bundle::PCA_VARIANCE, projection.variance_csv()?);
    bundle.insert_text(bundle::PCA_COMPONENTS, projection.components_csv()?);
    bundle.insert_binary(scatter::PCA_SCATTER, scatter::pca_scatter(&projection, config)?);
    Ok(())
}

fn clustering(aggregates: &Aggregates, config: &Config, bundle: &mut Bundle) -> Result<()> {
    let linkage = hca::cluster(aggregates)?;
    let png = dendrogram::dendrogram(&linkage, &aggregates.names(), config)?;
    bundle.insert_text(bundle::HCA_LINKAGE_MATRIX, linkage.to_csv()?);
    bundle.insert_binary(dendrogram::DENDROGRAM, png);
    Ok(())
}
