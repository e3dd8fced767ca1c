//! # Smell dataset analysis
//!
//! Statistics and charts of an electronic nose dataset where time ranges of the
//! 8 sensor channels `s1` to `s8` have been labeled with a smell.
//!
//! The labeled dataset is sorted by smell label, the channels are averaged per label
//! and the averages are charted as radar profiles, projected on their first 2 principal
//! components and clustered with Ward's hierarchical clustering.
//! All the tables and charts are gathered into a [Bundle]:
//!
//! ```no_run
//! use smell_model::{process_smell_label, Config, DatasetLoader, NameMapLoader};
//!
//! # fn main() -> anyhow::Result<()> {
//! let data = DatasetLoader::default().data_path("smell_label.csv").load()?;
//! let names = NameMapLoader::default().data_path("smell_Name.csv").load()?;
//! let bundle = process_smell_label(&data, &names, &Config::default())?;
//! bundle.write_to("smell_model_outputs")?;
//! # Ok(())
//! # }
//! ```

pub mod aggregate;
pub mod analysis;
pub mod bundle;
pub mod channel;
pub mod config;
pub mod dataset;
mod error;
pub mod names;
pub mod pipeline;
pub mod plot;
pub mod sorter;
pub mod table;

pub use aggregate::{AggregateRow, Aggregates};
pub use bundle::{Artifact, Bundle};
pub use channel::{Channel, CHANNELS};
pub use config::Config;
pub use dataset::{DatasetLoader, LabeledData, SensorRecord};
pub use error::{Error, SchemaError};
pub use names::{NameMap, NameMapLoader};
pub use pipeline::{process_smell_label, process_smell_label_from};
