use smell_model::{
    bundle::AVERAGE_SENSOR_VALUES, process_smell_label, Aggregates, Config, DatasetLoader,
    NameMapLoader,
};
use std::path::PathBuf;
use structopt::StructOpt;

#[derive(Debug, StructOpt)]
#[structopt(
    name = "smell-model",
    about = "Smell dataset statistics, radar charts, PCA and hierarchical clustering"
)]
struct Opt {
    /// Path to the labeled sensor data CSV file (optionally gzipped)
    #[structopt(short, long, parse(from_os_str))]
    labels: Option<PathBuf>,
    /// Path to the smell name CSV file
    #[structopt(short, long, parse(from_os_str))]
    names: Option<PathBuf>,
    /// Output directory
    #[structopt(short, long, parse(from_os_str), default_value = "smell_model_outputs")]
    output: PathBuf,
    /// Radar charts radial axis maximum
    #[structopt(long)]
    radial_max: Option<f64>,
    /// Dendrogram color threshold as a fraction of the largest merge distance
    #[structopt(long)]
    color_threshold: Option<f64>,
    /// Print the average sensor values
    #[structopt(short, long)]
    summary: bool,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let opt = Opt::from_args();

    let mut data_loader = DatasetLoader::default();
    if let Some(arg) = opt.labels {
        data_loader = data_loader.data_path(arg);
    }
    let mut names_loader = NameMapLoader::default();
    if let Some(arg) = opt.names {
        names_loader = names_loader.data_path(arg);
    }
    let mut config = Config::default();
    if let Some(arg) = opt.radial_max {
        config = config.radial_max(arg);
    }
    if let Some(arg) = opt.color_threshold {
        config = config.color_threshold_ratio(arg);
    }

    let data = data_loader.load()?;
    let names = names_loader.load()?;
    let bundle = process_smell_label(&data, &names, &config)?;

    if opt.summary {
        if let Some(table) = bundle.text(AVERAGE_SENSOR_VALUES) {
            print!("{}", Aggregates::from_reader(table.as_bytes())?);
        }
    }
    for failure in bundle.failures() {
        eprintln!("WARNING: {}", failure);
    }
    let written = bundle.write_to(&opt.output)?;
    println!("{} files written in {:?}", written.len(), opt.output);

    Ok(())
}
