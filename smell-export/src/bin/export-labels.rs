use anyhow::Context;
use smell_export::{
    export_splits, parse_local, sort_serial_numbers, CsvSource, Entity, ExportConfig, SplitsLoader,
    Window,
};
use std::path::PathBuf;
use structopt::StructOpt;

#[derive(Debug, StructOpt)]
#[structopt(
    name = "export-labels",
    about = "Exports the sensor data of labeled time ranges into smell_label.csv and smell_Name.csv"
)]
struct Opt {
    /// Path to the raw samples CSV file (time,sn,sName,s1,...,s8)
    #[structopt(short, long, parse(from_os_str))]
    samples: PathBuf,
    /// Path to the label splits CSV file (start,end,label,name)
    #[structopt(long, parse(from_os_str))]
    splits: Option<PathBuf>,
    /// Measurement name
    #[structopt(short, long, default_value = "enose")]
    measurement: String,
    /// Device serial number
    #[structopt(long)]
    serial: Option<String>,
    /// Station name, used when the serial number is not given
    #[structopt(long)]
    station: Option<String>,
    /// Window start, local time "YYYY-MM-DD HH:MM[:SS]" (default: earliest split start)
    #[structopt(long)]
    start: Option<String>,
    /// Window end, local time "YYYY-MM-DD HH:MM[:SS]" (default: latest split end)
    #[structopt(long)]
    end: Option<String>,
    /// Local time offset from UTC in hours
    #[structopt(long)]
    utc_offset: Option<f64>,
    /// Output directory
    #[structopt(short, long, parse(from_os_str), default_value = ".")]
    output: PathBuf,
    /// List the serial numbers of the samples and exit
    #[structopt(long)]
    list_serials: bool,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let opt = Opt::from_args();

    let source = CsvSource::from_path(&opt.samples)?;
    if opt.list_serials {
        let mut rdr = csv::Reader::from_path(&opt.samples)?;
        let i_sn = rdr
            .headers()?
            .iter()
            .position(|h| h == "sn")
            .context("no `sn` column in the samples")?;
        let mut serials = vec![];
        for record in rdr.records() {
            if let Some(sn) = record?.get(i_sn) {
                serials.push(sn.to_string());
            }
        }
        sort_serial_numbers(&serials)
            .iter()
            .for_each(|sn| println!("{}", sn));
        return Ok(());
    }

    let entity = match (opt.serial, opt.station) {
        (Some(sn), _) => Entity::Serial(sn),
        (None, Some(station)) => Entity::Station(station),
        (None, None) => anyhow::bail!("either a serial number or a station name is required"),
    };
    let mut loader = SplitsLoader::default();
    if let Some(arg) = opt.splits {
        loader = loader.data_path(arg);
    }
    let splits = loader.load()?;
    let window = Window {
        start: match opt.start {
            Some(arg) => parse_local(&arg)?,
            None => splits
                .iter()
                .map(|s| s.start)
                .min()
                .context("no label split")?,
        },
        end: match opt.end {
            Some(arg) => parse_local(&arg)?,
            None => splits
                .iter()
                .map(|s| s.end)
                .max()
                .context("no label split")?,
        },
    };
    let mut config = ExportConfig::default();
    if let Some(arg) = opt.utc_offset {
        config = config.utc_offset((arg * 3600.).round() as i32);
    }

    let export = export_splits(
        &source,
        &opt.measurement,
        &entity,
        &window,
        &splits,
        &config,
    )?;
    for path in export.write_to(&opt.output)? {
        println!("{:?}", path);
    }
    println!(
        "{} records from {} of {} splits ({})",
        export.records,
        export.splits,
        splits.len(),
        entity
    );

    Ok(())
}
