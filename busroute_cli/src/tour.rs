use std::{fs::File, io::BufReader, path::PathBuf};

use anyhow::Context;
use busroute_optimizer::{
    json::legacy::LegacyStopTable,
    solver::solver_params::SolverParams,
};
use clap::Args;
use tracing::info;

use crate::parsers;

#[derive(Args)]
pub struct TourArgs {
    /// Stop table, CSV with `R.No`, `Boarding Point`, `lat`, `lon` and `Time`
    /// columns, or a JSON array of the same records when the file ends in `.json`
    #[arg(short, long)]
    input: PathBuf,

    #[arg(short, long)]
    route_no: String,

    #[arg(short, long, value_parser = parsers::parse_duration, default_value = "30s", env = "BUSROUTE_TIMEOUT")]
    timeout: jiff::SignedDuration,
}

pub async fn run(args: TourArgs) -> Result<(), anyhow::Error> {
    let file = File::open(&args.input)
        .with_context(|| format!("Cannot open {}", args.input.display()))?;
    let reader = BufReader::new(file);
    let table = if args.input.extension().is_some_and(|ext| ext == "json") {
        LegacyStopTable::from_reader(reader)?
    } else {
        LegacyStopTable::from_csv_reader(reader)?
    };

    info!(
        "Ordering route {} out of {} stops",
        args.route_no,
        table.stops().len()
    );

    let params = SolverParams::default().with_duration(args.timeout);
    let route_no = args.route_no;
    let response =
        tokio::task::spawn_blocking(move || table.optimize_route(&route_no, params)).await??;

    println!("{}", serde_json::to_string_pretty(&response)?);

    Ok(())
}
