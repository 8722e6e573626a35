use std::{fs::File, io::BufReader, path::PathBuf, sync::atomic::Ordering};

use anyhow::Context;
use busroute_optimizer::{
    json::{api_solution::JsonVrpResponse, types::JsonVrpRequest},
    solver::{
        solver::Solver,
        solver_params::{SolverParams, Threads},
    },
};
use clap::Args;
use comfy_table::{ContentArrangement, Table, presets::UTF8_FULL};
use tracing::{info, warn};

use crate::parsers;

#[derive(Args)]
pub struct OptimizeArgs {
    /// JSON request with the buses and the stops, the first stop being the depot
    #[arg(short, long)]
    input: PathBuf,

    /// Time budget of the search (e.g., "30s", "5m", "PT1M")
    #[arg(short, long, value_parser = parsers::parse_duration, default_value = "30s", env = "BUSROUTE_TIMEOUT")]
    timeout: jiff::SignedDuration,

    /// Threads scanning the neighbourhoods
    #[arg(long, default_value_t = 1, env = "BUSROUTE_THREADS")]
    threads: u8,

    /// Writes the response to this file instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,
}

pub async fn run(args: OptimizeArgs) -> Result<(), anyhow::Error> {
    info!("Optimizing {:?}", args.input);

    let file = File::open(&args.input)
        .with_context(|| format!("Cannot open {}", args.input.display()))?;
    let request: JsonVrpRequest = serde_json::from_reader(BufReader::new(file))?;

    let params = SolverParams::default()
        .with_duration(args.timeout)
        .with_threads(Threads::Multi(args.threads as usize));
    let solver = Solver::new(request.build_problem()?, params);
    let stop = solver.stop_handle();

    let handle = tokio::task::spawn_blocking(move || solver.solve());
    tokio::pin!(handle);

    let solution = tokio::select! {
        result = &mut handle => result??,
        _ = tokio::signal::ctrl_c() => {
            warn!("Interrupted, keeping the best solution found so far");
            stop.store(true, Ordering::Relaxed);
            handle.await??
        }
    };

    let response = JsonVrpResponse::from_solution(&request, &solution);
    println!("{}", summary_table(&response));

    let json = serde_json::to_string_pretty(&response)?;
    match args.output {
        Some(path) => {
            std::fs::write(&path, json)?;
            info!("Solution written to {}", path.display());
        }
        None => println!("{json}"),
    }

    Ok(())
}

fn summary_table(response: &JsonVrpResponse) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["Bus", "Stops", "Passengers", "Utilization", "Distance (km)"]);

    for route in &response.routes {
        table.add_row(vec![
            route.bus_id.to_string(),
            route.stops.iter().filter(|stop| !stop.is_depot).count().to_string(),
            route.total_passengers.to_string(),
            format!("{}%", route.utilization),
            route.distance_km.to_string(),
        ]);
    }

    table.add_row(vec![
        String::from("Total"),
        response.total_stops.to_string(),
        response
            .routes
            .iter()
            .map(|route| route.total_passengers)
            .sum::<u64>()
            .to_string(),
        format!("{} min", response.estimated_time_min),
        response.total_distance_km.to_string(),
    ]);

    table
}
