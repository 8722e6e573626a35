use clap::{Parser, Subcommand};
use mimalloc::MiMalloc;

use crate::{optimize::OptimizeArgs, tour::TourArgs};

mod optimize;
mod parsers;
mod tour;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[derive(Parser)]
#[clap(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    #[arg(short, long, env = "BUSROUTE_DEBUG")]
    debug: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Splits the stops of a request between the buses
    #[command(visible_alias = "o")]
    Optimize {
        #[command(flatten)]
        args: OptimizeArgs,
    },
    /// Orders the stops of one route of a stop table
    Tour {
        #[command(flatten)]
        args: TourArgs,
    },
    /// Prints the JSON schema of optimize requests
    Schema,
}

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    dotenvy::from_filename("./.env.local").ok();
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    tracing_subscriber::fmt()
        .with_max_level(if cli.debug {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        })
        .init();

    match cli.command {
        Some(Commands::Optimize { args }) => optimize::run(args).await?,
        Some(Commands::Tour { args }) => tour::run(args).await?,
        Some(Commands::Schema) => {
            println!(
                "{}",
                busroute_optimizer::json::schema::generate_json_schema()?
            );
        }
        None => {}
    }

    Ok(())
}
