mod commands;
mod config;
mod error;
mod logging;

#[cfg(feature = "map")]
mod map;

use clap::{Parser, Subcommand};
use kerbside_core::Priority;
use kerbside_rest::BinsClient;

use crate::config::{CliOverrides, load_settings};

#[derive(Parser)]
#[command(name = "kerb")]
#[command(about = "Kerbside bin map and bin management", long_about = None)]
struct Cli {
    /// Base URL of the bins API
    #[arg(long, global = true)]
    api_base: Option<String>,

    /// Request timeout in milliseconds
    #[arg(long, global = true)]
    timeout_ms: Option<u64>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    #[cfg(feature = "map")]
    /// Open the interactive bin map
    Map {
        /// Latitude of the initial map centre
        #[arg(long, allow_hyphen_values = true)]
        lat: Option<f64>,

        /// Longitude of the initial map centre
        #[arg(long, allow_hyphen_values = true)]
        lng: Option<f64>,

        /// Initial zoom factor (1 shows the whole world)
        #[arg(long, default_value_t = 64.0)]
        zoom: f64,
    },

    /// List all bins
    List,

    /// Add a bin
    Add {
        #[arg(long, allow_hyphen_values = true)]
        lat: f64,

        #[arg(long, allow_hyphen_values = true)]
        lng: f64,

        /// Fill level percentage (random when omitted)
        #[arg(long)]
        fill: Option<u8>,

        /// Priority: low, medium, high (configured default when omitted)
        #[arg(long)]
        priority: Option<Priority>,
    },

    /// Delete a bin
    Delete { id: String },

    /// Change the priority of a bin
    Priority { id: String, level: Priority },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let settings = load_settings(CliOverrides {
        api_base: cli.api_base,
        timeout_ms: cli.timeout_ms,
    })?;

    match cli.command {
        #[cfg(feature = "map")]
        Command::Map { lat, lng, zoom } => {
            logging::init_file(&settings.log_file)?;
            let viewport = map::Viewport::new(
                lat.unwrap_or(map::DEFAULT_CENTER.0),
                lng.unwrap_or(map::DEFAULT_CENTER.1),
                zoom,
            );
            map::run(&settings, viewport).await?;
        }
        Command::List => {
            logging::init_stderr()?;
            let client = BinsClient::from_config(&settings.client)?;
            commands::list(&client).await?;
        }
        Command::Add {
            lat,
            lng,
            fill,
            priority,
        } => {
            logging::init_stderr()?;
            let client = BinsClient::from_config(&settings.client)?;
            let priority = priority.unwrap_or(settings.default_priority);
            commands::add(&client, lat, lng, fill, priority).await?;
        }
        Command::Delete { id } => {
            logging::init_stderr()?;
            let client = BinsClient::from_config(&settings.client)?;
            commands::delete(&client, &id).await?;
        }
        Command::Priority { id, level } => {
            logging::init_stderr()?;
            let client = BinsClient::from_config(&settings.client)?;
            commands::set_priority(&client, &id, level).await?;
        }
    }

    Ok(())
}
