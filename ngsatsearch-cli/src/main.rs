//! NGSatSearch CLI - Command-line interface
//!
//! Thin front end over `ngsatsearch::SatelliteCatalog`. Every command prints
//! the catalog's JSON envelope to stdout; logs and progress bars go to
//! stderr.

mod commands;
mod error;

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use ngsatsearch::logging::{default_log_dir, default_log_file, init_logging};
use ngsatsearch::{SearchOption, ServiceKind};
use tracing::{error, info};

use commands::common::{parse_time, GlobalArgs};
use error::CliError;

#[derive(Parser)]
#[command(name = "ngsatsearch")]
#[command(version)]
#[command(about = "Search and download Sentinel and Landsat scenes", long_about = None)]
struct Cli {
    /// Configuration file (default: ~/.config/ngsatsearch/config.ini)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Imagery service: copernicus, earthexplorer or google_cloud
    #[arg(long, global = true)]
    service: Option<ServiceKind>,

    /// Account username (Copernicus, EarthExplorer)
    #[arg(long, global = true, env = "NGSATSEARCH_USERNAME")]
    username: Option<String>,

    /// Account password (Copernicus, EarthExplorer)
    #[arg(long, global = true, env = "NGSATSEARCH_PASSWORD", hide_env_values = true)]
    password: Option<String>,

    /// Directory downloaded scenes are written to
    #[arg(long, global = true)]
    download_dir: Option<PathBuf>,

    /// Directory for the log file
    #[arg(long, global = true)]
    log_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the platforms and search options of the selected service
    Platforms,

    /// Search scenes
    Search {
        /// Platform name, e.g. Sentinel-2 or LANDSAT_8_C1
        #[arg(long)]
        platform: String,

        /// Area of interest as a WKT polygon
        #[arg(long)]
        wkt: Option<String>,

        /// Start of the acquisition window (YYYY-MM-DD or RFC 3339)
        #[arg(long, value_parser = parse_time)]
        start: Option<DateTime<Utc>>,

        /// End of the acquisition window (YYYY-MM-DD or RFC 3339)
        #[arg(long, value_parser = parse_time)]
        end: Option<DateTime<Utc>>,

        /// Platform option as name=value (repeatable)
        #[arg(long = "option", value_name = "NAME=VALUE")]
        options: Vec<SearchOption>,
    },

    /// Download scenes by identifier
    Download {
        /// Scene identifiers
        #[arg(required = true)]
        identifiers: Vec<String>,

        /// Bands to fetch (Google Cloud), comma separated
        #[arg(long, value_delimiter = ',')]
        bands: Option<Vec<String>>,

        /// File or scene directory name to use instead of the identifier
        #[arg(long)]
        custom_name: Option<String>,

        /// Skip metadata, angle and manifest files (Google Cloud)
        #[arg(long)]
        no_metadata: bool,

        /// Also fetch auxiliary files such as the L2A cloud mask (Google Cloud)
        #[arg(long)]
        extra_files: bool,

        /// Number of scenes downloaded in parallel
        #[arg(long, default_value = "1")]
        jobs: usize,

        /// Hide progress bars
        #[arg(long)]
        no_progress: bool,
    },

    /// Print the service metadata of one scene
    Metadata {
        /// Scene identifier
        identifier: String,
    },
}

fn main() {
    let cli = Cli::parse();

    let log_dir = cli.log_dir.clone().unwrap_or_else(default_log_dir);
    let logging_guard = match init_logging(&log_dir, default_log_file()) {
        Ok(guard) => guard,
        Err(e) => CliError::LoggingInit(e.to_string()).exit(),
    };
    info!("NGSatSearch v{}", env!("CARGO_PKG_VERSION"));

    let global = GlobalArgs {
        config: cli.config,
        service: cli.service,
        username: cli.username,
        password: cli.password,
        download_dir: cli.download_dir,
    };

    let result = match cli.command {
        Commands::Platforms => commands::platforms::run(&global),
        Commands::Search {
            platform,
            wkt,
            start,
            end,
            options,
        } => commands::search::run(
            &global,
            commands::search::SearchArgs {
                platform,
                wkt,
                start,
                end,
                options,
            },
        ),
        Commands::Download {
            identifiers,
            bands,
            custom_name,
            no_metadata,
            extra_files,
            jobs,
            no_progress,
        } => commands::download::run(
            &global,
            commands::download::DownloadArgs {
                identifiers,
                bands,
                custom_name,
                metadata: !no_metadata,
                extra_files,
                jobs,
                progress: !no_progress,
            },
        ),
        Commands::Metadata { identifier } => commands::metadata::run(&global, &identifier),
    };

    if let Err(e) = &result {
        error!(error = %e, "command failed");
    }
    // Flush the log file before exiting.
    drop(logging_guard);
    match result {
        Ok(code) => std::process::exit(code),
        Err(e) => e.exit(),
    }
}
