use std::process::ExitCode;

use clap::Parser;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use bus_finder::arrivals::{ArrivalError, get_arrivals};
use bus_finder::config::{AppConfig, ConfigError};
use bus_finder::datamall::{DataMallClient, DataMallError};
use bus_finder::directory::{
    BusStopRepository, DirectoryError, SnapshotCache, find_by_code, find_by_road,
};
use bus_finder::domain::{ArrivalRecord, BusStop, Coordinate, InvalidCoordinate, StopCode};
use bus_finder::locate::{LocateMode, LocationResolver, Resolved};
use bus_finder::nearby::{DEFAULT_RADIUS_KM, NearbyResult, find_nearby};

#[derive(Parser, Debug)]
#[command(
    name = "bus-finder",
    version,
    about = "Find nearby bus stops in Singapore",
    after_help = "Examples:\n  \
                  bus-finder                            # Use current location (IP-based)\n  \
                  bus-finder --bus-stop 13011           # Check arrivals at stop 13011\n  \
                  bus-finder --search-stop 13011        # Show details for stop 13011\n  \
                  bus-finder --search-road \"Orchard\"    # Find all stops on Orchard Road\n  \
                  bus-finder --lat 1.2834 --lon 103.8607\n  \
                  bus-finder --radius 1.0               # Search within 1km radius\n  \
                  bus-finder --no-cache                 # Force fresh data from DataMall\n  \
                  bus-finder --gps                      # Try triangulation providers first"
)]
struct Args {
    /// Bus stop code to check arrivals for (e.g. 13011)
    #[arg(short, long)]
    bus_stop: Option<String>,

    /// Only show arrivals for this service number
    #[arg(long, requires = "bus_stop")]
    service: Option<String>,

    /// Show details for a bus stop code
    #[arg(short, long)]
    search_stop: Option<String>,

    /// Find bus stops whose road name contains this text
    #[arg(short = 'r', long)]
    search_road: Option<String>,

    /// Latitude of the location
    #[arg(long, requires = "lon", allow_negative_numbers = true)]
    lat: Option<f64>,

    /// Longitude of the location
    #[arg(long, requires = "lat", allow_negative_numbers = true)]
    lon: Option<f64>,

    /// Search radius in kilometers
    #[arg(long, default_value_t = DEFAULT_RADIUS_KM)]
    radius: f64,

    /// Ignore the cached directory and fetch fresh data
    #[arg(long)]
    no_cache: bool,

    /// Try triangulation providers before the IP lookup
    #[arg(long)]
    gps: bool,

    /// Verbose output (show debug messages)
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    DataMall(#[from] DataMallError),
    #[error(transparent)]
    Directory(#[from] DirectoryError),
    #[error(transparent)]
    Arrival(#[from] ArrivalError),
    #[error(transparent)]
    Coordinate(#[from] InvalidCoordinate),
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let args = Args::parse();

    let default_level = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> Result<(), CliError> {
    let config = AppConfig::from_env()?;
    info!(api_key = %config.masked_api_key(), "Using LTA DataMall account key");

    let client = DataMallClient::new(config.datamall())?;
    let repository = BusStopRepository::new(client.clone(), SnapshotCache::new(config.cache()));
    let force_refresh = args.no_cache;

    if let Some(code) = &args.search_stop {
        info!(code = %code, "Searching for bus stop");
        let snapshot = repository.get_directory(force_refresh).await?;
        let stop = StopCode::parse(code)
            .ok()
            .and_then(|code| find_by_code(&snapshot, &code));
        display_stop_details(stop);
    } else if let Some(road) = &args.search_road {
        info!(road = %road, "Searching for bus stops by road");
        let snapshot = repository.get_directory(force_refresh).await?;
        display_road_results(road, &find_by_road(&snapshot, road));
    } else if let Some(code) = &args.bus_stop {
        info!(code = %code, service = ?args.service, "Fetching bus arrivals");
        let records = get_arrivals(&client, code, args.service.as_deref()).await?;

        // Header only; never refetch the directory for it.
        let snapshot = repository.cached();
        let stop = snapshot.as_ref().and_then(|snapshot| {
            StopCode::parse(code)
                .ok()
                .and_then(|code| find_by_code(snapshot, &code))
        });
        display_arrivals(code, stop, &records);
    } else {
        let reference = match (args.lat, args.lon) {
            (Some(lat), Some(lon)) => {
                let reference = Coordinate::validated(lat, lon)?;
                info!(%reference, "Using provided coordinates");
                reference
            }
            _ => {
                let mode = if args.gps { LocateMode::Gps } else { LocateMode::Ip };
                let resolved = match LocationResolver::from_config(&config.locate()) {
                    Ok(resolver) => resolver.resolve(mode).await,
                    Err(e) => {
                        warn!(error = %e, "Location providers unavailable");
                        Resolved::default_location()
                    }
                };
                println!(
                    "Location: {} ({})",
                    resolved.coordinate, resolved.source
                );
                resolved.coordinate
            }
        };

        let snapshot = repository.get_directory(force_refresh).await?;
        info!(%reference, radius_km = args.radius, "Searching for nearby bus stops");
        let nearby = find_nearby(&snapshot, reference, args.radius);
        info!(found = nearby.len(), "Nearby search complete");
        display_nearby(&nearby);
    }

    Ok(())
}

/// Cut `s` to at most `width` characters.
fn fit(s: &str, width: usize) -> String {
    if s.chars().count() <= width {
        s.to_string()
    } else {
        s.chars().take(width.saturating_sub(3)).chain("...".chars()).collect()
    }
}

fn display_stop_details(stop: Option<&BusStop>) {
    let Some(stop) = stop else {
        println!("\nBus stop not found.\n");
        return;
    };

    let rule = "=".repeat(80);
    println!("\n{rule}");
    println!("Bus Stop Details");
    println!("{rule}");
    println!("Code:        {}", stop.code);
    println!("Description: {}", stop.description);
    println!("Road Name:   {}", stop.road_name);
    println!("Latitude:    {}", stop.latitude);
    println!("Longitude:   {}", stop.longitude);
    println!("{rule}\n");
}

fn display_road_results(road: &str, stops: &[&BusStop]) {
    if stops.is_empty() {
        println!("\nNo bus stops found on '{road}'.\n");
        return;
    }

    let rule = "=".repeat(80);
    println!("\n{rule}");
    println!("Bus Stops on '{road}' ({} found)", stops.len());
    println!("{rule}");
    println!("{:<8} {:<50} {:<20}", "Code", "Description", "Road Name");
    println!("{}", "-".repeat(80));
    for stop in stops {
        println!(
            "{:<8} {:<50} {:<20}",
            stop.code,
            fit(&stop.description, 50),
            fit(&stop.road_name, 20)
        );
    }
    println!("{rule}");
    println!("\nTotal: {} bus stops found\n", stops.len());
}

fn display_nearby(nearby: &[NearbyResult]) {
    if nearby.is_empty() {
        println!("\nNo bus stops found within the search radius.\n");
        return;
    }

    let rule = "=".repeat(80);
    println!("\n{rule}");
    println!(
        "{:<8} {:<25} {:<30} {:<12}",
        "Code", "Road Name", "Description", "Distance (m)"
    );
    println!("{rule}");
    for result in nearby {
        println!(
            "{:<8} {:<25} {:<30} {:<12.0}",
            result.stop.code,
            fit(&result.stop.road_name, 25),
            fit(&result.stop.description, 30),
            result.distance_m
        );
    }
    println!("{rule}");
    println!("\nTotal: {} bus stops found\n", nearby.len());
}

fn display_arrivals(code: &str, stop: Option<&BusStop>, records: &[ArrivalRecord]) {
    if records.is_empty() {
        println!("\nNo buses currently serving bus stop {code}\n");
        return;
    }

    let header = match stop {
        Some(stop) if stop.road_name.is_empty() => {
            format!("Bus Stop: {} - {}", stop.code, stop.description)
        }
        Some(stop) => format!(
            "Bus Stop: {} - {} ({})",
            stop.code, stop.description, stop.road_name
        ),
        None => {
            debug!(code, "Stop not in cached directory");
            format!("Bus Stop: {code}")
        }
    };

    let rule = "=".repeat(100);
    println!("\n{rule}");
    println!("{header}");
    println!("{rule}");
    println!(
        "{:<6} {:<8} {:<10} {:<10} {:<8} {:<4} {:<10} {:<10}",
        "Bus", "Operator", "Next Bus", "Load", "Type", "WAB", "2nd Bus", "3rd Bus"
    );
    println!("{}", "-".repeat(100));
    for record in records {
        let [next, second, third] = record.buses();
        println!(
            "{:<6} {:<8} {:<10} {:<10} {:<8} {:<4} {:<10} {:<10}",
            record.service_number,
            record.operator.as_deref().unwrap_or("-"),
            next.eta.to_string(),
            next.load.label(),
            next.vehicle.map_or("-", |v| v.label()),
            if next.wheelchair_accessible { "Yes" } else { "No" },
            second.eta.to_string(),
            third.eta.to_string()
        );
    }
    println!("{rule}");
    println!("\nTotal: {} bus services", records.len());
    println!(
        "Load: Seats = seats available | Standing = standing available | Limited = limited standing"
    );
    println!("WAB: wheelchair-accessible bus\n");
}
