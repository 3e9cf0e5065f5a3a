//! Search for healthcare facilities near a point or address from the
//! command line.
#![cfg_attr(not(any(test, doctest)), deny(clippy::unwrap_used))]
#![cfg_attr(not(any(test, doctest)), deny(clippy::expect_used))]

use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use color_eyre::eyre::{Result, bail};
use discovery::domain::{
    DiscoveryConfig, FacilityDiscoveryPorts, FacilityDiscoveryService, FacilityKind,
    FacilitySearchRequest,
};
use discovery::outbound::nominatim::{DEFAULT_GEOCODER_URL, NominatimHttpGeocoder};
use discovery::outbound::overpass::OverpassHttpSource;
use discovery::outbound::OutboundIdentity;
use geodist::Coordinates;
use tokio::runtime::Builder;
use tracing_subscriber::{EnvFilter, fmt};
use url::Url;

/// `facility-search` command arguments.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "facility-search",
    about = "Find nearby healthcare facilities via public geodata mirrors",
    version
)]
struct CliArgs {
    /// Origin latitude in degrees. Required unless --address or --check is given.
    #[arg(long, value_name = "degrees", allow_negative_numbers = true)]
    lat: Option<f64>,
    /// Origin longitude in degrees.
    #[arg(long, value_name = "degrees", allow_negative_numbers = true)]
    lon: Option<f64>,
    /// Search radius in kilometres.
    #[arg(long = "radius-km", value_name = "km", default_value_t = 10.0)]
    radius_km: f64,
    /// Restrict results to one kind (hospital, clinic, pharmacy, general-practice).
    #[arg(long, value_name = "kind", value_parser = FacilityKind::from_str)]
    kind: Option<FacilityKind>,
    /// Resolve this free-text address as the search origin.
    #[arg(long, value_name = "address")]
    address: Option<String>,
    /// Override the mirror list (repeatable, tried in order).
    #[arg(long = "mirror", value_name = "url")]
    mirrors: Vec<Url>,
    /// Per-mirror request timeout in seconds.
    #[arg(long = "timeout-secs", value_name = "secs", default_value_t = 15)]
    timeout_secs: u64,
    /// Only probe mirror availability and exit.
    #[arg(long)]
    check: bool,
    /// Emit results as JSON instead of a table.
    #[arg(long)]
    json: bool,
}

fn main() -> Result<()> {
    color_eyre::install()?;
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .try_init()
    {
        eprintln!("tracing init failed: {e}");
    }

    let runtime = Builder::new_current_thread().enable_all().build()?;
    runtime.block_on(async_main())
}

async fn async_main() -> Result<()> {
    let args = CliArgs::parse();

    let identity = OutboundIdentity::default();
    let source = Arc::new(OverpassHttpSource::with_identity(
        Duration::from_secs(args.timeout_secs),
        identity.clone(),
    )?);
    let geocoder = Arc::new(NominatimHttpGeocoder::with_identity(
        Url::parse(DEFAULT_GEOCODER_URL)?,
        Duration::from_secs(args.timeout_secs),
        identity,
    )?);

    let mut config = DiscoveryConfig::default();
    if !args.mirrors.is_empty() {
        config.mirrors = args.mirrors.clone();
    }
    let service =
        FacilityDiscoveryService::new(FacilityDiscoveryPorts::new(source, geocoder), config);

    if args.check {
        let available = service.check_availability().await;
        println!("mirrors_available={available}");
        return Ok(());
    }

    let origin = resolve_origin(&args, &service).await?;
    let mut request = FacilitySearchRequest::new(origin, args.radius_km);
    if let Some(kind) = args.kind {
        request = request.with_kind(kind);
    }

    let outcome = service.search_nearby(&request).await;
    if outcome.used_fallback() {
        eprintln!("warning: live geodata was unavailable; showing placeholder facilities");
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&outcome.facilities)?);
        return Ok(());
    }

    if outcome.facilities.is_empty() {
        println!("no facilities found within {} km", args.radius_km);
        return Ok(());
    }
    for facility in &outcome.facilities {
        println!(
            "{:>7.2} km  {:<17} {}",
            facility.distance_km, facility.kind.to_string(), facility.name
        );
        println!("            address: {}", facility.address);
        if !facility.specialties.is_empty() {
            println!("            specialties: {}", facility.specialties.join(", "));
        }
        if let Some(phone) = &facility.phone {
            println!("            phone: {phone}");
        }
    }
    Ok(())
}

async fn resolve_origin(args: &CliArgs, service: &FacilityDiscoveryService) -> Result<Coordinates> {
    if let Some(address) = &args.address {
        let Some(location) = service.search_location_by_address(address).await else {
            bail!("no location found for address {address:?}");
        };
        println!("origin: {}", location.display_name);
        return Ok(location.coordinates);
    }

    match (args.lat, args.lon) {
        (Some(lat), Some(lon)) => Ok(Coordinates::try_new(lat, lon)?),
        _ => bail!("either --address or both --lat and --lon are required"),
    }
}
