use std::{collections::BTreeMap, sync::Arc};

use clap::Parser;
use footprint_backend::{
    cache::{DistanceCache, FileCacheStore, SystemClock},
    config::AppConfig,
    distance::DistanceService,
    emissions::{EmissionsConfig, compute_emissions, validate_inputs},
    geocoder::{GeocoderAdapter, NominatimBackend},
    models::{
        AccommodationStay, AccommodationType, ActivityType, AlternativeScenario, DistanceResult,
        EmissionsReport, TransportLeg, TransportMode, TripInputs,
    },
    optimizer::optimize,
};
use serde::Serialize;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(
    author,
    version,
    about = "Estimate the carbon footprint of a trip"
)]
struct Args {
    /// Origin place name, e.g. "Lyon, France"
    #[arg(long, required_unless_present = "distance_km")]
    from: Option<String>,

    /// Destination place name
    #[arg(long, required_unless_present = "distance_km")]
    to: Option<String>,

    #[arg(long, default_value = "car")]
    mode: TransportMode,

    /// Skip geocoding and use this travel distance directly
    #[arg(long)]
    distance_km: Option<f64>,

    #[arg(long, default_value = "hotel")]
    accommodation: AccommodationType,

    #[arg(long, default_value_t = 0)]
    nights: u32,

    /// Activity count as kind=count, repeatable (e.g. --activity dining=3)
    #[arg(long = "activity", value_parser = parse_activity)]
    activities: Vec<(ActivityType, u32)>,
}

#[derive(Serialize)]
struct Estimate {
    #[serde(skip_serializing_if = "Option::is_none")]
    distance: Option<DistanceResult>,
    report: EmissionsReport,
    alternative: AlternativeScenario,
}

fn parse_activity(raw: &str) -> Result<(ActivityType, u32), String> {
    let (kind, count) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected kind=count, got \"{raw}\""))?;
    let kind = kind.parse::<ActivityType>()?;
    let count = count
        .trim()
        .parse::<u32>()
        .map_err(|e| format!("invalid count for {kind}: {e}"))?;
    Ok((kind, count))
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = Args::parse();
    let app_config = AppConfig::from_env()?;
    let emissions = match &app_config.emissions_config_path {
        Some(path) => EmissionsConfig::from_path(path)?,
        None => EmissionsConfig::default(),
    };

    let distance = match (args.distance_km, &args.from, &args.to) {
        (Some(_), _, _) => None,
        (None, Some(from), Some(to)) => {
            let store = FileCacheStore::new(app_config.cache_dir.clone())?;
            let cache = DistanceCache::new(Arc::new(store), Arc::new(SystemClock));
            let backend = NominatimBackend::new(
                app_config.geocoder_url.as_str(),
                &app_config.geocoder_user_agent,
                app_config.geocoder_timeout,
            )?;
            let service = DistanceService::new(GeocoderAdapter::new(backend), cache);
            Some(service.estimate(from, to, args.mode).await?)
        }
        _ => return Err("either --distance-km or both --from and --to are required".into()),
    };

    let distance_km = args
        .distance_km
        .or(distance.as_ref().map(|d| d.distance_km))
        .unwrap_or_default();

    let mut activities = BTreeMap::new();
    for (kind, count) in args.activities {
        *activities.entry(kind).or_insert(0) += count;
    }

    let inputs = TripInputs {
        transport: TransportLeg {
            mode: args.mode,
            distance_km,
        },
        accommodation: AccommodationStay {
            kind: args.accommodation,
            nights: args.nights,
        },
        activities,
    };
    if let Err(err) = validate_inputs(&inputs) {
        tracing::warn!("{err}");
    }

    let report = compute_emissions(&inputs, &emissions);
    if !report.is_calculable() {
        tracing::warn!("emissions could not be calculated for these inputs");
    }
    let estimate = Estimate {
        distance,
        alternative: optimize(&inputs, &emissions),
        report,
    };

    println!("{}", serde_json::to_string_pretty(&estimate)?);
    Ok(())
}
