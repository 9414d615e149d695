use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use washgo_discovery::config::Settings;
use washgo_discovery::services::{DiscoveryEngine, NearbyRequest, SearchQuery, SortDirection};
use washgo_discovery::storage::{MemoryStore, Snapshot};
use washgo_discovery::SystemClock;

#[tokio::main]
async fn main() -> Result<()> {
    let settings = Settings::new()?;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&settings.logging.filter));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let snapshot_path = Path::new(&settings.storage.snapshot_path);
    let snapshot = if snapshot_path.exists() {
        Snapshot::load(snapshot_path)
            .await
            .with_context(|| format!("loading snapshot {}", snapshot_path.display()))?
    } else {
        warn!(path = %snapshot_path.display(), "Snapshot not found, starting with an empty store");
        Snapshot::default()
    };

    let store = Arc::new(MemoryStore::from_snapshot(snapshot));
    let engine = DiscoveryEngine::new(store, SystemClock, settings.discovery.clone())?;

    // Usage: main [--direction=asc|desc] [<lat> <lon>]
    let mut direction = SortDirection::Desc;
    let mut args = Vec::new();
    for arg in std::env::args().skip(1) {
        match arg.strip_prefix("--direction=") {
            Some(raw) => direction = raw.parse()?,
            None => args.push(arg),
        }
    }

    let ranked = engine
        .search(&SearchQuery {
            sort_by: Some("rating".to_string()),
            sort_direction: Some(direction),
            ..Default::default()
        })
        .await?;
    info!(vendors = ranked.len(), direction = ?direction, "Ranked vendors by rating");
    println!("{}", serde_json::to_string_pretty(&ranked)?);

    if let [lat, lon, ..] = args.as_slice() {
        let latitude: f64 = lat.parse().with_context(|| format!("invalid latitude: {}", lat))?;
        let longitude: f64 = lon.parse().with_context(|| format!("invalid longitude: {}", lon))?;

        let outcome = engine.nearby(&NearbyRequest::new(latitude, longitude)).await?;
        info!(
            found = outcome.results.len(),
            skipped = outcome.skipped.len(),
            "Nearby open vendors"
        );
        println!("{}", serde_json::to_string_pretty(&outcome)?);
    }

    Ok(())
}
