//! Fetch a few tracks recorded around Münster
//!
//! This example demonstrates the core functionality of envirocar-client:
//! - Loading the configuration from `ENVIROCAR_*` environment variables
//! - Subscribing to batch progress events
//! - Querying tracks inside a bounding box
//! - Downloading one track in its reduced form
//!
//! Run with `RUST_LOG=envirocar_client=debug cargo run --example fetch_tracks`.

use envirocar_client::api::{TRACK_ID_COLUMN, TrackApi, TrackQuery};
use envirocar_client::request::BboxSelector;
use envirocar_client::{Config, DownloadEvent};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let config = Config::from_env()?;
    let api = TrackApi::new(&config)?;

    let mut events = api.client().subscribe();
    tokio::spawn(async move {
        while let Ok(event) = events.recv().await {
            match event {
                DownloadEvent::BatchStarted { total } => println!("batch of {total} requests"),
                DownloadEvent::BatchFinished { succeeded, failed } => {
                    println!("batch done: {succeeded} ok, {failed} failed");
                }
                DownloadEvent::BatchAborted { error } => println!("batch aborted: {error}"),
                DownloadEvent::ItemCompleted { .. } => {}
            }
        }
    });

    let query = TrackQuery::default()
        .with_bbox(BboxSelector::new(7.5987, 51.9505, 7.6242, 51.9659))
        .with_num_results(Some(3));
    let tracks = api.get_tracks(&query).await?;

    let ids = tracks.unique(TRACK_ID_COLUMN);
    println!(
        "{} measurements from {} tracks, {} columns",
        tracks.len(),
        ids.len(),
        tracks.columns().len()
    );

    if let Some(id) = ids.first() {
        let reduced = api.get_track(&id.to_string()).await?;
        println!("track {id}: columns {:?}", reduced.columns());
        for row in reduced.rows().take(5) {
            let line: Vec<String> = row.iter().map(|(_, cell)| cell.to_string()).collect();
            println!("  {}", line.join(" | "));
        }
    }

    Ok(())
}
