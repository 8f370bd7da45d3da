//! CLI command implementations

use crate::output;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};
use tvplay_core::{
    ContentSource, FormFactor, PlayerConfig, PlayerSession, PositionStore, PrimitiveStatus,
    RemoteKey, SessionRunner, SimulatedPrimitive,
};

/// Arguments of the `simulate` command
pub struct SimulateOptions {
    pub id: String,
    pub url: String,
    pub hls_url: String,
    pub tv: bool,
    pub duration: f64,
    pub keys: Vec<String>,
    pub step_ms: u64,
    pub config: Option<PathBuf>,
    pub positions: Option<PathBuf>,
}

/// Run one session against the simulated primitive
pub async fn simulate(options: SimulateOptions, format: &str) -> anyhow::Result<()> {
    let config = match &options.config {
        Some(path) => PlayerConfig::load(path)?,
        None => PlayerConfig::default(),
    };

    let positions = PositionStore::new().with_config(&config);
    if let Some(path) = &options.positions {
        let loaded = positions.load_from(path)?;
        info!(loaded, path = %path.display(), "Saved positions loaded");
    }

    let form_factor = if options.tv {
        FormFactor::Tv
    } else {
        FormFactor::Handheld
    };
    let content = ContentSource::new(&options.id, &options.url, &options.hls_url);
    let sim = SimulatedPrimitive::with_duration(options.duration);
    let session = PlayerSession::new(sim.clone(), content, form_factor, config, positions.clone());

    let (runner, handle) = SessionRunner::open(session);
    let task = tokio::spawn(runner.run());

    // A primitive that accepted a source goes through loading to ready
    if sim.source().is_some() {
        sim.emit_status(PrimitiveStatus::Loading);
        sim.emit_status(PrimitiveStatus::ReadyToPlay);
    }

    let step = Duration::from_millis(options.step_ms);
    for raw in &options.keys {
        let key: RemoteKey = raw.parse()?;
        debug!(?key, "Pressing key");
        if handle.press(key).await.is_err() {
            break;
        }
        tokio::time::sleep(step).await;
        sim.advance(step.as_secs_f64());
        sim.emit_status(PrimitiveStatus::Other("timeUpdate".into()));
    }

    // A menu or back key may already have ended the session
    if let Err(e) = handle.close().await {
        debug!(error = %e, "Session already closed");
    }
    let outcome = task.await?;

    if let Some(path) = &options.positions {
        positions.save_to(path)?;
        info!(path = %path.display(), "Saved positions written");
    }

    output::print_outcome(&outcome, format);
    Ok(())
}

fn open_store(file: &Path) -> anyhow::Result<PositionStore> {
    let store = PositionStore::new();
    store.load_from(file)?;
    Ok(store)
}

/// List recent saved positions
pub fn positions_list(file: &Path, format: &str) -> anyhow::Result<()> {
    let store = open_store(file)?;
    output::print_positions(&store.entries(), format);
    Ok(())
}

/// Remove one saved position and rewrite the file
pub fn positions_clear(file: &Path, id: &str) -> anyhow::Result<()> {
    let store = open_store(file)?;
    if store.clear(id) {
        store.save_to(file)?;
        println!("Cleared saved position for {}", id);
    } else {
        println!("No saved position for {}", id);
    }
    Ok(())
}
