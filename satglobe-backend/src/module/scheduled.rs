///! Tracker - the periodic driver around the catalog and the batch coordinator
///!
///! This module owns the running loop of the binary:
///! - Position frames (every `frame_interval_ms`, missed ticks skipped)
///! - Catalog reloads (every `reload_interval_minutes`, snapshot swapped on success)
///! - One-shot frames at a fixed instant

use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use chrono::{DateTime, Utc};
use satglobe_common::PositionFrame;
use tokio::time::{Instant, Interval, MissedTickBehavior};
use tracing::{debug, error, info, warn};

use super::catalog::{Catalog, load_from_settings};
use super::propagation::{EvaluatorOptions, compute_all};
use crate::config::{CatalogSettings, TrackerSettings};

const MAX_RETRIES: u32 = 3;
const RETRY_BASE_DELAY: Duration = Duration::from_secs(10);

/// Upper bounds applied to configured intervals
const MAX_FRAME_INTERVAL_MS: u64 = 60 * 60 * 1000;
const MAX_RELOAD_INTERVAL_MINUTES: u64 = 7 * 24 * 60;

/// Timing and output options for the tracker loop
#[derive(Debug, Clone)]
pub struct TrackerConfig {
    pub frame_interval: Duration,
    /// `None` disables reloading
    pub reload_interval: Option<Duration>,
    pub emit_frames: bool,
    pub evaluator: EvaluatorOptions,
}

impl TrackerConfig {
    pub fn from_settings(catalog: &CatalogSettings, tracker: &TrackerSettings) -> Self {
        Self {
            frame_interval: Duration::from_millis(
                tracker.frame_interval_ms.clamp(1, MAX_FRAME_INTERVAL_MS),
            ),
            reload_interval: (catalog.reload_interval_minutes > 0).then(|| {
                let minutes = catalog.reload_interval_minutes.min(MAX_RELOAD_INTERVAL_MINUTES);
                Duration::from_secs(minutes * 60)
            }),
            emit_frames: tracker.emit_frames,
            evaluator: EvaluatorOptions {
                max_element_age_days: tracker.max_element_age_days,
            },
        }
    }
}

pub struct Tracker {
    settings: CatalogSettings,
    config: TrackerConfig,
    catalog: Arc<Catalog>,
}

impl Tracker {
    pub fn new(catalog: Arc<Catalog>, settings: CatalogSettings, config: TrackerConfig) -> Self {
        Self {
            settings,
            config,
            catalog,
        }
    }

    /// Load the first snapshot (with retries) and build the tracker
    pub async fn start(settings: CatalogSettings, config: TrackerConfig) -> anyhow::Result<Self> {
        let catalog = load_with_retries(&settings, RETRY_BASE_DELAY).await?;
        Ok(Self::new(Arc::new(catalog), settings, config))
    }

    /// Current snapshot
    pub fn catalog(&self) -> Arc<Catalog> {
        Arc::clone(&self.catalog)
    }

    /// Compute one frame against the current snapshot
    pub fn frame_at(&self, instant: DateTime<Utc>) -> PositionFrame {
        let outcome = compute_all(&self.catalog, instant, &self.config.evaluator);

        debug!(
            "Frame at {}: {} positions, {} failures",
            instant.format("%Y-%m-%d %H:%M:%S%.3f UTC"),
            outcome.positions.len(),
            outcome.failures.len()
        );

        outcome.to_frame()
    }

    /// Replace the snapshot; on failure the previous one stays in place
    pub async fn reload(&mut self) -> anyhow::Result<()> {
        let catalog = load_from_settings(&self.settings).await?;
        info!(
            "Catalog reloaded: {} entries (was {}, loaded {})",
            catalog.len(),
            self.catalog.len(),
            self.catalog.loaded_at().format("%Y-%m-%d %H:%M:%S UTC")
        );
        self.catalog = Arc::new(catalog);
        Ok(())
    }

    /// One frame at `instant`, written to stdout
    pub fn run_once(&self, instant: DateTime<Utc>) -> anyhow::Result<()> {
        let frame = self.frame_at(instant);
        info!(
            "Computed {} positions at {}",
            frame.len(),
            instant.format("%Y-%m-%d %H:%M:%S UTC")
        );
        emit_frame(&mut std::io::stdout().lock(), &frame)
    }

    /// Frame and reload loop, until Ctrl-C
    pub async fn run(mut self) -> anyhow::Result<()> {
        let mut frames = tokio::time::interval(self.config.frame_interval);
        frames.set_missed_tick_behavior(MissedTickBehavior::Skip);

        let mut reloads = self.config.reload_interval.map(|period| {
            let mut interval = tokio::time::interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
            interval
        });

        info!(
            "Tracker running: {} satellites, frame every {} ms, reload {}",
            self.catalog.len(),
            self.config.frame_interval.as_millis(),
            match self.config.reload_interval {
                Some(period) => format!("every {} min", period.as_secs() / 60),
                None => "disabled".to_string(),
            }
        );

        loop {
            tokio::select! {
                _ = frames.tick() => {
                    let frame = self.frame_at(Utc::now());
                    if self.config.emit_frames {
                        if let Err(e) = emit_frame(&mut std::io::stdout().lock(), &frame) {
                            error!("Failed to emit frame: {}", e);
                        }
                    }
                }
                _ = next_tick(&mut reloads) => {
                    if let Err(e) = self.reload().await {
                        warn!("Catalog reload failed, keeping previous snapshot: {:#}", e);
                    }
                }
                _ = tokio::signal::ctrl_c() => {
                    info!("Shutdown requested, stopping tracker");
                    break;
                }
            }
        }

        Ok(())
    }
}

async fn next_tick(interval: &mut Option<Interval>) -> Instant {
    match interval {
        Some(interval) => interval.tick().await,
        None => std::future::pending().await,
    }
}

/// Initial load: up to `MAX_RETRIES` attempts, waiting `base_delay * attempt` between them
pub async fn load_with_retries(
    settings: &CatalogSettings,
    base_delay: Duration,
) -> anyhow::Result<Catalog> {
    let mut attempt = 1;
    loop {
        match load_from_settings(settings).await {
            Ok(catalog) => return Ok(catalog),
            Err(e) if attempt < MAX_RETRIES => {
                let delay = base_delay * attempt;
                warn!(
                    "Catalog load failed (attempt {}/{}): {:#}. Retrying in {:?}...",
                    attempt,
                    MAX_RETRIES,
                    e,
                    delay
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Err(e) => {
                return Err(e).with_context(|| {
                    format!("Catalog load failed after {} attempts", MAX_RETRIES)
                });
            }
        }
    }
}

/// Write `frame` as a single JSON line
pub fn emit_frame<W: Write>(writer: &mut W, frame: &PositionFrame) -> anyhow::Result<()> {
    serde_json::to_writer(&mut *writer, frame)?;
    writeln!(writer)?;
    writer.flush()?;
    Ok(())
}
