//! Integration broker: aggregates external alert, threat, telemetry, and
//! mission-event streams into bounded buffers with a drop-newest policy,
//! and reconnects lost providers with exponential backoff without
//! blocking the other streams.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use meridian_core::constants::STREAM_CAPACITY;
use meridian_core::error::{GuidanceError, Result};
use meridian_core::events::MissionEvent;
use meridian_core::threat::ThreatZone;
use meridian_core::types::{EntityState, GeoCoord, Vector3, point_segment_distance};
use meridian_terrain::{TerrainGrid, TheaterProjection};

use crate::backoff::Backoff;

/// An alert published by the imaging subsystem.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    pub id: String,
    pub severity: u8,
    pub message: String,
    pub location: Option<GeoCoord>,
}

/// A telemetry sample arriving over the DTN for a payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TelemetrySample {
    pub payload_id: String,
    pub state: EntityState,
}

/// A bounded FIFO with drop-newest backpressure and a drop counter.
pub struct BoundedStream<T> {
    name: &'static str,
    queue: Mutex<VecDeque<T>>,
    capacity: usize,
    dropped: AtomicU64,
}

impl<T> BoundedStream<T> {
    pub fn new(name: &'static str, capacity: usize) -> Self {
        BoundedStream {
            name,
            queue: Mutex::new(VecDeque::with_capacity(capacity)),
            capacity,
            dropped: AtomicU64::new(0),
        }
    }

    /// Append an item. A full buffer drops the new arrival, preserving
    /// the order of everything already queued.
    pub fn push(&self, item: T) -> Result<()> {
        let mut queue = self.queue.lock().unwrap();
        if queue.len() >= self.capacity {
            drop(queue);
            self.dropped.fetch_add(1, Ordering::Relaxed);
            return Err(GuidanceError::StreamBackpressure { stream: self.name });
        }
        queue.push_back(item);
        Ok(())
    }

    /// Pop the oldest queued item.
    pub fn pop(&self) -> Option<T> {
        self.queue.lock().unwrap().pop_front()
    }

    /// Drain everything queued, oldest first.
    pub fn drain(&self) -> Vec<T> {
        self.queue.lock().unwrap().drain(..).collect()
    }

    pub fn len(&self) -> usize {
        self.queue.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }
}

/// A connected external stream source. Implementations wrap the
/// WebSocket/HTTP adapters; tests use in-memory queues.
#[async_trait]
pub trait StreamProvider: Send {
    type Item: Send + 'static;

    /// (Re)establish the connection.
    async fn connect(&mut self) -> Result<()>;

    /// Await the next item. An error means the connection is lost.
    async fn next_item(&mut self) -> Result<Self::Item>;
}

/// Terrain tile source (imaging provider surface the broker consumes).
#[async_trait]
pub trait TerrainProvider: Send + Sync {
    async fn tile(&self, southwest: GeoCoord, northeast: GeoCoord) -> Result<TerrainGrid>;
}

/// The broker: four bounded streams plus helpers.
pub struct IntegrationBroker {
    pub alerts: Arc<BoundedStream<Alert>>,
    pub threats: Arc<BoundedStream<ThreatZone>>,
    pub telemetry: Arc<BoundedStream<TelemetrySample>>,
    pub mission_events: Arc<BoundedStream<MissionEvent>>,
}

impl Default for IntegrationBroker {
    fn default() -> Self {
        Self::new(STREAM_CAPACITY)
    }
}

impl IntegrationBroker {
    pub fn new(capacity: usize) -> Self {
        IntegrationBroker {
            alerts: Arc::new(BoundedStream::new("alerts", capacity)),
            threats: Arc::new(BoundedStream::new("threats", capacity)),
            telemetry: Arc::new(BoundedStream::new("telemetry", capacity)),
            mission_events: Arc::new(BoundedStream::new("mission-events", capacity)),
        }
    }

    /// Spawn a consumer task pumping a provider into a stream buffer.
    /// Connection loss backs off exponentially and reconnects without
    /// involving any other provider; cancellation stops the task.
    pub fn spawn_consumer<P>(
        stream: Arc<BoundedStream<P::Item>>,
        mut provider: P,
        cancel: CancellationToken,
    ) -> tokio::task::JoinHandle<()>
    where
        P: StreamProvider + 'static,
    {
        tokio::spawn(async move {
            let mut backoff = Backoff::reconnect();
            loop {
                tokio::select! {
                    _ = cancel.cancelled() => return,
                    connected = provider.connect() => {
                        if let Err(err) = connected {
                            let delay = backoff.next().unwrap_or_default();
                            warn!(stream = stream.name, %err, ?delay, "provider connect failed");
                            tokio::select! {
                                _ = cancel.cancelled() => return,
                                _ = tokio::time::sleep(delay) => continue,
                            }
                        }
                    }
                }
                // Connected: reset the schedule and pump items.
                backoff = Backoff::reconnect();
                loop {
                    tokio::select! {
                        _ = cancel.cancelled() => return,
                        item = provider.next_item() => match item {
                            Ok(item) => {
                                // Full buffer: drop the arrival, keep order.
                                let _ = stream.push(item);
                            }
                            Err(err) => {
                                debug!(stream = stream.name, %err, "provider stream lost");
                                break;
                            }
                        },
                    }
                }
            }
        })
    }

    /// Threat zones whose footprint intersects any route segment.
    pub fn threat_zones_for_route(
        zones: &[ThreatZone],
        route: &[Vector3],
        projection: &TheaterProjection,
        now_secs: f64,
    ) -> Vec<ThreatZone> {
        zones
            .iter()
            .filter(|zone| zone.is_live(now_secs))
            .filter(|zone| {
                let center = projection.to_engine(&zone.center);
                let radius_m = zone.radius_km * 1_000.0;
                if route.len() == 1 {
                    return center.horizontal_distance_to(&route[0]) <= radius_m;
                }
                route.windows(2).any(|seg| {
                    let center_flat = Vector3::new(center.x, center.y, 0.0);
                    let a = Vector3::new(seg[0].x, seg[0].y, 0.0);
                    let b = Vector3::new(seg[1].x, seg[1].y, 0.0);
                    point_segment_distance(&center_flat, &a, &b) <= radius_m
                })
            })
            .cloned()
            .collect()
    }

    /// Request a terrain tile bounding the route (plus margin) from the
    /// imaging provider.
    pub async fn terrain_for_route(
        provider: &dyn TerrainProvider,
        route: &[Vector3],
        projection: &TheaterProjection,
        margin_m: f64,
    ) -> Result<TerrainGrid> {
        let (sw, ne) = TerrainGrid::bounding_box_for_route(projection, route, margin_m)
            .ok_or_else(|| GuidanceError::ProviderUnreachable {
                provider: "imaging".to_string(),
                detail: "empty route".to_string(),
            })?;
        provider.tile(sw, ne).await
    }
}
