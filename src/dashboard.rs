//! # Metrics Dashboard
//!
//! Periodically polls the backend's server-resource and Redis statistics,
//! extracts one value per configured KPI and raises an alert whenever a KPI
//! crosses its threshold.
//!
//! ```rust,no_run
//! use catalog_backoffice::dashboard::Dashboard;
//! use catalog_backoffice::{AppStateStore, BackofficeClient, Result};
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let client = BackofficeClient::new(Box::new(http_client::native::NativeClient::new()));
//!     let store = AppStateStore::default_location()?;
//!     let mut dashboard = Dashboard::for_client(&client, store)?;
//!
//!     dashboard.poll_once().await;
//!     for alert in dashboard.alerts() {
//!         println!("{}", alert.message);
//!     }
//!     Ok(())
//! }
//! ```

use crate::cancel::{cancelled, sleep_with_cancel, CancellationState};
use crate::client::{BackofficeClient, Outbound, Payload};
use crate::events::{ClientEvent, SharedEventBroadcaster};
use crate::store::AppStateStore;
use crate::types::{deserialize_loose_number, parse_leading_number};
use crate::{BackofficeError, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use http_types::Method;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

pub const SERVER_RESOURCES_PATH: &str = "monitor/server/resources";
pub const REDIS_STATS_PATH: &str = "monitor/redis/stats";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CoreUsage {
    /// Percentage; the backend sends `"85%"`
    #[serde(default, deserialize_with = "deserialize_loose_number")]
    pub usage: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CpuStats {
    #[serde(default)]
    pub per_core: Vec<CoreUsage>,
}

/// Memory figures as human readable sizes (`"7.5 GB"`, `"512 MB"`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryStats {
    #[serde(default)]
    pub used: Option<String>,
    #[serde(default)]
    pub free: Option<String>,
    #[serde(default)]
    pub total: Option<String>,
}

/// Body of `GET monitor/server/resources`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ServerResources {
    #[serde(default)]
    pub cpu: CpuStats,
    #[serde(default)]
    pub memory: MemoryStats,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RedisOperations {
    #[serde(default, deserialize_with = "deserialize_loose_number")]
    pub total_commands: Option<f64>,
    #[serde(default, deserialize_with = "deserialize_loose_number")]
    pub keyspace_hits: Option<f64>,
    #[serde(default, deserialize_with = "deserialize_loose_number")]
    pub keyspace_misses: Option<f64>,
}

/// Body of `GET monitor/redis/stats`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RedisStats {
    #[serde(default)]
    pub operations: RedisOperations,
}

/// Both metric documents from one poll.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot {
    pub server: ServerResources,
    pub redis: RedisStats,
    pub fetched_at: DateTime<Utc>,
}

impl Snapshot {
    pub fn new(server: ServerResources, redis: RedisStats) -> Self {
        Self {
            server,
            redis,
            fetched_at: Utc::now(),
        }
    }

    /// Current value of the KPI `kpi_id`, if the snapshot carries it.
    pub fn kpi_value(&self, kpi_id: &str) -> Option<f64> {
        match kpi_id {
            "cpu" => self
                .server
                .cpu
                .per_core
                .iter()
                .filter_map(|core| core.usage)
                .reduce(f64::max),
            "memory" => self
                .server
                .memory
                .used
                .as_deref()
                .and_then(parse_leading_number),
            "redis" => self.redis.operations.total_commands,
            _ => None,
        }
    }
}

/// How a KPI is charted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartType {
    Bar,
    Doughnut,
    Line,
}

impl fmt::Display for ChartType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ChartType::Bar => "bar",
            ChartType::Doughnut => "doughnut",
            ChartType::Line => "line",
        };
        f.pad(name)
    }
}

/// User preference for one KPI, persisted in `preferences.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KpiPreference {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub chart: ChartType,
    pub threshold: f64,
}

impl KpiPreference {
    pub fn new(id: &str, name: &str, chart: ChartType, threshold: f64) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            chart,
            threshold,
        }
    }
}

/// Preferences used until the user saves their own.
pub fn default_preferences() -> Vec<KpiPreference> {
    vec![
        KpiPreference::new("cpu", "CPU load", ChartType::Bar, 90.0),
        KpiPreference::new("memory", "System memory", ChartType::Doughnut, 80.0),
        KpiPreference::new("redis", "Redis operations", ChartType::Bar, 200.0),
    ]
}

/// A threshold crossing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    pub kpi_id: String,
    pub message: String,
    pub value: f64,
    pub threshold: f64,
    pub raised_at: DateTime<Utc>,
}

impl Alert {
    fn new(kpi: &KpiPreference, value: f64) -> Self {
        Self {
            kpi_id: kpi.id.clone(),
            message: format!(
                "{} exceeded threshold of {} ({})",
                kpi.name, kpi.threshold, value
            ),
            value,
            threshold: kpi.threshold,
            raised_at: Utc::now(),
        }
    }
}

/// Labelled values for drawing one KPI.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSeries {
    pub kpi_id: String,
    pub title: String,
    pub chart: ChartType,
    pub labels: Vec<String>,
    pub values: Vec<f64>,
}

/// Size in gigabytes of a `"7.5 GB"` / `"512 MB"` style string.
fn size_in_gb(text: &str) -> Option<f64> {
    let value = parse_leading_number(text)?;
    let unit = text.trim().trim_start_matches(|c: char| {
        c.is_ascii_digit() || c == '.' || c == '-' || c == '+'
    });
    let factor = match unit.trim().to_ascii_uppercase().as_str() {
        "TB" => 1024.0,
        "MB" => 1.0 / 1024.0,
        "KB" => 1.0 / (1024.0 * 1024.0),
        _ => 1.0,
    };
    Some(value * factor)
}

fn chart_series(kpi: &KpiPreference, snapshot: &Snapshot) -> Option<ChartSeries> {
    let (labels, values): (Vec<String>, Vec<f64>) = match kpi.id.as_str() {
        "cpu" => snapshot
            .server
            .cpu
            .per_core
            .iter()
            .enumerate()
            .map(|(i, core)| (format!("Core {}", i + 1), core.usage.unwrap_or(0.0)))
            .unzip(),
        "memory" => {
            let memory = &snapshot.server.memory;
            let used = memory.used.as_deref().and_then(size_in_gb).unwrap_or(0.0);
            let free = memory.free.as_deref().and_then(size_in_gb).unwrap_or(0.0);
            (
                vec!["Used".to_string(), "Free".to_string()],
                vec![used, free],
            )
        }
        "redis" => {
            let ops = &snapshot.redis.operations;
            (
                vec![
                    "Total commands".to_string(),
                    "Hits".to_string(),
                    "Misses".to_string(),
                ],
                vec![
                    ops.total_commands.unwrap_or(0.0),
                    ops.keyspace_hits.unwrap_or(0.0),
                    ops.keyspace_misses.unwrap_or(0.0),
                ],
            )
        }
        _ => return None,
    };

    Some(ChartSeries {
        kpi_id: kpi.id.clone(),
        title: kpi.name.clone(),
        chart: kpi.chart,
        labels,
        values,
    })
}

/// Where the dashboard reads its metrics from.
#[cfg_attr(feature = "mock", mockall::automock)]
#[async_trait]
pub trait MetricsSource: Send + Sync {
    async fn server_resources(&self) -> Result<ServerResources>;
    async fn redis_stats(&self) -> Result<RedisStats>;
}

#[async_trait]
impl MetricsSource for BackofficeClient {
    async fn server_resources(&self) -> Result<ServerResources> {
        self.get_json(SERVER_RESOURCES_PATH).await
    }

    async fn redis_stats(&self) -> Result<RedisStats> {
        self.get_json(REDIS_STATS_PATH).await
    }
}

/// Receives alerts as they are raised.
///
/// Delivery is best effort: errors are logged by the dashboard and dropped.
#[cfg_attr(feature = "mock", mockall::automock)]
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, alert: &Alert) -> Result<()>;
}

/// Posts each alert message as plain text to a webhook (e.g. an ntfy topic).
#[derive(Debug, Clone)]
pub struct WebhookNotifier {
    client: BackofficeClient,
    url: String,
}

impl WebhookNotifier {
    pub fn new(client: BackofficeClient, url: &str) -> Self {
        Self {
            client,
            url: url.to_string(),
        }
    }
}

#[async_trait]
impl Notifier for WebhookNotifier {
    async fn notify(&self, alert: &Alert) -> Result<()> {
        let outbound = Outbound {
            payload: Payload::Text(alert.message.clone()),
            ..Outbound::new(Method::Post, self.url.clone())
        };
        self.client.execute(outbound).await?;
        Ok(())
    }
}

/// Result of one poll.
#[derive(Debug)]
pub enum PollOutcome {
    /// A new snapshot replaced the previous one
    Updated { alerts: Vec<Alert> },
    /// Fetching failed; the previous snapshot, if any, is still shown
    Stale(BackofficeError),
}

#[derive(Debug, Clone, PartialEq)]
pub enum DashboardState {
    Loading,
    Ready(Snapshot),
}

/// Metrics dashboard state: KPI preferences, last snapshot and raised alerts.
pub struct Dashboard {
    source: Arc<dyn MetricsSource>,
    notifier: Option<Arc<dyn Notifier>>,
    events: Option<Arc<SharedEventBroadcaster>>,
    store: Option<AppStateStore>,
    preferences: Vec<KpiPreference>,
    state: DashboardState,
    alerts: Vec<Alert>,
    breached: HashSet<String>,
}

impl fmt::Debug for Dashboard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dashboard")
            .field("preferences", &self.preferences)
            .field("state", &self.state)
            .field("alerts", &self.alerts.len())
            .finish()
    }
}

impl Dashboard {
    pub fn new(source: Arc<dyn MetricsSource>, preferences: Vec<KpiPreference>) -> Self {
        Self {
            source,
            notifier: None,
            events: None,
            store: None,
            preferences,
            state: DashboardState::Loading,
            alerts: Vec::new(),
            breached: HashSet::new(),
        }
    }

    /// A dashboard polling `client`, with preferences from `store` and the
    /// webhook notifier when one is configured.
    pub fn for_client(client: &BackofficeClient, store: AppStateStore) -> Result<Self> {
        let preferences = store.load_preferences()?;
        let mut dashboard = Self::new(Arc::new(client.clone()), preferences)
            .with_events(client.broadcaster())
            .with_store(store);
        if let Some(url) = &client.config().notify_url {
            dashboard = dashboard.with_notifier(Arc::new(WebhookNotifier::new(client.clone(), url)));
        }
        Ok(dashboard)
    }

    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    pub(crate) fn with_events(mut self, events: Arc<SharedEventBroadcaster>) -> Self {
        self.events = Some(events);
        self
    }

    /// Persist threshold changes through `store`.
    pub fn with_store(mut self, store: AppStateStore) -> Self {
        self.store = Some(store);
        self
    }

    pub fn preferences(&self) -> &[KpiPreference] {
        &self.preferences
    }

    pub fn state(&self) -> &DashboardState {
        &self.state
    }

    pub fn snapshot(&self) -> Option<&Snapshot> {
        match &self.state {
            DashboardState::Loading => None,
            DashboardState::Ready(snapshot) => Some(snapshot),
        }
    }

    /// Every alert raised so far, oldest first.
    pub fn alerts(&self) -> &[Alert] {
        &self.alerts
    }

    /// Chart data for each KPI the current snapshot can draw.
    pub fn chart_series(&self) -> Vec<ChartSeries> {
        match self.snapshot() {
            Some(snapshot) => self
                .preferences
                .iter()
                .filter_map(|kpi| chart_series(kpi, snapshot))
                .collect(),
            None => Vec::new(),
        }
    }

    /// Change the alert threshold of `kpi_id` and persist all preferences.
    pub fn set_threshold(&mut self, kpi_id: &str, threshold: f64) -> Result<()> {
        if !threshold.is_finite() {
            return Err(BackofficeError::Validation { field: "threshold" });
        }
        let kpi = self
            .preferences
            .iter_mut()
            .find(|kpi| kpi.id == kpi_id)
            .ok_or_else(|| BackofficeError::NotFound(format!("KPI '{kpi_id}'")))?;
        kpi.threshold = threshold;
        log::info!("Threshold of {kpi_id} set to {threshold}");

        if let Some(store) = &self.store {
            store.save_preferences(&self.preferences)?;
        }
        Ok(())
    }

    /// Fetch both metric documents concurrently and evaluate thresholds.
    pub async fn poll_once(&mut self) -> PollOutcome {
        let (server, redis) = futures::join!(
            self.source.server_resources(),
            self.source.redis_stats()
        );

        let snapshot = match (server, redis) {
            (Ok(server), Ok(redis)) => Snapshot::new(server, redis),
            (Err(e), _) | (_, Err(e)) => {
                log::warn!("Metrics poll failed, keeping previous snapshot: {e}");
                return PollOutcome::Stale(e);
            }
        };

        let alerts = self.evaluate(&snapshot);
        self.state = DashboardState::Ready(snapshot);

        for alert in &alerts {
            log::info!("{}", alert.message);
            if let Some(events) = &self.events {
                events.broadcast_event(ClientEvent::AlertRaised {
                    kpi_id: alert.kpi_id.clone(),
                    message: alert.message.clone(),
                    timestamp: alert.raised_at,
                });
            }
            if let Some(notifier) = &self.notifier {
                if let Err(e) = notifier.notify(alert).await {
                    log::warn!("Failed to deliver alert for {}: {e}", alert.kpi_id);
                }
            }
        }
        self.alerts.extend(alerts.iter().cloned());

        PollOutcome::Updated { alerts }
    }

    /// Compare `snapshot` against the thresholds.
    ///
    /// A KPI alerts once when it reaches its threshold and re-arms after
    /// dropping back below it.
    pub fn evaluate(&mut self, snapshot: &Snapshot) -> Vec<Alert> {
        let mut alerts = Vec::new();
        for kpi in &self.preferences {
            let Some(value) = snapshot.kpi_value(&kpi.id) else {
                continue;
            };
            if value >= kpi.threshold {
                if self.breached.insert(kpi.id.clone()) {
                    alerts.push(Alert::new(kpi, value));
                }
            } else {
                self.breached.remove(&kpi.id);
            }
        }
        alerts
    }

    /// Poll now and then every `interval` until `cancel` fires.
    pub async fn run(&mut self, interval: Duration, cancel: &CancellationState) {
        let cancel_rx = cancel.subscribe();
        loop {
            if cancel.is_cancelled() {
                break;
            }

            tokio::select! {
                outcome = self.poll_once() => {
                    if let PollOutcome::Updated { alerts } = outcome {
                        log::debug!("Dashboard refreshed, {} new alerts", alerts.len());
                    }
                }
                _ = cancelled(cancel_rx.clone()) => break,
            }

            if sleep_with_cancel(cancel_rx.clone(), interval).await.is_err() {
                break;
            }
        }
        log::debug!("Dashboard polling stopped");
    }

    /// Move the dashboard onto a background task polling every `interval`.
    pub fn spawn(self, interval: Duration) -> PollingHandle {
        let cancel = CancellationState::new();
        let task_cancel = cancel.clone();
        let task = tokio::spawn(async move {
            let mut dashboard = self;
            dashboard.run(interval, &task_cancel).await;
            dashboard
        });
        PollingHandle {
            cancel,
            task: Some(task),
        }
    }
}

/// Owner of a background polling task.
///
/// Dropping the handle stops polling.
#[derive(Debug)]
pub struct PollingHandle {
    cancel: CancellationState,
    task: Option<JoinHandle<Dashboard>>,
}

impl PollingHandle {
    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }

    /// Stop polling and get the dashboard back.
    pub async fn stop(mut self) -> Result<Dashboard> {
        self.cancel.cancel();
        let task = self.task.take().ok_or(BackofficeError::Cancelled)?;
        task.await.map_err(|e| {
            log::error!("Dashboard polling task failed: {e}");
            BackofficeError::Cancelled
        })
    }
}

impl Drop for PollingHandle {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}
