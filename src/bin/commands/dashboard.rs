use super::utils::{output_json, render_bar};
use catalog_backoffice::dashboard::{ChartSeries, ChartType, Dashboard, DashboardState};
use catalog_backoffice::{AppStateStore, BackofficeClient, ClientEvent, PollOutcome};
use serde::Serialize;
use std::time::Duration;

const BAR_WIDTH: usize = 30;

#[derive(Serialize)]
struct DashboardReport<'a> {
    snapshot: Option<&'a catalog_backoffice::dashboard::Snapshot>,
    charts: Vec<ChartSeries>,
    alerts: &'a [catalog_backoffice::Alert],
}

fn print_chart(series: &ChartSeries) {
    println!("📊 {} ({})", series.title, series.chart);

    let max = match series.chart {
        // Doughnut slices are shares of the total
        ChartType::Doughnut => series.values.iter().sum::<f64>(),
        ChartType::Bar | ChartType::Line => series.values.iter().copied().fold(0.0, f64::max),
    };
    let label_width = series.labels.iter().map(|l| l.len()).max().unwrap_or(0);

    for (label, value) in series.labels.iter().zip(&series.values) {
        println!(
            "   {label:<label_width$}  {}  {value:.1}",
            render_bar(*value, max, BAR_WIDTH)
        );
    }
}

pub async fn handle_show(
    client: &BackofficeClient,
    store: AppStateStore,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut dashboard = Dashboard::for_client(client, store)?;

    if let PollOutcome::Stale(e) = dashboard.poll_once().await {
        return Err(e.into());
    }

    if json {
        output_json(&DashboardReport {
            snapshot: dashboard.snapshot(),
            charts: dashboard.chart_series(),
            alerts: dashboard.alerts(),
        });
        return Ok(());
    }

    println!("🔔 Notifications");
    if dashboard.alerts().is_empty() {
        println!("   No alerts.");
    }
    for alert in dashboard.alerts() {
        println!("   ⚠️  {}", alert.message);
    }
    println!();

    for series in dashboard.chart_series() {
        print_chart(&series);
        println!();
    }
    Ok(())
}

pub async fn handle_watch(
    client: &BackofficeClient,
    store: AppStateStore,
    interval: Option<u64>,
) -> Result<(), Box<dyn std::error::Error>> {
    let interval = interval
        .filter(|secs| *secs > 0)
        .map(Duration::from_secs)
        .unwrap_or(client.config().poll_interval);
    let dashboard = Dashboard::for_client(client, store)?;
    let mut events = client.subscribe();

    println!(
        "👀 Polling {} every {}s (Ctrl-C to stop)",
        client.base_url(),
        interval.as_secs()
    );
    let handle = dashboard.spawn(interval);

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            event = events.recv() => match event {
                Ok(ClientEvent::AlertRaised { message, timestamp, .. }) => {
                    println!("⚠️  [{}] {message}", timestamp.format("%H:%M:%S"));
                }
                Ok(ClientEvent::RequestCompleted { request, status_code, duration_ms }) => {
                    log::debug!("{} -> {status_code} ({duration_ms} ms)", request.short_description());
                }
                Ok(_) => {}
                Err(tokio::sync::broadcast::error::RecvError::Lagged(skipped)) => {
                    log::warn!("Missed {skipped} events");
                }
                Err(tokio::sync::broadcast::error::RecvError::Closed) => break,
            },
        }
    }

    let dashboard = handle.stop().await?;
    let total = dashboard.alerts().len();
    if let DashboardState::Ready(snapshot) = dashboard.state() {
        println!(
            "\n🛑 Stopped. Last snapshot at {}, {total} alert(s) raised",
            snapshot.fetched_at.format("%H:%M:%S")
        );
    } else {
        println!("\n🛑 Stopped before the first snapshot arrived");
    }
    Ok(())
}

pub fn handle_preferences(store: &AppStateStore) -> Result<(), Box<dyn std::error::Error>> {
    for kpi in store.load_preferences()? {
        println!(
            "{:<8} {:<20} {:<9} threshold {}",
            kpi.id, kpi.name, kpi.chart, kpi.threshold
        );
    }
    Ok(())
}

pub fn handle_set_threshold(
    client: &BackofficeClient,
    store: AppStateStore,
    kpi: &str,
    value: f64,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut dashboard = Dashboard::for_client(client, store)?;
    dashboard.set_threshold(kpi, value)?;
    println!("✅ Threshold of {kpi} set to {value}");
    Ok(())
}
