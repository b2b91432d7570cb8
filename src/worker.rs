// Report worker: fetch the three feeds of each device, fuse them and write one CSV per
// device. Runs a single pass, or keeps running on a fixed interval or cron schedule.

use std::path::PathBuf;
use std::str::FromStr;

use chrono::NaiveDate;
use tokio::time::Duration;
use tracing::{debug, info, warn};

use crate::models::HourlyReport;
use crate::output;
use crate::panos_repo::DeviceApi;
use crate::report::PreparedFeeds;

/// Device handle and shutdown for the worker.
pub struct WorkerDeps<A> {
    pub api: A,
    pub shutdown_rx: tokio::sync::oneshot::Receiver<()>,
}

/// What to poll, where to write, and how often.
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    pub panorama: bool,
    pub output_dir: String,
    pub run_loop: bool,
    pub interval_secs: u64,
    /// Cron expression; takes precedence over interval_secs. Uses local time.
    pub cron: Option<String>,
}

/// Result of one pass over all devices.
#[derive(Debug, Default)]
pub struct PassSummary {
    pub written: Vec<PathBuf>,
    pub failed: usize,
}

/// Fetches the three feeds sequentially and builds the report of one device.
pub async fn collect_report<A: DeviceApi>(api: &A) -> anyhow::Result<HourlyReport> {
    let system_info = api.system_info().await?;
    let resource_monitor = api.resource_monitor().await?;
    let traffic = api.traffic_report().await?;

    let feeds = PreparedFeeds::prepare(&system_info, &resource_monitor, &traffic)?;
    if let Some(e) = &feeds.clock_error {
        warn!(error = %e, operation = "anchor_hour", "device clock unreadable; anchoring at hour 0");
    }
    if feeds.loads.malformed_fields() > 0 || feeds.hourly_bytes.malformed_fields() > 0 {
        warn!(
            load_fields = feeds.loads.malformed_fields(),
            traffic_fields = feeds.hourly_bytes.malformed_fields(),
            "malformed fields counted as zero"
        );
    }
    if !feeds.loads.core_counts_agree() {
        warn!(
            core_count = feeds.loads.core_count_per_plane(),
            max_core_count = feeds.loads.max_core_count(),
            "data planes report different core counts; averaging over the last plane's count"
        );
    }
    debug!(
        model = %feeds.device.model,
        first_core = feeds.device.first_eligible_core,
        anchor_hour = feeds.loads.anchor_hour(),
        data_planes = feeds.loads.data_plane_count(),
        samples = feeds.loads.sample_count(),
        traffic_hours = feeds.hourly_bytes.len(),
        "feeds prepared"
    );

    Ok(feeds.fuse()?)
}

async fn write_one<A: DeviceApi>(
    api: &A,
    config: &WorkerConfig,
    date: NaiveDate,
    serial: Option<&str>,
    summary: &mut PassSummary,
) {
    let path = output::report_path(&config.output_dir, date, serial);
    let result = match collect_report(api).await {
        Ok(report) => output::write_report_csv(&path, &report).map_err(anyhow::Error::from),
        Err(e) => Err(e),
    };
    match result {
        Ok(()) => {
            info!(path = %path.display(), "report saved");
            summary.written.push(path);
        }
        Err(e) => {
            warn!(error = %e, serial = serial.unwrap_or("-"), operation = "collect_report", "report failed");
            summary.failed += 1;
        }
    }
}

/// One report per device. In Panorama mode a failing device is skipped and the pass
/// moves on to the next serial.
pub async fn run_pass<A: DeviceApi>(
    api: &A,
    config: &WorkerConfig,
    date: NaiveDate,
) -> PassSummary {
    let mut summary = PassSummary::default();
    info!(prefix = %date.format("%Y%m%d"), "starting report pass");

    if !config.panorama {
        write_one(api, config, date, None, &mut summary).await;
        return summary;
    }

    info!("listing connected devices");
    let devices = match api.connected_devices().await {
        Ok(d) => d,
        Err(e) => {
            warn!(error = %e, operation = "connected_devices", "device list failed");
            summary.failed += 1;
            return summary;
        }
    };
    for device in &devices {
        info!(serial = %device.serial, sw_version = %device.sw_version, "switching to device");
        let target = api.for_target(Some(device.serial.as_str()));
        write_one(&target, config, date, Some(device.serial.as_str()), &mut summary).await;
    }
    summary
}

/// When the next pass is due.
#[derive(Debug, Clone)]
pub enum Schedule {
    Every(Duration),
    Cron(Box<cron::Schedule>),
}

impl Schedule {
    pub fn from_config(config: &WorkerConfig) -> anyhow::Result<Self> {
        match &config.cron {
            Some(expr) => {
                let schedule = cron::Schedule::from_str(expr)
                    .map_err(|e| anyhow::anyhow!("invalid cron {:?}: {}", expr, e))?;
                Ok(Schedule::Cron(Box::new(schedule)))
            }
            None => Ok(Schedule::Every(Duration::from_secs(config.interval_secs))),
        }
    }

    pub fn next_delay(&self) -> Duration {
        match self {
            Schedule::Every(d) => *d,
            Schedule::Cron(schedule) => {
                let now = chrono::Local::now();
                match schedule.after(&now).next() {
                    Some(next) => (next - now).to_std().unwrap_or(Duration::from_secs(1)),
                    None => Duration::from_secs(3600),
                }
            }
        }
    }
}

pub fn spawn<A>(deps: WorkerDeps<A>, config: WorkerConfig) -> tokio::task::JoinHandle<()>
where
    A: DeviceApi + 'static,
{
    let WorkerDeps {
        api,
        mut shutdown_rx,
    } = deps;

    tokio::spawn(async move {
        let schedule = match Schedule::from_config(&config) {
            Ok(s) => s,
            Err(e) => {
                warn!(error = %e, "invalid schedule; worker not started");
                return;
            }
        };

        loop {
            let today = chrono::Local::now().date_naive();
            let summary = run_pass(&api, &config, today).await;
            info!(
                written = summary.written.len(),
                failed = summary.failed,
                "report pass complete"
            );
            if !config.run_loop {
                break;
            }

            let delay = schedule.next_delay();
            info!(sleep_secs = delay.as_secs(), "going to sleep until next tick");
            tokio::select! {
                _ = tokio::time::sleep(delay) => {}
                _ = &mut shutdown_rx => {
                    debug!("Worker shutting down");
                    break;
                }
            }
        }
    })
}
