// Report fusion: one row per hour from the traffic totals and the load matrix.

use super::error::{FieldError, ReportError};
use super::hour::{HOURS_PER_DAY, extract_hour};
use super::load_matrix::LoadMatrix;
use super::traffic::{HourlyByteTotals, TrafficAggregator};
use crate::models::{
    HourlyReport, HourlyReportRow, ResourceMonitorReport, SystemInfo, TimestampedSample,
};

/// Divisor from bytes accumulated over one hour to the reported throughput.
/// Kept at the historical value so reports stay comparable with earlier runs.
pub const BYTES_PER_MBPS_HOUR: f64 = 360_000_000.0;

/// Models whose core 0 runs management tasks and is left out of data-plane load.
const MANAGEMENT_CORE_MODELS: &[&str] = &["PA-200", "PA-VM"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceContext {
    pub model: String,
    pub first_eligible_core: usize,
}

impl DeviceContext {
    pub fn from_model(model: &str) -> Self {
        let first_eligible_core = if MANAGEMENT_CORE_MODELS.contains(&model) {
            1
        } else {
            0
        };
        Self {
            model: model.to_string(),
            first_eligible_core,
        }
    }
}

/// Builds the 24 hourly rows. An hour with no traffic total or with zero mean load is
/// reported as a zero row, so idle hours and missing data look the same.
pub fn fuse(
    device: &DeviceContext,
    hourly_bytes: &HourlyByteTotals,
    loads: &LoadMatrix,
) -> Result<HourlyReport, ReportError> {
    loads.check_eligible(device.first_eligible_core)?;

    let mut rows = Vec::with_capacity(HOURS_PER_DAY as usize);
    for hour in 0..HOURS_PER_DAY {
        let mean_load = loads.mean_load_for_hour(hour, device.first_eligible_core)?;
        let row = match hourly_bytes.get(hour) {
            Some(bytes) if mean_load != 0.0 => HourlyReportRow {
                hour,
                mean_load,
                megabits_per_second: bytes as f64 / BYTES_PER_MBPS_HOUR,
            },
            _ => HourlyReportRow::zero(hour),
        };
        rows.push(row);
    }
    Ok(HourlyReport::new(rows))
}

/// The three feeds of one device, decoded and aligned on the hour-of-day axis.
#[derive(Debug, Clone)]
pub struct PreparedFeeds {
    pub device: DeviceContext,
    pub loads: LoadMatrix,
    pub hourly_bytes: HourlyByteTotals,
    /// Set when the device clock was unreadable and the anchor fell back to hour 0.
    pub clock_error: Option<FieldError>,
}

impl PreparedFeeds {
    pub fn prepare(
        system_info: &SystemInfo,
        resource_monitor: &ResourceMonitorReport,
        traffic: &[TimestampedSample],
    ) -> Result<Self, ReportError> {
        let (anchor_hour, clock_error) = match extract_hour(&system_info.time) {
            Ok(hour) => (hour, None),
            Err(e) => (0, Some(e)),
        };
        Ok(Self {
            device: DeviceContext::from_model(&system_info.model),
            loads: LoadMatrix::populate(resource_monitor, anchor_hour)?,
            hourly_bytes: TrafficAggregator::aggregate(traffic),
            clock_error,
        })
    }

    pub fn fuse(&self) -> Result<HourlyReport, ReportError> {
        fuse(&self.device, &self.hourly_bytes, &self.loads)
    }
}

/// Report for one device from its three raw feeds. The anchor hour is the hour of the
/// device clock; an unreadable clock anchors at hour 0.
pub fn produce_hourly_report(
    system_info: &SystemInfo,
    resource_monitor: &ResourceMonitorReport,
    traffic: &[TimestampedSample],
) -> Result<HourlyReport, ReportError> {
    PreparedFeeds::prepare(system_info, resource_monitor, traffic)?.fuse()
}
