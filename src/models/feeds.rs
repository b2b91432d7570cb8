// Raw telemetry feeds as returned by the device, before any aggregation

/// One (timestamp, value) row of the hourly traffic report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimestampedSample {
    /// Hour-of-receipt as sent by the device (`...HH:MM:SS`).
    pub raw_timestamp: String,
    /// Byte count as a decimal string.
    pub value: String,
}

impl TimestampedSample {
    pub fn new(raw_timestamp: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            raw_timestamp: raw_timestamp.into(),
            value: value.into(),
        }
    }
}

/// Per-core load samples of one data plane core.
/// `samples` is the device's comma-separated list, most recent hour first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CoreLoad {
    pub core_id: Option<u32>,
    pub samples: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DataPlaneLoad {
    /// Element name reported by the device (`dp0`, `s1dp0`, ...).
    pub name: String,
    pub cores: Vec<CoreLoad>,
}

/// Hourly resource-monitor report: data planes in document order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResourceMonitorReport {
    pub data_planes: Vec<DataPlaneLoad>,
}
