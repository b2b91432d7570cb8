// Domain models shared by the device transport and the report engine

mod device;
mod feeds;
mod report;

pub use device::{ManagedDevice, SystemInfo};
pub use feeds::{CoreLoad, DataPlaneLoad, ResourceMonitorReport, TimestampedSample};
pub use report::{HourlyReport, HourlyReportRow, REPORT_HEADER};
