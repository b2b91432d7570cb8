// Report engine: aligns the three device feeds on an hour-of-day axis and fuses them.
// Pure and synchronous; no I/O and no logging. The worker decides what to log.

mod error;
pub mod fuse;
pub mod hour;
pub mod load_matrix;
pub mod traffic;

pub use error::{FieldError, ReportError};
pub use fuse::{BYTES_PER_MBPS_HOUR, DeviceContext, PreparedFeeds, fuse, produce_hourly_report};
pub use hour::{HOURS_PER_DAY, HourRing, extract_hour};
pub use load_matrix::LoadMatrix;
pub use traffic::{HourlyByteTotals, TrafficAggregator};
