// Data-plane load cube: [sample slot][data plane][core] of raw load percentages,
// filled once from the hourly resource-monitor report and read through an HourRing.

use super::error::{FieldError, ReportError};
use super::hour::HourRing;
use crate::models::ResourceMonitorReport;

/// Hourly sample slots kept by the device (one hour each, most recent first).
pub const MAX_SAMPLE_SLOTS: usize = 60;
pub const MAX_DATA_PLANES: usize = 20;
pub const MAX_CORES_PER_PLANE: usize = 60;

/// Load samples of every data plane core, indexed by sample slot.
///
/// Dimensions are fixed when the matrix is populated and never change afterwards.
/// `core_count_per_plane` is the core count of the last data plane that reported any
/// cores, which is the bound used for lookups; `max_core_count` is kept alongside it
/// so callers can tell whether data planes disagree.
#[derive(Debug, Clone)]
pub struct LoadMatrix {
    cells: Vec<u8>,
    ring: HourRing,
    data_plane_count: usize,
    core_count_per_plane: usize,
    max_core_count: usize,
    sample_count: usize,
    malformed_fields: usize,
}

impl LoadMatrix {
    pub fn populate(report: &ResourceMonitorReport, anchor_hour: u8) -> Result<Self, ReportError> {
        let ring = HourRing::new(anchor_hour)?;
        let data_plane_count = report.data_planes.len();
        if data_plane_count > MAX_DATA_PLANES {
            return Err(ReportError::CapacityExceeded {
                axis: "data plane",
                count: data_plane_count,
                limit: MAX_DATA_PLANES,
            });
        }

        let mut cells = vec![0u8; MAX_SAMPLE_SLOTS * MAX_DATA_PLANES * MAX_CORES_PER_PLANE];
        let mut core_count_per_plane = 0;
        let mut max_core_count = 0;
        let mut sample_count = 0;
        let mut malformed_fields = 0;

        for (plane, dp) in report.data_planes.iter().enumerate() {
            if dp.cores.len() > MAX_CORES_PER_PLANE {
                return Err(ReportError::CapacityExceeded {
                    axis: "core",
                    count: dp.cores.len(),
                    limit: MAX_CORES_PER_PLANE,
                });
            }
            if !dp.cores.is_empty() {
                core_count_per_plane = dp.cores.len();
            }
            max_core_count = max_core_count.max(dp.cores.len());

            for (core, load) in dp.cores.iter().enumerate() {
                for (slot, raw) in load.samples.split(',').enumerate() {
                    if slot >= MAX_SAMPLE_SLOTS {
                        return Err(ReportError::CapacityExceeded {
                            axis: "sample slot",
                            count: load.samples.split(',').count(),
                            limit: MAX_SAMPLE_SLOTS,
                        });
                    }
                    sample_count = sample_count.max(slot + 1);
                    let value = parse_load(raw).unwrap_or_else(|_| {
                        malformed_fields += 1;
                        0
                    });
                    cells[index(slot, plane, core)] = value;
                }
            }
        }

        Ok(Self {
            cells,
            ring,
            data_plane_count,
            core_count_per_plane,
            max_core_count,
            sample_count,
            malformed_fields,
        })
    }

    pub fn anchor_hour(&self) -> u8 {
        self.ring.anchor()
    }

    pub fn data_plane_count(&self) -> usize {
        self.data_plane_count
    }

    pub fn core_count_per_plane(&self) -> usize {
        self.core_count_per_plane
    }

    pub fn max_core_count(&self) -> usize {
        self.max_core_count
    }

    pub fn sample_count(&self) -> usize {
        self.sample_count
    }

    pub fn malformed_fields(&self) -> usize {
        self.malformed_fields
    }

    /// True when every data plane reported the core count used for lookups.
    pub fn core_counts_agree(&self) -> bool {
        self.max_core_count == self.core_count_per_plane
    }

    /// Raw load byte; slots never filled by the report read as 0.
    pub fn load_at(&self, slot: usize, plane: usize, core: usize) -> u8 {
        if slot >= MAX_SAMPLE_SLOTS || plane >= MAX_DATA_PLANES || core >= MAX_CORES_PER_PLANE {
            return 0;
        }
        self.cells[index(slot, plane, core)]
    }

    /// Fails when there is nothing to average for `first_core`.
    pub fn check_eligible(&self, first_core: usize) -> Result<(), ReportError> {
        if self.data_plane_count == 0 {
            return Err(ReportError::NoDataPlanes);
        }
        if self.core_count_per_plane <= first_core {
            return Err(ReportError::NoEligibleCores {
                cores: self.core_count_per_plane,
                first_core,
            });
        }
        Ok(())
    }

    /// Mean load over all data planes and cores `first_core..` for `target_hour`.
    pub fn mean_load_for_hour(&self, target_hour: u8, first_core: usize) -> Result<f64, ReportError> {
        self.check_eligible(first_core)?;
        let slot = self.ring.offset(target_hour)?;

        let mut sum: u64 = 0;
        for plane in 0..self.data_plane_count {
            for core in first_core..self.core_count_per_plane {
                sum += self.cells[index(slot, plane, core)] as u64;
            }
        }
        let cells = self.data_plane_count * (self.core_count_per_plane - first_core);
        Ok(sum as f64 / cells as f64)
    }
}

fn index(slot: usize, plane: usize, core: usize) -> usize {
    (slot * MAX_DATA_PLANES + plane) * MAX_CORES_PER_PLANE + core
}

/// Signed decimal, truncated to the low byte the way the device value is stored.
fn parse_load(raw: &str) -> Result<u8, FieldError> {
    raw.parse::<i64>()
        .map(|v| v as u8)
        .map_err(|_| FieldError::InvalidNumber {
            raw: raw.to_string(),
        })
}
