// Hourly traffic totals: sums byte counts of the traffic report per hour of day.

use std::collections::BTreeMap;

use super::error::FieldError;
use super::hour::extract_hour;
use crate::models::TimestampedSample;

/// Total bytes per hour of day. Hours without samples are absent, not zero.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HourlyByteTotals {
    totals: BTreeMap<u8, u64>,
    malformed_fields: usize,
}

impl HourlyByteTotals {
    pub fn get(&self, hour: u8) -> Option<u64> {
        self.totals.get(&hour).copied()
    }

    pub fn len(&self) -> usize {
        self.totals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.totals.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (u8, u64)> + '_ {
        self.totals.iter().map(|(h, b)| (*h, *b))
    }

    /// Timestamps and byte counts that were coerced to zero while aggregating.
    pub fn malformed_fields(&self) -> usize {
        self.malformed_fields
    }

    /// Adds `bytes` to `hour`. Saturates instead of wrapping.
    pub fn add(&mut self, hour: u8, bytes: u64) {
        let total = self.totals.entry(hour).or_insert(0);
        *total = total.saturating_add(bytes);
    }

    /// Hour-wise sum of two totals.
    pub fn merge(mut self, other: &HourlyByteTotals) -> Self {
        for (hour, bytes) in other.iter() {
            self.add(hour, bytes);
        }
        self.malformed_fields += other.malformed_fields;
        self
    }
}

/// Folds traffic report rows into [`HourlyByteTotals`].
#[derive(Debug, Default)]
pub struct TrafficAggregator;

impl TrafficAggregator {
    /// Malformed timestamps count as hour 0 and malformed byte counts as 0 bytes.
    pub fn aggregate(samples: &[TimestampedSample]) -> HourlyByteTotals {
        let mut out = HourlyByteTotals::default();
        for sample in samples {
            let hour = extract_hour(&sample.raw_timestamp).unwrap_or_else(|_| {
                out.malformed_fields += 1;
                0
            });
            let bytes = parse_bytes(&sample.value).unwrap_or_else(|_| {
                out.malformed_fields += 1;
                0
            });
            out.add(hour, bytes);
        }
        out
    }
}

fn parse_bytes(raw: &str) -> Result<u64, FieldError> {
    raw.parse::<u64>().map_err(|_| FieldError::InvalidNumber {
        raw: raw.to_string(),
    })
}
