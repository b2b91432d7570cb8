// Hour-of-day primitives: timestamp parsing and the 24-hour circular index.

use super::error::{FieldError, ReportError};

pub const HOURS_PER_DAY: u8 = 24;

/// Hour of day from a device timestamp: the last two characters before the first ':'.
///
/// `"2023/06/01 14:22:05"` → 14, `"03:00:00"` → 3.
pub fn extract_hour(raw: &str) -> Result<u8, FieldError> {
    let head = raw.split(':').next().unwrap_or_default();
    let mut tail = head.char_indices().rev().map(|(i, _)| i);
    let start = match (tail.next(), tail.next()) {
        (Some(_), Some(i)) => i,
        _ => {
            return Err(FieldError::MissingHour {
                raw: raw.to_string(),
            });
        }
    };
    let digits = &head[start..];
    if !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(FieldError::InvalidHour {
            raw: raw.to_string(),
        });
    }
    let hour: u32 = digits.parse().map_err(|_| FieldError::InvalidHour {
        raw: raw.to_string(),
    })?;
    if hour >= HOURS_PER_DAY as u32 {
        return Err(FieldError::HourOutOfRange {
            raw: raw.to_string(),
            hour,
        });
    }
    Ok(hour as u8)
}

/// Circular hour index anchored at the hour of the most recent sample slot.
///
/// Slot 0 is the anchor hour; slot `n` is `n` hours before it. A target hour later in
/// the day than the anchor belongs to the previous day, so it wraps around.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HourRing {
    anchor: u8,
}

impl HourRing {
    pub fn new(anchor: u8) -> Result<Self, ReportError> {
        if anchor >= HOURS_PER_DAY {
            return Err(ReportError::HourOutOfRange(anchor));
        }
        Ok(Self { anchor })
    }

    pub fn anchor(&self) -> u8 {
        self.anchor
    }

    /// Sample slot holding `target`: `(anchor - target) mod 24`.
    pub fn offset(&self, target: u8) -> Result<usize, ReportError> {
        if target >= HOURS_PER_DAY {
            return Err(ReportError::HourOutOfRange(target));
        }
        let day = HOURS_PER_DAY as usize;
        Ok((self.anchor as usize + day - target as usize) % day)
    }
}
