// Report output: one row per hour of day, plus the CSV header

/// Header record of every report.
pub const REPORT_HEADER: [&str; 3] = ["hour", "dpload", "mbps"];

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HourlyReportRow {
    pub hour: u8,
    pub mean_load: f64,
    pub megabits_per_second: f64,
}

impl HourlyReportRow {
    pub fn zero(hour: u8) -> Self {
        Self {
            hour,
            mean_load: 0.0,
            megabits_per_second: 0.0,
        }
    }

    /// Cells as written to the CSV: plain integer hour, two-decimal load and throughput.
    pub fn to_record(&self) -> [String; 3] {
        [
            self.hour.to_string(),
            format!("{:.2}", self.mean_load),
            format!("{:.2}", self.megabits_per_second),
        ]
    }
}

/// The 24 rows of one report, hour 0 first.
#[derive(Debug, Clone, PartialEq)]
pub struct HourlyReport {
    rows: Vec<HourlyReportRow>,
}

impl HourlyReport {
    pub(crate) fn new(rows: Vec<HourlyReportRow>) -> Self {
        Self { rows }
    }

    pub fn rows(&self) -> &[HourlyReportRow] {
        &self.rows
    }

    /// Header followed by one record per hour, ready for a tabular writer.
    pub fn records(&self) -> Vec<Vec<String>> {
        let mut out = Vec::with_capacity(self.rows.len() + 1);
        out.push(REPORT_HEADER.iter().map(|s| s.to_string()).collect());
        out.extend(self.rows.iter().map(|r| r.to_record().to_vec()));
        out
    }
}
