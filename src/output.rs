// CSV report files: <YYYYMMDD>.csv for a single firewall, <YYYYMMDD>_<serial>.csv per
// Panorama-managed device.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;

use crate::models::HourlyReport;

/// Report path under `dir` for the pass started on `date`.
pub fn report_path(dir: &str, date: NaiveDate, serial: Option<&str>) -> PathBuf {
    let prefix = date.format("%Y%m%d");
    let name = match serial {
        Some(serial) => format!("{prefix}_{serial}.csv"),
        None => format!("{prefix}.csv"),
    };
    Path::new(dir).join(name)
}

/// Quote a field containing a comma, quote or newline.
fn escape_field(field: &str) -> String {
    if field.contains(',') || field.contains('"') || field.contains('\n') {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

/// Header plus 24 rows, one record per line.
pub fn render_csv(report: &HourlyReport) -> String {
    let mut out = String::new();
    for record in report.records() {
        let line: Vec<String> = record.iter().map(|f| escape_field(f)).collect();
        out.push_str(&line.join(","));
        out.push('\n');
    }
    out
}

pub fn write_report_csv(path: &Path, report: &HourlyReport) -> std::io::Result<()> {
    std::fs::write(path, render_csv(report))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_path_standalone_and_managed() {
        let date = NaiveDate::from_ymd_opt(2023, 6, 1).unwrap();
        assert_eq!(
            report_path("out", date, None),
            Path::new("out").join("20230601.csv")
        );
        assert_eq!(
            report_path("", date, Some("0123456789")),
            PathBuf::from("20230601_0123456789.csv")
        );
    }

    #[test]
    fn escape_field_quotes_separators() {
        assert_eq!(escape_field("60.00"), "60.00");
        assert_eq!(escape_field("a,b"), "\"a,b\"");
        assert_eq!(escape_field("say \"hi\""), "\"say \"\"hi\"\"\"");
    }
}
