use serde::Deserialize;
use std::str::FromStr;

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub device: DeviceConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub schedule: ScheduleConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DeviceConfig {
    /// Hostname or IP address of the firewall or Panorama.
    pub host: String,
    #[serde(default = "default_scheme")]
    pub scheme: String,
    pub api_key: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    /// Poll every firewall connected to this Panorama instead of the host itself.
    #[serde(default)]
    pub panorama: bool,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_verify_tls")]
    pub verify_tls: bool,
    #[serde(default = "default_report_poll_attempts")]
    pub report_poll_attempts: u32,
    #[serde(default = "default_report_poll_interval_ms")]
    pub report_poll_interval_ms: u64,
}

fn default_scheme() -> String {
    "https".into()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_verify_tls() -> bool {
    true
}

fn default_report_poll_attempts() -> u32 {
    30
}

fn default_report_poll_interval_ms() -> u64 {
    2000
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OutputConfig {
    /// Directory for report files; empty means the working directory.
    #[serde(default)]
    pub dir: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ScheduleConfig {
    /// Keep running and produce a report on every schedule tick.
    #[serde(default, rename = "loop")]
    pub run_loop: bool,
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,
    /// Optional cron expression (e.g. "0 0 6 * * *" = 06:00 daily). Uses local time.
    pub cron: Option<String>,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            run_loop: false,
            interval_secs: default_interval_secs(),
            cron: None,
        }
    }
}

fn default_interval_secs() -> u64 {
    24 * 3600
}

impl AppConfig {
    pub fn load() -> anyhow::Result<Self> {
        let path = std::env::var("CONFIG_FILE").unwrap_or_else(|_| "config.toml".into());
        let s = std::fs::read_to_string(&path)?;
        Self::load_from_str(&s)
    }

    /// Parse and validate config from a string (e.g. for tests).
    pub fn load_from_str(s: &str) -> anyhow::Result<Self> {
        let config: AppConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> anyhow::Result<()> {
        let device = &self.device;
        anyhow::ensure!(!device.host.is_empty(), "device.host must be non-empty");
        anyhow::ensure!(
            device.scheme == "https" || device.scheme == "http",
            "device.scheme must be \"https\" or \"http\", got {:?}",
            device.scheme
        );
        let has_key = device.api_key.as_deref().is_some_and(|k| !k.is_empty());
        let has_user = device.username.as_deref().is_some_and(|u| !u.is_empty());
        let has_password = device.password.as_deref().is_some_and(|p| !p.is_empty());
        anyhow::ensure!(
            has_key || has_user,
            "either device.api_key or device.username and device.password must be set"
        );
        anyhow::ensure!(
            has_key || has_password,
            "device.username and device.password must both be set"
        );
        anyhow::ensure!(
            device.timeout_secs > 0,
            "device.timeout_secs must be > 0, got {}",
            device.timeout_secs
        );
        anyhow::ensure!(
            device.report_poll_attempts > 0,
            "device.report_poll_attempts must be > 0, got {}",
            device.report_poll_attempts
        );
        anyhow::ensure!(
            device.report_poll_interval_ms > 0,
            "device.report_poll_interval_ms must be > 0, got {}",
            device.report_poll_interval_ms
        );
        if !self.output.dir.is_empty() {
            let meta = std::fs::metadata(&self.output.dir).map_err(|e| {
                anyhow::anyhow!("output.dir {:?} cannot be opened: {}", self.output.dir, e)
            })?;
            anyhow::ensure!(
                meta.is_dir(),
                "output.dir {:?} exists but is not a directory",
                self.output.dir
            );
        }
        anyhow::ensure!(
            self.schedule.interval_secs > 0,
            "schedule.interval_secs must be > 0, got {}",
            self.schedule.interval_secs
        );
        if let Some(expr) = &self.schedule.cron {
            cron::Schedule::from_str(expr)
                .map_err(|e| anyhow::anyhow!("schedule.cron {:?} is invalid: {}", expr, e))?;
        }
        Ok(())
    }
}
