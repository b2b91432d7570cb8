// PAN-OS XML API transport (firewall or Panorama) via reqwest.
// The report engine never sees this module; it only receives the decoded feeds.

pub mod xml;

use std::future::Future;
use std::time::Duration;

use thiserror::Error;
use tracing::debug;

use crate::config::DeviceConfig;
use crate::models::{ManagedDevice, ResourceMonitorReport, SystemInfo, TimestampedSample};
use xml::ReportReply;

pub const SHOW_SYSTEM_INFO: &str = "<show><system><info></info></system></show>";
pub const SHOW_RESOURCE_MONITOR_HOUR: &str =
    "<show><running><resource-monitor><hour></hour></resource-monitor></running></show>";
pub const SHOW_DEVICE_GROUPS: &str = "<show><devicegroups></devicegroups></show>";
/// Application statistics aggregated by hour of receipt, bytes only, last 24 hours.
pub const TRAFFIC_BY_HOUR_REPORT: &str = "<type><appstat><aggregate-by><member>hour-of-receive_time</member></aggregate-by><values><member>nbytes</member></values></appstat></type><period>last-24-hrs</period><topn>25</topn><topm>10</topm>";

#[derive(Error, Debug)]
pub enum PanosError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected HTTP status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("device returned error: {message}")]
    Api { message: String },

    #[error("malformed XML response: {0}")]
    Xml(String),

    #[error("report job {job} not finished after {attempts} polls")]
    ReportTimeout { job: String, attempts: u32 },
}

/// The three telemetry feeds of one device, plus the Panorama device list.
pub trait DeviceApi: Send + Sync {
    fn system_info(&self) -> impl Future<Output = Result<SystemInfo, PanosError>> + Send;

    fn resource_monitor(
        &self,
    ) -> impl Future<Output = Result<ResourceMonitorReport, PanosError>> + Send;

    /// Bytes per hour of receipt over the last 24 hours.
    fn traffic_report(
        &self,
    ) -> impl Future<Output = Result<Vec<TimestampedSample>, PanosError>> + Send;

    /// Devices connected to Panorama.
    fn connected_devices(
        &self,
    ) -> impl Future<Output = Result<Vec<ManagedDevice>, PanosError>> + Send;

    /// A handle whose requests are proxied to `serial` (None talks to the host itself).
    fn for_target(&self, serial: Option<&str>) -> Self
    where
        Self: Sized;
}

#[derive(Debug, Clone)]
pub struct PanosClient {
    http: reqwest::Client,
    endpoint: String,
    key: String,
    target: Option<String>,
    report_poll_attempts: u32,
    report_poll_interval: Duration,
}

impl PanosClient {
    /// Builds the client and, without a configured API key, generates one from the
    /// username and password.
    pub async fn connect(cfg: &DeviceConfig) -> Result<Self, PanosError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(cfg.timeout_secs))
            .user_agent(crate::version::user_agent())
            .danger_accept_invalid_certs(!cfg.verify_tls)
            .build()?;

        let mut client = Self {
            http,
            endpoint: format!("{}://{}/api/", cfg.scheme, cfg.host),
            key: cfg.api_key.clone().unwrap_or_default(),
            target: None,
            report_poll_attempts: cfg.report_poll_attempts,
            report_poll_interval: Duration::from_millis(cfg.report_poll_interval_ms),
        };

        if client.key.is_empty() {
            let user = cfg.username.as_deref().unwrap_or_default();
            let password = cfg.password.as_deref().unwrap_or_default();
            client.key = client.keygen(user, password).await?;
            debug!(host = %cfg.host, "API key generated");
        }
        Ok(client)
    }

    pub fn target(&self) -> Option<&str> {
        self.target.as_deref()
    }

    async fn keygen(&self, user: &str, password: &str) -> Result<String, PanosError> {
        let body = self
            .send(&[("type", "keygen"), ("user", user), ("password", password)])
            .await?;
        xml::decode_key(&body)
    }

    async fn send(&self, params: &[(&str, &str)]) -> Result<String, PanosError> {
        let response = self.http.get(&self.endpoint).query(params).send().await?;
        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(PanosError::Status {
                status: status.as_u16(),
                body,
            });
        }
        Ok(body)
    }

    /// Authenticated request, proxied to the target serial when one is set.
    async fn call(&self, params: &[(&str, &str)]) -> Result<String, PanosError> {
        let mut all: Vec<(&str, &str)> = Vec::with_capacity(params.len() + 2);
        all.extend_from_slice(params);
        all.push(("key", self.key.as_str()));
        if let Some(target) = self.target.as_deref() {
            all.push(("target", target));
        }
        self.send(&all).await
    }

    async fn op(&self, cmd: &str) -> Result<String, PanosError> {
        debug!(target_serial = ?self.target, cmd, "op request");
        self.call(&[("type", "op"), ("cmd", cmd)]).await
    }
}

impl DeviceApi for PanosClient {
    async fn system_info(&self) -> Result<SystemInfo, PanosError> {
        let body = self.op(SHOW_SYSTEM_INFO).await?;
        xml::decode_system_info(&body)
    }

    async fn resource_monitor(&self) -> Result<ResourceMonitorReport, PanosError> {
        let body = self.op(SHOW_RESOURCE_MONITOR_HOUR).await?;
        xml::decode_resource_monitor(&body)
    }

    async fn traffic_report(&self) -> Result<Vec<TimestampedSample>, PanosError> {
        let body = self
            .call(&[
                ("type", "report"),
                ("reporttype", "dynamic"),
                ("reportname", "custom-dynamic-report"),
                ("cmd", TRAFFIC_BY_HOUR_REPORT),
            ])
            .await?;
        let job = match xml::decode_report(&body)? {
            ReportReply::Ready(samples) => return Ok(samples),
            ReportReply::Enqueued(job) => job,
            ReportReply::Pending => {
                return Err(PanosError::Xml("report pending without a job id".into()));
            }
        };

        for attempt in 1..=self.report_poll_attempts {
            tokio::time::sleep(self.report_poll_interval).await;
            let body = self
                .call(&[("type", "report"), ("action", "get"), ("job-id", job.as_str())])
                .await?;
            match xml::decode_report(&body)? {
                ReportReply::Ready(samples) => {
                    debug!(job = %job, attempt, rows = samples.len(), "report job finished");
                    return Ok(samples);
                }
                ReportReply::Pending | ReportReply::Enqueued(_) => {}
            }
        }
        Err(PanosError::ReportTimeout {
            job,
            attempts: self.report_poll_attempts,
        })
    }

    async fn connected_devices(&self) -> Result<Vec<ManagedDevice>, PanosError> {
        let body = self.op(SHOW_DEVICE_GROUPS).await?;
        xml::decode_connected_devices(&body)
    }

    fn for_target(&self, serial: Option<&str>) -> Self {
        Self {
            target: serial.map(str::to_string),
            ..self.clone()
        }
    }
}
