// Shared test helpers: PAN-OS XML fixtures and a mock XML API server

#![allow(dead_code)]

use axum::Router;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// PA-200 whose clock reads 05:22, so hour 5 is sample slot 0.
pub const SYSTEM_INFO_XML: &str = r#"<response status="success"><result><system>
<hostname>fw01</hostname><ip-address>10.0.0.1</ip-address>
<time>Thu Jun  1 05:22:05 2023
</time>
<uptime>10 days, 1:02:03</uptime>
<model>PA-200</model><serial>0011C100001</serial><sw-version>10.1.0</sw-version>
</system></result></response>"#;

/// One data plane, two cores. Slots: 0 = 05:00, 1 = 04:00, 2 = 03:00.
pub const RESOURCE_MONITOR_XML: &str = r#"<response status="success"><result><resource-monitor>
<data-processors><dp0><hour>
<cpu-load-average>
<entry><coreid>0</coreid><value>40,10,0</value></entry>
<entry><coreid>1</coreid><value>60,20,0</value></entry>
</cpu-load-average>
<cpu-load-maximum>
<entry><coreid>0</coreid><value>99,99,99</value></entry>
</cpu-load-maximum>
</hour></dp0></data-processors>
</resource-monitor></result></response>"#;

pub const REPORT_ENQUEUED_XML: &str = r#"<response status="success"><result>
<msg><line>Report job enqueued with jobid 7</line></msg><job>7</job>
</result></response>"#;

pub const REPORT_PENDING_XML: &str = r#"<response status="success"><result>
<job><id>7</id><status>ACT</status></job>
</result></response>"#;

pub const REPORT_FINISHED_XML: &str = r#"<response status="success"><result>
<job><id>7</id><status>FIN</status></job>
<report reportname="custom-dynamic-report">
<entry><hour-of-receive_time>2023/06/01 05:00:00</hour-of-receive_time><nbytes>1620000000</nbytes></entry>
<entry><hour-of-receive_time>2023/06/01 04:00:00</hour-of-receive_time><nbytes>720000000</nbytes></entry>
<entry><hour-of-receive_time>2023/06/01 03:00:00</hour-of-receive_time><nbytes>100</nbytes></entry>
</report>
</result></response>"#;

pub const DEVICE_GROUPS_XML: &str = r#"<response status="success"><result><devicegroups>
<entry name="dg1"><devices>
<entry name="001"><serial>001</serial><connected>yes</connected><sw-version>10.1.0</sw-version></entry>
<entry name="002"><serial>002</serial><connected>no</connected><sw-version>9.1.0</sw-version></entry>
</devices></entry>
<entry name="dg2"><devices>
<entry name="001"><serial>001</serial><connected>yes</connected><sw-version>10.2.0</sw-version></entry>
<entry name="003"><serial>003</serial><connected>yes</connected><sw-version>11.0.0</sw-version></entry>
</devices></entry>
</devicegroups></result></response>"#;

pub const KEYGEN_XML: &str =
    r#"<response status="success"><result><key>LUFRPT1generated</key></result></response>"#;

pub const ERROR_XML: &str = r#"<response status="error" code="403"><result><msg>Invalid credentials.</msg></result></response>"#;

/// CSV expected for the fixtures above.
pub fn expected_csv() -> String {
    let mut out = String::from("hour,dpload,mbps\n");
    for h in 0..24 {
        let line = match h {
            4 => "4,20.00,2.00".to_string(),
            5 => "5,60.00,4.50".to_string(),
            _ => format!("{h},0.00,0.00"),
        };
        out.push_str(&line);
        out.push('\n');
    }
    out
}

#[derive(Clone, Default)]
pub struct MockDevice {
    pub requests: Arc<Mutex<Vec<HashMap<String, String>>>>,
    pub report_polls: Arc<AtomicUsize>,
    /// Serial whose requests are answered with an API error.
    pub failing_target: Option<String>,
}

impl MockDevice {
    pub fn requests(&self) -> Vec<HashMap<String, String>> {
        self.requests.lock().unwrap().clone()
    }
}

async fn api(
    State(mock): State<MockDevice>,
    Query(params): Query<HashMap<String, String>>,
) -> (StatusCode, String) {
    mock.requests.lock().unwrap().push(params.clone());
    let p = |k: &str| params.get(k).map(String::as_str).unwrap_or_default();

    if p("type") == "keygen" {
        return if p("password") == "secret" {
            (StatusCode::OK, KEYGEN_XML.into())
        } else {
            (StatusCode::FORBIDDEN, ERROR_XML.into())
        };
    }
    if p("key").is_empty() {
        return (StatusCode::FORBIDDEN, ERROR_XML.into());
    }
    if mock.failing_target.as_deref().is_some_and(|t| t == p("target")) {
        return (StatusCode::OK, ERROR_XML.into());
    }

    let body = match (p("type"), p("action")) {
        ("op", _) if p("cmd").contains("<system>") => SYSTEM_INFO_XML,
        ("op", _) if p("cmd").contains("<resource-monitor>") => RESOURCE_MONITOR_XML,
        ("op", _) if p("cmd").contains("<devicegroups>") => DEVICE_GROUPS_XML,
        ("report", "get") => {
            if mock.report_polls.fetch_add(1, Ordering::SeqCst) % 2 == 0 {
                REPORT_PENDING_XML
            } else {
                REPORT_FINISHED_XML
            }
        }
        ("report", _) => REPORT_ENQUEUED_XML,
        _ => return (StatusCode::BAD_REQUEST, ERROR_XML.into()),
    };
    (StatusCode::OK, body.into())
}

/// Serves the mock on an ephemeral port; returns its address.
pub async fn serve(mock: MockDevice) -> SocketAddr {
    let app = Router::new().route("/api/", get(api)).with_state(mock);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

/// Config pointing at a mock server, authenticated with an API key.
pub fn device_config_toml(addr: SocketAddr, extra: &str) -> String {
    format!(
        r#"
[device]
host = "{addr}"
scheme = "http"
api_key = "LUFRPT1static"
report_poll_interval_ms = 10
{extra}
"#
    )
}
