// PAN-OS XML API response decoding.
// Fixed-shape responses go through serde; variable element names (dp0, dp1, ...) and
// job/report unions go through a small element tree built from quick-xml events.

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use serde::Deserialize;
use std::collections::HashSet;

use super::PanosError;
use crate::models::{
    CoreLoad, DataPlaneLoad, ManagedDevice, ResourceMonitorReport, SystemInfo, TimestampedSample,
};

/// One XML element with its attributes, trimmed text and children in document order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct XmlNode {
    pub name: String,
    pub attrs: Vec<(String, String)>,
    pub text: String,
    pub children: Vec<XmlNode>,
}

impl XmlNode {
    fn open(start: &BytesStart<'_>) -> Result<Self, PanosError> {
        let mut attrs = Vec::new();
        for attr in start.attributes() {
            let attr = attr.map_err(xml_err)?;
            let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
            let value = attr.unescape_value().map_err(xml_err)?.into_owned();
            attrs.push((key, value));
        }
        Ok(Self {
            name: String::from_utf8_lossy(start.name().as_ref()).into_owned(),
            attrs,
            ..Default::default()
        })
    }

    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn child(&self, name: &str) -> Option<&XmlNode> {
        self.children.iter().find(|c| c.name == name)
    }

    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a XmlNode> {
        self.children.iter().filter(move |c| c.name == name)
    }

    /// Follows a path of child names from this node.
    pub fn path(&self, names: &[&str]) -> Option<&XmlNode> {
        names.iter().try_fold(self, |node, name| node.child(name))
    }

    /// First element named `name` in depth-first order, this node included.
    pub fn find(&self, name: &str) -> Option<&XmlNode> {
        if self.name == name {
            return Some(self);
        }
        self.children.iter().find_map(|c| c.find(name))
    }

    fn collect_text(&self, out: &mut Vec<String>) {
        if !self.text.is_empty() {
            out.push(self.text.clone());
        }
        for c in &self.children {
            c.collect_text(out);
        }
    }

    fn text_of(&self, name: &str) -> String {
        self.child(name).map(|c| c.text.clone()).unwrap_or_default()
    }
}

fn xml_err(e: impl std::fmt::Display) -> PanosError {
    PanosError::Xml(e.to_string())
}

/// Parses a whole document and returns its root element.
pub fn parse_tree(xml: &str) -> Result<XmlNode, PanosError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut stack = vec![XmlNode::default()];
    loop {
        match reader.read_event().map_err(xml_err)? {
            Event::Start(start) => stack.push(XmlNode::open(&start)?),
            Event::Empty(start) => {
                let node = XmlNode::open(&start)?;
                if let Some(parent) = stack.last_mut() {
                    parent.children.push(node);
                }
            }
            Event::End(_) => {
                let node = stack
                    .pop()
                    .ok_or_else(|| xml_err("unbalanced closing tag"))?;
                let parent = stack
                    .last_mut()
                    .ok_or_else(|| xml_err("unbalanced closing tag"))?;
                parent.children.push(node);
            }
            Event::Text(text) => {
                if let Some(node) = stack.last_mut() {
                    node.text.push_str(&text.unescape().map_err(xml_err)?);
                }
            }
            Event::CData(data) => {
                if let Some(node) = stack.last_mut() {
                    node.text.push_str(&String::from_utf8_lossy(&data.into_inner()));
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if stack.len() != 1 {
        return Err(xml_err("unexpected end of document"));
    }
    stack
        .pop()
        .and_then(|doc| doc.children.into_iter().next())
        .ok_or_else(|| xml_err("empty document"))
}

/// Parses a response and fails with [`PanosError::Api`] when `status="error"`.
pub fn parse_response(xml: &str) -> Result<XmlNode, PanosError> {
    let root = parse_tree(xml)?;
    if root.attr("status") == Some("error") {
        let mut lines = Vec::new();
        root.collect_text(&mut lines);
        let message = if lines.is_empty() {
            "unknown error".to_string()
        } else {
            lines.join(" ")
        };
        return Err(PanosError::Api { message });
    }
    Ok(root)
}

#[derive(Deserialize)]
struct Envelope<T> {
    result: T,
}

fn decode_result<T: for<'de> Deserialize<'de>>(xml: &str) -> Result<T, PanosError> {
    parse_response(xml)?;
    let envelope: Envelope<T> = quick_xml::de::from_str(xml).map_err(xml_err)?;
    Ok(envelope.result)
}

#[derive(Deserialize)]
struct KeygenResult {
    key: String,
}

pub fn decode_key(xml: &str) -> Result<String, PanosError> {
    let key = decode_result::<KeygenResult>(xml)?.key.trim().to_string();
    if key.is_empty() {
        return Err(PanosError::Api {
            message: "keygen returned an empty key".into(),
        });
    }
    Ok(key)
}

#[derive(Deserialize)]
struct SystemInfoResult {
    system: SystemInfo,
}

pub fn decode_system_info(xml: &str) -> Result<SystemInfo, PanosError> {
    let mut info = decode_result::<SystemInfoResult>(xml)?.system;
    info.time = info.time.trim().to_string();
    Ok(info)
}

/// Data planes under `data-processors` in document order, whatever their element names.
pub fn decode_resource_monitor(xml: &str) -> Result<ResourceMonitorReport, PanosError> {
    let root = parse_response(xml)?;
    let processors = root
        .find("data-processors")
        .ok_or_else(|| xml_err("resource monitor response has no data-processors"))?;

    let data_planes = processors
        .children
        .iter()
        .map(|dp| DataPlaneLoad {
            name: dp.name.clone(),
            cores: dp
                .path(&["hour", "cpu-load-average"])
                .map(|avg| {
                    avg.children_named("entry")
                        .map(|entry| CoreLoad {
                            core_id: entry.text_of("coreid").parse().ok(),
                            samples: entry.text_of("value"),
                        })
                        .collect()
                })
                .unwrap_or_default(),
        })
        .collect();

    Ok(ResourceMonitorReport { data_planes })
}

/// Outcome of a report request or a report job poll.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportReply {
    /// The device queued the report; poll this job id.
    Enqueued(String),
    /// The job exists but has not finished.
    Pending,
    Ready(Vec<TimestampedSample>),
}

pub fn decode_report(xml: &str) -> Result<ReportReply, PanosError> {
    let root = parse_response(xml)?;
    let result = root.child("result").unwrap_or(&root);

    if let Some(job) = result.child("job") {
        match job.child("status") {
            None if !job.text.is_empty() => return Ok(ReportReply::Enqueued(job.text.clone())),
            Some(status) if status.text != "FIN" => return Ok(ReportReply::Pending),
            _ => {}
        }
    }

    let samples = result
        .find("report")
        .map(|report| {
            report
                .children_named("entry")
                .map(|entry| {
                    TimestampedSample::new(
                        entry.text_of("hour-of-receive_time"),
                        entry.text_of("nbytes"),
                    )
                })
                .collect()
        })
        .unwrap_or_default();
    Ok(ReportReply::Ready(samples))
}

#[derive(Deserialize)]
struct DeviceGroupsResult {
    #[serde(default)]
    devicegroups: DeviceGroups,
}

#[derive(Deserialize, Default)]
struct DeviceGroups {
    #[serde(default)]
    entry: Vec<DeviceGroupEntry>,
}

#[derive(Deserialize)]
struct DeviceGroupEntry {
    #[serde(default)]
    devices: Devices,
}

#[derive(Deserialize, Default)]
struct Devices {
    #[serde(default)]
    entry: Vec<DeviceEntry>,
}

#[derive(Deserialize)]
#[serde(rename_all = "kebab-case")]
struct DeviceEntry {
    #[serde(default)]
    serial: String,
    #[serde(default)]
    connected: String,
    #[serde(default)]
    sw_version: String,
}

/// Connected devices across all device groups; a serial listed in several groups
/// keeps the first sw-version seen.
pub fn decode_connected_devices(xml: &str) -> Result<Vec<ManagedDevice>, PanosError> {
    let groups = decode_result::<DeviceGroupsResult>(xml)?.devicegroups;
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for device in groups.entry.into_iter().flat_map(|g| g.devices.entry) {
        if device.connected == "no" || device.serial.is_empty() {
            continue;
        }
        if seen.insert(device.serial.clone()) {
            out.push(ManagedDevice {
                serial: device.serial,
                sw_version: device.sw_version,
            });
        }
    }
    Ok(out)
}
