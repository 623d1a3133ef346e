//! Text and JSON rendering

use serde::Serialize;
use sqmreader_core::prelude::*;
use sqmreader_core::protocol::PortInfo;

/// Result of a one-shot reading, as printed with `--json`
#[derive(Debug, Serialize)]
pub struct ReadReport<'a> {
    pub port: &'a str,
    pub ok: bool,
    pub display: &'a ReadingDisplay,
    pub notice: &'a Notice,
}

pub fn render_display(display: &ReadingDisplay) -> String {
    format!(
        "LUX:               {}\nSQM (mag/arcsec²): {}\nRaw line:          {}\nStatus:            {}",
        display.lux, display.sqm, display.raw, display.status
    )
}

pub fn render_notice(notice: &Notice) -> String {
    let tag = match notice.severity {
        Severity::Info => "info",
        Severity::Warning => "warning",
        Severity::Error => "error",
    };
    format!("[{}] {}: {}", tag, notice.title, notice.message.replace('\n', " "))
}

pub fn render_ports(ports: &[String], selected: Option<&str>) -> String {
    if ports.is_empty() {
        return "No serial ports found".to_string();
    }
    ports
        .iter()
        .enumerate()
        .map(|(i, p)| {
            let mark = if Some(p.as_str()) == selected { '*' } else { ' ' };
            format!("{} {:>2}) {}", mark, i + 1, p)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn render_port_details(ports: &[PortInfo]) -> String {
    if ports.is_empty() {
        return "No serial ports found".to_string();
    }
    ports
        .iter()
        .map(|p| match (p.vid, p.pid) {
            (Some(vid), Some(pid)) => format!(
                "{}  [{:04x}:{:04x}] {} {}",
                p.name,
                vid,
                pid,
                p.manufacturer.as_deref().unwrap_or(""),
                p.product.as_deref().unwrap_or("")
            )
            .trim_end()
            .to_string(),
            _ => p.name.clone(),
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn to_json<T: Serialize>(value: &T) -> anyhow::Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}
