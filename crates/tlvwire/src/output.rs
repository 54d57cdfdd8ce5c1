use std::io::{IsTerminal, Write};
use std::time::{SystemTime, UNIX_EPOCH};

use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use serde::Serialize;
use tlvwire_frame::Payload;

#[derive(Clone, Debug, Copy, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Pretty,
    Raw,
}

impl OutputFormat {
    pub fn default_for_stdout() -> Self {
        if std::io::stdout().is_terminal() {
            Self::Table
        } else {
            Self::Json
        }
    }
}

#[derive(Serialize)]
struct PayloadOutput<'a> {
    #[serde(rename = "type")]
    payload_type: &'a str,
    tag: u8,
    size: usize,
    wire_size: usize,
    payload: String,
    source: &'a str,
    timestamp: String,
}

pub fn print_payload(payload: &Payload, source: &str, format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            println!("{}", payload_json(payload, source));
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["TYPE", "SIZE", "SOURCE", "PAYLOAD"])
                .add_row(vec![
                    payload.payload_type().name().to_string(),
                    payload.len().to_string(),
                    source.to_string(),
                    payload_preview(payload),
                ]);
            println!("{table}");
        }
        OutputFormat::Pretty => {
            println!(
                "type={} size={} source={} payload={}",
                payload.payload_type(),
                payload.len(),
                source,
                payload_preview(payload)
            );
        }
        OutputFormat::Raw => {
            print_raw(payload.as_bytes());
        }
    }
}

pub fn print_raw(data: &[u8]) {
    let mut out = std::io::stdout();
    let _ = out.write_all(data);
    let _ = out.flush();
}

fn payload_json(payload: &Payload, source: &str) -> String {
    let payload_type = payload.payload_type();
    let out = PayloadOutput {
        payload_type: payload_type.name(),
        tag: payload_type.tag(),
        size: payload.len(),
        wire_size: payload.wire_size(),
        payload: payload_preview(payload),
        source,
        timestamp: now_unix_seconds(),
    };
    serde_json::to_string(&out).unwrap_or_else(|_| "{}".to_string())
}

fn payload_preview(payload: &Payload) -> String {
    match payload {
        Payload::Text(text) => text.as_str().to_string(),
        Payload::Binary(binary) => match std::str::from_utf8(binary.as_ref()) {
            Ok(text) => text.to_string(),
            Err(_) => format!("<binary {} bytes>", binary.len()),
        },
    }
}

fn now_unix_seconds() -> String {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs().to_string())
        .unwrap_or_else(|_| "0".to_string())
}
