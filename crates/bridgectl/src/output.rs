//! Output rendering and payload input for bridgectl

use std::io::Read;

use anyhow::Result;
use bridge_core::Payload;
use clap::ValueEnum;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Json,
    Yaml,
}

/// Render a value in the requested format
pub fn render<T: Serialize>(value: &T, format: OutputFormat) -> Result<String> {
    Ok(match format {
        OutputFormat::Json => serde_json::to_string_pretty(value)?,
        OutputFormat::Yaml => serde_yaml::to_string(value)?,
    })
}

pub fn print<T: Serialize>(value: &T, format: OutputFormat) -> Result<()> {
    println!("{}", render(value, format)?.trim_end());
    Ok(())
}

/// Read a payload argument. `-` reads stdin; valid JSON becomes structured.
pub fn read_payload(arg: &str) -> Result<Payload> {
    let raw = if arg == "-" {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf)?;
        buf
    } else {
        arg.to_string()
    };
    Ok(parse_payload(&raw))
}

pub fn parse_payload(raw: &str) -> Payload {
    match serde_json::from_str::<serde_json::Value>(raw.trim()) {
        Ok(value) => Payload::from(value),
        Err(_) => Payload::text(raw.trim()),
    }
}
