//! The render trait shared by every report

use std::io::Write;

use serde_json::Value;
use tracing::warn;

use crate::error::RenderError;
use crate::format::OutputFormat;
use crate::sink::OutputSink;
use crate::style::Palette;

/// A report that can be written as text, JSON or CSV
pub trait Render {
    /// Human readable text; colour depends on `palette`
    fn to_text(&self, palette: &Palette) -> String;

    /// Structured value for the JSON encoder
    fn json_value(&self) -> Value;

    /// CSV document including its header row
    fn to_csv(&self) -> String;

    /// Pretty printed JSON
    ///
    /// # Errors
    /// Returns error if encoding fails
    fn to_json(&self) -> Result<String, RenderError> {
        Ok(serde_json::to_string_pretty(&self.json_value())?)
    }

    /// Write the report to `sink` in `format`
    ///
    /// Text is coloured only when the sink is a terminal.
    ///
    /// # Errors
    /// Returns error if the sink cannot be written
    fn print(&self, format: OutputFormat, sink: &mut OutputSink) -> Result<(), RenderError> {
        match format {
            OutputFormat::Text => {
                let palette = Palette::new(sink.is_terminal());
                write!(sink, "{}", self.to_text(&palette))?;
            }
            OutputFormat::Json => writeln!(sink, "{}", self.to_json()?)?,
            OutputFormat::Csv => writeln!(sink, "{}", self.to_csv())?,
            OutputFormat::Xml => warn!("xml output is not supported, nothing rendered"),
        }
        Ok(())
    }
}

/// Kilobytes to gigabytes, 1024 based
pub(crate) fn kb_to_gb(kb: u64) -> f64 {
    kb as f64 / 1024.0 / 1024.0
}

pub(crate) fn kb_to_mb(kb: u64) -> f64 {
    kb as f64 / 1024.0
}

pub(crate) fn bytes_to_mb(bytes: u64) -> f64 {
    bytes as f64 / 1024.0 / 1024.0
}

/// Round to two decimals for JSON numbers
pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// `Total Memory` becomes `total_memory`
pub(crate) fn json_key(label: &str) -> String {
    label.to_lowercase().replace(' ', "_")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_units() {
        assert_eq!(format!("{:.2}", kb_to_gb(10_485_760)), "10.00");
        assert_eq!(kb_to_mb(2048), 2.0);
        assert_eq!(bytes_to_mb(1_572_864), 1.5);
        assert_eq!(round2(2.456_78), 2.46);
    }

    #[test]
    fn test_json_key() {
        assert_eq!(json_key("Kernel Release"), "kernel_release");
        assert_eq!(json_key("Uptime"), "uptime");
    }
}
